/*!

A `MatchGenerator` enumerates the ways a single transformation rule can transform the match equation it was created
for. Each call to `next()` gives one alternative as a list of new equations and substitutions. The `Matcher` records
what each alternative did so that it can be undone before asking the generator for the next one.

*/

use smallvec::SmallVec;

use super::{
  MatchEquation,
  Substitution
};

#[derive(Clone, Debug)]
pub enum NextMatchResult {
  /// A new equation to solve. Equations later in a result list are solved first.
  MatchEquation(MatchEquation),
  Substitution(Substitution),
}

impl NextMatchResult {
  pub fn equation(equation: MatchEquation) -> Self {
    NextMatchResult::MatchEquation(equation)
  }

  pub fn substitution(substitution: Substitution) -> Self {
    NextMatchResult::Substitution(substitution)
  }
}

pub type NextMatchResultList  = SmallVec<[NextMatchResult; 4]>;
pub type MaybeNextMatchResult = Option<NextMatchResultList>;

pub trait MatchGenerator: Iterator<Item = NextMatchResultList> {
  /// The equation this generator was created to transform. It is restored to the equation stack when the generator is
  /// exhausted.
  fn match_equation(&self) -> MatchEquation;
}
