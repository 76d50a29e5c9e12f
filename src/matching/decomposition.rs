/*!
Decomposition of leaf lists.

Dec-F: Decomposition under a free head ƒ(s,s̃)≪ƒ(t,t̃) ⇝ {s≪t, ƒ(s̃)≪ƒ(t̃)}.

Dec-C: Decomposition under an `Orderless` head ƒ(s,s̃)≪ƒ(t̃₁,t,t̃₂) ⇝ {s≪t, ƒ(s̃)≪ƒ(t̃₁,t̃₂)}, one alternative for each
choice of t in canonical order.

Dec-A: Under a `Flat` head, a single blank s may also take a run of leaves (any subset, if the head is also
`Orderless`), ƒ(s,s̃)≪ƒ(t̃₁,t̃₂) ⇝ {s≪ƒ(t̃₁), ƒ(s̃)≪ƒ(t̃₂)}. A run of one leaf is the leaf itself. Runs are tried
shortest first. With the `strict-associativity` feature, a blank never takes the empty run.

Opt: An optional leaf pattern either takes a leaf like Dec-F/Dec-C or, after all of those alternatives, takes no
leaf and binds its names to the default.

*/

use smallvec::{smallvec, SmallVec};

use crate::atom::Atom;

use super::{
  LeafEquation,
  MatchEquation,
  Pattern,
  Substitution,
  match_generator::{
    MatchGenerator,
    MaybeNextMatchResult,
    NextMatchResult,
    NextMatchResultList
  },
  sequence::Selections,
};

#[cfg(feature = "strict-associativity")]
const MINIMUM_RUN: usize = 1;
#[cfg(not(feature = "strict-associativity"))]
const MINIMUM_RUN: usize = 0;


/// Dec-F, Dec-C, and Dec-A.
pub struct RuleDecLeaf {
  match_equation: MatchEquation,
  equation      : LeafEquation,
  selections    : Selections,
}

impl MatchGenerator for RuleDecLeaf {
  fn match_equation(&self) -> MatchEquation {
    self.match_equation.clone()
  }
}

impl Iterator for RuleDecLeaf {
  type Item = NextMatchResultList;

  fn next(&mut self) -> MaybeNextMatchResult {
    let taken = self.selections.next()?;

    let ground = if taken.len() == 1 {
      self.equation.leaf(taken[0]).clone()
    } else {
      self.equation.with_ground_head(&taken)
    };

    Some(smallvec![
      NextMatchResult::equation(MatchEquation::Leaves(self.equation.advanced(&taken))),
      NextMatchResult::equation(MatchEquation::Single { pattern: self.equation.pattern().clone(), ground }),
    ])
  }
}

impl RuleDecLeaf {
  pub fn new(match_equation: MatchEquation, equation: LeafEquation) -> RuleDecLeaf {
    let absorbs_runs = equation.attributes.flat() && equation.pattern().is_single_blank();
    let (lower, upper) = equation.length_bounds(if absorbs_runs { MINIMUM_RUN } else { 1 });

    let lengths: SmallVec<[usize; 8]> = if absorbs_runs {
      Selections::lengths(lower, upper, false)
    } else {
      Selections::lengths(lower.max(1), upper.min(1), false)
    };

    let selections = Selections::new(equation.remaining.clone(), equation.attributes.orderless(), lengths);

    RuleDecLeaf {
      match_equation,
      equation,
      selections
    }
  }
}


/// An `Optional` leaf pattern.
pub struct RuleOptionalLeaf {
  match_equation: MatchEquation,
  equation      : LeafEquation,
  inner         : Pattern,
  /// `None` once the default alternative has been produced, or if there is no default to fall back on.
  default       : Option<Atom>,
  selections    : Selections,
}

impl MatchGenerator for RuleOptionalLeaf {
  fn match_equation(&self) -> MatchEquation {
    self.match_equation.clone()
  }
}

impl Iterator for RuleOptionalLeaf {
  type Item = NextMatchResultList;

  fn next(&mut self) -> MaybeNextMatchResult {
    if let Some(taken) = self.selections.next() {
      let ground = self.equation.leaf(taken[0]).clone();
      return Some(smallvec![
        NextMatchResult::equation(MatchEquation::Leaves(self.equation.advanced(&taken))),
        NextMatchResult::equation(MatchEquation::Single { pattern: self.inner.clone(), ground }),
      ]);
    }

    let default = self.default.take()?;
    let mut result: NextMatchResultList = smallvec![
      NextMatchResult::equation(MatchEquation::Leaves(self.equation.advanced(&[])))
    ];
    for name in self.inner.bound_names() {
      result.push(NextMatchResult::substitution(Substitution { name, ground: default.clone() }));
    }
    Some(result)
  }
}

impl RuleOptionalLeaf {
  pub fn new(match_equation: MatchEquation, equation: LeafEquation, inner: Pattern, default: Option<Atom>)
    -> RuleOptionalLeaf
  {
    let (lower, upper) = equation.length_bounds(0);
    let lengths = Selections::lengths(lower.max(1), upper.min(1), false);
    let selections = Selections::new(equation.remaining.clone(), equation.attributes.orderless(), lengths);
    // The default is only usable if the pattern may take no leaf at all.
    let default = if lower == 0 { default } else { None };

    RuleOptionalLeaf {
      match_equation,
      equation,
      inner,
      default,
      selections
    }
  }
}


#[cfg(test)]
mod tests {
  use std::rc::Rc;

  use super::*;
  use crate::{attributes::Attribute, parse};

  fn leaf_equation(patterns: &str, ground: &str, attributes: crate::attributes::Attributes) -> LeafEquation {
    let patterns = match Pattern::compile(&parse(patterns).unwrap()) {
      Pattern::Compound { leaves, .. } => leaves,
      _ => unreachable!()
    };
    let ground = match parse(ground).unwrap() {
      Atom::SExpression(children) => children,
      _ => unreachable!()
    };
    LeafEquation::new(patterns, Rc::clone(&ground), attributes)
  }

  #[test]
  fn free_head_takes_first_leaf() {
    let equation = leaf_equation("f[x_, y_]", "f[a, b]", Default::default());
    let rule = RuleDecLeaf::new(MatchEquation::Leaves(equation.clone()), equation);
    assert_eq!(rule.count(), 1);
  }

  #[test]
  fn orderless_head_takes_any_leaf() {
    let equation = leaf_equation("f[x_, y_, z_]", "f[a, b, c]", Attribute::Orderless.into());
    let rule = RuleDecLeaf::new(MatchEquation::Leaves(equation.clone()), equation);
    assert_eq!(rule.count(), 3);
  }

  #[test]
  fn flat_head_takes_runs() {
    let equation = leaf_equation("f[x_, y_]", "f[a, b, c]", Attribute::Flat.into());
    let rule = RuleDecLeaf::new(MatchEquation::Leaves(equation.clone()), equation);
    // x may take one or two leaves; y needs at least one.
    #[cfg(feature = "strict-associativity")]
    assert_eq!(rule.count(), 2);
    #[cfg(not(feature = "strict-associativity"))]
    assert_eq!(rule.count(), 3);
  }
}
