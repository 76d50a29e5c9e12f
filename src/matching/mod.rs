/*!

# Pattern matching

Matching solves the equation `pattern ≪ ground`: find every binding of the pattern's named sub-patterns that makes
the pattern equal to the ground expression, modulo the `Flat` and `Orderless` attributes of the heads involved.

# Data Generators and Structures

The central player is the `Matcher`, which corresponds roughly to a generator (in the software sense) of the
substitutions produced by solving the equation. A `Matcher` generates every solution, one per call to `next()`. It
does this by applying transformation rules to match equations. A rule that can transform an equation in several ways
is represented by a `MatchGenerator`, which produces one alternative per call to `next()` and knows the equation it
was created from, so that the equation can be restored when the generator is exhausted.

We have the following stack structures:

  * The matching equation stack Γ
  * The substitution stack S
  * The match generator stack

The equation (resp. generator) on the top of its stack is the _active_ equation (resp. generator).

# Algorithm

This algorithm is implemented in `matcher.rs` in the implementation of `Iterator` for `Matcher`.

Start state: S = Ø, Γ = {pattern≪ground}.

1. Pop the active equation. If Γ is empty, halt with *SUCCESS* and yield S.
2. Select the rule that applies to the equation.
   a. If no rule applies, push the equation back and backtrack (step 4).
   b. Otherwise push the rule's match generator. It is now the active generator.
3. Call `next()` on the active generator. The generator produces zero or more equations, pushed onto Γ, and zero or
   more substitutions, pushed onto S. A substitution that conflicts with an existing binding of the same name fails
   the alternative (backtrack, step 4). Otherwise go to step 1.
4. Backtrack: undo everything recorded above the active generator and go to step 3. If the active generator is
   exhausted, pop it, restore its equation, and backtrack to the generator beneath it. If there is none, halt with
   *FAILURE*.

To obtain additional solutions after *SUCCESS*, backtrack (step 4).

# Rules

  * Trivial: a literal equal to the ground, an exhausted leaf list, a guard that evaluates to `True`.
  * Blank: a blank whose head constraint holds.
  * Named: `x:p ≪ t` becomes `p ≪ t` with `x ≈ t`.
  * Decomposition: `h[p…] ≪ g[t…]` becomes `h ≪ g` and a leaf equation `p… ≪ t…` under the attributes of `g`.
  * Leaf decomposition: the first leaf pattern takes the first remaining leaf (free heads), any remaining leaf
    (`Orderless` heads), or a run of leaves bound as `g[run]` (`Flat` heads).
  * Sequence elimination: a sequence blank takes a prefix (free heads) or a subset (`Orderless` heads) of the
    remaining leaves, bound as `Sequence[…]`.
  * Guards: `p /; c` and `p ? t` become `p ≪ t` followed by a guard equation that is checked after `p` is solved.
  * Optional and Alternatives try each of their possibilities in turn.

*/

mod common;
mod decomposition;
mod match_generator;
mod matcher;
mod pattern;
mod sequence;

use std::{
  fmt::Display,
  rc::Rc
};

use smallvec::SmallVec;

pub use matcher::Matcher;
pub use pattern::{BlankKind, Pattern, Specificity, is_pattern_expression};

use crate::{
  atom::{
    Atom,
    SExpression
  },
  attributes::Attributes,
  format::{DisplayForm, Formattable},
  interner::{InternedString, interned, resolve_str}
};

/// A map from the name of a named pattern to the ground expression it is bound to. Sequence blanks are bound to
/// `Sequence[…]`. Match problems have few variables, so a small vector beats a hash map here.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct SolutionSet {
  bindings: SmallVec<[(InternedString, Atom); 8]>
}

impl SolutionSet {
  pub fn new() -> Self {
    SolutionSet::default()
  }

  pub fn get(&self, name: InternedString) -> Option<&Atom> {
    self.bindings.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
  }

  /// Convenience for built-ins, which refer to their parameters by the names used in their patterns.
  pub fn get_str(&self, name: &str) -> Option<&Atom> {
    self.get(interned(name))
  }

  /// Gives the leaves a sequence variable is bound to. A name bound to a single expression gives that expression.
  pub fn get_sequence(&self, name: &str) -> Vec<Atom> {
    match self.get_str(name) {
      Some(value) => value.is_sequence().unwrap_or_else(|| vec![value.clone()]),
      None => Vec::new()
    }
  }

  /// Binds `name`, replacing any existing binding.
  pub fn insert(&mut self, name: InternedString, value: Atom) {
    match self.bindings.iter_mut().find(|(n, _)| *n == name) {
      Some(binding) => binding.1 = value,
      None => self.bindings.push((name, value)),
    }
  }

  pub fn remove(&mut self, name: InternedString) {
    self.bindings.retain(|(n, _)| *n != name);
  }

  pub fn iter(&self) -> impl Iterator<Item=&(InternedString, Atom)> {
    self.bindings.iter()
  }

  pub fn len(&self) -> usize {
    self.bindings.len()
  }

  pub fn is_empty(&self) -> bool {
    self.bindings.is_empty()
  }
}

/// Formats the solutions as `x → value` pairs in binding order.
pub fn display_solutions(solutions: &SolutionSet) -> String {
  solutions.iter()
           .map(|(name, value)| format!("{} → {}", resolve_str(*name), value))
           .collect::<Vec<_>>()
           .join(", ")
}


/// Indices into the children of a ground expression (so never 0, the head).
pub type LeafIndices = SmallVec<[u32; 8]>;

#[derive(Clone, Debug)]
pub enum MatchEquation {
  /// pattern ≪ ground
  Single {
    pattern: Pattern,
    ground : Atom
  },
  /// The leaf patterns of a compound pattern against the leaves of a ground expression not yet consumed.
  Leaves(LeafEquation),
  /// A guard to check once the equations above it are solved.
  Guard(Guard),
}

#[derive(Clone, Debug)]
pub struct LeafEquation {
  pub patterns  : Rc<Vec<Pattern>>,
  /// Index into `patterns` of the next pattern to solve.
  pub next      : usize,
  /// The children of the ground expression, head included.
  pub ground    : Rc<Vec<Atom>>,
  /// Leaves of `ground` not consumed yet, ascending.
  pub remaining : LeafIndices,
  /// Attributes of the ground head.
  pub attributes: Attributes,
}

impl LeafEquation {
  pub fn new(patterns: Rc<Vec<Pattern>>, ground: Rc<Vec<Atom>>, attributes: Attributes) -> Self {
    let remaining = (1..ground.len() as u32).collect();
    LeafEquation {
      patterns,
      next: 0,
      ground,
      remaining,
      attributes
    }
  }

  pub fn pattern(&self) -> &Pattern {
    &self.patterns[self.next]
  }

  pub fn is_exhausted(&self) -> bool {
    self.next >= self.patterns.len()
  }

  pub fn ground_head(&self) -> &Atom {
    &self.ground[0]
  }

  pub fn leaf(&self, index: u32) -> &Atom {
    &self.ground[index as usize]
  }

  /// The equation for the following pattern after the leaves in `taken` are consumed.
  pub fn advanced(&self, taken: &[u32]) -> LeafEquation {
    LeafEquation {
      patterns  : self.patterns.clone(),
      next      : self.next + 1,
      ground    : self.ground.clone(),
      remaining : self.remaining.iter().copied().filter(|i| !taken.contains(i)).collect(),
      attributes: self.attributes,
    }
  }

  /// Leaves that must be left for the patterns after the current one.
  pub fn required_after(&self) -> usize {
    self.patterns[self.next + 1..].iter().map(|p| p.minimum_length()).sum()
  }

  /// The most leaves the patterns after the current one can consume, if bounded.
  pub fn capacity_after(&self) -> Option<usize> {
    let rest = &self.patterns[self.next + 1..];
    if rest.is_empty() {
      Some(0)
    } else if self.attributes.flat() || rest.iter().any(|p| p.sequence_kind().is_some()) {
      None
    } else {
      Some(rest.len())
    }
  }

  /// The range of how many leaves the current pattern may consume.
  pub fn length_bounds(&self, minimum: usize) -> (usize, usize) {
    let available = self.remaining.len().saturating_sub(self.required_after());
    let lower = match self.capacity_after() {
      Some(capacity) => minimum.max(self.remaining.len().saturating_sub(capacity)),
      None => minimum
    };
    (lower, available)
  }

  /// `head[leaves…]` for the given leaf indices.
  pub fn with_ground_head(&self, taken: &[u32]) -> Atom {
    SExpression::new(self.ground_head().clone(), taken.iter().map(|i| self.leaf(*i).clone()).collect())
  }

  pub fn as_sequence(&self, taken: &[u32]) -> Atom {
    SExpression::sequence(taken.iter().map(|i| self.leaf(*i).clone()).collect())
  }
}

#[derive(Clone, Debug)]
pub enum Guard {
  /// The test of a `Condition`, with pattern names still unsubstituted.
  Condition(Atom),
  /// `test[subject]` must be `True` for every subject.
  Test {
    test    : Atom,
    subjects: Vec<Atom>
  },
}


impl Display for MatchEquation {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let formatter = DisplayForm::Matcher.into();
    match self {
      MatchEquation::Single { pattern, ground } => {
        write!(f, "{} ≪ {}", pattern.format(&formatter), ground.format(&formatter))
      }
      MatchEquation::Leaves(equation) => {
        write!(
          f,
          "{}❨{}❩ ≪ {}❨{}❩",
          equation.ground_head().format(&formatter),
          equation.patterns[equation.next..].iter().map(|p| p.format(&formatter)).collect::<Vec<_>>().join(", "),
          equation.ground_head().format(&formatter),
          equation.remaining.iter().map(|i| equation.leaf(*i).format(&formatter)).collect::<Vec<_>>().join(", "),
        )
      }
      MatchEquation::Guard(Guard::Condition(test)) => write!(f, "/; {}", test.format(&formatter)),
      MatchEquation::Guard(Guard::Test { test, .. }) => write!(f, "? {}", test.format(&formatter)),
    }
  }
}


/// A binding of a pattern name to a ground expression.
#[derive(Clone, Debug)]
pub struct Substitution {
  pub name  : InternedString,
  pub ground: Atom
}

impl Display for Substitution {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(
      f,
      "{}→{}",
      resolve_str(self.name),
      self.ground.format(&DisplayForm::Matcher.into())
    )
  }
}



#[cfg(test)]
mod tests {
  use crate::{
    attributes::Attribute,
    context::Context,
    evaluate::Evaluation,
    interner::interned_static,
    parse
  };

  #[allow(unused_imports)]
  use crate::logging::set_verbosity;

  use super::*;

  /// All solutions of `pattern ≪ ground`, formatted.
  fn solve(pattern: &str, ground: &str, context: &mut Context) -> Vec<String> {
    let pattern = Pattern::compile(&parse(pattern).unwrap());
    let ground  = parse(ground).unwrap();
    let mut evaluation = Evaluation::new(context);
    Matcher::new(pattern, ground, &mut evaluation).map(|s| display_solutions(&s)).collect()
  }

  #[test]
  fn binding_consistency() {
    let mut context = Context::without_built_ins();
    assert_eq!(solve("h[x_, x_]", "h[a, a]", &mut context), vec!["x → a"]);
    assert!(solve("h[x_, x_]", "h[a, b]", &mut context).is_empty());
  }

  #[test]
  fn literal_and_head_mismatch() {
    let mut context = Context::without_built_ins();
    assert_eq!(solve("f[a, b]", "f[a, b]", &mut context), vec![""]);
    assert!(solve("f[x_]", "g[a]", &mut context).is_empty());
    assert!(solve("f[x_]", "f[a, b]", &mut context).is_empty());
    assert_eq!(solve("h_[x_]", "g[a]", &mut context), vec!["h → g, x → a"]);
  }

  #[test]
  fn head_constraints() {
    let mut context = Context::without_built_ins();
    assert_eq!(solve("f[x_Integer]", "f[3]", &mut context), vec!["x → 3"]);
    assert!(solve("f[x_Integer]", "f[a]", &mut context).is_empty());
    assert_eq!(solve("f[x_g]", "f[g[1]]", &mut context), vec!["x → g[1]"]);
  }

  /// Solve  Plus[x_, Times[y_, z_], exp___] << Plus[a, Times[b, a]]
  #[test]
  fn empty_sequence_test() {
    let mut context = Context::without_built_ins();
    assert_eq!(
      solve("Plus[x_, Times[y_, z_], exp___]", "Plus[a, Times[b, a]]", &mut context),
      vec!["x → a, y → b, z → a, exp → Sequence[]"]
    );
  }

  #[test]
  fn sequence_blanks_greedy_and_lazy() {
    let mut context = Context::without_built_ins();
    // BlankSequence is greedy: longest first.
    assert_eq!(
      solve("f[x__, y__]", "f[a, b, c]", &mut context),
      vec!["x → Sequence[a, b], y → Sequence[c]", "x → Sequence[a], y → Sequence[b, c]"]
    );
    // BlankNullSequence is lazy: shortest first.
    assert_eq!(
      solve("f[x___, y___]", "f[a, b]", &mut context),
      vec![
        "x → Sequence[], y → Sequence[a, b]",
        "x → Sequence[a], y → Sequence[b]",
        "x → Sequence[a, b], y → Sequence[]"
      ]
    );
  }

  #[test]
  fn sequence_head_constraint() {
    let mut context = Context::without_built_ins();
    assert_eq!(
      solve("f[x__Integer, y___]", "f[1, 2, a]", &mut context),
      vec!["x → Sequence[1, 2], y → Sequence[a]", "x → Sequence[1], y → Sequence[2, a]"]
    );
  }

  #[test]
  fn orderless_matching() {
    let mut context = Context::without_built_ins();
    context.set_attributes(interned_static("h"), Attribute::Orderless.into()).unwrap();
    assert_eq!(
      solve("h[x_, y_]", "h[a, b]", &mut context),
      vec!["x → a, y → b", "x → b, y → a"]
    );
    assert_eq!(solve("h[b, x_]", "h[a, b]", &mut context), vec!["x → a"]);
    assert_eq!(
      solve("h[x_, ys__]", "h[a, b, c]", &mut context),
      vec!["x → a, ys → Sequence[b, c]", "x → b, ys → Sequence[a, c]", "x → c, ys → Sequence[a, b]"]
    );
  }

  #[test]
  fn flat_matching() {
    let mut context = Context::without_built_ins();
    context.set_attributes(interned_static("f"), Attribute::Flat.into()).unwrap();
    // Runs are tried shortest first; a run of one leaf binds the leaf itself.
    assert_eq!(
      solve("f[x_, y_]", "f[a, b, c]", &mut context),
      vec!["x → a, y → f[b, c]", "x → f[a, b], y → c"]
    );
    assert_eq!(solve("f[x_]", "f[a, b]", &mut context), vec!["x → f[a, b]"]);
  }

  #[test]
  fn flat_orderless_matching() {
    let mut context = Context::without_built_ins();
    context.set_attributes(interned_static("f"), Attribute::Flat + Attribute::Orderless).unwrap();
    assert_eq!(
      solve("f[x_, y_]", "f[a, b]", &mut context),
      vec!["x → a, y → b", "x → b, y → a"]
    );
    assert_eq!(solve("f[x_, b]", "f[a, b, c]", &mut context), vec!["x → f[a, c]"]);
  }

  #[test]
  #[cfg(feature = "strict-associativity")]
  fn match_empty_flat_function() {
    let mut context = Context::without_built_ins();
    context.set_attributes(interned_static("f"), Attribute::Flat + Attribute::Orderless).unwrap();
    assert!(solve("f[x_]", "f[]", &mut context).is_empty());
  }

  #[test]
  fn alternatives_and_optional() {
    let mut context = Context::without_built_ins();
    assert_eq!(solve("f[x:(a | b)]", "f[b]", &mut context), vec!["x → b"]);
    assert!(solve("f[a | b]", "f[c]", &mut context).is_empty());
    assert_eq!(solve("f[x_, y_:0]", "f[a]", &mut context), vec!["x → a, y → 0"]);
    assert_eq!(solve("f[x_, y_:0]", "f[a, b]", &mut context), vec!["x → a, y → b"]);
  }

  #[test]
  fn guarded_patterns() {
    let mut context = Context::new_global_context();
    assert_eq!(solve("f[x_?IntegerQ]", "f[3]", &mut context), vec!["x → 3"]);
    assert!(solve("f[x_?IntegerQ]", "f[a]", &mut context).is_empty());
    assert_eq!(solve("f[x_, y_] /; x > y", "f[2, 1]", &mut context), vec!["x → 2, y → 1"]);
    assert!(solve("f[x_, y_] /; x > y", "f[1, 2]", &mut context).is_empty());
    // A guard that does not reduce to a boolean is a failure, not an error.
    assert!(solve("f[x_] /; undefined[x]", "f[1]", &mut context).is_empty());
  }

  #[test]
  fn many_orderless_solutions_are_lazy() {
    let mut context = Context::without_built_ins();
    context.set_attributes(interned_static("h"), Attribute::Orderless.into()).unwrap();
    let pattern = Pattern::compile(&parse("h[x__, y__]").unwrap());
    let ground  = parse("h[a, b, c, d, e, f, g, i, j, k, l, m]").unwrap();
    let mut evaluation = Evaluation::new(&mut context);
    let first_three: Vec<SolutionSet> = Matcher::new(pattern, ground, &mut evaluation).take(3).collect();
    assert_eq!(first_three.len(), 3);
  }
}
