/*!
The common rules apply under any head.

T: Trivial s ≪ s ⇝ ∅. Also used for a solved leaf list and for a guard that holds.

Named: x:p ≪ t ⇝ₛ {p ≪ t}, where S = {x ≈ t}.

Dec: Decomposition h[p̃] ≪ g[t̃] ⇝ {h ≪ g, p̃ ≪ t̃}. The leaf equation p̃ ≪ t̃ is solved under the attributes of g.

Guard: p /; c ≪ t ⇝ {p ≪ t, c}, and p ? f ≪ t ⇝ {p ≪ t, f[t]}. The guard is checked after p ≪ t is solved.

Alt: p₁ | p₂ | … ≪ t ⇝ {pᵢ ≪ t}, one alternative per pᵢ.

All but the last of these transform an equation in exactly one way.

*/

use std::rc::Rc;

use smallvec::smallvec;

use crate::{
  atom::Atom,
  attributes::Attributes
};

use super::{
  Guard,
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
};


/// A rule that transforms its equation in exactly one way.
pub struct RuleOnce {
  match_equation: MatchEquation,
  result        : Option<NextMatchResultList>,
}

impl MatchGenerator for RuleOnce {
  fn match_equation(&self) -> MatchEquation {
    self.match_equation.clone()
  }
}

impl Iterator for RuleOnce {
  type Item = NextMatchResultList;

  fn next(&mut self) -> MaybeNextMatchResult {
    self.result.take()
  }
}

impl RuleOnce {

  /// Trivial elimination: the equation is solved without producing anything.
  pub fn trivial(match_equation: MatchEquation) -> RuleOnce {
    RuleOnce {
      match_equation,
      result: Some(smallvec![])
    }
  }

  /// x:p ≪ t ⇝ₛ {p ≪ t}, S = {x ≈ t}
  pub fn named(match_equation: MatchEquation, name: crate::interner::InternedString, inner: Pattern, ground: Atom)
    -> RuleOnce
  {
    let result = smallvec![
      NextMatchResult::equation(MatchEquation::Single { pattern: inner, ground: ground.clone() }),
      NextMatchResult::substitution(Substitution { name, ground }),
    ];
    RuleOnce {
      match_equation,
      result: Some(result)
    }
  }

  /// h[p̃] ≪ g[t̃] ⇝ {h ≪ g, p̃ ≪ t̃}. The head equation is solved first.
  pub fn decompose(
    match_equation: MatchEquation,
    head          : Pattern,
    leaves        : Rc<Vec<Pattern>>,
    ground        : Rc<Vec<Atom>>,
    attributes    : Attributes
  ) -> RuleOnce
  {
    let ground_head = ground[0].clone();
    let result = smallvec![
      NextMatchResult::equation(MatchEquation::Leaves(LeafEquation::new(leaves, ground, attributes))),
      NextMatchResult::equation(MatchEquation::Single { pattern: head, ground: ground_head }),
    ];
    RuleOnce {
      match_equation,
      result: Some(result)
    }
  }

  /// p /; c ≪ t ⇝ {p ≪ t, c}. The guard sits beneath the inner equation, so it is checked after `p` is solved.
  pub fn guarded(match_equation: MatchEquation, inner: Pattern, ground: Atom, guard: Guard) -> RuleOnce {
    let result = smallvec![
      NextMatchResult::equation(MatchEquation::Guard(guard)),
      NextMatchResult::equation(MatchEquation::Single { pattern: inner, ground }),
    ];
    RuleOnce {
      match_equation,
      result: Some(result)
    }
  }

  /// Replaces the equation with `inner ≪ ground`. Used for `Optional` outside of a leaf list.
  pub fn delegate(match_equation: MatchEquation, inner: Pattern, ground: Atom) -> RuleOnce {
    let result = smallvec![
      NextMatchResult::equation(MatchEquation::Single { pattern: inner, ground }),
    ];
    RuleOnce {
      match_equation,
      result: Some(result)
    }
  }
}


/// p₁ | p₂ | … ≪ t ⇝ {pᵢ ≪ t}
pub struct RuleAlternatives {
  match_equation: MatchEquation,
  alternatives  : Rc<Vec<Pattern>>,
  ground        : Atom,
  next_index    : usize,
}

impl MatchGenerator for RuleAlternatives {
  fn match_equation(&self) -> MatchEquation {
    self.match_equation.clone()
  }
}

impl Iterator for RuleAlternatives {
  type Item = NextMatchResultList;

  fn next(&mut self) -> MaybeNextMatchResult {
    let alternative = self.alternatives.get(self.next_index)?.clone();
    self.next_index += 1;
    Some(smallvec![
      NextMatchResult::equation(MatchEquation::Single { pattern: alternative, ground: self.ground.clone() })
    ])
  }
}

impl RuleAlternatives {
  pub fn new(match_equation: MatchEquation, alternatives: Rc<Vec<Pattern>>, ground: Atom) -> RuleAlternatives {
    RuleAlternatives {
      match_equation,
      alternatives,
      ground,
      next_index: 0
    }
  }
}
