/*!
Sequence variable elimination and the selection of leaves.

SVE-F: Sequence variable elimination under a free head ƒ(x̅,s̃)≪ƒ(t̃₁,t̃₂) ⇝ₛ {ƒ(s̃)≪ƒ(t̃₂)}, where S={x̅≈t̃₁}. An SVE-F
match generator enumerates the ways of choosing the prefix t̃₁: longest first for `BlankSequence`, shortest first for
`BlankNullSequence`.

SVE-C: Sequence variable elimination under an `Orderless` head ƒ(x̅,s̃)≪ƒ(t̃) ⇝ₛ {ƒ(s̃)≪ƒ(t̃∖t̃₁)}, where t̃₁ is any
sub-multiset of t̃. Subsets are enumerated by size in the same order as SVE-F and, within a size, as bitmasks in
increasing order, so at most 31 leaves can take part.

*/

use smallvec::{smallvec, SmallVec};

use crate::{
  atom::Atom,
  interner::InternedString,
  logging::{log, log_with, Channel}
};

use super::{
  BlankKind,
  Guard,
  LeafEquation,
  LeafIndices,
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

/// The most leaves an `Orderless` subset enumeration can handle, a limit of the `u32` bitmask.
pub const MAX_ORDERLESS_LEAVES: usize = 31;

/// Above this many candidate selections, a notice is logged. Matching proceeds regardless.
pub const MATCH_BUDGET: u64 = 100_000;


/// Enumerates selections of leaves from the remaining leaves of a leaf equation: prefixes for free heads, subsets for
/// `Orderless` heads, for each length in `lengths` in turn.
pub struct Selections {
  remaining   : LeafIndices,
  orderless   : bool,
  lengths     : SmallVec<[usize; 8]>,
  length_index: usize,
  /// The last subset produced for the current length.
  combination : Option<u64>,
}

impl Selections {
  pub fn new(remaining: LeafIndices, orderless: bool, lengths: SmallVec<[usize; 8]>) -> Selections {
    let orderless = if orderless && remaining.len() > MAX_ORDERLESS_LEAVES {
      log(
        Channel::Warning,
        1,
        format!(
          "Too many leaves ({}) to enumerate subsets under an Orderless head. Only prefixes will be tried.",
          remaining.len()
        ).as_str()
      );
      false
    } else {
      orderless
    };

    Selections {
      remaining,
      orderless,
      lengths,
      length_index: 0,
      combination: None
    }
  }

  /// The lengths from `lower` to `upper` inclusive, descending if `longest_first`.
  pub fn lengths(lower: usize, upper: usize, longest_first: bool) -> SmallVec<[usize; 8]> {
    if lower > upper {
      return SmallVec::new();
    }
    if longest_first {
      (lower..=upper).rev().collect()
    } else {
      (lower..=upper).collect()
    }
  }

  /// An estimate of how many selections will be produced.
  pub fn estimated_count(&self) -> u64 {
    let n = self.remaining.len() as u64;
    self.lengths
        .iter()
        .map(|k| {
          if self.orderless {
            num_integer::binomial(n, *k as u64)
          } else {
            1
          }
        })
        .fold(0u64, |total, count| total.saturating_add(count))
  }

  fn selection_from_mask(&self, mask: u64) -> LeafIndices {
    self.remaining
        .iter()
        .enumerate()
        .filter(|(position, _)| mask & (1u64 << position) != 0)
        .map(|(_, index)| *index)
        .collect()
  }
}

/// Gosper's hack: the next larger integer with the same number of set bits.
fn next_combination(x: u64) -> u64 {
  let smallest = x & x.wrapping_neg();
  let ripple   = x + smallest;
  (((ripple ^ x) >> 2) / smallest) | ripple
}

impl Iterator for Selections {
  type Item = LeafIndices;

  fn next(&mut self) -> Option<LeafIndices> {
    loop {
      let length = *self.lengths.get(self.length_index)?;

      if length > self.remaining.len() {
        self.length_index += 1;
        continue;
      }

      if !self.orderless {
        self.length_index += 1;
        return Some(self.remaining[..length].iter().copied().collect());
      }

      let limit = 1u64 << self.remaining.len();
      let mask = match self.combination {
        None => (1u64 << length) - 1,
        // The only subset of size zero has been produced.
        Some(0) => limit,
        Some(previous) => next_combination(previous),
      };

      if mask >= limit {
        self.length_index += 1;
        self.combination = None;
        continue;
      }

      self.combination = Some(mask);
      return Some(self.selection_from_mask(mask));
    }
  }
}


/// A guard attached to a sequence pattern. `PatternTest` guards apply to each leaf of the selection.
#[derive(Clone, Debug)]
enum SequenceGuard {
  Condition(Atom),
  Test(Atom),
}

/// Sequence variable elimination, SVE-F and SVE-C.
pub struct RuleSVE {
  match_equation: MatchEquation,
  equation      : LeafEquation,
  names         : SmallVec<[InternedString; 2]>,
  head          : Option<Atom>,
  guards        : SmallVec<[SequenceGuard; 2]>,
  selections    : Selections,
}

impl MatchGenerator for RuleSVE {
  fn match_equation(&self) -> MatchEquation {
    self.match_equation.clone()
  }
}

impl Iterator for RuleSVE {
  type Item = NextMatchResultList;

  fn next(&mut self) -> MaybeNextMatchResult {
    loop {
      let taken = self.selections.next()?;

      if let Some(head) = &self.head {
        if taken.iter().any(|i| self.equation.leaf(*i).head() != *head) {
          continue;
        }
      }

      return Some(self.make_next(&taken));
    }
  }
}

impl RuleSVE {
  pub fn new(match_equation: MatchEquation, equation: LeafEquation) -> Option<RuleSVE> {
    let mut names  = SmallVec::new();
    let mut guards = SmallVec::new();
    let mut pattern = equation.pattern();

    let (kind, head) = loop {
      match pattern {
        Pattern::Blank { kind, head } => break (*kind, head.clone()),
        Pattern::Named { name, pattern: inner } => {
          names.push(*name);
          pattern = inner.as_ref();
        }
        Pattern::Condition { pattern: inner, test } => {
          guards.push(SequenceGuard::Condition(test.clone()));
          pattern = inner.as_ref();
        }
        Pattern::PatternTest { pattern: inner, test } => {
          guards.push(SequenceGuard::Test(test.clone()));
          pattern = inner.as_ref();
        }
        _ => return None,
      }
    };

    let (lower, upper) = equation.length_bounds(kind.minimum_length());
    let lengths = Selections::lengths(lower, upper, kind == BlankKind::BlankSequence);
    let selections = Selections::new(equation.remaining.clone(), equation.attributes.orderless(), lengths);

    let estimate = selections.estimated_count();
    if estimate > MATCH_BUDGET {
      log_with(Channel::Notice, 2, || {
        format!("Sequence elimination over {} leaves has about {} alternatives.", equation.remaining.len(), estimate)
      });
    }

    Some(RuleSVE {
      match_equation,
      equation,
      names,
      head,
      guards,
      selections
    })
  }

  fn make_next(&self, taken: &[u32]) -> NextMatchResultList {
    let sequence = self.equation.as_sequence(taken);

    let mut result: NextMatchResultList = smallvec![
      NextMatchResult::equation(MatchEquation::Leaves(self.equation.advanced(taken)))
    ];

    // Guards sit above the remaining leaves, so they are checked as soon as the names are bound.
    for guard in self.guards.iter() {
      let guard = match guard {
        SequenceGuard::Condition(test) => Guard::Condition(test.clone()),
        SequenceGuard::Test(test) => Guard::Test {
          test    : test.clone(),
          subjects: taken.iter().map(|i| self.equation.leaf(*i).clone()).collect()
        },
      };
      result.push(NextMatchResult::equation(MatchEquation::Guard(guard)));
    }

    for name in self.names.iter() {
      result.push(NextMatchResult::substitution(Substitution { name: *name, ground: sequence.clone() }));
    }

    result
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  fn indices(v: &[u32]) -> LeafIndices {
    v.iter().copied().collect()
  }

  #[test]
  fn prefixes_longest_first() {
    let selections = Selections::new(indices(&[1, 2, 3]), false, Selections::lengths(1, 3, true));
    let all: Vec<Vec<u32>> = selections.map(|s| s.to_vec()).collect();
    assert_eq!(all, vec![vec![1, 2, 3], vec![1, 2], vec![1]]);
  }

  #[test]
  fn subsets_by_size() {
    let selections = Selections::new(indices(&[1, 2, 3]), true, Selections::lengths(0, 2, false));
    let all: Vec<Vec<u32>> = selections.map(|s| s.to_vec()).collect();
    assert_eq!(
      all,
      vec![vec![], vec![1], vec![2], vec![3], vec![1, 2], vec![1, 3], vec![2, 3]]
    );
  }

  #[test]
  fn estimated_count_uses_binomials() {
    let remaining: LeafIndices = (1..=10).collect();
    let selections = Selections::new(remaining, true, Selections::lengths(2, 3, false));
    assert_eq!(selections.estimated_count(), 45 + 120);
  }

  #[test]
  fn empty_length_range() {
    let mut selections = Selections::new(indices(&[1]), false, Selections::lengths(2, 1, false));
    assert!(selections.next().is_none());
  }
}
