/*!

Comparisons and Boolean connectives. A comparison that cannot be decided stays unevaluated.

*/

use std::cmp::Ordering;

use crate::{
  atom::{Atom, SExpression, Symbol},
  attributes::Attribute,
  built_ins::{ArgumentCount, BuiltinComponent},
  context::SYSTEM_CONTEXT,
  evaluate::Evaluation,
  kernel::NumericKernel,
  logging::{Channel, log_with},
  matching::{display_solutions, SolutionSet},
};

pub(crate) static COMPONENTS: &[BuiltinComponent] = &[
  BuiltinComponent {
    name       : "Equal",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::Protected],
    apply_rules: &[("Equal[xs___]", Equal)],
    rules      : &[],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "Unequal",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::Protected],
    apply_rules: &[("Unequal[xs___]", Unequal)],
    rules      : &[],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "Less",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::Protected],
    apply_rules: &[("Less[xs___]", Less)],
    rules      : &[],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "Greater",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::Protected],
    apply_rules: &[("Greater[xs___]", Greater)],
    rules      : &[],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "LessEqual",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::Protected],
    apply_rules: &[("LessEqual[xs___]", LessEqual)],
    rules      : &[],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "GreaterEqual",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::Protected],
    apply_rules: &[("GreaterEqual[xs___]", GreaterEqual)],
    rules      : &[],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "SameQ",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::Protected],
    apply_rules: &[("SameQ[xs___]", SameQ)],
    rules      : &[],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "UnsameQ",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::Protected],
    apply_rules: &[("UnsameQ[xs___]", UnsameQ)],
    rules      : &[],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "And",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::Flat, Attribute::HoldAll, Attribute::OneIdentity, Attribute::Protected],
    apply_rules: &[("And[xs___]", And)],
    rules      : &[],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "Or",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::Flat, Attribute::HoldAll, Attribute::OneIdentity, Attribute::Protected],
    apply_rules: &[("Or[xs___]", Or)],
    rules      : &[],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "Not",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::Protected],
    apply_rules: &[("Not[x_]", Not), ("Not[xs___]", ArgumentCount)],
    rules      : &[],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "True",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::Locked, Attribute::Protected],
    apply_rules: &[],
    rules      : &[],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "False",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::Locked, Attribute::Protected],
    apply_rules: &[],
    rules      : &[],
    messages   : &[],
  },
];


/// Decides whether two expressions are equal. Numbers compare by value, strings by content, and anything else only
/// when the two are identical.
fn decide_equal(kernel: &dyn NumericKernel, left: &Atom, right: &Atom) -> Option<bool> {
  if left == right {
    return Some(true);
  }

  match (left, right) {
    (l, r) if l.is_real_number() && r.is_real_number() => kernel.compare(l, r).map(|o| o == Ordering::Equal),
    // Exact numbers are canonical, so differing exact numbers are unequal.
    (l, r) if l.is_number() && r.is_number() && l.is_exact_number() && r.is_exact_number() => Some(false),
    (Atom::String(_), Atom::String(_)) => Some(false),
    _ => None
  }
}

/// Decides a chain `x1 ∘ x2 ∘ …` where every adjacent pair must satisfy `accept`.
fn decide_chain<F>(kernel: &dyn NumericKernel, leaves: &[Atom], accept: F) -> Option<bool>
  where F: Fn(Ordering) -> bool
{
  let mut result = true;
  for pair in leaves.windows(2) {
    let ordering = kernel.compare(&pair[0], &pair[1])?;
    result = result && accept(ordering);
  }
  Some(result)
}

fn comparison(
  name      : &str,
  arguments : &SolutionSet,
  original  : &Atom,
  evaluation: &mut Evaluation,
  accept    : fn(Ordering) -> bool
) -> Option<Atom>
{
  log_with(Channel::Debug, 5, || format!("{} called with arguments {}", name, display_solutions(arguments)));
  decide_chain(evaluation.kernel(), original.leaves(), accept).map(Symbol::from_bool)
}

/// Implements calls matching the pattern `Equal[xs___]`.
pub(crate) fn Equal(arguments: &SolutionSet, original: &Atom, evaluation: &mut Evaluation) -> Option<Atom> {
  log_with(Channel::Debug, 5, || format!("Equal called with arguments {}", display_solutions(arguments)));

  let kernel = evaluation.kernel();
  let mut result = true;
  for pair in original.leaves().windows(2) {
    result = result && decide_equal(kernel, &pair[0], &pair[1])?;
  }
  Some(Symbol::from_bool(result))
}

/// Implements calls matching the pattern `Unequal[xs___]`. True only when no two leaves are equal.
pub(crate) fn Unequal(arguments: &SolutionSet, original: &Atom, evaluation: &mut Evaluation) -> Option<Atom> {
  log_with(Channel::Debug, 5, || format!("Unequal called with arguments {}", display_solutions(arguments)));

  let kernel = evaluation.kernel();
  let leaves = original.leaves();
  for (i, left) in leaves.iter().enumerate() {
    for right in &leaves[i + 1..] {
      if decide_equal(kernel, left, right)? {
        return Some(Symbol::false_symbol());
      }
    }
  }
  Some(Symbol::true_symbol())
}

/// Implements calls matching the pattern `Less[xs___]`.
pub(crate) fn Less(arguments: &SolutionSet, original: &Atom, evaluation: &mut Evaluation) -> Option<Atom> {
  comparison("Less", arguments, original, evaluation, |o| o == Ordering::Less)
}

/// Implements calls matching the pattern `Greater[xs___]`.
pub(crate) fn Greater(arguments: &SolutionSet, original: &Atom, evaluation: &mut Evaluation) -> Option<Atom> {
  comparison("Greater", arguments, original, evaluation, |o| o == Ordering::Greater)
}

/// Implements calls matching the pattern `LessEqual[xs___]`.
pub(crate) fn LessEqual(arguments: &SolutionSet, original: &Atom, evaluation: &mut Evaluation) -> Option<Atom> {
  comparison("LessEqual", arguments, original, evaluation, |o| o != Ordering::Greater)
}

/// Implements calls matching the pattern `GreaterEqual[xs___]`.
pub(crate) fn GreaterEqual(arguments: &SolutionSet, original: &Atom, evaluation: &mut Evaluation) -> Option<Atom> {
  comparison("GreaterEqual", arguments, original, evaluation, |o| o != Ordering::Less)
}

/// Implements calls matching the pattern `SameQ[xs___]`. Structural identity.
pub(crate) fn SameQ(_: &SolutionSet, original: &Atom, _: &mut Evaluation) -> Option<Atom> {
  let leaves = original.leaves();
  Some(Symbol::from_bool(leaves.windows(2).all(|pair| pair[0] == pair[1])))
}

/// Implements calls matching the pattern `UnsameQ[xs___]`. True when no two leaves are identical.
pub(crate) fn UnsameQ(_: &SolutionSet, original: &Atom, _: &mut Evaluation) -> Option<Atom> {
  let leaves = original.leaves();
  let distinct = leaves.iter()
                       .enumerate()
                       .all(|(i, left)| leaves[i + 1..].iter().all(|right| left != right));
  Some(Symbol::from_bool(distinct))
}

/// Evaluates the leaves of a held `And` or `Or` in order. A leaf equal to `stop` ends evaluation with `stop`. Leaves
/// equal to the other Boolean value are dropped.
fn connective(head: &'static str, stop: Atom, original: &Atom, evaluation: &mut Evaluation) -> Option<Atom> {
  let skip = Symbol::from_bool(!stop.is_true());
  let mut remaining: Vec<Atom> = Vec::new();

  for leaf in original.leaves() {
    let value = evaluation.evaluate(leaf.clone());
    if evaluation.is_halted() {
      return None;
    }
    if value == stop {
      return Some(stop);
    }
    if value != skip {
      remaining.push(value);
    }
  }

  match remaining.len() {
    0 => Some(skip),
    1 => remaining.pop(),
    _ => {
      let result = SExpression::apply(head, remaining);
      if result == *original { None } else { Some(result) }
    }
  }
}

/// Implements calls matching the pattern `And[xs___]`.
pub(crate) fn And(arguments: &SolutionSet, original: &Atom, evaluation: &mut Evaluation) -> Option<Atom> {
  log_with(Channel::Debug, 5, || format!("And called with arguments {}", display_solutions(arguments)));
  connective("And", Symbol::false_symbol(), original, evaluation)
}

/// Implements calls matching the pattern `Or[xs___]`.
pub(crate) fn Or(arguments: &SolutionSet, original: &Atom, evaluation: &mut Evaluation) -> Option<Atom> {
  log_with(Channel::Debug, 5, || format!("Or called with arguments {}", display_solutions(arguments)));
  connective("Or", Symbol::true_symbol(), original, evaluation)
}

/// Implements calls matching the pattern `Not[x_]`.
pub(crate) fn Not(arguments: &SolutionSet, _: &Atom, _: &mut Evaluation) -> Option<Atom> {
  let x = arguments.get_str("x")?;
  if x.is_true() {
    Some(Symbol::false_symbol())
  } else if x.is_false() {
    Some(Symbol::true_symbol())
  } else if x.has_head("Not") && x.len() == 1 {
    Some(x.leaves()[0].clone())
  } else {
    None
  }
}


#[cfg(test)]
mod tests {
  use crate::{context::Context, evaluate::evaluate, parse};

  fn run(text: &str) -> String {
    let mut context = Context::new_global_context();
    evaluate(parse(text).unwrap(), &mut context).expression.to_string()
  }

  #[test]
  fn equality() {
    assert_eq!(run("1 == 1"), "True");
    assert_eq!(run("1 == 2"), "False");
    assert_eq!(run("1/2 == 0.5"), "True");
    assert_eq!(run("a == a"), "True");
    assert_eq!(run("a == b"), "Equal[a, b]");
    assert_eq!(run("\"x\" == \"y\""), "False");
    assert_eq!(run("1 != 2"), "True");
    assert_eq!(run("Unequal[1, 2, 1]"), "False");
  }

  #[test]
  fn ordering() {
    assert_eq!(run("Less[1, 2, 3]"), "True");
    assert_eq!(run("Less[1, 3, 2]"), "False");
    assert_eq!(run("2 >= 2"), "True");
    assert_eq!(run("x > 1"), "Greater[x, 1]");
  }

  #[test]
  fn identity() {
    assert_eq!(run("f[a] === f[a]"), "True");
    assert_eq!(run("1 === 1.0"), "False");
    assert_eq!(run("a =!= b"), "True");
  }

  #[test]
  fn connectives() {
    assert_eq!(run("1 < 2 && 2 < 3"), "True");
    assert_eq!(run("1 > 2 || a"), "a");
    assert_eq!(run("a && False"), "False");
    assert_eq!(run("a && b"), "And[a, b]");
    assert_eq!(run("!True"), "False");
    assert_eq!(run("!a"), "Not[a]");
  }

  #[test]
  fn short_circuit() {
    let mut context = Context::new_global_context();
    let result = evaluate(parse("False && (x = 1); x").unwrap(), &mut context);
    assert_eq!(result.expression.to_string(), "x");
  }
}
