/*!

Predicates on the form of an expression. These always decide, giving `True` or `False`.

*/

use crate::{
  atom::{Atom, Symbol},
  attributes::Attribute,
  built_ins::{ArgumentCount, BuiltinComponent},
  context::SYSTEM_CONTEXT,
  evaluate::Evaluation,
  matching::SolutionSet,
};

pub(crate) static COMPONENTS: &[BuiltinComponent] = &[
  BuiltinComponent {
    name       : "IntegerQ",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::Protected],
    apply_rules: &[("IntegerQ[e_]", IntegerQ), ("IntegerQ[xs___]", ArgumentCount)],
    rules      : &[],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "NumberQ",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::Protected],
    apply_rules: &[("NumberQ[e_]", NumberQ), ("NumberQ[xs___]", ArgumentCount)],
    rules      : &[],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "EvenQ",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::Listable, Attribute::Protected],
    apply_rules: &[("EvenQ[e_]", EvenQ)],
    rules      : &[],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "OddQ",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::Listable, Attribute::Protected],
    apply_rules: &[("OddQ[e_]", OddQ)],
    rules      : &[],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "AtomQ",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::Protected],
    apply_rules: &[("AtomQ[e_]", AtomQ), ("AtomQ[xs___]", ArgumentCount)],
    rules      : &[],
    messages   : &[],
  },
];

/// Implements calls matching the pattern `IntegerQ[e_]`.
pub(crate) fn IntegerQ(arguments: &SolutionSet, _: &Atom, _: &mut Evaluation) -> Option<Atom> {
  Some(Symbol::from_bool(matches!(arguments.get_str("e")?, Atom::Integer(_))))
}

/// Implements calls matching the pattern `NumberQ[e_]`.
pub(crate) fn NumberQ(arguments: &SolutionSet, _: &Atom, _: &mut Evaluation) -> Option<Atom> {
  Some(Symbol::from_bool(arguments.get_str("e")?.is_number()))
}

/// Implements calls matching the pattern `EvenQ[e_]`. Anything but an integer is not even.
pub(crate) fn EvenQ(arguments: &SolutionSet, _: &Atom, _: &mut Evaluation) -> Option<Atom> {
  let even = match arguments.get_str("e")? {
    Atom::Integer(n) => n.is_even(),
    _ => false
  };
  Some(Symbol::from_bool(even))
}

/// Implements calls matching the pattern `OddQ[e_]`. Anything but an integer is not odd.
pub(crate) fn OddQ(arguments: &SolutionSet, _: &Atom, _: &mut Evaluation) -> Option<Atom> {
  let odd = match arguments.get_str("e")? {
    Atom::Integer(n) => n.is_odd(),
    _ => false
  };
  Some(Symbol::from_bool(odd))
}

/// Implements calls matching the pattern `AtomQ[e_]`.
pub(crate) fn AtomQ(arguments: &SolutionSet, _: &Atom, _: &mut Evaluation) -> Option<Atom> {
  Some(Symbol::from_bool(arguments.get_str("e")?.is_atomic()))
}


#[cfg(test)]
mod tests {
  use crate::{context::Context, evaluate::evaluate, parse};

  fn run(text: &str) -> String {
    let mut context = Context::new_global_context();
    evaluate(parse(text).unwrap(), &mut context).expression.to_string()
  }

  #[test]
  fn predicates() {
    assert_eq!(run("IntegerQ[3]"), "True");
    assert_eq!(run("IntegerQ[3/2]"), "False");
    assert_eq!(run("NumberQ[2.5]"), "True");
    assert_eq!(run("NumberQ[x]"), "False");
    assert_eq!(run("AtomQ[\"s\"]"), "True");
    assert_eq!(run("AtomQ[f[x]]"), "False");
  }

  #[test]
  fn parity() {
    assert_eq!(run("EvenQ[{1, 2, 3}]"), "{False, True, False}");
    assert_eq!(run("OddQ[-7]"), "True");
    assert_eq!(run("EvenQ[x]"), "False");
  }

  #[test]
  fn guarded_patterns() {
    let mut context = Context::new_global_context();
    evaluate(parse("half[n_?EvenQ] := n/2").unwrap(), &mut context);
    assert_eq!(evaluate(parse("{half[4], half[3]}").unwrap(), &mut context).expression.to_string(), "{2, half[3]}");
  }
}
