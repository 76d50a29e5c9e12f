/*!

Program Control Flow Built-ins

*/

use crate::{
  atom::{Atom, Symbol},
  attributes::Attribute,
  built_ins::BuiltinComponent,
  context::SYSTEM_CONTEXT,
  evaluate::Evaluation,
  logging::{Channel, log_with},
  matching::{display_solutions, SolutionSet},
};

pub(crate) static COMPONENTS: &[BuiltinComponent] = &[
  BuiltinComponent {
    name       : "If",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::HoldRest, Attribute::Protected],
    apply_rules: &[
      ("If[cond_, truepath_]", If),
      ("If[cond_, truepath_, falsepath_]", If),
      ("If[cond_, truepath_, falsepath_, otherpath_]", If),
    ],
    rules      : &[],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "CompoundExpression",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::HoldAll, Attribute::Protected],
    apply_rules: &[("CompoundExpression[xs___]", CompoundExpression)],
    rules      : &[],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "Evaluate",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::Protected],
    apply_rules: &[],
    rules      : &[("Evaluate[x_]", "x")],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "Null",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::Locked, Attribute::Protected],
    apply_rules: &[],
    rules      : &[],
    messages   : &[],
  },
];


/// Implements calls matching
///     `If[cond_, truepath_]`,
///     `If[cond_, truepath_, falsepath_]`, and
///     `If[cond_, truepath_, falsepath_, otherpath_]`.
/// A missing `falsepath` is `Null`. A condition that is neither `True` nor `False` selects `otherpath`, or leaves the
/// `If` unevaluated if there is none.
pub(crate) fn If(arguments: &SolutionSet, _: &Atom, _: &mut Evaluation) -> Option<Atom> {
  log_with(Channel::Debug, 4, || format!("If called with arguments {}", display_solutions(arguments)));

  // The condition has already been evaluated. We need only check its value. The chosen path is evaluated when the
  // evaluator continues with the result.
  let cond = arguments.get_str("cond")?;

  if cond.is_true() {
    arguments.get_str("truepath").cloned()
  } else if cond.is_false() {
    Some(arguments.get_str("falsepath").cloned().unwrap_or_else(Symbol::null))
  } else {
    arguments.get_str("otherpath").cloned()
  }
}

/// Implements calls matching the pattern `CompoundExpression[xs___]`. Evaluates the leaves in order, giving the value
/// of the last one.
pub(crate) fn CompoundExpression(_: &SolutionSet, original: &Atom, evaluation: &mut Evaluation) -> Option<Atom> {
  let mut result = Symbol::null();

  for leaf in original.leaves() {
    result = evaluation.evaluate(leaf.clone());
    if evaluation.is_halted() {
      break;
    }
  }

  Some(result)
}


#[cfg(test)]
mod tests {
  use crate::{context::Context, evaluate::evaluate, parse};

  fn run(text: &str) -> String {
    let mut context = Context::new_global_context();
    evaluate(parse(text).unwrap(), &mut context).expression.to_string()
  }

  #[test]
  fn if_test() {
    assert_eq!(run("If[1 < 2, yes, no]"), "yes");
    assert_eq!(run("If[2 < 1, yes, no]"), "no");
    assert_eq!(run("If[2 < 1, yes]"), "Null");
    assert_eq!(run("If[c, yes, no]"), "If[c, yes, no]");
    assert_eq!(run("If[c, yes, no, neither]"), "neither");
    assert_eq!(run("If[True, 1 + 1, 1/0]"), "2");
  }

  #[test]
  fn compound_expression() {
    assert_eq!(run("x = 2; y = x + 1; x * y"), "6");
    assert_eq!(run("a; b;"), "Null");
    assert_eq!(run("CompoundExpression[]"), "Null");
  }

  #[test]
  fn evaluate_in_held_position() {
    assert_eq!(run("Hold[1 + 1, Evaluate[1 + 1]]"), "Hold[Plus[1, 1], 2]");
  }
}
