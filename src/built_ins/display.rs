/*!

Functions that turn expressions into text.

*/

use std::str::FromStr;

use crate::{
  atom::Atom,
  attributes::Attribute,
  built_ins::{ArgumentCount, BuiltinComponent},
  context::SYSTEM_CONTEXT,
  evaluate::Evaluation,
  format::{DisplayForm, ExpressionFormatter, Formattable},
  interner::{interned, resolve_str},
  logging::{Channel, log_with},
  matching::{display_solutions, SolutionSet},
};

pub(crate) static COMPONENTS: &[BuiltinComponent] = &[
  BuiltinComponent {
    name       : "MakeBoxes",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::HoldAllComplete, Attribute::Protected],
    apply_rules: &[
      ("MakeBoxes[e_]", MakeBoxes),
      ("MakeBoxes[e_, form_Symbol]", MakeBoxes),
    ],
    rules      : &[],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "ToString",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::Protected],
    apply_rules: &[("ToString[e_]", ToString), ("ToString[xs___]", ArgumentCount)],
    rules      : &[],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "FullForm",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::Protected],
    apply_rules: &[("FullForm[e_]", FullForm)],
    rules      : &[],
    messages   : &[],
  },
];

fn render(expression: &Atom, form: DisplayForm) -> Atom {
  Atom::String(interned(&expression.format(&ExpressionFormatter::from(form))))
}

/// Implements calls matching the patterns `MakeBoxes[e_]` and `MakeBoxes[e_, form_Symbol]`. Gives the text of `e`
/// in the named form, `InputForm` if none is given.
pub(crate) fn MakeBoxes(arguments: &SolutionSet, _: &Atom, _: &mut Evaluation) -> Option<Atom> {
  log_with(Channel::Debug, 5, || format!("MakeBoxes called with arguments {}", display_solutions(arguments)));

  let form = match arguments.get_str("form") {
    Some(Atom::Symbol(name)) => DisplayForm::from_str(resolve_str(*name).as_str()).ok()?,
    _ => DisplayForm::Input
  };

  Some(render(arguments.get_str("e")?, form))
}

/// Implements calls matching the pattern `ToString[e_]`.
pub(crate) fn ToString(arguments: &SolutionSet, _: &Atom, _: &mut Evaluation) -> Option<Atom> {
  Some(render(arguments.get_str("e")?, DisplayForm::Input))
}

/// Implements calls matching the pattern `FullForm[e_]`.
pub(crate) fn FullForm(arguments: &SolutionSet, _: &Atom, _: &mut Evaluation) -> Option<Atom> {
  Some(render(arguments.get_str("e")?, DisplayForm::Full))
}
