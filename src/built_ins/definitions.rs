/*!

Built-ins that create, inspect, and remove definitions and attributes, and the attributes of the pattern heads.

*/

use std::str::FromStr;

use crate::{
  atom::{Atom, SExpression, Symbol},
  attributes::{self, Attribute},
  built_ins::{BuiltinComponent, collect_symbol_or_head_symbol, extract_condition},
  context::{ContextValueStore, SymbolValue, SYSTEM_CONTEXT},
  error::DefinitionError,
  evaluate::Evaluation,
  interner::{InternedString, resolve_str},
  logging::{Channel, log_with},
  matching::{display_solutions, SolutionSet},
};

pub(crate) static COMPONENTS: &[BuiltinComponent] = &[
  BuiltinComponent {
    name       : "Set",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::HoldFirst, Attribute::Protected, Attribute::SequenceHold],
    apply_rules: &[("Set[lhs_, rhs_]", Set)],
    rules      : &[],
    messages   : &[
      ("setraw", "Cannot assign to raw object `1`."),
    ],
  },
  BuiltinComponent {
    name       : "SetDelayed",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::HoldAll, Attribute::Protected, Attribute::SequenceHold],
    apply_rules: &[("SetDelayed[lhs_, rhs_]", SetDelayed)],
    rules      : &[],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "UpSet",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::HoldFirst, Attribute::Protected, Attribute::SequenceHold],
    apply_rules: &[("UpSet[lhs_, rhs_]", UpSet)],
    rules      : &[],
    messages   : &[
      ("nosym", "`1` does not contain a symbol to attach a rule to."),
    ],
  },
  BuiltinComponent {
    name       : "UpSetDelayed",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::HoldAll, Attribute::Protected, Attribute::SequenceHold],
    apply_rules: &[("UpSetDelayed[lhs_, rhs_]", UpSetDelayed)],
    rules      : &[],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "SetAttributes",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::HoldFirst, Attribute::Protected],
    apply_rules: &[("SetAttributes[s_, attributes_]", SetAttributes)],
    rules      : &[],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "ClearAttributes",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::HoldFirst, Attribute::Protected],
    apply_rules: &[("ClearAttributes[s_, attributes_]", ClearAttributes)],
    rules      : &[],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "Protect",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::HoldAll, Attribute::Protected],
    apply_rules: &[("Protect[s___]", Protect)],
    rules      : &[],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "Unprotect",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::HoldAll, Attribute::Protected],
    apply_rules: &[("Unprotect[s___]", Unprotect)],
    rules      : &[],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "Attributes",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::HoldAll, Attribute::Protected],
    apply_rules: &[("Attributes[s_Symbol]", Attributes)],
    rules      : &[],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "OwnValues",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::HoldAll, Attribute::Protected],
    apply_rules: &[("OwnValues[s_Symbol]", OwnValues)],
    rules      : &[],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "DownValues",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::HoldAll, Attribute::Protected],
    apply_rules: &[("DownValues[s_Symbol]", DownValues)],
    rules      : &[],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "UpValues",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::HoldAll, Attribute::Protected],
    apply_rules: &[("UpValues[s_Symbol]", UpValues)],
    rules      : &[],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "SubValues",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::HoldAll, Attribute::Protected],
    apply_rules: &[("SubValues[s_Symbol]", SubValues)],
    rules      : &[],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "Clear",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::HoldAll, Attribute::Protected],
    apply_rules: &[("Clear[s___]", Clear)],
    rules      : &[],
    messages   : &[],
  },
  // Pattern heads. Their attributes keep patterns intact while the expressions holding them are evaluated.
  BuiltinComponent {
    name       : "Rule",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::Protected, Attribute::SequenceHold],
    apply_rules: &[],
    rules      : &[],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "RuleDelayed",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::HoldRest, Attribute::Protected, Attribute::SequenceHold],
    apply_rules: &[],
    rules      : &[],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "Condition",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::HoldAll, Attribute::Protected],
    apply_rules: &[],
    rules      : &[],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "Pattern",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::HoldFirst, Attribute::Protected],
    apply_rules: &[],
    rules      : &[],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "Blank",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::Protected],
    apply_rules: &[],
    rules      : &[],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "BlankSequence",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::Protected],
    apply_rules: &[],
    rules      : &[],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "BlankNullSequence",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::Protected],
    apply_rules: &[],
    rules      : &[],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "Optional",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::Protected],
    apply_rules: &[],
    rules      : &[],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "Alternatives",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::Protected],
    apply_rules: &[],
    rules      : &[],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "PatternTest",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::HoldRest, Attribute::Protected],
    apply_rules: &[],
    rules      : &[],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "HoldPattern",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::HoldAll, Attribute::Protected],
    apply_rules: &[],
    rules      : &[],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "Verbatim",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::HoldAll, Attribute::Protected],
    apply_rules: &[],
    rules      : &[],
    messages   : &[],
  },
];


/// Turns a failed definition into a message.
fn report(error: DefinitionError, lhs: &Atom, evaluation: &mut Evaluation) {
  match error {
    DefinitionError::Protected(name) => {
      evaluation.message("General", "wrsym", vec![Symbol::from_str(&name)])
    }
    DefinitionError::Locked(name) => {
      evaluation.message("General", "locked", vec![Symbol::from_str(&name)])
    }
    DefinitionError::InvalidLeftHandSide(_) => {
      evaluation.message("Set", "setraw", vec![lhs.clone()])
    }
    DefinitionError::UnknownAttribute(name) => {
      evaluation.message("General", "attnf", vec![Symbol::from_str(&name)])
    }
  }
}

/// Stores `lhs :> rhs`. A condition on the right-hand side, `lhs := rhs /; test`, becomes part of the left-hand side.
fn define(original: &Atom, lhs: &Atom, rhs: &Atom, evaluation: &mut Evaluation) -> Result<Atom, DefinitionError> {
  let (rhs, condition) = extract_condition(rhs.clone());
  let lhs = match condition {
    Some(test) => SExpression::apply_binary("Condition", lhs.clone(), test),
    None => lhs.clone()
  };

  let symbol = evaluation.context_mut().define(original.clone(), lhs, rhs.clone())?;
  log_with(Channel::Debug, 4, || format!("Defined a rule for {}: {}", resolve_str(symbol), original));
  Ok(rhs)
}

/// Implements calls matching the pattern `Set[lhs_, rhs_]`. Gives the (evaluated) right-hand side.
pub(crate) fn Set(arguments: &SolutionSet, original: &Atom, evaluation: &mut Evaluation) -> Option<Atom> {
  log_with(Channel::Debug, 4, || format!("Set called with arguments {}", display_solutions(arguments)));

  let lhs = arguments.get_str("lhs")?;
  let rhs = arguments.get_str("rhs")?;

  match define(original, lhs, rhs, evaluation) {
    Ok(value) => Some(value),
    Err(error) => {
      report(error, lhs, evaluation);
      Some(rhs.clone())
    }
  }
}

/// Implements calls matching the pattern `SetDelayed[lhs_, rhs_]`. Gives `Null`.
pub(crate) fn SetDelayed(arguments: &SolutionSet, original: &Atom, evaluation: &mut Evaluation) -> Option<Atom> {
  log_with(Channel::Debug, 4, || format!("SetDelayed called with arguments {}", display_solutions(arguments)));

  let lhs = arguments.get_str("lhs")?;
  let rhs = arguments.get_str("rhs")?;

  if let Err(error) = define(original, lhs, rhs, evaluation) {
    report(error, lhs, evaluation);
  }
  Some(Symbol::null())
}

/// Attaches `lhs :> rhs` to every symbol that is a leaf of `lhs` or the head of a leaf of `lhs`.
fn up_define(original: &Atom, lhs: &Atom, rhs: &Atom, evaluation: &mut Evaluation) {
  let symbols = collect_symbol_or_head_symbol(lhs);
  if symbols.is_empty() {
    evaluation.message("UpSet", "nosym", vec![lhs.clone()]);
    return;
  }

  let (rhs, condition) = extract_condition(rhs.clone());
  let lhs = match condition {
    Some(test) => SExpression::apply_binary("Condition", lhs.clone(), test),
    None => lhs.clone()
  };

  for symbol in symbols {
    let value = SymbolValue::new_definition(original.clone(), lhs.clone(), rhs.clone());
    if let Err(error) = evaluation.context_mut().set_up_value(symbol, value) {
      report(error, &lhs, evaluation);
    }
  }
}

/// Implements calls matching the pattern `UpSet[lhs_, rhs_]`.
pub(crate) fn UpSet(arguments: &SolutionSet, original: &Atom, evaluation: &mut Evaluation) -> Option<Atom> {
  log_with(Channel::Debug, 4, || format!("UpSet called with arguments {}", display_solutions(arguments)));

  let lhs = arguments.get_str("lhs")?;
  let rhs = arguments.get_str("rhs")?;
  up_define(original, lhs, rhs, evaluation);
  Some(rhs.clone())
}

/// Implements calls matching the pattern `UpSetDelayed[lhs_, rhs_]`.
pub(crate) fn UpSetDelayed(arguments: &SolutionSet, original: &Atom, evaluation: &mut Evaluation) -> Option<Atom> {
  log_with(Channel::Debug, 4, || format!("UpSetDelayed called with arguments {}", display_solutions(arguments)));

  let lhs = arguments.get_str("lhs")?;
  let rhs = arguments.get_str("rhs")?;
  up_define(original, lhs, rhs, evaluation);
  Some(Symbol::null())
}


/// The symbols named by `s`, which is a symbol or a list of symbols.
fn symbols_of(s: &Atom) -> Vec<InternedString> {
  SExpression::extract_thing_or_list_of_things(s, |atom| {
    match atom {
      Atom::Symbol(name) => Some(*name),
      _ => None
    }
  })
}

/// The attributes named by `names`, a symbol or a list of symbols.
fn parse_attributes(names: &Atom) -> Result<attributes::Attributes, DefinitionError> {
  let names: Vec<&Atom> = match names {
    list if list.has_head("List") => list.leaves().iter().collect(),
    other => vec![other],
  };

  let mut result = attributes::Attributes::default();
  for name in names {
    let text = match name {
      Atom::Symbol(symbol) => resolve_str(*symbol),
      other => return Err(DefinitionError::UnknownAttribute(other.to_string())),
    };
    let attribute = Attribute::from_str(&text).map_err(|_| DefinitionError::UnknownAttribute(text.clone()))?;
    result.set(attribute);
  }
  Ok(result)
}

fn change_attributes(arguments: &SolutionSet, evaluation: &mut Evaluation, set: bool) -> Option<Atom> {
  let symbols = symbols_of(arguments.get_str("s")?);
  let attributes_atom = arguments.get_str("attributes")?;

  let attributes = match parse_attributes(attributes_atom) {
    Ok(attributes) => attributes,
    Err(error) => {
      report(error, attributes_atom, evaluation);
      return None;
    }
  };

  for symbol in symbols {
    let result = if set {
      evaluation.context_mut().set_attributes(symbol, attributes)
    } else {
      evaluation.context_mut().clear_attributes(symbol, attributes)
    };
    if let Err(error) = result {
      report(error, &Atom::Symbol(symbol), evaluation);
    }
  }

  Some(Symbol::null())
}

/// Implements calls matching the pattern `SetAttributes[s_, attributes_]`.
pub(crate) fn SetAttributes(arguments: &SolutionSet, _: &Atom, evaluation: &mut Evaluation) -> Option<Atom> {
  log_with(Channel::Debug, 4, || format!("SetAttributes called with arguments {}", display_solutions(arguments)));
  change_attributes(arguments, evaluation, true)
}

/// Implements calls matching the pattern `ClearAttributes[s_, attributes_]`.
pub(crate) fn ClearAttributes(arguments: &SolutionSet, _: &Atom, evaluation: &mut Evaluation) -> Option<Atom> {
  log_with(Channel::Debug, 4, || format!("ClearAttributes called with arguments {}", display_solutions(arguments)));
  change_attributes(arguments, evaluation, false)
}

fn change_protection(arguments: &SolutionSet, evaluation: &mut Evaluation, protect: bool) -> Option<Atom> {
  let symbols: Vec<InternedString> = arguments.get_sequence("s").iter().filter_map(|s| s.name()).collect();
  let mut changed = Vec::new();

  for symbol in symbols {
    let was_protected = evaluation.context().attributes_of(symbol).protected();
    let result = if protect {
      evaluation.context_mut().set_attributes(symbol, Attribute::Protected.into())
    } else {
      evaluation.context_mut().clear_attributes(symbol, Attribute::Protected.into())
    };
    match result {
      Ok(()) if was_protected != protect => changed.push(Atom::Symbol(symbol)),
      Ok(()) => { /* already as requested */ }
      Err(error) => report(error, &Atom::Symbol(symbol), evaluation),
    }
  }

  Some(SExpression::list(changed))
}

/// Implements calls matching the pattern `Protect[s___]`. Gives the symbols that were not protected before.
pub(crate) fn Protect(arguments: &SolutionSet, _: &Atom, evaluation: &mut Evaluation) -> Option<Atom> {
  change_protection(arguments, evaluation, true)
}

/// Implements calls matching the pattern `Unprotect[s___]`. Gives the symbols that were protected before.
pub(crate) fn Unprotect(arguments: &SolutionSet, _: &Atom, evaluation: &mut Evaluation) -> Option<Atom> {
  change_protection(arguments, evaluation, false)
}

/// Implements calls matching the pattern `Attributes[s_Symbol]`.
pub(crate) fn Attributes(arguments: &SolutionSet, _: &Atom, evaluation: &mut Evaluation) -> Option<Atom> {
  let symbol = arguments.get_str("s")?.name()?;
  Some(evaluation.context().attributes_of(symbol).to_atom())
}

fn values(arguments: &SolutionSet, evaluation: &mut Evaluation, store: ContextValueStore) -> Option<Atom> {
  let symbol = arguments.get_str("s")?.name()?;
  let rules = evaluation.context().rules_for(symbol, store);
  Some(SExpression::list(rules.iter().map(SymbolValue::to_atom).collect()))
}

/// Implements calls matching the pattern `OwnValues[s_Symbol]`.
pub(crate) fn OwnValues(arguments: &SolutionSet, _: &Atom, evaluation: &mut Evaluation) -> Option<Atom> {
  values(arguments, evaluation, ContextValueStore::OwnValues)
}

/// Implements calls matching the pattern `DownValues[s_Symbol]`.
pub(crate) fn DownValues(arguments: &SolutionSet, _: &Atom, evaluation: &mut Evaluation) -> Option<Atom> {
  values(arguments, evaluation, ContextValueStore::DownValues)
}

/// Implements calls matching the pattern `UpValues[s_Symbol]`.
pub(crate) fn UpValues(arguments: &SolutionSet, _: &Atom, evaluation: &mut Evaluation) -> Option<Atom> {
  values(arguments, evaluation, ContextValueStore::UpValues)
}

/// Implements calls matching the pattern `SubValues[s_Symbol]`.
pub(crate) fn SubValues(arguments: &SolutionSet, _: &Atom, evaluation: &mut Evaluation) -> Option<Atom> {
  values(arguments, evaluation, ContextValueStore::SubValues)
}

/// Implements calls matching the pattern `Clear[s___]`. Removes the values of each symbol but keeps its attributes.
pub(crate) fn Clear(arguments: &SolutionSet, _: &Atom, evaluation: &mut Evaluation) -> Option<Atom> {
  log_with(Channel::Debug, 4, || format!("Clear called with arguments {}", display_solutions(arguments)));

  for atom in arguments.get_sequence("s") {
    let symbol = match atom {
      Atom::Symbol(symbol) => symbol,
      _ => continue
    };
    if let Err(error) = evaluation.context_mut().clear_values(symbol) {
      report(error, &atom, evaluation);
    }
  }

  Some(Symbol::null())
}


#[cfg(test)]
mod tests {
  use crate::{context::Context, evaluate::evaluate, parse};

  fn run_all(context: &mut Context, inputs: &[&str]) -> String {
    let mut last = String::new();
    for input in inputs {
      last = evaluate(parse(input).unwrap(), context).expression.to_string();
    }
    last
  }

  fn run(inputs: &[&str]) -> String {
    let mut context = Context::new_global_context();
    run_all(&mut context, inputs)
  }

  #[test]
  fn set_and_set_delayed() {
    assert_eq!(run(&["x = 1 + 2", "x"]), "3");
    assert_eq!(run(&["f[x_] := x^2", "f[3]"]), "9");
    assert_eq!(run(&["x = 1 + 2"]), "3");
    assert_eq!(run(&["f[x_] := x^2"]), "Null");
  }

  #[test]
  fn later_definitions_replace_earlier_ones() {
    assert_eq!(run(&["f[x_] := 1", "f[x_] := 2", "f[0]"]), "2");
    assert_eq!(run(&["f[x_] := 1", "f[0] := 0", "{f[0], f[1]}"]), "{0, 1}");
  }

  #[test]
  fn conditional_definitions() {
    assert_eq!(run(&["sign[x_] := 1 /; x > 0", "sign[x_] := -1 /; x < 0", "{sign[5], sign[-5], sign[0]}"]),
               "{1, -1, sign[0]}");
  }

  #[test]
  fn up_values() {
    let mut context = Context::new_global_context();
    assert_eq!(run_all(&mut context, &["area[sq] ^= 4", "area[sq]"]), "4");
    assert_eq!(run_all(&mut context, &["UpValues[sq]"]), "{RuleDelayed[HoldPattern[area[sq]], 4]}");
    assert_eq!(run_all(&mut context, &["DownValues[area]"]), "{}");
  }

  #[test]
  fn attributes() {
    let mut context = Context::new_global_context();
    assert_eq!(run_all(&mut context, &["SetAttributes[g, {Orderless, Flat}]", "Attributes[g]"]), "{Flat, Orderless}");
    assert_eq!(run_all(&mut context, &["g[c, g[b, a]]"]), "g[a, b, c]");
    assert_eq!(run_all(&mut context, &["ClearAttributes[g, Flat]", "Attributes[g]"]), "{Orderless}");
    assert_eq!(run_all(&mut context, &["Attributes[Plus]"]),
               "{Flat, Listable, NumericFunction, OneIdentity, Orderless, Protected}");
  }

  #[test]
  fn unknown_attribute() {
    let mut context = Context::new_global_context();
    let result = evaluate(parse("SetAttributes[g, Sticky]").unwrap(), &mut context);
    assert_eq!(result.diagnostics[0].render(&context), "General::attnf: Sticky is not a known attribute.");
  }

  #[test]
  fn locked_symbols() {
    let mut context = Context::new_global_context();
    let result = evaluate(parse("ClearAttributes[List, Protected]").unwrap(), &mut context);
    assert_eq!(result.diagnostics[0].to_string(), "General::locked");
  }

  #[test]
  fn protection() {
    let mut context = Context::new_global_context();
    assert_eq!(run_all(&mut context, &["Unprotect[Plus, foo]"]), "{Plus}");
    assert_eq!(run_all(&mut context, &["Plus[a, a] := twice[a]", "a + a"]), "twice[a]");
    assert_eq!(run_all(&mut context, &["Protect[Plus]"]), "{Plus}");
    let result = evaluate(parse("Plus[b, b] := 0").unwrap(), &mut context);
    assert_eq!(result.diagnostics[0].to_string(), "General::wrsym");
  }

  #[test]
  fn clear() {
    let mut context = Context::new_global_context();
    assert_eq!(run_all(&mut context, &["x = 5", "Clear[x]", "x"]), "x");
    assert_eq!(run_all(&mut context, &["f[1] = 2", "OwnValues[f]"]), "{}");
    assert_eq!(run_all(&mut context, &["DownValues[f]"]), "{RuleDelayed[HoldPattern[f[1]], 2]}");
  }

  #[test]
  fn raw_assignment() {
    let mut context = Context::new_global_context();
    let result = evaluate(parse("3 = 4").unwrap(), &mut context);
    assert_eq!(result.diagnostics[0].render(&context), "Set::setraw: Cannot assign to raw object 3.");
  }
}
