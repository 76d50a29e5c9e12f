/*!

Built-in constants and functions.

Builtins are declared in static tables of `BuiltinComponent`s, one table per module, and installed into a `Context`
by `register_builtins`. A component gives the symbol's attributes, its native rules (a pattern and a Rust function),
its textual rules (a pattern and a right-hand side, both as source text), and its message templates.

A native rule's function receives the bindings of its pattern, the expression being evaluated, and the `Evaluation`.
Returning `None` declines the rule, and the evaluator moves on to the next rule.

*/
#![allow(non_snake_case)]

use lazy_static::lazy_static;

use crate::{
  abstractions::HashSet,
  atom::{Atom, SExpression},
  attributes::{Attribute, Attributes},
  context::{Context, SymbolValue, SYSTEM_CONTEXT, classify_lhs},
  error::{DefinitionError, RegistryError},
  evaluate::Evaluation,
  interner::{InternedString, interned, interned_static, resolve_str},
  logging::{log, log_with, Channel},
  matching::SolutionSet,
  parse,
  parsing::operator_names,
};

mod combinatorial;
mod control_flow;
mod definitions;
mod display;
mod logic;
mod numeric;
mod predicates;
mod structure;

/// The precision in bits of reals created from machine numbers and by `N`.
pub const DEFAULT_REAL_PRECISION: u32 = 53;

//                      f(substitutions, original_expression, evaluation) -> rewritten_expression
pub type BuiltinFn = fn(&SolutionSet, &Atom, &mut Evaluation) -> Option<Atom>;


/// The static declaration of a builtin symbol.
pub struct BuiltinComponent {
  pub name       : &'static str,
  pub context    : &'static str,
  pub attributes : &'static [Attribute],
  /// Native rules: a pattern and the function implementing it.
  pub apply_rules: &'static [(&'static str, BuiltinFn)],
  /// Textual rules: `lhs :> rhs`, both as source text.
  pub rules      : &'static [(&'static str, &'static str)],
  /// Message templates by tag.
  pub messages   : &'static [(&'static str, &'static str)],
}

/// The outcome of running the registry over a context.
#[derive(Clone, Debug, Default)]
pub struct RegistryReport {
  pub registered: Vec<String>,
  pub skipped   : Vec<(String, RegistryError)>,
}


/// Message templates shared by all symbols.
static MESSAGES: &[BuiltinComponent] = &[
  BuiltinComponent {
    name       : "General",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::Protected],
    apply_rules: &[],
    rules      : &[],
    messages   : &[
      ("itlim",  "Iteration limit of `1` exceeded."),
      ("reclim", "Recursion depth of `1` exceeded."),
      ("argx",   "`1` called with `2` arguments; 1 argument is expected."),
      ("wrsym",  "Symbol `1` is Protected."),
      ("locked", "Symbol `1` is locked."),
      ("attnf",  "`1` is not a known attribute."),
    ],
  },
  BuiltinComponent {
    name       : "Thread",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::Protected],
    apply_rules: &[],
    rules      : &[],
    messages   : &[
      ("tdlen", "Objects of unequal length in `1` cannot be combined."),
    ],
  },
];

/// The component tables in registration order. `MakeBoxes` comes first.
static COMPONENT_TABLES: &[&[BuiltinComponent]] = &[
  display::COMPONENTS,
  numeric::COMPONENTS,
  logic::COMPONENTS,
  predicates::COMPONENTS,
  control_flow::COMPONENTS,
  structure::COMPONENTS,
  definitions::COMPONENTS,
  combinatorial::COMPONENTS,
  MESSAGES,
];


/// System symbols that have no component of their own.
static SYSTEM_SYMBOLS: &[&str] = &[
  "BuiltIn",
  "Default",
  "Integer",
  "Real",
  "String",
  "Symbol",
  "$IterationLimit",
  "$RecursionLimit",
];

lazy_static! {
  static ref SYSTEM_NAMES: HashSet<&'static str> =
    COMPONENT_TABLES.iter()
                    .flat_map(|table| table.iter())
                    .filter(|component| component.context == SYSTEM_CONTEXT)
                    .map(|component| component.name)
                    .chain(operator_names())
                    .chain(SYSTEM_SYMBOLS.iter().copied())
                    .collect();
}

/// Is the bare name `name` a symbol of the `System`` context?
pub fn is_system_name(name: &str) -> bool {
  SYSTEM_NAMES.contains(name)
}


/// Installs every builtin component into `context`. A component whose rules do not parse is skipped as a whole and
/// listed in the report. Fails if the registry has already run on `context`.
pub(crate) fn register_builtins(context: &mut Context) -> Result<RegistryReport, RegistryError> {
  if context.builtins_contributed() {
    return Err(RegistryError::AlreadyContributed);
  }
  context.mark_builtins_contributed();

  let mut report = RegistryReport::default();

  for component in COMPONENT_TABLES.iter().flat_map(|table| table.iter()) {
    match register_component(component, context) {
      Ok(()) => report.registered.push(component.name.to_string()),
      Err(error) => {
        log(Channel::Error, 1, format!("Could not register {}: {}", component.name, error).as_str());
        report.skipped.push((component.name.to_string(), error));
      }
    }
  }

  // Operators the parser knows about get a record even without any definitions.
  let system = interned_static(SYSTEM_CONTEXT);
  for name in operator_names() {
    let symbol = interned(name);
    if context.get_symbol(symbol).is_none() {
      log_with(Channel::Debug, 5, || format!("Declaring operator symbol {}", name));
      context.declare_symbol(symbol, system);
    }
  }

  Ok(report)
}

fn invalid_rule(component: &BuiltinComponent, rule: &str, reason: String) -> RegistryError {
  RegistryError::InvalidRule {
    symbol: component.name.to_string(),
    rule  : rule.to_string(),
    reason
  }
}

fn register_component(component: &BuiltinComponent, context: &mut Context) -> Result<(), RegistryError> {
  // Parse every rule and check every target before touching the context, so that a bad component leaves no trace.
  let mut values: Vec<(InternedString, crate::context::ContextValueStore, SymbolValue)> = Vec::new();

  for (pattern, built_in) in component.apply_rules {
    let lhs = parse(pattern).map_err(|e| invalid_rule(component, pattern, e.to_string()))?;
    let (symbol, store) = classify_lhs(&lhs).map_err(|e| invalid_rule(component, pattern, e.to_string()))?;
    values.push((symbol, store, SymbolValue::new_built_in(lhs, *built_in)));
  }

  for (lhs_text, rhs_text) in component.rules {
    let lhs = parse(lhs_text).map_err(|e| invalid_rule(component, lhs_text, e.to_string()))?;
    let rhs = parse(rhs_text).map_err(|e| invalid_rule(component, rhs_text, e.to_string()))?;
    let (symbol, store) = classify_lhs(&lhs).map_err(|e| invalid_rule(component, lhs_text, e.to_string()))?;
    let def = SExpression::apply_binary("RuleDelayed", lhs.clone(), rhs.clone());
    values.push((symbol, store, SymbolValue::new_definition(def, lhs, rhs)));
  }

  let name = interned(component.name);

  // Every write below must succeed once the first one is made, so refuse the component up front if any target is
  // already write-protected.
  if context.attributes_of(name).locked() {
    return Err(invalid_rule(component, component.name, DefinitionError::Locked(component.name.to_string()).to_string()));
  }
  if let Some((symbol, _, _)) = values.iter().find(|(symbol, _, _)| context.attributes_of(*symbol).protected()) {
    let reason = DefinitionError::Protected(resolve_str(*symbol)).to_string();
    return Err(invalid_rule(component, component.name, reason));
  }

  context.declare_symbol(name, interned(component.context));

  // Native rules come first, so that they win over textual rules of the same specificity. Rules go in before the
  // attributes, which usually include `Protected`.
  for (symbol, store, value) in values {
    context.set_value(symbol, store, value)
           .map_err(|e| invalid_rule(component, component.name, e.to_string()))?;
  }

  for (tag, template) in component.messages {
    context.set_message(name, interned(tag), template);
  }

  let attributes: Attributes = component.attributes.into();
  context.set_attributes(name, attributes)
         .map_err(|e| invalid_rule(component, component.name, e.to_string()))?;

  Ok(())
}


// region utilities

/// If `atom` has the form `Condition[exp1, exp2]`, gives `(exp1, Some(exp2))`. Otherwise, gives `(atom, None)`.
pub fn extract_condition(atom: Atom) -> (Atom, Option<Atom>) {
  match atom {

    Atom::SExpression(ref children) if children.len() == 3 && atom.has_head("Condition") => {
      (children[1].clone(), Some(children[2].clone()))
    }

    _ => (atom, None)
  }
}

/// The symbols that are leaves of `expression`, or heads of its compound leaves, the symbols an up-value for
/// `expression` is attached to.
pub fn collect_symbol_or_head_symbol(expression: &Atom) -> Vec<InternedString> {
  let mut symbols: Vec<InternedString> = Vec::new();

  for leaf in expression.leaves() {
    let symbol = match leaf {
      Atom::Symbol(name) => Some(*name),
      Atom::SExpression(_) if !crate::matching::is_pattern_expression(leaf) => leaf.innermost_name(),
      _ => None
    };
    if let Some(symbol) = symbol {
      if !symbols.contains(&symbol) {
        symbols.push(symbol);
      }
    }
  }

  symbols
}

/// Emits `General::argx` for single argument functions called with another number of arguments. Always declines.
pub(crate) fn ArgumentCount(_: &SolutionSet, original: &Atom, evaluation: &mut Evaluation) -> Option<Atom> {
  if original.len() != 1 {
    evaluation.message("General", "argx", vec![original.head(), Atom::from_i64(original.len() as i64)]);
  }
  None
}

// endregion


#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    context::ContextValueStore,
    evaluate::evaluate,
    interner::interned_static,
    atom::Symbol
  };

  #[test]
  fn register_builtins_test() {
    let mut context = Context::without_built_ins();
    let report = register_builtins(&mut context).unwrap();
    assert!(report.skipped.is_empty(), "{:?}", report.skipped);
    assert_eq!(report.registered.first().map(String::as_str), Some("MakeBoxes"));
    assert!(context.attributes_of(interned_static("Plus")).orderless());
    assert!(context.attributes_of(interned_static("Plus")).protected());
  }

  #[test]
  fn registry_runs_once() {
    let mut context = Context::new_global_context();
    assert_eq!(register_builtins(&mut context).unwrap_err(), RegistryError::AlreadyContributed);
  }

  #[test]
  fn operator_symbols_are_declared() {
    let context = Context::new_global_context();
    for name in operator_names() {
      assert!(context.get_symbol(interned(name)).is_some(), "{}", name);
    }
    let record = context.get_symbol(interned_static("Plus")).unwrap();
    assert_eq!(record.context, Some(interned_static(SYSTEM_CONTEXT)));
  }

  #[test]
  fn native_rules_before_textual_rules() {
    let context = Context::new_global_context();
    let rules = context.rules_for(interned_static("Binomial"), ContextValueStore::DownValues);
    assert!(matches!(rules[0], SymbolValue::BuiltIn { .. }));
  }

  #[test]
  fn protected_builtins_reject_definitions() {
    let mut context = Context::new_global_context();
    let result = evaluate(parse("Plus[x_, y_] := 0").unwrap(), &mut context);
    assert_eq!(result.diagnostics[0].to_string(), "General::wrsym");
    assert_eq!(result.diagnostics[0].arguments, vec![Symbol::from_static_str("Plus")]);
  }

  #[test]
  fn argument_count_message() {
    let mut context = Context::new_global_context();
    let result = evaluate(parse("Length[a, b]").unwrap(), &mut context);
    assert_eq!(result.expression.to_string(), "Length[a, b]");
    assert_eq!(
      result.diagnostics[0].render(&context),
      "General::argx: Length called with 2 arguments; 1 argument is expected."
    );
  }

  static BROKEN: BuiltinComponent = BuiltinComponent {
    name       : "broken",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::Protected],
    apply_rules: &[],
    rules      : &[("broken[x_]", "x"), ("broken[x_", "x")],
    messages   : &[("usage", "never installed")],
  };

  static INTRUDER: BuiltinComponent = BuiltinComponent {
    name       : "intruder",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::Protected],
    apply_rules: &[],
    rules      : &[("intruder[x_]", "x"), ("Plus[intruder, x_]", "x")],
    messages   : &[],
  };

  static WELL_FORMED: BuiltinComponent = BuiltinComponent {
    name       : "wellFormed",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::Protected],
    apply_rules: &[],
    rules      : &[("wellFormed[x_]", "{x}")],
    messages   : &[],
  };

  #[test]
  fn malformed_component_leaves_no_trace() {
    let mut context = Context::new_global_context();

    let error = register_component(&BROKEN, &mut context).unwrap_err();
    assert!(matches!(&error, RegistryError::InvalidRule { symbol, rule, .. } if symbol == "broken" && rule == "broken[x_"));
    assert!(context.get_symbol(interned_static("broken")).is_none());

    register_component(&WELL_FORMED, &mut context).unwrap();
    assert!(context.attributes_of(interned_static("wellFormed")).protected());
    assert_eq!(evaluate(parse("wellFormed[3]").unwrap(), &mut context).expression.to_string(), "{3}");
  }

  #[test]
  fn component_targeting_protected_symbol_leaves_no_trace() {
    let mut context = Context::new_global_context();
    let plus_rules = context.rules_for(interned_static("Plus"), ContextValueStore::DownValues).len();

    let error = register_component(&INTRUDER, &mut context).unwrap_err();
    assert!(matches!(&error, RegistryError::InvalidRule { reason, .. } if reason == "symbol Plus is Protected"));
    assert!(context.get_symbol(interned_static("intruder")).is_none());
    assert_eq!(context.rules_for(interned_static("Plus"), ContextValueStore::DownValues).len(), plus_rules);
  }

  #[test]
  fn extract_condition_test() {
    let atom = parse("Condition[exp1, exp2]").unwrap();
    assert_eq!(extract_condition(atom), (Symbol::from_static_str("exp1"), Some(Symbol::from_static_str("exp2"))));

    let atom = parse("3.5*f[1+x, y]").unwrap();
    assert_eq!(extract_condition(atom.clone()), (atom, None));
  }

  #[test]
  fn up_value_symbols() {
    let symbols = collect_symbol_or_head_symbol(&parse("g[a, f[x_], 2, y_]").unwrap());
    assert_eq!(symbols, vec![interned_static("a"), interned_static("f")]);
  }
}
