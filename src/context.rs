/*!

A `Context` is the definitions store: a symbol table that holds the values, definitions, attributes, and message
templates for symbols. It is the `Context` that owns expressions related to a symbol. A symbol's record is created
the first time the symbol is written to; reading a symbol that has no record gives empty values.

Rule lists live behind an `Rc` and are replaced copy-on-write. The evaluator takes an `Rc` snapshot of a list before
scanning it, so a definition made while a rule is being applied never alters the scan in progress.

Rules are kept ordered by the specificity of their left-hand sides, more specific first. Rules of equal specificity
keep the order in which they were defined. A rule whose left-hand side (including any condition) is structurally
equal to an existing rule's replaces it in place.

*/

use std::{
  fmt::{Debug, Formatter},
  rc::Rc
};

use crate::{
  abstractions::HashMap,
  atom::{Atom, SExpression, Symbol},
  attributes::Attributes,
  built_ins::{BuiltinFn, RegistryReport, register_builtins},
  error::DefinitionError,
  interner::{InternedString, interned, interned_static, resolve_str},
  logging::{log, Channel},
  matching::{Pattern, Specificity},
};

/// The context symbols are created in unless their name says otherwise.
pub const GLOBAL_CONTEXT: &str = "Global`";
/// The context of builtin symbols.
pub const SYSTEM_CONTEXT: &str = "System`";


/// The lists a rule can be stored in.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum ContextValueStore {
  /// `x :> value`, applied to the symbol appearing alone.
  OwnValues,
  /// `f[pattern] :> value`, applied to expressions with the symbol as head.
  DownValues,
  /// `g[…, f[…], …] :> value`, applied to expressions having the symbol as (the head of) a leaf. Tried before
  /// down-values.
  UpValues,
  /// `f[pattern][pattern] :> value`, applied to expressions whose head is an expression headed by the symbol.
  SubValues,
}


/// A `SymbolValue` is a rule stored in a symbol table as an own/up/down/sub value. It keeps the expression that
/// originally created it and the compiled pattern of its left-hand side.
#[derive(Clone)]
pub enum SymbolValue {
  Definitions {
    /// The (sub)expression used to create this `SymbolValue`.
    def    : Atom,
    /// Treated as if wrapped in `HoldPattern`. A condition on the rule is part of `lhs` as `Condition[lhs, test]`.
    lhs    : Atom,
    pattern: Pattern,
    rhs    : Atom,
  },
  BuiltIn {
    lhs     : Atom,
    pattern : Pattern,
    built_in: BuiltinFn,
  },
}

impl SymbolValue {
  /// A rule with a textual right-hand side.
  pub fn new_definition(def: Atom, lhs: Atom, rhs: Atom) -> SymbolValue {
    let pattern = Pattern::compile(&lhs);
    SymbolValue::Definitions { def, lhs, pattern, rhs }
  }

  /// A rule with a native right-hand side.
  pub fn new_built_in(lhs: Atom, built_in: BuiltinFn) -> SymbolValue {
    let pattern = Pattern::compile(&lhs);
    SymbolValue::BuiltIn { lhs, pattern, built_in }
  }

  pub fn lhs(&self) -> &Atom {
    match self {
      SymbolValue::Definitions { lhs, .. }
      | SymbolValue::BuiltIn { lhs, .. } => lhs
    }
  }

  pub fn pattern(&self) -> &Pattern {
    match self {
      SymbolValue::Definitions { pattern, .. }
      | SymbolValue::BuiltIn { pattern, .. } => pattern
    }
  }

  pub fn specificity(&self) -> Specificity {
    self.pattern().specificity()
  }

  /// The rule as an expression, `HoldPattern[lhs] :> rhs`. Native rules show `BuiltIn` as their right-hand side.
  pub fn to_atom(&self) -> Atom {
    let rhs = match self {
      SymbolValue::Definitions { rhs, .. } => rhs.clone(),
      SymbolValue::BuiltIn { .. } => Symbol::from_static_str("BuiltIn"),
    };
    SExpression::apply_binary(
      "RuleDelayed",
      SExpression::apply_unary("HoldPattern", self.lhs().clone()),
      rhs
    )
  }
}

impl Debug for SymbolValue {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.to_atom())
  }
}


#[derive(Clone, Default, Debug)]
pub struct SymbolRecord {
  /// The context the symbol was created in.
  pub context    : Option<InternedString>,
  pub attributes : Attributes,
  pub own_values : Rc<Vec<SymbolValue>>,
  pub up_values  : Rc<Vec<SymbolValue>>,
  pub down_values: Rc<Vec<SymbolValue>>,
  pub sub_values : Rc<Vec<SymbolValue>>,
  /// Message templates by tag.
  pub messages   : HashMap<InternedString, String>,
}

impl SymbolRecord {
  fn values(&self, store: ContextValueStore) -> &Rc<Vec<SymbolValue>> {
    match store {
      ContextValueStore::OwnValues  => &self.own_values,
      ContextValueStore::DownValues => &self.down_values,
      ContextValueStore::UpValues   => &self.up_values,
      ContextValueStore::SubValues  => &self.sub_values,
    }
  }

  fn values_mut(&mut self, store: ContextValueStore) -> &mut Rc<Vec<SymbolValue>> {
    match store {
      ContextValueStore::OwnValues  => &mut self.own_values,
      ContextValueStore::DownValues => &mut self.down_values,
      ContextValueStore::UpValues   => &mut self.up_values,
      ContextValueStore::SubValues  => &mut self.sub_values,
    }
  }
}


pub struct Context {
  name                : InternedString,
  symbols             : HashMap<InternedString, SymbolRecord>,
  builtins_contributed: bool,
}

impl Context {

  /// A context populated by the builtin registry.
  pub fn new_global_context() -> Context {
    let mut context = Context::without_built_ins();
    match register_builtins(&mut context) {
      Ok(report) => log_registry_report(&report),
      Err(error) => log(Channel::Error, 1, error.to_string().as_str()),
    }
    context
  }

  /// An empty context. Useful for tests and for sessions that install their own definitions.
  pub fn without_built_ins() -> Context {
    Context {
      name                : interned_static(GLOBAL_CONTEXT),
      symbols             : HashMap::default(),
      builtins_contributed: false,
    }
  }

  pub fn name(&self) -> InternedString {
    self.name
  }

  pub fn builtins_contributed(&self) -> bool {
    self.builtins_contributed
  }

  pub(crate) fn mark_builtins_contributed(&mut self) {
    self.builtins_contributed = true;
  }

  pub fn get_symbol(&self, symbol: InternedString) -> Option<&SymbolRecord> {
    self.symbols.get(&symbol)
  }

  /// Gets the record for `symbol`, creating it if it does not exist. A new record is placed in the context named by
  /// the symbol, or in the default context of its bare name.
  pub fn get_symbol_mut(&mut self, symbol: InternedString) -> &mut SymbolRecord {
    self.symbols.entry(symbol).or_insert_with(|| {
      SymbolRecord {
        context: Some(interned(Symbol::context_of(&resolve_str(symbol)))),
        ..SymbolRecord::default()
      }
    })
  }

  /// Creates the record for `symbol` in `context` if it does not exist yet.
  pub fn declare_symbol(&mut self, symbol: InternedString, context: InternedString) {
    self.symbols.entry(symbol).or_insert_with(|| {
      SymbolRecord {
        context: Some(context),
        ..SymbolRecord::default()
      }
    });
  }

  pub fn symbol_count(&self) -> usize {
    self.symbols.len()
  }

  // region Attributes

  pub fn attributes_of(&self, symbol: InternedString) -> Attributes {
    self.symbols.get(&symbol).map(|record| record.attributes).unwrap_or_default()
  }

  /// Adds `attributes` to the attributes of `symbol`.
  pub fn set_attributes(&mut self, symbol: InternedString, attributes: Attributes) -> Result<(), DefinitionError> {
    self.check_unlocked(symbol)?;
    self.get_symbol_mut(symbol).attributes.update(attributes);
    Ok(())
  }

  /// Removes `attributes` from the attributes of `symbol`.
  pub fn clear_attributes(&mut self, symbol: InternedString, attributes: Attributes) -> Result<(), DefinitionError> {
    self.check_unlocked(symbol)?;
    if let Some(record) = self.symbols.get_mut(&symbol) {
      record.attributes.remove(attributes);
    }
    Ok(())
  }

  fn check_unlocked(&self, symbol: InternedString) -> Result<(), DefinitionError> {
    if self.attributes_of(symbol).locked() {
      Err(DefinitionError::Locked(resolve_str(symbol)))
    } else {
      Ok(())
    }
  }

  fn check_unprotected(&self, symbol: InternedString) -> Result<(), DefinitionError> {
    if self.attributes_of(symbol).protected() {
      Err(DefinitionError::Protected(resolve_str(symbol)))
    } else {
      Ok(())
    }
  }

  // endregion

  // region Values

  /// Stores a rule `lhs :> rhs`, choosing the list from the form of `lhs`: a symbol gets an own-value, an expression
  /// with a symbolic head a down-value, and an expression with a compound head a sub-value of its innermost head.
  /// Returns the symbol the rule is stored under.
  pub fn define(&mut self, def: Atom, lhs: Atom, rhs: Atom) -> Result<InternedString, DefinitionError> {
    let (symbol, store) = classify_lhs(&lhs)?;
    self.set_value(symbol, store, SymbolValue::new_definition(def, lhs, rhs))?;
    Ok(symbol)
  }

  pub fn set_own_value(&mut self, symbol: InternedString, value: SymbolValue) -> Result<(), DefinitionError> {
    self.set_value(symbol, ContextValueStore::OwnValues, value)
  }

  pub fn set_down_value(&mut self, symbol: InternedString, value: SymbolValue) -> Result<(), DefinitionError> {
    self.set_value(symbol, ContextValueStore::DownValues, value)
  }

  pub fn set_up_value(&mut self, symbol: InternedString, value: SymbolValue) -> Result<(), DefinitionError> {
    self.set_value(symbol, ContextValueStore::UpValues, value)
  }

  pub fn set_sub_value(&mut self, symbol: InternedString, value: SymbolValue) -> Result<(), DefinitionError> {
    self.set_value(symbol, ContextValueStore::SubValues, value)
  }

  /// Inserts `value` into the given list of `symbol`, replacing a rule with the same left-hand side.
  pub fn set_value(&mut self, symbol: InternedString, store: ContextValueStore, value: SymbolValue)
    -> Result<(), DefinitionError>
  {
    self.check_unprotected(symbol)?;
    let list = self.get_symbol_mut(symbol).values_mut(store);
    insert_rule(Rc::make_mut(list), value);
    Ok(())
  }

  /// A snapshot of the rules of `symbol` in the given list.
  pub fn rules_for(&self, symbol: InternedString, store: ContextValueStore) -> Rc<Vec<SymbolValue>> {
    match self.symbols.get(&symbol) {
      Some(record) => record.values(store).clone(),
      None => Rc::new(Vec::new())
    }
  }

  /// Removes every own, down, up, and sub value of `symbol`. Attributes and messages are kept.
  pub fn clear_values(&mut self, symbol: InternedString) -> Result<(), DefinitionError> {
    self.check_unprotected(symbol)?;
    if let Some(record) = self.symbols.get_mut(&symbol) {
      record.own_values  = Rc::new(Vec::new());
      record.down_values = Rc::new(Vec::new());
      record.up_values   = Rc::new(Vec::new());
      record.sub_values  = Rc::new(Vec::new());
    }
    Ok(())
  }

  /// The value of `symbol` if it has an unconditional own-value with a textual right-hand side.
  pub fn own_value(&self, symbol: InternedString) -> Option<Atom> {
    let record = self.symbols.get(&symbol)?;
    record.own_values.iter().find_map(|value| {
      match value {
        SymbolValue::Definitions { lhs: Atom::Symbol(_), rhs, .. } => Some(rhs.clone()),
        _ => None
      }
    })
  }

  /// The default for an `Optional` leaf of `symbol`, given by a rule `Default[symbol] = value`.
  pub fn default_value(&self, symbol: InternedString) -> Option<Atom> {
    let key = SExpression::new(Symbol::from_static_str("Default"), vec![Atom::Symbol(symbol)]);
    self.rules_for(interned_static("Default"), ContextValueStore::DownValues)
        .iter()
        .find_map(|value| {
          match value {
            SymbolValue::Definitions { lhs, rhs, .. } if *lhs == key => Some(rhs.clone()),
            _ => None
          }
        })
  }

  // endregion

  // region Messages

  pub fn set_message(&mut self, symbol: InternedString, tag: InternedString, template: &str) {
    self.get_symbol_mut(symbol).messages.insert(tag, template.to_string());
  }

  pub fn message_template(&self, symbol: InternedString, tag: InternedString) -> Option<String> {
    self.symbols.get(&symbol)?.messages.get(&tag).cloned()
  }

  // endregion
}


/// Finds the symbol and list a rule with left-hand side `lhs` belongs to.
pub fn classify_lhs(lhs: &Atom) -> Result<(InternedString, ContextValueStore), DefinitionError> {
  let unwrapped = strip_lhs_wrappers(lhs);
  match unwrapped {
    Atom::Symbol(name) => Ok((*name, ContextValueStore::OwnValues)),
    Atom::SExpression(children) => {
      match &children[0] {
        Atom::Symbol(name) => Ok((*name, ContextValueStore::DownValues)),
        head @ Atom::SExpression(_) => {
          match head.innermost_name() {
            Some(name) => Ok((name, ContextValueStore::SubValues)),
            None => Err(DefinitionError::InvalidLeftHandSide(lhs.to_string()))
          }
        }
        _ => Err(DefinitionError::InvalidLeftHandSide(lhs.to_string()))
      }
    }
    _ => Err(DefinitionError::InvalidLeftHandSide(lhs.to_string()))
  }
}

/// Strips `Condition`, `HoldPattern`, and `PatternTest` from the outside of a left-hand side.
fn strip_lhs_wrappers(lhs: &Atom) -> &Atom {
  match lhs {
    Atom::SExpression(children)
    if (lhs.has_head("Condition") || lhs.has_head("PatternTest")) && children.len() == 3 => {
      strip_lhs_wrappers(&children[1])
    }
    Atom::SExpression(children) if lhs.has_head("HoldPattern") && children.len() == 2 => {
      strip_lhs_wrappers(&children[1])
    }
    _ => lhs
  }
}

fn insert_rule(rules: &mut Vec<SymbolValue>, value: SymbolValue) {
  if let Some(existing) = rules.iter_mut().find(|rule| rule.lhs() == value.lhs()) {
    *existing = value;
    return;
  }
  let key = value.specificity();
  let position = rules.iter().position(|rule| rule.specificity() > key).unwrap_or(rules.len());
  rules.insert(position, value);
}

fn log_registry_report(report: &RegistryReport) {
  for (name, error) in report.skipped.iter() {
    log(Channel::Error, 1, format!("Skipped builtin {}: {}", name, error).as_str());
  }
  log(
    Channel::Info,
    3,
    format!("Registered {} builtin components.", report.registered.len()).as_str()
  );
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::{attributes::Attribute, parse};

  fn define(context: &mut Context, lhs: &str, rhs: &str) -> Result<InternedString, DefinitionError> {
    let lhs = parse(lhs).unwrap();
    let rhs = parse(rhs).unwrap();
    let def = SExpression::apply_binary("SetDelayed", lhs.clone(), rhs.clone());
    context.define(def, lhs, rhs)
  }

  fn lhs_list(context: &Context, symbol: &'static str, store: ContextValueStore) -> Vec<String> {
    context.rules_for(interned_static(symbol), store).iter().map(|v| v.lhs().to_string()).collect()
  }

  #[test]
  fn define_infers_role() {
    let mut context = Context::without_built_ins();
    assert_eq!(define(&mut context, "x", "1").unwrap(), interned_static("x"));
    assert_eq!(define(&mut context, "f[x_]", "x").unwrap(), interned_static("f"));
    assert_eq!(define(&mut context, "g[a][y_]", "y").unwrap(), interned_static("g"));
    assert_eq!(lhs_list(&context, "x", ContextValueStore::OwnValues), vec!["x"]);
    assert_eq!(lhs_list(&context, "f", ContextValueStore::DownValues), vec!["f[x_]"]);
    assert_eq!(lhs_list(&context, "g", ContextValueStore::SubValues), vec!["g[a][y_]"]);
    assert!(define(&mut context, "3", "4").is_err());
  }

  #[test]
  fn rules_ordered_by_specificity() {
    let mut context = Context::without_built_ins();
    define(&mut context, "f[x__]", "1").unwrap();
    define(&mut context, "f[x_]", "2").unwrap();
    define(&mut context, "f[0]", "3").unwrap();
    define(&mut context, "f[x_Integer]", "4").unwrap();
    define(&mut context, "f[y_]", "5").unwrap();
    assert_eq!(
      lhs_list(&context, "f", ContextValueStore::DownValues),
      vec!["f[0]", "f[x_Integer]", "f[x_]", "f[y_]", "f[x__]"]
    );
  }

  #[test]
  fn identical_lhs_replaces() {
    let mut context = Context::without_built_ins();
    define(&mut context, "f[x_]", "1").unwrap();
    define(&mut context, "f[x_]", "2").unwrap();
    let rules = context.rules_for(interned_static("f"), ContextValueStore::DownValues);
    assert_eq!(rules.len(), 1);
    assert!(matches!(&rules[0], SymbolValue::Definitions { rhs, .. } if *rhs == Atom::from_i64(2)));
  }

  #[test]
  fn snapshots_are_isolated() {
    let mut context = Context::without_built_ins();
    define(&mut context, "f[1]", "1").unwrap();
    let snapshot = context.rules_for(interned_static("f"), ContextValueStore::DownValues);
    define(&mut context, "f[2]", "2").unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(context.rules_for(interned_static("f"), ContextValueStore::DownValues).len(), 2);
  }

  #[test]
  fn protected_and_locked() {
    let mut context = Context::without_built_ins();
    context.set_attributes(interned_static("p"), Attribute::Protected.into()).unwrap();
    assert_eq!(define(&mut context, "p[x_]", "x"), Err(DefinitionError::Protected("p".to_string())));
    assert!(context.clear_values(interned_static("p")).is_err());

    context.set_attributes(interned_static("q"), Attribute::Locked.into()).unwrap();
    assert_eq!(
      context.set_attributes(interned_static("q"), Attribute::Flat.into()),
      Err(DefinitionError::Locked("q".to_string()))
    );
  }

  #[test]
  fn records_take_the_symbol_context() {
    let mut context = Context::without_built_ins();
    define(&mut context, "x", "1").unwrap();
    define(&mut context, "A`y", "2").unwrap();
    assert_eq!(context.get_symbol(interned_static("x")).unwrap().context, Some(interned_static(GLOBAL_CONTEXT)));
    assert_eq!(context.get_symbol(interned_static("A`y")).unwrap().context, Some(interned_static("A`")));
    // `Global`x` is spelled `x`, so both name the same record.
    assert_eq!(lhs_list(&context, "x", ContextValueStore::OwnValues), vec!["x"]);
    define(&mut context, "Global`x", "3").unwrap();
    assert_eq!(context.rules_for(interned_static("x"), ContextValueStore::OwnValues).len(), 1);
    assert_eq!(context.own_value(interned_static("x")), Some(Atom::from_i64(3)));
  }

  #[test]
  fn default_values() {
    let mut context = Context::without_built_ins();
    define(&mut context, "Default[f]", "0").unwrap();
    assert_eq!(context.default_value(interned_static("f")), Some(Atom::from_i64(0)));
    assert_eq!(context.default_value(interned_static("g")), None);
  }

  #[test]
  fn messages() {
    let mut context = Context::without_built_ins();
    context.set_message(interned_static("f"), interned_static("argx"), "`1` called with `2` arguments.");
    assert!(context.message_template(interned_static("f"), interned_static("argx")).is_some());
    assert!(context.message_template(interned_static("f"), interned_static("other")).is_none());
  }
}
