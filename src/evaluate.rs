/*!

Facilities for evaluating expressions within a context.

Evaluation rewrites an expression until no rule applies to it. For an S-expression, one step is:

 1. Evaluate the head.
 2. Evaluate the leaves that the head's attributes do not hold (`HoldFirst`, `HoldRest`, `HoldAll`,
    `HoldAllComplete`). `Evaluate[e]` in a held position is evaluated anyway, except under `HoldAllComplete`.
 3. Splice `Sequence[…]` leaves into the expression, unless the head is `SequenceHold`.
 4. Normalize according to the head's attributes (`Flat`, `Orderless`, `Listable`).
 5. Try the up-values of the leaves, then the down-values of the head symbol (or the sub-values of the innermost head
    symbol, for a compound head). The first rule that matches rewrites the expression.

A symbol is rewritten by its own-values. Every other atom is already in normal form.

When a rule rewrites an expression, the result is evaluated again, until a fixed point is reached. A rewrite that
gives back its input is a fixed point. Every rewrite counts against the iteration limit of the top-level call, and
nested evaluations count against the recursion limit. Exceeding either stops evaluation with the expression as it
stands and a diagnostic.

`*Set` evaluates its RHS at definition time, while `*SetDelayed` evaluates its RHS at substitution time. Both are
stored as rules `HoldPattern[lhs] :> rhs`.

*/

use std::{
  rc::Rc,
  sync::{
    Arc,
    atomic::{AtomicBool, Ordering}
  }
};

use crate::{
  atom::{Atom, SExpression},
  attributes::Attributes,
  context::{Context, ContextValueStore, SymbolValue},
  diagnostics::Diagnostic,
  interner::{InternedString, interned_static},
  kernel::{EXACT_KERNEL, NumericKernel},
  logging::{log, log_with, Channel},
  matching::{Matcher, SolutionSet},
  normalize::{normalize, Normalized},
};

pub const DEFAULT_ITERATION_LIMIT: usize = 4096;
pub const DEFAULT_RECURSION_LIMIT: usize = 1024;

const STACK_RED_ZONE: usize = 64 * 1024;
const STACK_GROWTH  : usize = 2 * 1024 * 1024;


#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EvaluationSettings {
  /// The most rewrites a single top-level evaluation may perform.
  pub iteration_limit: usize,
  /// The deepest evaluations may nest.
  pub recursion_limit: usize,
}

impl Default for EvaluationSettings {
  fn default() -> Self {
    EvaluationSettings {
      iteration_limit: DEFAULT_ITERATION_LIMIT,
      recursion_limit: DEFAULT_RECURSION_LIMIT,
    }
  }
}

impl EvaluationSettings {
  /// The defaults, overridden by positive integer own-values of `$IterationLimit` and `$RecursionLimit`.
  pub fn from_context(context: &Context) -> Self {
    let limit = |name: &'static str| -> Option<usize> {
      context.own_value(interned_static(name))
             .and_then(|value| value.to_i64())
             .filter(|n| *n > 0)
             .map(|n| n as usize)
    };
    let defaults = EvaluationSettings::default();

    EvaluationSettings {
      iteration_limit: limit("$IterationLimit").unwrap_or(defaults.iteration_limit),
      recursion_limit: limit("$RecursionLimit").unwrap_or(defaults.recursion_limit),
    }
  }
}


#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EvaluationStatus {
  /// A fixed point was reached.
  Normal,
  /// The iteration or recursion limit was exceeded.
  LimitExceeded,
  /// The abort flag was raised.
  Aborted,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EvaluationResult {
  pub expression : Atom,
  pub status     : EvaluationStatus,
  pub diagnostics: Vec<Diagnostic>,
}


/// The outcome of a single evaluation step.
enum Step {
  /// No rule applies.
  Done(Atom),
  /// A rule rewrote `from`, the expression with evaluated leaves, to `to`.
  Rewrote {
    from: Atom,
    to  : Atom
  },
}


/// The state of one top-level evaluation: the context it reads and writes, the limits, the step counter, and the
/// diagnostics emitted so far.
pub struct Evaluation<'c> {
  context    : &'c mut Context,
  settings   : EvaluationSettings,
  steps      : usize,
  depth      : usize,
  status     : EvaluationStatus,
  diagnostics: Vec<Diagnostic>,
  abort_flag : Option<Arc<AtomicBool>>,
  kernel     : &'static dyn NumericKernel,
}

impl<'c> Evaluation<'c> {

  pub fn new(context: &'c mut Context) -> Evaluation<'c> {
    let settings = EvaluationSettings::from_context(context);
    Evaluation {
      context,
      settings,
      steps      : 0,
      depth      : 0,
      status     : EvaluationStatus::Normal,
      diagnostics: Vec::new(),
      abort_flag : None,
      kernel     : &EXACT_KERNEL,
    }
  }

  /// Evaluation stops as soon as `flag` is set.
  pub fn with_abort_flag(mut self, flag: Arc<AtomicBool>) -> Self {
    self.abort_flag = Some(flag);
    self
  }

  pub fn with_settings(mut self, settings: EvaluationSettings) -> Self {
    self.settings = settings;
    self
  }

  pub fn with_kernel(mut self, kernel: &'static dyn NumericKernel) -> Self {
    self.kernel = kernel;
    self
  }

  pub fn context(&self) -> &Context {
    self.context
  }

  pub fn context_mut(&mut self) -> &mut Context {
    self.context
  }

  pub fn kernel(&self) -> &'static dyn NumericKernel {
    self.kernel
  }

  pub fn settings(&self) -> EvaluationSettings {
    self.settings
  }

  pub fn steps(&self) -> usize {
    self.steps
  }

  pub fn status(&self) -> EvaluationStatus {
    self.status
  }

  pub fn diagnostics(&self) -> &[Diagnostic] {
    &self.diagnostics
  }

  /// Evaluates `expression` as a top-level call. The step counter, status, and diagnostics start afresh.
  pub fn run(&mut self, expression: Atom) -> EvaluationResult {
    self.steps  = 0;
    self.depth  = 0;
    self.status = EvaluationStatus::Normal;
    self.diagnostics.clear();

    let expression = self.evaluate(expression);
    // The flag may have been raised after the last check.
    self.check_abort();

    EvaluationResult {
      expression,
      status     : self.status,
      diagnostics: std::mem::take(&mut self.diagnostics),
    }
  }

  /// Has evaluation been stopped by a limit or by the abort flag?
  pub fn is_halted(&mut self) -> bool {
    self.check_abort();
    self.status != EvaluationStatus::Normal
  }

  fn check_abort(&mut self) {
    if self.status == EvaluationStatus::Normal {
      if let Some(flag) = &self.abort_flag {
        if flag.load(Ordering::Relaxed) {
          log(Channel::Notice, 2, "Evaluation aborted.");
          self.status = EvaluationStatus::Aborted;
        }
      }
    }
  }

  /// Records a diagnostic for the message `symbol::tag`.
  pub fn message(&mut self, symbol: &'static str, tag: &'static str, arguments: Vec<Atom>) {
    let diagnostic = Diagnostic::from_static(symbol, tag, arguments);
    log(Channel::Warning, 1, diagnostic.render(self.context).as_str());
    self.diagnostics.push(diagnostic);
  }

  fn attributes_of_head(&self, head: &Atom) -> Attributes {
    match head {
      Atom::Symbol(name) => self.context.attributes_of(*name),
      _ => Attributes::default()
    }
  }

  /// Evaluates `expression` to a fixed point. Stops early, giving the expression as it stands, if evaluation is
  /// halted.
  pub fn evaluate(&mut self, expression: Atom) -> Atom {
    if self.is_halted() {
      return expression;
    }

    self.depth += 1;
    if self.depth > self.settings.recursion_limit {
      self.depth -= 1;
      let limit = Atom::from_i64(self.settings.recursion_limit as i64);
      self.message("General", "reclim", vec![limit]);
      self.status = EvaluationStatus::LimitExceeded;
      return expression;
    }

    // Each level of nesting costs several frames, so grow the stack on demand rather than rely on the thread's.
    let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH, || self.evaluate_to_fixed_point(expression));
    self.depth -= 1;
    result
  }

  fn evaluate_to_fixed_point(&mut self, mut expression: Atom) -> Atom {
    loop {
      if self.is_halted() {
        return expression;
      }

      match self.step(expression) {

        Step::Done(result) => return result,

        Step::Rewrote { from, to } => {
          if to == from {
            return to;
          }

          self.steps += 1;
          log_with(Channel::Debug, 4, || format!("{} ⟶ {}", from, to));

          if self.steps > self.settings.iteration_limit {
            let limit = Atom::from_i64(self.settings.iteration_limit as i64);
            self.message("General", "itlim", vec![limit]);
            self.status = EvaluationStatus::LimitExceeded;
            return to;
          }

          expression = to;
        }

      }
    }
  }

  fn step(&mut self, expression: Atom) -> Step {
    match &expression {
      Atom::Symbol(name) => {
        let rules = self.context.rules_for(*name, ContextValueStore::OwnValues);
        match self.apply_rules(&expression, rules) {
          Some(to) => Step::Rewrote { from: expression, to },
          None => Step::Done(expression)
        }
      }

      Atom::SExpression(children) => {
        let children = children.clone();
        self.step_s_expression(&children)
      }

      _ => Step::Done(expression)
    }
  }

  fn step_s_expression(&mut self, children: &Rc<Vec<Atom>>) -> Step {
    // Step 1: Evaluate the head.
    let head = self.evaluate(children[0].clone());
    let attributes = self.attributes_of_head(&head);

    // Step 2: Evaluate the leaves that are not held.
    let mut leaves: Vec<Atom> = Vec::with_capacity(children.len() - 1);
    for (position, leaf) in children[1..].iter().enumerate() {
      if self.is_halted() {
        leaves.push(leaf.clone());
        continue;
      }

      let held = attributes.hold_all_complete()
          || (position == 0 && attributes.hold_first())
          || (position > 0 && attributes.hold_rest());

      if !held {
        leaves.push(self.evaluate(leaf.clone()));
      } else if !attributes.hold_all_complete() && leaf.has_head("Evaluate") && leaf.len() == 1 {
        leaves.push(self.evaluate(leaf.leaves()[0].clone()));
      } else {
        leaves.push(leaf.clone());
      }
    }

    // Step 3: Splice sequences.
    let expression = SExpression::new(head, leaves);
    let expression = match attributes.sequence_hold() {
      true  => expression,
      false => SExpression::splice_sequences(expression)
    };

    // Step 4: Normalize.
    let expression = {
      let context = &*self.context;
      match normalize(expression, |name| context.attributes_of(name)) {

        Normalized::Canonical(expression) => expression,

        Normalized::Threaded(threaded) => {
          return Step::Rewrote { from: SExpression::new(children[0].clone(), children[1..].to_vec()), to: threaded };
        }

        Normalized::ShapeMismatch(expression) => {
          let lists: Vec<Atom> = expression.leaves().iter().filter(|l| l.has_head("List")).cloned().collect();
          self.message("Thread", "tdlen", vec![SExpression::list(lists)]);
          return Step::Done(expression);
        }

      }
    };

    if self.is_halted() {
      return Step::Done(expression);
    }

    // Step 5: Up-values, then down-values or sub-values.
    let mut tried: Vec<InternedString> = Vec::new();
    for leaf in expression.leaves() {
      if let Some(name) = leaf.name() {
        if tried.contains(&name) {
          continue;
        }
        tried.push(name);
        let rules = self.context.rules_for(name, ContextValueStore::UpValues);
        if let Some(to) = self.apply_rules(&expression, rules) {
          return Step::Rewrote { from: expression, to };
        }
      }
    }

    let (name, store) = match expression.head() {
      Atom::Symbol(name) => (Some(name), ContextValueStore::DownValues),
      head => (head.innermost_name(), ContextValueStore::SubValues),
    };

    if let Some(name) = name {
      let rules = self.context.rules_for(name, store);
      if let Some(to) = self.apply_rules(&expression, rules) {
        return Step::Rewrote { from: expression, to };
      }
    }

    Step::Done(expression)
  }

  /// Tries `rules` in order against `expression`. The first rule that matches and does not decline gives the
  /// rewritten expression.
  fn apply_rules(&mut self, expression: &Atom, rules: Rc<Vec<SymbolValue>>) -> Option<Atom> {
    for rule in rules.iter() {
      if self.is_halted() {
        return None;
      }

      let solution = {
        let mut matcher = Matcher::new(rule.pattern().clone(), expression.clone(), self);
        matcher.next()
      };

      let solution = match solution {
        Some(solution) => solution,
        None => continue,
      };

      match rule {
        SymbolValue::Definitions { rhs, .. } => {
          log_with(Channel::Debug, 5, || format!("Doing substitutions for rhs = {}", rhs));
          return Some(replace_all(rhs, &solution));
        }

        SymbolValue::BuiltIn { built_in, .. } => {
          if let Some(result) = built_in(&solution, expression, self) {
            return Some(result);
          }
          log_with(Channel::Debug, 5, || format!("Built-in declined {}", expression));
        }
      }
    }

    None
  }
}


/// Evaluates `expression` in `context` with the settings the context specifies.
pub fn evaluate(expression: Atom, context: &mut Context) -> EvaluationResult {
  Evaluation::new(context).run(expression)
}


/// Replaces every symbol bound in `substitutions` with its value.
pub fn replace_all(expression: &Atom, substitutions: &SolutionSet) -> Atom {
  match expression {

    Atom::Symbol(name) => {
      match substitutions.get(*name) {
        Some(value) => value.clone(),
        None => expression.clone()
      }
    }

    Atom::SExpression(children) => {
      let new_children: Vec<Atom> = children.iter().map(|c| replace_all(c, substitutions)).collect();
      if new_children == **children {
        expression.clone()
      } else {
        Atom::SExpression(Rc::new(new_children))
      }
    }

    _ => expression.clone()
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    attributes::Attribute,
    parse
  };

  /// Evaluates each statement in turn and gives the rendering of the last result.
  fn eval(context: &mut Context, text: &str) -> String {
    evaluate(parse(text).unwrap(), context).expression.to_string()
  }

  #[test]
  fn atoms_are_normal() {
    let mut context = Context::without_built_ins();
    assert_eq!(eval(&mut context, "3"), "3");
    assert_eq!(eval(&mut context, "\"text\""), "\"text\"");
    assert_eq!(eval(&mut context, "f[x, y]"), "f[x, y]");
  }

  #[test]
  fn textual_rules_rewrite() {
    let mut context = Context::without_built_ins();
    let lhs = parse("f[x_]").unwrap();
    let rhs = parse("g[x, x]").unwrap();
    context.define(lhs.clone(), lhs, rhs).unwrap();
    assert_eq!(eval(&mut context, "f[a]"), "g[a, a]");
    assert_eq!(eval(&mut context, "f[a, b]"), "f[a, b]");
  }

  #[test]
  fn fibonacci_scenario() {
    let mut context = Context::new_global_context();
    eval(&mut context, "Fib[0] = 0");
    eval(&mut context, "Fib[1] = 1");
    eval(&mut context, "Fib[n_] := Fib[n - 1] + Fib[n - 2] /; n > 1");
    assert_eq!(eval(&mut context, "Fib[10]"), "55");
  }

  #[test]
  fn multiplication_scenario() {
    let mut context = Context::new_global_context();
    eval(&mut context, "Mult[] = 1");
    eval(&mut context, "Mult[x_, ys___] := Times[x, Mult[ys]]");
    assert_eq!(eval(&mut context, "Mult[2, 3, 4, 5]"), "120");
  }

  #[test]
  fn orderless_scenario() {
    let mut context = Context::new_global_context();
    eval(&mut context, "SetAttributes[h, Orderless]");
    eval(&mut context, "h[a_, b_] := pair[a, b]");
    assert_eq!(eval(&mut context, "h[2, 1]"), "pair[1, 2]");
  }

  #[test]
  fn commutativity_and_associativity() {
    let mut context = Context::without_built_ins();
    context.set_attributes(interned_static("h"), Attribute::Orderless.into()).unwrap();
    context.set_attributes(interned_static("g"), Attribute::Flat.into()).unwrap();
    assert_eq!(eval(&mut context, "h[b, a]"), eval(&mut context, "h[a, b]"));
    let flat = eval(&mut context, "g[a, b, c]");
    assert_eq!(eval(&mut context, "g[g[a, b], c]"), flat);
    assert_eq!(eval(&mut context, "g[a, g[b, c]]"), flat);
  }

  #[test]
  fn listable_threading() {
    let mut context = Context::new_global_context();
    context.set_attributes(interned_static("h"), Attribute::Listable.into()).unwrap();
    assert_eq!(eval(&mut context, "h[{a, b}]"), eval(&mut context, "{h[a], h[b]}"));
    assert_eq!(eval(&mut context, "h[{a, b}, c]"), "{h[a, c], h[b, c]}");

    let result = evaluate(parse("h[{a, b}, {c}]").unwrap(), &mut context);
    assert_eq!(result.expression.to_string(), "h[{a, b}, {c}]");
    assert_eq!(result.status, EvaluationStatus::Normal);
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].to_string(), "Thread::tdlen");
  }

  #[test]
  fn iteration_limit() {
    let mut context = Context::new_global_context();
    eval(&mut context, "S := h[S]");
    let settings = EvaluationSettings { iteration_limit: 40, recursion_limit: 256 };
    let result = Evaluation::new(&mut context).with_settings(settings).run(parse("S").unwrap());
    assert_eq!(result.status, EvaluationStatus::LimitExceeded);
    assert!(result.diagnostics.iter().any(|d| d.to_string() == "General::itlim"));
  }

  #[test]
  fn recursion_limit() {
    let mut context = Context::new_global_context();
    eval(&mut context, "S := h[S]");
    let settings = EvaluationSettings { iteration_limit: 4096, recursion_limit: 30 };
    let result = Evaluation::new(&mut context).with_settings(settings).run(parse("S").unwrap());
    assert_eq!(result.status, EvaluationStatus::LimitExceeded);
    assert!(result.diagnostics.iter().any(|d| d.to_string() == "General::reclim"));
  }

  #[test]
  fn default_limits_stop_runaway_recursion() {
    let mut context = Context::new_global_context();
    eval(&mut context, "S := h[S]");
    let result = Evaluation::new(&mut context).run(parse("S").unwrap());
    assert_eq!(result.status, EvaluationStatus::LimitExceeded);
    assert!(result.diagnostics.iter().any(|d| d.to_string() == "General::reclim"));
  }

  #[test]
  fn context_marks_name_the_same_symbol() {
    let mut context = Context::new_global_context();
    eval(&mut context, "x = 5");
    assert_eq!(eval(&mut context, "Global`x"), "5");
    assert_eq!(eval(&mut context, "SameQ[Global`y, y]"), "True");
    assert_eq!(eval(&mut context, "System`Plus[1, 2]"), "3");
    assert_eq!(eval(&mut context, "A`x"), "A`x");
  }

  #[test]
  fn sequence_hold_keeps_sequences() {
    let mut context = Context::new_global_context();
    assert_eq!(eval(&mut context, "f[a, Sequence[b, c]]"), "f[a, b, c]");
    eval(&mut context, "SetAttributes[g, SequenceHold]");
    assert_eq!(eval(&mut context, "g[a, Sequence[b, c]]"), "g[a, Sequence[b, c]]");
  }

  #[test]
  fn limits_from_context() {
    let mut context = Context::new_global_context();
    eval(&mut context, "$IterationLimit = 100");
    assert_eq!(EvaluationSettings::from_context(&context).iteration_limit, 100);
    assert_eq!(EvaluationSettings::from_context(&context).recursion_limit, DEFAULT_RECURSION_LIMIT);
  }

  #[test]
  fn idempotence() {
    let mut context = Context::new_global_context();
    eval(&mut context, "f[x_Integer] := x + 1");
    eval(&mut context, "SetAttributes[g, {Flat, Orderless}]");
    for text in ["f[f[1]]", "g[c, g[b, a]]", "{1 + 2, f[x], Head[f[y]]}", "If[1 < 2, u, v]"] {
      let once = evaluate(parse(text).unwrap(), &mut context).expression;
      let twice = evaluate(once.clone(), &mut context).expression;
      assert_eq!(once, twice, "{}", text);
    }
  }

  #[test]
  fn abort_flag_stops_evaluation() {
    let mut context = Context::new_global_context();
    eval(&mut context, "Fib[0] = 0");
    eval(&mut context, "Fib[1] = 1");
    eval(&mut context, "Fib[n_] := Fib[n - 1] + Fib[n - 2] /; n > 1");
    let flag = Arc::new(AtomicBool::new(true));
    let result = Evaluation::new(&mut context).with_abort_flag(flag).run(parse("Fib[20]").unwrap());
    assert_eq!(result.status, EvaluationStatus::Aborted);
    assert_eq!(result.expression.to_string(), "Fib[20]");
  }

  #[test]
  fn holds_and_sequences() {
    let mut context = Context::new_global_context();
    eval(&mut context, "x = 5");
    assert_eq!(eval(&mut context, "Hold[x]"), "Hold[x]");
    assert_eq!(eval(&mut context, "Hold[Evaluate[x]]"), "Hold[5]");
    assert_eq!(eval(&mut context, "f[Sequence[a, b], c]"), "f[a, b, c]");
    assert_eq!(eval(&mut context, "Hold[Sequence[a, b]]"), "Hold[a, b]");
  }

  #[test]
  fn up_values_before_down_values() {
    let mut context = Context::new_global_context();
    eval(&mut context, "f[x_] := down");
    eval(&mut context, "f[u] ^:= up");
    assert_eq!(eval(&mut context, "f[u]"), "up");
    assert_eq!(eval(&mut context, "f[v]"), "down");
  }

  #[test]
  fn sub_values() {
    let mut context = Context::new_global_context();
    eval(&mut context, "d[n_][x_] := x^n");
    assert_eq!(eval(&mut context, "d[2][3]"), "9");
  }

  #[test]
  fn replace_all_substitutes() {
    let mut solutions = SolutionSet::new();
    solutions.insert(interned_static("x"), Atom::from_i64(1));
    let expression = parse("f[x, g[x, y]]").unwrap();
    assert_eq!(replace_all(&expression, &solutions).to_string(), "f[1, g[1, y]]");
  }
}
