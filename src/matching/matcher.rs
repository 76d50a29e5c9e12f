/*!

A `Matcher` holds the state of the matching algorithm as it walks the expression tree looking for a match. Most
importantly, it keeps track of the substitutions that are currently active.

In terms of Dundua, `Matcher` keeps track of $S$ and $\Gamma$. The match generators responsible for the current state
live on the match stack, interleaved with records of what each of them did, so that the effects of a generator's last
alternative can be undone before it is asked for the next one. When a generator is exhausted, it is popped from the
stack, its equation is restored, and the generator beneath it is asked for its next alternative.

Guards are evaluated through the `Evaluation` the matcher borrows, so a matcher can only be driven while that
evaluation is not otherwise in use.

*/

use std::fmt::Display;

use crate::{
  atom::{Atom, SExpression},
  attributes::Attributes,
  evaluate::{Evaluation, replace_all},
  interner::{InternedString, resolve_str},
  logging::{log_with, Channel}
};

use super::{
  Guard,
  LeafEquation,
  MatchEquation,
  Pattern,
  SolutionSet,
  common::{RuleAlternatives, RuleOnce},
  decomposition::{RuleDecLeaf, RuleOptionalLeaf},
  match_generator::{MatchGenerator, NextMatchResult, NextMatchResultList},
  sequence::RuleSVE,
};


/// Items that can be pushed onto the match stack.
enum MatchStack {

  /// The match generator responsible for the operations sitting immediately above it on the stack. Those operations
  /// are undone in order to get back to the match generator to call `next()`.
  MatchGenerator(Box<dyn MatchGenerator>),

  /// A variable or sequence variable substitution. We only need to record the name.
  Substitution(InternedString),

  /// An operation representing pushing matching equations onto the equation stack.
  ProducedMatchEquations(u32),

}


/// Holds the state of the in-process pattern matching attempt.
pub struct Matcher<'a, 'c> {
  /// The match_stack is where operations that change the state are recorded. Operations are pushed when they are done
  /// and popped when they are undone.
  match_stack   : Vec<MatchStack>,
  /// The match equations that still need to be solved.
  equation_stack: Vec<MatchEquation>,
  /// The symbol table recording all variable/sequence variable bindings.
  substitutions : SolutionSet,
  evaluation    : &'a mut Evaluation<'c>,
  /// Set once the first solution has been requested, after which `next()` resumes by backtracking.
  started       : bool,
  exhausted     : bool,
}


impl<'a, 'c> Display for Matcher<'a, 'c> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let equations = self.equation_stack
                        .iter()
                        .map(|e| e.to_string())
                        .collect::<Vec<String>>()
                        .join(", ");
    let substitutions = self.substitutions
                            .iter()
                            .map(|(k, v)| format!("{}→{}", resolve_str(*k), v))
                            .collect::<Vec<String>>()
                            .join(", ");
    write!(f, "Γ={{{}}}\nS={{{}}}", equations, substitutions)
  }
}


impl<'a, 'c> Matcher<'a, 'c> {

  /// Create a new `Matcher` for the match equation `pattern`≪`ground`.
  pub fn new(pattern: Pattern, ground: Atom, evaluation: &'a mut Evaluation<'c>) -> Matcher<'a, 'c> {
    Matcher {
      match_stack   : Vec::new(),
      equation_stack: vec![MatchEquation::Single { pattern, ground }],
      substitutions : SolutionSet::new(),
      evaluation,
      started       : false,
      exhausted     : false,
    }
  }


  /// Undoes the effects of the active generator's last alternative. Upon return the generator is on top of the match
  /// stack, or the stack is empty.
  fn undo(&mut self) {
    loop {
      match self.match_stack.last() {

        None | Some(MatchStack::MatchGenerator(_)) => return,

        Some(MatchStack::Substitution(name)) => {
          let name = *name;
          self.match_stack.pop();
          self.substitutions.remove(name);
        }

        Some(MatchStack::ProducedMatchEquations(added)) => {
          let new_length = self.equation_stack.len() - *added as usize;
          self.match_stack.pop();
          self.equation_stack.truncate(new_length);
        }

      }
    }
  }


  /// Backtracks to the most recent generator with an alternative left and applies that alternative. Exhausted
  /// generators are popped and their equations restored. Returns false if every generator is exhausted.
  fn advance(&mut self) -> bool {
    loop {
      self.undo();

      let results = match self.match_stack.last_mut() {
        Some(MatchStack::MatchGenerator(generator)) => generator.next(),
        _ => return false,
      };

      match results {

        Some(results) => {
          if self.apply(results) {
            return true;
          }
          // A conflicting substitution. The partial effects are undone on the next pass.
        }

        None => {
          if let Some(MatchStack::MatchGenerator(generator)) = self.match_stack.pop() {
            self.equation_stack.push(generator.match_equation());
          }
        }

      }
    }
  }


  /// Pushes the equations and records the substitutions of one alternative. Returns false if a substitution
  /// conflicts with an existing binding.
  fn apply(&mut self, results: NextMatchResultList) -> bool {
    for result in results {
      match result {

        NextMatchResult::MatchEquation(equation) => {
          self.equation_stack.push(equation);
          self.match_stack.push(MatchStack::ProducedMatchEquations(1));
        }

        NextMatchResult::Substitution(substitution) => {
          match self.substitutions.get(substitution.name) {
            Some(existing) if *existing == substitution.ground => {}
            Some(_) => {
              log_with(Channel::Debug, 5, || format!("Conflicting binding {}", substitution));
              return false;
            }
            None => {
              self.substitutions.insert(substitution.name, substitution.ground);
              self.match_stack.push(MatchStack::Substitution(substitution.name));
            }
          }
        }

      }
    }
    true
  }


  /// Finds the rule that transforms `equation`. `None` means the equation has no solution under the current
  /// substitutions.
  fn select_rule(&mut self, equation: &MatchEquation) -> Option<Box<dyn MatchGenerator>> {
    match equation {

      MatchEquation::Single { pattern, ground } => self.select_single_rule(equation, pattern, ground),

      MatchEquation::Leaves(leaf_equation) => self.select_leaf_rule(equation, leaf_equation),

      MatchEquation::Guard(guard) => {
        if self.check_guard(guard) {
          Some(Box::new(RuleOnce::trivial(equation.clone())))
        } else {
          None
        }
      }

    }
  }


  fn select_single_rule(&mut self, equation: &MatchEquation, pattern: &Pattern, ground: &Atom)
    -> Option<Box<dyn MatchGenerator>>
  {
    let me = equation.clone();
    match pattern {

      Pattern::Literal(literal) => {
        if literal == ground {
          Some(Box::new(RuleOnce::trivial(me)))
        } else {
          None
        }
      }

      // Outside of a leaf list, a sequence blank matches a single expression.
      Pattern::Blank { head, .. } => {
        match head {
          Some(head) if ground.head() != *head => None,
          _ => Some(Box::new(RuleOnce::trivial(me)))
        }
      }

      Pattern::Named { name, pattern: inner } => {
        Some(Box::new(RuleOnce::named(me, *name, inner.as_ref().clone(), ground.clone())))
      }

      Pattern::Compound { head, leaves } => {
        let children = match ground {
          Atom::SExpression(children) => children.clone(),
          _ => return None,
        };

        if let Pattern::Literal(literal_head) = head.as_ref() {
          if *literal_head != children[0] {
            return None;
          }
        }

        let attributes = match &children[0] {
          Atom::Symbol(name) => self.evaluation.context().attributes_of(*name),
          _ => Attributes::default()
        };

        // A fixed number of leaf patterns must meet the same number of leaves.
        if !attributes.flat()
            && !leaves.iter().any(|p| p.is_variable_length())
            && leaves.len() != children.len() - 1
        {
          return None;
        }

        Some(Box::new(RuleOnce::decompose(me, head.as_ref().clone(), leaves.clone(), children, attributes)))
      }

      Pattern::Condition { pattern: inner, test } => {
        Some(Box::new(RuleOnce::guarded(
          me,
          inner.as_ref().clone(),
          ground.clone(),
          Guard::Condition(test.clone())
        )))
      }

      Pattern::PatternTest { pattern: inner, test } => {
        Some(Box::new(RuleOnce::guarded(
          me,
          inner.as_ref().clone(),
          ground.clone(),
          Guard::Test { test: test.clone(), subjects: vec![ground.clone()] }
        )))
      }

      Pattern::Optional { pattern: inner, .. } => {
        Some(Box::new(RuleOnce::delegate(me, inner.as_ref().clone(), ground.clone())))
      }

      Pattern::Alternatives(alternatives) => {
        Some(Box::new(RuleAlternatives::new(me, alternatives.clone(), ground.clone())))
      }

    }
  }


  fn select_leaf_rule(&mut self, equation: &MatchEquation, leaf_equation: &LeafEquation)
    -> Option<Box<dyn MatchGenerator>>
  {
    let me = equation.clone();

    if leaf_equation.is_exhausted() {
      return if leaf_equation.remaining.is_empty() {
        Some(Box::new(RuleOnce::trivial(me)))
      } else {
        None
      };
    }

    let required: usize = leaf_equation.patterns[leaf_equation.next..].iter().map(|p| p.minimum_length()).sum();
    if leaf_equation.remaining.len() < required {
      return None;
    }

    let pattern = leaf_equation.pattern();

    if pattern.sequence_kind().is_some() {
      return RuleSVE::new(me, leaf_equation.clone()).map(|rule| Box::new(rule) as Box<dyn MatchGenerator>);
    }

    if let Pattern::Optional { pattern: inner, default } = pattern {
      let default = match default {
        Some(default) => Some(default.clone()),
        None => {
          match leaf_equation.ground_head() {
            Atom::Symbol(name) => self.evaluation.context().default_value(*name),
            _ => None
          }
        }
      };
      return Some(Box::new(RuleOptionalLeaf::new(me, leaf_equation.clone(), inner.as_ref().clone(), default)));
    }

    Some(Box::new(RuleDecLeaf::new(me, leaf_equation.clone())))
  }


  /// Evaluates a guard under the current substitutions. Anything other than `True` fails the guard.
  fn check_guard(&mut self, guard: &Guard) -> bool {
    match guard {

      Guard::Condition(test) => {
        let test = replace_all(test, &self.substitutions);
        self.evaluation.evaluate(test).is_true()
      }

      Guard::Test { test, subjects } => {
        subjects.iter().all(|subject| {
          let application = SExpression::new(test.clone(), vec![subject.clone()]);
          self.evaluation.evaluate(application).is_true()
        })
      }

    }
  }

}


impl<'a, 'c> Iterator for Matcher<'a, 'c> {
  type Item = SolutionSet;

  fn next(&mut self) -> Option<Self::Item> {
    if self.exhausted {
      return None;
    }

    // Resume after the previous solution.
    if self.started && !self.advance() {
      self.exhausted = true;
      return None;
    }
    self.started = true;

    loop {
      if self.evaluation.is_halted() {
        self.exhausted = true;
        return None;
      }

      let equation = match self.equation_stack.pop() {
        Some(equation) => equation,
        None => {
          log_with(Channel::Debug, 4, || format!("Solution: {}", super::display_solutions(&self.substitutions)));
          return Some(self.substitutions.clone());
        }
      };

      log_with(Channel::Debug, 5, || format!("Solving {}", equation));

      match self.select_rule(&equation) {
        Some(generator) => {
          self.match_stack.push(MatchStack::MatchGenerator(generator));
        }
        None => {
          self.equation_stack.push(equation);
        }
      }

      if !self.advance() {
        self.exhausted = true;
        return None;
      }
    }
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::{context::Context, parse};

  #[test]
  fn exhausted_matcher_stays_exhausted() {
    let mut context    = Context::without_built_ins();
    let mut evaluation = Evaluation::new(&mut context);
    let pattern        = Pattern::compile(&parse("f[x_]").unwrap());
    let mut matcher    = Matcher::new(pattern, parse("f[a]").unwrap(), &mut evaluation);
    assert!(matcher.next().is_some());
    assert!(matcher.next().is_none());
    assert!(matcher.next().is_none());
  }

  #[test]
  fn display_shows_pending_equations() {
    let mut context    = Context::without_built_ins();
    let mut evaluation = Evaluation::new(&mut context);
    let pattern        = Pattern::compile(&parse("f[x_]").unwrap());
    let matcher        = Matcher::new(pattern, parse("f[a]").unwrap(), &mut evaluation);
    assert!(matcher.to_string().starts_with("Γ={"));
  }
}
