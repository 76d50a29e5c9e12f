/*!

Structural built-ins: containers, parts of expressions, and explicit rule application.

*/

use crate::{
  atom::{Atom, SExpression, Symbol},
  attributes::Attribute,
  built_ins::{ArgumentCount, BuiltinComponent, extract_condition},
  context::SYSTEM_CONTEXT,
  evaluate::{Evaluation, replace_all},
  logging::{Channel, log_with},
  matching::{display_solutions, Matcher, Pattern, SolutionSet},
};

pub(crate) static COMPONENTS: &[BuiltinComponent] = &[
  BuiltinComponent {
    name       : "List",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::Locked, Attribute::Protected],
    apply_rules: &[],
    rules      : &[],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "Sequence",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::Protected],
    apply_rules: &[],
    rules      : &[],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "Hold",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::HoldAll, Attribute::Protected],
    apply_rules: &[],
    rules      : &[],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "HoldComplete",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::HoldAllComplete, Attribute::Protected],
    apply_rules: &[],
    rules      : &[],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "Head",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::Protected],
    apply_rules: &[("Head[e_]", Head), ("Head[xs___]", ArgumentCount)],
    rules      : &[],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "Length",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::Protected],
    apply_rules: &[("Length[e_]", Length), ("Length[xs___]", ArgumentCount)],
    rules      : &[],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "ReplaceAll",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::Protected],
    apply_rules: &[("ReplaceAll[e_, rules_]", ReplaceAll)],
    rules      : &[],
    messages   : &[
      ("reps", "`1` is not a valid replacement rule."),
    ],
  },
  BuiltinComponent {
    name       : "ReplaceRepeated",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::Protected],
    apply_rules: &[("ReplaceRepeated[e_, rules_]", ReplaceRepeated)],
    rules      : &[],
    messages   : &[
      ("rrlim", "Exiting after `1` scanned `2` times."),
    ],
  },
  BuiltinComponent {
    name       : "MatchQ",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::Protected],
    apply_rules: &[("MatchQ[e_, p_]", MatchQ)],
    rules      : &[],
    messages   : &[],
  },
];


/// Implements calls matching the pattern `Head[e_]`.
pub(crate) fn Head(arguments: &SolutionSet, _: &Atom, _: &mut Evaluation) -> Option<Atom> {
  Some(arguments.get_str("e")?.head())
}

/// Implements calls matching the pattern `Length[e_]`. Atoms have length zero.
pub(crate) fn Length(arguments: &SolutionSet, _: &Atom, _: &mut Evaluation) -> Option<Atom> {
  Some(Atom::from_i64(arguments.get_str("e")?.len() as i64))
}


/// A compiled replacement rule. `RuleDelayed` and `Rule` only differ in when the right-hand side was evaluated, which
/// happened before the rule got here.
struct Replacement {
  pattern: Pattern,
  rhs    : Atom,
}

fn is_rule(atom: &Atom) -> bool {
  (atom.has_head("Rule") || atom.has_head("RuleDelayed")) && atom.len() == 2
}

/// Accepts a single rule or a list of rules.
fn compile_replacements(rules: &Atom) -> Option<Vec<Replacement>> {
  let rules: Vec<&Atom> = if is_rule(rules) {
    vec![rules]
  } else if rules.has_head("List") && rules.leaves().iter().all(is_rule) {
    rules.leaves().iter().collect()
  } else {
    return None;
  };

  Some(
    rules.into_iter()
         .map(|rule| {
           // `lhs :> rhs /; test` applies only where `test` holds.
           let lhs = rule.leaves()[0].clone();
           let (rhs, condition) = extract_condition(rule.leaves()[1].clone());
           let lhs = match condition {
             Some(test) => SExpression::apply_binary("Condition", lhs, test),
             None => lhs
           };
           Replacement {
             pattern: Pattern::compile(&lhs),
             rhs
           }
         })
         .collect()
  )
}

/// Tries the replacements on `expression` itself, then on its parts. A part that has been replaced is not searched
/// any further. Gives `None` if nothing was replaced.
fn replace_once(expression: &Atom, replacements: &[Replacement], evaluation: &mut Evaluation) -> Option<Atom> {
  for replacement in replacements {
    let solution = {
      let mut matcher = Matcher::new(replacement.pattern.clone(), expression.clone(), evaluation);
      matcher.next()
    };
    if let Some(solution) = solution {
      return Some(replace_all(&replacement.rhs, &solution));
    }
  }

  let children = match expression {
    Atom::SExpression(children) => children,
    _ => return None,
  };

  let mut changed = false;
  let mut new_children = Vec::with_capacity(children.len());
  for child in children.iter() {
    match replace_once(child, replacements, evaluation) {
      Some(replaced) => {
        changed = true;
        new_children.push(replaced);
      }
      None => new_children.push(child.clone())
    }
  }

  if changed {
    Some(SExpression::new(new_children[0].clone(), new_children[1..].to_vec()))
  } else {
    None
  }
}

/// Implements calls matching the pattern `ReplaceAll[e_, rules_]`.
pub(crate) fn ReplaceAll(arguments: &SolutionSet, _: &Atom, evaluation: &mut Evaluation) -> Option<Atom> {
  log_with(Channel::Debug, 5, || format!("ReplaceAll called with arguments {}", display_solutions(arguments)));

  let expression = arguments.get_str("e")?;
  let rules = arguments.get_str("rules")?;
  let replacements = match compile_replacements(rules) {
    Some(replacements) => replacements,
    None => {
      evaluation.message("ReplaceAll", "reps", vec![rules.clone()]);
      return None;
    }
  };

  Some(replace_once(expression, &replacements, evaluation).unwrap_or_else(|| expression.clone()))
}

/// Implements calls matching the pattern `ReplaceRepeated[e_, rules_]`. Applies the rules and evaluates until the
/// expression stops changing, at most as many times as the iteration limit allows.
pub(crate) fn ReplaceRepeated(arguments: &SolutionSet, _: &Atom, evaluation: &mut Evaluation) -> Option<Atom> {
  log_with(Channel::Debug, 5, || format!("ReplaceRepeated called with arguments {}", display_solutions(arguments)));

  let mut expression = arguments.get_str("e")?.clone();
  let rules = arguments.get_str("rules")?;
  let replacements = match compile_replacements(rules) {
    Some(replacements) => replacements,
    None => {
      evaluation.message("ReplaceAll", "reps", vec![rules.clone()]);
      return None;
    }
  };

  let limit = evaluation.settings().iteration_limit;
  for _ in 0..limit {
    match replace_once(&expression, &replacements, evaluation) {
      Some(replaced) => {
        let evaluated = evaluation.evaluate(replaced);
        if evaluated == expression || evaluation.is_halted() {
          return Some(evaluated);
        }
        expression = evaluated;
      }
      None => return Some(expression),
    }
  }

  evaluation.message(
    "ReplaceRepeated",
    "rrlim",
    vec![SExpression::apply_binary("ReplaceRepeated", expression.clone(), rules.clone()), Atom::from_i64(limit as i64)]
  );
  Some(expression)
}

/// Implements calls matching the pattern `MatchQ[e_, p_]`.
pub(crate) fn MatchQ(arguments: &SolutionSet, _: &Atom, evaluation: &mut Evaluation) -> Option<Atom> {
  let pattern = Pattern::compile(arguments.get_str("p")?);
  let ground = arguments.get_str("e")?.clone();
  let mut matcher = Matcher::new(pattern, ground, evaluation);
  Some(Symbol::from_bool(matcher.next().is_some()))
}


#[cfg(test)]
mod tests {
  use crate::{context::Context, evaluate::evaluate, parse};

  fn run(text: &str) -> String {
    let mut context = Context::new_global_context();
    evaluate(parse(text).unwrap(), &mut context).expression.to_string()
  }

  #[test]
  fn parts() {
    assert_eq!(run("Head[f[x]]"), "f");
    assert_eq!(run("Head[1/2]"), "Rational");
    assert_eq!(run("Length[{a, b, c}]"), "3");
    assert_eq!(run("Length[x]"), "0");
  }

  #[test]
  fn replace_all() {
    assert_eq!(run("f[x, g[x]] /. x -> 1"), "f[1, g[1]]");
    assert_eq!(run("{a, b, c} /. {a -> 1, b -> 2}"), "{1, 2, c}");
    assert_eq!(run("f[2] /. f[n_] :> n + 1"), "3");
    assert_eq!(run("g[a + b] /. a + b -> c"), "g[c]");
    assert_eq!(run("x /. y -> 1"), "x");
  }

  #[test]
  fn bad_rules() {
    let mut context = Context::new_global_context();
    let result = evaluate(parse("x /. 3").unwrap(), &mut context);
    assert_eq!(result.expression.to_string(), "ReplaceAll[x, 3]");
    assert_eq!(
      result.diagnostics[0].render(&context),
      "ReplaceAll::reps: 3 is not a valid replacement rule."
    );
  }

  #[test]
  fn replace_repeated() {
    assert_eq!(run("f[f[f[x]]] //. f[y_] :> y"), "x");
    assert_eq!(run("{3, 2, 1} //. {a___, b_, c_, d___} :> {a, c, b, d} /; b > c"), "{1, 2, 3}");
  }

  #[test]
  fn match_q() {
    assert_eq!(run("MatchQ[f[1, 2], f[__]]"), "True");
    assert_eq!(run("MatchQ[f[1, 2], g[__]]"), "False");
    assert_eq!(run("MatchQ[3, _Integer]"), "True");
  }
}
