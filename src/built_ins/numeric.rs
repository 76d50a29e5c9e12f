/*!

Arithmetic. Numbers are folded through the numeric kernel of the `Evaluation`, so these functions never look inside a
number themselves. A fold that leaves the expression as it was declines, so the evaluator reaches a fixed point.

*/

use crate::{
  atom::{Atom, SExpression},
  attributes::Attribute,
  built_ins::BuiltinComponent,
  context::SYSTEM_CONTEXT,
  evaluate::Evaluation,
  kernel::NumericKernel,
  logging::{Channel, log_with},
  matching::{display_solutions, SolutionSet},
};

pub(crate) static COMPONENTS: &[BuiltinComponent] = &[
  BuiltinComponent {
    name       : "Plus",
    context    : SYSTEM_CONTEXT,
    attributes : &[
      Attribute::Flat,
      Attribute::Listable,
      Attribute::NumericFunction,
      Attribute::OneIdentity,
      Attribute::Orderless,
      Attribute::Protected,
    ],
    apply_rules: &[("Plus[xs___]", Plus)],
    rules      : &[],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "Times",
    context    : SYSTEM_CONTEXT,
    attributes : &[
      Attribute::Flat,
      Attribute::Listable,
      Attribute::NumericFunction,
      Attribute::OneIdentity,
      Attribute::Orderless,
      Attribute::Protected,
    ],
    apply_rules: &[("Times[xs___]", Times)],
    rules      : &[],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "Power",
    context    : SYSTEM_CONTEXT,
    attributes : &[
      Attribute::Listable,
      Attribute::NumericFunction,
      Attribute::OneIdentity,
      Attribute::Protected,
    ],
    apply_rules: &[("Power[b_, e_]", Power)],
    rules      : &[
      ("Power[x_]", "x"),
    ],
    messages   : &[
      ("infy", "Infinite expression `1` encountered."),
    ],
  },
  BuiltinComponent {
    name       : "Minus",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::Listable, Attribute::NumericFunction, Attribute::Protected],
    apply_rules: &[],
    rules      : &[("Minus[x_]", "Times[-1, x]")],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "Subtract",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::Listable, Attribute::NumericFunction, Attribute::Protected],
    apply_rules: &[],
    rules      : &[("Subtract[x_, y_]", "Plus[x, Times[-1, y]]")],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "Divide",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::Listable, Attribute::NumericFunction, Attribute::Protected],
    apply_rules: &[],
    rules      : &[("Divide[x_, y_]", "Times[x, Power[y, -1]]")],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "Rational",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::Protected],
    apply_rules: &[("Rational[n_Integer, d_Integer]", Rational)],
    rules      : &[],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "Complex",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::Protected],
    apply_rules: &[("Complex[re_, im_]", Complex)],
    rules      : &[],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "N",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::Protected],
    apply_rules: &[("N[e_]", N)],
    rules      : &[],
    messages   : &[],
  },
];


/// Folds the numbers among `leaves` with `op`, starting from `identity`. Gives the folded number and the other
/// leaves, or `None` if some pair of numbers cannot be folded.
fn fold_numbers<F>(leaves: &[Atom], identity: Atom, op: F) -> Option<(Atom, usize, Vec<Atom>)>
  where F: Fn(&Atom, &Atom) -> Option<Atom>
{
  let mut accumulated = identity;
  let mut number_count = 0usize;
  let mut others = Vec::with_capacity(leaves.len());

  for leaf in leaves {
    if leaf.is_number() {
      accumulated = op(&accumulated, leaf)?;
      number_count += 1;
    } else {
      others.push(leaf.clone());
    }
  }

  Some((accumulated, number_count, others))
}

/// Does the head of `original` fold numbers? Arithmetic stays symbolic once `NumericFunction` is cleared.
fn folds_numbers(original: &Atom, evaluation: &Evaluation) -> bool {
  match original.head() {
    Atom::Symbol(name) => evaluation.context().attributes_of(name).numeric_function(),
    _ => false
  }
}

fn is_exact_value(atom: &Atom, value: i64) -> bool {
  atom.is_exact_number() && atom.to_i64() == Some(value)
}

/// Puts the folded number back in front of the other leaves. The evaluator restores canonical order.
fn rebuild(head: &'static str, number: Option<Atom>, mut others: Vec<Atom>) -> Atom {
  if let Some(number) = number {
    others.insert(0, number);
  }
  match others.len() {
    1 => others.pop().unwrap_or_else(SExpression::empty_sequence),
    _ => SExpression::apply(head, others),
  }
}

/// Implements calls matching the pattern `Plus[xs___]`.
pub(crate) fn Plus(arguments: &SolutionSet, original: &Atom, evaluation: &mut Evaluation) -> Option<Atom> {
  log_with(Channel::Debug, 5, || format!("Plus called with arguments {}", display_solutions(arguments)));

  let leaves = original.leaves();
  match leaves.len() {
    0 => return Some(Atom::from_i64(0)),
    1 => return Some(leaves[0].clone()),
    _ => { /* pass */ }
  }

  if !folds_numbers(original, evaluation) {
    return None;
  }

  let kernel = evaluation.kernel();
  let (sum, number_count, others) = fold_numbers(leaves, Atom::from_i64(0), |x, y| kernel.add(x, y))?;

  // An exact zero vanishes unless it is all there is. An inexact zero is kept, because it carries precision.
  let sum = if is_exact_value(&sum, 0) && !others.is_empty() { None } else { Some(sum) };
  let new_count = others.len() + sum.is_some() as usize;
  if number_count <= 1 && new_count == leaves.len() {
    return None;
  }

  if new_count == 0 {
    return Some(Atom::from_i64(0));
  }
  Some(rebuild("Plus", sum, others))
}

/// Implements calls matching the pattern `Times[xs___]`.
pub(crate) fn Times(arguments: &SolutionSet, original: &Atom, evaluation: &mut Evaluation) -> Option<Atom> {
  log_with(Channel::Debug, 5, || format!("Times called with arguments {}", display_solutions(arguments)));

  let leaves = original.leaves();
  match leaves.len() {
    0 => return Some(Atom::from_i64(1)),
    1 => return Some(leaves[0].clone()),
    _ => { /* pass */ }
  }

  if !folds_numbers(original, evaluation) {
    return None;
  }

  let kernel = evaluation.kernel();
  let (product, number_count, others) = fold_numbers(leaves, Atom::from_i64(1), |x, y| kernel.multiply(x, y))?;

  // An exact zero annihilates everything.
  if is_exact_value(&product, 0) {
    return Some(Atom::from_i64(0));
  }

  let product = if is_exact_value(&product, 1) && !others.is_empty() { None } else { Some(product) };
  let new_count = others.len() + product.is_some() as usize;
  if number_count <= 1 && new_count == leaves.len() {
    return None;
  }

  if new_count == 0 {
    return Some(Atom::from_i64(1));
  }
  Some(rebuild("Times", product, others))
}

/// Implements calls matching the pattern `Power[b_, e_]`.
pub(crate) fn Power(arguments: &SolutionSet, original: &Atom, evaluation: &mut Evaluation) -> Option<Atom> {
  log_with(Channel::Debug, 5, || format!("Power called with arguments {}", display_solutions(arguments)));

  let base = arguments.get_str("b")?;
  let exponent = arguments.get_str("e")?;
  let kernel = evaluation.kernel();

  if is_exact_value(exponent, 1) {
    return Some(base.clone());
  }

  if base.is_number() && exponent.is_number() {
    if !folds_numbers(original, evaluation) {
      return None;
    }
    if let Some(result) = kernel.power(base, exponent) {
      return Some(result);
    }
    let negative = kernel.compare(exponent, &Atom::from_i64(0)) == Some(std::cmp::Ordering::Less);
    if base.is_exact_number() && kernel.is_zero(base) && negative {
      evaluation.message("Power", "infy", vec![original.clone()]);
    }
    return None;
  }

  if is_exact_value(exponent, 0) {
    return Some(Atom::from_i64(1));
  }

  None
}

/// Implements calls matching the pattern `Rational[n_Integer, d_Integer]`. Gives the reduced rational, which is an
/// integer when the denominator divides the numerator.
pub(crate) fn Rational(arguments: &SolutionSet, original: &Atom, evaluation: &mut Evaluation) -> Option<Atom> {
  let (numerator, denominator) = match (arguments.get_str("n")?, arguments.get_str("d")?) {
    (Atom::Integer(n), Atom::Integer(d)) => (n.clone(), d.clone()),
    _ => return None
  };

  match Atom::rational(numerator, denominator) {
    Some(result) => Some(result),
    None => {
      evaluation.message("Power", "infy", vec![original.clone()]);
      None
    }
  }
}

/// Implements calls matching the pattern `Complex[re_, im_]`.
pub(crate) fn Complex(arguments: &SolutionSet, _: &Atom, _: &mut Evaluation) -> Option<Atom> {
  Atom::complex(arguments.get_str("re")?.clone(), arguments.get_str("im")?.clone())
}

/// Implements calls matching the pattern `N[e_]`. Converts every number in `e` to a machine precision real.
pub(crate) fn N(arguments: &SolutionSet, _: &Atom, evaluation: &mut Evaluation) -> Option<Atom> {
  let kernel = evaluation.kernel();
  Some(numericize(arguments.get_str("e")?, kernel))
}

fn numericize(expression: &Atom, kernel: &dyn NumericKernel) -> Atom {
  match expression {
    Atom::SExpression(children) => {
      SExpression::new(
        children[0].clone(),
        children[1..].iter().map(|child| numericize(child, kernel)).collect()
      )
    }
    number if number.is_number() => kernel.numeric(number).unwrap_or_else(|| number.clone()),
    other => other.clone()
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
  fn plus() {
    assert_eq!(run("1 + 2 + 3"), "6");
    assert_eq!(run("a + 2 + b + 3"), "Plus[5, a, b]");
    assert_eq!(run("a + 0"), "a");
    assert_eq!(run("Plus[]"), "0");
    assert_eq!(run("1/2 + 1/3"), "5/6");
    assert_eq!(run("x - 3 + 3"), "x");
    assert_eq!(run("a + b"), "Plus[a, b]");
  }

  #[test]
  fn times() {
    assert_eq!(run("2 * 3 * 7"), "42");
    assert_eq!(run("a * 0 * b"), "0");
    assert_eq!(run("1 * a"), "a");
    assert_eq!(run("-(-a)"), "a");
    assert_eq!(run("Times[]"), "1");
    assert_eq!(run("2 * a * 3"), "Times[6, a]");
  }

  #[test]
  fn power() {
    assert_eq!(run("2^10"), "1024");
    assert_eq!(run("2^-2"), "1/4");
    assert_eq!(run("4^(1/2)"), "2");
    assert_eq!(run("x^1"), "x");
    assert_eq!(run("x^0"), "1");
    assert_eq!(run("x^y"), "Power[x, y]");
  }

  #[test]
  fn folding_requires_numeric_function() {
    let mut context = Context::new_global_context();
    evaluate(parse("ClearAttributes[Plus, NumericFunction]").unwrap(), &mut context);
    evaluate(parse("ClearAttributes[Power, NumericFunction]").unwrap(), &mut context);
    assert_eq!(evaluate(parse("1 + 2").unwrap(), &mut context).expression.to_string(), "Plus[1, 2]");
    assert_eq!(evaluate(parse("2^3").unwrap(), &mut context).expression.to_string(), "Power[2, 3]");
    assert_eq!(evaluate(parse("2 * 3").unwrap(), &mut context).expression.to_string(), "6");
  }

  #[test]
  fn division_by_zero() {
    let mut context = Context::new_global_context();
    let result = evaluate(parse("1/0").unwrap(), &mut context);
    assert_eq!(result.expression.to_string(), "Power[0, -1]");
    assert_eq!(result.diagnostics[0].to_string(), "Power::infy");
  }

  #[test]
  fn listable_arithmetic() {
    assert_eq!(run("{1, 2, 3} + 1"), "{2, 3, 4}");
    assert_eq!(run("{1, 2} * {3, 4}"), "{3, 8}");
  }

  #[test]
  fn numeric_values() {
    assert_eq!(run("N[1/4]"), "0.25");
    assert_eq!(run("N[f[2, x]]"), "f[2., x]");
    assert_eq!(run("1.5 + 1/2"), "2.");
    assert_eq!(run("Rational[6, 4]"), "3/2");
    assert_eq!(run("Rational[6, 3]"), "2");
    assert_eq!(run("Complex[1, 0]"), "1");
  }
}
