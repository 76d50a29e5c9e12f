/*!

Combinatorial functions on integers. Arguments are restricted to sizes `rug` computes directly, larger arguments leave
the expression unevaluated.

*/

use crate::{
  abstractions::BigInteger,
  atom::Atom,
  attributes::Attribute,
  built_ins::BuiltinComponent,
  context::SYSTEM_CONTEXT,
  evaluate::Evaluation,
  logging::{Channel, log_with},
  matching::{display_solutions, SolutionSet},
};

pub(crate) static COMPONENTS: &[BuiltinComponent] = &[
  BuiltinComponent {
    name       : "Fibonacci",
    context    : SYSTEM_CONTEXT,
    attributes : &[
      Attribute::Listable,
      Attribute::NumericFunction,
      Attribute::Protected,
      Attribute::ReadProtected,
    ],
    apply_rules: &[("Fibonacci[n_Integer]", Fibonacci)],
    rules      : &[],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "Binomial",
    context    : SYSTEM_CONTEXT,
    attributes : &[Attribute::Listable, Attribute::NumericFunction, Attribute::Protected],
    apply_rules: &[("Binomial[n_Integer, k_Integer]", Binomial)],
    rules      : &[
      ("Binomial[n_, n_]", "1"),
      ("Binomial[n_, 0]", "1"),
    ],
    messages   : &[],
  },
  BuiltinComponent {
    name       : "Multinomial",
    context    : SYSTEM_CONTEXT,
    attributes : &[
      Attribute::Listable,
      Attribute::NumericFunction,
      Attribute::Orderless,
      Attribute::Protected,
    ],
    apply_rules: &[("Multinomial[ns__Integer]", Multinomial)],
    rules      : &[
      ("Multinomial[]", "1"),
    ],
    messages   : &[],
  },
];


/// Implements calls matching the pattern `Fibonacci[n_Integer]`. Negative indices follow
/// `Fibonacci[-n] == (-1)^(n + 1) Fibonacci[n]`.
pub(crate) fn Fibonacci(arguments: &SolutionSet, _: &Atom, _: &mut Evaluation) -> Option<Atom> {
  log_with(Channel::Debug, 5, || format!("Fibonacci called with arguments {}", display_solutions(arguments)));

  let n = match arguments.get_str("n")? {
    Atom::Integer(n) => n.clone(),
    _ => return None
  };
  let index = n.clone().abs().to_u32()?;
  let mut value = BigInteger::from(BigInteger::fibonacci(index));

  if n < 0 && index % 2 == 0 {
    value = -value;
  }

  Some(Atom::Integer(value))
}

/// Implements calls matching the pattern `Binomial[n_Integer, k_Integer]`.
pub(crate) fn Binomial(arguments: &SolutionSet, _: &Atom, _: &mut Evaluation) -> Option<Atom> {
  log_with(Channel::Debug, 5, || format!("Binomial called with arguments {}", display_solutions(arguments)));

  let (n, k) = match (arguments.get_str("n")?, arguments.get_str("k")?) {
    (Atom::Integer(n), Atom::Integer(k)) => (n, k),
    _ => return None
  };

  // Only the lower index needs to fit in a machine word.
  if *k < 0 {
    return if *n >= 0 { Some(Atom::from_i64(0)) } else { None };
  }
  let k = k.to_u32()?;

  Some(Atom::Integer(BigInteger::from(n.binomial_ref(k))))
}

/// Implements calls matching the pattern `Multinomial[ns__Integer]`, the multinomial coefficient
/// `(n1 + n2 + …)! / (n1! n2! …)`, computed as a product of binomials.
pub(crate) fn Multinomial(arguments: &SolutionSet, _: &Atom, _: &mut Evaluation) -> Option<Atom> {
  log_with(Channel::Debug, 5, || format!("Multinomial called with arguments {}", display_solutions(arguments)));

  let mut total: u32 = 0;
  let mut result = BigInteger::from(1);

  for leaf in arguments.get_sequence("ns") {
    let n = match leaf {
      Atom::Integer(n) if n >= 0 => n.to_u32()?,
      _ => return None
    };
    total = total.checked_add(n)?;
    result *= BigInteger::from(BigInteger::from(total).binomial_ref(n));
  }

  Some(Atom::Integer(result))
}


#[cfg(test)]
mod tests {
  use crate::{context::Context, evaluate::evaluate, parse};

  fn run(text: &str) -> String {
    let mut context = Context::new_global_context();
    evaluate(parse(text).unwrap(), &mut context).expression.to_string()
  }

  #[test]
  fn fibonacci() {
    assert_eq!(run("Fibonacci[10]"), "55");
    assert_eq!(run("Fibonacci[0]"), "0");
    assert_eq!(run("Fibonacci[-8]"), "-21");
    assert_eq!(run("Fibonacci[-7]"), "13");
    assert_eq!(run("Fibonacci[{1, 2, 3, 4}]"), "{1, 1, 2, 3}");
    assert_eq!(run("Fibonacci[100]"), "354224848179261915075");
    assert_eq!(run("Fibonacci[x]"), "Fibonacci[x]");
  }

  #[test]
  fn binomial() {
    assert_eq!(run("Binomial[5, 2]"), "10");
    assert_eq!(run("Binomial[-3, 2]"), "6");
    assert_eq!(run("Binomial[5, -1]"), "0");
    assert_eq!(run("Binomial[x, x]"), "1");
    assert_eq!(run("Binomial[x, 0]"), "1");
    assert_eq!(run("Binomial[x, 2]"), "Binomial[x, 2]");
  }

  #[test]
  fn multinomial() {
    assert_eq!(run("Multinomial[]"), "1");
    assert_eq!(run("Multinomial[2, 3]"), "10");
    assert_eq!(run("Multinomial[1, 2, 3]"), "60");
    assert_eq!(run("Multinomial[3, 2, 1]"), "60");
    assert_eq!(run("Multinomial[a, 2]"), "Multinomial[2, a]");
  }
}
