/*!

The numeric kernel folds arithmetic on number atoms. Builtins for `Plus`, `Times`, `Power`, comparisons, and `N`
only ever touch numbers through the `NumericKernel` trait, so a different kernel can be substituted without touching
the evaluator. Every operation returns `None` when the kernel cannot fold its operands, in which case the caller
leaves the expression unevaluated.

`ExactKernel` is backed by `rug`. Exact operands give exact results. A `Real` operand makes the result `Real`, at the
smallest precision among the `Real` operands. Complex arithmetic is done componentwise.

*/

use std::cmp::Ordering;

use rug::ops::Pow;

use crate::{
  abstractions::{BigFloat, BigInteger, BigRational},
  atom::{Atom, compare_real_values, to_big_float},
  built_ins::DEFAULT_REAL_PRECISION
};

/// Exponents larger than this are not expanded exactly.
const MAX_EXACT_EXPONENT: u32 = 1 << 20;

pub trait NumericKernel {
  fn add(&self, left: &Atom, right: &Atom) -> Option<Atom>;
  fn multiply(&self, left: &Atom, right: &Atom) -> Option<Atom>;
  fn power(&self, base: &Atom, exponent: &Atom) -> Option<Atom>;
  /// Only real numbers are ordered.
  fn compare(&self, left: &Atom, right: &Atom) -> Option<Ordering>;
  /// Converts to a machine precision `Real` (componentwise for complex numbers).
  fn numeric(&self, value: &Atom) -> Option<Atom>;
  fn is_zero(&self, value: &Atom) -> bool;
}

#[derive(Copy, Clone, Debug, Default)]
pub struct ExactKernel;

/// The kernel used unless the host supplies another.
pub static EXACT_KERNEL: ExactKernel = ExactKernel;


impl NumericKernel for ExactKernel {

  fn add(&self, left: &Atom, right: &Atom) -> Option<Atom> {
    match (left, right) {
      (Atom::Complex(_), _) | (_, Atom::Complex(_)) => {
        let (a, b) = complex_parts(left)?;
        let (c, d) = complex_parts(right)?;
        Atom::complex(add_real(&a, &c)?, add_real(&b, &d)?)
      }
      _ => add_real(left, right)
    }
  }

  fn multiply(&self, left: &Atom, right: &Atom) -> Option<Atom> {
    match (left, right) {
      (Atom::Complex(_), _) | (_, Atom::Complex(_)) => {
        // (a + b i)(c + d i) = (ac - bd) + (ad + bc) i
        let (a, b) = complex_parts(left)?;
        let (c, d) = complex_parts(right)?;
        let bd = multiply_real(&b, &d)?;
        let real = add_real(&multiply_real(&a, &c)?, &multiply_real(&Atom::from_i64(-1), &bd)?)?;
        let imaginary = add_real(&multiply_real(&a, &d)?, &multiply_real(&b, &c)?)?;
        Atom::complex(real, imaginary)
      }
      _ => multiply_real(left, right)
    }
  }

  fn power(&self, base: &Atom, exponent: &Atom) -> Option<Atom> {
    match (base, exponent) {
      // Complex bases only to non-negative integer powers, by repeated squaring.
      (Atom::Complex(_), Atom::Integer(n)) => {
        let mut n = n.to_u32().filter(|n| *n <= MAX_EXACT_EXPONENT)?;
        let mut result = Atom::from_i64(1);
        let mut square = base.clone();
        while n > 0 {
          if n & 1 == 1 {
            result = self.multiply(&result, &square)?;
          }
          square = self.multiply(&square, &square)?;
          n >>= 1;
        }
        Some(result)
      }
      (Atom::Complex(_), _) | (_, Atom::Complex(_)) => None,
      _ => power_real(base, exponent)
    }
  }

  fn compare(&self, left: &Atom, right: &Atom) -> Option<Ordering> {
    if left.is_real_number() && right.is_real_number() {
      Some(compare_real_values(left, right))
    } else {
      None
    }
  }

  fn numeric(&self, value: &Atom) -> Option<Atom> {
    match value {
      Atom::Complex(parts) => Atom::complex(self.numeric(&parts.0)?, self.numeric(&parts.1)?),
      Atom::Real(_) => Some(value.clone()),
      other => {
        let x = to_big_float(other)?;
        Some(Atom::Real(BigFloat::with_val(DEFAULT_REAL_PRECISION, x)))
      }
    }
  }

  fn is_zero(&self, value: &Atom) -> bool {
    match value {
      Atom::Integer(n)     => *n == 0,
      Atom::Rational(q)    => *q == 0,
      Atom::Real(x)        => x.is_zero(),
      Atom::Complex(parts) => self.is_zero(&parts.0) && self.is_zero(&parts.1),
      _ => false
    }
  }

}


fn complex_parts(atom: &Atom) -> Option<(Atom, Atom)> {
  match atom {
    Atom::Complex(parts) => Some((parts.0.clone(), parts.1.clone())),
    other if other.is_real_number() => Some((other.clone(), Atom::from_i64(0))),
    _ => None
  }
}

fn as_rational(atom: &Atom) -> Option<BigRational> {
  match atom {
    Atom::Integer(n)  => Some(BigRational::from(n.clone())),
    Atom::Rational(q) => Some(q.clone()),
    _ => None
  }
}

/// The precision of an inexact result: the smallest precision among the `Real` operands.
fn result_precision(left: &Atom, right: &Atom) -> u32 {
  match (left, right) {
    (Atom::Real(x), Atom::Real(y)) => x.prec().min(y.prec()),
    (Atom::Real(x), _) | (_, Atom::Real(x)) => x.prec(),
    _ => DEFAULT_REAL_PRECISION
  }
}

fn add_real(left: &Atom, right: &Atom) -> Option<Atom> {
  if let (Some(p), Some(q)) = (as_rational(left), as_rational(right)) {
    return Some(Atom::from_rational(p + q));
  }
  let precision = result_precision(left, right);
  let x = to_big_float(left)?;
  let y = to_big_float(right)?;
  Some(Atom::Real(BigFloat::with_val(precision, x + &y)))
}

fn multiply_real(left: &Atom, right: &Atom) -> Option<Atom> {
  if let (Some(p), Some(q)) = (as_rational(left), as_rational(right)) {
    return Some(Atom::from_rational(p * q));
  }
  let precision = result_precision(left, right);
  let x = to_big_float(left)?;
  let y = to_big_float(right)?;
  Some(Atom::Real(BigFloat::with_val(precision, x * &y)))
}

fn power_real(base: &Atom, exponent: &Atom) -> Option<Atom> {
  match (base, exponent) {

    (_, Atom::Integer(n)) if as_rational(base).is_some() => {
      let q = as_rational(base)?;
      let magnitude = n.clone().abs().to_u32().filter(|m| *m <= MAX_EXACT_EXPONENT)?;
      let raised = q.pow(magnitude);
      if *n >= 0 {
        Some(Atom::from_rational(raised))
      } else if raised == 0 {
        None
      } else {
        Some(Atom::from_rational(raised.recip()))
      }
    }

    // Exact roots of exact numbers, `4^(1/2)` → `2`. Inexact roots are not folded.
    (_, Atom::Rational(e)) if as_rational(base).is_some() => {
      let q = as_rational(base)?;
      if q < 0 {
        return None;
      }
      let index = e.denom().to_u32()?;
      let (numerator, denominator) = q.into_numer_denom();
      let numerator_root = exact_root(numerator, index)?;
      let denominator_root = exact_root(denominator, index)?;
      power_real(
        &Atom::rational(numerator_root, denominator_root)?,
        &Atom::Integer(e.numer().clone())
      )
    }

    _ => {
      let precision = result_precision(base, exponent);
      let x = to_big_float(base)?;
      let y = to_big_float(exponent)?;
      let result = BigFloat::with_val(precision, x.pow(&y));
      if result.is_finite() {
        Some(Atom::Real(result))
      } else {
        None
      }
    }

  }
}

fn exact_root(n: BigInteger, index: u32) -> Option<BigInteger> {
  let (root, remainder) = n.root_rem(BigInteger::new(), index);
  if remainder == 0 {
    Some(root)
  } else {
    None
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::parse;

  fn atom(text: &str) -> Atom {
    parse(text).unwrap()
  }

  #[test]
  fn exact_arithmetic() {
    let kernel = ExactKernel;
    assert_eq!(kernel.add(&atom("2"), &atom("3")), Some(atom("5")));
    let half = Atom::rational(BigInteger::from(1), BigInteger::from(2)).unwrap();
    assert_eq!(kernel.add(&half, &half), Some(atom("1")));
    assert_eq!(kernel.multiply(&atom("6"), &half), Some(atom("3")));
  }

  #[test]
  fn inexact_contaminates() {
    let kernel = ExactKernel;
    let sum = kernel.add(&atom("1"), &atom("0.5")).unwrap();
    assert!(matches!(sum, Atom::Real(_)));
    assert_eq!(sum.to_string(), "1.5");
  }

  #[test]
  fn powers() {
    let kernel = ExactKernel;
    assert_eq!(kernel.power(&atom("2"), &atom("10")), Some(atom("1024")));
    assert_eq!(
      kernel.power(&atom("2"), &atom("-2")),
      Atom::rational(BigInteger::from(1), BigInteger::from(4))
    );
    assert_eq!(kernel.power(&atom("0"), &atom("-1")), None);
    let half = Atom::rational(BigInteger::from(1), BigInteger::from(2)).unwrap();
    assert_eq!(kernel.power(&atom("4"), &half), Some(atom("2")));
    assert_eq!(kernel.power(&atom("2"), &half), None);
  }

  #[test]
  fn complex_arithmetic() {
    let kernel = ExactKernel;
    let i = Atom::complex(Atom::from_i64(0), Atom::from_i64(1)).unwrap();
    assert_eq!(kernel.multiply(&i, &i), Some(atom("-1")));
    assert_eq!(kernel.power(&i, &atom("4")), Some(atom("1")));
    assert!(kernel.compare(&i, &atom("1")).is_none());
  }

  #[test]
  fn zero_tests() {
    let kernel = ExactKernel;
    assert!(kernel.is_zero(&atom("0")));
    assert!(kernel.is_zero(&atom("0.0")));
    assert!(!kernel.is_zero(&atom("x")));
  }
}
