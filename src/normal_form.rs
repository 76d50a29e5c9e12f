/*!

# Normalization

A key component of matching under commutative and associative heads is a normal form for terms. The ordering of
symbols, terms, and term sequences is arbitrary but fixed.

> An _associative normal form_ (A-normal form) of a term or a sequence is obtained
> by rewriting it with the associativity axiom from left to right as long as
> possible. …

> We introduce a strict total order on function symbols and extend it to ground
> terms and term sequences so that the obtained ordering is also total. A
> commutative normal form (C-normal form) of a ground term is obtained by
> rearranging arguments of commutative function symbols to obtain the minimal term
> with respect to the defined ordering.

The canonical order used here:

  * Numbers order by numeric value, ties broken by type rank Integer < Rational < Real < Complex. Complex numbers
    compare by real part, then imaginary part.
  * Numbers < Strings < Symbols < S-expressions.
  * Strings order lexicographically; symbols order by (context, name).
  * S-expressions order by head first, then leaf-by-leaf; on a common prefix the shorter one is smaller.

The `Orderless` attribute sorts leaves with this order (see `crate::normalize`).

*/

use std::cmp::Ordering;

/// A total order on all atoms.
///
/// The total ordering does not use Rust's in-built `Ord` trait, because implementors may have a different ordering
/// that is natural for the type, and normalization does not require Rust's ordering machinery.
pub trait NormalFormOrder {
  fn cmp(&self, other: &Self) -> Ordering;

  fn is_equal(&self, other: &Self) -> bool {
    self.cmp(other) == Ordering::Equal
  }

  fn is_greater(&self, other: &Self) -> bool {
    self.cmp(other) == Ordering::Greater
  }

  fn is_less(&self, other: &Self) -> bool {
    self.cmp(other) == Ordering::Less
  }
}
