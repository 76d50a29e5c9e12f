/*!

The attributes of a symbol, e.g. `Flat`, `Listable`, ….

Attributes are implemented as a bitfield. The attributes of a head govern how its expressions are normalized before
rule lookup (`Flat`, `Orderless`, `Listable`), which leaves are evaluated (`HoldFirst`, `HoldRest`, `HoldAll`,
`HoldAllComplete`, `SequenceHold`), how the matcher treats the head (`Flat`, `Orderless`, `OneIdentity`), and
whether the symbol's definitions may change (`Protected`, `Locked`).

*/

use std::{
  ops::{Add, Index},
  iter::Sum
};

use strum::IntoEnumIterator;
use strum_macros::{Display, IntoStaticStr, EnumString, EnumIter};

use crate::atom::{Atom, Symbol, SExpression};

#[derive(Copy, Clone, PartialEq, Eq, Display, IntoStaticStr, Debug, EnumString, EnumIter, Hash)]
#[repr(u32)]
pub enum Attribute {
  /// Leaves are sorted into canonical order: `f[b, a] == f[a, b]`.
  Orderless = 0,
  /// Nested applications are flattened: `f[a, f[b, c]] == f[a, b, c]`.
  Flat,
  /// Recorded and reported by `Attributes`. The matcher does not consult it: `f[x]` never matches `x` on its own.
  OneIdentity,
  /// The function should automatically be threaded over lists: `f[{a, b, c}] == {f[a], f[b], f[c]}`.
  Listable,
  HoldFirst,
  HoldRest,
  HoldAll,
  /// Like `HoldAll`, but `Evaluate` and `Sequence` splicing are also suppressed.
  HoldAllComplete,
  /// `Sequence[…]` leaves are not spliced.
  SequenceHold,
  /// Numbers among the arguments are folded by the builtin arithmetic.
  NumericFunction,
  /// Values of the symbol cannot be changed.
  Protected,
  /// Attributes of the symbol cannot be changed.
  Locked,
  ReadProtected,
  Constant,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub struct Attributes(pub u32);

// These exist solely to be static references, which the `Index` trait insists on requiring.
static ATTRIBUTE_SET: bool = true;
static ATTRIBUTE_UNSET: bool = false;

impl Index<Attribute> for Attributes {
  type Output = bool;

  fn index(&self, index: Attribute) -> &Self::Output {
    if self.get(index) {
      &ATTRIBUTE_SET
    } else {
      &ATTRIBUTE_UNSET
    }
  }
}

impl Default for Attributes {
  fn default() -> Self {
    Attributes(0)
  }
}

impl From<Attribute> for Attributes {
  fn from(attribute: Attribute) -> Self {
    Attributes(1u32 << attribute as u32)
  }
}

impl From<&[Attribute]> for Attributes {
  fn from(attributes: &[Attribute]) -> Self {
    attributes.iter().map(|a| Attributes::from(*a)).sum()
  }
}

impl Attributes {
  pub fn new() -> Self {
    Attributes::default()
  }

  pub fn update(&mut self, attributes: Attributes) {
    self.0 |= attributes.0;
  }

  pub fn remove(&mut self, attributes: Attributes) {
    self.0 &= !attributes.0;
  }

  pub fn is_empty(&self) -> bool {
    self.0 == 0
  }

  /// The set attributes in declaration order.
  pub fn iter(&self) -> impl Iterator<Item=Attribute> + '_ {
    Attribute::iter().filter(move |a| self.get(*a))
  }

  /// `{Flat, Orderless, …}` as an expression, sorted by name the way `Attributes[f]` reports them.
  pub fn to_atom(&self) -> Atom {
    let mut names: Vec<&'static str> = self.iter().map(|a| a.into()).collect();
    names.sort_unstable();
    SExpression::list(names.into_iter().map(Symbol::from_static_str).collect())
  }

  // region Convenience getters and setters

  pub fn get(&self, attribute: Attribute) -> bool {
    (self.0 & (1 << attribute as u32)) != 0
  }

  pub fn set(&mut self, attribute: Attribute) {
    self.0 |= 1 << attribute as u32
  }

  pub fn reset(&mut self, attribute: Attribute) {
    self.0 &= !(1 << attribute as u32)
  }

  pub fn orderless(&self) -> bool {
    self.get(Attribute::Orderless)
  }

  pub fn flat(&self) -> bool {
    self.get(Attribute::Flat)
  }

  pub fn listable(&self) -> bool {
    self.get(Attribute::Listable)
  }

  pub fn hold_first(&self) -> bool {
    self.get(Attribute::HoldFirst) || self.hold_all()
  }

  pub fn hold_rest(&self) -> bool {
    self.get(Attribute::HoldRest) || self.hold_all()
  }

  /// `HoldAllComplete` implies `HoldAll`.
  pub fn hold_all(&self) -> bool {
    self.get(Attribute::HoldAll) || self.hold_all_complete()
  }

  pub fn hold_all_complete(&self) -> bool {
    self.get(Attribute::HoldAllComplete)
  }

  /// `HoldAllComplete` implies `SequenceHold`.
  pub fn sequence_hold(&self) -> bool {
    self.get(Attribute::SequenceHold) || self.hold_all_complete()
  }

  pub fn numeric_function(&self) -> bool {
    self.get(Attribute::NumericFunction)
  }

  pub fn protected(&self) -> bool {
    self.get(Attribute::Protected)
  }

  pub fn locked(&self) -> bool {
    self.get(Attribute::Locked)
  }

  pub fn read_protected(&self) -> bool {
    self.get(Attribute::ReadProtected)
  }

  // endregion

}

// region Attribute addition implementations.

impl Sum<Attributes> for Attributes {
  fn sum<I: Iterator<Item=Attributes>>(iter: I) -> Self {
    let mut attributes: Attributes = Attributes::default();
    for a in iter{
      attributes.update(a);
    }
    attributes
  }
}

impl Add<Attribute> for Attributes {
  type Output = Self;

  fn add(mut self, other: Attribute) -> Self {
    self.set(other);
    self
  }
}


impl Add<Attribute> for Attribute {
  type Output = Attributes;

  fn add(self, other: Attribute) -> Self::Output {
    let mut out: Attributes = self.into();
    out.set(other);
    out
  }
}

impl Add for Attributes {
  type Output = Self;

  fn add(mut self, other: Self) -> Self {
    self.update(other);
    self
  }
}

// endregion

#[cfg(test)]
mod tests {
  use std::str::FromStr;
  use super::*;

  #[test]
  fn attribute_index() {
    let mut attributes = Attributes::new();

    attributes.set(Attribute::Orderless);
    attributes.set(Attribute::Listable);
    attributes.set(Attribute::Orderless);
    attributes.set(Attribute::Locked);

    assert!(attributes.orderless());
    assert!(!attributes.flat());
    assert!(!attributes[Attribute::OneIdentity]);
    assert!(attributes.listable());
    assert!(!attributes.protected());
    assert!(attributes.locked());
    assert!(attributes[Attribute::Listable]);
    assert!(!attributes[Attribute::SequenceHold]);
  }

  #[test]
  fn unset_attribute() {
    let mut attributes = Attribute::Flat + Attribute::Orderless + Attribute::OneIdentity;

    attributes.reset(Attribute::Flat);
    attributes.remove(Attribute::Orderless.into());

    assert!(!attributes.flat());
    assert!(!attributes.orderless());
    assert!(attributes[Attribute::OneIdentity]);
  }

  #[test]
  fn implied_holds() {
    let attributes: Attributes = Attribute::HoldAllComplete.into();
    assert!(attributes.hold_all());
    assert!(attributes.hold_first());
    assert!(attributes.hold_rest());
    assert!(attributes.sequence_hold());
  }

  #[test]
  fn names_round_trip_through_strum() {
    assert_eq!(Attribute::from_str("Orderless").unwrap(), Attribute::Orderless);
    assert!(Attribute::from_str("NotAnAttribute").is_err());
    let attributes = Attribute::Orderless + Attribute::Flat;
    assert_eq!(attributes.to_atom().to_string(), "{Flat, Orderless}");
  }
}
