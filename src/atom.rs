/*!

Primitive expression node types.

An `Atom` is the closed set of node kinds an expression tree is built from: the numeric atoms, strings, symbols,
and S-expressions. An S-expression stores its head at index 0 followed by its leaves. Expressions are immutable;
rewriting produces new trees. Cloning is cheap for S-expressions (an `Rc` bump) and for symbols and strings (interned).

*/

use std::{
  rc::Rc,
  cmp::Ordering,
  hash::{Hash, Hasher}
};

use fnv::FnvHasher;
use strum_macros::{
  EnumDiscriminants,
  IntoStaticStr
};

use crate::{
  abstractions::{
    BigInteger,
    BigRational,
    BigFloat
  },
  interner::{
    InternedString,
    interned_static,
    compare_resolved,
    with_resolved,
    resolve_str
  },
  format::{
    Formattable,
    ExpressionFormatter,
    DisplayForm,
    display_formattable_impl
  },
  normal_form::NormalFormOrder,
};

#[derive(Clone, Debug, IntoStaticStr, EnumDiscriminants)]
#[strum_discriminants(name(AtomKind))]
pub enum Atom {
  Integer(BigInteger),
  Rational(BigRational),
  Real(BigFloat),
  /// Real part and imaginary part, each an `Integer`, `Rational`, or `Real`.
  Complex(Rc<(Atom, Atom)>),
  String(InternedString),
  Symbol(InternedString),
  SExpression(Rc<Vec<Atom>>)
}


impl Atom {

  // region Numeric constructors

  pub fn from_i64(n: i64) -> Atom {
    Atom::Integer(BigInteger::from(n))
  }

  /// Rationals are always reduced and have positive denominator. A rational with denominator 1 is an integer.
  pub fn from_rational(q: BigRational) -> Atom {
    if *q.denom() == 1 {
      Atom::Integer(q.numer().clone())
    } else {
      Atom::Rational(q)
    }
  }

  /// Returns `None` if the denominator is zero.
  pub fn rational(numerator: BigInteger, denominator: BigInteger) -> Option<Atom> {
    if denominator == 0 {
      return None;
    }
    // `BigRational::from` canonicalizes: reduced, positive denominator.
    Some(Atom::from_rational(BigRational::from((numerator, denominator))))
  }

  pub fn from_f64(value: f64) -> Atom {
    Atom::Real(BigFloat::with_val(crate::built_ins::DEFAULT_REAL_PRECISION, value))
  }

  /// Creates a complex number. An exact zero imaginary part gives back the real part. Returns `None` if either part
  /// is not a real number.
  pub fn complex(real: Atom, imaginary: Atom) -> Option<Atom> {
    if !real.is_real_number() || !imaginary.is_real_number() {
      return None;
    }
    match &imaginary {
      Atom::Integer(n) if *n == 0 => Some(real),
      _ => Some(Atom::Complex(Rc::new((real, imaginary))))
    }
  }

  // endregion

  pub fn head(&self) -> Atom {
    match self {
      Atom::SExpression(children) => {
        match children.first() {
          Some(expression) => expression.clone(),
          None => headless_s_expression(),
        }
      }

      atom => {
        Symbol::from_static_str(atom.into())
      }
    }
  }

  /// Reports the `AtomKind` of `self`.
  pub fn kind(&self) -> AtomKind {
    self.into()
  }

  /// Gives the symbol (as an `InternedString`) under which the properties of this
  /// expression would be stored in the symbol table: the symbol itself, or the head
  /// of an S-expression when the head is a symbol.
  pub fn name(&self) -> Option<InternedString> {
    match self {
      Atom::SExpression(children) => {
        match &children[0] {
          Atom::Symbol(name) => Some(*name),
          _                  => None
        }
      },
      Atom::Symbol(name) => Some(*name),
      _                  => None
    }
  }

  /// The innermost symbolic head, e.g. `f` for `f[a][b]`. Sub-values are stored under this symbol.
  pub fn innermost_name(&self) -> Option<InternedString> {
    match self {
      Atom::SExpression(children) => children[0].innermost_name(),
      Atom::Symbol(name)          => Some(*name),
      _                           => None
    }
  }

  /// Returns the length of the expression. Only S-Expressions can have nonzero length.
  pub fn len(&self) -> usize {
    match self {
      Atom::SExpression(children) => children.len() - 1, // Don't count the head.
      _ => 0
    }
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// The leaves of an S-expression (not including the head). Empty for every other atom.
  pub fn leaves(&self) -> &[Atom] {
    match self {
      Atom::SExpression(children) => &children[1..],
      _ => &[]
    }
  }

  pub fn is_atomic(&self) -> bool {
    !matches!(self, Atom::SExpression(_))
  }

  /// Is `self` the symbol with the given name?
  pub fn is_symbol(&self, name: &'static str) -> bool {
    match self {
      Atom::Symbol(s) => *s == interned_static(name),
      _ => false
    }
  }

  /// Is `self` an S-expression whose head is the symbol with the given name?
  pub fn has_head(&self, name: &'static str) -> bool {
    match self {
      Atom::SExpression(children) => children[0].is_symbol(name),
      _ => false
    }
  }

  // region Pattern Matching Utilities

  /// Is `atom` the symbol `True`
  pub fn is_true(&self) -> bool {
    self.is_symbol("True")
  }

  /// Is `atom` the symbol `False`
  pub fn is_false(&self) -> bool {
    self.is_symbol("False")
  }

  /// If `self` has the form `Sequence[a, b, …]`, returns a vector of only the children `a, b, …`.
  pub fn is_sequence(&self) -> Option<Vec<Atom>> {
    if self.has_head("Sequence") {
      return Some(self.leaves().to_vec());
    }
    None
  }

  /// Does a pattern construct occur anywhere in `self`?
  pub fn contains_pattern(&self) -> bool {
    match self {
      Atom::SExpression(children) => {
        match &children[0] {
          Atom::Symbol(name) if is_pattern_head(*name) => true,
          _ => children.iter().any(|c| c.contains_pattern())
        }
      }
      _ => false
    }
  }

  // endregion

  // region Numbers

  pub fn is_number(&self) -> bool {
    matches!(self, Atom::Integer(_) | Atom::Rational(_) | Atom::Real(_) | Atom::Complex(_))
  }

  /// Integer, Rational, or Real.
  pub fn is_real_number(&self) -> bool {
    matches!(self, Atom::Integer(_) | Atom::Rational(_) | Atom::Real(_))
  }

  pub fn is_exact_number(&self) -> bool {
    match self {
      Atom::Integer(_) | Atom::Rational(_) => true,
      Atom::Complex(parts) => parts.0.is_exact_number() && parts.1.is_exact_number(),
      _ => false
    }
  }

  /// The machine-sized value of an integer, if it fits.
  pub fn to_i64(&self) -> Option<i64> {
    match self {
      Atom::Integer(n) => n.to_i64(),
      _ => None
    }
  }

  /// Rank of a number kind within the canonical order. Integer < Rational < Real < Complex.
  fn number_rank(&self) -> u32 {
    match self {
      Atom::Integer(_)  => 0,
      Atom::Rational(_) => 1,
      Atom::Real(_)     => 2,
      _                 => 3,
    }
  }

  /// Rank of a kind of atom within the canonical order. Numbers < Strings < Symbols < S-expressions.
  fn kind_rank(&self) -> u32 {
    match self {
      Atom::Integer(_)
      | Atom::Rational(_)
      | Atom::Real(_)
      | Atom::Complex(_)    => 0,
      Atom::String(_)       => 1,
      Atom::Symbol(_)       => 2,
      Atom::SExpression(_)  => 3,
    }
  }

  // endregion

  /// An FNV hash of the expression. Structurally equal expressions have equal hashes.
  pub fn hashed(&self) -> u64 {
    let mut hasher = FnvHasher::default();
    self.hash(&mut hasher);
    hasher.finish()
  }
}


impl PartialEq for Atom {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (Atom::Integer(a), Atom::Integer(b))         => a == b,
      (Atom::Rational(a), Atom::Rational(b))       => a == b,
      // The total order makes equality reflexive for NaN. Precision is not part of the value.
      (Atom::Real(a), Atom::Real(b))               => a.total_cmp(b) == Ordering::Equal,
      (Atom::Complex(a), Atom::Complex(b))         => a == b,
      (Atom::String(a), Atom::String(b))           => a == b,
      (Atom::Symbol(a), Atom::Symbol(b))           => a == b,
      (Atom::SExpression(a), Atom::SExpression(b)) => a == b,
      _ => false
    }
  }
}

impl Eq for Atom {}

/**
  If two expressions just happen to have the same representation, a string and a symbol, we still want their hashes
  to differ. So we hash a type-specific prefix before hashing the data. We use the same prefix as Cory's expreduce
  for compatibility.

  ```text
      real      : [195, 244, 76 , 249, 227, 115, 88 , 251]
      complex   : [82 , 226, 223, 39 , 113, 26 , 149, 249]
      expression: [72 , 5  , 244, 86 , 5  , 210, 69 , 30]
      integer   : [242, 99 , 84 , 113, 102, 46 , 118, 94]
      rational  : [90 , 82 , 214, 51 , 52 , 7  , 7  , 33]
      string    : [102, 206, 57 , 172, 207, 100, 198, 133]
      symbol    : [107, 10 , 247, 23 , 33 , 221, 163, 156]
  ```
*/
impl Hash for Atom {
  fn hash<H: Hasher>(&self, hasher: &mut H) {
    match self {
      Atom::String(v) => {
        hasher.write(&[102, 206, 57 , 172, 207, 100, 198, 133]);
        v.hash(hasher);
      }

      Atom::Integer(v) => {
        hasher.write(&[242, 99, 84, 113, 102, 46, 118, 94]);
        v.hash(hasher)
      }

      Atom::Rational(v) => {
        hasher.write(&[90 , 82 , 214, 51 , 52 , 7  , 7  , 33]);
        v.hash(hasher)
      }

      Atom::Real(v) => {
        hasher.write(&[195, 244, 76 , 249, 227, 115, 88 , 251]);
        // Hash the value alone, with trailing zero bits of the mantissa shifted out, so that equal values of
        // different precisions hash alike.
        if let Some((mut mantissa, mut exponent)) = v.to_integer_exp() {
          if let Some(zeros) = mantissa.find_one(0) {
            mantissa >>= zeros;
            exponent += zeros as i32;
          }
          mantissa.hash(hasher);
          exponent.hash(hasher);
        }
      }

      Atom::Complex(parts) => {
        hasher.write(&[82 , 226, 223, 39 , 113, 26 , 149, 249]);
        parts.0.hash(hasher);
        parts.1.hash(hasher);
      }

      Atom::Symbol(v) => {
        hasher.write(&[107, 10 , 247, 23 , 33 , 221, 163, 156]);
        v.hash(hasher);
      }

      Atom::SExpression(v) => {
        hasher.write(&[72 , 5  , 244, 86 , 5  , 210, 69 , 30]);
        for part in v.as_ref() {
          part.hash(hasher);
        }
      }

    }
  }
}

impl Formattable for Atom {
  fn format(&self, formatter: &ExpressionFormatter) -> String {
    match self {
      Atom::String(v) => {
        with_resolved(*v, |s| format!("\"{}\"", s.replace('"', "\\\"")))
      }

      Atom::Integer(v) => {
        format!("{}", v)
      }

      Atom::Rational(v) => {
        match formatter.form {
          DisplayForm::Full => format!("Rational[{}, {}]", v.numer(), v.denom()),
          _                 => format!("{}/{}", v.numer(), v.denom()),
        }
      }

      Atom::Real(v) => {
        format_real(v)
      }

      Atom::Complex(parts) => {
        format!("Complex[{}, {}]", parts.0.format(formatter), parts.1.format(formatter))
      }

      Atom::Symbol(v) => {
        resolve_str(*v)
      }

      Atom::SExpression(v) => {
        format_s_expression(self, v, formatter)
      }
    }
  }
}

display_formattable_impl!(Atom);

/// Machine precision reals print like `2.` or `0.25`. Higher precision reals print all their digits.
fn format_real(v: &BigFloat) -> String {
  if v.prec() <= crate::built_ins::DEFAULT_REAL_PRECISION {
    let value = v.to_f64();
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
      format!("{}.", value)
    } else {
      format!("{}", value)
    }
  } else {
    v.to_string_radix(10, None)
  }
}

fn format_s_expression(atom: &Atom, children: &Rc<Vec<Atom>>, formatter: &ExpressionFormatter) -> String {
  let (open, close) = match formatter.form {
    DisplayForm::Matcher => ("❨", "❩"),
    _                    => ("[", "]"),
  };

  if formatter.form != DisplayForm::Full {
    // Blanks
    if let Some(text) = format_blank(atom, formatter) {
      return text;
    }
    // Lists
    if atom.has_head("List") {
      return format!(
        "{{{}}}",
        children[1..].iter().map(|c| c.format(formatter)).collect::<Vec<_>>().join(", ")
      );
    }
  }

  format!(
    "{}{}{}{}",
    children[0].format(formatter),
    open,
    children[1..].iter()
                 .map(|c| c.format(formatter))
                 .collect::<Vec<_>>()
                 .join(", "),
    close
  )
}

/// Renders `Blank[h]` as `_h`, `Pattern[x, Blank[h]]` as `x_h`, and likewise for the sequence blanks.
fn format_blank(atom: &Atom, formatter: &ExpressionFormatter) -> Option<String> {
  let blank_text = |blank: &Atom| -> Option<String> {
    let underscores = if blank.has_head("Blank") {
      "_"
    } else if blank.has_head("BlankSequence") {
      "__"
    } else if blank.has_head("BlankNullSequence") {
      "___"
    } else {
      return None;
    };
    let constraint = blank.leaves().first().map(|h| h.format(formatter)).unwrap_or_default();
    Some(format!("{}{}", underscores, constraint))
  };

  if let Some(text) = blank_text(atom) {
    return Some(text);
  }

  if atom.has_head("Pattern") && atom.len() == 2 {
    let name = atom.leaves()[0].format(formatter);
    let inner = &atom.leaves()[1];
    return match (formatter.form, blank_text(inner)) {
      (DisplayForm::Matcher, Some(_)) if inner.has_head("Blank") => Some(format!("‹{}›", name)),
      (DisplayForm::Matcher, Some(_)) => Some(format!("«{}»", name)),
      (_, Some(text)) => Some(format!("{}{}", name, text)),
      (_, None) => Some(format!("{}:{}", name, inner.format(formatter))),
    };
  }

  None
}

impl NormalFormOrder for Atom {
  fn cmp(&self, other: &Self) -> Ordering {
    match (self, other) {

      // Same expression type //

      (Atom::Symbol(s), Atom::Symbol(t))
      => compare_symbols(*s, *t),

      (Atom::String(s), Atom::String(t))
      => compare_resolved(*s, *t),

      (Atom::SExpression(f), Atom::SExpression(g))
      => {
        // S-expressions are compared via lexicographic comparison of their children, head first.
        for (left, right) in f.iter().zip(g.iter()) {
          let ordering: Ordering = NormalFormOrder::cmp(left, right);
          if ordering != Ordering::Equal {
            return ordering;
          }
        };
        // If we get this far, expression pairs have been equal. Compare lengths.
        f.len().cmp(&g.len())
      },

      (s, t) if s.is_number() && t.is_number() => compare_numbers(s, t),

      // Different expression types //
      // Numbers < String < Symbol < SExpression
      (thing_one, thing_two) => {
        thing_one.kind_rank().cmp(&thing_two.kind_rank())
      }

    } // end match
  }
}

/// Symbols order by (context, name). A bare name is in the default context of that name.
fn compare_symbols(s: InternedString, t: InternedString) -> Ordering {
  if s == t {
    return Ordering::Equal;
  }
  let left  = resolve_str(s);
  let right = resolve_str(t);
  let (_, left_name)  = Symbol::split_context(&left);
  let (_, right_name) = Symbol::split_context(&right);
  Symbol::context_of(&left).cmp(Symbol::context_of(&right))
                           .then_with(|| left_name.cmp(right_name))
}

/// Numeric comparison by value, then by number type rank.
fn compare_numbers(s: &Atom, t: &Atom) -> Ordering {
  let (s_re, s_im) = complex_parts(s);
  let (t_re, t_im) = complex_parts(t);

  compare_real_values(s_re, t_re)
      .then_with(|| {
        match (s_im, t_im) {
          (None, None)       => Ordering::Equal,
          (Some(a), Some(b)) => compare_real_values(a, b),
          (Some(a), None)    => ZERO.with(|zero| compare_real_values(a, zero)),
          (None, Some(b))    => ZERO.with(|zero| compare_real_values(zero, b)),
        }
      })
      .then_with(|| s.number_rank().cmp(&t.number_rank()))
}

thread_local! {
  static ZERO: Atom = Atom::from_i64(0);
}

fn complex_parts(atom: &Atom) -> (&Atom, Option<&Atom>) {
  match atom {
    Atom::Complex(parts) => (&parts.0, Some(&parts.1)),
    other => (other, None)
  }
}

/// Compares two real numbers (`Integer`, `Rational`, or `Real`) by value.
pub(crate) fn compare_real_values(s: &Atom, t: &Atom) -> Ordering {
  match (s, t) {
    (Atom::Integer(a), Atom::Integer(b))   => a.cmp(b),
    (Atom::Rational(a), Atom::Rational(b)) => a.cmp(b),
    (Atom::Integer(a), Atom::Rational(b))  => BigRational::from(a.clone()).cmp(b),
    (Atom::Rational(a), Atom::Integer(b))  => a.cmp(&BigRational::from(b.clone())),
    (a, b) => {
      match (to_big_float(a), to_big_float(b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => Ordering::Equal
      }
    }
  }
}

/// Converts a real number to a `BigFloat` of at least machine precision.
pub(crate) fn to_big_float(atom: &Atom) -> Option<BigFloat> {
  let precision = crate::built_ins::DEFAULT_REAL_PRECISION.max(128);
  match atom {
    Atom::Integer(n)  => Some(BigFloat::with_val(precision, n)),
    Atom::Rational(q) => Some(BigFloat::with_val(precision, q)),
    Atom::Real(r)     => Some(BigFloat::with_val(precision.max(r.prec()), r)),
    _ => None
  }
}


/// A critical error state.
fn headless_s_expression() -> ! {
  unreachable!("Encountered an S-expression without a head, which is impossible. This is a bug.")
}

/// The heads that make an expression a pattern rather than a literal.
pub(crate) fn is_pattern_head(name: InternedString) -> bool {
  name == interned_static("Pattern")
      || name == interned_static("Blank")
      || name == interned_static("BlankSequence")
      || name == interned_static("BlankNullSequence")
      || name == interned_static("Condition")
      || name == interned_static("PatternTest")
      || name == interned_static("Optional")
      || name == interned_static("Alternatives")
}


/// There are a variety of common tasks that apply only to a specific variant of `Atom`. Instead of packing them all
/// into `Atom`'s impl, we put them into free functions in a module named after the variant. The functions that remain
/// in `Atom`'s impl are those that could reasonably be called on any `Atom` variant.
#[allow(non_snake_case)]
pub mod Symbol {
  use crate::atom::Atom;
  use crate::built_ins::is_system_name;
  use crate::context::{GLOBAL_CONTEXT, SYSTEM_CONTEXT};
  use crate::interner::{
    interned,
    interned_static
  };

  /// We often have a need to create an expression for some standard built-in or stdlib symbol.
  pub fn from_static_str(name: &'static str) -> Atom {
    Atom::Symbol(interned_static(canonical_name(name)))
  }

  /// Create a symbol from a `&str`. `Global`x` and `x` give the same symbol.
  pub fn from_str(name: &str) -> Atom {
    Atom::Symbol(interned(canonical_name(name)))
  }

  /// Splits `ctx`name` into (`ctx``, `name`). A name without a context mark has the empty context.
  pub fn split_context(full_name: &str) -> (&str, &str) {
    match full_name.rfind('`') {
      Some(index) => (&full_name[..=index], &full_name[index + 1..]),
      None        => ("", full_name)
    }
  }

  /// The context a bare name belongs to: `System`` for builtins, `Global`` for everything else.
  pub fn default_context(name: &str) -> &'static str {
    if is_system_name(name) {
      SYSTEM_CONTEXT
    } else {
      GLOBAL_CONTEXT
    }
  }

  /// The context of a symbol: its explicit context mark, or the default context of its bare name.
  pub fn context_of(full_name: &str) -> &str {
    match split_context(full_name) {
      ("", name)   => default_context(name),
      (context, _) => context,
    }
  }

  /// The spelling a symbol is interned under. A context mark naming the default context of the bare name is dropped,
  /// so each (context, name) pair has exactly one spelling.
  pub fn canonical_name(full_name: &str) -> &str {
    match split_context(full_name) {
      (context, name) if !context.is_empty() && context == default_context(name) => name,
      _ => full_name
    }
  }

  pub fn true_symbol() -> Atom {
    from_static_str("True")
  }

  pub fn false_symbol() -> Atom {
    from_static_str("False")
  }

  pub fn null() -> Atom {
    from_static_str("Null")
  }

  pub fn from_bool(value: bool) -> Atom {
    if value { true_symbol() } else { false_symbol() }
  }
}

#[allow(non_snake_case)]
pub mod SExpression {
  use std::rc::Rc;
  use super::*;

  // region Convenience construction functions
  // Using these functions decreases the probability of an incorrectly constructed expression.

  /// Creates a new `Atom::SExpression` having head  `head` and children `children`.
  pub fn new(head: Atom, children: Vec<Atom>) -> Atom {
    let mut new_children = Vec::with_capacity(children.len()+1);
    new_children.push(head);
    new_children.extend(children);
    Atom::SExpression(Rc::new(new_children))
  }

  /// We often have a need to create an expression for some standard built-in or stdlib symbol.
  pub fn with_str_head(head_str: &'static str) -> Atom {
    Atom::SExpression(Rc::new(vec![Symbol::from_static_str(head_str)]))
  }

  /// Creates `head[children…]` for a built-in head.
  pub fn apply(head: &'static str, children: Vec<Atom>) -> Atom {
    new(Symbol::from_static_str(head), children)
  }

  pub fn apply_unary(head: &'static str, child: Atom) -> Atom {
    new(Symbol::from_static_str(head), vec![child])
  }

  pub fn apply_binary(head: &'static str, left: Atom, right: Atom) -> Atom {
    new(Symbol::from_static_str(head), vec![left, right])
  }

  /// Creates an empty `Sequence[]`.
  pub fn empty_sequence() -> Atom {
    with_str_head("Sequence")
  }

  /// Creates a `Sequence[]` with the provided children.
  pub fn sequence(children: Vec<Atom>) -> Atom {
    apply("Sequence", children)
  }

  pub fn list(children: Vec<Atom>) -> Atom {
    apply("List", children)
  }

  // endregion

  /// Splices the leaves of any `Sequence[…]` leaf into the parent: `f[a, Sequence[b, c]]` becomes `f[a, b, c]`.
  pub fn splice_sequences(expression: Atom) -> Atom {
    match &expression {
      Atom::SExpression(children) if children[1..].iter().any(|c| c.has_head("Sequence")) => {
        let mut new_children = Vec::with_capacity(children.len());
        new_children.push(children[0].clone());
        for child in children[1..].iter() {
          if child.has_head("Sequence") {
            new_children.extend(child.leaves().iter().cloned());
          } else {
            new_children.push(child.clone());
          }
        }
        Atom::SExpression(Rc::new(new_children))
      }
      _ => expression
    }
  }

  /// If `thing` is a `List`, applies `f` to each of its leaves. Otherwise applies `f` to `thing` itself.
  pub fn extract_thing_or_list_of_things<T, F>(thing: &Atom, f: F) -> Vec<T>
    where F: Fn(&Atom) -> Option<T>
  {
    if thing.has_head("List") {
      thing.leaves().iter().filter_map(|c| f(c)).collect()
    } else {
      f(thing).into_iter().collect()
    }
  }

}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::parse;

  #[test]
  fn canonical_order_of_numbers() {
    let one      = Atom::from_i64(1);
    let half     = Atom::rational(BigInteger::from(1), BigInteger::from(2)).unwrap();
    let one_real = Atom::from_f64(1.0);
    let two      = Atom::from_i64(2);

    assert!(half.is_less(&one));
    assert!(one.is_less(&one_real)); // equal value, Integer < Real
    assert!(one_real.is_less(&two));
    assert!(two.is_less(&Atom::String(interned_static("a"))));
  }

  #[test]
  fn canonical_order_of_expressions() {
    let a = parse("f[a, b]").unwrap();
    let b = parse("f[a, c]").unwrap();
    let c = parse("f[a]").unwrap();
    let d = parse("g[a]").unwrap();

    assert!(a.is_less(&b));
    assert!(c.is_less(&a)); // shorter sequence on a common prefix
    assert!(a.is_less(&d)); // head first
    assert!(Symbol::from_static_str("z").is_less(&c)); // symbols before expressions
  }

  #[test]
  fn symbols_order_by_context_then_name() {
    let user     = Symbol::from_static_str("b");
    let builtin  = Symbol::from_static_str("Plus");
    let with_ctx = Symbol::from_static_str("A`a");
    assert!(with_ctx.is_less(&user));    // A` < Global`
    assert!(user.is_less(&builtin));     // Global` < System`
    assert_eq!(Symbol::split_context("A`B`x"), ("A`B`", "x"));
  }

  #[test]
  fn one_spelling_per_symbol() {
    assert_eq!(Symbol::from_str("Global`x"), Symbol::from_str("x"));
    assert_eq!(Symbol::from_str("System`Plus"), Symbol::from_static_str("Plus"));
    assert_ne!(Symbol::from_str("Global`Plus"), Symbol::from_static_str("Plus"));
    assert_ne!(Symbol::from_str("A`x"), Symbol::from_str("x"));
    assert_eq!(Symbol::from_str("Global`x").to_string(), "x");
    assert_eq!(Symbol::from_str("A`x").to_string(), "A`x");
    assert_eq!(Symbol::context_of("x"), "Global`");
    assert_eq!(Symbol::context_of("Plus"), "System`");
    assert_eq!(Symbol::context_of("A`x"), "A`");
  }

  #[test]
  fn rationals_normalize() {
    let q = Atom::rational(BigInteger::from(4), BigInteger::from(-2)).unwrap();
    assert_eq!(q, Atom::from_i64(-2));
    let q = Atom::rational(BigInteger::from(2), BigInteger::from(-6)).unwrap();
    assert_eq!(q.to_string(), "-1/3");
    assert!(Atom::rational(BigInteger::from(2), BigInteger::from(0)).is_none());
  }

  #[test]
  fn complex_with_zero_imaginary_part_is_real() {
    let z = Atom::complex(Atom::from_i64(3), Atom::from_i64(0)).unwrap();
    assert_eq!(z, Atom::from_i64(3));
    let z = Atom::complex(Atom::from_i64(3), Atom::from_i64(1)).unwrap();
    assert_eq!(z.head(), Symbol::from_static_str("Complex"));
  }

  #[test]
  fn hash_agrees_with_equality() {
    let a = parse("f[x, {1, 2}, \"s\"]").unwrap();
    let b = parse("f[x, {1, 2}, \"s\"]").unwrap();
    assert_eq!(a, b);
    assert_eq!(a.hashed(), b.hashed());
    assert_ne!(Symbol::from_static_str("s").hashed(), Atom::String(interned_static("s")).hashed());
  }

  #[test]
  fn reals_hash_by_value() {
    let low  = Atom::Real(BigFloat::with_val(53, 1.5));
    let high = Atom::Real(BigFloat::with_val(200, 1.5));
    assert_eq!(low, high);
    assert_eq!(low.hashed(), high.hashed());

    let nan = Atom::from_f64(f64::NAN);
    assert_eq!(nan, nan.clone());
    assert_eq!(nan.hashed(), nan.clone().hashed());
  }

  #[test]
  fn format_patterns_and_lists() {
    let e = parse("f[x_, y__Integer, z___, {a, b}, _]").unwrap();
    assert_eq!(e.to_string(), "f[x_, y__Integer, z___, {a, b}, _]");
    assert_eq!(
      e.format(&DisplayForm::Full.into()),
      "f[Pattern[x, Blank[]], Pattern[y, BlankSequence[Integer]], Pattern[z, BlankNullSequence[]], List[a, b], Blank[]]"
    );
    assert_eq!(Atom::from_f64(2.0).to_string(), "2.");
    assert_eq!(Atom::from_f64(0.25).to_string(), "0.25");
  }

  #[test]
  fn splice_sequences_test() {
    let e = parse("f[a, Sequence[b, c], d, Sequence[]]").unwrap();
    assert_eq!(SExpression::splice_sequences(e).to_string(), "f[a, b, c, d]");
  }
}
