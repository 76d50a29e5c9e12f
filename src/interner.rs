/*!
A global dictionary of interned strings. Provides an abstraction API for any interner library.

The interner lives behind an `RwLock` so that independent sessions on different threads can share it. Lookups of
already interned strings take the read lock only. Resolution hands out owned `String`s or runs a closure while the
lock is held, because the backing storage cannot lend `'static` borrows safely.

*/

use std::{
  cmp::Ordering,
  sync::RwLock
};

use lazy_static::lazy_static;
use string_interner::{
  StringInterner,
  symbol::SymbolU32
};

pub type InternedString = SymbolU32;

lazy_static! {
  static ref STRING_INTERNER: RwLock<StringInterner> = RwLock::new(StringInterner::default());
}


pub fn interned(string: &str) -> InternedString {
  // Fast path: most strings we see are already interned.
  if let Some(symbol) = get_interned(string) {
    return symbol;
  }
  let mut interner = match STRING_INTERNER.write() {
    Ok(guard) => guard,
    Err(poisoned) => poisoned.into_inner()
  };
  interner.get_or_intern(string)
}


pub fn interned_static(string: &'static str) -> InternedString {
  interned(string)
}


pub fn get_interned(string: &str) -> Option<InternedString> {
  let interner = match STRING_INTERNER.read() {
    Ok(guard) => guard,
    Err(poisoned) => poisoned.into_inner()
  };
  interner.get(string)
}


/// Runs `f` on the string for `symbol` while the interner is locked. Do not intern from inside `f`.
pub fn with_resolved<F, R>(symbol: InternedString, f: F) -> R
  where F: FnOnce(&str) -> R
{
  let interner = match STRING_INTERNER.read() {
    Ok(guard) => guard,
    Err(poisoned) => poisoned.into_inner()
  };
  f(interner.resolve(symbol).unwrap_or(""))
}


pub fn resolve_str(symbol: InternedString) -> String {
  with_resolved(symbol, |s| s.to_string())
}


pub fn resolve_str_checked(symbol: InternedString) -> Option<String> {
  let interner = match STRING_INTERNER.read() {
    Ok(guard) => guard,
    Err(poisoned) => poisoned.into_inner()
  };
  interner.resolve(symbol).map(|s| s.to_string())
}


/// Compares the strings behind two interned symbols without copying them.
pub fn compare_resolved(left: InternedString, right: InternedString) -> Ordering {
  if left == right {
    return Ordering::Equal;
  }
  let interner = match STRING_INTERNER.read() {
    Ok(guard) => guard,
    Err(poisoned) => poisoned.into_inner()
  };
  interner.resolve(left).cmp(&interner.resolve(right))
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn intern_is_idempotent() {
    let a = interned("Fibonacci");
    let b = interned_static("Fibonacci");
    assert_eq!(a, b);
    assert_eq!(resolve_str(a), "Fibonacci");
  }

  #[test]
  fn compare_interned_strings() {
    let a = interned("alpha");
    let b = interned("beta");
    assert_eq!(compare_resolved(a, b), Ordering::Less);
    assert_eq!(compare_resolved(b, a), Ordering::Greater);
    assert_eq!(compare_resolved(a, a), Ordering::Equal);
    assert!(get_interned("never-interned-string-xyzzy").is_none());
  }
}
