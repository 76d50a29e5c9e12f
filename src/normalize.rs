/*!

The attribute normalizer puts an S-expression into the canonical form its head's attributes call for, before any rule
is tried against it:

 1. `Flat`: leaves with the same head are spliced into the parent, recursively.
 2. `Orderless`: leaves are sorted into canonical order (stable).
 3. `Listable`: if any leaf is a `List`, the expression is threaded over the lists, `h[{a, b}, c]` → `{h[a, c],
    h[b, c]}`. Lists of different lengths cannot be threaded.

Flattening changes the arity, and sorting assumes the final arity, hence the order.

*/

use std::rc::Rc;

use crate::{
  atom::{Atom, SExpression},
  attributes::Attributes,
  interner::InternedString,
  normal_form::NormalFormOrder
};

#[derive(Clone, Debug, PartialEq)]
pub enum Normalized {
  /// The canonical form, which may be the input itself.
  Canonical(Atom),
  /// A `Listable` head was threaded over its list leaves. The leaves of the resulting `List` are unevaluated.
  Threaded(Atom),
  /// A `Listable` head has list leaves of different lengths. Carries the expression, flattened and sorted.
  ShapeMismatch(Atom),
}

impl Normalized {
  pub fn into_atom(self) -> Atom {
    match self {
      Normalized::Canonical(atom)
      | Normalized::Threaded(atom)
      | Normalized::ShapeMismatch(atom) => atom
    }
  }
}


/// Normalizes `expression` according to the attributes of its head symbol. Atoms and expressions with a non-symbol
/// head are already canonical.
pub fn normalize<F>(expression: Atom, attributes_of: F) -> Normalized
  where F: Fn(InternedString) -> Attributes
{
  let attributes = match &expression {
    Atom::SExpression(children) => {
      match &children[0] {
        Atom::Symbol(name) => attributes_of(*name),
        _ => return Normalized::Canonical(expression),
      }
    }
    _ => return Normalized::Canonical(expression),
  };

  let mut expression = expression;

  if attributes.flat() {
    expression = flatten(expression);
  }

  if attributes.orderless() {
    expression = sort_leaves(expression);
  }

  if attributes.listable() {
    return thread(expression);
  }

  Normalized::Canonical(expression)
}


/// Splices leaves having the same head as `expression` into `expression`.
pub fn flatten(expression: Atom) -> Atom {
  let children = match &expression {
    Atom::SExpression(children) => children,
    _ => return expression,
  };
  let head = &children[0];

  if !children[1..].iter().any(|c| c.head() == *head && !c.is_atomic()) {
    return expression;
  }

  let mut new_children = Vec::with_capacity(children.len());
  new_children.push(head.clone());
  splice_same_head(head, &children[1..], &mut new_children);

  Atom::SExpression(Rc::new(new_children))
}

fn splice_same_head(head: &Atom, leaves: &[Atom], output: &mut Vec<Atom>) {
  for leaf in leaves {
    match leaf {
      Atom::SExpression(grandchildren) if grandchildren[0] == *head => {
        splice_same_head(head, &grandchildren[1..], output);
      }
      _ => output.push(leaf.clone())
    }
  }
}


/// Sorts the leaves of `expression` into canonical order. The sort is stable.
pub fn sort_leaves(expression: Atom) -> Atom {
  let children = match &expression {
    Atom::SExpression(children) => children,
    _ => return expression,
  };

  let is_sorted = children[1..].windows(2).all(|pair| !NormalFormOrder::is_greater(&pair[0], &pair[1]));
  if is_sorted {
    return expression;
  }

  let mut leaves = children[1..].to_vec();
  leaves.sort_by(NormalFormOrder::cmp);
  SExpression::new(children[0].clone(), leaves)
}


/// Threads a `Listable` head over the `List` leaves of `expression`.
pub fn thread(expression: Atom) -> Normalized {
  let children = match &expression {
    Atom::SExpression(children) => children.clone(),
    _ => return Normalized::Canonical(expression),
  };

  let mut length: Option<usize> = None;
  for leaf in children[1..].iter().filter(|c| c.has_head("List")) {
    match length {
      None => length = Some(leaf.len()),
      Some(n) if n != leaf.len() => return Normalized::ShapeMismatch(expression),
      _ => {}
    }
  }

  let length = match length {
    Some(length) => length,
    None => return Normalized::Canonical(expression),
  };

  let applications = (0..length).map(|i| {
    let leaves = children[1..].iter().map(|leaf| {
      if leaf.has_head("List") {
        leaf.leaves()[i].clone()
      } else {
        leaf.clone()
      }
    }).collect();
    SExpression::new(children[0].clone(), leaves)
  }).collect();

  Normalized::Threaded(SExpression::list(applications))
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    attributes::Attribute,
    interner::interned_static,
    parse
  };

  fn normalize_with(text: &str, attributes: Attributes) -> Normalized {
    normalize(parse(text).unwrap(), |name| {
      if name == interned_static("h") { attributes } else { Attributes::default() }
    })
  }

  #[test]
  fn flat_splices_nested() {
    let result = normalize_with("h[h[a, b], c, h[d, h[e]]]", Attribute::Flat.into());
    assert_eq!(result.into_atom().to_string(), "h[a, b, c, d, e]");
    // Other heads are left alone.
    let result = normalize_with("h[g[a, b], c]", Attribute::Flat.into());
    assert_eq!(result.into_atom().to_string(), "h[g[a, b], c]");
  }

  #[test]
  fn orderless_sorts() {
    let result = normalize_with("h[2, b, 1, a, f[x], 1.5]", Attribute::Orderless.into());
    assert_eq!(result.into_atom().to_string(), "h[1, 1.5, 2, a, b, f[x]]");
  }

  #[test]
  fn flat_then_orderless() {
    let result = normalize_with("h[c, h[b, a]]", Attribute::Flat + Attribute::Orderless);
    assert_eq!(result, Normalized::Canonical(parse("h[a, b, c]").unwrap()));
  }

  #[test]
  fn listable_threads() {
    let result = normalize_with("h[{a, b}, c]", Attribute::Listable.into());
    assert_eq!(result, Normalized::Threaded(parse("{h[a, c], h[b, c]}").unwrap()));
    let result = normalize_with("h[{a, b}, {c, d}]", Attribute::Listable.into());
    assert_eq!(result, Normalized::Threaded(parse("{h[a, c], h[b, d]}").unwrap()));
    let result = normalize_with("h[a, c]", Attribute::Listable.into());
    assert_eq!(result, Normalized::Canonical(parse("h[a, c]").unwrap()));
  }

  #[test]
  fn listable_shape_mismatch() {
    let result = normalize_with("h[{a, b}, {c}]", Attribute::Listable.into());
    assert_eq!(result, Normalized::ShapeMismatch(parse("h[{a, b}, {c}]").unwrap()));
  }
}
