/*!

Structured messages emitted during evaluation. A `Diagnostic` names the symbol and tag of a message template, such as
`General::itlim`, together with the arguments that fill the template's `` `1` ``, `` `2` ``, … slots. Rendering looks
the template up in the `Context`, falling back to the `General` template with the same tag.

*/

use std::fmt::Display;

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::{
  atom::Atom,
  context::Context,
  interner::{InternedString, interned_static, resolve_str}
};

#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostic {
  pub symbol   : InternedString,
  pub tag      : InternedString,
  pub arguments: Vec<Atom>,
}

impl Diagnostic {
  pub fn new(symbol: InternedString, tag: InternedString, arguments: Vec<Atom>) -> Diagnostic {
    Diagnostic {
      symbol,
      tag,
      arguments
    }
  }

  /// Convenience constructor for messages of builtin symbols.
  pub fn from_static(symbol: &'static str, tag: &'static str, arguments: Vec<Atom>) -> Diagnostic {
    Diagnostic::new(interned_static(symbol), interned_static(tag), arguments)
  }

  /// Renders the message text through the templates stored in `context`. Without a template, gives the message name
  /// followed by the arguments.
  pub fn render(&self, context: &Context) -> String {
    let template = context.message_template(self.symbol, self.tag)
                          .or_else(|| context.message_template(interned_static("General"), self.tag));

    let text = match template {
      Some(template) => fill_template(&template, &self.arguments),
      None => {
        self.arguments
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>()
            .join(", ")
      }
    };

    format!("{}: {}", self, text)
  }
}

impl Display for Diagnostic {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}::{}", resolve_str(self.symbol), resolve_str(self.tag))
  }
}

lazy_static! {
  static ref SLOT: Regex = Regex::new(r"`([0-9]+)`").expect("the slot pattern is a valid regular expression");
}

/// Replaces `` `n` `` with the n-th argument (1-based). Slots without an argument are left as they are.
fn fill_template(template: &str, arguments: &[Atom]) -> String {
  SLOT.replace_all(template, |captures: &Captures| {
    let argument = captures[1].parse::<usize>()
                              .ok()
                              .and_then(|n| n.checked_sub(1))
                              .and_then(|index| arguments.get(index));
    match argument {
      Some(argument) => argument.to_string(),
      None => captures[0].to_string()
    }
  }).into_owned()
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::parse;

  #[test]
  fn fill_template_slots() {
    let arguments = vec![parse("f[x]").unwrap(), Atom::from_i64(3)];
    assert_eq!(
      fill_template("Iteration limit of `2` exceeded in `1`.", &arguments),
      "Iteration limit of 3 exceeded in f[x]."
    );
    assert_eq!(fill_template("No slots.", &arguments), "No slots.");
    assert_eq!(fill_template("Missing `3` slot.", &arguments), "Missing `3` slot.");
    assert_eq!(fill_template("No `0`th slot.", &arguments), "No `0`th slot.");
    assert_eq!(fill_template("Context `Global` then `1`.", &arguments), "Context `Global` then f[x].");
  }

  #[test]
  fn render_falls_back_to_general() {
    let mut context = Context::without_built_ins();
    context.set_message(interned_static("General"), interned_static("itlim"), "Iteration limit of `1` exceeded.");
    let diagnostic = Diagnostic::from_static("Fib", "itlim", vec![Atom::from_i64(4096)]);
    assert_eq!(diagnostic.render(&context), "Fib::itlim: Iteration limit of 4096 exceeded.");
  }

  #[test]
  fn render_without_template() {
    let context = Context::without_built_ins();
    let diagnostic = Diagnostic::from_static("Thread", "tdlen", vec![parse("{1, 2}").unwrap()]);
    assert_eq!(diagnostic.render(&context), "Thread::tdlen: {1, 2}");
  }
}
