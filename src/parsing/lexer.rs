/*!

Minimal lexer. An unusual feature of this lexer/parser combination is that `Atom`s are created very early, already in
the lexer, instead of later in the parser. We only do this for leaf nodes: numbers, strings, symbols, and blanks.

Leaves are recognized by a single anchored regular expression. Operator sigils are recognized by an anchored
leftmost-longest Aho-Corasick automaton built from the operator tables, so that `:=` wins over `:` and `//.` wins over
`/`. Whitespace and `(* comments *)` are skipped.

The whole input is tokenized up front. The parser then walks the tokens with `peek` and `next`.

*/

use std::fmt::{Display, Formatter};

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::{
  abstractions::{BigFloat, BigInteger},
  atom::{Atom, SExpression, Symbol},
  built_ins::DEFAULT_REAL_PRECISION,
  error::ParseError,
  interner::interned,
  logging::{Channel, log_with},
  parsing::operator::OPERATOR_TABLES,
};

// Precision of decimal digits, in bits. Reals with more significant digits than a machine float holds get a higher
// precision.
const BITS_PER_DIGIT: f64 = 3.321928094887362;
const MACHINE_DIGITS: usize = 15;

lazy_static! {
  static ref LEAF: Regex = Regex::new(concat!(
    r"^(?:",
    r"(?P<blank>(?P<name>[A-Za-z$][A-Za-z0-9$`]*)?(?P<underscores>___|__|_)(?P<head>[A-Za-z$][A-Za-z0-9$`]*)?(?P<dot>\.)?)",
    r#"|(?P<string>"(?:[^"\\]|\\.)*")"#,
    r"|(?P<real>[0-9]+\.[0-9]*)",
    r"|(?P<integer>[0-9]+)",
    r"|(?P<symbol>[A-Za-z$][A-Za-z0-9$`]*)",
    r")"
  )).expect("the leaf pattern is a valid regular expression");

  static ref SKIPPED: Regex = Regex::new(r"^(?s:[ \t\r\n\f]+|\(\*.*?\*\))").expect("the skip pattern is a valid regular expression");

  static ref SIGILS: (AhoCorasick, Vec<String>) = {
    let sigils = OPERATOR_TABLES.sigils();
    let automaton = AhoCorasickBuilder::new()
        .anchored(true)
        .match_kind(MatchKind::LeftmostLongest)
        .build(&sigils);
    (automaton, sigils)
  };
}


#[derive(Clone, PartialEq, Debug)]
pub enum Token {
  /// A leaf, already converted to an expression.
  Leaf(Atom),
  /// An operator sigil, resolved in the parser.
  Operator(String),
}

impl Display for Token {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Token::Leaf(atom) => write!(f, "{}", atom),
      Token::Operator(op) => write!(f, "{}", op),
    }
  }
}


pub struct Lexer {
  tokens  : Vec<Token>,
  position: usize,
}

impl Lexer {

  pub fn new(text: &str) -> Result<Lexer, ParseError> {
    Ok(Lexer {
      tokens  : tokenize(text)?,
      position: 0,
    })
  }

  /// Fetches the next token but does not consume it.
  pub fn peek(&self) -> Option<&Token> {
    self.tokens.get(self.position)
  }

  /// Fetches the next token and consumes it.
  pub fn next(&mut self) -> Option<Token> {
    let token = self.tokens.get(self.position).cloned();
    if token.is_some() {
      self.position += 1;
    }
    token
  }

  /// Consumes the next token if it is the operator `sigil`.
  pub fn next_if_operator(&mut self, sigil: &str) -> bool {
    match self.peek() {
      Some(Token::Operator(op)) if op == sigil => {
        self.position += 1;
        true
      }
      _ => false
    }
  }

}


fn tokenize(text: &str) -> Result<Vec<Token>, ParseError> {
  let mut tokens = Vec::new();
  let mut position = 0;

  while position < text.len() {
    let rest = &text[position..];

    if let Some(skipped) = SKIPPED.find(rest) {
      position += skipped.end();
      continue;
    }

    if let Some(captures) = LEAF.captures(rest) {
      let length = captures.get(0).map_or(0, |m| m.end());
      tokens.push(Token::Leaf(make_leaf(&captures)?));
      position += length;
      continue;
    }

    let (automaton, sigils) = &*SIGILS;
    if let Some(found) = automaton.find(rest) {
      tokens.push(Token::Operator(sigils[found.pattern()].clone()));
      position += found.end();
      continue;
    }

    let text: String = rest.chars().take(10).collect();
    return Err(ParseError::UnrecognizedToken { position, text });
  }

  log_with(Channel::Debug, 5, || {
    format!("Tokens: {}", tokens.iter().map(|t| t.to_string()).collect::<Vec<_>>().join(" "))
  });

  Ok(tokens)
}


fn make_leaf(captures: &Captures) -> Result<Atom, ParseError> {
  if captures.name("blank").is_some() {
    return Ok(make_blank(captures));
  }

  if let Some(text) = captures.name("string") {
    return Ok(make_string_literal(text.as_str()));
  }

  if let Some(text) = captures.name("real") {
    return make_real(text.as_str());
  }

  if let Some(text) = captures.name("integer") {
    return text.as_str()
               .parse::<BigInteger>()
               .map(Atom::Integer)
               .map_err(|_| ParseError::InvalidNumber(text.as_str().to_string()));
  }

  // The only remaining alternative.
  let name = captures.name("symbol").map_or("", |m| m.as_str());
  Ok(Symbol::from_str(name))
}

/// `x_h` → `Pattern[x, Blank[h]]`, `__` → `BlankSequence[]`, `x_.` → `Optional[Pattern[x, Blank[]]]`.
fn make_blank(captures: &Captures) -> Atom {
  let kind = match captures.name("underscores").map(|m| m.as_str()) {
    Some("___") => "BlankNullSequence",
    Some("__")  => "BlankSequence",
    _           => "Blank",
  };

  let constraint: Vec<Atom> = captures.name("head")
                                      .map(|h| vec![Symbol::from_str(h.as_str())])
                                      .unwrap_or_default();
  let mut blank = SExpression::apply(kind, constraint);

  if let Some(name) = captures.name("name") {
    blank = SExpression::apply_binary("Pattern", Symbol::from_str(name.as_str()), blank);
  }

  if captures.name("dot").is_some() {
    blank = SExpression::apply_unary("Optional", blank);
  }

  blank
}

fn make_string_literal(quoted: &str) -> Atom {
  let inner = &quoted[1..quoted.len() - 1];
  let mut text = String::with_capacity(inner.len());
  let mut chars = inner.chars();

  while let Some(c) = chars.next() {
    if c != '\\' {
      text.push(c);
      continue;
    }
    match chars.next() {
      Some('n')   => text.push('\n'),
      Some('t')   => text.push('\t'),
      Some(other) => text.push(other),
      None        => text.push('\\'),
    }
  }

  Atom::String(interned(&text))
}

/// Reals carry machine precision unless more digits are given.
fn make_real(text: &str) -> Result<Atom, ParseError> {
  let digits = text.chars().filter(|c| c.is_ascii_digit()).count();
  let precision = if digits > MACHINE_DIGITS {
    ((digits as f64) * BITS_PER_DIGIT).ceil() as u32
  } else {
    DEFAULT_REAL_PRECISION
  };

  let parsed = BigFloat::parse(text).map_err(|_| ParseError::InvalidNumber(text.to_string()))?;
  Ok(Atom::Real(BigFloat::with_val(precision, parsed)))
}


#[cfg(test)]
mod tests {
  use super::*;

  fn lex(text: &str) -> Vec<String> {
    tokenize(text).unwrap().iter().map(|t| t.to_string()).collect()
  }

  #[test]
  fn lex_test() {
    assert_eq!(
      lex("3 +7 * 9.5 ^ f [a, b, c_, d___, :=] \"monkey\" "),
      vec!["3", "+", "7", "*", "9.5", "^", "f", "[", "a", ",", "b", ",", "c_", ",", "d___", ",", ":=", "]", "\"monkey\""]
    );
  }

  #[test]
  fn longest_sigil_wins() {
    assert_eq!(lex("a //. b /. c / d"), vec!["a", "//.", "b", "/.", "c", "/", "d"]);
    assert_eq!(lex("f[x_] ^:= y"), vec!["f", "[", "x_", "]", "^:=", "y"]);
    assert_eq!(lex("a =!= b === c"), vec!["a", "=!=", "b", "===", "c"]);
    assert_eq!(lex("a||b|c"), vec!["a", "||", "b", "|", "c"]);
  }

  #[test]
  fn blanks() {
    assert_eq!(lex("x_Integer __ y_. _:0"), vec!["x_Integer", "__", "Optional[y_]", "_", ":", "0"]);
  }

  #[test]
  fn comments_and_strings() {
    assert_eq!(lex("a (* ignored * ) *) b"), vec!["a", "b"]);
    let tokens = tokenize(r#""say \"hi\"""#).unwrap();
    assert_eq!(tokens, vec![Token::Leaf(Atom::String(interned("say \"hi\"")))]);
  }

  #[test]
  fn unrecognized_input() {
    assert!(matches!(tokenize("a # b"), Err(ParseError::UnrecognizedToken { position: 2, .. })));
  }
}
