/*!

Text to expressions. The lexer turns text into leaf expressions and operator sigils, and a Pratt parser driven by the
operator database assembles them into an `Atom`.

*/
mod lexer;
mod operator;
mod parser;

pub use parser::parse;

/// The heads the parser produces for operator syntax, e.g. `SetDelayed` for `:=`.
pub fn operator_names() -> Vec<&'static str> {
  operator::OPERATOR_TABLES.operator_names()
}
