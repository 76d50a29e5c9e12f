/*!

Errors returned by the public API. Outcomes that only mean "no further progress" (a failed match, a guard that does
not hold, a shape mismatch, an exceeded limit) are not errors. They are reported through `EvaluationStatus` and
`Diagnostic` values instead.

*/

use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
  #[error("unrecognized input at position {position}: {text}")]
  UnrecognizedToken {
    position: usize,
    text    : String
  },

  #[error("unexpected end of input, expected {expected}")]
  UnexpectedEnd {
    expected: String
  },

  #[error("expected {expected} but found {found}")]
  Expected {
    expected: String,
    found   : String
  },

  #[error("the operator {0} requires an operand")]
  MissingOperand(String),

  #[error("invalid number literal {0}")]
  InvalidNumber(String),

  #[error("trailing input after a complete expression: {0}")]
  TrailingInput(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DefinitionError {
  #[error("symbol {0} is Protected")]
  Protected(String),

  #[error("symbol {0} is Locked")]
  Locked(String),

  #[error("cannot assign to {0}")]
  InvalidLeftHandSide(String),

  #[error("{0} is not a known attribute")]
  UnknownAttribute(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RegistryError {
  #[error("the builtin registry has already been contributed to this context")]
  AlreadyContributed,

  #[error("malformed rule {rule} for {symbol}: {reason}")]
  InvalidRule {
    symbol: String,
    rule  : String,
    reason: String
  },
}
