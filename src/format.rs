/*!

  A `Formatter` holds information about how to format an expression, that is, how
  to express the expression as a string.

  "Formatting" needs to be distinct from Rust's standard `Display` trait, because
  expressions are (potentially) formatted differently depending on the context. For
  example, there might be different formats, such as a human-readable input format,
  an M-expression full format, and the format the matcher uses in its debug
  messages. `Display` is implemented in terms of `Formattable` with the default
  formatter.

*/

use strum::EnumString;


#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumString, Hash)]
pub enum DisplayForm {
  #[strum(serialize = "InputForm")]
  Input,
  #[strum(serialize = "FullForm")]
  Full,
  /// Used for debug messages of the matcher: `‹x›` for blanks, `«x»` for sequence blanks.
  #[strum(serialize = "MatcherForm")]
  Matcher,
}

impl Default for DisplayForm {
  fn default() -> DisplayForm {
    DisplayForm::Input
  }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
/// Parameters used in methods that transform expressions into strings.
pub struct ExpressionFormatter {
  pub form: DisplayForm,
}

impl Default for ExpressionFormatter {
  fn default() -> Self {
    ExpressionFormatter {
      form: DisplayForm::Input
    }
  }
}

impl From<DisplayForm> for ExpressionFormatter {
  fn from(form: DisplayForm) -> Self {
    ExpressionFormatter {
      form
    }
  }
}

pub trait Formattable {
  fn format(&self, formatter: &ExpressionFormatter) -> String;
}


macro_rules! display_formattable_impl {
  ($type_name:ty) => {
    impl std::fmt::Display for $type_name {
      fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.format(&$crate::format::ExpressionFormatter::default()))
      }
    }
  }
}
pub(crate) use display_formattable_impl;
