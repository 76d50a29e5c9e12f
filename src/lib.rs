/*!

The rewriting kernel of a symbolic expression language. Expressions are trees of atoms. A `Context` holds rules
attached to symbols, and the evaluator rewrites an expression with those rules until nothing changes.

```ignore
use loriskernel::{Context, evaluate, parse};

let mut context = Context::new_global_context();
evaluate(parse("fib[0] = 0; fib[1] = 1").unwrap(), &mut context);
evaluate(parse("fib[n_] := fib[n - 1] + fib[n - 2] /; n > 1").unwrap(), &mut context);

let result = evaluate(parse("fib[10]").unwrap(), &mut context);
assert_eq!(result.expression.to_string(), "55");
```

*/

mod format;
mod abstractions;
mod atom;
mod attributes;
mod built_ins;
mod context;
mod diagnostics;
mod error;
mod evaluate;
mod interner;
mod kernel;
mod matching;
mod normal_form;
mod normalize;
mod parsing;
pub mod logging;

pub use atom::{Atom, AtomKind, SExpression, Symbol};
pub use attributes::{Attribute, Attributes};
pub use built_ins::{BuiltinComponent, BuiltinFn, DEFAULT_REAL_PRECISION, RegistryReport};
pub use context::{Context, ContextValueStore, SymbolRecord, SymbolValue};
pub use diagnostics::Diagnostic;
pub use error::{DefinitionError, ParseError, RegistryError};
pub use evaluate::{
  evaluate,
  replace_all,
  Evaluation,
  EvaluationResult,
  EvaluationSettings,
  EvaluationStatus,
  DEFAULT_ITERATION_LIMIT,
  DEFAULT_RECURSION_LIMIT,
};
pub use format::{DisplayForm, ExpressionFormatter, Formattable};
pub use kernel::{ExactKernel, NumericKernel};
pub use matching::{Matcher, Pattern, SolutionSet};
pub use normalize::{normalize, Normalized};
pub use parsing::parse;


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fibonacci_session() {
    let mut context = Context::new_global_context();
    evaluate(parse("fib[0] = 0; fib[1] = 1").unwrap(), &mut context);
    evaluate(parse("fib[n_] := fib[n - 1] + fib[n - 2] /; n > 1").unwrap(), &mut context);

    let result = evaluate(parse("fib[10]").unwrap(), &mut context);
    assert_eq!(result.expression.to_string(), "55");
    assert_eq!(result.status, EvaluationStatus::Normal);
    assert!(result.diagnostics.is_empty());
  }

  #[test]
  fn parse_errors_are_reported() {
    assert!(matches!(parse("f[a, "), Err(ParseError::UnexpectedEnd { .. })));
  }
}
