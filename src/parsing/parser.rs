/*!
A Pratt parser driven by the operator tables.

Norvell describes three kinds of tokens, which we keep:

L (left) tokens:  Takes a left operand (binary ops, postfix ops).
N (null) tokens:  No left operand (prefix ops, matchfix ops, and leaves).
O (other) tokens: All other tokens: `)`, `]`, `,`, etc.

See Theodore S. Norvell, "From Precedence Climbing to Pratt Parsing," 2016:
https://www.engr.mun.ca/~theo/Misc/pratt_parsing.htm

Operator data lives in a single database (see `operator.rs`), and all parsing methods live here. A few operators are
rewritten as they are parsed, so that the evaluator only ever sees canonical heads:

| Input         | Parsed as                        |
| ------------- | -------------------------------- |
| `a - b`       | `Plus[a, Times[-1, b]]`          |
| `a / b`       | `Times[a, Power[b, -1]]`         |
| `-a`          | `Times[-1, a]` (`-3` for numbers)|
| `(a)`         | `a`                              |
| `x : p`       | `Pattern[x, p]`                  |
| `x_ : d`      | `Optional[x_, d]`                |
| `a;`          | `CompoundExpression[a, Null]`    |

*/

use crate::{
  atom::{Atom, SExpression, Symbol},
  error::ParseError,
  logging::{log_with, Channel},
  parsing::{
    lexer::{Lexer, Token},
    operator::{Affix, Associativity, Operator, OperatorTable, OPERATOR_TABLES},
  },
};


/// Parses a complete expression. The whole input must be consumed.
pub fn parse(input: &str) -> Result<Atom, ParseError> {
  let mut lexer = Lexer::new(input)?;

  let expression = match parse_expression(0, &mut lexer)? {
    Some(expression) => expression,
    None => {
      return Err(match lexer.peek() {
        Some(token) => ParseError::Expected { expected: "an expression".to_string(), found: token.to_string() },
        None => ParseError::UnexpectedEnd { expected: "an expression".to_string() },
      });
    }
  };

  if let Some(token) = lexer.peek() {
    return Err(ParseError::TrailingInput(token.to_string()));
  }

  log_with(Channel::Debug, 5, || format!("Successfully parsed expression: {}", expression));
  Ok(expression)
}


/// Parses an expression whose operators bind at least as tightly as `previous_binding_power`, the binding power of
/// the parent expression that called us. Gives `None` if the next token cannot begin an expression. That is not
/// necessarily a syntax error, as in the empty argument list of `f[]`.
fn parse_expression(previous_binding_power: i32, lexer: &mut Lexer) -> Result<Option<Atom>, ParseError> {

  // STEP 1: Parse a null token, i.e. a token that can begin an expression. We don't consume the token until we know
  // it is a null token.
  let operator = match lexer.peek() {
    None => return Ok(None),
    Some(token) => match lookup_token(token, &OPERATOR_TABLES.null) {
      Some(entry) => entry,
      None => return Ok(None),
    }
  };
  let token = lexer.next();

  // STEP 2: Parse the RHS of the null token. For a leaf, this is a no-op.
  let mut current_root = match (token, operator) {
    (Some(Token::Leaf(atom)), None) => atom,
    (_, Some(operator)) => null_denotation(&operator, lexer)?,
    (token, None) => {
      // Unreachable in practice: operator tokens without an operator record are never null tokens.
      return Err(ParseError::Expected {
        expected: "an expression".to_string(),
        found   : token.map(|t| t.to_string()).unwrap_or_default()
      });
    }
  };

  // STEP 3: Parse left tokens, i.e. tokens that take an expression on their LHS, placing the `current_root` in the
  // LHS position of new left tokens as we go, so long as their binding power is high enough.
  loop {
    let operator = match lexer.peek() {
      // There is no next token, so we are finished in this call.
      None => break,

      Some(Token::Operator(sigil)) => {
        match OPERATOR_TABLES.left.look_up(sigil) {
          Some(operator) => operator.clone(),
          // An o-token ending an ancestor expression farther down in the call stack, or garbage that the ancestor
          // will report.
          None => break,
        }
      }

      Some(leaf) => {
        // A leaf in l-token position is always an error.
        return Err(ParseError::Expected { expected: "an operator".to_string(), found: leaf.to_string() });
      }
    };

    // If the new operator binds less tightly than the parent expression, the parent expression deserves to be on its
    // LHS, not the `current_root`, which is merely a subexpression of the parent.
    if previous_binding_power > operator.left_binding_power() {
      break;
    }

    // Commit to the l-token.
    lexer.next();
    log_with(Channel::Debug, 5, || {
      format!("Parsing RHS of {} with lhs={} rbp={}", operator.name, current_root, operator.right_binding_power())
    });

    current_root = left_denotation(current_root, &operator, lexer)?;
  }

  Ok(Some(current_root))
}


/// Parses the expressions that form the RHS of the null `operator`.
fn null_denotation(operator: &Operator, lexer: &mut Lexer) -> Result<Atom, ParseError> {
  match operator.affix {

    Affix::Matchfix => {
      let closing = operator.o_token.as_deref().unwrap_or_default();
      let items = parse_sequence(closing, lexer)?;

      if operator.name == "Parenthesis" {
        let mut items = items.into_iter();
        return match (items.next(), items.next()) {
          (Some(inner), None) => Ok(inner),
          (None, _) => Err(ParseError::MissingOperand("()".to_string())),
          (Some(_), Some(extra)) => Err(ParseError::Expected { expected: ")".to_string(), found: extra.to_string() }),
        };
      }

      Ok(SExpression::new(Symbol::from_str(&operator.name), items))
    }

    Affix::Prefix => {
      let operand = required_operand(operator, lexer)?;
      if operator.name == "Minus" {
        Ok(negate(operand))
      } else {
        Ok(SExpression::new(Symbol::from_str(&operator.name), vec![operand]))
      }
    }

    _ => Err(ParseError::Expected {
      expected: "an expression".to_string(),
      found   : operator.n_token.clone().unwrap_or_default()
    }),

  }
}


/// Parses the expressions that form the RHS of the left `operator`, whose LHS is `lhs`.
fn left_denotation(lhs: Atom, operator: &Operator, lexer: &mut Lexer) -> Result<Atom, ParseError> {
  // Function application parenthesizes its arguments, so their binding power is zero regardless of our precedence.
  if operator.name == "Construct" {
    let closing = operator.o_token.as_deref().unwrap_or_default();
    let arguments = parse_sequence(closing, lexer)?;
    return Ok(SExpression::new(lhs, arguments));
  }

  let rhs = match parse_expression(operator.right_binding_power(), lexer)? {
    Some(rhs) => rhs,
    // `a;` is allowed to have an empty RHS.
    None if operator.name == "CompoundExpression" => Symbol::null(),
    None => return Err(missing_operand(operator, lexer)),
  };

  let expression = match operator.name.as_str() {

    "Subtract" => SExpression::apply("Plus", vec![lhs, negate(rhs)]),

    "Divide" => {
      SExpression::apply("Times", vec![lhs, SExpression::apply_binary("Power", rhs, Atom::from_i64(-1))])
    }

    // `x:p` names a pattern, while `p:d` gives a pattern a default.
    "Pattern" => {
      match lhs {
        Atom::Symbol(_) => SExpression::apply_binary("Pattern", lhs, rhs),
        _ => SExpression::apply_binary("Optional", lhs, rhs),
      }
    }

    name => {
      let head = Symbol::from_str(name);

      // If this operator is fully associative and the RHS we just parsed is the same operator, we "chain" with it.
      // For `a+b+c` the RHS is `Plus[b, c]`, and instead of `Plus[a, Plus[b, c]]` we construct `Plus[a, b, c]`.
      if operator.associativity == Associativity::Full && rhs.head() == head && !rhs.is_atomic() {
        let mut children = vec![lhs];
        children.extend(rhs.leaves().iter().cloned());
        SExpression::new(head, children)
      } else {
        SExpression::new(head, vec![lhs, rhs])
      }
    }

  };

  // `Subtract` and `Divide` rewrite to operators that chain.
  if matches!(operator.name.as_str(), "Subtract" | "Divide") {
    log_with(Channel::Debug, 5, || format!("Rewrote {} as {}", operator.name, expression));
  }

  Ok(expression)
}


/// Parses a comma separated list of expressions ending with `closing`, which is consumed. The list may be empty.
fn parse_sequence(closing: &str, lexer: &mut Lexer) -> Result<Vec<Atom>, ParseError> {
  let mut items = Vec::new();

  if lexer.next_if_operator(closing) {
    return Ok(items);
  }

  loop {
    match parse_expression(0, lexer)? {
      Some(item) => items.push(item),
      None => {
        return Err(match lexer.peek() {
          Some(token) => ParseError::Expected { expected: "an expression".to_string(), found: token.to_string() },
          None => ParseError::UnexpectedEnd { expected: closing.to_string() },
        });
      }
    }

    if lexer.next_if_operator(closing) {
      return Ok(items);
    }
    if !lexer.next_if_operator(",") {
      return Err(match lexer.peek() {
        Some(token) => ParseError::Expected { expected: closing.to_string(), found: token.to_string() },
        None => ParseError::UnexpectedEnd { expected: closing.to_string() },
      });
    }
  }
}


fn required_operand(operator: &Operator, lexer: &mut Lexer) -> Result<Atom, ParseError> {
  match parse_expression(operator.right_binding_power(), lexer)? {
    Some(operand) => Ok(operand),
    None => Err(missing_operand(operator, lexer)),
  }
}

fn missing_operand(operator: &Operator, lexer: &Lexer) -> ParseError {
  let sigil = operator.l_token.clone().or_else(|| operator.n_token.clone()).unwrap_or_default();
  match lexer.peek() {
    None => ParseError::UnexpectedEnd { expected: format!("an operand for {}", sigil) },
    Some(_) => ParseError::MissingOperand(sigil),
  }
}

/// `-x` is `Times[-1, x]`, except that numbers are negated directly.
fn negate(operand: Atom) -> Atom {
  match operand {
    Atom::Integer(n)  => Atom::Integer(-n),
    Atom::Rational(q) => Atom::Rational(-q),
    Atom::Real(x)     => Atom::Real(-x),
    other             => SExpression::apply("Times", vec![Atom::from_i64(-1), other]),
  }
}


/// Finds the operator record of a null token. Leaves have no record, which is signaled by `Some(None)`. Gives `None`
/// when the token cannot begin an expression.
fn lookup_token(token: &Token, table: &OperatorTable) -> Option<Option<Operator>> {
  match token {
    Token::Leaf(_) => Some(None),
    Token::Operator(sigil) => table.look_up(sigil).cloned().map(Some),
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  fn parsed(text: &str) -> String {
    match parse(text) {
      Ok(e) => e.to_string(),
      Err(e) => panic!("failed to parse {}: {}", text, e),
    }
  }

  #[test]
  fn function_condition_test() {
    assert_eq!(parsed("D[x_, y_] := 1 /; SameQ[x, y]"), "SetDelayed[D[x_, y_], Condition[1, SameQ[x, y]]]");
  }

  #[test]
  fn nested_function_test() {
    assert_eq!(parsed("Part[f[a, b, c, d], 3]"), "Part[f[a, b, c, d], 3]");
    assert_eq!(parsed("Plus[]"), "Plus[]");
    assert_eq!(parsed("d[n][x]"), "d[n][x]");
  }

  #[test]
  fn precedence_test() {
    assert_eq!(
      parsed("3.5*x^2 + 2*x^f[a+b, c*d, e]"),
      "Plus[Times[3.5, Power[x, 2]], Times[2, Power[x, f[Plus[a, b], Times[c, d], e]]]]"
    );
    assert_eq!(parsed("2*(3+a)"), "Times[2, Plus[3, a]]");
    assert_eq!(parsed("2^3^4"), "Power[2, Power[3, 4]]");
    assert_eq!(parsed("a + b + c"), "Plus[a, b, c]");
  }

  #[test]
  fn subtraction_and_division() {
    assert_eq!(parsed("n - 1"), "Plus[n, -1]");
    assert_eq!(parsed("a - b"), "Plus[a, Times[-1, b]]");
    assert_eq!(parsed("a + b - c"), "Plus[a, b, Times[-1, c]]");
    assert_eq!(parsed("a/b"), "Times[a, Power[b, -1]]");
    assert_eq!(parsed("-x^2"), "Times[-1, Power[x, 2]]");
    assert_eq!(parsed("2^-1"), "Power[2, -1]");
  }

  #[test]
  fn patterns() {
    assert_eq!(parsed("f[x_, ys___]"), "f[x_, ys___]");
    assert_eq!(parsed("x:(a|b)"), "x:Alternatives[a, b]");
    assert_eq!(parsed("f[y_:0]"), "f[Optional[y_, 0]]");
    assert_eq!(parsed("x_Integer?EvenQ"), "PatternTest[x_Integer, EvenQ]");
    assert_eq!(parsed("a -> b /; c"), "Rule[a, Condition[b, c]]");
    assert_eq!(parsed("f[x] /. x -> 1"), "ReplaceAll[f[x], Rule[x, 1]]");
  }

  #[test]
  fn logic_and_comparison() {
    assert_eq!(parsed("!a && b || c"), "Or[And[Not[a], b], c]");
    assert_eq!(parsed("a == b == c"), "Equal[a, b, c]");
    assert_eq!(parsed("n > 1"), "Greater[n, 1]");
  }

  #[test]
  fn compound_expressions() {
    assert_eq!(parsed("a = 1; b = 2"), "CompoundExpression[Set[a, 1], Set[b, 2]]");
    assert_eq!(parsed("a;"), "CompoundExpression[a, Null]");
    assert_eq!(parsed("{}"), "{}");
    assert_eq!(parsed("{1, {2}}"), "{1, {2}}");
  }

  #[test]
  fn errors() {
    assert!(matches!(parse(""), Err(ParseError::UnexpectedEnd { .. })));
    assert!(matches!(parse("f[a, b"), Err(ParseError::UnexpectedEnd { .. })));
    assert!(matches!(parse("a +"), Err(ParseError::UnexpectedEnd { .. })));
    assert!(matches!(parse("a b"), Err(ParseError::Expected { .. })));
    assert!(matches!(parse("a ]"), Err(ParseError::TrailingInput(_))));
    assert!(matches!(parse("f[a,]"), Err(ParseError::Expected { .. })));
  }
}
