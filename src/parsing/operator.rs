/*!

An operator is a syntactic component of an expression grammar that may take arguments. The `Operator` struct holds
syntactic data about the operator, which is used by the generic Pratt parsing algorithm.

The operator tables hold the operator database for all the operators in the expression grammar. The parsing
algorithm looks up a given operator using the operator's token (sigil). There are two tables, one for tokens that take
an operand on their left (l-tokens) and one for tokens that begin an expression (n-tokens). A sigil may appear in both,
as `-` does.

The database is the pipe-delimited table `OPERATOR_DATABASE` below. The first row is a header row and is discarded.
A literal `|` in a token is written `\|`.

| Field         | Possible Values                                              | Notes                                                        |
| ------------- | ------------------------------------------------------------ | ------------------------------------------------------------ |
| NAME          | An identifier                                                | The head of the expression the operator is interpreted as.   |
| PRECEDENCE    | integer                                                      | The higher the precedence, the stronger the binding power.   |
| L_TOKEN       | String                                                       | A token that accepts an argument on its left                 |
| N_TOKEN       | String                                                       | Null token, a token that appears at the start of an expression |
| O_TOKEN       | String                                                       | Other, a token that closes the operator's last argument      |
| ASSOCIATIVITY | "R" - right, "L" - left, "N" - non, "F" - full               | Empty means "null", for matchfix operators and leaves.       |
| AFFIX         | "N" - Null, "P" - Prefix, "S" - Postfix, "I" - Infix, "M" - Matchfix |                                                      |
| ARITY         | Nonnegative integer                                          | How many arguments the expression takes.                     |

*/

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::logging::{Channel, log};

/// Operators that only steer the parser. They never appear as heads in parsed expressions.
const SYNTAX_ONLY: [&str; 3] = ["Construct", "Parenthesis", "Comma"];

static OPERATOR_DATABASE: &str = r#"
NAME               | PRECEDENCE | L_TOKEN | N_TOKEN | O_TOKEN | ASSOCIATIVITY | AFFIX | ARITY
CompoundExpression | 10         | ;       |         |         | F             | I     | 2
Set                | 40         | =       |         |         | R             | I     | 2
SetDelayed         | 40         | :=      |         |         | R             | I     | 2
UpSet              | 40         | ^=      |         |         | R             | I     | 2
UpSetDelayed       | 40         | ^:=     |         |         | R             | I     | 2
ReplaceAll         | 110        | /.      |         |         | L             | I     | 2
ReplaceRepeated    | 110        | //.     |         |         | L             | I     | 2
Rule               | 120        | ->      |         |         | R             | I     | 2
RuleDelayed        | 120        | :>      |         |         | R             | I     | 2
Condition          | 130        | /;      |         |         | L             | I     | 2
Pattern            | 150        | :       |         |         | N             | I     | 2
Alternatives       | 160        | \|      |         |         | F             | I     | 2
Or                 | 215        | \|\|    |         |         | F             | I     | 2
And                | 220        | &&      |         |         | F             | I     | 2
Not                | 230        |         | !       |         |               | P     | 1
SameQ              | 290        | ===     |         |         | F             | I     | 2
UnsameQ            | 290        | =!=     |         |         | F             | I     | 2
Equal              | 290        | ==      |         |         | F             | I     | 2
Unequal            | 290        | !=      |         |         | F             | I     | 2
Less               | 290        | <       |         |         | N             | I     | 2
Greater            | 290        | >       |         |         | N             | I     | 2
LessEqual          | 290        | <=      |         |         | N             | I     | 2
GreaterEqual       | 290        | >=      |         |         | N             | I     | 2
Plus               | 310        | +       |         |         | F             | I     | 2
Subtract           | 310        | -       |         |         | L             | I     | 2
Times              | 400        | *       |         |         | F             | I     | 2
Divide             | 470        | /       |         |         | L             | I     | 2
Minus              | 480        |         | -       |         |               | P     | 1
Power              | 590        | ^       |         |         | R             | I     | 2
PatternTest        | 680        | ?       |         |         | L             | I     | 2
Construct          | 1000       | [       |         | ]       |               | S     | 2
List               | 0          |         | {       | }       |               | M     | 1
Parenthesis        | 0          |         | (       | )       |               | M     | 1
Comma              | 0          |         |         | ,       |               | N     | 0
"#;


#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Associativity {
  Null,  // Things like constants or identifiers that have no affix or associativity. Also,
         // matchfix operators.
  Non,   // The operator cannot be adjacent to another operator of the same precedence.
  Right, // E.g. 2^3^4 == 2^(3^4) != (2^3)^4
  Left,  // E.g. 3-4-5 == (3-4)-5 != 3 - (4-5)
  Full   // Adjacent operators collapse into a single variadic function,
         // e.g. 1 + 2 + 3 + 4 == Plus(1, 2, 3, 4)
}

impl Associativity {
  pub fn from_str(s: &str) -> Option<Associativity> {
    match s {
      "R" => Some(Associativity::Right),
      "L" => Some(Associativity::Left),
      "F" => Some(Associativity::Full),
      "N" => Some(Associativity::Non),
      ""  => Some(Associativity::Null),
      _   => None
    }
  }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Affix {
  Null,     // Things like constants or identifiers that have no affix or associativity.
  Prefix,
  Postfix,  // Synonym: suffix (but not used in computer science)
  Infix,
  Matchfix, // Synonyms: circumfix, confix, ambifix
}

impl Affix {
  pub fn from_str(s: &str) -> Option<Affix> {
    match s {
      "N" | "" => Some(Affix::Null),
      "P"      => Some(Affix::Prefix),
      "S"      => Some(Affix::Postfix),
      "I"      => Some(Affix::Infix),
      "M"      => Some(Affix::Matchfix),
      _        => None
    }
  }
}


/// An operator has a set of properties that determine how it is parsed. Other properties like commutativity that do
/// not affect how an expression is parsed are not associated with the operator but rather with the function the
/// operator is interpreted as.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Operator {                // Example Value
  pub name         : String,         // "Times"
  pub precedence   : i32,            // 400
  pub l_token      : Option<String>, // "*"
  pub n_token      : Option<String>, // <None>
  pub o_token      : Option<String>, // <None>
  pub associativity: Associativity,  // "F"
  pub affix        : Affix,          // "I"
  pub arity        : u32,            // 2
}

impl Operator {

  /// The record for leaf tokens: numbers, strings, symbols, and blanks.
  pub fn nullary_leaf() -> Self {
    Operator {
      name         : String::new(),
      precedence   : 0,
      l_token      : None,
      n_token      : None,
      o_token      : None,
      associativity: Associativity::Null,
      affix        : Affix::Null,
      arity        : 0,
    }
  }

  pub fn left_binding_power(&self) -> i32 {
    match self.affix {

      | Affix::Infix
      | Affix::Postfix => self.precedence,

      _ => -1

    }
  }

  pub fn right_binding_power(&self) -> i32 {
    match self.affix {
      Affix::Prefix   => self.precedence,
      Affix::Matchfix => 0,
      Affix::Infix    => {
        match self.associativity {

          | Associativity::Left
          | Associativity::Non => self.precedence + 1,

          Associativity::Right => self.precedence,

          // Lower than our own precedence, so that a chain of the same operator lands in our RHS, where it is
          // spliced into the parent.
          Associativity::Full  => self.precedence - 1,

          Associativity::Null  => -1,

        }
      }
      _ => -1
    }
  }

  // The parse-time functionality of `Operator` lives in the parser.

}


#[derive(Clone, Debug, Default)]
pub struct OperatorTable {
  map: HashMap<String, Operator>,
}

impl OperatorTable {

  pub fn new() -> OperatorTable {
    OperatorTable::default()
  }

  /// If `token` has a record in the operator table, return it. Otherwise, return `None`.
  pub fn look_up(&self, token: &str) -> Option<&Operator> {
    self.map.get(token)
  }

  pub fn insert(&mut self, token: String, operator: Operator) {
    self.map.insert(token, operator);
  }

}


#[derive(Clone, Debug, Default)]
pub struct OperatorTables {
  /// Operators keyed by their l-token.
  pub left : OperatorTable,
  /// Operators keyed by their n-token.
  pub null : OperatorTable,
  /// Every operator, in database order.
  pub operators: Vec<Operator>,
}

impl OperatorTables {

  /// Every sigil the lexer must recognize.
  pub fn sigils(&self) -> Vec<String> {
    let mut sigils: Vec<String> =
      self.operators
          .iter()
          .flat_map(|op| [&op.l_token, &op.n_token, &op.o_token])
          .filter_map(|token| token.clone())
          .collect();
    sigils.sort();
    sigils.dedup();
    sigils
  }

  /// The names of the operators that appear as heads of parsed expressions.
  pub fn operator_names(&self) -> Vec<&str> {
    self.operators
        .iter()
        .map(|op| op.name.as_str())
        .filter(|name| !SYNTAX_ONLY.contains(name))
        .collect()
  }

}


lazy_static! {
  pub static ref OPERATOR_TABLES: OperatorTables = read_operator_database(OPERATOR_DATABASE);
}


/// Splits a record on `|`, reading `\|` as a literal `|`.
fn split_record(line: &str) -> Vec<String> {
  let mut fields = vec![String::new()];
  let mut chars = line.chars().peekable();

  while let Some(c) = chars.next() {
    match c {
      '\\' if chars.peek() == Some(&'|') => {
        chars.next();
        if let Some(field) = fields.last_mut() {
          field.push('|');
        }
      }
      '|' => fields.push(String::new()),
      c => {
        if let Some(field) = fields.last_mut() {
          field.push(c);
        }
      }
    }
  }

  fields.into_iter().map(|f| f.trim().to_string()).collect()
}

fn optional_token(field: Option<&String>) -> Option<String> {
  match field {
    Some(s) if !s.is_empty() => Some(s.clone()),
    _ => None
  }
}

fn read_operator(line: &str) -> Option<Operator> {
  let record = split_record(line);
  let mut fields = record.iter();

  Some(Operator {
    // Fields filled according to column order, which need not be declaration order.
    name         : fields.next()?.clone(),
    precedence   : fields.next()?.parse::<i32>().ok()?,
    l_token      : optional_token(fields.next()),
    n_token      : optional_token(fields.next()),
    o_token      : optional_token(fields.next()),
    associativity: Associativity::from_str(fields.next()?)?,
    affix        : Affix::from_str(fields.next()?)?,
    arity        : fields.next()?.parse::<u32>().ok()?,
  })
}

/// Reads the pipe-delimited operator database. Malformed rows are logged and skipped.
fn read_operator_database(database: &str) -> OperatorTables {
  let mut tables = OperatorTables::default();

  // Skip the header row.
  for line in database.lines().filter(|l| !l.trim().is_empty()).skip(1) {
    let operator = match read_operator(line) {
      Some(op) => op,
      None => {
        log(Channel::Error, 1, format!("Malformed operator record: {}", line).as_str());
        continue;
      }
    };

    if let Some(token) = &operator.l_token {
      tables.left.insert(token.clone(), operator.clone());
    }
    if let Some(token) = &operator.n_token {
      tables.null.insert(token.clone(), operator.clone());
    }
    tables.operators.push(operator);
  }

  tables
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn database_is_complete() {
    let tables = &*OPERATOR_TABLES;
    assert_eq!(
      tables.operators.len(),
      OPERATOR_DATABASE.lines().filter(|l| !l.trim().is_empty()).count() - 1
    );
    assert_eq!(tables.left.look_up("|").map(|op| op.name.as_str()), Some("Alternatives"));
    assert_eq!(tables.left.look_up("||").map(|op| op.name.as_str()), Some("Or"));
    assert_eq!(tables.left.look_up("-").map(|op| op.name.as_str()), Some("Subtract"));
    assert_eq!(tables.null.look_up("-").map(|op| op.name.as_str()), Some("Minus"));
  }

  #[test]
  fn binding_powers() {
    let tables = &*OPERATOR_TABLES;
    let power = tables.left.look_up("^").unwrap();
    assert_eq!(power.right_binding_power(), power.left_binding_power());
    let plus = tables.left.look_up("+").unwrap();
    assert!(plus.right_binding_power() < plus.left_binding_power());
    let divide = tables.left.look_up("/").unwrap();
    assert!(divide.right_binding_power() > divide.left_binding_power());
  }

  #[test]
  fn syntax_only_operators_are_not_named() {
    let names = OPERATOR_TABLES.operator_names();
    assert!(names.contains(&"SetDelayed"));
    assert!(!names.contains(&"Construct"));
    assert!(!names.contains(&"Comma"));
  }
}
