/*!

Compiled patterns.

Patterns are written as ordinary expressions using the heads `Pattern`, `Blank`, `BlankSequence`,
`BlankNullSequence`, `Condition`, `PatternTest`, `Optional`, `Alternatives`, `HoldPattern`, and `Verbatim`. Before a
pattern is used, it is compiled into the closed `Pattern` enum below, so that the matcher never has to re-inspect
heads by name. Compilation is pure. Sub-patterns live behind `Rc`, so cloning a `Pattern` is cheap, which matters
because match equations hold pattern fragments by value.

*/

use std::rc::Rc;

use crate::{
  atom::{Atom, is_pattern_head},
  format::{DisplayForm, Formattable, ExpressionFormatter, display_formattable_impl},
  interner::{InternedString, resolve_str},
};

#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum BlankKind {
  /// Exactly one expression.
  Blank,
  /// One or more expressions.
  BlankSequence,
  /// Zero or more expressions.
  BlankNullSequence,
}

impl BlankKind {
  pub fn minimum_length(&self) -> usize {
    match self {
      BlankKind::BlankNullSequence => 0,
      _ => 1,
    }
  }

  pub fn is_sequence(&self) -> bool {
    !matches!(self, BlankKind::Blank)
  }
}

#[derive(Clone, PartialEq, Debug)]
pub enum Pattern {
  /// Matches only a structurally equal expression.
  Literal(Atom),
  /// `_h`, `__h`, `___h`. The optional head constrains what may be captured.
  Blank {
    kind: BlankKind,
    head: Option<Atom>
  },
  /// `x:p`, `x_`, …. Binds `name` to whatever `pattern` matches.
  Named {
    name   : InternedString,
    pattern: Rc<Pattern>
  },
  /// A head pattern applied to leaf patterns.
  Compound {
    head  : Rc<Pattern>,
    leaves: Rc<Vec<Pattern>>
  },
  /// `p /; test`. The test is evaluated with the bindings substituted and must give `True`.
  Condition {
    pattern: Rc<Pattern>,
    test   : Atom
  },
  /// `p ? test`. `test[e]` must give `True` for the matched expression (for each one, for sequences).
  PatternTest {
    pattern: Rc<Pattern>,
    test   : Atom
  },
  /// `p : default`, `p.`. Without an explicit default, the default comes from `Default[head]`.
  Optional {
    pattern: Rc<Pattern>,
    default: Option<Atom>
  },
  Alternatives(Rc<Vec<Pattern>>),
}

/// Lexicographic priority key used to order rules. Smaller keys are tried first.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash, Default)]
pub struct Specificity {
  /// 0 for patterns without any blank, 1 otherwise.
  pub class: u8,
  pub sequence_blanks: u32,
  pub unconstrained_blanks: u32,
  /// 0 when the pattern carries a `Condition` or `PatternTest`.
  pub unguarded: u8,
}


impl Pattern {

  /// Compiles a pattern expression.
  pub fn compile(expression: &Atom) -> Pattern {
    let children = match expression {
      Atom::SExpression(children) => children,
      _ => return Pattern::Literal(expression.clone()),
    };

    let head_name = match &children[0] {
      Atom::Symbol(name) => Some(*name),
      _ => None
    };
    let head_str = head_name.map(resolve_str).unwrap_or_default();
    let leaves = &children[1..];

    match (head_str.as_str(), leaves.len()) {

      ("Blank", 0..=1) => Pattern::Blank { kind: BlankKind::Blank, head: leaves.first().cloned() },

      ("BlankSequence", 0..=1) => Pattern::Blank { kind: BlankKind::BlankSequence, head: leaves.first().cloned() },

      ("BlankNullSequence", 0..=1) => Pattern::Blank { kind: BlankKind::BlankNullSequence, head: leaves.first().cloned() },

      ("Pattern", 2) => {
        match &leaves[0] {
          Atom::Symbol(name) => Pattern::Named { name: *name, pattern: Rc::new(Pattern::compile(&leaves[1])) },
          _ => compile_compound(expression, children)
        }
      }

      ("Condition", 2) => Pattern::Condition {
        pattern: Rc::new(Pattern::compile(&leaves[0])),
        test   : leaves[1].clone()
      },

      ("PatternTest", 2) => Pattern::PatternTest {
        pattern: Rc::new(Pattern::compile(&leaves[0])),
        test   : leaves[1].clone()
      },

      ("Optional", 1..=2) => Pattern::Optional {
        pattern: Rc::new(Pattern::compile(&leaves[0])),
        default: leaves.get(1).cloned()
      },

      ("Alternatives", _) => Pattern::Alternatives(Rc::new(leaves.iter().map(Pattern::compile).collect())),

      ("HoldPattern", 1) => Pattern::compile(&leaves[0]),

      ("Verbatim", 1) => Pattern::Literal(leaves[0].clone()),

      _ => compile_compound(expression, children)

    }
  }

  /// The fewest leaves this pattern can consume from a leaf sequence.
  pub fn minimum_length(&self) -> usize {
    match self {
      Pattern::Blank { kind, .. } => kind.minimum_length(),
      Pattern::Named { pattern, .. }
      | Pattern::Condition { pattern, .. }
      | Pattern::PatternTest { pattern, .. } => pattern.minimum_length(),
      Pattern::Optional { .. } => 0,
      _ => 1
    }
  }

  /// If this pattern is a sequence blank, possibly named or guarded, gives the blank's kind.
  pub fn sequence_kind(&self) -> Option<BlankKind> {
    match self {
      Pattern::Blank { kind, .. } if kind.is_sequence() => Some(*kind),
      Pattern::Named { pattern, .. }
      | Pattern::Condition { pattern, .. }
      | Pattern::PatternTest { pattern, .. } => pattern.sequence_kind(),
      _ => None
    }
  }

  /// Is this pattern a single blank, possibly named or guarded? Under a `Flat` head such a pattern may absorb a run
  /// of leaves.
  pub fn is_single_blank(&self) -> bool {
    match self {
      Pattern::Blank { kind: BlankKind::Blank, .. } => true,
      Pattern::Named { pattern, .. }
      | Pattern::Condition { pattern, .. }
      | Pattern::PatternTest { pattern, .. } => pattern.is_single_blank(),
      _ => false
    }
  }

  /// Can this pattern consume a variable number of leaves?
  pub fn is_variable_length(&self) -> bool {
    self.sequence_kind().is_some() || matches!(self, Pattern::Optional { .. })
  }

  /// The symbol a rule with this left-hand side is stored under: the head symbol of the outermost compound, or the
  /// symbol itself for a literal symbol.
  pub fn head_symbol(&self) -> Option<InternedString> {
    match self {
      Pattern::Literal(atom) => atom.name(),
      Pattern::Compound { head, .. } => {
        match head.as_ref() {
          Pattern::Literal(Atom::Symbol(name)) => Some(*name),
          _ => None
        }
      }
      Pattern::Condition { pattern, .. }
      | Pattern::PatternTest { pattern, .. } => pattern.head_symbol(),
      _ => None
    }
  }

  /// Names bound anywhere inside this pattern, in order of first appearance.
  pub fn bound_names(&self) -> Vec<InternedString> {
    let mut names = Vec::new();
    self.collect_names(&mut names);
    names
  }

  fn collect_names(&self, names: &mut Vec<InternedString>) {
    match self {
      Pattern::Named { name, pattern } => {
        if !names.contains(name) {
          names.push(*name);
        }
        pattern.collect_names(names);
      }
      Pattern::Compound { head, leaves } => {
        head.collect_names(names);
        for leaf in leaves.iter() {
          leaf.collect_names(names);
        }
      }
      Pattern::Condition { pattern, .. }
      | Pattern::PatternTest { pattern, .. }
      | Pattern::Optional { pattern, .. } => pattern.collect_names(names),
      Pattern::Alternatives(alternatives) => {
        for alternative in alternatives.iter() {
          alternative.collect_names(names);
        }
      }
      _ => {}
    }
  }

  /// Computes the rule-ordering key of this pattern.
  pub fn specificity(&self) -> Specificity {
    let mut specificity = Specificity { class: 0, sequence_blanks: 0, unconstrained_blanks: 0, unguarded: 1 };
    self.accumulate_specificity(&mut specificity);
    specificity
  }

  fn accumulate_specificity(&self, specificity: &mut Specificity) {
    match self {
      Pattern::Literal(_) => {}
      Pattern::Blank { kind, head } => {
        specificity.class = 1;
        if kind.is_sequence() {
          specificity.sequence_blanks += 1;
        }
        if head.is_none() {
          specificity.unconstrained_blanks += 1;
        }
      }
      Pattern::Named { pattern, .. } => pattern.accumulate_specificity(specificity),
      Pattern::Compound { head, leaves } => {
        head.accumulate_specificity(specificity);
        for leaf in leaves.iter() {
          leaf.accumulate_specificity(specificity);
        }
      }
      Pattern::Condition { pattern, .. }
      | Pattern::PatternTest { pattern, .. } => {
        specificity.unguarded = 0;
        pattern.accumulate_specificity(specificity);
      }
      Pattern::Optional { pattern, .. } => {
        specificity.class = 1;
        pattern.accumulate_specificity(specificity);
      }
      Pattern::Alternatives(alternatives) => {
        specificity.class = 1;
        for alternative in alternatives.iter() {
          alternative.accumulate_specificity(specificity);
        }
      }
    }
  }
}

fn compile_compound(expression: &Atom, children: &[Atom]) -> Pattern {
  if !expression.contains_pattern() && !contains_hold_pattern(expression) {
    Pattern::Literal(expression.clone())
  } else {
    Pattern::Compound {
      head  : Rc::new(Pattern::compile(&children[0])),
      leaves: Rc::new(children[1..].iter().map(Pattern::compile).collect())
    }
  }
}

fn contains_hold_pattern(expression: &Atom) -> bool {
  match expression {
    Atom::SExpression(children) => {
      children[0].is_symbol("HoldPattern")
          || children[0].is_symbol("Verbatim")
          || children.iter().any(contains_hold_pattern)
    }
    _ => false
  }
}

/// Is `expression` a pattern construct at its top level?
pub fn is_pattern_expression(expression: &Atom) -> bool {
  match expression {
    Atom::SExpression(children) => matches!(&children[0], Atom::Symbol(name) if is_pattern_head(*name)),
    _ => false
  }
}

impl Formattable for Pattern {
  fn format(&self, formatter: &ExpressionFormatter) -> String {
    let matcher_form = formatter.form == DisplayForm::Matcher;
    match self {
      Pattern::Literal(atom) => atom.format(formatter),
      Pattern::Blank { kind, head } => {
        let underscores = match kind {
          BlankKind::Blank => "_",
          BlankKind::BlankSequence => "__",
          BlankKind::BlankNullSequence => "___",
        };
        format!("{}{}", underscores, head.as_ref().map(|h| h.format(formatter)).unwrap_or_default())
      }
      Pattern::Named { name, pattern } => {
        match pattern.as_ref() {
          Pattern::Blank { kind: BlankKind::Blank, head: None } if matcher_form => format!("‹{}›", resolve_str(*name)),
          Pattern::Blank { head: None, .. } if matcher_form => format!("«{}»", resolve_str(*name)),
          Pattern::Blank { .. } => format!("{}{}", resolve_str(*name), pattern.format(formatter)),
          _ => format!("{}:{}", resolve_str(*name), pattern.format(formatter)),
        }
      }
      Pattern::Compound { head, leaves } => {
        let (open, close) = if matcher_form { ("❨", "❩") } else { ("[", "]") };
        format!(
          "{}{}{}{}",
          head.format(formatter),
          open,
          leaves.iter().map(|l| l.format(formatter)).collect::<Vec<_>>().join(", "),
          close
        )
      }
      Pattern::Condition { pattern, test } => {
        format!("{} /; {}", pattern.format(formatter), test.format(formatter))
      }
      Pattern::PatternTest { pattern, test } => {
        format!("{}?{}", pattern.format(formatter), test.format(formatter))
      }
      Pattern::Optional { pattern, default: Some(default) } => {
        format!("{}:{}", pattern.format(formatter), default.format(formatter))
      }
      Pattern::Optional { pattern, default: None } => {
        format!("{}.", pattern.format(formatter))
      }
      Pattern::Alternatives(alternatives) => {
        alternatives.iter().map(|a| a.format(formatter)).collect::<Vec<_>>().join(" | ")
      }
    }
  }
}

display_formattable_impl!(Pattern);


#[cfg(test)]
mod tests {
  use super::*;
  use crate::parse;

  fn compile(text: &str) -> Pattern {
    Pattern::compile(&parse(text).unwrap())
  }

  #[test]
  fn compile_blanks() {
    assert_eq!(compile("x_").to_string(), "x_");
    assert_eq!(compile("x__Integer").to_string(), "x__Integer");
    assert_eq!(compile("f[x_, ys___]").to_string(), "f[x_, ys___]");
    assert!(matches!(compile("f[a, b]"), Pattern::Literal(_)));
    assert!(matches!(compile("HoldPattern[f[a]]"), Pattern::Literal(_)));
    assert_eq!(compile("Verbatim[x_]"), Pattern::Literal(parse("x_").unwrap()));
  }

  #[test]
  fn sequence_and_length_queries() {
    let p = compile("xs__ /; Length[{xs}] > 1");
    assert_eq!(p.sequence_kind(), Some(BlankKind::BlankSequence));
    assert_eq!(p.minimum_length(), 1);
    assert_eq!(compile("x___").minimum_length(), 0);
    assert!(compile("x_?IntegerQ").is_single_blank());
    assert!(!compile("f[x_]").is_single_blank());
  }

  #[test]
  fn head_symbol_of_left_hand_sides() {
    assert_eq!(compile("f[x_, 1]").head_symbol().map(resolve_str), Some("f".to_string()));
    assert_eq!(compile("f[x_] /; x > 1").head_symbol().map(resolve_str), Some("f".to_string()));
    assert_eq!(compile("x").head_symbol().map(resolve_str), Some("x".to_string()));
    assert_eq!(compile("x_").head_symbol(), None);
  }

  #[test]
  fn specificity_orders_rules() {
    let literal      = compile("f[1]").specificity();
    let constrained  = compile("f[x_Integer]").specificity();
    let guarded      = compile("f[x_] /; x > 1").specificity();
    let plain        = compile("f[x_]").specificity();
    let sequence     = compile("f[x___]").specificity();

    assert!(literal < constrained);
    assert!(constrained < guarded);
    assert!(guarded < plain);
    assert!(plain < sequence);
  }

  #[test]
  fn bound_names_in_order() {
    let names: Vec<String> = compile("f[x_, g[y_, x_], z___]").bound_names().into_iter().map(resolve_str).collect();
    assert_eq!(names, vec!["x", "y", "z"]);
  }
}
