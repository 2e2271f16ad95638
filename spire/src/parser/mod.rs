/*!

Parser for the CNF problem language, a TPTP-like surface syntax:

```text
% axioms
cnf(left_identity, axiom, mult(e, X) = X).
cnf(implication,   axiom, ~p(X) | q(X)).
cnf(goal,          negated_conjecture, ~q(a)).
```

Uppercase identifiers are variables, lowercase identifiers are symbols, `~` negates
an atom, `|` separates literals, and the clause body may be parenthesized. The
grammar lives in `problem.lalrpop`; this module wraps the generated parser.

*/

pub mod ast;

use lalrpop_util::lalrpop_mod;

lalrpop_mod!(
  #[allow(clippy::all)]
  #[allow(unused)]
  problem,
  "/parser/problem.rs"
);

use ast::ProblemAst;

pub fn parse_problem(text: &str) -> Result<ProblemAst, String> {
  problem::ProblemParser::new()
    .parse(text)
    .map_err(|error| error.to_string())
}

#[cfg(test)]
mod tests {
  use crate::parser::ast::{LiteralAst, TermAst};
  use super::*;

  #[test]
  fn parses_clauses_with_all_literal_forms() {
    let text = r"
      % a comment
      cnf(one, axiom, p(X) | ~q(f(X), a)).
      cnf(two, axiom, (f(a) = b | a != b)).
      cnf(three, negated_conjecture, ~r).
    ";
    let ast = parse_problem(text).expect("parse failure");
    assert_eq!(ast.clauses.len(), 3);

    assert_eq!(ast.clauses[0].name, "one");
    assert_eq!(ast.clauses[0].role, "axiom");
    assert_eq!(ast.clauses[0].lits.len(), 2);
    assert!(matches!(ast.clauses[0].lits[0], LiteralAst::Atom(_, true)));
    assert!(matches!(ast.clauses[0].lits[1], LiteralAst::Atom(_, false)));

    assert!(matches!(ast.clauses[1].lits[0], LiteralAst::Equation(_, _, true)));
    assert!(matches!(ast.clauses[1].lits[1], LiteralAst::Equation(_, _, false)));

    let LiteralAst::Atom(TermAst::Apply(name, args), false) = &ast.clauses[2].lits[0] else {
      panic!("expected a negated constant atom");
    };
    assert_eq!(name, "r");
    assert!(args.is_empty());
  }

  #[test]
  fn nested_terms_and_variables() {
    let ast = parse_problem("cnf(c, axiom, p(f(g(X), Y), X)).").unwrap();
    let LiteralAst::Atom(TermAst::Apply(_, args), true) = &ast.clauses[0].lits[0] else {
      panic!("expected an atom");
    };
    assert_eq!(args.len(), 2);
    assert!(matches!(args[1], TermAst::Var(_)));
  }

  #[test]
  fn rejects_malformed_input() {
    assert!(parse_problem("cnf(broken, axiom p(X)).").is_err());
    assert!(parse_problem("cnf(broken, axiom, p(X))").is_err());
  }
}
