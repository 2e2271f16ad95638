/*!

Lowers the parsed AST into engine statements: variables are numbered per clause,
lowercase identifiers become interned symbols typed `ι × … × ι → ι` in function
position and `ι × … × ι → ο` in predicate position, atoms become `p(x̄) ≈ ⊤`
equations. A name used at inconsistent types (predicate and function, or two
arities) is a signature clash and aborts the problem.

*/

use std::{
  collections::HashMap,
  fmt::Display,
};

use spire_abs::IString;
use spire_lib::{
  api::{ClauseRole, InputClause, Statement},
  core::{
    literal::Literal,
    symbol::{SignatureClash, Symbol},
    term::Term,
    types::{Type, TypeError},
  },
};

use crate::parser::{
  ast::{LiteralAst, ProblemAst, TermAst},
  parse_problem,
};

#[derive(Debug)]
pub enum ProblemError {
  Parse(String),
  UnknownRole { clause: String, role: String },
  VariableAtom { clause: String, variable: String },
  Signature(SignatureClash),
  Type(TypeError),
}

impl Display for ProblemError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      ProblemError::Parse(message) => write!(f, "parse error: {}", message),
      ProblemError::UnknownRole { clause, role } => {
        write!(f, "clause {}: unknown role {}", clause, role)
      }
      ProblemError::VariableAtom { clause, variable } => {
        write!(f, "clause {}: variable {} used as an atom", clause, variable)
      }
      ProblemError::Signature(clash) => write!(f, "{}", clash),
      ProblemError::Type(error) => write!(f, "{}", error),
    }
  }
}

impl std::error::Error for ProblemError {}

impl From<SignatureClash> for ProblemError {
  fn from(clash: SignatureClash) -> Self {
    ProblemError::Signature(clash)
  }
}

impl From<TypeError> for ProblemError {
  fn from(error: TypeError) -> Self {
    ProblemError::Type(error)
  }
}

/// Parses and lowers a problem text into engine statements.
pub fn load_problem(text: &str) -> Result<Vec<Statement>, ProblemError> {
  let ast = parse_problem(text).map_err(ProblemError::Parse)?;
  lower(ast)
}

fn lower(ast: ProblemAst) -> Result<Vec<Statement>, ProblemError> {
  let mut statements = Vec::with_capacity(ast.clauses.len());

  for clause in ast.clauses {
    let role = ClauseRole::from_name(&clause.role).ok_or_else(|| ProblemError::UnknownRole {
      clause: clause.name.clone(),
      role: clause.role.clone(),
    })?;

    let mut vars: HashMap<String, u32> = HashMap::new();
    let mut lits = Vec::with_capacity(clause.lits.len());

    for lit in &clause.lits {
      match lit {
        LiteralAst::Equation(left, right, positive) => {
          let left = lower_term(left, &mut vars)?;
          let right = lower_term(right, &mut vars)?;
          lits.push(Literal::equation(left, right, *positive)?);
        }
        LiteralAst::Atom(atom, positive) => {
          let atom = lower_atom(atom, &clause.name, &mut vars)?;
          lits.push(Literal::predicate(atom, *positive)?);
        }
      }
    }

    statements.push(Statement::Assert(InputClause {
      name: IString::from(clause.name.as_str()),
      role,
      lits,
    }));
  }

  Ok(statements)
}

/// A term in function position: every symbol maps individuals to an individual.
fn lower_term(ast: &TermAst, vars: &mut HashMap<String, u32>) -> Result<Term, ProblemError> {
  match ast {
    TermAst::Var(name) => Ok(variable(name, vars)),
    TermAst::Apply(name, args) => {
      let iota = Type::individual();
      let symbol = Symbol::with_type(name, Type::arrow(vec![iota.clone(); args.len()], iota))?;
      let lowered: Result<Vec<Term>, ProblemError> =
          args.iter().map(|arg| lower_term(arg, vars)).collect();
      Ok(Term::app_checked(Term::constant(symbol), lowered?)?)
    }
  }
}

/// A term in predicate position: the head maps individuals to a proposition.
fn lower_atom(
  ast: &TermAst,
  clause: &str,
  vars: &mut HashMap<String, u32>,
) -> Result<Term, ProblemError> {
  match ast {
    TermAst::Var(name) => Err(ProblemError::VariableAtom {
      clause: clause.to_string(),
      variable: name.clone(),
    }),
    TermAst::Apply(name, args) => {
      let iota = Type::individual();
      let symbol =
          Symbol::with_type(name, Type::arrow(vec![iota; args.len()], Type::boolean()))?;
      let lowered: Result<Vec<Term>, ProblemError> =
          args.iter().map(|arg| lower_term(arg, vars)).collect();
      Ok(Term::app_checked(Term::constant(symbol), lowered?)?)
    }
  }
}

fn variable(name: &str, vars: &mut HashMap<String, u32>) -> Term {
  let next = vars.len() as u32;
  let id = *vars.entry(name.to_string()).or_insert(next);
  Term::var(id, Type::individual())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn lowers_shared_variables_consistently() {
    let statements = load_problem("cnf(c, axiom, ~prob_p(X) | prob_q(X)).").unwrap();
    assert_eq!(statements.len(), 1);
    let Statement::Assert(input) = &statements[0] else {
      panic!("expected an assert");
    };
    assert_eq!(input.lits.len(), 2);

    let vars_first = input.lits[0].free_vars();
    let vars_second = input.lits[1].free_vars();
    assert_eq!(vars_first, vars_second);
  }

  #[test]
  fn predicate_and_function_use_of_one_name_clashes() {
    let result = load_problem("cnf(c, axiom, prob_r(prob_r)).");
    assert!(matches!(result, Err(ProblemError::Signature(_))));
  }

  #[test]
  fn unknown_roles_are_rejected() {
    let result = load_problem("cnf(c, conjecture, prob_s).");
    assert!(matches!(result, Err(ProblemError::UnknownRole { .. })));
  }
}
