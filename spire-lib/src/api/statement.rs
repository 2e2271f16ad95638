/*!

Input interface. A preprocessor (parser + CNF conversion) delivers a sequence of
statements: type declarations growing the signature, and clause assertions. This is
the entire surface the front-end needs.

*/

use spire_abs::IString;

use crate::core::{
  clause::{Clause, ClauseAttribute, ClauseAttributes},
  literal::Literal,
  proof::ProofStep,
  trail::Trail,
  types::Type,
};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ClauseRole {
  Axiom,
  Hypothesis,
  NegatedConjecture,
}

impl ClauseRole {
  pub fn from_name(name: &str) -> Option<ClauseRole> {
    match name {
      "axiom" | "lemma" | "definition" => Some(ClauseRole::Axiom),
      "hypothesis" => Some(ClauseRole::Hypothesis),
      "negated_conjecture" => Some(ClauseRole::NegatedConjecture),
      _ => None,
    }
  }
}

pub struct InputClause {
  pub name: IString,
  pub role: ClauseRole,
  pub lits: Vec<Literal>,
}

impl InputClause {
  pub fn into_clause(self, age: u32) -> Clause {
    let mut attributes: ClauseAttributes = ClauseAttribute::Input.into();
    if self.role == ClauseRole::NegatedConjecture {
      attributes |= ClauseAttribute::FromConjecture;
    }
    Clause::new(
      self.lits,
      Trail::empty(),
      ProofStep::axiom(&*self.name),
      age,
      attributes,
    )
  }
}

pub enum Statement {
  /// Declares a symbol with its type.
  TypeDecl(IString, Type),
  /// Asserts an input clause.
  Assert(InputClause),
}
