/*!

Literal selection. A policy picks a (possibly empty) set of literal indices of a
clause; when the set is non-empty, generating inferences are restricted to the
selected literals. Only negative literals are ever selected, which keeps every policy
compatible with the calculus' completeness requirements. The selection is recomputed
whenever the ordering is applied to a clause anew.

*/

use std::fmt::Display;

use spire_abs::NatSet;

use crate::core::{
  clause::Clause,
  ordering::{compare_literals, TermOrdering},
};

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum SelectionPolicy {
  /// Never select; eligibility is maximality under the ordering.
  #[default]
  NoSelection,
  /// Select the first negative literal.
  SelectOneNegative,
  /// Select every negative literal.
  SelectAllNegative,
  /// Select one negative literal that is maximal among the negatives.
  SelectMaxNegative,
}

impl Display for SelectionPolicy {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      SelectionPolicy::NoSelection       => write!(f, "none"),
      SelectionPolicy::SelectOneNegative => write!(f, "one-neg"),
      SelectionPolicy::SelectAllNegative => write!(f, "all-neg"),
      SelectionPolicy::SelectMaxNegative => write!(f, "max-neg"),
    }
  }
}

impl SelectionPolicy {
  pub fn select(&self, clause: &Clause, ord: &dyn TermOrdering) -> NatSet {
    let negatives: Vec<usize> = clause
      .lits()
      .iter()
      .enumerate()
      .filter(|(_, lit)| lit.is_negative())
      .map(|(index, _)| index)
      .collect();

    if negatives.is_empty() {
      return NatSet::new();
    }

    match self {
      SelectionPolicy::NoSelection => NatSet::new(),
      SelectionPolicy::SelectOneNegative => NatSet::singleton(negatives[0]),
      SelectionPolicy::SelectAllNegative => negatives.into_iter().collect(),
      SelectionPolicy::SelectMaxNegative => {
        let lits = clause.lits();
        let maximal = negatives
          .iter()
          .copied()
          .find(|&index| {
            negatives.iter().all(|&other| {
              other == index
                || compare_literals(ord, &lits[other], &lits[index])
                  != Some(std::cmp::Ordering::Greater)
            })
          })
          .unwrap_or(negatives[0]);
        NatSet::singleton(maximal)
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use crate::core::{
    clause::ClauseAttributes,
    literal::Literal,
    ordering::{Kbo, Precedence},
    proof::ProofStep,
    symbol::Symbol,
    term::Term,
    trail::Trail,
    types::Type,
  };
  use super::*;

  fn clause_with_mixed_signs() -> Clause {
    let iota = Type::individual();
    let a = Term::constant(Symbol::with_type("sel_test_a", iota.clone()).unwrap());
    let b = Term::constant(Symbol::with_type("sel_test_b", iota.clone()).unwrap());
    let f = Term::constant(
      Symbol::with_type("sel_test_f", Type::arrow(vec![iota.clone()], iota)).unwrap(),
    );
    let fa = Term::app(f, vec![a.clone()]);

    Clause::new(
      vec![
        Literal::equation(a.clone(), b.clone(), true).unwrap(),
        Literal::equation(fa.clone(), b.clone(), false).unwrap(),
        Literal::equation(a, fa, false).unwrap(),
      ],
      Trail::empty(),
      ProofStep::axiom("test"),
      0,
      ClauseAttributes::default(),
    )
  }

  #[test]
  fn policies_select_only_negative_literals() {
    let clause = clause_with_mixed_signs();
    let kbo = Kbo::new(Precedence::by_id());

    assert!(SelectionPolicy::NoSelection.select(&clause, &kbo).is_empty());

    for policy in [
      SelectionPolicy::SelectOneNegative,
      SelectionPolicy::SelectAllNegative,
      SelectionPolicy::SelectMaxNegative,
    ] {
      let selected = policy.select(&clause, &kbo);
      assert!(!selected.is_empty());
      for index in selected.iter() {
        assert!(clause.lits()[index].is_negative(), "{} selected a positive literal", policy);
      }
    }

    let all = SelectionPolicy::SelectAllNegative.select(&clause, &kbo);
    assert_eq!(all.len(), 2);
  }
}
