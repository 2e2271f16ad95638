/*!

The active set: fully processed clauses together with every index the inference and
simplification rules query.

- `sup_from` holds the maximal sides of eligible positive equations, the `l ≈ r`
  partners superposition rewrites *from*.
- `sup_into` holds the non-variable subterms of maximal sides of eligible literals,
  the positions superposition rewrites *into*.
- `demod` holds the oriented sides of unit positive equations, the simplification
  set used by demodulation and simplify-reflect.
- `fv` is the feature-vector index for subsumption candidate retrieval.

Insertion and removal enumerate entries identically, so removal restores the indexes
exactly; a clause's selection is cached on the clause, which keeps the enumeration
deterministic.

*/

use std::{
  cmp::Ordering,
  collections::HashMap,
};

use crate::core::{
  clause::{Clause, ClauseId},
  index::{FeatureVector, FeatureVectorIndex, FingerprintIndex},
  ordering::TermOrdering,
  term::{Position, Term},
};

/// A positive equation side superposition can rewrite from.
#[derive(Clone)]
pub struct SupFromEntry {
  pub clause   : Clause,
  pub lit_index: usize,
  pub lhs      : Term,
  pub rhs      : Term,
}

/// A non-variable subterm superposition can rewrite into.
#[derive(Clone)]
pub struct SupIntoEntry {
  pub clause   : Clause,
  pub lit_index: usize,
  /// True when the subterm sits in the literal's stored left side.
  pub in_lhs  : bool,
  pub position: Position,
  pub subterm : Term,
}

/// An oriented unit equation `lhs → rhs`. `oriented` is false when the unit is
/// incomparable and the instance check `lhsσ > rhsσ` must run at rewrite time.
#[derive(Clone)]
pub struct DemodEntry {
  pub clause  : Clause,
  pub lhs     : Term,
  pub rhs     : Term,
  pub oriented: bool,
}

#[derive(Default)]
pub struct ActiveSet {
  clauses  : HashMap<ClauseId, Clause>,
  sup_from : FingerprintIndex<SupFromEntry>,
  sup_into : FingerprintIndex<SupIntoEntry>,
  demod    : FingerprintIndex<DemodEntry>,
  fv       : FeatureVectorIndex,
  neg_units: Vec<Clause>,
}

impl ActiveSet {
  pub fn new() -> Self {
    Self::default()
  }

  #[inline(always)]
  pub fn len(&self) -> usize {
    self.clauses.len()
  }

  #[inline(always)]
  pub fn contains(&self, id: ClauseId) -> bool {
    self.clauses.contains_key(&id)
  }

  pub fn get(&self, id: ClauseId) -> Option<&Clause> {
    self.clauses.get(&id)
  }

  pub fn clauses(&self) -> impl Iterator<Item = &Clause> {
    self.clauses.values()
  }

  /// Snapshot of the clause handles, for passes that mutate the set while walking.
  pub fn clause_snapshot(&self) -> Vec<Clause> {
    self.clauses.values().cloned().collect()
  }

  pub fn neg_units(&self) -> &[Clause] {
    &self.neg_units
  }

  // region Retrieval

  pub fn sup_from_unifiable(&self, subterm: &Term) -> Vec<(Term, SupFromEntry)> {
    self.sup_from.retrieve_unifiable(subterm)
  }

  pub fn sup_into_unifiable(&self, equation_side: &Term) -> Vec<(Term, SupIntoEntry)> {
    self.sup_into.retrieve_unifiable(equation_side)
  }

  /// Unit equation sides that could match onto the subterm, for demodulation.
  pub fn demod_generalizations(&self, subterm: &Term) -> Vec<(Term, DemodEntry)> {
    self.demod.retrieve_generalizations(subterm)
  }

  pub fn subsuming_candidates(&self, features: &FeatureVector) -> Vec<Clause> {
    self.fv.retrieve_subsuming(features)
  }

  pub fn subsumed_candidates(&self, features: &FeatureVector) -> Vec<Clause> {
    self.fv.retrieve_subsumed(features)
  }

  // endregion Retrieval

  // region Maintenance

  /// Inserts a clause whose selection has already been computed and cached.
  pub fn insert(&mut self, clause: Clause, ord: &dyn TermOrdering) {
    debug_assert!(!self.clauses.contains_key(&clause.id()), "clause activated twice");

    self.each_sup_from(&clause, ord, true);
    self.each_sup_into(&clause, ord, true);
    self.each_demod(&clause, ord, true);

    self.fv.insert(clause.clone());
    if clause.as_unit_negative_equation().is_some() {
      self.neg_units.push(clause.clone());
    }
    self.clauses.insert(clause.id(), clause);
  }

  /// Removes a clause and every index entry it contributed. Returns the clause.
  pub fn remove(&mut self, id: ClauseId, ord: &dyn TermOrdering) -> Option<Clause> {
    let clause = self.clauses.remove(&id)?;

    self.each_sup_from(&clause, ord, false);
    self.each_sup_into(&clause, ord, false);
    self.each_demod(&clause, ord, false);

    self.fv.remove(&clause);
    self.neg_units.retain(|c| c.id() != id);
    Some(clause)
  }

  fn each_sup_from(&mut self, clause: &Clause, ord: &dyn TermOrdering, add: bool) {
    let id = clause.id();
    for (lit_index, lhs, rhs) in eligible_equation_sides(clause, ord) {
      let entry = SupFromEntry { clause: clause.clone(), lit_index, lhs: lhs.clone(), rhs };
      if add {
        self.sup_from.insert(lhs, entry);
      } else {
        self.sup_from.remove(&lhs, |e| e.clause.id() == id);
      }
    }
  }

  fn each_sup_into(&mut self, clause: &Clause, ord: &dyn TermOrdering, add: bool) {
    let id = clause.id();
    for (lit_index, in_lhs, side) in eligible_literal_sides(clause, ord) {
      for (subterm, position) in side.subterms_with_positions() {
        if subterm.is_var() {
          continue;
        }
        if add {
          let entry = SupIntoEntry {
            clause: clause.clone(),
            lit_index,
            in_lhs,
            position,
            subterm: subterm.clone(),
          };
          self.sup_into.insert(subterm, entry);
        } else {
          self
            .sup_into
            .remove(&subterm, |e| e.clause.id() == id && e.lit_index == lit_index && e.in_lhs == in_lhs);
        }
      }
    }
  }

  fn each_demod(&mut self, clause: &Clause, ord: &dyn TermOrdering, add: bool) {
    let id = clause.id();
    for (lhs, rhs, oriented) in demod_orientations(clause, ord) {
      if add {
        let entry = DemodEntry { clause: clause.clone(), lhs: lhs.clone(), rhs, oriented };
        self.demod.insert(lhs, entry);
      } else {
        self.demod.remove(&lhs, |e| e.clause.id() == id);
      }
    }
  }

  // endregion Maintenance
}

/// The maximal sides of eligible positive equations of the clause.
pub(crate) fn eligible_equation_sides(
  clause: &Clause,
  ord: &dyn TermOrdering,
) -> Vec<(usize, Term, Term)> {
  let mut sides = Vec::new();
  for lit_index in clause.eligible_indices(ord) {
    let Some(eq) = clause.lits()[lit_index].as_equation() else {
      continue;
    };
    if !eq.is_positive() {
      continue;
    }
    match eq.orientation(ord) {
      Some(Ordering::Greater) => sides.push((lit_index, eq.lhs().clone(), eq.rhs().clone())),
      Some(Ordering::Less) => sides.push((lit_index, eq.rhs().clone(), eq.lhs().clone())),
      Some(Ordering::Equal) => {}
      None => {
        sides.push((lit_index, eq.lhs().clone(), eq.rhs().clone()));
        sides.push((lit_index, eq.rhs().clone(), eq.lhs().clone()));
      }
    }
  }
  sides
}

/// The maximal sides of every eligible literal of the clause.
pub(crate) fn eligible_literal_sides(clause: &Clause, ord: &dyn TermOrdering) -> Vec<(usize, bool, Term)> {
  let mut sides = Vec::new();
  for lit_index in clause.eligible_indices(ord) {
    let Some(eq) = clause.lits()[lit_index].as_equation() else {
      continue;
    };
    match eq.orientation(ord) {
      Some(Ordering::Greater) | Some(Ordering::Equal) => {
        sides.push((lit_index, true, eq.lhs().clone()));
      }
      Some(Ordering::Less) => sides.push((lit_index, false, eq.rhs().clone())),
      None => {
        sides.push((lit_index, true, eq.lhs().clone()));
        sides.push((lit_index, false, eq.rhs().clone()));
      }
    }
  }
  sides
}

/// The usable rewrite orientations of a unit positive equation.
pub(crate) fn demod_orientations(
  clause: &Clause,
  ord: &dyn TermOrdering,
) -> Vec<(Term, Term, bool)> {
  let Some(eq) = clause.as_unit_positive_equation() else {
    return Vec::new();
  };
  match eq.orientation(ord) {
    Some(Ordering::Greater) => vec![(eq.lhs().clone(), eq.rhs().clone(), true)],
    Some(Ordering::Less) => vec![(eq.rhs().clone(), eq.lhs().clone(), true)],
    Some(Ordering::Equal) => Vec::new(),
    None => vec![
      (eq.lhs().clone(), eq.rhs().clone(), false),
      (eq.rhs().clone(), eq.lhs().clone(), false),
    ],
  }
}
