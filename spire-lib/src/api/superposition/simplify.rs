/*!

Simplification rules. Each rewrites a clause into one that is entailed by the clause
plus the simplification set and never larger in the clause ordering, or deletes it as
redundant. The forward driver iterates them to a fixpoint; each function here does
one unit of work per call so the proof records stay one-step.

*/

use std::cmp::Ordering;

use crate::core::{
  clause::Clause,
  index::feature_vector,
  literal::Literal,
  ordering::TermOrdering,
  proof::{InferenceRule, ProofStep},
  saturation::{demod_orientations, ProofState},
  substitution::{Scope, Subst},
  term::Term,
  unify::matching_into,
};

use super::{generate::unify_literal_pair, simplified_clause};

// region Basic simplification

/// Drops resolved (`s ≉ s`, `$false`) literals and duplicate literals. Returns the
/// clause unchanged when nothing applies; an empty result is a genuine conclusion.
pub(super) fn basic_simplify(clause: &Clause) -> Option<Clause> {
  let mut lits: Vec<Literal> = Vec::with_capacity(clause.len());
  let mut changed = false;

  for lit in clause.lits() {
    if lit.is_trivially_false() {
      changed = true;
      continue;
    }
    if lits.contains(lit) {
      changed = true;
      continue;
    }
    lits.push(lit.clone());
  }

  if !changed {
    return Some(clause.clone());
  }
  Some(simplified_clause(
    clause,
    lits,
    Vec::new(),
    InferenceRule::DuplicateLiteralRemoval,
  ))
}

/// A clause with a trivially-true literal or a complementary literal pair.
pub(super) fn is_tautology(clause: &Clause) -> bool {
  let lits = clause.lits();
  for (index, lit) in lits.iter().enumerate() {
    if lit.is_trivially_true() {
      return true;
    }
    for other in &lits[index + 1..] {
      if lit.is_complement_of(other) {
        return true;
      }
    }
  }
  false
}

// endregion Basic simplification

// region Demodulation

/// Rewrites the first reducible subterm with a unit equation from the simplification
/// set, when the instance is oriented (`lσ > rσ`) and the rewrite shrinks the
/// clause. `None` when the clause is in normal form.
pub(super) fn demodulate(state: &ProofState, clause: &Clause) -> Option<Clause> {
  let ord = state.ord();
  let lits = clause.lits();

  for (lit_index, lit) in lits.iter().enumerate() {
    let Some(eq) = lit.as_equation() else {
      continue;
    };
    let sides = [
      (eq.lhs().clone(), eq.rhs().clone()),
      (eq.rhs().clone(), eq.lhs().clone()),
    ];
    let positive = eq.is_positive();

    for (side, other) in sides {
      for (subterm, position) in side.subterms_with_positions() {
        if subterm.is_var() {
          continue;
        }
        // Rewriting the top of the maximal side of a positive unit equation would
        // erase the clause's own rewrite power; leave those positions alone.
        if clause.len() == 1
            && positive
            && position.is_empty()
            && ord.compare(&side, &other) == Some(Ordering::Greater)
        {
          continue;
        }

        for (_, entry) in state.active.demod_generalizations(&subterm) {
          if entry.clause.id() == clause.id() {
            continue;
          }
          let mut subst = Subst::new();
          if matching_into(&mut subst, &entry.lhs, Scope::PARTNER, &subterm, Scope::GIVEN).is_err() {
            continue;
          }
          let replacement = subst.apply_no_renaming(&entry.rhs, Scope::PARTNER);
          if !entry.oriented && ord.compare(&subterm, &replacement) != Some(Ordering::Greater) {
            continue;
          }

          let new_side = side.replace_at(&position, &replacement);
          let mut new_lits = lits.to_vec();
          new_lits[lit_index] = Literal::equation_unchecked(new_side, other.clone(), positive);
          return Some(simplified_clause(
            clause,
            new_lits,
            vec![entry.clause.clone()],
            InferenceRule::Demodulation,
          ));
        }
      }
    }
  }
  None
}

// endregion Demodulation

// region Simplify-reflect

/// Positive simplify-reflect removes `s ≉ t` when some unit `l ≈ r` instantiates to
/// exactly `s ≈ t`; negative simplify-reflect removes `s ≈ t` when some unit
/// `l ≉ r` does. One removal per call.
pub(super) fn simplify_reflect(state: &ProofState, clause: &Clause) -> Option<Clause> {
  let lits = clause.lits();

  for (lit_index, lit) in lits.iter().enumerate() {
    let Some(eq) = lit.as_equation() else {
      continue;
    };
    let pairings = [
      (eq.lhs().clone(), eq.rhs().clone()),
      (eq.rhs().clone(), eq.lhs().clone()),
    ];

    if !eq.is_positive() {
      // s ≉ t against positive units.
      for (s, t) in &pairings {
        for (_, entry) in state.active.demod_generalizations(s) {
          let mut subst = Subst::new();
          if matching_into(&mut subst, &entry.lhs, Scope::PARTNER, s, Scope::GIVEN).is_ok()
              && matching_into(&mut subst, &entry.rhs, Scope::PARTNER, t, Scope::GIVEN).is_ok()
          {
            let mut new_lits = lits.to_vec();
            new_lits.remove(lit_index);
            return Some(simplified_clause(
              clause,
              new_lits,
              vec![entry.clause.clone()],
              InferenceRule::PositiveSimplifyReflect,
            ));
          }
        }
      }
    } else {
      // s ≈ t against negative units.
      for unit in state.active.neg_units() {
        let Some(unit_eq) = unit.as_unit_negative_equation() else {
          continue;
        };
        for (s, t) in &pairings {
          let mut subst = Subst::new();
          if matching_into(&mut subst, unit_eq.lhs(), Scope::PARTNER, s, Scope::GIVEN).is_ok()
              && matching_into(&mut subst, unit_eq.rhs(), Scope::PARTNER, t, Scope::GIVEN).is_ok()
          {
            let mut new_lits = lits.to_vec();
            new_lits.remove(lit_index);
            return Some(simplified_clause(
              clause,
              new_lits,
              vec![unit.clone()],
              InferenceRule::NegativeSimplifyReflect,
            ));
          }
        }
      }
    }
  }
  None
}

// endregion Simplify-reflect

// region Subsumption

/// Multiset subsumption: does some instance of `d` embed into `c` literal-wise, with
/// `d`'s trail a subset of `c`'s?
pub(crate) fn subsumes(d: &Clause, c: &Clause) -> bool {
  if d.len() > c.len() || !d.trail().is_subset_of(c.trail()) {
    return false;
  }
  let mut used = vec![false; c.len()];
  let subst = Subst::new();
  embed_literals(d.lits(), c.lits(), 0, &mut used, &subst)
}

fn embed_literals(
  d_lits: &[Literal],
  c_lits: &[Literal],
  index: usize,
  used: &mut [bool],
  subst: &Subst,
) -> bool {
  if index == d_lits.len() {
    return true;
  }
  for (c_index, c_lit) in c_lits.iter().enumerate() {
    if used[c_index] {
      continue;
    }
    for extended in literal_matchers(&d_lits[index], c_lit, subst) {
      used[c_index] = true;
      if embed_literals(d_lits, c_lits, index + 1, used, &extended) {
        used[c_index] = false;
        return true;
      }
      used[c_index] = false;
    }
  }
  false
}

/// The ways the pattern literal matches onto the subject literal, extending `base`.
fn literal_matchers(pattern: &Literal, subject: &Literal, base: &Subst) -> Vec<Subst> {
  match (pattern, subject) {
    (Literal::True, Literal::True) | (Literal::False, Literal::False) => vec![base.clone()],
    (Literal::Equation(p), Literal::Equation(s)) if p.is_positive() == s.is_positive() => {
      let mut matchers = Vec::new();
      let pairings = [
        ((p.lhs(), p.rhs()), (s.lhs(), s.rhs())),
        ((p.rhs(), p.lhs()), (s.lhs(), s.rhs())),
      ];
      for ((pl, pr), (sl, sr)) in pairings {
        let mut subst = base.clone();
        if matching_into(&mut subst, pl, Scope::PARTNER, sl, Scope::GIVEN).is_ok()
            && matching_into(&mut subst, pr, Scope::PARTNER, sr, Scope::GIVEN).is_ok()
        {
          matchers.push(subst);
        }
      }
      matchers
    }
    _ => Vec::new(),
  }
}

/// Is the clause subsumed by some active clause?
pub(super) fn forward_subsumed(state: &ProofState, clause: &Clause) -> bool {
  let features = feature_vector(clause);
  state
    .active
    .subsuming_candidates(&features)
    .iter()
    .any(|candidate| subsumes(candidate, clause))
}

// endregion Subsumption

// region Condensation

/// Unify two literals of the clause; when the shrunk instance subsumes the original,
/// replace the clause by it.
pub(super) fn condense(clause: &Clause) -> Option<Clause> {
  let lits = clause.lits();
  if lits.len() < 2 {
    return None;
  }

  for i in 0..lits.len() {
    for j in 0..lits.len() {
      if i == j {
        continue;
      }
      for subst in unify_literal_pair(&lits[i], &lits[j]) {
        let candidate_lits: Vec<Literal> = lits
          .iter()
          .enumerate()
          .filter(|(index, _)| *index != j)
          .map(|(_, lit)| lit.apply_no_renaming(&subst, Scope::GIVEN))
          .collect();
        let candidate = simplified_clause(
          clause,
          candidate_lits,
          Vec::new(),
          InferenceRule::Condensation,
        );
        if subsumes(&candidate, clause) {
          return Some(candidate);
        }
      }
    }
  }
  None
}

// endregion Condensation

// region Contextual literal cutting

/// Removes a literal `L` from the clause when some active clause subsumes the clause
/// with `L` negated (subsumption resolution). One removal per call.
pub(super) fn contextual_literal_cut(state: &ProofState, clause: &Clause) -> Option<Clause> {
  let lits = clause.lits();

  for (lit_index, lit) in lits.iter().enumerate() {
    let mut probe_lits = lits.to_vec();
    probe_lits[lit_index] = lit.negate();
    let probe = Clause::new(
      probe_lits,
      clause.trail().clone(),
      ProofStep::axiom("clc-probe"),
      clause.age(),
      Default::default(),
    );

    let features = feature_vector(&probe);
    for candidate in state.active.subsuming_candidates(&features) {
      if candidate.id() == clause.id() {
        continue;
      }
      if subsumes(&candidate, &probe) {
        let mut new_lits = lits.to_vec();
        new_lits.remove(lit_index);
        return Some(simplified_clause(
          clause,
          new_lits,
          vec![candidate],
          InferenceRule::ContextualLiteralCut,
        ));
      }
    }
  }
  None
}

// endregion Contextual literal cutting

// region Backward simplification

/// Uses the freshly accepted given clause against the active set: backward
/// subsumption removes subsumed active clauses outright; backward demodulation
/// rewrites active clauses reducible by a unit given and requeues the results.
pub(super) fn backward_simplify(state: &mut ProofState, given: &Clause) -> Vec<Clause> {
  let mut requeue = Vec::new();

  if state.config().enable_subsumption {
    let features = feature_vector(given);
    let candidates = state.active.subsumed_candidates(&features);
    for candidate in candidates {
      if candidate.id() == given.id() {
        continue;
      }
      if subsumes(given, &candidate) && state.remove_active(candidate.id()).is_some() {
        state.stats.subsumed_backward += 1;
      }
    }
  }

  if state.config().enable_demodulation {
    let orientations = demod_orientations(given, state.ord());
    if !orientations.is_empty() {
      for active_clause in state.active.clause_snapshot() {
        if active_clause.id() == given.id() {
          continue;
        }
        let Some(new_lits) = rewrite_with_units(&orientations, &active_clause, state.ord()) else {
          continue;
        };
        if state.remove_active(active_clause.id()).is_some() {
          state.stats.simplified_backward += 1;
          state.stats.demodulations += 1;
          requeue.push(simplified_clause(
            &active_clause,
            new_lits,
            vec![given.clone()],
            InferenceRule::Demodulation,
          ));
        }
      }
    }
  }

  requeue
}

/// One rewrite of `clause` with the oriented unit sides, if any position reduces.
fn rewrite_with_units(
  units: &[(Term, Term, bool)],
  clause: &Clause,
  ord: &dyn TermOrdering,
) -> Option<Vec<Literal>> {
  let lits = clause.lits();
  for (lit_index, lit) in lits.iter().enumerate() {
    let Some(eq) = lit.as_equation() else {
      continue;
    };
    let sides = [
      (eq.lhs().clone(), eq.rhs().clone()),
      (eq.rhs().clone(), eq.lhs().clone()),
    ];
    let positive = eq.is_positive();

    for (side, other) in sides {
      for (subterm, position) in side.subterms_with_positions() {
        if subterm.is_var() {
          continue;
        }
        for (lhs, rhs, oriented) in units {
          let mut subst = Subst::new();
          if matching_into(&mut subst, lhs, Scope::PARTNER, &subterm, Scope::GIVEN).is_err() {
            continue;
          }
          let replacement = subst.apply_no_renaming(rhs, Scope::PARTNER);
          if !oriented && ord.compare(&subterm, &replacement) != Some(Ordering::Greater) {
            continue;
          }
          let new_side = side.replace_at(&position, &replacement);
          let mut new_lits = lits.to_vec();
          new_lits[lit_index] = Literal::equation_unchecked(new_side, other.clone(), positive);
          return Some(new_lits);
        }
      }
    }
  }
  None
}

// endregion Backward simplification
