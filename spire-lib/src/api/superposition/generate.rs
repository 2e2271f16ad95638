/*!

The generating inferences: equality resolution, equality factoring, and
superposition. Unification failure just skips the candidate; every surviving
conclusion carries a proof record with the unifier.

Superposition runs in both directions from the given clause: with the given clause
supplying the equation (partners retrieved from the into-index of the active set),
and with the given clause supplying the rewritten position (partners from the
from-index). The given clause is already active when generation runs, so
self-superposition pairs arrive through the indexes like any other partner.

*/

use std::cmp::Ordering;

use crate::core::{
  clause::Clause,
  literal::Literal,
  ordering::{literal_is_maximal, literal_is_strictly_maximal},
  proof::InferenceRule,
  saturation::{eligible_equation_sides, eligible_literal_sides, ProofState},
  substitution::{Renaming, Scope, Subst},
  term::{Term, TermKind},
  unify::{unify, unify_into},
};

use super::conclusion;

/// Is nothing selected in the clause, so eligibility is pure maximality?
fn selection_is_empty(clause: &Clause) -> bool {
  clause.selected().map_or(true, |selected| selected.is_empty())
}

/// From `C ∨ s ≉ t` with `σ = mgu(s, t)` derive `Cσ`.
pub(super) fn equality_resolution(state: &ProofState, given: &Clause) -> Vec<Clause> {
  let ord = state.ord();
  let mut conclusions = Vec::new();

  for index in given.eligible_indices(ord) {
    let Some(eq) = given.lits()[index].as_equation() else {
      continue;
    };
    if eq.is_positive() {
      continue;
    }
    let Ok(subst) = unify(eq.lhs(), Scope::GIVEN, eq.rhs(), Scope::GIVEN) else {
      continue;
    };

    let mut renaming = Renaming::new();
    let image: Vec<Literal> = given
      .lits()
      .iter()
      .map(|lit| lit.apply(&subst, &mut renaming, Scope::GIVEN))
      .collect();

    // The resolved literal must stay eligible under the unifier.
    if selection_is_empty(given) && !literal_is_maximal(ord, &image, index) {
      continue;
    }

    let lits: Vec<Literal> = image
      .into_iter()
      .enumerate()
      .filter(|(i, _)| *i != index)
      .map(|(_, lit)| lit)
      .collect();

    conclusions.push(conclusion(
      state,
      lits,
      &[(given, Scope::GIVEN)],
      &subst,
      InferenceRule::EqualityResolution,
    ));
  }
  conclusions
}

/// From `C ∨ s ≈ t ∨ u ≈ v` with `σ = mgu(s, u)` and `sσ ≥ tσ` derive
/// `(C ∨ t ≉ v ∨ u ≈ v)σ`.
pub(super) fn equality_factoring(state: &ProofState, given: &Clause) -> Vec<Clause> {
  let ord = state.ord();
  let mut conclusions = Vec::new();

  if !selection_is_empty(given) {
    return conclusions; // Factoring applies to positive literals only.
  }

  for max_index in given.eligible_indices(ord) {
    let Some(max_eq) = given.lits()[max_index].as_equation() else {
      continue;
    };
    if !max_eq.is_positive() {
      continue;
    }

    for other_index in 0..given.lits().len() {
      if other_index == max_index {
        continue;
      }
      let Some(other_eq) = given.lits()[other_index].as_equation() else {
        continue;
      };
      if !other_eq.is_positive() {
        continue;
      }

      let max_sides = [(max_eq.lhs(), max_eq.rhs()), (max_eq.rhs(), max_eq.lhs())];
      let other_sides = [(other_eq.lhs(), other_eq.rhs()), (other_eq.rhs(), other_eq.lhs())];

      for (s, t) in max_sides {
        for (u, v) in other_sides {
          let Ok(subst) = unify(s, Scope::GIVEN, u, Scope::GIVEN) else {
            continue;
          };
          let s_image = subst.apply_no_renaming(s, Scope::GIVEN);
          let t_image = subst.apply_no_renaming(t, Scope::GIVEN);
          if ord.compare(&s_image, &t_image) == Some(Ordering::Less) {
            continue;
          }

          let mut renaming = Renaming::new();
          let image: Vec<Literal> = given
            .lits()
            .iter()
            .map(|lit| lit.apply(&subst, &mut renaming, Scope::GIVEN))
            .collect();
          if !literal_is_maximal(ord, &image, max_index) {
            continue;
          }

          let mut lits: Vec<Literal> = image
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != max_index)
            .map(|(_, lit)| lit.clone())
            .collect();
          lits.push(Literal::equation_unchecked(
            subst.apply(&mut renaming, t, Scope::GIVEN),
            subst.apply(&mut renaming, v, Scope::GIVEN),
            false,
          ));

          conclusions.push(conclusion(
            state,
            lits,
            &[(given, Scope::GIVEN)],
            &subst,
            InferenceRule::EqualityFactoring,
          ));
        }
      }
    }
  }
  conclusions
}

/// Superposition between the given clause and the active set, both roles.
pub(super) fn superposition(state: &ProofState, given: &Clause) -> Vec<Clause> {
  let ord = state.ord();
  let mut conclusions = Vec::new();

  // Given supplies the equation l ≈ r; partners come from the into-index.
  for (from_index, lhs, rhs) in eligible_equation_sides(given, ord) {
    for (_, entry) in state.active.sup_into_unifiable(&lhs) {
      let candidate = superpose(
        state,
        given,
        from_index,
        &lhs,
        &rhs,
        Scope::GIVEN,
        &entry.clause,
        entry.lit_index,
        entry.in_lhs,
        &entry.position,
        &entry.subterm,
        Scope::PARTNER,
      );
      conclusions.extend(candidate);
    }
  }

  // Given supplies the rewritten position; equations come from the from-index.
  for (into_index, in_lhs, side) in eligible_literal_sides(given, ord) {
    for (subterm, position) in side.subterms_with_positions() {
      if subterm.is_var() {
        continue;
      }
      for (_, entry) in state.active.sup_from_unifiable(&subterm) {
        let candidate = superpose(
          state,
          &entry.clause,
          entry.lit_index,
          &entry.lhs,
          &entry.rhs,
          Scope::PARTNER,
          given,
          into_index,
          in_lhs,
          &position,
          &subterm,
          Scope::GIVEN,
        );
        conclusions.extend(candidate);
      }
    }
  }

  conclusions
}

/// One superposition instance: from `C ∨ l ≈ r` and `D[u]` with `σ = mgu(l, u)`,
/// derive `(C ∨ D[r])σ`, under the ordering and eligibility side conditions.
#[allow(clippy::too_many_arguments)]
fn superpose(
  state: &ProofState,
  from_clause: &Clause,
  from_index: usize,
  lhs: &Term,
  rhs: &Term,
  from_scope: Scope,
  into_clause: &Clause,
  into_index: usize,
  in_lhs: bool,
  position: &[u32],
  subterm: &Term,
  into_scope: Scope,
) -> Option<Clause> {
  let ord = state.ord();
  let subst = unify(lhs, from_scope, subterm, into_scope).ok()?;

  let mut renaming = Renaming::new();

  // The equation must not be rewritten the wrong way around.
  let lhs_image = subst.apply(&mut renaming, lhs, from_scope);
  let rhs_image = subst.apply(&mut renaming, rhs, from_scope);
  if ord.compare(&lhs_image, &rhs_image) == Some(Ordering::Less) {
    return None;
  }

  let from_image: Vec<Literal> = from_clause
    .lits()
    .iter()
    .map(|lit| lit.apply(&subst, &mut renaming, from_scope))
    .collect();
  if selection_is_empty(from_clause) && !literal_is_strictly_maximal(ord, &from_image, from_index) {
    return None;
  }

  let into_eq = into_clause.lits()[into_index].as_equation()?;
  let into_image: Vec<Literal> = into_clause
    .lits()
    .iter()
    .map(|lit| lit.apply(&subst, &mut renaming, into_scope))
    .collect();
  if selection_is_empty(into_clause) {
    let maximal_enough = if into_eq.is_positive() {
      literal_is_strictly_maximal(ord, &into_image, into_index)
    } else {
      literal_is_maximal(ord, &into_image, into_index)
    };
    if !maximal_enough {
      return None;
    }
  }

  // The rewritten side must stay maximal in its literal.
  let (side, other) = if in_lhs {
    (into_eq.lhs(), into_eq.rhs())
  } else {
    (into_eq.rhs(), into_eq.lhs())
  };
  let side_image = subst.apply(&mut renaming, side, into_scope);
  let other_image = subst.apply(&mut renaming, other, into_scope);
  if ord.compare(&side_image, &other_image) == Some(Ordering::Less) {
    return None;
  }

  let rewritten_side =
      apply_with_replacement(&subst, &mut renaming, side, into_scope, position, &rhs_image);
  let rewritten_lit = Literal::equation_unchecked(rewritten_side, other_image, into_eq.is_positive());

  let mut lits =
      Vec::with_capacity(from_image.len() + into_image.len() - 1);
  for (i, lit) in from_image.iter().enumerate() {
    if i != from_index {
      lits.push(lit.clone());
    }
  }
  for (i, lit) in into_image.iter().enumerate() {
    if i != into_index {
      lits.push(lit.clone());
    }
  }
  lits.push(rewritten_lit);

  Some(conclusion(
    state,
    lits,
    &[(from_clause, from_scope), (into_clause, into_scope)],
    &subst,
    InferenceRule::Superposition,
  ))
}

/// Applies the substitution to `term` while replacing the subterm at `position`
/// with `replacement`, which is already in the output namespace.
fn apply_with_replacement(
  subst: &Subst,
  renaming: &mut Renaming,
  term: &Term,
  scope: Scope,
  position: &[u32],
  replacement: &Term,
) -> Term {
  let Some((&step, rest)) = position.split_first() else {
    return replacement.clone();
  };
  let step = step as usize;
  match term.kind() {
    TermKind::App(head, args) => {
      if step == 0 {
        let new_head = apply_with_replacement(subst, renaming, head, scope, rest, replacement);
        let new_args = args.iter().map(|a| subst.apply(renaming, a, scope)).collect();
        Term::app(new_head, new_args)
      } else {
        let mut new_args = Vec::with_capacity(args.len());
        for (i, arg) in args.iter().enumerate() {
          if i == step - 1 {
            new_args.push(apply_with_replacement(subst, renaming, arg, scope, rest, replacement));
          } else {
            new_args.push(subst.apply(renaming, arg, scope));
          }
        }
        Term::app(subst.apply(renaming, head, scope), new_args)
      }
    }
    TermKind::Fun(arg_ty, body) => {
      debug_assert_eq!(step, 0, "abstraction has a single child");
      Term::fun(
        arg_ty.clone(),
        apply_with_replacement(subst, renaming, body, scope, rest, replacement),
      )
    }
    TermKind::Builtin(tag, args) => {
      let mut new_args = Vec::with_capacity(args.len());
      for (i, arg) in args.iter().enumerate() {
        if i == step {
          new_args.push(apply_with_replacement(subst, renaming, arg, scope, rest, replacement));
        } else {
          new_args.push(subst.apply(renaming, arg, scope));
        }
      }
      Term::builtin(*tag, new_args)
    }
    _ => {
      debug_assert!(false, "replacement position into a leaf term");
      subst.apply(renaming, term, scope)
    }
  }
}

/// Combined unifier of two literals of one clause, both side pairings. Used by
/// condensation, which lives with the simplifications but shares this machinery.
pub(crate) fn unify_literal_pair(a: &Literal, b: &Literal) -> Vec<Subst> {
  let (Some(eq_a), Some(eq_b)) = (a.as_equation(), b.as_equation()) else {
    return Vec::new();
  };
  if eq_a.is_positive() != eq_b.is_positive() {
    return Vec::new();
  }

  let mut unifiers = Vec::new();
  let pairings = [
    ((eq_a.lhs(), eq_a.rhs()), (eq_b.lhs(), eq_b.rhs())),
    ((eq_a.lhs(), eq_a.rhs()), (eq_b.rhs(), eq_b.lhs())),
  ];
  for ((al, ar), (bl, br)) in pairings {
    let mut subst = Subst::new();
    if unify_into(&mut subst, al, Scope::GIVEN, bl, Scope::GIVEN).is_ok()
        && unify_into(&mut subst, ar, Scope::GIVEN, br, Scope::GIVEN).is_ok()
    {
      unifiers.push(subst);
    }
  }
  unifiers
}
