/*!

The superposition calculus.

Generating rules: superposition (both directions through the active-set indexes),
equality resolution, and equality factoring, each guarded by the ordering and
selection side conditions. Simplification rules: demodulation, positive and negative
simplify-reflect, condensation, contextual literal cutting, subsumption, duplicate
literal removal, and tautology deletion.

*/

mod generate;
mod simplify;

use crate::{
  api::calculus::Calculus,
  core::{
    clause::{Clause, ClauseAttribute, ClauseAttributes},
    literal::Literal,
    proof::{InferenceRule, ProofParent, ProofStep},
    saturation::ProofState,
    substitution::{Scope, Subst},
    term::{Term, VarId},
    trail::Trail,
  },
};

pub struct Superposition;

impl Superposition {
  pub fn new() -> Superposition {
    Superposition
  }
}

impl Default for Superposition {
  fn default() -> Self {
    Superposition::new()
  }
}

impl Calculus for Superposition {
  fn name(&self) -> &'static str {
    "superposition"
  }

  fn preprocess(&self, _state: &ProofState, clauses: Vec<Clause>) -> Vec<Clause> {
    clauses
      .iter()
      .filter_map(|clause| simplify::basic_simplify(clause))
      .filter(|clause| !simplify::is_tautology(clause))
      .collect()
  }

  fn simplify(&self, clause: &Clause) -> Option<Clause> {
    simplify::basic_simplify(clause)
  }

  fn active_simplify(&self, state: &ProofState, clause: &Clause) -> Option<Clause> {
    let config = state.config();

    if config.enable_demodulation {
      if let Some(rewritten) = simplify::demodulate(state, clause) {
        return Some(rewritten);
      }
    }
    if config.enable_simplify_reflect {
      if let Some(reduced) = simplify::simplify_reflect(state, clause) {
        return Some(reduced);
      }
    }
    if config.enable_condensation {
      if let Some(condensed) = simplify::condense(clause) {
        return Some(condensed);
      }
    }
    if config.enable_literal_cutting {
      if let Some(cut) = simplify::contextual_literal_cut(state, clause) {
        return Some(cut);
      }
    }
    Some(clause.clone())
  }

  fn backward_simplify(&self, state: &mut ProofState, given: &Clause) -> Vec<Clause> {
    simplify::backward_simplify(state, given)
  }

  fn unary_rules(&self, state: &ProofState, given: &Clause) -> Vec<Clause> {
    let mut conclusions = generate::equality_resolution(state, given);
    conclusions.extend(generate::equality_factoring(state, given));
    conclusions
  }

  fn binary_rules(&self, state: &ProofState, given: &Clause) -> Vec<Clause> {
    generate::superposition(state, given)
  }

  fn is_trivial(&self, clause: &Clause) -> bool {
    simplify::is_tautology(clause)
  }

  fn is_redundant(&self, state: &ProofState, clause: &Clause) -> bool {
    state.config().enable_subsumption && simplify::forward_subsumed(state, clause)
  }
}

/// Builds an inference conclusion: trail union, proof record with per-parent
/// bindings, attribute inheritance, fresh age.
pub(super) fn conclusion(
  state: &ProofState,
  lits: Vec<Literal>,
  parents: &[(&Clause, Scope)],
  subst: &Subst,
  rule: InferenceRule,
) -> Clause {
  let mut trail = Trail::empty();
  let mut attributes = ClauseAttributes::default();
  let mut proof_parents = Vec::with_capacity(parents.len());

  for (parent, scope) in parents {
    trail = trail.union(parent.trail());
    if parent.attributes().contains(ClauseAttribute::FromConjecture) {
      attributes |= ClauseAttribute::FromConjecture;
    }
    proof_parents.push(ProofParent {
      clause: (*parent).clone(),
      bindings: bindings_for(subst, *scope),
    });
  }

  Clause::new(
    lits,
    trail,
    ProofStep::inference(rule, proof_parents),
    state.next_age(),
    attributes,
  )
}

/// The fully-applied bindings of one scope, for the proof record.
fn bindings_for(subst: &Subst, scope: Scope) -> Vec<((VarId, Scope), Term)> {
  subst
    .snapshot()
    .into_iter()
    .filter(|((_, var_scope), _)| *var_scope == scope)
    .collect()
}

/// A simplification conclusion: same age as the clause it replaces, so the queue
/// position is preserved.
pub(super) fn simplified_clause(
  original: &Clause,
  lits: Vec<Literal>,
  premises: Vec<Clause>,
  rule: InferenceRule,
) -> Clause {
  let mut trail = original.trail().clone();
  let mut proof_parents = vec![ProofParent { clause: original.clone(), bindings: Vec::new() }];
  for premise in premises {
    trail = trail.union(premise.trail());
    proof_parents.push(ProofParent { clause: premise, bindings: Vec::new() });
  }
  Clause::new(
    lits,
    trail,
    ProofStep::inference(rule, proof_parents),
    original.age(),
    original.attributes() & ClauseAttribute::FromConjecture,
  )
}

#[cfg(test)]
mod tests {
  use crate::core::{
    clause::ClauseAttributes,
    config::ProverConfig,
    literal::Literal,
    proof::ProofStep,
    saturation::ProofState,
    symbol::Symbol,
    term::Term,
    trail::Trail,
    types::Type,
  };
  use super::*;

  fn individual_fn(name: &str, arity: usize) -> Term {
    let iota = Type::individual();
    Term::constant(
      Symbol::with_type(name, Type::arrow(vec![iota.clone(); arity], iota)).unwrap(),
    )
  }

  fn pred(name: &str, args: Vec<Term>) -> Term {
    let iota = Type::individual();
    let ty = Type::arrow(vec![iota; args.len()], Type::boolean());
    Term::app(Term::constant(Symbol::with_type(name, ty).unwrap()), args)
  }

  fn unit(lit: Literal) -> Clause {
    Clause::new(vec![lit], Trail::empty(), ProofStep::axiom("test"), 0, ClauseAttributes::default())
  }

  fn state_with_active(clauses: Vec<Clause>) -> ProofState {
    let mut state = ProofState::new(ProverConfig::default());
    for clause in &clauses {
      state.activate(clause);
    }
    state
  }

  #[test]
  fn demodulation_rewrites_with_an_oriented_unit() {
    let f = individual_fn("sup_test_f", 1);
    let a = individual_fn("sup_test_a", 0);
    let b = individual_fn("sup_test_b", 0);
    let fa = Term::app(f, vec![a]);

    // Active: f(a) ≈ b. Clause: p(f(a)). Expect p(b).
    let rule = unit(Literal::equation(fa.clone(), b.clone(), true).unwrap());
    let state = state_with_active(vec![rule]);

    let target = unit(Literal::predicate(pred("sup_test_p", vec![fa]), true).unwrap());
    let rewritten = simplify::demodulate(&state, &target).expect("reducible");

    let expected_atom = pred("sup_test_p", vec![b]);
    let eq = rewritten.lits()[0].as_equation().unwrap();
    assert_eq!(eq.lhs(), &expected_atom);
  }

  #[test]
  fn forward_subsumption_discards_instances() {
    let x = Term::var(0, Type::individual());
    let a = individual_fn("sup_test_c", 0);
    let b = individual_fn("sup_test_d", 0);

    // Active: p(X). Candidate: p(a) ∨ q(b) — subsumed.
    let general = unit(Literal::predicate(pred("sup_test_q", vec![x]), true).unwrap());
    let state = state_with_active(vec![general]);

    let candidate = Clause::new(
      vec![
        Literal::predicate(pred("sup_test_q", vec![a]), true).unwrap(),
        Literal::predicate(pred("sup_test_r", vec![b]), true).unwrap(),
      ],
      Trail::empty(),
      ProofStep::axiom("test"),
      1,
      ClauseAttributes::default(),
    );

    assert!(simplify::forward_subsumed(&state, &candidate));
  }

  #[test]
  fn subsumption_respects_multiset_semantics() {
    let x = Term::var(0, Type::individual());
    let y = Term::var(1, Type::individual());
    let a = individual_fn("sup_test_e", 0);

    // p(X) ∨ p(Y) does not subsume p(a): two literals cannot embed into one.
    let double = Clause::new(
      vec![
        Literal::predicate(pred("sup_test_s", vec![x]), true).unwrap(),
        Literal::predicate(pred("sup_test_s", vec![y]), true).unwrap(),
      ],
      Trail::empty(),
      ProofStep::axiom("test"),
      0,
      ClauseAttributes::default(),
    );
    let single = unit(Literal::predicate(pred("sup_test_s", vec![a]), true).unwrap());

    assert!(!simplify::subsumes(&double, &single));
    assert!(simplify::subsumes(&single, &single));
  }

  #[test]
  fn positive_simplify_reflect_removes_refuted_disequations() {
    let f = individual_fn("sup_test_g", 1);
    let x = Term::var(0, Type::individual());
    let a = individual_fn("sup_test_h", 0);
    let fx = Term::app(f.clone(), vec![x]);
    let fa = Term::app(f, vec![a.clone()]);

    // Active: f(X) ≈ X (oriented). Clause: f(a) ≉ a ∨ p(a). The disequation is an
    // instance of the unit and is cut.
    let unit_eq = unit(Literal::equation(fx, Term::var(0, Type::individual()), true).unwrap());
    let state = state_with_active(vec![unit_eq]);

    let clause = Clause::new(
      vec![
        Literal::equation(fa, a.clone(), false).unwrap(),
        Literal::predicate(pred("sup_test_t", vec![a]), true).unwrap(),
      ],
      Trail::empty(),
      ProofStep::axiom("test"),
      1,
      ClauseAttributes::default(),
    );

    let reduced = simplify::simplify_reflect(&state, &clause).expect("reducible");
    assert_eq!(reduced.len(), 1);
    assert!(reduced.lits()[0].as_equation().unwrap().is_predicate());
  }

  #[test]
  fn tautologies_are_detected() {
    let a = individual_fn("sup_test_k", 0);
    let atom = pred("sup_test_u", vec![a.clone()]);

    let clause = Clause::new(
      vec![
        Literal::predicate(atom.clone(), true).unwrap(),
        Literal::predicate(atom, false).unwrap(),
      ],
      Trail::empty(),
      ProofStep::axiom("test"),
      0,
      ClauseAttributes::default(),
    );
    assert!(simplify::is_tautology(&clause));

    let reflexive = unit(Literal::equation(a.clone(), a, true).unwrap());
    assert!(simplify::is_tautology(&reflexive));
  }

  #[test]
  fn condensation_collapses_unifiable_duplicates() {
    let x = Term::var(0, Type::individual());
    let a = individual_fn("sup_test_m", 0);

    // p(X) ∨ p(a) condenses to p(a).
    let clause = Clause::new(
      vec![
        Literal::predicate(pred("sup_test_v", vec![x]), true).unwrap(),
        Literal::predicate(pred("sup_test_v", vec![a]), true).unwrap(),
      ],
      Trail::empty(),
      ProofStep::axiom("test"),
      0,
      ClauseAttributes::default(),
    );

    let condensed = simplify::condense(&clause).expect("condensable");
    assert_eq!(condensed.len(), 1);
  }

  #[test]
  fn equality_resolution_solves_selected_disequations() {
    let x = Term::var(0, Type::individual());
    let a = individual_fn("sup_test_n", 0);
    let state = ProofState::new(ProverConfig::default());

    // X ≉ a ∨ p(X), with the disequation selected, resolves to p(a).
    let clause = Clause::new(
      vec![
        Literal::equation(x.clone(), a.clone(), false).unwrap(),
        Literal::predicate(pred("sup_test_w", vec![x]), true).unwrap(),
      ],
      Trail::empty(),
      ProofStep::axiom("test"),
      0,
      ClauseAttributes::default(),
    );
    // The canonical literal order puts the negative literal first.
    assert!(clause.lits()[0].is_negative());
    clause.set_selected(spire_abs::NatSet::singleton(0));

    let conclusions = generate::equality_resolution(&state, &clause);
    assert_eq!(conclusions.len(), 1);
    assert_eq!(conclusions[0].len(), 1);
    let eq = conclusions[0].lits()[0].as_equation().unwrap();
    assert_eq!(eq.lhs(), &pred("sup_test_w", vec![a]));
  }

  #[test]
  fn superposition_between_units_produces_the_rewritten_goal() {
    let f = individual_fn("sup_test_o", 1);
    let a = individual_fn("sup_test_p2", 0);
    let b = individual_fn("sup_test_q2", 0);
    let fa = Term::app(f, vec![a]);

    // Active: f(a) ≈ b. Given: p(f(a)). Expect p(b) among conclusions.
    let mut state = ProofState::new(ProverConfig::default());
    let rule = unit(Literal::equation(fa.clone(), b.clone(), true).unwrap());
    state.activate(&rule);

    let given = unit(Literal::predicate(pred("sup_test_x", vec![fa]), true).unwrap());
    state.activate(&given);

    let conclusions = generate::superposition(&state, &given);
    let expected = pred("sup_test_x", vec![b]);
    assert!(
      conclusions.iter().any(|c| {
        c.len() == 1
          && c.lits()[0]
            .as_equation()
            .map(|eq| eq.lhs() == &expected)
            .unwrap_or(false)
      }),
      "no conclusion rewrites the argument: {:?}",
      conclusions.iter().map(|c| format!("{}", c)).collect::<Vec<_>>()
    );
  }
}
