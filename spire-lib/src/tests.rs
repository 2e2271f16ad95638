/*!

End-to-end saturation scenarios driven through the public API, from reflexivity up to
a small group-theory refutation.

*/

use crate::{
  api::{ClauseRole, InputClause, Statement},
  core::{
    clause::Clause,
    config::{ProverConfig, ResourceLimits},
    literal::Literal,
    proof::derivation,
    saturation::{Saturation, SaturationResult},
    symbol::Symbol,
    term::Term,
    types::Type,
  },
};
use spire_abs::IString;

fn individual_fn(name: &str, arity: usize) -> Term {
  let iota = Type::individual();
  Term::constant(Symbol::with_type(name, Type::arrow(vec![iota.clone(); arity], iota)).unwrap())
}

fn pred(name: &str, args: Vec<Term>) -> Term {
  let iota = Type::individual();
  let ty = Type::arrow(vec![iota; args.len()], Type::boolean());
  Term::app(Term::constant(Symbol::with_type(name, ty).unwrap()), args)
}

fn assert_clause(name: &str, role: ClauseRole, lits: Vec<Literal>) -> Statement {
  Statement::Assert(InputClause { name: IString::from(name), role, lits })
}

fn bounded_config(max_steps: u64) -> ProverConfig {
  ProverConfig {
    limits: ResourceLimits { max_steps: Some(max_steps), ..Default::default() },
    ..Default::default()
  }
}

fn run(statements: Vec<Statement>, max_steps: u64) -> SaturationResult {
  let mut saturation = Saturation::new(bounded_config(max_steps));
  saturation.add_statements(statements).unwrap();
  saturation.run()
}

#[test]
fn reflexivity_is_refuted_immediately() {
  let a = individual_fn("e2e1_a", 0);
  let result = run(
    vec![assert_clause(
      "goal",
      ClauseRole::NegatedConjecture,
      vec![Literal::equation(a.clone(), a, false).unwrap()],
    )],
    10,
  );
  assert!(matches!(result, SaturationResult::Unsatisfiable(_)));
}

#[test]
fn modus_ponens_via_superposition() {
  let iota = Type::individual();
  let a = individual_fn("e2e2_a", 0);
  let x = Term::var(0, iota);

  let statements = vec![
    assert_clause(
      "fact",
      ClauseRole::Axiom,
      vec![Literal::predicate(pred("e2e2_p", vec![a.clone()]), true).unwrap()],
    ),
    assert_clause(
      "implication",
      ClauseRole::Axiom,
      vec![
        Literal::predicate(pred("e2e2_p", vec![x.clone()]), false).unwrap(),
        Literal::predicate(pred("e2e2_q", vec![x]), true).unwrap(),
      ],
    ),
    assert_clause(
      "goal",
      ClauseRole::NegatedConjecture,
      vec![Literal::predicate(pred("e2e2_q", vec![a]), false).unwrap()],
    ),
  ];

  let empty = match run(statements, 200) {
    SaturationResult::Unsatisfiable(empty) => empty,
    other => panic!("expected a refutation, got {}", other),
  };

  // The derivation reaches back to the axioms.
  let steps = derivation(&empty);
  assert!(steps.len() >= 3);
  assert!(steps.last().unwrap().is_refutation());
}

#[test]
fn group_inverse_involution() {
  let iota = Type::individual();
  let mult = individual_fn("e2e3_mult", 2);
  let inv = individual_fn("e2e3_inv", 1);
  let e = individual_fn("e2e3_e", 0);
  let a = individual_fn("e2e3_a", 0);
  let x = Term::var(0, iota.clone());
  let y = Term::var(1, iota.clone());
  let z = Term::var(2, iota);

  let m = |s: &Term, t: &Term| Term::app(mult.clone(), vec![s.clone(), t.clone()]);
  let i = |s: &Term| Term::app(inv.clone(), vec![s.clone()]);

  let statements = vec![
    // e·x = x
    assert_clause(
      "left_identity",
      ClauseRole::Axiom,
      vec![Literal::equation(m(&e, &x), x.clone(), true).unwrap()],
    ),
    // x⁻¹·x = e
    assert_clause(
      "left_inverse",
      ClauseRole::Axiom,
      vec![Literal::equation(m(&i(&x), &x), e.clone(), true).unwrap()],
    ),
    // (x·y)·z = x·(y·z)
    assert_clause(
      "associativity",
      ClauseRole::Axiom,
      vec![Literal::equation(m(&m(&x, &y), &z), m(&x, &m(&y, &z)), true).unwrap()],
    ),
    // ¬((a⁻¹)⁻¹ = a)
    assert_clause(
      "goal",
      ClauseRole::NegatedConjecture,
      vec![Literal::equation(i(&i(&a)), a.clone(), false).unwrap()],
    ),
  ];

  let result = run(statements, 20_000);
  assert!(
    matches!(result, SaturationResult::Unsatisfiable(_)),
    "group refutation not found: {}",
    result
  );
}

#[test]
fn asserted_equalities_close_under_congruence() {
  let a = individual_fn("e2e10_a", 0);
  let b = individual_fn("e2e10_b", 0);
  let c = individual_fn("e2e10_c", 0);
  let f = individual_fn("e2e10_f", 1);

  // a = b, b = c ⟹ f(a) = f(c).
  let statements = vec![
    assert_clause("ab", ClauseRole::Axiom, vec![Literal::equation(a.clone(), b.clone(), true).unwrap()]),
    assert_clause("bc", ClauseRole::Axiom, vec![Literal::equation(b, c.clone(), true).unwrap()]),
    assert_clause(
      "goal",
      ClauseRole::NegatedConjecture,
      vec![Literal::equation(
        Term::app(f.clone(), vec![a]),
        Term::app(f, vec![c]),
        false,
      )
      .unwrap()],
    ),
  ];

  let result = run(statements, 1_000);
  assert!(matches!(result, SaturationResult::Unsatisfiable(_)));
}

#[test]
fn single_fact_saturates() {
  let a = individual_fn("e2e4_a", 0);
  let result = run(
    vec![assert_clause(
      "fact",
      ClauseRole::Axiom,
      vec![Literal::predicate(pred("e2e4_p", vec![a]), true).unwrap()],
    )],
    100,
  );
  assert!(matches!(result, SaturationResult::Saturated));
}

#[test]
fn demodulation_closes_the_rewritten_goal() {
  let f = individual_fn("e2e5_f", 1);
  let a = individual_fn("e2e5_a", 0);
  let b = individual_fn("e2e5_b", 0);
  let fa = Term::app(f, vec![a]);

  // f(a) = b, p(f(a)), ¬p(b): demodulation turns p(f(a)) into p(b).
  let statements = vec![
    assert_clause(
      "rewrite",
      ClauseRole::Axiom,
      vec![Literal::equation(fa.clone(), b.clone(), true).unwrap()],
    ),
    assert_clause(
      "fact",
      ClauseRole::Axiom,
      vec![Literal::predicate(pred("e2e5_p", vec![fa]), true).unwrap()],
    ),
    assert_clause(
      "goal",
      ClauseRole::NegatedConjecture,
      vec![Literal::predicate(pred("e2e5_p", vec![b]), false).unwrap()],
    ),
  ];

  let result = run(statements, 500);
  assert!(matches!(result, SaturationResult::Unsatisfiable(_)));
}

#[test]
fn subsumed_clauses_are_dropped() {
  let iota = Type::individual();
  let x = Term::var(0, iota);
  let a = individual_fn("e2e6_a", 0);
  let b = individual_fn("e2e6_b", 0);

  // p(X) ∨ q(X) subsumes its padded instance p(a) ∨ q(a) ∨ r(b), which is discarded
  // when popped and never activated.
  let statements = vec![
    assert_clause(
      "general",
      ClauseRole::Axiom,
      vec![
        Literal::predicate(pred("e2e6_p", vec![x.clone()]), true).unwrap(),
        Literal::predicate(pred("e2e6_q", vec![x]), true).unwrap(),
      ],
    ),
    assert_clause(
      "instance",
      ClauseRole::Axiom,
      vec![
        Literal::predicate(pred("e2e6_p", vec![a.clone()]), true).unwrap(),
        Literal::predicate(pred("e2e6_q", vec![a]), true).unwrap(),
        Literal::predicate(pred("e2e6_r", vec![b]), true).unwrap(),
      ],
    ),
  ];

  let mut saturation = Saturation::new(bounded_config(100));
  saturation.add_statements(statements).unwrap();
  let result = saturation.run();

  assert!(matches!(result, SaturationResult::Saturated));
  assert_eq!(saturation.state().stats.subsumed_forward, 1);
  assert_eq!(saturation.state().active.len(), 1);
}

#[test]
fn limits_end_the_run_cooperatively() {
  let iota = Type::individual();
  let f = individual_fn("e2e7_f", 1);
  let a = individual_fn("e2e7_a", 0);
  let x = Term::var(0, iota);

  // f(X) = X gives unbounded superposition fodder; the step limit must kick in.
  let statements = vec![
    assert_clause(
      "diverge",
      ClauseRole::Axiom,
      vec![Literal::equation(Term::app(f.clone(), vec![x.clone()]), x, true).unwrap()],
    ),
    assert_clause(
      "seed",
      ClauseRole::Axiom,
      vec![Literal::predicate(pred("e2e7_p", vec![Term::app(f, vec![a])]), true).unwrap()],
    ),
  ];

  let result = run(statements, 1);
  assert!(matches!(
    result,
    SaturationResult::ResourceOut(_) | SaturationResult::Saturated
  ));
}

#[test]
fn cancellation_flag_stops_the_loop() {
  let a = individual_fn("e2e8_a", 0);
  let mut saturation = Saturation::new(ProverConfig::default());
  saturation
    .add_statements(vec![assert_clause(
      "fact",
      ClauseRole::Axiom,
      vec![Literal::predicate(pred("e2e8_p", vec![a]), true).unwrap()],
    )])
    .unwrap();

  saturation.cancel_flag().store(true, std::sync::atomic::Ordering::Relaxed);
  let result = saturation.run();
  assert!(matches!(result, SaturationResult::ResourceOut(_)));
}

#[test]
fn extension_rules_participate_in_generation() {
  let a = individual_fn("e2e9_a", 0);
  let goal_atom = pred("e2e9_q", vec![a.clone()]);

  // A registered unary rule that derives q(a) from p(a); the goal ¬q(a) then closes.
  let mut saturation = Saturation::new(bounded_config(100));
  saturation
    .add_statements(vec![
      assert_clause(
        "fact",
        ClauseRole::Axiom,
        vec![Literal::predicate(pred("e2e9_p", vec![a.clone()]), true).unwrap()],
      ),
      assert_clause(
        "goal",
        ClauseRole::NegatedConjecture,
        vec![Literal::predicate(goal_atom.clone(), false).unwrap()],
      ),
    ])
    .unwrap();

  let p_atom = pred("e2e9_p", vec![a]);
  saturation.register_unary_rule(Box::new(move |state, given| {
    let is_fact = given.len() == 1
      && given.lits()[0]
        .as_equation()
        .map(|eq| eq.lhs() == &p_atom && eq.is_positive())
        .unwrap_or(false);
    if !is_fact {
      return Vec::new();
    }
    vec![Clause::new(
      vec![Literal::predicate(goal_atom.clone(), true).unwrap()],
      given.trail().clone(),
      crate::core::proof::ProofStep::inference(
        crate::core::proof::InferenceRule::Extension,
        vec![crate::core::proof::ProofParent { clause: given.clone(), bindings: Vec::new() }],
      ),
      state.next_age(),
      Default::default(),
    )]
  }));

  let result = saturation.run();
  assert!(matches!(result, SaturationResult::Unsatisfiable(_)));
}
