/*!

Proof steps. Every clause carries a shared handle to the step that produced it:
either an axiom record naming its source, or an inference record naming the rule and
the parent clauses with the substitution used. The steps form a DAG whose leaves are
axioms; cycles are impossible because parents are strictly older than their
conclusions. The DAG is immutable after construction and survives the discarding of
its clauses, so a refutation can always be reconstructed.

*/

use std::sync::Arc;

use spire_abs::IString;

use crate::core::{
  clause::Clause,
  substitution::Scope,
  term::{Term, VarId},
};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum InferenceRule {
  Superposition,
  EqualityResolution,
  EqualityFactoring,
  Demodulation,
  PositiveSimplifyReflect,
  NegativeSimplifyReflect,
  ContextualLiteralCut,
  Condensation,
  DuplicateLiteralRemoval,
  /// Registered by an extension; the name is supplied at registration.
  Extension,
}

impl InferenceRule {
  pub fn as_str(&self) -> &'static str {
    match self {
      InferenceRule::Superposition           => "superposition",
      InferenceRule::EqualityResolution      => "equality_resolution",
      InferenceRule::EqualityFactoring       => "equality_factoring",
      InferenceRule::Demodulation            => "demodulation",
      InferenceRule::PositiveSimplifyReflect => "simplify_reflect_pos",
      InferenceRule::NegativeSimplifyReflect => "simplify_reflect_neg",
      InferenceRule::ContextualLiteralCut    => "contextual_literal_cut",
      InferenceRule::Condensation            => "condensation",
      InferenceRule::DuplicateLiteralRemoval => "duplicate_literal_removal",
      InferenceRule::Extension               => "extension",
    }
  }
}

/// A parent clause together with the bindings the inference instantiated it with.
pub struct ProofParent {
  pub clause: Clause,
  /// Fully-applied bindings of the parent's variables, recorded for proof output.
  pub bindings: Vec<((VarId, Scope), Term)>,
}

pub enum ProofStepData {
  Axiom {
    /// Name of the input formula, e.g. the `cnf(name, role, …)` name.
    source: IString,
  },
  Inference {
    rule   : InferenceRule,
    parents: Vec<ProofParent>,
  },
}

#[derive(Clone)]
pub struct ProofStep(Arc<ProofStepData>);

impl ProofStep {
  pub fn axiom<S: AsRef<str>>(source: S) -> ProofStep {
    ProofStep(Arc::new(ProofStepData::Axiom { source: IString::from(source.as_ref()) }))
  }

  pub fn inference(rule: InferenceRule, parents: Vec<ProofParent>) -> ProofStep {
    ProofStep(Arc::new(ProofStepData::Inference { rule, parents }))
  }

  #[inline(always)]
  pub fn data(&self) -> &ProofStepData {
    &self.0
  }

  pub fn is_axiom(&self) -> bool {
    matches!(*self.0, ProofStepData::Axiom { .. })
  }

  pub fn parents(&self) -> &[ProofParent] {
    match &*self.0 {
      ProofStepData::Axiom { .. } => &[],
      ProofStepData::Inference { parents, .. } => parents,
    }
  }
}

/// The derivation of `conclusion`: every clause its proof DAG reaches, topologically
/// ordered so parents precede conclusions. The conclusion is the final element.
pub fn derivation(conclusion: &Clause) -> Vec<Clause> {
  let mut ordered: Vec<Clause> = Vec::new();
  let mut visited: Vec<u32> = Vec::new();
  visit(conclusion, &mut visited, &mut ordered);
  ordered
}

fn visit(clause: &Clause, visited: &mut Vec<u32>, ordered: &mut Vec<Clause>) {
  if visited.contains(&clause.id()) {
    return;
  }
  visited.push(clause.id());
  for parent in clause.proof().parents() {
    visit(&parent.clause, visited, ordered);
  }
  ordered.push(clause.clone());
}
