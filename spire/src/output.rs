/*!

Result and proof emission. These are read-only consumers of the proof DAG: the
status line follows the SZS vocabulary, and the proof listing is a numbered,
topologically ordered derivation where every step names its rule, its parents, and
the bindings recorded for each parent.

*/

use std::collections::HashMap;
use std::fmt::Write;

use spire_abs::join_string;
use spire_lib::core::{
  clause::Clause,
  config::LimitKind,
  proof::{derivation, ProofStepData},
  saturation::SaturationResult,
};

/// The status word reported for a result, SZS-style.
pub fn status_word(result: &SaturationResult) -> &'static str {
  match result {
    SaturationResult::Unsatisfiable(_) => "Theorem",
    SaturationResult::Saturated => "CounterSatisfiable",
    SaturationResult::ResourceOut(LimitKind::Cancelled) => "Unknown",
    SaturationResult::ResourceOut(_) => "ResourceOut",
  }
}

/// The process exit code for a result: 0 theorem, 1 counter-satisfiable, 2 unknown.
pub fn exit_code(result: &SaturationResult) -> i32 {
  match result {
    SaturationResult::Unsatisfiable(_) => 0,
    SaturationResult::Saturated => 1,
    SaturationResult::ResourceOut(_) => 2,
  }
}

/// Renders the derivation of the empty clause as a numbered listing.
pub fn render_proof(empty: &Clause) -> String {
  let steps = derivation(empty);
  let mut numbers: HashMap<u32, usize> = HashMap::new();
  for (index, clause) in steps.iter().enumerate() {
    numbers.insert(clause.id(), index + 1);
  }

  let mut out = String::new();
  for (index, clause) in steps.iter().enumerate() {
    let provenance = match clause.proof().data() {
      ProofStepData::Axiom { source } => format!("input({})", source),
      ProofStepData::Inference { rule, parents } => {
        let rendered: Vec<String> = parents
          .iter()
          .map(|parent| {
            let number = numbers.get(&parent.clause.id()).copied().unwrap_or(0);
            if parent.bindings.is_empty() {
              format!("{}", number)
            } else {
              let bindings = join_string(
                parent
                  .bindings
                  .iter()
                  .map(|((var, _), term)| format!("X{} := {}", var, term)),
                ", ",
              );
              format!("{} {{{}}}", number, bindings)
            }
          })
          .collect();
        format!("{}({})", rule.as_str(), join_string(rendered, ", "))
      }
    };
    let _ = writeln!(out, "{:>4}. {}  [{}]", index + 1, clause, provenance);
  }
  out
}

#[cfg(test)]
mod tests {
  use spire_lib::core::{
    clause::ClauseAttributes,
    literal::Literal,
    proof::{InferenceRule, ProofParent, ProofStep},
    symbol::Symbol,
    term::Term,
    trail::Trail,
    types::Type,
  };
  use super::*;

  #[test]
  fn proof_listing_is_topologically_numbered() {
    let a = Term::constant(Symbol::with_type("out_test_a", Type::individual()).unwrap());
    let axiom = Clause::new(
      vec![Literal::equation(a.clone(), a, false).unwrap()],
      Trail::empty(),
      ProofStep::axiom("reflexivity"),
      0,
      ClauseAttributes::default(),
    );
    let empty = Clause::new(
      vec![],
      Trail::empty(),
      ProofStep::inference(
        InferenceRule::EqualityResolution,
        vec![ProofParent { clause: axiom.clone(), bindings: Vec::new() }],
      ),
      1,
      ClauseAttributes::default(),
    );

    let listing = render_proof(&empty);
    let lines: Vec<&str> = listing.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("input(reflexivity)"));
    assert!(lines[1].contains("equality_resolution(1)"));
    assert!(lines[1].contains("⊥"));
  }
}
