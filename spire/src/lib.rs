/*!

Front-end of the spire prover: the CNF problem language parser, the lowering into
engine statements, and result/proof emission. The binary in `main.rs` is a thin
wrapper around `run_problem`.

*/

pub mod output;
pub mod parser;
pub mod problem;

pub use problem::{load_problem, ProblemError};

use spire_lib::core::{
  config::ProverConfig,
  saturation::{Saturation, SaturationResult, Statistics},
};

/// Parses, loads, and saturates a problem text under the given configuration.
pub fn run_problem(
  text: &str,
  config: ProverConfig,
) -> Result<(SaturationResult, Statistics), ProblemError> {
  let statements = load_problem(text)?;
  let mut saturation = Saturation::new(config);
  saturation.add_statements(statements)?;
  let result = saturation.run();
  let stats = saturation.state().stats.clone();
  Ok((result, stats))
}

#[cfg(test)]
mod tests {
  use spire_lib::core::saturation::SaturationResult;
  use super::*;

  #[test]
  fn a_problem_runs_end_to_end() {
    let text = r"
      cnf(fact,        axiom, fe_p(fe_a)).
      cnf(implication, axiom, ~fe_p(X) | fe_q(X)).
      cnf(goal,        negated_conjecture, ~fe_q(fe_a)).
    ";
    let (result, stats) = run_problem(text, ProverConfig::default()).unwrap();
    assert!(matches!(result, SaturationResult::Unsatisfiable(_)));
    assert!(stats.steps > 0);
  }

  #[test]
  fn a_satisfiable_problem_saturates() {
    let (result, _) = run_problem("cnf(fact, axiom, fe_r(fe_b)).", ProverConfig::default()).unwrap();
    assert!(matches!(result, SaturationResult::Saturated));
  }
}
