/*!

Run configuration for the prover core. The front-end owns the command line; the core
only sees this struct.

*/

use std::time::Duration;

use crate::core::{
  ordering::{OrderingKind, PrecedenceKind},
  selection::SelectionPolicy,
};

/// Resource bounds checked at step boundaries of the saturation loop.
#[derive(Copy, Clone, Debug, Default)]
pub struct ResourceLimits {
  pub timeout      : Option<Duration>,
  pub max_steps    : Option<u64>,
  pub max_generated: Option<u64>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LimitKind {
  Time,
  Steps,
  Generated,
  Cancelled,
}

impl std::fmt::Display for LimitKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      LimitKind::Time      => write!(f, "time limit"),
      LimitKind::Steps     => write!(f, "step limit"),
      LimitKind::Generated => write!(f, "generated-clause limit"),
      LimitKind::Cancelled => write!(f, "cancelled"),
    }
  }
}

#[derive(Clone, Debug)]
pub struct ProverConfig {
  pub ordering  : OrderingKind,
  pub precedence: PrecedenceKind,
  pub selection : SelectionPolicy,

  // Simplification rule toggles
  pub enable_subsumption     : bool,
  pub enable_demodulation    : bool,
  pub enable_simplify_reflect: bool,
  pub enable_condensation    : bool,
  pub enable_literal_cutting : bool,

  /// Out of every `age + weight` picks from the passive queue, `age.0` go to the
  /// oldest clause and the rest to the lightest.
  pub age_weight_ratio: (u32, u32),

  pub limits: ResourceLimits,
}

impl Default for ProverConfig {
  fn default() -> Self {
    ProverConfig {
      ordering  : OrderingKind::default(),
      precedence: PrecedenceKind::default(),
      selection : SelectionPolicy::default(),

      enable_subsumption     : true,
      enable_demodulation    : true,
      enable_simplify_reflect: true,
      enable_condensation    : true,
      enable_literal_cutting : true,

      age_weight_ratio: (1, 5),

      limits: ResourceLimits::default(),
    }
  }
}
