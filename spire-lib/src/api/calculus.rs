/*!

The `Calculus` trait: the five rule families the saturation loop drives, plus the
triviality/redundancy tests and a preprocessing pass. The loop never knows which
calculus it is running; the superposition calculus is just the default
implementation.

The function aliases below are the extension registration points: additional rules,
simplifications, one-shot conversion passes over the input clause set, and clause
add/remove event hooks.

*/

use crate::core::{
  clause::Clause,
  saturation::ProofState,
};

pub trait Calculus {
  fn name(&self) -> &'static str;

  /// One pass over the input clause set before saturation starts.
  fn preprocess(&self, state: &ProofState, clauses: Vec<Clause>) -> Vec<Clause>;

  /// Cheap, self-contained simplification of a single clause (duplicate and
  /// resolved-literal removal). `None` deletes the clause.
  fn simplify(&self, clause: &Clause) -> Option<Clause>;

  /// Simplification against the active simplification set (rewriting,
  /// simplify-reflect, condensation, literal cutting). One full pass; the loop
  /// iterates to fixpoint. `None` deletes the clause.
  fn active_simplify(&self, state: &ProofState, clause: &Clause) -> Option<Clause>;

  /// Uses the given clause to simplify the active set. Clauses it removes are
  /// dropped from the indexes; rewritten replacements are returned for requeueing.
  fn backward_simplify(&self, state: &mut ProofState, given: &Clause) -> Vec<Clause>;

  /// Single-premise generating inferences on the given clause.
  fn unary_rules(&self, state: &ProofState, given: &Clause) -> Vec<Clause>;

  /// Two-premise generating inferences between the given clause and the active set.
  fn binary_rules(&self, state: &ProofState, given: &Clause) -> Vec<Clause>;

  /// Tautology and similar content-free tests; trivial clauses are discarded.
  fn is_trivial(&self, clause: &Clause) -> bool;

  /// Redundancy against the active set (subsumption).
  fn is_redundant(&self, state: &ProofState, clause: &Clause) -> bool;
}

// Extension registration points (see `Saturation::register_*`).

pub type RuleFn        = Box<dyn FnMut(&ProofState, &Clause) -> Vec<Clause>>;
pub type SimplifyFn    = Box<dyn FnMut(&ProofState, &Clause) -> Option<Clause>>;
pub type ConversionFn  = Box<dyn FnMut(Vec<Clause>) -> Vec<Clause>>;
pub type ClauseEventFn = Box<dyn FnMut(&Clause)>;
pub type StepHookFn    = Box<dyn FnMut(&ProofState) -> Vec<Clause>>;
