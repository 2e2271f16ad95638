/*!

The given-clause saturation loop and its proof state.

`ProofState` is the triple (Active, Passive, simplification set — the latter lives
inside the active set's indexes) plus statistics and the found empty clauses.
`Saturation` drives the loop: pop a given clause, simplify it forward against the
active set, discard it if trivial or redundant, simplify the active set backward with
it, activate it, generate, enqueue. Resource limits and the cooperative cancellation
flag are checked at step boundaries only; within one step, backward simplification
completes before generation begins, and newly generated clauses never take part in
the current step's simplification.

*/

mod active;
mod passive;
mod stats;

pub use active::{ActiveSet, DemodEntry, SupFromEntry, SupIntoEntry};
pub use passive::PassiveSet;
pub use stats::Statistics;

pub(crate) use active::{demod_orientations, eligible_equation_sides, eligible_literal_sides};

use std::{
  cell::Cell,
  collections::HashMap,
  sync::{
    atomic::{AtomicBool, Ordering as AtomicOrdering},
    Arc,
  },
  time::Instant,
};

use spire_abs::log::{debug, info};

use crate::{
  api::{
    calculus::{Calculus, ClauseEventFn, ConversionFn, RuleFn, SimplifyFn, StepHookFn},
    statement::Statement,
    superposition::Superposition,
  },
  core::{
    clause::{Clause, ClauseId},
    config::{LimitKind, ProverConfig},
    format::{FormatStyle, Formattable},
    ordering::{make_ordering, Precedence, TermOrdering},
    symbol::SignatureClash,
    term::{Term, TermKind},
  },
};

#[derive(Clone)]
pub enum SaturationResult {
  /// An empty clause with an empty trail was derived; the clause carries the proof.
  Unsatisfiable(Clause),
  /// The passive set ran dry without a refutation.
  Saturated,
  /// A resource limit or cancellation ended the run.
  ResourceOut(LimitKind),
}

impl Formattable for SaturationResult {
  fn repr(&self, out: &mut dyn std::fmt::Write, _style: FormatStyle) -> std::fmt::Result {
    match self {
      SaturationResult::Unsatisfiable(_) => write!(out, "Unsatisfiable"),
      SaturationResult::Saturated => write!(out, "Saturated"),
      SaturationResult::ResourceOut(kind) => write!(out, "ResourceOut({})", kind),
    }
  }
}

crate::impl_display_debug_for_formattable!(SaturationResult);

/// The clause sets, the ordering, and the run configuration, shared with every rule.
pub struct ProofState {
  config: ProverConfig,
  ord   : Box<dyn TermOrdering>,

  pub active : ActiveSet,
  pub passive: PassiveSet,
  pub stats  : Statistics,

  pub empty_clauses: Vec<Clause>,

  /// Clauses removed from the active set since the last drain, for removal hooks.
  removal_log: Vec<Clause>,

  age: Cell<u32>,
}

impl ProofState {
  pub fn new(config: ProverConfig) -> ProofState {
    let ord = make_ordering(config.ordering, Precedence::by_id());
    let passive = PassiveSet::new(config.age_weight_ratio);
    ProofState {
      config,
      ord,
      active: ActiveSet::new(),
      passive,
      stats: Statistics::default(),
      empty_clauses: Vec::new(),
      removal_log: Vec::new(),
      age: Cell::new(0),
    }
  }

  #[inline(always)]
  pub fn config(&self) -> &ProverConfig {
    &self.config
  }

  #[inline(always)]
  pub fn ord(&self) -> &dyn TermOrdering {
    self.ord.as_ref()
  }

  /// Monotone generation counter; the passive queue's age key.
  pub fn next_age(&self) -> u32 {
    let age = self.age.get();
    self.age.set(age + 1);
    age
  }

  /// Rebuilds the ordering from the configured precedence generator and the symbol
  /// occurrences of the given clauses. Orientation caches of those clauses are
  /// dropped, since they may have been computed against the old ordering.
  pub fn install_ordering(&mut self, clauses: &[Clause]) {
    let mut occurrences: HashMap<u32, u32> = HashMap::new();
    for clause in clauses {
      for lit in clause.lits() {
        for term in lit.terms() {
          count_symbol_occurrences(&term, &mut occurrences);
        }
      }
    }
    let precedence = Precedence::from_occurrences(self.config.precedence, &occurrences);
    self.ord = make_ordering(self.config.ordering, precedence);

    for clause in clauses {
      for lit in clause.lits() {
        lit.invalidate_orientation();
      }
    }
  }

  /// Enqueues clauses into the passive set, catching empty clauses on the way.
  pub fn add_passive<I>(&mut self, clauses: I)
      where I: IntoIterator<Item = Clause>
  {
    for clause in clauses {
      if clause.is_refutation() {
        self.empty_clauses.push(clause);
        continue;
      }
      if clause.is_empty_clause() {
        // Empty under assumptions; without a splitting extension this is a dead end.
        debug!("discarding conditional empty clause {}", clause);
        continue;
      }
      if !self.passive.push(clause) {
        self.stats.duplicates_dropped += 1;
      }
    }
    self.stats.record_passive_size(self.passive.len());
  }

  /// Computes and caches the selection, then inserts into the active set.
  pub fn activate(&mut self, clause: &Clause) {
    let selected = self.config.selection.select(clause, self.ord.as_ref());
    clause.set_selected(selected);
    self.active.insert(clause.clone(), self.ord.as_ref());
    self.stats.activated += 1;
    let active_len = self.active.len();
    self.stats.record_active_size(active_len);
  }

  /// Removes a clause from the active set, logging it for removal hooks.
  pub fn remove_active(&mut self, id: ClauseId) -> Option<Clause> {
    let removed = self.active.remove(id, self.ord.as_ref())?;
    self.removal_log.push(removed.clone());
    Some(removed)
  }

  fn drain_removals(&mut self) -> Vec<Clause> {
    std::mem::take(&mut self.removal_log)
  }
}

fn count_symbol_occurrences(term: &Term, occurrences: &mut HashMap<u32, u32>) {
  if let TermKind::Const(symbol) = term.kind() {
    *occurrences.entry(symbol.index()).or_insert(0) += 1;
  }
  for child in term.children() {
    count_symbol_occurrences(&child, occurrences);
  }
}

/// The loop driver: owns the proof state, the calculus, and the extension hooks.
pub struct Saturation {
  state   : ProofState,
  calculus: Box<dyn Calculus>,
  input   : Vec<Clause>,
  cancel  : Arc<AtomicBool>,

  extra_binary         : Vec<RuleFn>,
  extra_unary          : Vec<RuleFn>,
  extra_simplifications: Vec<SimplifyFn>,
  conversion_passes    : Vec<ConversionFn>,
  on_added             : Vec<ClauseEventFn>,
  on_removed           : Vec<ClauseEventFn>,
  step_hooks           : Vec<StepHookFn>,
}

impl Saturation {
  pub fn new(config: ProverConfig) -> Saturation {
    Self::with_calculus(config, Box::new(Superposition::new()))
  }

  pub fn with_calculus(config: ProverConfig, calculus: Box<dyn Calculus>) -> Saturation {
    Saturation {
      state: ProofState::new(config),
      calculus,
      input: Vec::new(),
      cancel: Arc::new(AtomicBool::new(false)),
      extra_binary: Vec::new(),
      extra_unary: Vec::new(),
      extra_simplifications: Vec::new(),
      conversion_passes: Vec::new(),
      on_added: Vec::new(),
      on_removed: Vec::new(),
      step_hooks: Vec::new(),
    }
  }

  #[inline(always)]
  pub fn state(&self) -> &ProofState {
    &self.state
  }

  /// Shared flag for cooperative cancellation; set it from anywhere, the loop
  /// checks it at step boundaries.
  pub fn cancel_flag(&self) -> Arc<AtomicBool> {
    self.cancel.clone()
  }

  // region Input

  /// Consumes preprocessor statements: type declarations grow the signature, asserts
  /// become input clauses.
  pub fn add_statements(&mut self, statements: Vec<Statement>) -> Result<(), SignatureClash> {
    for statement in statements {
      match statement {
        Statement::TypeDecl(name, ty) => {
          crate::core::symbol::Symbol::with_type(&*name, ty)?;
        }
        Statement::Assert(input) => {
          let clause = input.into_clause(self.state.next_age());
          self.input.push(clause);
        }
      }
    }
    Ok(())
  }

  /// Adds already-built clauses to the initial passive set.
  pub fn add_passive(&mut self, clauses: Vec<Clause>) {
    self.input.extend(clauses);
  }

  // endregion Input

  // region Extension registration

  pub fn register_binary_rule(&mut self, rule: RuleFn) {
    self.extra_binary.push(rule);
  }

  pub fn register_unary_rule(&mut self, rule: RuleFn) {
    self.extra_unary.push(rule);
  }

  pub fn register_simplification(&mut self, rule: SimplifyFn) {
    self.extra_simplifications.push(rule);
  }

  /// A pass applied once to the input clause set, before saturation.
  pub fn register_conversion_pass(&mut self, pass: ConversionFn) {
    self.conversion_passes.push(pass);
  }

  pub fn on_clause_added(&mut self, hook: ClauseEventFn) {
    self.on_added.push(hook);
  }

  pub fn on_clause_removed(&mut self, hook: ClauseEventFn) {
    self.on_removed.push(hook);
  }

  /// Runs at the end of every step; produced clauses are enqueued.
  pub fn register_step_hook(&mut self, hook: StepHookFn) {
    self.step_hooks.push(hook);
  }

  // endregion Extension registration

  pub fn run(&mut self) -> SaturationResult {
    let started = Instant::now();

    // Ordering, conversion passes, calculus preprocessing, initial passive set.
    let mut input = std::mem::take(&mut self.input);
    self.state.install_ordering(&input);
    for pass in &mut self.conversion_passes {
      input = pass(input);
    }
    let input = self.calculus.preprocess(&self.state, input);
    info!("saturation start: {} input clauses", input.len());
    self.state.add_passive(input);

    loop {
      if let Some(empty) = self.state.empty_clauses.first() {
        return SaturationResult::Unsatisfiable(empty.clone());
      }
      if let Some(limit) = self.limit_reached(&started) {
        info!("saturation stopped: {}", limit);
        return SaturationResult::ResourceOut(limit);
      }

      let Some(given) = self.state.passive.pop() else {
        info!("saturation complete after {} steps", self.state.stats.steps);
        return SaturationResult::Saturated;
      };
      self.state.stats.steps += 1;

      // Forward simplification against the active sets, to fixpoint.
      let Some(given) = self.forward_simplify(given) else {
        continue;
      };

      if self.calculus.is_trivial(&given) {
        self.state.stats.trivial_discarded += 1;
        continue;
      }
      if self.calculus.is_redundant(&self.state, &given) {
        self.state.stats.subsumed_forward += 1;
        continue;
      }
      if given.is_refutation() {
        return SaturationResult::Unsatisfiable(given);
      }
      if given.is_empty_clause() {
        continue; // Empty under assumptions; nothing to do with it here.
      }

      debug!("given #{}: {}", given.id(), given);

      // Backward simplification completes before generation begins.
      let requeued = self.calculus.backward_simplify(&mut self.state, &given);
      for removed in self.state.drain_removals() {
        for hook in &mut self.on_removed {
          hook(&removed);
        }
      }
      self.state.add_passive(requeued);

      self.state.activate(&given);
      for hook in &mut self.on_added {
        hook(&given);
      }

      // Generation.
      let mut conclusions = self.calculus.binary_rules(&self.state, &given);
      conclusions.extend(self.calculus.unary_rules(&self.state, &given));
      for rule in &mut self.extra_binary {
        conclusions.extend(rule(&self.state, &given));
      }
      for rule in &mut self.extra_unary {
        conclusions.extend(rule(&self.state, &given));
      }
      self.state.stats.generated += conclusions.len() as u64;

      // Cheap simplification of the conclusions before they enter the queue.
      let mut accepted = Vec::with_capacity(conclusions.len());
      for conclusion in conclusions {
        if let Some(simplified) = self.calculus.simplify(&conclusion) {
          if !self.calculus.is_trivial(&simplified) {
            accepted.push(simplified);
          }
        }
      }
      self.state.add_passive(accepted);

      // Registered extension rules run at the step boundary.
      let mut hook_clauses = Vec::new();
      for hook in &mut self.step_hooks {
        hook_clauses.extend(hook(&self.state));
      }
      self.state.add_passive(hook_clauses);
    }
  }

  fn forward_simplify(&mut self, given: Clause) -> Option<Clause> {
    let mut current = self.calculus.simplify(&given)?;
    loop {
      let mut changed = false;

      if let Some(simplified) = self.calculus.active_simplify(&self.state, &current) {
        if simplified != current {
          self.state.stats.simplified_forward += 1;
          current = self.calculus.simplify(&simplified)?;
          changed = true;
        }
      } else {
        return None;
      }

      for rule in &mut self.extra_simplifications {
        match rule(&self.state, &current) {
          Some(simplified) => {
            if simplified != current {
              current = simplified;
              changed = true;
            }
          }
          None => return None,
        }
      }

      if !changed {
        return Some(current);
      }
    }
  }

  fn limit_reached(&self, started: &Instant) -> Option<LimitKind> {
    if self.cancel.load(AtomicOrdering::Relaxed) {
      return Some(LimitKind::Cancelled);
    }
    let limits = &self.state.config.limits;
    if let Some(timeout) = limits.timeout {
      if started.elapsed() >= timeout {
        return Some(LimitKind::Time);
      }
    }
    if let Some(max_steps) = limits.max_steps {
      if self.state.stats.steps >= max_steps {
        return Some(LimitKind::Steps);
      }
    }
    if let Some(max_generated) = limits.max_generated {
      if self.state.stats.generated >= max_generated {
        return Some(LimitKind::Generated);
      }
    }
    None
  }
}
