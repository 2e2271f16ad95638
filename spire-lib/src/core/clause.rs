/*!

Clauses: multisets of literals with a trail, a proof step, and a selection record.

The literal order in the representation is immaterial semantically but fixed
canonically: literals are sorted by a renaming-invariant skeleton key, the variables
are renamed to `X0, X1, …` in traversal order, and the result is sorted once more by
the full syntactic order. Two clauses that are equal as literal multisets up to
renaming then get the same stored form (and the same content hash), which is what
duplicate elimination keys on.

*/

use std::{
  cell::RefCell,
  cmp::Ordering,
  collections::HashMap,
  hash::{Hash, Hasher},
  sync::{
    atomic::{AtomicU32, Ordering as AtomicOrdering},
    Arc,
  },
};

use enumflags2::{bitflags, BitFlags};
use spire_abs::{
  hash::{combine_all, HashType},
  join_string,
  NatSet,
};

use crate::core::{
  format::{FormatStyle, Formattable},
  literal::Literal,
  ordering::{literal_is_maximal, TermOrdering},
  proof::ProofStep,
  term::{Term, VarId},
  trail::Trail,
};
use crate::impl_display_debug_for_formattable;

pub type ClauseId = u32;

#[bitflags]
#[repr(u8)]
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ClauseAttribute {
  /// Came straight from the input problem.
  Input,
  /// Descends from the negated conjecture.
  FromConjecture,
}

pub type ClauseAttributes = BitFlags<ClauseAttribute>;

pub struct ClauseData {
  id        : ClauseId,
  lits      : Vec<Literal>,
  trail     : Trail,
  proof     : ProofStep,
  age       : u32,
  attributes: ClauseAttributes,
  /// Free variables; contiguous `0..n` after canonical renaming.
  vars: NatSet,
  /// Content hash over (canonical literals, trail).
  content_hash: HashType,
  /// Literal indices picked by the selection function; `None` until computed.
  selected: RefCell<Option<NatSet>>,
}

#[derive(Clone)]
pub struct Clause(Arc<ClauseData>);

static CLAUSE_COUNT: AtomicU32 = AtomicU32::new(0);

impl Clause {
  /// Builds a clause in canonical form. `age` is the generation counter value at
  /// creation time; the passive queue's fairness rests on it being monotone.
  pub fn new(
    lits: Vec<Literal>,
    trail: Trail,
    proof: ProofStep,
    age: u32,
    attributes: ClauseAttributes,
  ) -> Clause {
    let lits = canonicalize(lits);

    let mut vars = NatSet::new();
    for lit in &lits {
      vars.union_in_place(&lit.free_vars());
    }

    let content_hash = combine_all(
      40,
      lits
        .iter()
        .map(|l| l.hash_value())
        .chain(trail.iter().map(|a| a.wrapping_add(0x9E37_79B9))),
    );

    let id = CLAUSE_COUNT.fetch_add(1, AtomicOrdering::Relaxed);
    Clause(Arc::new(ClauseData {
      id,
      lits,
      trail,
      proof,
      age,
      attributes,
      vars,
      content_hash,
      selected: RefCell::new(None),
    }))
  }

  // region Accessors

  #[inline(always)]
  pub fn id(&self) -> ClauseId {
    self.0.id
  }

  #[inline(always)]
  pub fn lits(&self) -> &[Literal] {
    &self.0.lits
  }

  #[inline(always)]
  pub fn len(&self) -> usize {
    self.0.lits.len()
  }

  #[inline(always)]
  pub fn trail(&self) -> &Trail {
    &self.0.trail
  }

  #[inline(always)]
  pub fn proof(&self) -> &ProofStep {
    &self.0.proof
  }

  #[inline(always)]
  pub fn age(&self) -> u32 {
    self.0.age
  }

  #[inline(always)]
  pub fn attributes(&self) -> ClauseAttributes {
    self.0.attributes
  }

  #[inline(always)]
  pub fn vars(&self) -> &NatSet {
    &self.0.vars
  }

  #[inline(always)]
  pub fn is_ground(&self) -> bool {
    self.0.vars.is_empty()
  }

  /// No literals left. With an empty trail this is the refutation.
  #[inline(always)]
  pub fn is_empty_clause(&self) -> bool {
    self.0.lits.is_empty()
  }

  #[inline(always)]
  pub fn is_refutation(&self) -> bool {
    self.0.lits.is_empty() && self.0.trail.is_empty()
  }

  #[inline(always)]
  pub fn is_unit(&self) -> bool {
    self.0.lits.len() == 1
  }

  /// The unit positive equation view, the shape the simplification set stores.
  pub fn as_unit_positive_equation(&self) -> Option<&crate::core::literal::EqLiteral> {
    if !self.is_unit() {
      return None;
    }
    let eq = self.0.lits[0].as_equation()?;
    if eq.is_positive() {
      Some(eq)
    } else {
      None
    }
  }

  pub fn as_unit_negative_equation(&self) -> Option<&crate::core::literal::EqLiteral> {
    if !self.is_unit() {
      return None;
    }
    let eq = self.0.lits[0].as_equation()?;
    if eq.is_positive() {
      None
    } else {
      Some(eq)
    }
  }

  /// Symbol-count weight, the passive queue's default heuristic component.
  pub fn weight(&self) -> u32 {
    self.0.lits.iter().map(|l| l.weight()).sum()
  }

  #[inline(always)]
  pub fn content_hash(&self) -> HashType {
    self.0.content_hash
  }

  // endregion Accessors

  // region Selection and eligibility

  pub fn set_selected(&self, selected: NatSet) {
    *self.0.selected.borrow_mut() = Some(selected);
  }

  pub fn selected(&self) -> Option<NatSet> {
    self.0.selected.borrow().clone()
  }

  /// Literal indices on which generating inferences are allowed: the selected
  /// literals when the selection is non-empty, the maximal literals otherwise.
  pub fn eligible_indices(&self, ord: &dyn TermOrdering) -> Vec<usize> {
    if let Some(selected) = self.selected() {
      if !selected.is_empty() {
        return selected.iter().collect();
      }
    }
    (0..self.0.lits.len())
      .filter(|&index| literal_is_maximal(ord, &self.0.lits, index))
      .collect()
  }

  pub fn is_eligible(&self, ord: &dyn TermOrdering, index: usize) -> bool {
    if let Some(selected) = self.selected() {
      if !selected.is_empty() {
        return selected.contains(index);
      }
    }
    literal_is_maximal(ord, &self.0.lits, index)
  }

  // endregion Selection and eligibility
}

/// Sort by a renaming-invariant key, rename variables in traversal order, sort again
/// syntactically.
fn canonicalize(mut lits: Vec<Literal>) -> Vec<Literal> {
  lits.sort_by(|a, b| skeleton_key(a).cmp(&skeleton_key(b)));

  let mut renaming: HashMap<VarId, VarId> = HashMap::new();
  let mut next: VarId = 0;
  for lit in &lits {
    for term in lit.terms() {
      assign_renaming(&term, &mut renaming, &mut next);
    }
  }

  let mut renamed: Vec<Literal> = lits
    .iter()
    .map(|lit| lit.map_vars(&mut |var, ty| Term::var(renaming[&var], ty.clone())))
    .collect();

  renamed.sort_by(literal_syntactic_cmp);
  renamed
}

fn skeleton_key(lit: &Literal) -> (bool, HashType, u32) {
  match lit {
    Literal::Equation(eq) => (
      lit.is_positive(),
      combine_all(41, [eq.lhs().skeleton_hash(), eq.rhs().skeleton_hash()]),
      eq.lhs().size() + eq.rhs().size(),
    ),
    Literal::True => (true, 0, 0),
    Literal::False => (false, 0, 0),
  }
}

fn assign_renaming(term: &Term, renaming: &mut HashMap<VarId, VarId>, next: &mut VarId) {
  if term.is_ground() {
    return;
  }
  if let Some(var) = term.as_var() {
    renaming.entry(var).or_insert_with(|| {
      let fresh = *next;
      *next += 1;
      fresh
    });
    return;
  }
  for child in term.children() {
    assign_renaming(&child, renaming, next);
  }
}

fn literal_syntactic_cmp(a: &Literal, b: &Literal) -> Ordering {
  match (a, b) {
    (Literal::Equation(ea), Literal::Equation(eb)) => a
      .is_positive()
      .cmp(&b.is_positive())
      .then_with(|| ea.lhs().syntactic_cmp(eb.lhs()))
      .then_with(|| ea.rhs().syntactic_cmp(eb.rhs())),
    (Literal::Equation(_), _) => Ordering::Greater,
    (_, Literal::Equation(_)) => Ordering::Less,
    (Literal::True, Literal::True) | (Literal::False, Literal::False) => Ordering::Equal,
    (Literal::True, Literal::False) => Ordering::Greater,
    (Literal::False, Literal::True) => Ordering::Less,
  }
}

impl PartialEq for Clause {
  /// Content equality: same canonical literal sequence and trail.
  fn eq(&self, other: &Self) -> bool {
    self.0.content_hash == other.0.content_hash
      && self.0.lits == other.0.lits
      && self.0.trail == other.0.trail
  }
}

impl Eq for Clause {}

impl Hash for Clause {
  fn hash<H: Hasher>(&self, state: &mut H) {
    state.write_u32(self.0.content_hash)
  }
}

impl Formattable for Clause {
  fn repr(&self, out: &mut dyn std::fmt::Write, style: FormatStyle) -> std::fmt::Result {
    if self.0.lits.is_empty() {
      write!(out, "⊥")?;
    } else {
      write!(
        out,
        "{}",
        join_string(self.0.lits.iter().map(|l| format!("{}", l)), " ∨ ")
      )?;
    }
    self.0.trail.repr(out, FormatStyle::Default)?;
    if style == FormatStyle::Debug {
      write!(out, "  [#{} age {}]", self.0.id, self.0.age)?;
    }
    Ok(())
  }
}

impl_display_debug_for_formattable!(Clause);

#[cfg(test)]
mod tests {
  use crate::core::{symbol::Symbol, types::Type};
  use super::*;

  fn pred(name: &str, arg: Term) -> Literal {
    let ty = Type::arrow(vec![Type::individual()], Type::boolean());
    let p = Term::constant(Symbol::with_type(name, ty).unwrap());
    Literal::predicate(Term::app(p, vec![arg]), true).unwrap()
  }

  fn new_clause(lits: Vec<Literal>) -> Clause {
    Clause::new(lits, Trail::empty(), ProofStep::axiom("test"), 0, ClauseAttributes::default())
  }

  #[test]
  fn renamed_variants_get_identical_stored_form() {
    let c1 = new_clause(vec![
      pred("clause_test_p", Term::var(3, Type::individual())),
      pred("clause_test_q", Term::var(8, Type::individual())),
    ]);
    let c2 = new_clause(vec![
      pred("clause_test_q", Term::var(0, Type::individual())),
      pred("clause_test_p", Term::var(5, Type::individual())),
    ]);

    assert_eq!(c1, c2);
    assert_eq!(c1.content_hash(), c2.content_hash());
    assert_ne!(c1.id(), c2.id());
    // Variables are renamed contiguously from zero.
    assert_eq!(c1.vars().iter().collect::<Vec<_>>(), vec![0, 1]);
  }

  #[test]
  fn empty_clause_is_the_refutation() {
    let empty = new_clause(vec![]);
    assert!(empty.is_empty_clause());
    assert!(empty.is_refutation());
    assert_eq!(format!("{}", empty), "⊥");

    let conditional = Clause::new(
      vec![],
      Trail::from_assumptions(vec![1]),
      ProofStep::axiom("test"),
      0,
      ClauseAttributes::default(),
    );
    assert!(conditional.is_empty_clause());
    assert!(!conditional.is_refutation());
  }

  #[test]
  fn unit_views() {
    let a = Term::constant(Symbol::with_type("clause_test_a", Type::individual()).unwrap());
    let b = Term::constant(Symbol::with_type("clause_test_b", Type::individual()).unwrap());

    let pos = new_clause(vec![Literal::equation(a.clone(), b.clone(), true).unwrap()]);
    assert!(pos.as_unit_positive_equation().is_some());
    assert!(pos.as_unit_negative_equation().is_none());

    let neg = new_clause(vec![Literal::equation(a, b, false).unwrap()]);
    assert!(neg.as_unit_positive_equation().is_none());
    assert!(neg.as_unit_negative_equation().is_some());
  }
}
