/*!

A `Trail` is the set of boolean assumptions under which a clause is asserted; the
empty trail means the clause holds unconditionally. The core treats assumption
identifiers as opaque: inferences union the trails of their premises, and only a
clause with an empty trail counts as a refutation. Populating trails is the business
of splitting extensions.

*/

use spire_abs::{join_string, SmallVec};

use crate::core::format::{FormatStyle, Formattable};
use crate::impl_display_debug_for_formattable;

#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Trail {
  /// Sorted, deduplicated assumption identifiers.
  assumptions: SmallVec<[u32; 2]>,
}

impl Trail {
  #[inline(always)]
  pub fn empty() -> Self {
    Self::default()
  }

  pub fn from_assumptions(mut assumptions: Vec<u32>) -> Self {
    assumptions.sort_unstable();
    assumptions.dedup();
    Trail { assumptions: SmallVec::from_vec(assumptions) }
  }

  #[inline(always)]
  pub fn is_empty(&self) -> bool {
    self.assumptions.is_empty()
  }

  #[inline(always)]
  pub fn len(&self) -> usize {
    self.assumptions.len()
  }

  pub fn union(&self, other: &Trail) -> Trail {
    if other.is_empty() {
      return self.clone();
    }
    if self.is_empty() {
      return other.clone();
    }
    let mut merged: Vec<u32> = self.assumptions.iter().chain(other.assumptions.iter()).copied().collect();
    merged.sort_unstable();
    merged.dedup();
    Trail { assumptions: SmallVec::from_vec(merged) }
  }

  /// Subset test; a clause can only subsume clauses that assume at least as much.
  pub fn is_subset_of(&self, other: &Trail) -> bool {
    self.assumptions.iter().all(|a| other.assumptions.binary_search(a).is_ok())
  }

  pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
    self.assumptions.iter().copied()
  }
}

impl Formattable for Trail {
  fn repr(&self, out: &mut dyn std::fmt::Write, _style: FormatStyle) -> std::fmt::Result {
    if self.is_empty() {
      return Ok(());
    }
    write!(out, " ← [{}]", join_string(self.assumptions.iter(), ", "))
  }
}

impl_display_debug_for_formattable!(Trail);

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn union_sorts_and_dedups() {
    let a = Trail::from_assumptions(vec![3, 1]);
    let b = Trail::from_assumptions(vec![2, 3]);
    let u = a.union(&b);
    assert_eq!(u.iter().collect::<Vec<_>>(), vec![1, 2, 3]);
    assert!(a.is_subset_of(&u));
    assert!(Trail::empty().is_subset_of(&a));
    assert!(!u.is_subset_of(&a));
  }
}
