/*!

A `NatSet` is a set of small natural numbers backed by a bit vector. It is used for
free-variable sets, selected-literal sets, and locked-variable sets, where membership
queries and unions dominate and the universe is small.

*/

use std::{
  fmt::{Debug, Formatter},
  hash::{Hash, Hasher},
};

use bit_set::BitSet;

#[derive(Clone, Default, PartialEq, Eq)]
pub struct NatSet {
  elements: BitSet,
}

impl NatSet {
  #[inline(always)]
  pub fn new() -> Self {
    Self::default()
  }

  pub fn singleton(element: usize) -> Self {
    let mut set = Self::default();
    set.insert(element);
    set
  }

  #[inline(always)]
  pub fn insert(&mut self, element: usize) -> bool {
    self.elements.insert(element)
  }

  #[inline(always)]
  pub fn remove(&mut self, element: usize) -> bool {
    self.elements.remove(element)
  }

  #[inline(always)]
  pub fn contains(&self, element: usize) -> bool {
    self.elements.contains(element)
  }

  #[inline(always)]
  pub fn len(&self) -> usize {
    self.elements.len()
  }

  #[inline(always)]
  pub fn is_empty(&self) -> bool {
    self.elements.is_empty()
  }

  #[inline(always)]
  pub fn clear(&mut self) {
    self.elements.clear()
  }

  #[inline(always)]
  pub fn union_in_place(&mut self, other: &NatSet) {
    self.elements.union_with(&other.elements)
  }

  #[inline(always)]
  pub fn intersect_in_place(&mut self, other: &NatSet) {
    self.elements.intersect_with(&other.elements)
  }

  #[inline(always)]
  pub fn is_superset(&self, other: &NatSet) -> bool {
    self.elements.is_superset(&other.elements)
  }

  #[inline(always)]
  pub fn is_disjoint(&self, other: &NatSet) -> bool {
    self.elements.is_disjoint(&other.elements)
  }

  #[inline(always)]
  pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
    self.elements.iter()
  }

  pub fn min_value(&self) -> Option<usize> {
    self.elements.iter().next()
  }

  pub fn max_value(&self) -> Option<usize> {
    self.elements.iter().last()
  }
}

impl FromIterator<usize> for NatSet {
  fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
    let mut set = NatSet::default();
    for element in iter {
      set.insert(element);
    }
    set
  }
}

impl Hash for NatSet {
  fn hash<H: Hasher>(&self, state: &mut H) {
    for element in self.elements.iter() {
      state.write_usize(element);
    }
  }
}

impl Debug for NatSet {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_set().entries(self.elements.iter()).finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn union_and_superset() {
    let mut a = NatSet::from_iter([1, 3, 5]);
    let b = NatSet::from_iter([3, 7]);

    a.union_in_place(&b);

    assert!(a.is_superset(&b));
    assert!(a.contains(7));
    assert_eq!(a.len(), 4);
  }

  #[test]
  fn min_and_max() {
    let set = NatSet::from_iter([9, 2, 4]);
    assert_eq!(set.min_value(), Some(2));
    assert_eq!(set.max_value(), Some(9));
    assert_eq!(NatSet::new().min_value(), None);
  }
}
