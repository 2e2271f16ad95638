/*!

We need a version of `std::cmp::Ordering` that also has an `Incomparable` variant,
because a simplification ordering is only a partial order on non-ground terms. The
representation is `Option<Ordering>` with `None` read as incomparable.

Also lives here: the Dershowitz-Manna multiset extension of a partial order, which is
how the literal and clause orderings are derived from the term ordering.

*/
use std::cmp::Ordering;

#[allow(non_snake_case)]
pub mod PartialOrdering {
  #![allow(non_upper_case_globals)]

  use std::cmp::Ordering;

  pub const Greater     : Option<Ordering> = Some(Ordering::Greater);
  pub const Less        : Option<Ordering> = Some(Ordering::Less);
  pub const Equal       : Option<Ordering> = Some(Ordering::Equal);
  pub const Incomparable: Option<Ordering> = None;

  pub fn from_sign<T>(value: T) -> Option<Ordering>
      where T: Into<isize>
  {
    let value = value.into();
    if value > 0 {
      Greater
    } else if value < 0 {
      Less
    } else {
      Equal
    }
  }

  #[inline(always)]
  pub fn from(ordering: Ordering) -> Option<Ordering> {
    Some(ordering)
  }

  #[inline(always)]
  pub fn reverse(ordering: Option<Ordering>) -> Option<Ordering> {
    ordering.map(Ordering::reverse)
  }
}

#[inline(always)]
pub fn ordering_from_sign<T>(value: T) -> Ordering
    where T: Into<isize>
{
  let value: isize = value.into();

  if value > 0 {
    Ordering::Greater
  } else if value < 0 {
    Ordering::Less
  } else {
    Ordering::Equal
  }
}

/// The multiset extension of a partial order.
///
/// `xs > ys` iff after cancelling equal elements pairwise, every remaining element of
/// `ys` is dominated by some remaining element of `xs`. The extension of a partial
/// order is again a partial order, and it is total on multisets of elements on which
/// the base order is total.
pub fn multiset_compare<T, F>(xs: &[T], ys: &[T], compare: F) -> Option<Ordering>
    where F: Fn(&T, &T) -> Option<Ordering>
{
  let mut xs_remaining: Vec<&T> = xs.iter().collect();
  let mut ys_remaining: Vec<&T> = ys.iter().collect();

  // Cancel equal elements pairwise.
  let mut i = 0;
  while i < xs_remaining.len() {
    let mut cancelled = false;
    for j in 0..ys_remaining.len() {
      if compare(xs_remaining[i], ys_remaining[j]) == PartialOrdering::Equal {
        xs_remaining.swap_remove(i);
        ys_remaining.swap_remove(j);
        cancelled = true;
        break;
      }
    }
    if !cancelled {
      i += 1;
    }
  }

  if xs_remaining.is_empty() && ys_remaining.is_empty() {
    return PartialOrdering::Equal;
  }

  let dominates_all = |candidates: &[&T], targets: &[&T]| {
    targets.iter().all(|t| {
      candidates
        .iter()
        .any(|c| compare(c, t) == PartialOrdering::Greater)
    })
  };

  if !xs_remaining.is_empty() && dominates_all(&xs_remaining, &ys_remaining) {
    PartialOrdering::Greater
  } else if !ys_remaining.is_empty()
      && xs_remaining
        .iter()
        .all(|x| ys_remaining.iter().any(|y| compare(x, y) == PartialOrdering::Less))
  {
    PartialOrdering::Less
  } else {
    PartialOrdering::Incomparable
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn total(a: &u32, b: &u32) -> Option<Ordering> {
    Some(a.cmp(b))
  }

  #[test]
  fn multiset_extension_is_total_on_naturals() {
    assert_eq!(multiset_compare(&[3, 1], &[2, 2], total), PartialOrdering::Greater);
    assert_eq!(multiset_compare(&[1, 2], &[2, 1], total), PartialOrdering::Equal);
    assert_eq!(multiset_compare(&[1, 1], &[1, 1, 1], total), PartialOrdering::Less);
  }

  #[test]
  fn multiset_extension_respects_incomparability() {
    // 1 and 2 incomparable, everything else by magnitude.
    let partial = |a: &u32, b: &u32| -> Option<Ordering> {
      if (*a, *b) == (1, 2) || (*a, *b) == (2, 1) {
        None
      } else {
        Some(a.cmp(b))
      }
    };
    assert_eq!(multiset_compare(&[1], &[2], partial), PartialOrdering::Incomparable);
    assert_eq!(multiset_compare(&[3, 1], &[1, 1], partial), PartialOrdering::Greater);
  }
}
