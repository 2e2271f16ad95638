/*!

The lexicographic path ordering. All symbols have lexicographic status. Slower than
KBO on deep terms but orders some rewrite systems KBO cannot, e.g. distributivity the
right way around.

*/

use std::cmp::Ordering;

use crate::core::{
  ordering::{compare_heads, head_of, ordered_children, Precedence, TermOrdering},
  term::Term,
};

pub struct Lpo {
  precedence: Precedence,
}

impl Lpo {
  pub fn new(precedence: Precedence) -> Lpo {
    Lpo { precedence }
  }

  fn greater(&self, s: &Term, t: &Term) -> bool {
    if s == t {
      return false;
    }
    // A term is above exactly the variables it properly contains.
    if t.is_var() {
      return !s.is_var() && s.free_vars().is_superset(t.free_vars());
    }
    if s.is_var() {
      return false;
    }

    let children_s = ordered_children(s);

    // Case 1: some argument of s is ≥ t.
    if children_s.iter().any(|child| child == t || self.greater(child, t)) {
      return true;
    }

    let (Some(head_s), Some(head_t)) = (head_of(s), head_of(t)) else {
      return false;
    };
    let children_t = ordered_children(t);

    match compare_heads(&self.precedence, &head_s, &head_t) {
      // Case 2: bigger head, and s dominates every argument of t.
      Ordering::Greater => children_t.iter().all(|child| self.greater(s, child)),
      // Case 3: equal heads, lexicographic on the arguments.
      Ordering::Equal => {
        for (index, (child_s, child_t)) in children_s.iter().zip(children_t.iter()).enumerate() {
          if child_s == child_t {
            continue;
          }
          return self.greater(child_s, child_t)
            && children_t[index + 1..].iter().all(|child| self.greater(s, child));
        }
        // Equal prefix: a longer argument list wins.
        children_s.len() > children_t.len()
      }
      Ordering::Less => false,
    }
  }
}

impl TermOrdering for Lpo {
  fn name(&self) -> &'static str {
    "lpo"
  }

  fn compare(&self, s: &Term, t: &Term) -> Option<Ordering> {
    if s == t {
      Some(Ordering::Equal)
    } else if self.greater(s, t) {
      Some(Ordering::Greater)
    } else if self.greater(t, s) {
      Some(Ordering::Less)
    } else {
      None
    }
  }
}
