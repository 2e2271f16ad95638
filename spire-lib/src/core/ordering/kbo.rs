/*!

The Knuth-Bendix ordering with unit symbol and variable weights, so a term's weight
is its cached size and the weight test costs nothing. With unit weights the
admissibility conditions hold for every precedence.

*/

use std::cmp::Ordering;

use crate::core::{
  ordering::{compare_heads, head_of, ordered_children, Precedence, TermOrdering},
  term::Term,
};

pub struct Kbo {
  precedence: Precedence,
}

impl Kbo {
  pub fn new(precedence: Precedence) -> Kbo {
    Kbo { precedence }
  }

  /// `s` covers `t` when every variable occurs in `s` at least as often as in `t`,
  /// the variable condition for `s > t`.
  fn covers(s: &Term, t: &Term) -> bool {
    if t.is_ground() {
      return true;
    }
    if !s.free_vars().is_superset(t.free_vars()) {
      return false;
    }
    let s_counts = s.var_occurrences();
    let t_counts = t.var_occurrences();
    t_counts
      .iter()
      .all(|(var, count)| s_counts.get(var).copied().unwrap_or(0) >= *count)
  }

  fn compare_rec(&self, s: &Term, t: &Term) -> Option<Ordering> {
    if s == t {
      return Some(Ordering::Equal);
    }

    // Variable cases: a variable is below exactly the terms it properly occurs in.
    if s.is_var() {
      return if t.free_vars().is_superset(s.free_vars()) {
        Some(Ordering::Less)
      } else {
        None
      };
    }
    if t.is_var() {
      return if s.free_vars().is_superset(t.free_vars()) {
        Some(Ordering::Greater)
      } else {
        None
      };
    }

    let s_covers = Self::covers(s, t);
    let t_covers = Self::covers(t, s);

    match s.size().cmp(&t.size()) {
      Ordering::Greater => return if s_covers { Some(Ordering::Greater) } else { None },
      Ordering::Less => return if t_covers { Some(Ordering::Less) } else { None },
      Ordering::Equal => {}
    }

    // Equal weights: decide by precedence on the heads, then lexicographically.
    let (Some(head_s), Some(head_t)) = (head_of(s), head_of(t)) else {
      return None;
    };
    match compare_heads(&self.precedence, &head_s, &head_t) {
      Ordering::Greater => return if s_covers { Some(Ordering::Greater) } else { None },
      Ordering::Less => return if t_covers { Some(Ordering::Less) } else { None },
      Ordering::Equal => {}
    }

    let children_s = ordered_children(s);
    let children_t = ordered_children(t);
    for (child_s, child_t) in children_s.iter().zip(children_t.iter()) {
      match self.compare_rec(child_s, child_t) {
        Some(Ordering::Equal) => continue,
        Some(Ordering::Greater) => return if s_covers { Some(Ordering::Greater) } else { None },
        Some(Ordering::Less) => return if t_covers { Some(Ordering::Less) } else { None },
        None => return None,
      }
    }

    // Equal prefix; a longer spine wins.
    match children_s.len().cmp(&children_t.len()) {
      Ordering::Greater => if s_covers { Some(Ordering::Greater) } else { None },
      Ordering::Less => if t_covers { Some(Ordering::Less) } else { None },
      Ordering::Equal => Some(Ordering::Equal),
    }
  }
}

impl TermOrdering for Kbo {
  fn name(&self) -> &'static str {
    "kbo"
  }

  fn compare(&self, s: &Term, t: &Term) -> Option<Ordering> {
    self.compare_rec(s, t)
  }
}

#[cfg(test)]
mod tests {
  use crate::core::{
    substitution::{Scope, Subst},
    symbol::Symbol,
    types::Type,
  };
  use super::*;

  fn sym(name: &str, arity: usize) -> Term {
    let iota = Type::individual();
    Term::constant(Symbol::with_type(name, Type::arrow(vec![iota.clone(); arity], iota)).unwrap())
  }

  fn kbo() -> Kbo {
    Kbo::new(Precedence::by_id())
  }

  #[test]
  fn subterm_property() {
    let f = sym("kbo_test_f", 2);
    let a = sym("kbo_test_a", 0);
    let x = Term::var(0, Type::individual());
    let term = Term::app(f, vec![a.clone(), x.clone()]);

    assert_eq!(kbo().compare(&term, &a), Some(Ordering::Greater));
    assert_eq!(kbo().compare(&term, &x), Some(Ordering::Greater));
    assert_eq!(kbo().compare(&x, &term), Some(Ordering::Less));
  }

  #[test]
  fn ground_comparison_is_total() {
    let a = sym("kbo_test_b", 0);
    let c = sym("kbo_test_c", 0);
    let result = kbo().compare(&a, &c);
    assert!(matches!(result, Some(Ordering::Less) | Some(Ordering::Greater)));
    assert_eq!(kbo().compare(&a, &a), Some(Ordering::Equal));
  }

  #[test]
  fn distinct_variables_are_incomparable() {
    let x = Term::var(0, Type::individual());
    let y = Term::var(1, Type::individual());
    assert_eq!(kbo().compare(&x, &y), None);
  }

  #[test]
  fn variable_condition_blocks_comparison() {
    // f(X0) vs g(X1): neither side covers the other's variable.
    let f = sym("kbo_test_g", 1);
    let g = sym("kbo_test_h", 1);
    let fx = Term::app(f, vec![Term::var(0, Type::individual())]);
    let gy = Term::app(g, vec![Term::var(1, Type::individual())]);
    assert_eq!(kbo().compare(&fx, &gy), None);
  }

  #[test]
  fn stability_under_substitution() {
    let f = sym("kbo_test_k", 2);
    let a = sym("kbo_test_d", 0);
    let x = Term::var(0, Type::individual());

    // f(X0, X0) > f(X0, a) fails (incomparable); f(f(a,a), X0) > f(a, X0) holds.
    let big = Term::app(f.clone(), vec![Term::app(f.clone(), vec![a.clone(), a.clone()]), x.clone()]);
    let small = Term::app(f.clone(), vec![a.clone(), x.clone()]);
    assert_eq!(kbo().compare(&big, &small), Some(Ordering::Greater));

    // Instantiate X0 with an arbitrary ground term; the comparison must not flip.
    let mut subst = Subst::new();
    subst.bind(0, Scope::GIVEN, Term::app(f, vec![a.clone(), a]), Scope::GIVEN);
    let big_inst = subst.apply_no_renaming(&big, Scope::GIVEN);
    let small_inst = subst.apply_no_renaming(&small, Scope::GIVEN);
    assert_eq!(kbo().compare(&big_inst, &small_inst), Some(Ordering::Greater));
  }
}
