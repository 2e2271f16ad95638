/*!

Syntactic unification and matching over scoped terms.

A Robinson-style worklist algorithm with occurs check. Failure is an ordinary
`Result`: unification failure is frequent and expected, and every caller is an
inference rule that just skips the candidate.

Matching is one-sided unification: only variables of the pattern scope may be bound.
`matching_locked` additionally refuses to bind a given set of pattern-scope
variables, which is what same-scope callers use to protect the subject's variables.

*/

mod pattern;

pub use pattern::{pattern_unify, PatternUnifyError};

use std::fmt::Display;

use spire_abs::NatSet;

use crate::core::{
  substitution::{Scope, Subst},
  term::{Term, TermKind, VarId},
};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum UnifyError {
  /// Distinct rigid heads.
  HeadClash,
  /// Same head applied to different numbers of arguments.
  ArityClash,
  /// Binding would build an infinite term.
  OccursCheck,
  /// The two sides have different types.
  TypeMismatch,
}

impl Display for UnifyError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      UnifyError::HeadClash    => write!(f, "distinct function heads"),
      UnifyError::ArityClash   => write!(f, "arity mismatch"),
      UnifyError::OccursCheck  => write!(f, "occurs-check failure"),
      UnifyError::TypeMismatch => write!(f, "type mismatch"),
    }
  }
}

struct Mode<'a> {
  /// When set, only variables of `pattern_scope` may be bound.
  matching     : bool,
  pattern_scope: Scope,
  locked       : Option<&'a NatSet>,
}

impl Mode<'_> {
  fn can_bind(&self, var: VarId, scope: Scope) -> bool {
    if self.matching && scope != self.pattern_scope {
      return false;
    }
    match self.locked {
      Some(locked) => !(scope == self.pattern_scope && locked.contains(var as usize)),
      None => true,
    }
  }
}

/// Computes the most general unifier of `a` and `b`.
pub fn unify(a: &Term, scope_a: Scope, b: &Term, scope_b: Scope) -> Result<Subst, UnifyError> {
  let mut subst = Subst::new();
  unify_into(&mut subst, a, scope_a, b, scope_b)?;
  Ok(subst)
}

/// Extends `subst` to a unifier of `a` and `b`. On failure `subst` is left in an
/// unspecified state; callers keep their own checkpoint.
pub fn unify_into(
  subst: &mut Subst,
  a: &Term,
  scope_a: Scope,
  b: &Term,
  scope_b: Scope,
) -> Result<(), UnifyError> {
  let mode = Mode { matching: false, pattern_scope: Scope::GIVEN, locked: None };
  solve(subst, a, scope_a, b, scope_b, &mode)
}

/// Matches `pattern` onto `subject`: finds `σ` binding only pattern-scope variables
/// with `pattern σ = subject`. The scopes must differ; for same-scope matching use
/// `matching_locked` and lock the subject's variables.
pub fn matching(
  pattern: &Term,
  pattern_scope: Scope,
  subject: &Term,
  subject_scope: Scope,
) -> Result<Subst, UnifyError> {
  debug_assert_ne!(pattern_scope, subject_scope, "same-scope matching without a lock set");
  let mut subst = Subst::new();
  matching_into(&mut subst, pattern, pattern_scope, subject, subject_scope)?;
  Ok(subst)
}

/// Extends `subst` to a match of `pattern` onto `subject`.
pub fn matching_into(
  subst: &mut Subst,
  pattern: &Term,
  pattern_scope: Scope,
  subject: &Term,
  subject_scope: Scope,
) -> Result<(), UnifyError> {
  let mode = Mode { matching: true, pattern_scope, locked: None };
  solve(subst, pattern, pattern_scope, subject, subject_scope, &mode)
}

/// Matching that refuses to bind the `locked` pattern-scope variables.
pub fn matching_locked(
  pattern: &Term,
  pattern_scope: Scope,
  subject: &Term,
  subject_scope: Scope,
  locked: &NatSet,
) -> Result<Subst, UnifyError> {
  let mode = Mode { matching: true, pattern_scope, locked: Some(locked) };
  let mut subst = Subst::new();
  solve(&mut subst, pattern, pattern_scope, subject, subject_scope, &mode)?;
  Ok(subst)
}

fn solve(
  subst: &mut Subst,
  a: &Term,
  scope_a: Scope,
  b: &Term,
  scope_b: Scope,
  mode: &Mode,
) -> Result<(), UnifyError> {
  let mut pairs: Vec<((Term, Scope), (Term, Scope))> =
      vec![((a.clone(), scope_a), (b.clone(), scope_b))];

  while let Some(((s, ss), (t, ts))) = pairs.pop() {
    let (s, ss) = subst.deref(&s, ss);
    let (t, ts) = subst.deref(&t, ts);

    if s == t && (ss == ts || s.is_ground()) {
      continue;
    }
    if s.ty() != t.ty() {
      return Err(UnifyError::TypeMismatch);
    }

    match (s.kind(), t.kind()) {
      (TermKind::Var(v), _) if mode.can_bind(*v, ss) => {
        bind_checked(subst, *v, ss, &t, ts)?;
      }
      (_, TermKind::Var(w)) if !mode.matching && mode.can_bind(*w, ts) => {
        bind_checked(subst, *w, ts, &s, ss)?;
      }
      (TermKind::Const(f), TermKind::Const(g)) => {
        if f != g {
          return Err(UnifyError::HeadClash);
        }
      }
      (TermKind::BVar(i), TermKind::BVar(j)) => {
        if i != j {
          return Err(UnifyError::HeadClash);
        }
      }
      (TermKind::App(head_s, args_s), TermKind::App(head_t, args_t)) => {
        if args_s.len() != args_t.len() {
          return Err(UnifyError::ArityClash);
        }
        pairs.push(((head_s.clone(), ss), (head_t.clone(), ts)));
        for (arg_s, arg_t) in args_s.iter().zip(args_t.iter()) {
          pairs.push(((arg_s.clone(), ss), (arg_t.clone(), ts)));
        }
      }
      (TermKind::Fun(_, body_s), TermKind::Fun(_, body_t)) => {
        // Binder types agree because the node types agree.
        pairs.push(((body_s.clone(), ss), (body_t.clone(), ts)));
      }
      (TermKind::Builtin(tag_s, args_s), TermKind::Builtin(tag_t, args_t)) => {
        if tag_s != tag_t {
          return Err(UnifyError::HeadClash);
        }
        if args_s.len() != args_t.len() {
          return Err(UnifyError::ArityClash);
        }
        for (arg_s, arg_t) in args_s.iter().zip(args_t.iter()) {
          pairs.push(((arg_s.clone(), ss), (arg_t.clone(), ts)));
        }
      }
      _ => return Err(UnifyError::HeadClash),
    }
  }

  Ok(())
}

fn bind_checked(
  subst: &mut Subst,
  var: VarId,
  var_scope: Scope,
  term: &Term,
  term_scope: Scope,
) -> Result<(), UnifyError> {
  if occurs(subst, var, var_scope, term, term_scope) {
    return Err(UnifyError::OccursCheck);
  }
  subst.bind(var, var_scope, term.clone(), term_scope);
  Ok(())
}

/// Does the scoped variable occur in `term`, following bindings?
fn occurs(subst: &Subst, var: VarId, var_scope: Scope, term: &Term, term_scope: Scope) -> bool {
  let mut stack: Vec<(Term, Scope)> = vec![(term.clone(), term_scope)];
  while let Some((current, scope)) = stack.pop() {
    let (current, scope) = subst.deref(&current, scope);
    match current.kind() {
      TermKind::Var(id) => {
        if *id == var && scope == var_scope {
          return true;
        }
      }
      _ => {
        // A ground subterm cannot contain the variable in any scope.
        if current.is_ground() {
          continue;
        }
        for child in current.children() {
          stack.push((child, scope));
        }
      }
    }
  }
  false
}

#[cfg(test)]
mod tests {
  use crate::core::{symbol::Symbol, types::Type};
  use super::*;

  fn sym(name: &str, arity: usize) -> Term {
    let iota = Type::individual();
    let ty = Type::arrow(vec![iota.clone(); arity], iota);
    Term::constant(Symbol::with_type(name, ty).unwrap())
  }

  fn x(id: u32) -> Term {
    Term::var(id, Type::individual())
  }

  #[test]
  fn unifier_makes_both_sides_equal() {
    let f = sym("unify_test_f", 2);
    let a = sym("unify_test_a", 0);
    // f(X0, X1) =? f(a, X0) across scopes
    let left = Term::app(f.clone(), vec![x(0), x(1)]);
    let right = Term::app(f, vec![a, x(0)]);

    let subst = unify(&left, Scope::GIVEN, &right, Scope::PARTNER).unwrap();
    let mut renaming = crate::core::substitution::Renaming::new();
    let left_image = subst.apply(&mut renaming, &left, Scope::GIVEN);
    let right_image = subst.apply(&mut renaming, &right, Scope::PARTNER);
    assert_eq!(left_image, right_image);
  }

  #[test]
  fn occurs_check_fails() {
    let f = sym("unify_test_g", 1);
    let fx = Term::app(f, vec![x(0)]);
    assert!(matches!(
      unify(&x(0), Scope::GIVEN, &fx, Scope::GIVEN),
      Err(UnifyError::OccursCheck)
    ));
  }

  #[test]
  fn same_variable_in_different_scopes_is_distinct() {
    let result = unify(&x(0), Scope::GIVEN, &x(0), Scope::PARTNER);
    assert!(result.is_ok());
    assert_eq!(result.unwrap().len(), 1);
  }

  #[test]
  fn head_clash_and_arity_clash() {
    let a = sym("unify_test_b", 0);
    let c = sym("unify_test_c", 0);
    assert!(matches!(
      unify(&a, Scope::GIVEN, &c, Scope::PARTNER),
      Err(UnifyError::HeadClash)
    ));
  }

  #[test]
  fn matching_binds_only_pattern_variables() {
    let f = sym("unify_test_h", 1);
    let a = sym("unify_test_d", 0);
    let pattern = Term::app(f.clone(), vec![x(0)]);
    let subject = Term::app(f.clone(), vec![a.clone()]);

    let subst = matching(&pattern, Scope::GIVEN, &subject, Scope::PARTNER).unwrap();
    assert_eq!(subst.apply_no_renaming(&pattern, Scope::GIVEN), subject);

    // The subject direction must not match: a is not an instance of f-of-anything,
    // and a subject variable is rigid.
    let var_subject = Term::app(f, vec![x(3)]);
    assert!(matching(&a, Scope::GIVEN, &var_subject, Scope::PARTNER).is_err());
  }

  #[test]
  fn locked_variables_are_rigid() {
    let f = sym("unify_test_k", 1);
    let pattern = Term::app(f.clone(), vec![x(0)]);
    let subject = Term::app(f, vec![x(1)]);
    let locked = NatSet::singleton(0);

    let free = matching_locked(&pattern, Scope::GIVEN, &subject, Scope::GIVEN, &NatSet::new());
    assert!(free.is_ok());
    let blocked = matching_locked(&pattern, Scope::GIVEN, &subject, Scope::GIVEN, &locked);
    assert!(blocked.is_err());
  }

  #[test]
  fn type_mismatch_is_detected() {
    let p = Term::constant(Symbol::with_type("unify_test_p", Type::boolean()).unwrap());
    let a = sym("unify_test_e", 0);
    assert!(matches!(
      unify(&p, Scope::GIVEN, &a, Scope::PARTNER),
      Err(UnifyError::TypeMismatch)
    ));
  }

  #[test]
  fn unification_through_chained_bindings() {
    let f = sym("unify_test_m", 2);
    let a = sym("unify_test_n", 0);
    // f(X0, X0) =? f(X1, a) forces X0 := X1 then X1 := a.
    let left = Term::app(f.clone(), vec![x(0), x(0)]);
    let right = Term::app(f, vec![x(1), a.clone()]);

    let subst = unify(&left, Scope::GIVEN, &right, Scope::PARTNER).unwrap();
    let image = subst.apply_no_renaming(&x(0), Scope::GIVEN);
    assert_eq!(image, a);
  }
}
