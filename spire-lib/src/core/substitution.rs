/*!

Scoped substitutions.

A scope is a renaming namespace: `X0` in scope 0 and `X0` in scope 1 are distinct
variables, so two clauses can be unified without renaming either one first. A
`Subst` maps scoped variables to scoped terms and is triangular: a binding's term may
itself contain variables bound elsewhere in the substitution, and application follows
the chains.

Application normally goes through a `Renaming`, which maps every unbound variable it
encounters to a fresh variable in a single output namespace. The same renaming maps
the same scoped variable to the same fresh variable across calls, which is what makes
a multi-premise conclusion variable-disjoint from its parents but internally
consistent.

*/

use std::{
  collections::HashMap,
  fmt::Display,
};

use crate::core::term::{Term, TermKind, VarId};

/// A renaming namespace tag for variables.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, PartialOrd, Ord)]
pub struct Scope(pub u32);

impl Scope {
  /// Scope of the given clause in a binary inference.
  pub const GIVEN: Scope = Scope(0);
  /// Scope of the active partner in a binary inference.
  pub const PARTNER: Scope = Scope(1);
}

impl Display for Scope {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "@{}", self.0)
  }
}

/// Maps each scoped variable it encounters to a fresh variable, consistently.
#[derive(Default)]
pub struct Renaming {
  map  : HashMap<(VarId, Scope), VarId>,
  fresh: VarId,
}

impl Renaming {
  #[inline(always)]
  pub fn new() -> Self {
    Self::default()
  }

  pub fn rename(&mut self, var: VarId, scope: Scope) -> VarId {
    match self.map.get(&(var, scope)) {
      Some(fresh) => *fresh,
      None => {
        let fresh = self.fresh;
        self.fresh += 1;
        self.map.insert((var, scope), fresh);
        fresh
      }
    }
  }
}

#[derive(Clone, Default)]
pub struct Subst {
  bindings: HashMap<(VarId, Scope), (Term, Scope)>,
}

impl Subst {
  #[inline(always)]
  pub fn new() -> Self {
    Self::default()
  }

  #[inline(always)]
  pub fn len(&self) -> usize {
    self.bindings.len()
  }

  #[inline(always)]
  pub fn is_empty(&self) -> bool {
    self.bindings.is_empty()
  }

  #[inline(always)]
  pub fn get(&self, var: VarId, scope: Scope) -> Option<&(Term, Scope)> {
    self.bindings.get(&(var, scope))
  }

  pub fn bind(&mut self, var: VarId, scope: Scope, term: Term, term_scope: Scope) {
    debug_assert!(
      !self.bindings.contains_key(&(var, scope)),
      "rebinding X{}{}",
      var,
      scope
    );
    debug_assert!(
      term.as_var() != Some(var) || term_scope != scope,
      "binding X{}{} to itself",
      var,
      scope
    );
    self.bindings.insert((var, scope), (term, term_scope));
  }

  /// Follows variable bindings until the head is not a bound variable.
  pub fn deref(&self, term: &Term, scope: Scope) -> (Term, Scope) {
    let mut current = term.clone();
    let mut current_scope = scope;
    loop {
      let binding = match current.kind() {
        TermKind::Var(id) => self.get(*id, current_scope).cloned(),
        _ => None,
      };
      match binding {
        Some((bound, bound_scope)) => {
          current = bound;
          current_scope = bound_scope;
        }
        None => return (current, current_scope),
      }
    }
  }

  /// Applies the substitution, renaming every unbound variable into the renaming's
  /// output namespace. The result belongs to no input scope.
  pub fn apply(&self, renaming: &mut Renaming, term: &Term, scope: Scope) -> Term {
    match term.kind() {
      TermKind::Var(id) => match self.get(*id, scope) {
        Some((bound, bound_scope)) => {
          let (bound, bound_scope) = (bound.clone(), *bound_scope);
          self.apply(renaming, &bound, bound_scope)
        }
        None => Term::var(renaming.rename(*id, scope), term.ty().clone()),
      },
      TermKind::App(head, args) => Term::app(
        self.apply(renaming, head, scope),
        args.iter().map(|a| self.apply(renaming, a, scope)).collect(),
      ),
      TermKind::Fun(arg_ty, body) => Term::fun(arg_ty.clone(), self.apply(renaming, body, scope)),
      TermKind::Builtin(tag, args) => Term::builtin(
        *tag,
        args.iter().map(|a| self.apply(renaming, a, scope)).collect(),
      ),
      _ => term.clone(),
    }
  }

  /// Applies the substitution leaving unbound variables as they are. Only meaningful
  /// when every unbound variable reachable from `term` lives in one scope, e.g. when
  /// building a rewrite instance whose remaining variables all belong to the
  /// rewritten clause.
  pub fn apply_no_renaming(&self, term: &Term, scope: Scope) -> Term {
    match term.kind() {
      TermKind::Var(id) => match self.get(*id, scope) {
        Some((bound, bound_scope)) => {
          let (bound, bound_scope) = (bound.clone(), *bound_scope);
          self.apply_no_renaming(&bound, bound_scope)
        }
        None => term.clone(),
      },
      TermKind::App(head, args) => Term::app(
        self.apply_no_renaming(head, scope),
        args.iter().map(|a| self.apply_no_renaming(a, scope)).collect(),
      ),
      TermKind::Fun(arg_ty, body) => Term::fun(arg_ty.clone(), self.apply_no_renaming(body, scope)),
      TermKind::Builtin(tag, args) => Term::builtin(
        *tag,
        args.iter().map(|a| self.apply_no_renaming(a, scope)).collect(),
      ),
      _ => term.clone(),
    }
  }

  /// Composition within a single scope: `compose(σ, τ) t = σ(τ t)`.
  pub fn compose(sigma: &Subst, tau: &Subst, scope: Scope) -> Subst {
    let mut result = Subst::new();
    for ((var, var_scope), (term, term_scope)) in tau.bindings.iter() {
      debug_assert_eq!(*var_scope, scope, "composition across scopes");
      let image = sigma.apply_no_renaming(term, *term_scope);
      if image.as_var() != Some(*var) {
        result.bindings.insert((*var, *var_scope), (image, scope));
      }
    }
    for ((var, var_scope), (term, term_scope)) in sigma.bindings.iter() {
      if !result.bindings.contains_key(&(*var, *var_scope)) && !tau.bindings.contains_key(&(*var, *var_scope)) {
        result.bindings.insert((*var, *var_scope), (term.clone(), *term_scope));
      }
    }
    result
  }

  /// Fully-applied snapshot of the bindings, for proof records.
  pub fn snapshot(&self) -> Vec<((VarId, Scope), Term)> {
    let mut entries: Vec<((VarId, Scope), Term)> = self
      .bindings
      .keys()
      .map(|(var, scope)| {
        let image = self.apply_no_renaming(&self.bindings[&(*var, *scope)].0, self.bindings[&(*var, *scope)].1);
        ((*var, *scope), image)
      })
      .collect();
    entries.sort_by_key(|((var, scope), _)| (*scope, *var));
    entries
  }
}

#[cfg(test)]
mod tests {
  use crate::core::{symbol::Symbol, types::Type};
  use super::*;

  fn f_of(arg: Term) -> Term {
    let iota = Type::individual();
    let f = Symbol::with_type("subst_test_f", Type::arrow(vec![iota.clone()], iota)).unwrap();
    Term::app(Term::constant(f), vec![arg])
  }

  #[test]
  fn identity_application() {
    let term = f_of(Term::var(3, Type::individual()));
    let subst = Subst::new();
    assert_eq!(subst.apply_no_renaming(&term, Scope::GIVEN), term);
  }

  #[test]
  fn renaming_is_stable_across_applications() {
    let x = Term::var(4, Type::individual());
    let subst = Subst::new();
    let mut renaming = Renaming::new();

    let first = subst.apply(&mut renaming, &f_of(x.clone()), Scope::GIVEN);
    let second = subst.apply(&mut renaming, &x, Scope::GIVEN);
    // Both applications see X4 in scope 0 and map it to the same fresh variable.
    assert_eq!(first, f_of(second));
  }

  #[test]
  fn application_follows_binding_chains() {
    let iota = Type::individual();
    let a = Term::constant(Symbol::with_type("subst_test_a", iota.clone()).unwrap());

    let mut subst = Subst::new();
    subst.bind(0, Scope::GIVEN, Term::var(1, iota.clone()), Scope::PARTNER);
    subst.bind(1, Scope::PARTNER, a.clone(), Scope::PARTNER);

    let term = f_of(Term::var(0, iota));
    assert_eq!(subst.apply_no_renaming(&term, Scope::GIVEN), f_of(a));
  }

  #[test]
  fn substitution_preserves_types() {
    let iota = Type::individual();
    let term = f_of(Term::var(2, iota.clone()));
    let mut subst = Subst::new();
    subst.bind(2, Scope::GIVEN, f_of(Term::var(9, iota)), Scope::GIVEN);

    let image = subst.apply_no_renaming(&term, Scope::GIVEN);
    assert_eq!(image.ty(), term.ty());
  }

  #[test]
  fn composition_agrees_with_sequential_application() {
    let iota = Type::individual();
    let a = Term::constant(Symbol::with_type("subst_test_b", iota.clone()).unwrap());

    let mut tau = Subst::new();
    tau.bind(0, Scope::GIVEN, f_of(Term::var(1, iota.clone())), Scope::GIVEN);
    let mut sigma = Subst::new();
    sigma.bind(1, Scope::GIVEN, a, Scope::GIVEN);

    let term = f_of(Term::var(0, iota));
    let composed = Subst::compose(&sigma, &tau, Scope::GIVEN);
    assert_eq!(
      composed.apply_no_renaming(&term, Scope::GIVEN),
      sigma.apply_no_renaming(&tau.apply_no_renaming(&term, Scope::GIVEN), Scope::GIVEN)
    );
  }
}
