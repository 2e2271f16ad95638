/*!

Higher-order pattern unification.

A term is in the pattern fragment when every occurrence of a free (flex) variable is
applied to a sequence of pairwise distinct bound variables. Within that fragment,
unifiability is decidable and most general unifiers exist.

The algorithm works on β-normal terms in a single output namespace: both inputs are
α-renamed into a fresh scope first, and the resulting substitution maps the original
scoped variables into that scope. On a flex-rigid pair `F(ȳ) = t`, any flex subterm
of `t` applied to a bound variable outside `ȳ` is *pruned*: the offending arguments
are dropped by binding the inner flex variable to a projection onto a fresh variable.
A rigid occurrence of a bound variable outside `ȳ` cannot escape its binder and makes
the pair non-unifiable.

Errors distinguish `NotInFragment` (the rule does not apply; the caller skips the
inference) from `NotUnifiable` (occurs-check failure, head or sort clash, or an
escaping bound variable).

*/

use std::{
  collections::HashMap,
  fmt::Display,
};

use crate::core::{
  substitution::{Renaming, Scope, Subst},
  term::{Term, TermKind, VarId},
  types::Type,
};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum PatternUnifyError {
  /// A flex head is applied to something other than distinct bound variables.
  NotInFragment,
  /// Occurs-check failure, clash, or a bound variable that cannot escape its binder.
  NotUnifiable,
}

impl Display for PatternUnifyError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      PatternUnifyError::NotInFragment => write!(f, "outside the pattern fragment"),
      PatternUnifyError::NotUnifiable  => write!(f, "not unifiable"),
    }
  }
}

/// Unifies two higher-order pattern terms. The returned substitution binds the
/// original scoped variables; its terms live in a fresh output scope.
pub fn pattern_unify(
  a: &Term,
  scope_a: Scope,
  b: &Term,
  scope_b: Scope,
) -> Result<Subst, PatternUnifyError> {
  let output_scope = Scope(scope_a.0.max(scope_b.0) + 1);

  // Register every original variable with the renaming first, so the α-renaming into
  // the output namespace is reproducible and the solver's fresh variables cannot
  // collide with renamed ones.
  let mut original_vars: Vec<((VarId, Scope), Term)> = Vec::new();
  collect_vars(a, scope_a, &mut original_vars);
  collect_vars(b, scope_b, &mut original_vars);

  let identity = Subst::new();
  let mut renaming = Renaming::new();
  let registered: Vec<((VarId, Scope), VarId, Type)> = original_vars
    .iter()
    .map(|((var, scope), term)| ((*var, *scope), renaming.rename(*var, *scope), term.ty().clone()))
    .collect();

  let a_renamed = identity.apply(&mut renaming, &a.beta_normalize(), scope_a);
  let b_renamed = identity.apply(&mut renaming, &b.beta_normalize(), scope_b);

  let mut solver = Solver {
    subst: Subst::new(),
    scope: output_scope,
    next_fresh: registered.len() as VarId,
  };
  solver.solve(&a_renamed, &b_renamed)?;

  // Re-key the solution by the original scoped variables.
  let mut result = Subst::new();
  for ((var, scope), fresh_id, ty) in registered {
    let image = solver.subst.apply_no_renaming(&Term::var(fresh_id, ty), output_scope);
    result.bind(var, scope, image, output_scope);
  }
  Ok(result)
}

fn collect_vars(term: &Term, scope: Scope, out: &mut Vec<((VarId, Scope), Term)>) {
  match term.kind() {
    TermKind::Var(id) => {
      if !out.iter().any(|((v, s), _)| *v == *id && *s == scope) {
        out.push(((*id, scope), term.clone()));
      }
    }
    _ => {
      for child in term.children() {
        collect_vars(&child, scope, out);
      }
    }
  }
}

struct Solver {
  subst     : Subst,
  scope     : Scope,
  next_fresh: VarId,
}

impl Solver {
  fn fresh_var(&mut self, ty: Type) -> Term {
    let id = self.next_fresh;
    self.next_fresh += 1;
    Term::var(id, ty)
  }

  /// Normalizes to weak head normal form under the current substitution.
  fn resolve(&self, term: &Term) -> Term {
    let mut current = term.beta_reduce_head();
    loop {
      let head = current.head();
      let replaced = match head.kind() {
        TermKind::Var(id) => self.subst.get(*id, self.scope).map(|(bound, _)| {
          if current.args().is_empty() {
            bound.clone()
          } else {
            Term::app(bound.clone(), current.args().to_vec())
          }
        }),
        _ => None,
      };
      match replaced {
        Some(next) => current = next.beta_reduce_head(),
        None => return current,
      }
    }
  }

  fn solve(&mut self, a: &Term, b: &Term) -> Result<(), PatternUnifyError> {
    let a = self.resolve(a);
    let b = self.resolve(b);

    if a == b {
      return Ok(());
    }
    if a.ty() != b.ty() {
      return Err(PatternUnifyError::NotUnifiable);
    }

    match (a.kind(), b.kind()) {
      (TermKind::Fun(_, body_a), TermKind::Fun(_, body_b)) => {
        let (body_a, body_b) = (body_a.clone(), body_b.clone());
        self.solve(&body_a, &body_b)
      }
      // η: a bare abstraction against a non-abstraction of the same arrow type.
      (TermKind::Fun(_, body_a), _) => {
        let expanded = eta_body(&b);
        let body_a = body_a.clone();
        self.solve(&body_a, &expanded)
      }
      (_, TermKind::Fun(_, body_b)) => {
        let expanded = eta_body(&a);
        let body_b = body_b.clone();
        self.solve(&expanded, &body_b)
      }
      _ => {
        match (flex_view(&a), flex_view(&b)) {
          (Some(flex_a), Some(flex_b)) => self.solve_flex_flex(flex_a, flex_b),
          (Some(flex_a), None) => self.solve_flex_rigid(flex_a, &b),
          (None, Some(flex_b)) => self.solve_flex_rigid(flex_b, &a),
          (None, None) => self.solve_rigid_rigid(&a, &b),
        }
      }
    }
  }

  fn solve_rigid_rigid(&mut self, a: &Term, b: &Term) -> Result<(), PatternUnifyError> {
    let heads_equal = match (a.head().kind(), b.head().kind()) {
      (TermKind::Const(f), TermKind::Const(g)) => f == g,
      (TermKind::BVar(i), TermKind::BVar(j)) => i == j,
      (TermKind::Builtin(tag_a, _), TermKind::Builtin(tag_b, _)) => tag_a == tag_b,
      _ => false,
    };
    if !heads_equal || a.args().len() != b.args().len() {
      return Err(PatternUnifyError::NotUnifiable);
    }
    let pairs: Vec<(Term, Term)> = a
      .args()
      .iter()
      .cloned()
      .zip(b.args().iter().cloned())
      .collect();
    for (arg_a, arg_b) in pairs {
      self.solve(&arg_a, &arg_b)?;
    }
    Ok(())
  }

  fn solve_flex_flex(&mut self, a: FlexView, b: FlexView) -> Result<(), PatternUnifyError> {
    let args_a = distinct_bvars(&a.args)?;
    let args_b = distinct_bvars(&b.args)?;

    if a.var == b.var {
      // F(ȳ) = F(z̄): keep exactly the argument positions where both sides agree.
      let kept: Vec<usize> = (0..args_a.len()).filter(|&i| args_a[i] == args_b[i]).collect();
      if kept.len() == args_a.len() {
        return Ok(());
      }
      let binding = self.projection_binding(&a, &kept);
      self.subst.bind(a.var, self.scope, binding, self.scope);
      Ok(())
    } else {
      // F(ȳ) = G(z̄): a fresh head over the bound variables common to both sides.
      let kept_a: Vec<usize> = (0..args_a.len()).filter(|&i| args_b.contains(&args_a[i])).collect();
      let kept_b: Vec<usize> = kept_a
        .iter()
        .map(|&i| args_b.iter().position(|z| *z == args_a[i]).unwrap())
        .collect();

      let result_ty = result_type(&a);
      let kept_types: Vec<Type> = kept_a.iter().map(|&i| a.args[i].ty().clone()).collect();
      let fresh_head = self.fresh_var(Type::arrow(kept_types, result_ty));

      let binding_a = projection_onto(&a, &kept_a, &fresh_head);
      let binding_b = projection_onto(&b, &kept_b, &fresh_head);
      self.subst.bind(a.var, self.scope, binding_a, self.scope);
      self.subst.bind(b.var, self.scope, binding_b, self.scope);
      Ok(())
    }
  }

  fn solve_flex_rigid(&mut self, flex: FlexView, rigid: &Term) -> Result<(), PatternUnifyError> {
    let args = distinct_bvars(&flex.args)?;
    if self.occurs(flex.var, rigid) {
      return Err(PatternUnifyError::NotUnifiable);
    }

    // Outer de Bruijn index of each argument → its position in the argument list.
    let mut outer_map: HashMap<u32, usize> = HashMap::new();
    for (position, index) in args.iter().enumerate() {
      outer_map.insert(*index, position);
    }

    let arity = args.len() as u32;
    let body = self.abstract_rigid(rigid, 0, arity, &outer_map)?;
    let binding = wrap_lambdas(&flex, body);
    self.subst.bind(flex.var, self.scope, binding, self.scope);
    Ok(())
  }

  /// Rebuilds `term` as the body of the `arity`-ary abstraction bound to the flex
  /// head. `local` counts binders inside `term`; an index referring past them is a
  /// reference to the equation's binder context and must be an argument of the flex
  /// head, otherwise it is pruned (under a flex subterm) or fails (rigid position).
  fn abstract_rigid(
    &mut self,
    term: &Term,
    local: u32,
    arity: u32,
    outer_map: &HashMap<u32, usize>,
  ) -> Result<Term, PatternUnifyError> {
    let term = self.resolve(term);
    if let Some(flex) = flex_view(&term) {
      // A flex subterm: prune the arguments that refer outside the fragment.
      let args = distinct_bvars(&flex.args)?;
      let kept: Vec<usize> = (0..args.len())
        .filter(|&i| args[i] < local || outer_map.contains_key(&(args[i] - local)))
        .collect();
      if kept.len() != args.len() {
        let binding = self.projection_binding(&flex, &kept);
        self.subst.bind(flex.var, self.scope, binding, self.scope);
        let reduced = self.resolve(&term);
        return self.abstract_rigid(&reduced, local, arity, outer_map);
      }
      // All arguments survive: translate them into the new binder frame.
      let translated: Result<Vec<Term>, _> = flex
        .args
        .iter()
        .map(|arg| self.abstract_rigid(arg, local, arity, outer_map))
        .collect();
      return Ok(Term::app(Term::var(flex.var, flex.head_ty.clone()), translated?));
    }

    match term.kind() {
      TermKind::BVar(index) => {
        if *index < local {
          Ok(term.clone())
        } else {
          match outer_map.get(&(index - local)) {
            Some(&position) => {
              let new_index = arity - 1 - position as u32 + local;
              Ok(Term::bvar(new_index, term.ty().clone()))
            }
            // A rigid occurrence of a bound variable the binding cannot capture.
            None => Err(PatternUnifyError::NotUnifiable),
          }
        }
      }
      TermKind::App(head, args) => {
        let new_head = self.abstract_rigid(head, local, arity, outer_map)?;
        let new_args: Result<Vec<Term>, _> = args
          .iter()
          .map(|arg| self.abstract_rigid(arg, local, arity, outer_map))
          .collect();
        Ok(Term::app(new_head, new_args?))
      }
      TermKind::Fun(arg_ty, body) => Ok(Term::fun(
        arg_ty.clone(),
        self.abstract_rigid(body, local + 1, arity, outer_map)?,
      )),
      TermKind::Builtin(tag, args) => {
        let new_args: Result<Vec<Term>, _> = args
          .iter()
          .map(|arg| self.abstract_rigid(arg, local, arity, outer_map))
          .collect();
        Ok(Term::builtin(*tag, new_args?))
      }
      _ => Ok(term.clone()),
    }
  }

  /// Binds a flex head to a projection of its arguments onto a fresh head.
  fn projection_binding(&mut self, flex: &FlexView, kept: &[usize]) -> Term {
    let result_ty = result_type(flex);
    let kept_types: Vec<Type> = kept.iter().map(|&i| flex.args[i].ty().clone()).collect();
    let fresh_head = self.fresh_var(Type::arrow(kept_types, result_ty));
    projection_onto(flex, kept, &fresh_head)
  }

  fn occurs(&self, var: VarId, term: &Term) -> bool {
    let term = self.resolve(term);
    match term.kind() {
      TermKind::Var(id) => *id == var,
      _ => term.children().iter().any(|child| self.occurs(var, child)),
    }
  }
}

/// A flex term: an unbound free variable applied to some arguments.
struct FlexView {
  var    : VarId,
  head_ty: Type,
  args   : Vec<Term>,
}

fn flex_view(term: &Term) -> Option<FlexView> {
  let head = term.head();
  match head.kind() {
    TermKind::Var(id) => Some(FlexView {
      var: *id,
      head_ty: head.ty().clone(),
      args: term.args().to_vec(),
    }),
    _ => None,
  }
}

/// The de Bruijn indices of the arguments, required to be pairwise distinct bound
/// variables — the fragment condition.
fn distinct_bvars(args: &[Term]) -> Result<Vec<u32>, PatternUnifyError> {
  let mut indices = Vec::with_capacity(args.len());
  for arg in args {
    match arg.kind() {
      TermKind::BVar(index) => {
        if indices.contains(index) {
          return Err(PatternUnifyError::NotInFragment);
        }
        indices.push(*index);
      }
      _ => return Err(PatternUnifyError::NotInFragment),
    }
  }
  Ok(indices)
}

fn result_type(flex: &FlexView) -> Type {
  let (params, ret) = flex.head_ty.arrow_parts();
  debug_assert!(params.len() >= flex.args.len());
  Type::arrow(params[flex.args.len()..].to_vec(), ret.clone())
}

/// `λ^n. body` with the flex head's parameter types.
fn wrap_lambdas(flex: &FlexView, mut body: Term) -> Term {
  let (params, _) = flex.head_ty.arrow_parts();
  for position in (0..flex.args.len()).rev() {
    body = Term::fun(params[position].clone(), body);
  }
  body
}

/// `λ^n. head(Y_{i₁}, …, Y_{iₖ})` projecting the kept argument positions.
fn projection_onto(flex: &FlexView, kept: &[usize], head: &Term) -> Term {
  let arity = flex.args.len() as u32;
  let projected: Vec<Term> = kept
    .iter()
    .map(|&position| Term::bvar(arity - 1 - position as u32, flex.args[position].ty().clone()))
    .collect();
  wrap_lambdas(flex, Term::app(head.clone(), projected))
}

/// The body of the η-expansion `λ. (shift t) Y0` of an arrow-typed term.
fn eta_body(term: &Term) -> Term {
  let (params, _) = term.ty().arrow_parts();
  debug_assert!(!params.is_empty(), "η-expansion of a non-arrow term");
  let arg_ty = params[0].clone();
  Term::app(term.shift(1), vec![Term::bvar(0, arg_ty)])
}

#[cfg(test)]
mod tests {
  use crate::core::symbol::Symbol;
  use super::*;

  fn iota() -> Type {
    Type::individual()
  }

  fn unary(name: &str) -> Term {
    Term::constant(Symbol::with_type(name, Type::arrow(vec![iota()], iota())).unwrap())
  }

  fn check_unifies(a: &Term, b: &Term) -> Subst {
    let subst = pattern_unify(a, Scope::GIVEN, b, Scope::PARTNER).unwrap();
    let a_image = subst.apply_no_renaming(a, Scope::GIVEN).beta_normalize();
    let b_image = subst.apply_no_renaming(b, Scope::PARTNER).beta_normalize();
    assert_eq!(a_image, b_image, "{} and {} after {:?}-sized unifier", a_image, b_image, subst.len());
    subst
  }

  #[test]
  fn flex_applied_to_bound_variable() {
    let f = unary("pat_test_f");
    let f_ty = Type::arrow(vec![iota()], iota());
    // λx. F(x)  =?  λx. f(x)   solved by F ↦ λ. f(Y0)
    let left = Term::fun(iota(), Term::app(Term::var(0, f_ty), vec![Term::bvar(0, iota())]));
    let right = Term::fun(iota(), Term::app(f, vec![Term::bvar(0, iota())]));

    check_unifies(&left, &right);
  }

  #[test]
  fn rigid_escape_is_not_unifiable() {
    let g = unary("pat_test_g");
    // λx. F  =?  λx. g(x): x cannot escape into F's binding.
    let left = Term::fun(iota(), Term::var(0, iota()));
    let right = Term::fun(iota(), Term::app(g, vec![Term::bvar(0, iota())]));

    assert!(matches!(
      pattern_unify(&left, Scope::GIVEN, &right, Scope::PARTNER),
      Err(PatternUnifyError::NotUnifiable)
    ));
  }

  #[test]
  fn pruning_a_flex_subterm() {
    let g = unary("pat_test_h");
    let g_arg_ty = Type::arrow(vec![iota()], iota());
    // λx. F  =?  λx. g(G(x)): G's argument is pruned, then F = g(G').
    let left = Term::fun(iota(), Term::var(0, iota()));
    let right = Term::fun(
      iota(),
      Term::app(g, vec![Term::app(Term::var(1, g_arg_ty), vec![Term::bvar(0, iota())])]),
    );

    let subst = check_unifies(&left, &right);
    assert!(subst.len() >= 2);
  }

  #[test]
  fn non_bvar_argument_is_outside_the_fragment() {
    let a = Term::constant(Symbol::with_type("pat_test_a", iota()).unwrap());
    let f_ty = Type::arrow(vec![iota()], iota());
    // F(a) is not a pattern.
    let left = Term::app(Term::var(0, f_ty), vec![a.clone()]);

    assert!(matches!(
      pattern_unify(&left, Scope::GIVEN, &a, Scope::PARTNER),
      Err(PatternUnifyError::NotInFragment)
    ));
  }

  #[test]
  fn flex_flex_with_distinct_heads() {
    let f_ty = Type::arrow(vec![iota()], iota());
    // λx. F(x)  =?  λx. G(x)
    let left = Term::fun(iota(), Term::app(Term::var(0, f_ty.clone()), vec![Term::bvar(0, iota())]));
    let right = Term::fun(iota(), Term::app(Term::var(1, f_ty), vec![Term::bvar(0, iota())]));

    check_unifies(&left, &right);
  }
}
