/*!

Operations on de Bruijn indices: shifting, substitution of the outermost bound
variable, evaluation under an explicit environment, and β-reduction. These underpin
quantifier elimination in the preprocessor and the higher-order pattern unifier.

*/

use super::{Term, TermKind};

impl Term {
  /// Adds `amount` to every loose de Bruijn index.
  pub fn shift(&self, amount: u32) -> Term {
    self.shift_above(amount, 0)
  }

  /// Adds `amount` to every de Bruijn index that refers above `cutoff` binders.
  pub fn shift_above(&self, amount: u32, cutoff: u32) -> Term {
    if amount == 0 || self.loose_bvars() <= cutoff {
      return self.clone();
    }
    match self.kind() {
      TermKind::BVar(index) => {
        if *index >= cutoff {
          Term::bvar(index + amount, self.ty().clone())
        } else {
          self.clone()
        }
      }
      TermKind::App(head, args) => Term::app(
        head.shift_above(amount, cutoff),
        args.iter().map(|a| a.shift_above(amount, cutoff)).collect(),
      ),
      TermKind::Fun(arg_ty, body) => Term::fun(arg_ty.clone(), body.shift_above(amount, cutoff + 1)),
      TermKind::Builtin(tag, args) => Term::builtin(
        *tag,
        args.iter().map(|a| a.shift_above(amount, cutoff)).collect(),
      ),
      _ => self.clone(),
    }
  }

  /// Substitutes `by` for the outermost bound variable and closes the gap: index 0
  /// becomes `by` (shifted under inner binders), higher indices shift down by one.
  pub fn subst_db(&self, by: &Term) -> Term {
    self.subst_db_at(0, by)
  }

  fn subst_db_at(&self, depth: u32, by: &Term) -> Term {
    if self.loose_bvars() <= depth {
      return self.clone();
    }
    match self.kind() {
      TermKind::BVar(index) => {
        if *index == depth {
          by.shift(depth)
        } else if *index > depth {
          Term::bvar(index - 1, self.ty().clone())
        } else {
          self.clone()
        }
      }
      TermKind::App(head, args) => Term::app(
        head.subst_db_at(depth, by),
        args.iter().map(|a| a.subst_db_at(depth, by)).collect(),
      ),
      TermKind::Fun(arg_ty, body) => Term::fun(arg_ty.clone(), body.subst_db_at(depth + 1, by)),
      TermKind::Builtin(tag, args) => Term::builtin(
        *tag,
        args.iter().map(|a| a.subst_db_at(depth, by)).collect(),
      ),
      _ => self.clone(),
    }
  }

  /// Evaluates under an environment of optional terms indexed by de Bruijn position.
  /// A loose index `i` is replaced by `env[i]` when that slot is present; other
  /// indices are left alone. Environment entries must be closed terms.
  pub fn eval_db(&self, env: &[Option<Term>]) -> Term {
    self.eval_db_at(0, env)
  }

  fn eval_db_at(&self, depth: u32, env: &[Option<Term>]) -> Term {
    if self.loose_bvars() <= depth {
      return self.clone();
    }
    match self.kind() {
      TermKind::BVar(index) => {
        let position = (*index - depth) as usize;
        match env.get(position) {
          Some(Some(replacement)) => {
            debug_assert!(replacement.is_closed(), "environment term with loose indices");
            replacement.clone()
          }
          _ => self.clone(),
        }
      }
      TermKind::App(head, args) => Term::app(
        head.eval_db_at(depth, env),
        args.iter().map(|a| a.eval_db_at(depth, env)).collect(),
      ),
      TermKind::Fun(arg_ty, body) => Term::fun(arg_ty.clone(), body.eval_db_at(depth + 1, env)),
      TermKind::Builtin(tag, args) => Term::builtin(
        *tag,
        args.iter().map(|a| a.eval_db_at(depth, env)).collect(),
      ),
      _ => self.clone(),
    }
  }

  /// Contracts β-redexes at the head of the spine: `(λ. b) a ā → b[a] ā`.
  pub fn beta_reduce_head(&self) -> Term {
    let mut current = self.clone();
    loop {
      let contracted = match current.kind() {
        TermKind::App(head, args) => match head.kind() {
          TermKind::Fun(_, body) => Some(Term::app(body.subst_db(&args[0]), args[1..].to_vec())),
          _ => None,
        },
        _ => None,
      };
      match contracted {
        Some(next) => current = next,
        None => return current,
      }
    }
  }

  /// Full β-normalization, innermost-first.
  pub fn beta_normalize(&self) -> Term {
    let normalized = match self.kind() {
      TermKind::App(head, args) => Term::app(
        head.beta_normalize(),
        args.iter().map(|a| a.beta_normalize()).collect(),
      ),
      TermKind::Fun(arg_ty, body) => Term::fun(arg_ty.clone(), body.beta_normalize()),
      TermKind::Builtin(tag, args) => Term::builtin(
        *tag,
        args.iter().map(|a| a.beta_normalize()).collect(),
      ),
      _ => self.clone(),
    };
    let reduced = normalized.beta_reduce_head();
    if reduced == normalized {
      reduced
    } else {
      reduced.beta_normalize()
    }
  }
}

#[cfg(test)]
mod tests {
  use crate::core::{symbol::Symbol, types::Type};
  use super::*;

  fn unary(name: &str) -> Term {
    let ty = Type::arrow(vec![Type::individual()], Type::individual());
    Term::constant(Symbol::with_type(name, ty).unwrap())
  }

  #[test]
  fn shift_respects_binders() {
    let iota = Type::individual();
    // λ. f(Y0, Y1) — Y0 is bound here, Y1 is loose.
    let f = Term::constant(
      Symbol::with_type("db_test_f", Type::arrow(vec![iota.clone(), iota.clone()], iota.clone())).unwrap(),
    );
    let body = Term::app(f, vec![Term::bvar(0, iota.clone()), Term::bvar(1, iota.clone())]);
    let lam = Term::fun(iota.clone(), body);

    assert_eq!(lam.loose_bvars(), 1);
    let shifted = lam.shift(2);
    // The loose Y1 became Y3; the bound Y0 is untouched.
    assert_eq!(format!("{}", shifted), "λ. db_test_f(Y0,Y3)");
  }

  #[test]
  fn beta_reduction_substitutes_the_argument() {
    let iota = Type::individual();
    let g = unary("db_test_g");
    let a = Term::constant(Symbol::with_type("db_test_a", iota.clone()).unwrap());

    // (λ. g(Y0)) a → g(a)
    let lam = Term::fun(iota.clone(), Term::app(g.clone(), vec![Term::bvar(0, iota.clone())]));
    let redex = Term::app(lam, vec![a.clone()]);
    let expected = Term::app(g, vec![a]);

    assert_eq!(redex.beta_reduce_head(), expected);
    assert!(redex.beta_normalize().is_closed());
  }

  #[test]
  fn eval_under_environment() {
    let iota = Type::individual();
    let b = Term::constant(Symbol::with_type("db_test_b", iota.clone()).unwrap());
    let term = Term::bvar(0, iota.clone());

    assert_eq!(term.eval_db(&[Some(b.clone())]), b);
    assert_eq!(term.eval_db(&[None]), term);
  }
}
