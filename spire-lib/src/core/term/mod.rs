/*!

Hash-consed terms.

A term is one of

- a free named variable `Var(id, ty)`,
- a bound variable `BVar(i, ty)` referring to the `i`-th enclosing `Fun` binder,
- a constant `Const(symbol)`,
- an application `App(head, args)` with a flattened spine,
- an abstraction `Fun(arg_ty, body)`,
- a builtin `Builtin(tag, args)`, used for the interpreted constants `⊤` and `⊥`.

Structurally equal terms share one physical representation, so equality is a pointer
comparison and hashing is O(1). Every node carries its type and caches its size, depth,
free-variable set, and the number of binders its loose de Bruijn indices need; the
caches are filled bottom-up at construction, which costs nothing extra because
children are interned first.

*/

mod de_bruijn;
mod position;

pub use position::Position;

use std::{
  collections::HashMap,
  hash::{Hash, Hasher},
  sync::{Arc, Mutex},
};

use once_cell::sync::Lazy;
use spire_abs::{
  hash::{combine_all, HashType},
  join_string,
  NatSet,
  SmallVec,
};

use crate::core::{
  format::{FormatStyle, Formattable},
  symbol::Symbol,
  types::{Type, TypeError},
};
use crate::impl_display_debug_for_formattable;

/// Identifier of a free named variable. Scopes are tracked outside the term.
pub type VarId = u32;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BuiltinTag {
  True,
  False,
}

impl BuiltinTag {
  pub fn name(self) -> &'static str {
    match self {
      BuiltinTag::True  => "⊤",
      BuiltinTag::False => "⊥",
    }
  }
}

pub enum TermKind {
  Var(VarId),
  BVar(u32),
  Const(Symbol),
  App(Term, SmallVec<[Term; 2]>),
  Fun(Type, Term),
  Builtin(BuiltinTag, SmallVec<[Term; 2]>),
}

pub struct TermNode {
  kind: TermKind,
  ty  : Type,
  hash: HashType,

  size : u32,
  depth: u32,
  /// Free named variables occurring in the term or its descendants.
  free_vars: NatSet,
  /// Number of enclosing binders the loose de Bruijn indices require; 0 means closed.
  loose_bvars: u32,
}

/// A canonical, hash-consed term. Clones are cheap handle copies.
#[derive(Clone)]
pub struct Term(Arc<TermNode>);

static TERM_CONS: Lazy<Mutex<HashMap<HashType, Vec<Term>>>> = Lazy::new(|| Mutex::new(HashMap::new()));

impl Term {
  // region Constructors

  pub fn var(id: VarId, ty: Type) -> Term {
    let hash = combine_all(10, [id, ty.hash_value()]);
    Self::intern(TermKind::Var(id), ty, hash)
  }

  pub fn bvar(index: u32, ty: Type) -> Term {
    let hash = combine_all(11, [index, ty.hash_value()]);
    Self::intern(TermKind::BVar(index), ty, hash)
  }

  pub fn constant(symbol: Symbol) -> Term {
    let ty = symbol.ty().clone();
    let hash = combine_all(12, [symbol.index(), ty.hash_value()]);
    Self::intern(TermKind::Const(symbol), ty, hash)
  }

  /// Applies `head` to `args`, flattening a nested application spine. The result type
  /// consumes one arrow parameter per argument; argument types are checked in debug
  /// builds (they always hold for terms built by substitution or inference).
  pub fn app(head: Term, args: Vec<Term>) -> Term {
    if args.is_empty() {
      return head;
    }
    // Flatten App(App(h, xs), ys) into App(h, xs ++ ys).
    if let TermKind::App(inner_head, inner_args) = &head.0.kind {
      let mut all_args: Vec<Term> = inner_args.to_vec();
      all_args.extend(args);
      return Self::app(inner_head.clone(), all_args);
    }

    let (params, ret) = head.ty().arrow_parts();
    debug_assert!(
      args.len() <= params.len(),
      "application of {} to {} arguments, type admits {}",
      head,
      args.len(),
      params.len()
    );
    #[cfg(debug_assertions)]
    for (arg, param) in args.iter().zip(params.iter()) {
      debug_assert!(arg.ty() == param, "ill-typed argument {} : {} where {} expected", arg, arg.ty(), param);
    }

    let ty = Type::arrow(params[args.len().min(params.len())..].to_vec(), ret.clone());
    let hash = combine_all(
      13,
      std::iter::once(head.hash_value()).chain(args.iter().map(|a| a.hash_value())),
    );
    Self::intern(TermKind::App(head, SmallVec::from_vec(args)), ty, hash)
  }

  /// Type-checking variant of `app` for terms arriving from outside the engine.
  pub fn app_checked(head: Term, args: Vec<Term>) -> Result<Term, TypeError> {
    let (params, _ret) = head.ty().arrow_parts();
    if args.len() > params.len() {
      return if params.is_empty() {
        Err(TypeError::NotAFunction { context: format!("{}", head), found: head.ty().clone() })
      } else {
        Err(TypeError::ArityMismatch {
          context: format!("{}", head),
          expected: params.len(),
          found: args.len(),
        })
      };
    }
    for (arg, param) in args.iter().zip(params.iter()) {
      if arg.ty() != param {
        return Err(TypeError::Mismatch {
          context: format!("{}", head),
          expected: param.clone(),
          found: arg.ty().clone(),
        });
      }
    }
    Ok(Self::app(head, args))
  }

  pub fn fun(arg_ty: Type, body: Term) -> Term {
    let ty = Type::arrow(vec![arg_ty.clone()], body.ty().clone());
    let hash = combine_all(14, [arg_ty.hash_value(), body.hash_value()]);
    Self::intern(TermKind::Fun(arg_ty, body), ty, hash)
  }

  pub fn builtin(tag: BuiltinTag, args: Vec<Term>) -> Term {
    let ty = Type::boolean();
    let hash = combine_all(
      15,
      std::iter::once(tag as u32).chain(args.iter().map(|a| a.hash_value())),
    );
    Self::intern(TermKind::Builtin(tag, SmallVec::from_vec(args)), ty, hash)
  }

  /// The interpreted constant `⊤`. Predicate atoms `p(x̄)` are stored as `p(x̄) ≈ ⊤`.
  pub fn true_() -> Term {
    Self::builtin(BuiltinTag::True, vec![])
  }

  pub fn false_() -> Term {
    Self::builtin(BuiltinTag::False, vec![])
  }

  fn intern(kind: TermKind, ty: Type, hash: HashType) -> Term {
    let mut table = TERM_CONS.lock().unwrap();
    let bucket = table.entry(hash).or_default();
    for existing in bucket.iter() {
      if existing.shallow_eq(&kind) && existing.ty() == &ty {
        return existing.clone();
      }
    }

    let (size, depth, free_vars, loose_bvars) = Self::compute_caches(&kind);
    let term = Term(Arc::new(TermNode { kind, ty, hash, size, depth, free_vars, loose_bvars }));
    bucket.push(term.clone());
    term
  }

  /// Children are canonical by construction, so child comparison is pointer identity.
  fn shallow_eq(&self, kind: &TermKind) -> bool {
    match (&self.0.kind, kind) {
      (TermKind::Var(a), TermKind::Var(b)) => a == b,
      (TermKind::BVar(a), TermKind::BVar(b)) => a == b,
      (TermKind::Const(a), TermKind::Const(b)) => a == b,
      (TermKind::App(head_a, args_a), TermKind::App(head_b, args_b)) => {
        head_a == head_b && args_a == args_b
      }
      (TermKind::Fun(ty_a, body_a), TermKind::Fun(ty_b, body_b)) => ty_a == ty_b && body_a == body_b,
      (TermKind::Builtin(tag_a, args_a), TermKind::Builtin(tag_b, args_b)) => {
        tag_a == tag_b && args_a == args_b
      }
      _ => false,
    }
  }

  fn compute_caches(kind: &TermKind) -> (u32, u32, NatSet, u32) {
    match kind {
      TermKind::Var(id) => (1, 0, NatSet::singleton(*id as usize), 0),
      TermKind::BVar(index) => (1, 0, NatSet::new(), index + 1),
      TermKind::Const(_) => (1, 0, NatSet::new(), 0),
      TermKind::App(head, args) => {
        let mut size = 1 + head.size();
        let mut depth = head.depth();
        let mut free_vars = head.free_vars().clone();
        let mut loose = head.loose_bvars();
        for arg in args {
          size += arg.size();
          depth = depth.max(arg.depth());
          free_vars.union_in_place(arg.free_vars());
          loose = loose.max(arg.loose_bvars());
        }
        (size, depth + 1, free_vars, loose)
      }
      TermKind::Fun(_, body) => (
        1 + body.size(),
        1 + body.depth(),
        body.free_vars().clone(),
        body.loose_bvars().saturating_sub(1),
      ),
      TermKind::Builtin(_, args) => {
        let mut size = 1;
        let mut depth = 0;
        let mut free_vars = NatSet::new();
        let mut loose = 0;
        for arg in args {
          size += arg.size();
          depth = depth.max(arg.depth() + 1);
          free_vars.union_in_place(arg.free_vars());
          loose = loose.max(arg.loose_bvars());
        }
        (size, depth, free_vars, loose)
      }
    }
  }

  // endregion Constructors

  // region Accessors

  #[inline(always)]
  pub fn kind(&self) -> &TermKind {
    &self.0.kind
  }

  #[inline(always)]
  pub fn ty(&self) -> &Type {
    &self.0.ty
  }

  #[inline(always)]
  pub fn hash_value(&self) -> HashType {
    self.0.hash
  }

  /// Number of nodes in the term tree.
  #[inline(always)]
  pub fn size(&self) -> u32 {
    self.0.size
  }

  #[inline(always)]
  pub fn depth(&self) -> u32 {
    self.0.depth
  }

  #[inline(always)]
  pub fn free_vars(&self) -> &NatSet {
    &self.0.free_vars
  }

  #[inline(always)]
  pub fn is_ground(&self) -> bool {
    self.0.free_vars.is_empty()
  }

  /// True when every de Bruijn index is bound by an enclosing `Fun` of this term.
  #[inline(always)]
  pub fn is_closed(&self) -> bool {
    self.0.loose_bvars == 0
  }

  #[inline(always)]
  pub(crate) fn loose_bvars(&self) -> u32 {
    self.0.loose_bvars
  }

  #[inline(always)]
  pub fn is_var(&self) -> bool {
    matches!(self.0.kind, TermKind::Var(_))
  }

  pub fn as_var(&self) -> Option<VarId> {
    match self.0.kind {
      TermKind::Var(id) => Some(id),
      _ => None,
    }
  }

  #[inline(always)]
  pub fn is_true(&self) -> bool {
    matches!(self.0.kind, TermKind::Builtin(BuiltinTag::True, _))
  }

  /// The head of the application spine; `self` when not an application.
  pub fn head(&self) -> Term {
    match &self.0.kind {
      TermKind::App(head, _) => head.clone(),
      _ => self.clone(),
    }
  }

  pub fn head_symbol(&self) -> Option<Symbol> {
    match self.head().0.kind {
      TermKind::Const(ref symbol) => Some(symbol.clone()),
      _ => None,
    }
  }

  pub fn args(&self) -> &[Term] {
    match &self.0.kind {
      TermKind::App(_, args) => args,
      TermKind::Builtin(_, args) => args,
      _ => &[],
    }
  }

  // endregion Accessors

  /// Rebuilds the term with every free named variable replaced by `f(id, ty)`.
  /// Replacements must not capture bound variables; variable-for-variable renamings
  /// and closed replacements are always safe.
  pub fn map_vars<F>(&self, f: &mut F) -> Term
      where F: FnMut(VarId, &Type) -> Term
  {
    if self.is_ground() {
      return self.clone();
    }
    match &self.0.kind {
      TermKind::Var(id) => f(*id, self.ty()),
      TermKind::App(head, args) => {
        let new_head = head.map_vars(f);
        let new_args = args.iter().map(|a| a.map_vars(f)).collect();
        Term::app(new_head, new_args)
      }
      TermKind::Fun(arg_ty, body) => Term::fun(arg_ty.clone(), body.map_vars(f)),
      TermKind::Builtin(tag, args) => {
        Term::builtin(*tag, args.iter().map(|a| a.map_vars(f)).collect())
      }
      _ => self.clone(),
    }
  }

  /// Occurrence counts of each free variable, for the ordering's variable condition.
  pub fn var_occurrences(&self) -> HashMap<VarId, u32> {
    let mut counts = HashMap::new();
    self.count_vars(&mut counts);
    counts
  }

  fn count_vars(&self, counts: &mut HashMap<VarId, u32>) {
    if self.is_ground() {
      return;
    }
    match &self.0.kind {
      TermKind::Var(id) => {
        *counts.entry(*id).or_insert(0) += 1;
      }
      TermKind::App(head, args) => {
        head.count_vars(counts);
        for arg in args {
          arg.count_vars(counts);
        }
      }
      TermKind::Fun(_, body) => body.count_vars(counts),
      TermKind::Builtin(_, args) => {
        for arg in args {
          arg.count_vars(counts);
        }
      }
      _ => {}
    }
  }

  /// A total syntactic order on terms, used for canonical representations: the
  /// larger literal side first, a deterministic literal order inside a clause. Not a
  /// simplification ordering.
  pub fn syntactic_cmp(&self, other: &Term) -> std::cmp::Ordering {
    use std::cmp::Ordering as O;
    if self == other {
      return O::Equal;
    }

    fn rank(kind: &TermKind) -> u8 {
      match kind {
        TermKind::Builtin(..) => 0,
        TermKind::BVar(_) => 1,
        TermKind::Var(_) => 2,
        TermKind::Const(_) => 3,
        TermKind::App(..) => 4,
        TermKind::Fun(..) => 5,
      }
    }

    let by_rank = rank(self.kind()).cmp(&rank(other.kind()));
    if by_rank != O::Equal {
      return by_rank;
    }
    match (self.kind(), other.kind()) {
      (TermKind::Builtin(tag_a, args_a), TermKind::Builtin(tag_b, args_b)) => {
        (*tag_a as u8).cmp(&(*tag_b as u8)).then_with(|| {
          args_a.len().cmp(&args_b.len()).then_with(|| {
            args_a
              .iter()
              .zip(args_b.iter())
              .map(|(a, b)| a.syntactic_cmp(b))
              .find(|o| *o != O::Equal)
              .unwrap_or(O::Equal)
          })
        })
      }
      (TermKind::BVar(i), TermKind::BVar(j)) => {
        i.cmp(j).then_with(|| self.ty().hash_value().cmp(&other.ty().hash_value()))
      }
      (TermKind::Var(v), TermKind::Var(w)) => {
        v.cmp(w).then_with(|| self.ty().hash_value().cmp(&other.ty().hash_value()))
      }
      (TermKind::Const(f), TermKind::Const(g)) => f.index().cmp(&g.index()),
      (TermKind::App(head_a, args_a), TermKind::App(head_b, args_b)) => {
        head_a.syntactic_cmp(head_b).then_with(|| {
          args_a.len().cmp(&args_b.len()).then_with(|| {
            args_a
              .iter()
              .zip(args_b.iter())
              .map(|(a, b)| a.syntactic_cmp(b))
              .find(|o| *o != O::Equal)
              .unwrap_or(O::Equal)
          })
        })
      }
      (TermKind::Fun(ty_a, body_a), TermKind::Fun(ty_b, body_b)) => ty_a
        .hash_value()
        .cmp(&ty_b.hash_value())
        .then_with(|| body_a.syntactic_cmp(body_b)),
      _ => O::Equal,
    }
  }

  /// Structural hash with variables collapsed to a single tag; invariant under
  /// renaming. Used to pick the canonical literal order inside a clause.
  pub fn skeleton_hash(&self) -> HashType {
    match &self.0.kind {
      TermKind::Var(_) => combine_all(20, [self.ty().hash_value()]),
      TermKind::BVar(index) => combine_all(21, [*index]),
      TermKind::Const(symbol) => combine_all(22, [symbol.index()]),
      TermKind::App(head, args) => combine_all(
        23,
        std::iter::once(head.skeleton_hash()).chain(args.iter().map(|a| a.skeleton_hash())),
      ),
      TermKind::Fun(arg_ty, body) => combine_all(24, [arg_ty.hash_value(), body.skeleton_hash()]),
      TermKind::Builtin(tag, args) => combine_all(
        25,
        std::iter::once(*tag as u32).chain(args.iter().map(|a| a.skeleton_hash())),
      ),
    }
  }
}

impl PartialEq for Term {
  #[inline(always)]
  fn eq(&self, other: &Self) -> bool {
    Arc::ptr_eq(&self.0, &other.0)
  }
}

impl Eq for Term {}

impl Hash for Term {
  fn hash<H: Hasher>(&self, state: &mut H) {
    state.write_u32(self.0.hash)
  }
}

impl Formattable for Term {
  fn repr(&self, out: &mut dyn std::fmt::Write, style: FormatStyle) -> std::fmt::Result {
    match &self.0.kind {
      TermKind::Var(id) => write!(out, "X{}", id),
      TermKind::BVar(index) => write!(out, "Y{}", index),
      TermKind::Const(symbol) => symbol.repr(out, FormatStyle::Default),
      TermKind::App(head, args) => {
        head.repr(out, style)?;
        write!(out, "({})", join_string(args.iter().map(|a| format!("{}", a)), ","))
      }
      TermKind::Fun(arg_ty, body) => {
        match style {
          FormatStyle::Debug => write!(out, "λ:{}. ", arg_ty)?,
          _ => write!(out, "λ. ")?,
        }
        body.repr(out, style)
      }
      TermKind::Builtin(tag, args) => {
        write!(out, "{}", tag.name())?;
        if !args.is_empty() {
          write!(out, "({})", join_string(args.iter().map(|a| format!("{}", a)), ","))?;
        }
        Ok(())
      }
    }
  }
}

impl_display_debug_for_formattable!(Term);

#[cfg(test)]
mod tests {
  use super::*;

  fn individual_fn(name: &str, arity: usize) -> Symbol {
    let ty = Type::arrow(vec![Type::individual(); arity], Type::individual());
    Symbol::with_type(name, ty).unwrap()
  }

  #[test]
  fn hash_consing_identifies_structural_equals() {
    let f = individual_fn("term_test_f", 2);
    let a = individual_fn("term_test_a", 0);

    let t1 = Term::app(Term::constant(f.clone()), vec![Term::constant(a.clone()), Term::var(0, Type::individual())]);
    let t2 = Term::app(Term::constant(f), vec![Term::constant(a), Term::var(0, Type::individual())]);

    assert_eq!(t1, t2);
    assert!(Arc::ptr_eq(&t1.0, &t2.0));
  }

  #[test]
  fn caches_are_correct() {
    let f = individual_fn("term_test_g", 1);
    let a = individual_fn("term_test_b", 0);
    let fa = Term::app(Term::constant(f.clone()), vec![Term::constant(a)]);
    let ffa = Term::app(Term::constant(f), vec![fa.clone()]);

    assert_eq!(fa.size(), 3);
    assert_eq!(ffa.size(), 5);
    assert_eq!(ffa.depth(), 2);
    assert!(ffa.is_ground());
    assert!(ffa.is_closed());

    let x = Term::var(7, Type::individual());
    assert!(!x.is_ground());
    assert!(x.free_vars().contains(7));
  }

  #[test]
  fn application_spine_is_flattened() {
    let f = individual_fn("term_test_h", 2);
    let a = Term::constant(individual_fn("term_test_c", 0));
    let b = Term::constant(individual_fn("term_test_d", 0));

    let partial = Term::app(Term::constant(f.clone()), vec![a.clone()]);
    assert!(partial.ty().is_arrow());
    let full = Term::app(partial, vec![b.clone()]);
    let direct = Term::app(Term::constant(f), vec![a, b]);

    assert_eq!(full, direct);
    assert_eq!(full.ty(), &Type::individual());
  }

  #[test]
  fn checked_application_rejects_ill_typed_terms() {
    let p_ty = Type::arrow(vec![Type::individual()], Type::boolean());
    let p = Symbol::with_type("term_test_p", p_ty).unwrap();
    let q = Term::constant(Symbol::with_type("term_test_q", Type::boolean()).unwrap());

    let bad = Term::app_checked(Term::constant(p), vec![q]);
    assert!(matches!(bad, Err(TypeError::Mismatch { .. })));
  }

  #[test]
  fn skeleton_hash_is_renaming_invariant() {
    let f = individual_fn("term_test_k", 1);
    let t1 = Term::app(Term::constant(f.clone()), vec![Term::var(0, Type::individual())]);
    let t2 = Term::app(Term::constant(f), vec![Term::var(5, Type::individual())]);
    assert_ne!(t1, t2);
    assert_eq!(t1.skeleton_hash(), t2.skeleton_hash());
  }

  /// Builds a random term over a small signature, so repeated builds of the same
  /// shape exercise the interner's collision buckets.
  fn random_term(symbols: &[Symbol], rng: &mut impl rand::Rng, depth: usize) -> Term {
    let symbol = &symbols[rng.random_range(0..symbols.len())];
    if symbol.arity() == 0 || depth == 0 {
      if depth == 0 && symbol.arity() > 0 {
        return Term::var(rng.random_range(0..4), Type::individual());
      }
      return Term::constant(symbol.clone());
    }
    let args = (0..symbol.arity())
      .map(|_| random_term(symbols, rng, depth - 1))
      .collect();
    Term::app(Term::constant(symbol.clone()), args)
  }

  #[test]
  fn interner_survives_random_trees() {
    let symbols: Vec<Symbol> = vec![
      individual_fn("term_rand_a", 0),
      individual_fn("term_rand_f", 1),
      individual_fn("term_rand_g", 2),
      individual_fn("term_rand_h", 3),
    ];
    let mut rng = rand::rng();

    for _ in 0..200 {
      let term = random_term(&symbols, &mut rng, 4);
      // Rebuilding the same tree yields the same canonical node.
      let rebuilt = term.map_vars(&mut |var, ty| Term::var(var, ty.clone()));
      assert_eq!(term, rebuilt);
      assert!(term.size() >= 1 + term.depth());
      assert_eq!(term.is_ground(), term.free_vars().is_empty());
    }
  }
}
