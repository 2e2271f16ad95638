/*!

Hash-consed types. A type is one of

- a type variable `Var(n)`,
- an applied type constructor `App(name, args)` such as `ι` or `list(α)`,
- a function type `Arrow(params, return)`,
- `TType`, the type of types, used by type declarations themselves.

Structurally equal types share one physical representation, so type equality is a
pointer comparison. The interning table is process-wide and monotone; types are never
collected.

*/

use std::{
  collections::HashMap,
  fmt::Display,
  hash::{Hash, Hasher},
  sync::{Arc, Mutex},
};

use once_cell::sync::Lazy;
use spire_abs::{
  hash::{combine_all, hash_str, HashType},
  join_string,
  IString,
  SmallVec,
};

use crate::core::format::{FormatStyle, Formattable};
use crate::impl_display_debug_for_formattable;

/// Fatal typing failure; aborts the problem (parse-time or intake-time).
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum TypeError {
  /// A function applied to the wrong number of arguments.
  ArityMismatch { context: String, expected: usize, found: usize },
  /// Two positions that must agree in type do not.
  Mismatch { context: String, expected: Type, found: Type },
  /// Application of a term whose type is not an arrow.
  NotAFunction { context: String, found: Type },
}

impl Display for TypeError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      TypeError::ArityMismatch { context, expected, found } => {
        write!(f, "type error in {}: expected {} arguments, found {}", context, expected, found)
      }
      TypeError::Mismatch { context, expected, found } => {
        write!(f, "type error in {}: expected type {}, found {}", context, expected, found)
      }
      TypeError::NotAFunction { context, found } => {
        write!(f, "type error in {}: {} is not a function type", context, found)
      }
    }
  }
}

impl std::error::Error for TypeError {}

pub enum TypeKind {
  Var(u32),
  App(IString, SmallVec<[Type; 2]>),
  Arrow(SmallVec<[Type; 2]>, Type),
  TType,
}

pub struct TypeNode {
  kind: TypeKind,
  hash: HashType,
}

/// A canonical, hash-consed type. Clones are cheap handle copies.
#[derive(Clone)]
pub struct Type(Arc<TypeNode>);

static TYPE_CONS: Lazy<Mutex<HashMap<HashType, Vec<Type>>>> = Lazy::new(|| Mutex::new(HashMap::new()));

impl Type {
  // region Constructors

  pub fn var(index: u32) -> Type {
    let hash = combine_all(1, [index]);
    Self::intern(TypeKind::Var(index), hash)
  }

  pub fn con<S: AsRef<str>>(name: S, args: Vec<Type>) -> Type {
    let name = IString::from(name.as_ref());
    let hash = combine_all(2, std::iter::once(hash_str(&name)).chain(args.iter().map(|a| a.hash_value())));
    Self::intern(TypeKind::App(name, SmallVec::from_vec(args)), hash)
  }

  /// `arrow([], ret)` is `ret` itself: a nullary function type collapses to its range.
  pub fn arrow(params: Vec<Type>, ret: Type) -> Type {
    if params.is_empty() {
      return ret;
    }
    let hash = combine_all(3, params.iter().chain(std::iter::once(&ret)).map(|t| t.hash_value()));
    Self::intern(TypeKind::Arrow(SmallVec::from_vec(params), ret), hash)
  }

  pub fn ttype() -> Type {
    Self::intern(TypeKind::TType, combine_all(4, std::iter::empty::<HashType>()))
  }

  /// The default type of individuals, `ι`.
  pub fn individual() -> Type {
    Self::con("ι", vec![])
  }

  /// The type of propositions, `ο`. Predicate atoms are equations at this type.
  pub fn boolean() -> Type {
    Self::con("ο", vec![])
  }

  fn intern(kind: TypeKind, hash: HashType) -> Type {
    let mut table = TYPE_CONS.lock().unwrap();
    let bucket = table.entry(hash).or_default();
    for existing in bucket.iter() {
      if existing.shallow_eq(&kind) {
        return existing.clone();
      }
    }
    let new_type = Type(Arc::new(TypeNode { kind, hash }));
    bucket.push(new_type.clone());
    new_type
  }

  /// Structural comparison against a candidate node whose children are already
  /// canonical, so child comparison is pointer identity.
  fn shallow_eq(&self, kind: &TypeKind) -> bool {
    match (&self.0.kind, kind) {
      (TypeKind::Var(a), TypeKind::Var(b)) => a == b,
      (TypeKind::App(name_a, args_a), TypeKind::App(name_b, args_b)) => {
        name_a == name_b && args_a == args_b
      }
      (TypeKind::Arrow(params_a, ret_a), TypeKind::Arrow(params_b, ret_b)) => {
        ret_a == ret_b && params_a == params_b
      }
      (TypeKind::TType, TypeKind::TType) => true,
      _ => false,
    }
  }

  // endregion Constructors

  // region Accessors

  #[inline(always)]
  pub fn kind(&self) -> &TypeKind {
    &self.0.kind
  }

  #[inline(always)]
  pub fn hash_value(&self) -> HashType {
    self.0.hash
  }

  #[inline(always)]
  pub fn is_arrow(&self) -> bool {
    matches!(self.0.kind, TypeKind::Arrow(..))
  }

  /// Splits a function type into its parameter types and range. A non-arrow type is a
  /// nullary function onto itself.
  pub fn arrow_parts(&self) -> (&[Type], &Type) {
    match &self.0.kind {
      TypeKind::Arrow(params, ret) => (params, ret),
      _ => (&[], self),
    }
  }

  pub fn arity(&self) -> usize {
    self.arrow_parts().0.len()
  }

  // endregion Accessors

  /// Applies a type-variable substitution, interning the result. With a monomorphic
  /// signature this is the identity; it exists so instantiation preserves
  /// `type(tσ) = type(t)σ`.
  pub fn substitute(&self, map: &HashMap<u32, Type>) -> Type {
    match &self.0.kind {
      TypeKind::Var(index) => match map.get(index) {
        Some(replacement) => replacement.clone(),
        None => self.clone(),
      },
      TypeKind::App(name, args) => {
        Type::con(name.as_ref(), args.iter().map(|a| a.substitute(map)).collect())
      }
      TypeKind::Arrow(params, ret) => Type::arrow(
        params.iter().map(|p| p.substitute(map)).collect(),
        ret.substitute(map),
      ),
      TypeKind::TType => self.clone(),
    }
  }
}

impl PartialEq for Type {
  #[inline(always)]
  fn eq(&self, other: &Self) -> bool {
    Arc::ptr_eq(&self.0, &other.0)
  }
}

impl Eq for Type {}

impl Hash for Type {
  fn hash<H: Hasher>(&self, state: &mut H) {
    state.write_u32(self.0.hash)
  }
}

impl Formattable for Type {
  fn repr(&self, out: &mut dyn std::fmt::Write, style: FormatStyle) -> std::fmt::Result {
    match &self.0.kind {
      TypeKind::Var(index) => write!(out, "α{}", index),
      TypeKind::App(name, args) => {
        if args.is_empty() {
          write!(out, "{}", name)
        } else {
          write!(out, "{}({})", name, join_string(args.iter().map(|a| format!("{}", a)), ", "))
        }
      }
      TypeKind::Arrow(params, ret) => {
        let rendered = join_string(params.iter().map(|p| format!("{}", p)), " × ");
        match style {
          FormatStyle::Debug => write!(out, "({} → {})", rendered, ret),
          _ => write!(out, "{} → {}", rendered, ret),
        }
      }
      TypeKind::TType => write!(out, "$tType"),
    }
  }
}

impl_display_debug_for_formattable!(Type);
