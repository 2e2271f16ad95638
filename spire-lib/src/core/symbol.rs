/*!

Interned function symbols and the problem signature.

All symbols are created through `Symbol::new()`, which interns by name in a
process-wide signature. Each symbol gets a creation-order index; the index doubles as
the default precedence and as the comparison key wherever a total order on symbols is
needed. The signature only ever grows.

*/

use std::{
  collections::HashMap,
  fmt::Display,
  hash::{Hash, Hasher},
  sync::{Arc, Mutex},
};

use enumflags2::{bitflags, BitFlags};
use once_cell::sync::Lazy;
use spire_abs::{int_to_subscript, IString};

use crate::core::{
  format::{FormatStyle, Formattable},
  types::Type,
};
use crate::impl_display_debug_for_formattable;

#[bitflags]
#[repr(u8)]
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SymbolAttribute {
  /// Introduced by Skolemization in the preprocessor.
  Skolem,
  /// Introduced by the prover itself (definitions, pruning).
  Introduced,
  /// Carries interpreted meaning (`⊤`-like constants declared by extensions).
  Interpreted,
}

pub type SymbolAttributes = BitFlags<SymbolAttribute>;

/// Interning a name twice with incompatible types is a fatal signature error.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SignatureClash {
  pub name    : IString,
  pub existing: Type,
  pub new     : Type,
}

impl Display for SignatureClash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(
      f,
      "symbol {} redeclared with type {} (previously {})",
      self.name, self.new, self.existing
    )
  }
}

impl std::error::Error for SignatureClash {}

pub struct SymbolData {
  pub name      : IString,
  pub ty        : Type,
  pub attributes: SymbolAttributes,

  /// Unique creation-order index, also the default precedence key.
  index: u32,
}

/// An interned symbol handle. Equality and hashing go through the creation index.
#[derive(Clone)]
pub struct Symbol(Arc<SymbolData>);

#[derive(Default)]
struct SignatureInner {
  by_name: HashMap<IString, Symbol>,
  all    : Vec<Symbol>,
}

static SIGNATURE: Lazy<Mutex<SignatureInner>> = Lazy::new(|| Mutex::new(SignatureInner::default()));

impl Symbol {
  /// Interns a symbol. Re-interning an existing name returns the existing symbol when
  /// the types agree and fails otherwise.
  pub fn new<S: AsRef<str>>(name: S, ty: Type, attributes: SymbolAttributes) -> Result<Symbol, SignatureClash> {
    let name = IString::from(name.as_ref());
    let mut signature = SIGNATURE.lock().unwrap();

    if let Some(existing) = signature.by_name.get(&name) {
      if existing.ty() == &ty {
        return Ok(existing.clone());
      }
      return Err(SignatureClash {
        name,
        existing: existing.ty().clone(),
        new: ty,
      });
    }

    let index = signature.all.len() as u32;
    let symbol = Symbol(Arc::new(SymbolData { name: name.clone(), ty, attributes, index }));
    signature.by_name.insert(name, symbol.clone());
    signature.all.push(symbol.clone());
    Ok(symbol)
  }

  #[inline(always)]
  pub fn with_type<S: AsRef<str>>(name: S, ty: Type) -> Result<Symbol, SignatureClash> {
    Symbol::new(name, ty, SymbolAttributes::default())
  }

  pub fn lookup(name: &str) -> Option<Symbol> {
    SIGNATURE.lock().unwrap().by_name.get(&IString::from(name)).cloned()
  }

  /// Snapshot of every symbol interned so far, in creation order.
  pub fn all() -> Vec<Symbol> {
    SIGNATURE.lock().unwrap().all.clone()
  }

  // region Accessors

  #[inline(always)]
  pub fn name(&self) -> &IString {
    &self.0.name
  }

  #[inline(always)]
  pub fn ty(&self) -> &Type {
    &self.0.ty
  }

  #[inline(always)]
  pub fn attributes(&self) -> SymbolAttributes {
    self.0.attributes
  }

  /// Number of arguments the symbol expects.
  #[inline(always)]
  pub fn arity(&self) -> usize {
    self.0.ty.arity()
  }

  #[inline(always)]
  pub fn index(&self) -> u32 {
    self.0.index
  }

  // endregion Accessors

  /// Total order by creation index; precedence generators refine this.
  #[inline(always)]
  pub fn compare(&self, other: &Symbol) -> std::cmp::Ordering {
    self.0.index.cmp(&other.0.index)
  }
}

impl PartialEq for Symbol {
  #[inline(always)]
  fn eq(&self, other: &Self) -> bool {
    self.0.index == other.0.index
  }
}

impl Eq for Symbol {}

impl Hash for Symbol {
  fn hash<H: Hasher>(&self, state: &mut H) {
    state.write_u32(self.0.index)
  }
}

impl Formattable for Symbol {
  fn repr(&self, out: &mut dyn std::fmt::Write, style: FormatStyle) -> std::fmt::Result {
    match style {
      FormatStyle::Debug => write!(out, "{}{}", self.0.name, int_to_subscript(self.arity() as u32)),
      _ => write!(out, "{}", self.0.name),
    }
  }
}

impl_display_debug_for_formattable!(Symbol);

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn interning_by_name() {
    let ty = Type::arrow(vec![Type::individual()], Type::individual());
    let f1 = Symbol::with_type("sym_test_f", ty.clone()).unwrap();
    let f2 = Symbol::with_type("sym_test_f", ty).unwrap();
    assert_eq!(f1, f2);
    assert_eq!(f1.arity(), 1);
  }

  #[test]
  fn clash_on_incompatible_redeclaration() {
    let f = Symbol::with_type("sym_test_clash", Type::individual()).unwrap();
    let clash = Symbol::with_type("sym_test_clash", Type::boolean());
    assert!(clash.is_err());
    assert_eq!(f.ty(), &Type::individual());
  }
}
