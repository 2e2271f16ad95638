/*!

The simplification ordering on terms and the orderings derived from it.

A `TermOrdering` compares two terms into `{Lt, Eq, Gt, Incomparable}`, represented as
`Option<Ordering>` with `None` read as incomparable. Implementations must be
simplification orderings: total on ground terms, stable under substitution, monotone,
and with the subterm property. Two are provided, Knuth-Bendix (`Kbo`) and the
lexicographic path ordering (`Lpo`), both parameterized by a symbol `Precedence`.

The literal ordering is the multiset extension over a literal's term ends (negative
literals count their ends twice), and the clause ordering is the multiset extension of
the literal ordering.

*/

mod kbo;
mod lpo;

pub use kbo::Kbo;
pub use lpo::Lpo;

use std::{
  cmp::Ordering,
  collections::HashMap,
  fmt::Display,
};

use spire_abs::{multiset_compare, SmallVec};

use crate::core::{
  literal::Literal,
  symbol::Symbol,
  term::{Term, TermKind},
};

pub trait TermOrdering {
  fn name(&self) -> &'static str;

  /// Four-valued comparison; `None` is incomparable.
  fn compare(&self, s: &Term, t: &Term) -> Option<Ordering>;
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum OrderingKind {
  #[default]
  Kbo,
  Lpo,
}

impl Display for OrderingKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      OrderingKind::Kbo => write!(f, "kbo"),
      OrderingKind::Lpo => write!(f, "lpo"),
    }
  }
}

pub fn make_ordering(kind: OrderingKind, precedence: Precedence) -> Box<dyn TermOrdering> {
  match kind {
    OrderingKind::Kbo => Box::new(Kbo::new(precedence)),
    OrderingKind::Lpo => Box::new(Lpo::new(precedence)),
  }
}

// region Precedence

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum PrecedenceKind {
  /// Creation order of the symbols.
  #[default]
  ById,
  /// By arity, then creation order.
  Arity,
  /// Most frequent symbols are largest.
  Frequency,
  /// Most frequent symbols are smallest.
  InvFrequency,
}

impl Display for PrecedenceKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      PrecedenceKind::ById         => write!(f, "id"),
      PrecedenceKind::Arity        => write!(f, "arity"),
      PrecedenceKind::Frequency    => write!(f, "freq"),
      PrecedenceKind::InvFrequency => write!(f, "invfreq"),
    }
  }
}

/// A total precedence on symbols. Symbols missing from the rank table (interned after
/// the precedence was built, e.g. by an extension) fall back to creation order above
/// all ranked symbols.
#[derive(Default)]
pub struct Precedence {
  ranks: HashMap<u32, u32>,
}

impl Precedence {
  /// Creation order only.
  pub fn by_id() -> Precedence {
    Precedence::default()
  }

  /// Builds a precedence from per-symbol occurrence counts gathered over the input
  /// clause set.
  pub fn from_occurrences(kind: PrecedenceKind, occurrences: &HashMap<u32, u32>) -> Precedence {
    let mut symbols: Vec<Symbol> = Symbol::all();
    match kind {
      PrecedenceKind::ById => return Precedence::by_id(),
      PrecedenceKind::Arity => {
        symbols.sort_by_key(|s| (s.arity(), s.index()));
      }
      PrecedenceKind::Frequency => {
        symbols.sort_by_key(|s| (occurrences.get(&s.index()).copied().unwrap_or(0), s.index()));
      }
      PrecedenceKind::InvFrequency => {
        symbols.sort_by_key(|s| {
          (u32::MAX - occurrences.get(&s.index()).copied().unwrap_or(0), s.index())
        });
      }
    }

    let mut ranks = HashMap::with_capacity(symbols.len());
    for (rank, symbol) in symbols.iter().enumerate() {
      ranks.insert(symbol.index(), rank as u32);
    }
    Precedence { ranks }
  }

  /// Comparison key; late symbols sort above every ranked one.
  #[inline(always)]
  fn key(&self, symbol: &Symbol) -> (u64, u32) {
    match self.ranks.get(&symbol.index()) {
      Some(rank) => (*rank as u64, symbol.index()),
      None => (u32::MAX as u64 + symbol.index() as u64, symbol.index()),
    }
  }

  #[inline(always)]
  pub fn compare(&self, a: &Symbol, b: &Symbol) -> Ordering {
    self.key(a).cmp(&self.key(b))
  }
}

// endregion Precedence

// region Heads

/// The rigid head of a term for precedence comparison. Builtins sort below all
/// symbols; bound variables and abstractions sort above.
pub(crate) enum OrderingHead {
  Builtin(u8),
  Symbol(Symbol),
  Bound(u32),
  Lambda(u32),
}

impl OrderingHead {
  fn rank(&self) -> u8 {
    match self {
      OrderingHead::Builtin(_) => 0,
      OrderingHead::Symbol(_)  => 1,
      OrderingHead::Bound(_)   => 2,
      OrderingHead::Lambda(_)  => 3,
    }
  }
}

/// `None` for variable-headed terms, which no precedence can order.
pub(crate) fn head_of(term: &Term) -> Option<OrderingHead> {
  match term.head().kind() {
    TermKind::Const(symbol) => Some(OrderingHead::Symbol(symbol.clone())),
    TermKind::Builtin(tag, _) => Some(OrderingHead::Builtin(*tag as u8)),
    TermKind::BVar(index) => Some(OrderingHead::Bound(*index)),
    TermKind::Fun(arg_ty, _) => Some(OrderingHead::Lambda(arg_ty.hash_value())),
    _ => None,
  }
}

pub(crate) fn compare_heads(precedence: &Precedence, a: &OrderingHead, b: &OrderingHead) -> Ordering {
  match (a, b) {
    (OrderingHead::Builtin(tag_a), OrderingHead::Builtin(tag_b)) => tag_a.cmp(tag_b),
    (OrderingHead::Symbol(sym_a), OrderingHead::Symbol(sym_b)) => precedence.compare(sym_a, sym_b),
    (OrderingHead::Bound(i), OrderingHead::Bound(j)) => i.cmp(j),
    (OrderingHead::Lambda(h1), OrderingHead::Lambda(h2)) => h1.cmp(h2),
    _ => a.rank().cmp(&b.rank()),
  }
}

/// The subterms an ordering recurses into: arguments for applications and builtins,
/// the body for abstractions. The head is accounted for by `compare_heads`.
pub(crate) fn ordered_children(term: &Term) -> SmallVec<[Term; 4]> {
  match term.kind() {
    TermKind::App(_, args) => args.iter().cloned().collect(),
    TermKind::Builtin(_, args) => args.iter().cloned().collect(),
    TermKind::Fun(_, body) => {
      let mut children = SmallVec::new();
      children.push(body.clone());
      children
    }
    _ => SmallVec::new(),
  }
}

// endregion Heads

// region Derived orderings

/// The multiset extension over the literal's term ends.
pub fn compare_literals(ord: &dyn TermOrdering, a: &Literal, b: &Literal) -> Option<Ordering> {
  let ms_a = a.multiset_view();
  let ms_b = b.multiset_view();
  multiset_compare(&ms_a, &ms_b, |s, t| ord.compare(s, t))
}

/// The multiset extension of the literal ordering.
pub fn compare_clause_literals(
  ord: &dyn TermOrdering,
  a: &[Literal],
  b: &[Literal],
) -> Option<Ordering> {
  multiset_compare(a, b, |l1, l2| compare_literals(ord, l1, l2))
}

/// No literal of the clause is strictly greater than `lits[index]`.
pub fn literal_is_maximal(ord: &dyn TermOrdering, lits: &[Literal], index: usize) -> bool {
  lits.iter().enumerate().all(|(other, lit)| {
    other == index || compare_literals(ord, lit, &lits[index]) != Some(Ordering::Greater)
  })
}

/// No other literal is greater than or equal to `lits[index]`.
pub fn literal_is_strictly_maximal(ord: &dyn TermOrdering, lits: &[Literal], index: usize) -> bool {
  lits.iter().enumerate().all(|(other, lit)| {
    other == index
      || !matches!(
        compare_literals(ord, lit, &lits[index]),
        Some(Ordering::Greater) | Some(Ordering::Equal)
      )
  })
}

// endregion Derived orderings
