/*!

Literals are signed equations `s ≈ t` / `s ≉ t`, plus the two degenerate literals
`True` and `False` produced by simplification. A propositional atom `p(x̄)` is stored
as the equation `p(x̄) ≈ ⊤`; nothing downstream ever sees a separate predicate form.

An equation's sides are stored in a canonical syntactic order, and the comparison of
the two sides under the active term ordering is cached in a `Cell` the first time it
is asked for. The cache is dropped whenever the ordering changes.

*/

use std::{
  cell::Cell,
  cmp::Ordering,
  hash::{Hash, Hasher},
};

use spire_abs::{
  hash::{combine_all, HashType},
  NatSet,
  SmallVec,
};

use crate::core::{
  format::{FormatStyle, Formattable},
  ordering::TermOrdering,
  substitution::{Renaming, Scope, Subst},
  term::Term,
  types::TypeError,
};
use crate::impl_display_debug_for_formattable;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum OrientCache {
  Unknown,
  Greater,
  Less,
  Equal,
  Incomparable,
}

impl OrientCache {
  fn from_comparison(comparison: Option<Ordering>) -> OrientCache {
    match comparison {
      Some(Ordering::Greater) => OrientCache::Greater,
      Some(Ordering::Less)    => OrientCache::Less,
      Some(Ordering::Equal)   => OrientCache::Equal,
      None                    => OrientCache::Incomparable,
    }
  }

  fn to_comparison(self) -> Option<Option<Ordering>> {
    match self {
      OrientCache::Unknown      => None,
      OrientCache::Greater      => Some(Some(Ordering::Greater)),
      OrientCache::Less         => Some(Some(Ordering::Less)),
      OrientCache::Equal        => Some(Some(Ordering::Equal)),
      OrientCache::Incomparable => Some(None),
    }
  }
}

#[derive(Clone)]
pub struct EqLiteral {
  lhs     : Term,
  rhs     : Term,
  positive: bool,
  /// Comparison of `lhs` against `rhs` under the active ordering.
  orientation: Cell<OrientCache>,
}

impl EqLiteral {
  #[inline(always)]
  pub fn lhs(&self) -> &Term {
    &self.lhs
  }

  #[inline(always)]
  pub fn rhs(&self) -> &Term {
    &self.rhs
  }

  #[inline(always)]
  pub fn is_positive(&self) -> bool {
    self.positive
  }

  /// Cached comparison of the sides under `ord`.
  pub fn orientation(&self, ord: &dyn TermOrdering) -> Option<Ordering> {
    if let Some(cached) = self.orientation.get().to_comparison() {
      return cached;
    }
    let comparison = ord.compare(&self.lhs, &self.rhs);
    self.orientation.set(OrientCache::from_comparison(comparison));
    comparison
  }

  /// Is this a predicate atom, i.e. an equation against `⊤`?
  pub fn is_predicate(&self) -> bool {
    self.rhs.is_true()
  }
}

#[derive(Clone)]
pub enum Literal {
  Equation(EqLiteral),
  True,
  False,
}

impl Literal {
  /// Builds a signed equation. The sides must be typed identically; they are stored
  /// in canonical syntactic order, larger side first.
  pub fn equation(lhs: Term, rhs: Term, positive: bool) -> Result<Literal, TypeError> {
    if lhs.ty() != rhs.ty() {
      return Err(TypeError::Mismatch {
        context: format!("{} ≈ {}", lhs, rhs),
        expected: lhs.ty().clone(),
        found: rhs.ty().clone(),
      });
    }
    Ok(Self::equation_unchecked(lhs, rhs, positive))
  }

  /// Equation constructor for terms produced inside the engine, where typing is
  /// guaranteed by construction.
  pub fn equation_unchecked(lhs: Term, rhs: Term, positive: bool) -> Literal {
    debug_assert!(lhs.ty() == rhs.ty(), "equation between distinct types");
    let (lhs, rhs) = if lhs.syntactic_cmp(&rhs) == Ordering::Less {
      (rhs, lhs)
    } else {
      (lhs, rhs)
    };
    Literal::Equation(EqLiteral {
      lhs,
      rhs,
      positive,
      orientation: Cell::new(OrientCache::Unknown),
    })
  }

  /// A predicate atom `p(x̄)`, encoded as `p(x̄) ≈ ⊤`. The atom is syntactically
  /// larger than `⊤`, so it always ends up on the left and the orientation is known.
  pub fn predicate(atom: Term, positive: bool) -> Result<Literal, TypeError> {
    let literal = Literal::equation(atom, Term::true_(), positive)?;
    if let Literal::Equation(eq) = &literal {
      eq.orientation.set(OrientCache::Greater);
    }
    Ok(literal)
  }

  // region Accessors

  pub fn as_equation(&self) -> Option<&EqLiteral> {
    match self {
      Literal::Equation(eq) => Some(eq),
      _ => None,
    }
  }

  pub fn is_positive(&self) -> bool {
    match self {
      Literal::Equation(eq) => eq.positive,
      Literal::True => true,
      Literal::False => false,
    }
  }

  #[inline(always)]
  pub fn is_negative(&self) -> bool {
    !self.is_positive()
  }

  /// `s ≈ s` or the `True` literal; such a literal makes its clause a tautology.
  pub fn is_trivially_true(&self) -> bool {
    match self {
      Literal::Equation(eq) => eq.positive && eq.lhs == eq.rhs,
      Literal::True => true,
      Literal::False => false,
    }
  }

  /// `s ≉ s` or the `False` literal; such a literal can be dropped from its clause.
  pub fn is_trivially_false(&self) -> bool {
    match self {
      Literal::Equation(eq) => !eq.positive && eq.lhs == eq.rhs,
      Literal::False => true,
      Literal::True => false,
    }
  }

  pub fn negate(&self) -> Literal {
    match self {
      Literal::Equation(eq) => Literal::Equation(EqLiteral {
        lhs: eq.lhs.clone(),
        rhs: eq.rhs.clone(),
        positive: !eq.positive,
        orientation: eq.orientation.clone(),
      }),
      Literal::True => Literal::False,
      Literal::False => Literal::True,
    }
  }

  /// Same equation, opposite sign.
  pub fn is_complement_of(&self, other: &Literal) -> bool {
    match (self, other) {
      (Literal::Equation(a), Literal::Equation(b)) => {
        a.positive != b.positive && a.lhs == b.lhs && a.rhs == b.rhs
      }
      (Literal::True, Literal::False) | (Literal::False, Literal::True) => true,
      _ => false,
    }
  }

  pub fn terms(&self) -> SmallVec<[Term; 2]> {
    match self {
      Literal::Equation(eq) => {
        let mut terms = SmallVec::new();
        terms.push(eq.lhs.clone());
        terms.push(eq.rhs.clone());
        terms
      }
      _ => SmallVec::new(),
    }
  }

  pub fn free_vars(&self) -> NatSet {
    let mut vars = NatSet::new();
    for term in self.terms() {
      vars.union_in_place(term.free_vars());
    }
    vars
  }

  /// Symbol-count weight used by the passive queue heuristic.
  pub fn weight(&self) -> u32 {
    match self {
      Literal::Equation(eq) => eq.lhs.size() + eq.rhs.size(),
      _ => 1,
    }
  }

  pub fn hash_value(&self) -> HashType {
    match self {
      Literal::Equation(eq) => combine_all(
        30 + eq.positive as u32,
        [eq.lhs.hash_value(), eq.rhs.hash_value()],
      ),
      Literal::True => combine_all(32, std::iter::empty::<HashType>()),
      Literal::False => combine_all(33, std::iter::empty::<HashType>()),
    }
  }

  // endregion Accessors

  /// The term multiset the literal ordering compares: positive ends once, negative
  /// ends twice; the degenerate literals contribute their builtin constant.
  pub fn multiset_view(&self) -> SmallVec<[Term; 4]> {
    match self {
      Literal::Equation(eq) => {
        let mut view = SmallVec::new();
        view.push(eq.lhs.clone());
        view.push(eq.rhs.clone());
        if !eq.positive {
          view.push(eq.lhs.clone());
          view.push(eq.rhs.clone());
        }
        view
      }
      Literal::True => {
        let mut view = SmallVec::new();
        view.push(Term::true_());
        view
      }
      Literal::False => {
        let mut view = SmallVec::new();
        view.push(Term::false_());
        view
      }
    }
  }

  /// Applies a substitution to both sides, renaming into the output namespace.
  pub fn apply(&self, subst: &Subst, renaming: &mut Renaming, scope: Scope) -> Literal {
    match self {
      Literal::Equation(eq) => Literal::equation_unchecked(
        subst.apply(renaming, &eq.lhs, scope),
        subst.apply(renaming, &eq.rhs, scope),
        eq.positive,
      ),
      _ => self.clone(),
    }
  }

  /// Applies a substitution in place, leaving unbound variables alone.
  pub fn apply_no_renaming(&self, subst: &Subst, scope: Scope) -> Literal {
    match self {
      Literal::Equation(eq) => Literal::equation_unchecked(
        subst.apply_no_renaming(&eq.lhs, scope),
        subst.apply_no_renaming(&eq.rhs, scope),
        eq.positive,
      ),
      _ => self.clone(),
    }
  }

  /// Rebuilds the literal with every free variable replaced through `f`.
  pub fn map_vars<F>(&self, f: &mut F) -> Literal
      where F: FnMut(crate::core::term::VarId, &crate::core::types::Type) -> Term
  {
    match self {
      Literal::Equation(eq) => {
        Literal::equation_unchecked(eq.lhs.map_vars(f), eq.rhs.map_vars(f), eq.positive)
      }
      _ => self.clone(),
    }
  }

  /// Drops the cached orientation, e.g. after the ordering configuration changed.
  pub fn invalidate_orientation(&self) {
    if let Literal::Equation(eq) = self {
      eq.orientation.set(OrientCache::Unknown);
    }
  }
}

impl PartialEq for Literal {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (Literal::Equation(a), Literal::Equation(b)) => {
        a.positive == b.positive && a.lhs == b.lhs && a.rhs == b.rhs
      }
      (Literal::True, Literal::True) | (Literal::False, Literal::False) => true,
      _ => false,
    }
  }
}

impl Eq for Literal {}

impl Hash for Literal {
  fn hash<H: Hasher>(&self, state: &mut H) {
    state.write_u32(self.hash_value())
  }
}

impl Formattable for Literal {
  fn repr(&self, out: &mut dyn std::fmt::Write, style: FormatStyle) -> std::fmt::Result {
    match self {
      Literal::Equation(eq) => {
        if eq.is_predicate() {
          if !eq.positive {
            write!(out, "¬")?;
          }
          return eq.lhs.repr(out, style);
        }
        eq.lhs.repr(out, style)?;
        write!(out, " {} ", if eq.positive { "≈" } else { "≉" })?;
        eq.rhs.repr(out, style)
      }
      Literal::True => write!(out, "$true"),
      Literal::False => write!(out, "$false"),
    }
  }
}

impl_display_debug_for_formattable!(Literal);
