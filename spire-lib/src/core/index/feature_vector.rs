/*!

A feature-vector index for subsumption candidate retrieval.

Each clause is summarized by a fixed-width tuple of numeric features chosen to be
monotone under subsumption: if `D` subsumes `C` then every feature of `D` is ≤ the
corresponding feature of `C`. Candidate subsumers of `C` are found by walking a trie
of feature values keeping only branches ≤ `C`'s features; candidate subsumed clauses
by the ≥ walk. Retrieval is a superset; the caller runs the real subsumption check.

*/

use std::collections::BTreeMap;

use crate::core::{
  clause::Clause,
  term::{Term, TermKind},
};

const SYMBOL_BUCKETS: usize = 4;

/// positive count, negative count, max positive depth, max negative depth, and
/// bucketed symbol-occurrence counts per sign.
pub const FV_WIDTH: usize = 4 + 2 * SYMBOL_BUCKETS;

pub type FeatureVector = [u32; FV_WIDTH];

pub fn feature_vector(clause: &Clause) -> FeatureVector {
  let mut features: FeatureVector = [0; FV_WIDTH];
  for lit in clause.lits() {
    let positive = lit.is_positive();
    let sign_slot = if positive { 0 } else { 1 };
    features[sign_slot] += 1;

    for term in lit.terms() {
      let depth_slot = 2 + sign_slot;
      features[depth_slot] = features[depth_slot].max(term.depth());
      count_symbols(&term, sign_slot, &mut features);
    }
  }
  features
}

fn count_symbols(term: &Term, sign_slot: usize, features: &mut FeatureVector) {
  if let TermKind::Const(symbol) = term.kind() {
    let bucket = symbol.index() as usize % SYMBOL_BUCKETS;
    features[4 + sign_slot * SYMBOL_BUCKETS + bucket] += 1;
  }
  for child in term.children() {
    count_symbols(&child, sign_slot, features);
  }
}

#[derive(Default)]
struct FvNode {
  children: BTreeMap<u32, FvNode>,
  clauses : Vec<Clause>,
}

/// Trie over feature vectors; clauses sit at the leaves.
#[derive(Default)]
pub struct FeatureVectorIndex {
  root: FvNode,
  len : usize,
}

impl FeatureVectorIndex {
  pub fn new() -> Self {
    Self::default()
  }

  #[inline(always)]
  pub fn len(&self) -> usize {
    self.len
  }

  pub fn insert(&mut self, clause: Clause) {
    let features = feature_vector(&clause);
    let mut node = &mut self.root;
    for value in features {
      node = node.children.entry(value).or_default();
    }
    node.clauses.push(clause);
    self.len += 1;
  }

  pub fn remove(&mut self, clause: &Clause) {
    let features = feature_vector(clause);
    let mut node = &mut self.root;
    for value in features {
      match node.children.get_mut(&value) {
        Some(child) => node = child,
        None => return,
      }
    }
    let before = node.clauses.len();
    node.clauses.retain(|c| c.id() != clause.id());
    self.len -= before - node.clauses.len();
  }

  /// Clauses whose features are ≤ the query's: the candidate subsumers.
  pub fn retrieve_subsuming(&self, features: &FeatureVector) -> Vec<Clause> {
    let mut results = Vec::new();
    Self::walk_le(&self.root, features, 0, &mut results);
    results
  }

  /// Clauses whose features are ≥ the query's: the candidates it may subsume.
  pub fn retrieve_subsumed(&self, features: &FeatureVector) -> Vec<Clause> {
    let mut results = Vec::new();
    Self::walk_ge(&self.root, features, 0, &mut results);
    results
  }

  fn walk_le(node: &FvNode, features: &FeatureVector, depth: usize, results: &mut Vec<Clause>) {
    if depth == FV_WIDTH {
      results.extend(node.clauses.iter().cloned());
      return;
    }
    for (_, child) in node.children.range(..=features[depth]) {
      Self::walk_le(child, features, depth + 1, results);
    }
  }

  fn walk_ge(node: &FvNode, features: &FeatureVector, depth: usize, results: &mut Vec<Clause>) {
    if depth == FV_WIDTH {
      results.extend(node.clauses.iter().cloned());
      return;
    }
    for (_, child) in node.children.range(features[depth]..) {
      Self::walk_ge(child, features, depth + 1, results);
    }
  }
}

/// A cheap necessary condition for `d` subsuming `c`.
pub fn features_le(d: &FeatureVector, c: &FeatureVector) -> bool {
  d.iter().zip(c.iter()).all(|(dv, cv)| dv <= cv)
}

#[cfg(test)]
mod tests {
  use crate::core::{
    clause::ClauseAttributes,
    literal::Literal,
    proof::ProofStep,
    symbol::Symbol,
    trail::Trail,
    types::Type,
  };
  use super::*;

  fn atom(name: &str, arg: Term) -> Literal {
    let ty = Type::arrow(vec![Type::individual()], Type::boolean());
    let p = Term::constant(Symbol::with_type(name, ty).unwrap());
    Literal::predicate(Term::app(p, vec![arg]), true).unwrap()
  }

  fn clause_of(lits: Vec<Literal>) -> Clause {
    Clause::new(lits, Trail::empty(), ProofStep::axiom("test"), 0, ClauseAttributes::default())
  }

  #[test]
  fn subsuming_candidates_include_the_more_general_clause() {
    let x = Term::var(0, Type::individual());
    let a = Term::constant(Symbol::with_type("fv_test_a", Type::individual()).unwrap());

    let general = clause_of(vec![atom("fv_test_p", x)]);
    let specific = clause_of(vec![
      atom("fv_test_p", a.clone()),
      atom("fv_test_q", a),
    ]);

    let mut index = FeatureVectorIndex::new();
    index.insert(general.clone());
    index.insert(specific.clone());

    let candidates = index.retrieve_subsuming(&feature_vector(&specific));
    assert!(candidates.iter().any(|c| c.id() == general.id()));

    let candidates = index.retrieve_subsumed(&feature_vector(&general));
    assert!(candidates.iter().any(|c| c.id() == specific.id()));

    index.remove(&general);
    assert_eq!(index.len(), 1);
  }
}
