/*!

Clause and term indexes.

- The fingerprint index maps terms to payloads and answers "which stored terms could
  unify with / generalize / specialize this query" by comparing fingerprints, small
  feature tuples sampled at a fixed set of positions. Retrieval is a superset of the
  true answer; callers re-check with real unification or matching.
- The feature-vector index stores clauses under a tuple of cheap numeric features
  that are monotone under subsumption, so subsumption candidate retrieval in either
  direction is a bounded trie walk.

*/

mod feature_vector;
mod fingerprint;

pub use feature_vector::{feature_vector, features_le, FeatureVector, FeatureVectorIndex};
pub use fingerprint::{FingerprintIndex, FpFeature};
