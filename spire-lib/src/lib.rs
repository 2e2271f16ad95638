/*!

The saturation engine of the spire superposition prover.

The crate is split the same way the engine itself is layered:

- `core` holds the term/clause infrastructure: hash-consed types and terms, scoped
  substitutions, unification and matching, the simplification ordering, literals,
  clauses, clause indexes, proof steps, and the given-clause saturation loop.
- `api` holds the pluggable surface: the input `Statement` interface, the `Calculus`
  trait the loop drives, and the superposition calculus itself.

A front-end feeds clauses in through `api::Statement` and drives
`core::saturation::Saturation`; everything else is internal machinery.

*/

pub mod api;
pub mod core;

#[cfg(test)]
mod tests;
