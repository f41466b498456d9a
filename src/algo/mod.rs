//! Graph algorithms over the `GraphStore` hierarchy
//!
//! Algorithms here mutate the hierarchy in place rather than returning a
//! separate result structure, so the simplifiers can hand the outcome
//! straight to renderers.

pub mod louvain;

pub use louvain::{modularity, Louvain, LouvainOutcome};
