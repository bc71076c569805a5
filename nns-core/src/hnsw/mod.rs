//! Hierarchical Navigable Small World (HNSW) graph for approximate nearest
//! neighbour search under squared Euclidean distance.
//!
//! Nodes are assigned a random level on insertion and linked to their closest
//! neighbours on every layer up to that level. Queries descend greedily
//! through the sparse upper layers and finish with a beam search on layer 0.

mod error;
mod graph;
mod index;
mod insert;
mod invariants;
mod params;
mod search;
mod types;

pub use self::{
    error::{HnswError, HnswErrorCode},
    index::HnswIndex,
    invariants::{HnswInvariant, HnswInvariantChecker, HnswInvariantViolation},
    params::HnswParams,
};

#[cfg(test)]
mod tests;
