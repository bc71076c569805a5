//! Types shared by HNSW construction and search.

use crate::topk::ScoredCandidate;

/// Entry point into the hierarchical graph used when searching.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct EntryPoint {
    pub(crate) node: usize,
    pub(crate) level: usize,
}

/// Neighbours selected for a new node on one layer.
#[derive(Clone, Debug)]
pub(crate) struct LayerPlan {
    pub(crate) level: usize,
    pub(crate) neighbours: Vec<ScoredCandidate>,
}

/// Planned edges for a new node, highest layer first.
#[derive(Clone, Debug, Default)]
pub(crate) struct InsertionPlan {
    pub(crate) layers: Vec<LayerPlan>,
}
