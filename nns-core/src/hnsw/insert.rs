//! Insertion into the HNSW graph.
//!
//! Insertion is split into a read-only planning phase (greedy descent plus an
//! `ef_construction` search per layer) and a commit phase that links the new
//! node and prunes any neighbour pushed over its layer cap. Searches on a
//! lower layer never observe edges added on a higher one, so planning every
//! layer before committing yields the same graph as interleaving the two.

use tracing::trace;

use crate::{store::VectorStore, topk::ScoredCandidate};

use super::{
    error::HnswError,
    graph::Graph,
    params::HnswParams,
    search::{SearchContext, validated_distance},
    types::{EntryPoint, InsertionPlan, LayerPlan},
};

/// Plans HNSW insertions without mutating the graph.
#[derive(Debug)]
pub(crate) struct InsertionPlanner<'graph> {
    graph: &'graph Graph,
}

impl<'graph> InsertionPlanner<'graph> {
    pub(crate) fn new(graph: &'graph Graph) -> Self {
        Self { graph }
    }

    /// Plans the neighbours of a node with vector `query` sampled at `level`.
    ///
    /// Greedy descent runs from the entry point through every layer above
    /// `level`; each layer from `min(level, entry.level)` down to 0 is then
    /// searched with `ef_construction` and its first `M` results selected.
    pub(crate) fn plan(
        &self,
        store: &VectorStore,
        query: &[f32],
        level: usize,
        params: &HnswParams,
    ) -> Result<InsertionPlan, HnswError> {
        let entry = self.graph.entry().ok_or(HnswError::GraphEmpty)?;
        let target_level = level.min(entry.level);
        let mut current = self.greedy_descend_to_target_level(store, query, entry, target_level)?;

        let searcher = self.graph.searcher();
        let mut layers = Vec::with_capacity(target_level + 1);
        for layer in (0..=target_level).rev() {
            let mut neighbours = searcher.search_layer(
                store,
                SearchContext {
                    query,
                    entry: current,
                    layer,
                }
                .with_ef(params.ef_construction()),
            )?;
            neighbours.truncate(params.max_connections());
            // An empty selection keeps the previous entry for the next layer.
            if let Some(best) = neighbours.first() {
                current = best.id;
            }
            layers.push(LayerPlan {
                level: layer,
                neighbours,
            });
        }
        Ok(InsertionPlan { layers })
    }

    fn greedy_descend_to_target_level(
        &self,
        store: &VectorStore,
        query: &[f32],
        entry: EntryPoint,
        target_level: usize,
    ) -> Result<usize, HnswError> {
        let searcher = self.graph.searcher();
        let mut current = entry.node;
        for layer in ((target_level + 1)..=entry.level).rev() {
            current = searcher.greedy_search_layer(
                store,
                SearchContext {
                    query,
                    entry: current,
                    layer,
                },
            )?;
        }
        Ok(current)
    }
}

/// Applies `plan` for `node`: adds symmetric edges to every selected
/// neighbour, then prunes neighbours whose degree exceeds the layer cap.
pub(crate) fn commit_plan(
    graph: &mut Graph,
    store: &VectorStore,
    params: &HnswParams,
    node: usize,
    plan: InsertionPlan,
) -> Result<(), HnswError> {
    for LayerPlan { level, neighbours } in plan.layers {
        for neighbour in &neighbours {
            if neighbour.id != node {
                graph.link(node, neighbour.id, level)?;
            }
        }
        let cap = params.cap_for_layer(level);
        for neighbour in neighbours {
            trim_neighbour(graph, store, neighbour.id, level, cap)?;
        }
    }
    Ok(())
}

/// Keeps the `cap` closest neighbours of `node` on `layer`, ordered by
/// `(distance, id)`.
fn trim_neighbour(
    graph: &mut Graph,
    store: &VectorStore,
    node: usize,
    layer: usize,
    cap: usize,
) -> Result<(), HnswError> {
    let current = graph
        .neighbours(node, layer)
        .ok_or_else(|| HnswError::GraphInvariantViolation {
            message: format!("node {node} missing from layer {layer} during trim"),
        })?;
    if current.len() <= cap {
        return Ok(());
    }

    let origin = store.get(node)?;
    let mut ranked = current
        .iter()
        .map(|&target| validated_distance(store, origin, target))
        .collect::<Result<Vec<ScoredCandidate>, _>>()?;
    ranked.sort_unstable();
    let degree = ranked.len();
    let kept: Vec<usize> = ranked.into_iter().take(cap).map(|candidate| candidate.id).collect();
    trace!(node, layer, degree, cap, "pruning neighbour list");
    graph.retain_neighbours(node, layer, kept)
}
