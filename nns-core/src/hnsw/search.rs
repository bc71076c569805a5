//! Layer search routines for the HNSW graph.
//!
//! Implements best-first per-layer search and the `ef = 1` greedy descent
//! built on it. Distances are squared Euclidean; non-finite values are
//! rejected before they can pollute the traversal state.

use std::{
    cmp::Reverse,
    collections::{BinaryHeap, HashSet},
};

use crate::{store::VectorStore, topk::ScoredCandidate};

use super::{error::HnswError, graph::Graph};

/// Query and starting point for a single-layer search.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SearchContext<'q> {
    pub(crate) query: &'q [f32],
    pub(crate) entry: usize,
    pub(crate) layer: usize,
}

impl<'q> SearchContext<'q> {
    pub(crate) fn with_ef(self, ef: usize) -> ExtendedSearchContext<'q> {
        ExtendedSearchContext { inner: self, ef }
    }
}

/// [`SearchContext`] with a beam width.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ExtendedSearchContext<'q> {
    inner: SearchContext<'q>,
    ef: usize,
}

#[derive(Debug)]
struct SearchState {
    visited: HashSet<usize>,
    candidates: BinaryHeap<Reverse<ScoredCandidate>>,
    best: BinaryHeap<ScoredCandidate>,
}

impl SearchState {
    fn new(entry: ScoredCandidate) -> Self {
        Self {
            visited: HashSet::from([entry.id]),
            candidates: BinaryHeap::from([Reverse(entry)]),
            best: BinaryHeap::from([entry]),
        }
    }

    fn pop_candidate(&mut self) -> Option<ScoredCandidate> {
        self.candidates.pop().map(|Reverse(candidate)| candidate)
    }

    fn should_terminate(&self, ef: usize, candidate: &ScoredCandidate) -> bool {
        self.best.len() >= ef && self.best.peek().is_some_and(|furthest| candidate > furthest)
    }

    fn visit(&mut self, node: usize) -> bool {
        self.visited.insert(node)
    }

    fn try_enqueue(&mut self, candidate: ScoredCandidate, ef: usize) {
        if self.best.len() >= ef && self.best.peek().is_some_and(|furthest| candidate >= *furthest) {
            return;
        }
        self.candidates.push(Reverse(candidate));
        self.best.push(candidate);
        self.enforce_capacity(ef);
    }

    fn enforce_capacity(&mut self, ef: usize) {
        while self.best.len() > ef {
            self.best.pop();
        }
    }

    fn finalise(self) -> Vec<ScoredCandidate> {
        self.best.into_sorted_vec()
    }
}

#[derive(Debug)]
pub(crate) struct LayerSearcher<'graph> {
    graph: &'graph Graph,
}

impl<'graph> LayerSearcher<'graph> {
    pub(crate) fn new(graph: &'graph Graph) -> Self {
        Self { graph }
    }

    /// Follows the single closest node on `ctx.layer`, starting at
    /// `ctx.entry`, until no neighbour improves on it.
    pub(crate) fn greedy_search_layer(
        &self,
        store: &VectorStore,
        ctx: SearchContext<'_>,
    ) -> Result<usize, HnswError> {
        let closest = self.search_layer(store, ctx.with_ef(1))?;
        Ok(closest.first().map_or(ctx.entry, |candidate| candidate.id))
    }

    /// Returns up to `ef` nodes of `ctx.layer` closest to the query, sorted
    /// ascending by `(distance, id)`.
    pub(crate) fn search_layer(
        &self,
        store: &VectorStore,
        ctx: ExtendedSearchContext<'_>,
    ) -> Result<Vec<ScoredCandidate>, HnswError> {
        let ExtendedSearchContext {
            inner: SearchContext {
                query,
                entry,
                layer,
            },
            ef,
        } = ctx;
        let ef = ef.max(1);
        let mut state = SearchState::new(validated_distance(store, query, entry)?);

        while let Some(current) = state.pop_candidate() {
            if state.should_terminate(ef, &current) {
                break;
            }

            let Some(neighbours) = self.graph.neighbours(current.id, layer) else {
                return Err(HnswError::GraphInvariantViolation {
                    message: format!(
                        "node {} missing during layer search at layer {layer}",
                        current.id
                    ),
                });
            };

            for &neighbour in neighbours {
                if !state.visit(neighbour) {
                    continue;
                }
                let candidate = validated_distance(store, query, neighbour)?;
                state.try_enqueue(candidate, ef);
            }
        }
        Ok(state.finalise())
    }
}

/// Squared distance from `query` to node `id`, rejecting non-finite values.
pub(crate) fn validated_distance(
    store: &VectorStore,
    query: &[f32],
    id: usize,
) -> Result<ScoredCandidate, HnswError> {
    let distance = store.distance_unchecked(id, query)?;
    if !distance.is_finite() {
        return Err(HnswError::NonFiniteDistance { node: id });
    }
    Ok(ScoredCandidate::new(distance, id))
}
