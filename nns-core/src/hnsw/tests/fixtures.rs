//! Shared fixtures and helpers for HNSW tests.

use rand::{SeedableRng, rngs::SmallRng};

use crate::{
    hnsw::{HnswIndex, HnswParams},
    store::VectorStore,
    topk::ScoredCandidate,
};

/// Points on a line, one per value, embedded in two dimensions.
pub(super) fn line_store(values: &[f32]) -> VectorStore {
    let rows: Vec<[f32; 2]> = values.iter().map(|&value| [value, 0.0]).collect();
    VectorStore::from_rows(&rows).expect("line rows are valid")
}

/// Builds an index over `store` by calling `insert` one vector at a time.
pub(super) fn insert_all(rows: &[Vec<f32>], params: HnswParams, seed: u64) -> (VectorStore, HnswIndex) {
    let mut store = VectorStore::new();
    let mut index = HnswIndex::new(params).expect("params must be valid");
    let mut rng = SmallRng::seed_from_u64(seed);
    for row in rows {
        index
            .insert(&mut store, row, &mut rng)
            .expect("insert must succeed");
        index
            .check_invariants()
            .expect("invariants must hold after every insert");
    }
    (store, index)
}

/// Exact nearest neighbours by squared Euclidean distance.
pub(super) fn exact_neighbours(store: &VectorStore, query: &[f32], k: usize) -> Vec<usize> {
    let mut scored: Vec<ScoredCandidate> = store
        .iter()
        .map(|(id, _)| {
            let distance = store.distance(id, query).expect("query width matches");
            ScoredCandidate::new(distance, id)
        })
        .collect();
    scored.sort_unstable();
    scored.into_iter().take(k).map(|candidate| candidate.id).collect()
}

pub(super) fn assert_sorted_by_distance(neighbours: &[ScoredCandidate]) {
    for window in neighbours.windows(2) {
        if let [left, right] = window {
            assert!(left <= right, "scores must be non-decreasing: {neighbours:?}");
        }
    }
}
