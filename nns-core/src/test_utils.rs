//! Shared test utilities for `nns-core`.

use nns_test_support::property_config;
use proptest::test_runner::Config as ProptestConfig;
use rand::{Rng, SeedableRng, rngs::SmallRng};

use crate::store::VectorStore;

/// Suite configuration honouring the shared `PROGTEST_CASES` and
/// `NNS_PBT_FORK` overrides.
#[must_use]
pub(crate) fn suite_proptest_config(default_cases: u32) -> ProptestConfig {
    property_config(default_cases)
}

/// Generates `n` rows of width `dim` scattered around `clusters` random
/// centres.
///
/// Centres are drawn from `[-1, 1)` per component and members sit within
/// `±0.75` of their centre, so neighbouring clusters overlap and the data has
/// no isolated islands.
pub(crate) fn clustered_rows(n: usize, dim: usize, clusters: usize, seed: u64) -> Vec<Vec<f32>> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let centres: Vec<Vec<f32>> = (0..clusters.max(1))
        .map(|_| (0..dim).map(|_| rng.gen_range(-1.0..1.0)).collect())
        .collect();
    (0..n)
        .map(|index| {
            let centre = &centres[index % centres.len()];
            centre
                .iter()
                .map(|&value| value + rng.gen_range(-0.75..0.75))
                .collect()
        })
        .collect()
}

/// Store populated by [`clustered_rows`].
pub(crate) fn clustered_store(n: usize, dim: usize, clusters: usize, seed: u64) -> VectorStore {
    VectorStore::from_rows(&clustered_rows(n, dim, clusters, seed))
        .unwrap_or_else(|error| panic!("generated rows must be valid: {error}"))
}
