//! Build and end-to-end search tests for the HNSW index.

use nns_test_support::record_tracing;
use rand::{SeedableRng, rngs::SmallRng};
use rstest::rstest;

use crate::{
    hnsw::{HnswIndex, HnswParams},
    store::VectorStore,
    test_utils::{clustered_rows, clustered_store},
};

use super::fixtures::{assert_sorted_by_distance, exact_neighbours, insert_all, line_store};

#[rstest]
#[case(2, 8)]
#[case(4, 16)]
fn builds_and_searches(#[case] m: usize, #[case] ef: usize) {
    let store = line_store(&[0.0, 1.0, 2.0, 5.0]);
    let params = HnswParams::new(m, ef)
        .expect("params must be valid")
        .with_rng_seed(42);
    let index = HnswIndex::build(&store, params).expect("build must succeed");
    assert_eq!(index.len(), 4);
    index.check_invariants().expect("invariants must hold");

    let forward = index
        .knn_search_scored(&store, &[0.0, 0.0], 4)
        .expect("search must succeed");
    let forward_ids: Vec<_> = forward.iter().map(|n| n.id).collect();
    assert_eq!(forward_ids, vec![0, 1, 2, 3]);
    assert_sorted_by_distance(&forward);

    let reverse = index
        .knn_search(&store, &[5.0, 0.0], 4)
        .expect("search must succeed");
    assert_eq!(reverse, vec![3, 2, 1, 0]);
}

#[rstest]
fn single_vector_graph_returns_that_vector() {
    let store = line_store(&[3.0]);
    let index = HnswIndex::build(&store, HnswParams::default()).expect("build must succeed");
    assert_eq!(index.entry_point(), Some((0, 0)));
    let found = index
        .knn_search(&store, &[-7.0, 2.0], 5)
        .expect("search must succeed");
    assert_eq!(found, vec![0]);
}

#[rstest]
fn first_insert_becomes_entry_point_on_layer_zero() {
    let mut store = VectorStore::new();
    let mut index = HnswIndex::new(HnswParams::default()).expect("defaults are valid");
    let mut rng = SmallRng::seed_from_u64(1);
    let id = index
        .insert(&mut store, &[1.0, 2.0, 3.0], &mut rng)
        .expect("first insert succeeds");
    assert_eq!(id, 0);
    assert_eq!(index.entry_point(), Some((0, 0)));
    assert_eq!(index.layer_count(), 1);
    assert_eq!(index.neighbours(0, 0), Some(&[][..]));
}

#[rstest]
fn incremental_inserts_match_batch_build() {
    let rows = clustered_rows(60, 4, 3, 11);
    let params = HnswParams::new(4, 12)
        .expect("params must be valid")
        .with_rng_seed(99);
    let (store, incremental) = insert_all(&rows, params.clone(), 99);
    let batch = HnswIndex::build(&store, params).expect("build must succeed");

    assert_eq!(incremental.entry_point(), batch.entry_point());
    assert_eq!(incremental.layer_count(), batch.layer_count());
    for node in 0..rows.len() {
        assert_eq!(incremental.level_of(node), batch.level_of(node));
        for layer in 0..batch.layer_count() {
            assert_eq!(
                incremental.neighbours(node, layer),
                batch.neighbours(node, layer),
                "node {node} layer {layer}",
            );
        }
    }
}

#[rstest]
fn build_is_deterministic_for_a_seed() {
    let store = clustered_store(80, 5, 4, 3);
    let params = HnswParams::default().with_rng_seed(5);
    let first = HnswIndex::build(&store, params.clone()).expect("build must succeed");
    let second = HnswIndex::build(&store, params).expect("build must succeed");
    let query = [0.1, -0.2, 0.3, 0.0, 0.5];
    assert_eq!(
        first.knn_search(&store, &query, 7).expect("search"),
        second.knn_search(&store, &query, 7).expect("search"),
    );
    assert_eq!(first.entry_point(), second.entry_point());
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(4)]
fn levels_never_exceed_ml(#[case] ml: usize) {
    let store = clustered_store(150, 3, 3, 17);
    let params = HnswParams::default().with_ml(ml).with_rng_seed(23);
    let index = HnswIndex::build(&store, params).expect("build must succeed");
    assert!(index.layer_count() <= ml + 1);
    for node in 0..store.len() {
        let level = index.level_of(node).expect("every node has a level");
        assert!(level <= ml, "node {node} drew level {level} above {ml}");
    }
    let (_, entry_level) = index.entry_point().expect("populated index");
    assert_eq!(entry_level + 1, index.layer_count());
}

#[rstest]
fn pruning_respects_tight_caps() {
    let values: Vec<f32> = (0..40).map(|value| value as f32 * 0.25).collect();
    let store = line_store(&values);
    let params = HnswParams::new(2, 6)
        .expect("params must be valid")
        .with_max_connections(2)
        .with_max_connections0(3)
        .with_rng_seed(8);
    let index = HnswIndex::build(&store, params).expect("build must succeed");
    index.check_invariants().expect("invariants must hold");
    for node in 0..store.len() {
        let degree = index.neighbours(node, 0).map_or(0, <[usize]>::len);
        assert!(degree <= 3, "node {node} has degree {degree}");
    }
}

#[rstest]
fn recall_tracks_exact_search_on_clustered_data() {
    let store = clustered_store(200, 8, 5, 2024);
    let index = HnswIndex::build(&store, HnswParams::default().with_rng_seed(7))
        .expect("build must succeed");
    index.check_invariants().expect("invariants must hold");

    let k = 10;
    let queries = clustered_rows(25, 8, 5, 4048);
    let mut hits = 0;
    for query in &queries {
        let approximate = index
            .knn_search_with_ef(&store, query, k, 64)
            .expect("search must succeed");
        let exact = exact_neighbours(&store, query, k);
        hits += approximate.iter().filter(|id| exact.contains(id)).count();
    }
    let recall = hits as f64 / (queries.len() * k) as f64;
    assert!(recall >= 0.8, "recall {recall} below 0.8");
}

#[rstest]
fn plain_knn_search_agrees_on_top_hit() {
    let store = clustered_store(200, 8, 5, 2024);
    let index = HnswIndex::build(&store, HnswParams::default().with_rng_seed(7))
        .expect("build must succeed");

    let queries = clustered_rows(100, 8, 5, 4048);
    let agreed = queries
        .iter()
        .filter(|query| {
            let approximate = index
                .knn_search(&store, query, 5)
                .expect("search must succeed");
            approximate.first() == exact_neighbours(&store, query, 1).first()
        })
        .count();
    assert!(agreed >= 90, "top-1 agreed on {agreed}/100 queries");
}

#[rstest]
fn insert_emits_tracing_span() {
    let (result, layer) = record_tracing(|| {
        let mut store = VectorStore::new();
        let mut index = HnswIndex::new(HnswParams::default()).expect("defaults are valid");
        let mut rng = SmallRng::seed_from_u64(3);
        index.insert(&mut store, &[0.0, 1.0], &mut rng)?;
        index.insert(&mut store, &[1.0, 0.0], &mut rng)
    });
    assert_eq!(result.expect("inserts succeed"), 1);
    let span = layer.span("hnsw.insert").expect("insert span recorded");
    assert!(span.fields.contains_key("level"));
    assert!(layer.has_event_message("entry point promoted"));
    assert!(layer.has_event_message("node inserted"));
}
