//! Error-path tests and machine-readable error codes.

use rand::{SeedableRng, rngs::SmallRng};
use rstest::rstest;

use crate::{
    error::StoreError,
    hnsw::{HnswError, HnswErrorCode, HnswIndex, HnswParams},
    store::VectorStore,
};

use super::fixtures::line_store;

#[test]
fn exposes_machine_readable_error_codes() {
    assert_eq!(
        HnswError::InvalidParameters {
            reason: "bad".into(),
        }
        .code(),
        HnswErrorCode::InvalidParameters,
    );
    assert_eq!(HnswError::GraphEmpty.code(), HnswErrorCode::GraphEmpty);
    assert_eq!(
        HnswError::StoreMismatch {
            store_len: 1,
            indexed: 2,
        }
        .code(),
        HnswErrorCode::StoreMismatch,
    );
    assert_eq!(
        HnswError::NonFiniteDistance { node: 4 }.code(),
        HnswErrorCode::NonFiniteDistance,
    );
    assert_eq!(
        HnswError::from(StoreError::ZeroDimension).code(),
        HnswErrorCode::Store,
    );
    assert_eq!(HnswErrorCode::GraphEmpty.as_str(), "HNSW_GRAPH_EMPTY");
    assert_eq!(HnswErrorCode::Store.to_string(), "VECTOR_STORE");
}

#[rstest]
fn search_rejects_zero_k() {
    let store = line_store(&[0.0, 1.0]);
    let index = HnswIndex::build(&store, HnswParams::default()).expect("build must succeed");
    let err = index
        .knn_search(&store, &[0.0, 0.0], 0)
        .expect_err("k = 0 must fail");
    assert!(matches!(err, HnswError::InvalidArgument { .. }));
}

#[rstest]
fn search_on_empty_index_reports_graph_empty() {
    let store = VectorStore::new();
    let index = HnswIndex::new(HnswParams::default()).expect("defaults are valid");
    let err = index
        .knn_search(&store, &[0.0, 0.0], 1)
        .expect_err("empty index must fail");
    assert_eq!(err, HnswError::GraphEmpty);
}

#[rstest]
fn search_rejects_query_of_wrong_width() {
    let store = line_store(&[0.0, 1.0, 2.0]);
    let index = HnswIndex::build(&store, HnswParams::default()).expect("build must succeed");
    let err = index
        .knn_search(&store, &[0.0, 0.0, 0.0], 1)
        .expect_err("3-d query against 2-d store");
    assert_eq!(
        err,
        HnswError::Store(StoreError::DimensionMismatch {
            expected: 2,
            actual: 3,
        })
    );
}

#[rstest]
fn insert_rejects_foreign_store() {
    let mut indexed = VectorStore::new();
    let mut index = HnswIndex::new(HnswParams::default()).expect("defaults are valid");
    let mut rng = SmallRng::seed_from_u64(0);
    index
        .insert(&mut indexed, &[0.0, 1.0], &mut rng)
        .expect("first insert succeeds");

    let mut foreign = line_store(&[0.0, 1.0, 2.0]);
    let err = index
        .insert(&mut foreign, &[3.0, 0.0], &mut rng)
        .expect_err("store length differs from index");
    assert_eq!(
        err,
        HnswError::StoreMismatch {
            store_len: 3,
            indexed: 1,
        }
    );
    assert_eq!(foreign.len(), 3);
}

#[rstest]
#[case(&[1.0, 2.0, 3.0][..])]
#[case(&[f32::NAN, 0.0][..])]
fn rejected_insert_leaves_store_and_index_unchanged(#[case] vector: &[f32]) {
    let mut store = VectorStore::new();
    let mut index = HnswIndex::new(HnswParams::default()).expect("defaults are valid");
    let mut rng = SmallRng::seed_from_u64(0);
    for row in [[0.0, 1.0], [1.0, 0.0]] {
        index.insert(&mut store, &row, &mut rng).expect("valid insert");
    }

    let err = index
        .insert(&mut store, vector, &mut rng)
        .expect_err("invalid vector must be rejected");
    assert!(matches!(err, HnswError::Store(_)));
    assert_eq!(store.len(), 2);
    assert_eq!(index.len(), 2);
    index.check_invariants().expect("graph untouched");
}

#[rstest]
fn new_rejects_invalid_builder_overrides() {
    let params = HnswParams::default().with_max_connections0(2);
    let err = HnswIndex::new(params).expect_err("cap below M must fail");
    assert!(matches!(err, HnswError::InvalidParameters { .. }));
}
