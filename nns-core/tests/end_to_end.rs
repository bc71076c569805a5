//! End-to-end tests through the raw-buffer entry points.

mod common;

use nns_core::{
    SearchError,
    boundary::{Matrix, QueryBuffer, brute_force_search, hash_search, hnsw_search},
};
use rstest::rstest;

use common::{REFERENCE_QUERY, REFERENCE_VECTORS, flatten};

#[rstest]
fn brute_force_ranks_reference_vectors() {
    let vectors = Matrix::new(&REFERENCE_VECTORS, &[4, 2]).expect("valid shape");
    let query = QueryBuffer::new(&REFERENCE_QUERY, &[2]).expect("valid shape");
    let ids = brute_force_search(&vectors, &query, 2).expect("search must succeed");
    assert_eq!(ids, vec![0, 2]);
}

#[rstest]
fn hash_search_agrees_on_reference_vectors() {
    let vectors = Matrix::new(&REFERENCE_VECTORS, &[4, 2]).expect("valid shape");
    let query = QueryBuffer::new(&REFERENCE_QUERY, &[2]).expect("valid shape");
    let ids = hash_search(&vectors, &query, 4).expect("search must succeed");
    assert_eq!(ids.len(), 4);
    assert_eq!(ids[0], 0);
}

#[rstest]
#[case::brute_force(brute_force_search as EntryPoint)]
#[case::hnsw(hnsw_search as EntryPoint)]
#[case::hash(hash_search as EntryPoint)]
fn every_entry_point_enforces_the_dimension_contract(#[case] search: EntryPoint) {
    let data = flatten(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
    let vectors = Matrix::new(&data, &[2, 3]).expect("valid shape");
    let query = QueryBuffer::new(&[1.0, 0.0, 0.0, 0.0], &[4]).expect("valid shape");
    assert_eq!(
        search(&vectors, &query, 1),
        Err(SearchError::DimensionMismatch {
            expected: 3,
            actual: 4
        })
    );
}

#[rstest]
#[case::brute_force(brute_force_search as EntryPoint)]
#[case::hnsw(hnsw_search as EntryPoint)]
#[case::hash(hash_search as EntryPoint)]
fn every_entry_point_returns_min_of_k_and_n(#[case] search: EntryPoint) {
    let vectors = Matrix::new(&REFERENCE_VECTORS, &[4, 2]).expect("valid shape");
    let query = QueryBuffer::new(&REFERENCE_QUERY, &[2]).expect("valid shape");
    for (top_k, expected) in [(1, 1), (3, 3), (4, 4), (10, 4)] {
        let ids = search(&vectors, &query, top_k).expect("search must succeed");
        assert_eq!(ids.len(), expected, "top_k = {top_k}");
    }
}

#[rstest]
fn brute_force_is_deterministic_and_self_matching() {
    let rows = [[0.2, 0.9, -0.4], [0.7, -0.1, 0.3], [-0.5, 0.5, 0.5], [0.1, 0.1, 0.9]];
    let data = flatten(&rows);
    let vectors = Matrix::new(&data, &[4, 3]).expect("valid shape");
    for (id, row) in rows.iter().enumerate() {
        let query = QueryBuffer::new(row, &[3]).expect("valid shape");
        let first = brute_force_search(&vectors, &query, 4).expect("search must succeed");
        let second = brute_force_search(&vectors, &query, 4).expect("search must succeed");
        assert_eq!(first, second);
        assert_eq!(first[0], id);
    }
}

type EntryPoint = fn(&Matrix<'_>, &QueryBuffer<'_>, i64) -> nns_core::Result<Vec<usize>>;
