//! In-process nearest-neighbour search over fixed-dimension `f32` vectors.
//!
//! Vectors live in a [`VectorStore`]; [`BruteForceSearch`] ranks them exactly
//! by cosine similarity, [`HnswIndex`] answers approximate queries under
//! squared Euclidean distance, and [`HashSearch`] offers a SimHash bucket
//! index. The [`boundary`] module wraps all three behind shape-checked raw
//! buffers.
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod boundary;
mod brute_force;
mod distance;
mod error;
mod hash;
mod hnsw;
mod store;
mod topk;

#[cfg(test)]
mod test_utils;

pub use crate::{
    brute_force::BruteForceSearch,
    distance::{
        DistanceError, Norm, Vector, VectorKind, ZeroNormPolicy, cosine_similarity,
        squared_euclidean,
    },
    error::{Result, SearchError, SearchErrorCode, StoreError, StoreErrorCode},
    hash::{HashParams, HashSearch},
    hnsw::{
        HnswError, HnswErrorCode, HnswIndex, HnswInvariant, HnswInvariantChecker,
        HnswInvariantViolation, HnswParams,
    },
    store::VectorStore,
    topk::{ScoredCandidate, select_top_k},
};
