//! Error types produced by the HNSW index.

use thiserror::Error;

use crate::error::{StoreError, define_error_codes};

/// Errors produced by the HNSW index.
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum HnswError {
    /// Parameters were invalid for the current configuration.
    #[error("invalid HNSW parameter: {reason}")]
    InvalidParameters { reason: String },
    /// A call argument such as `k` was outside its valid range.
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },
    /// A query was issued against an index without an entry point.
    #[error("HNSW graph has no entry point")]
    GraphEmpty,
    /// Attempted to operate on an inconsistent graph state.
    #[error("HNSW graph invariant violated: {message}")]
    GraphInvariantViolation { message: String },
    /// The store handed to the index does not hold the vectors it indexed.
    #[error("store holds {store_len} vectors but the index expects {indexed}")]
    StoreMismatch { store_len: usize, indexed: usize },
    /// A distance evaluated to NaN or infinity.
    #[error("distance to node {node} is not finite")]
    NonFiniteDistance { node: usize },
    /// Wrapped [`StoreError`].
    #[error("vector store failure: {0}")]
    Store(#[from] StoreError),
}

define_error_codes! {
    /// Stable codes describing [`HnswError`] variants.
    enum HnswErrorCode for HnswError {
        /// Parameters were invalid for the current configuration.
        InvalidParameters => InvalidParameters { .. } => "HNSW_INVALID_PARAMETERS",
        /// A call argument was outside its valid range.
        InvalidArgument => InvalidArgument { .. } => "HNSW_INVALID_ARGUMENT",
        /// A query was issued against an empty index.
        GraphEmpty => GraphEmpty => "HNSW_GRAPH_EMPTY",
        /// The graph was found in an inconsistent state.
        GraphInvariantViolation => GraphInvariantViolation { .. } => "HNSW_GRAPH_INVARIANT_VIOLATION",
        /// The store does not match the index.
        StoreMismatch => StoreMismatch { .. } => "HNSW_STORE_MISMATCH",
        /// A distance evaluated to NaN or infinity.
        NonFiniteDistance => NonFiniteDistance { .. } => "HNSW_NON_FINITE_DISTANCE",
        /// A vector store operation failed.
        Store => Store(..) => "VECTOR_STORE",
    }
}

impl HnswError {
    pub(crate) fn invalid_k(k: usize) -> Self {
        Self::InvalidArgument {
            reason: format!("k must be positive (got {k})"),
        }
    }
}
