//! Error types for the nns core library.
//!
//! Defines the error enums exposed by the public API, their stable
//! machine-readable codes, and a convenient result alias.

use thiserror::Error;

use crate::{distance::DistanceError, hnsw::HnswError};

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? $( ( $($tuple:tt)* ) )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl ::core::fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? $( ( $($tuple)* ) )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

pub(crate) use define_error_codes;

/// An error produced by [`crate::VectorStore`] operations.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum StoreError {
    /// Requested id was not a valid stored index.
    #[error("vector id {id} is out of range for a store of {len} vectors")]
    OutOfRange {
        /// The requested id.
        id: usize,
        /// Number of vectors held by the store.
        len: usize,
    },
    /// Vector width did not match the store dimension.
    #[error("dimension mismatch: store holds {expected}-d vectors but got {actual}")]
    DimensionMismatch {
        /// Dimension fixed for the store.
        expected: usize,
        /// Width of the offending vector.
        actual: usize,
    },
    /// Vectors must have at least one component.
    #[error("vectors must have positive dimension")]
    ZeroDimension,
    /// A component was NaN or infinite.
    #[error("component {index} is not finite: {value}")]
    NonFinite {
        /// Position of the offending component within the vector.
        index: usize,
        /// The rejected value.
        value: f32,
    },
}

define_error_codes! {
    /// Stable codes describing [`StoreError`] variants.
    enum StoreErrorCode for StoreError {
        /// Requested id was not a valid stored index.
        OutOfRange => OutOfRange { .. } => "STORE_OUT_OF_RANGE",
        /// Vector width did not match the store dimension.
        DimensionMismatch => DimensionMismatch { .. } => "STORE_DIMENSION_MISMATCH",
        /// Vectors must have at least one component.
        ZeroDimension => ZeroDimension => "STORE_ZERO_DIMENSION",
        /// A component was NaN or infinite.
        NonFinite => NonFinite { .. } => "STORE_NON_FINITE",
    }
}

/// Error type produced by the search entry points.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SearchError {
    /// An argument such as `top_k` was outside its valid range.
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// Human-readable description of the violated precondition.
        reason: String,
    },
    /// The query width did not match the stored vectors.
    #[error("query has dimension {actual} but the store holds {expected}-d vectors")]
    DimensionMismatch {
        /// Dimension of the stored vectors.
        expected: usize,
        /// Dimension of the query.
        actual: usize,
    },
    /// A buffer handed across the boundary had the wrong rank or layout.
    #[error("{buffer} must be {expected}-dimensional (got shape {shape:?})")]
    Shape {
        /// Name of the offending buffer.
        buffer: &'static str,
        /// Required rank.
        expected: usize,
        /// Shape that was supplied.
        shape: Vec<usize>,
    },
    /// The store held no vectors to search.
    #[error("cannot search an empty store")]
    EmptyStore,
    /// A [`crate::VectorStore`] operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// A similarity computation failed.
    #[error(transparent)]
    Distance(#[from] DistanceError),
    /// The HNSW index rejected the operation.
    #[error(transparent)]
    Hnsw(#[from] HnswError),
}

define_error_codes! {
    /// Stable codes describing [`SearchError`] variants.
    enum SearchErrorCode for SearchError {
        /// An argument such as `top_k` was outside its valid range.
        InvalidArgument => InvalidArgument { .. } => "NNS_INVALID_ARGUMENT",
        /// The query width did not match the stored vectors.
        DimensionMismatch => DimensionMismatch { .. } => "NNS_DIMENSION_MISMATCH",
        /// A buffer handed across the boundary had the wrong rank or layout.
        Shape => Shape { .. } => "NNS_SHAPE_ERROR",
        /// The store held no vectors to search.
        EmptyStore => EmptyStore => "NNS_EMPTY_STORE",
        /// A [`crate::VectorStore`] operation failed.
        StoreFailure => Store(..) => "NNS_STORE_FAILURE",
        /// A similarity computation failed.
        DistanceFailure => Distance(..) => "NNS_DISTANCE_FAILURE",
        /// The HNSW index rejected the operation.
        HnswFailure => Hnsw(..) => "NNS_HNSW_FAILURE",
    }
}

impl SearchError {
    /// Retrieve the inner [`StoreErrorCode`] when the error originated in the store.
    pub const fn store_code(&self) -> Option<StoreErrorCode> {
        match self {
            Self::Store(error) => Some(error.code()),
            _ => None,
        }
    }

    pub(crate) fn invalid_k(k: usize) -> Self {
        Self::InvalidArgument {
            reason: format!("top_k must be positive (got {k})"),
        }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, SearchError>;
