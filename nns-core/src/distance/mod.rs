//! Distance primitives for the built-in metrics.
//!
//! Brute-force and hash search rank by cosine similarity; the HNSW graph
//! orders by squared Euclidean distance. Both accumulate in `f64`. The public
//! functions validate their inputs and surface detailed errors; the crate
//! internal kernels in `helpers` assume vectors that were validated when they
//! entered the store.

mod cosine;
mod euclidean;
pub(crate) mod helpers;
mod types;

pub(crate) use self::cosine::similarity_from_parts;
pub use self::cosine::cosine_similarity;
pub use self::euclidean::squared_euclidean;
pub use self::types::{DistanceError, Norm, Vector, VectorKind, ZeroNormPolicy};
