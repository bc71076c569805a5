use crate::distance::helpers::{squared_l2, validate_dimensions};
use crate::distance::types::{Result, Vector, VectorKind};

/// Computes the squared Euclidean distance between two vectors.
///
/// The square root is omitted: only relative ordering matters to the graph
/// search, and the squared form is monotonic in the true distance.
///
/// # Examples
///
/// ```
/// use nns_core::{DistanceError, squared_euclidean};
///
/// fn main() -> Result<(), DistanceError> {
///     let distance = squared_euclidean(&[1.0, 2.0, 3.0], &[4.0, 6.0, 8.0])?;
///     assert!((distance - 50.0).abs() < 1e-9);
///     Ok(())
/// }
/// ```
///
/// # Errors
///
/// - [`DistanceError::ZeroLength`](crate::DistanceError::ZeroLength) when any
///   input is empty.
/// - [`DistanceError::DimensionMismatch`](crate::DistanceError::DimensionMismatch)
///   when input lengths differ.
/// - [`DistanceError::NonFinite`](crate::DistanceError::NonFinite) when a value
///   is NaN or infinite.
pub fn squared_euclidean(left: &[f32], right: &[f32]) -> Result<f64> {
    let left = Vector::new(left, VectorKind::Left)?;
    let right = Vector::new(right, VectorKind::Right)?;
    validate_dimensions(&left, &right)?;

    Ok(squared_l2(&left, &right))
}
