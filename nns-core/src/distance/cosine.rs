use crate::distance::helpers::{accumulate_components, validate_dimensions};
use crate::distance::types::{
    DistanceError, Norm, Result, Vector, VectorKind, ZeroNormPolicy,
};

/// Computes the cosine similarity `a·b / (‖a‖·‖b‖)` between two vectors.
///
/// Components are widened to `f64` before accumulation regardless of the
/// stored width, which bounds rounding error over high dimensions.
///
/// # Examples
///
/// ```
/// use nns_core::{DistanceError, ZeroNormPolicy, cosine_similarity};
///
/// fn main() -> Result<(), DistanceError> {
///     let a = [1.0f32, 0.0, 0.0];
///     let b = [0.0f32, 1.0, 0.0];
///
///     let orthogonal = cosine_similarity(&a, &b, ZeroNormPolicy::Reject)?;
///     assert!(orthogonal.abs() < 1e-12);
///
///     let zero = cosine_similarity(&[0.0, 0.0, 0.0], &b, ZeroNormPolicy::Orthogonal)?;
///     assert_eq!(zero, 0.0);
///     Ok(())
/// }
/// ```
///
/// # Errors
///
/// - [`DistanceError::ZeroLength`] when any input is empty.
/// - [`DistanceError::DimensionMismatch`] when input lengths differ.
/// - [`DistanceError::NonFinite`] when a value is NaN or infinite.
/// - [`DistanceError::ZeroMagnitude`] when either vector has zero L2 norm and
///   `policy` is [`ZeroNormPolicy::Reject`].
pub fn cosine_similarity(left: &[f32], right: &[f32], policy: ZeroNormPolicy) -> Result<f64> {
    let left = Vector::new(left, VectorKind::Left)?;
    let right = Vector::new(right, VectorKind::Right)?;
    validate_dimensions(&left, &right)?;

    let (dot, left_squares, right_squares) = accumulate_components(&left, &right);
    similarity_from_parts(dot, left_squares, right_squares, policy)
}

/// Combines a dot product and squared magnitudes into a cosine similarity.
pub(crate) fn similarity_from_parts(
    dot: f64,
    left_squares: f64,
    right_squares: f64,
    policy: ZeroNormPolicy,
) -> Result<f64> {
    let norms = Norm::from_squared_sum(left_squares, VectorKind::Left).and_then(|left| {
        Norm::from_squared_sum(right_squares, VectorKind::Right).map(|right| (left, right))
    });
    let (left_norm, right_norm) = match (norms, policy) {
        (Ok(norms), _) => norms,
        (Err(DistanceError::ZeroMagnitude { .. }), ZeroNormPolicy::Orthogonal) => return Ok(0.0),
        (Err(err), ZeroNormPolicy::Reject | ZeroNormPolicy::Orthogonal) => return Err(err),
    };

    let similarity = dot / (*left_norm * *right_norm);
    // Theoretical range is [-1, 1], but numerical noise can spill over.
    Ok(similarity.clamp(-1.0, 1.0))
}
