//! Fixtures shared by the integration suites.

/// Four 2-d vectors whose cosine ranking against [`REFERENCE_QUERY`] is
/// `0, 2, 1, 3`.
pub const REFERENCE_VECTORS: [f32; 8] = [1.0, 0.0, 0.0, 1.0, 1.0, 1.0, -1.0, 0.0];

pub const REFERENCE_QUERY: [f32; 2] = [1.0, 0.1];

/// Flattens rows into a row-major buffer.
#[must_use]
pub fn flatten<const D: usize>(rows: &[[f32; D]]) -> Vec<f32> {
    rows.iter().flatten().copied().collect()
}
