//! Arena storage for fixed-dimension vectors.
//!
//! Vectors live in one contiguous `Vec<f32>` and are addressed by their
//! insertion rank. Nothing is ever removed, so ids stay stable for the
//! lifetime of the store and the HNSW graph can refer to vectors by id alone.

use crate::{
    distance::{ZeroNormPolicy, helpers, similarity_from_parts},
    error::{SearchError, StoreError},
};

/// Append-only collection of equally sized `f32` vectors.
///
/// # Examples
/// ```
/// use nns_core::{StoreError, VectorStore};
///
/// let mut store = VectorStore::new();
/// let first = store.add(&[1.0, 0.0])?;
/// let second = store.add(&[0.0, 1.0])?;
/// assert_eq!((first, second), (0, 1));
/// assert_eq!(store.dimension(), Some(2));
/// assert_eq!(store.get(1)?, &[0.0, 1.0]);
/// assert!(store.add(&[1.0, 2.0, 3.0]).is_err());
/// # Ok::<(), StoreError>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct VectorStore {
    data: Vec<f32>,
    squared_norms: Vec<f64>,
    dimension: Option<usize>,
}

impl VectorStore {
    /// Creates an empty store whose dimension is fixed by the first insertion.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store with a dimension fixed up front.
    ///
    /// # Errors
    /// Returns [`StoreError::ZeroDimension`] when `dimension` is zero.
    pub fn with_dimension(dimension: usize) -> Result<Self, StoreError> {
        if dimension == 0 {
            return Err(StoreError::ZeroDimension);
        }
        Ok(Self {
            dimension: Some(dimension),
            ..Self::default()
        })
    }

    /// Builds a store from row vectors, validating every row.
    ///
    /// # Errors
    /// Propagates the first [`StoreError`] raised by [`VectorStore::add`].
    pub fn from_rows<R: AsRef<[f32]>>(rows: &[R]) -> Result<Self, StoreError> {
        let mut store = Self::new();
        for row in rows {
            store.add(row.as_ref())?;
        }
        Ok(store)
    }

    /// Builds a store from a row-major buffer of `rows × dimension` values.
    ///
    /// # Errors
    /// Returns [`StoreError::ZeroDimension`] for a zero `dimension`,
    /// [`StoreError::DimensionMismatch`] when `data.len()` is not a multiple
    /// of `dimension`, and [`StoreError::NonFinite`] for NaN or infinite
    /// components.
    pub fn from_flat(data: &[f32], dimension: usize) -> Result<Self, StoreError> {
        let mut store = Self::with_dimension(dimension)?;
        let chunks = data.chunks_exact(dimension);
        if !chunks.remainder().is_empty() {
            return Err(StoreError::DimensionMismatch {
                expected: dimension,
                actual: chunks.remainder().len(),
            });
        }
        store.data.reserve(data.len());
        store.squared_norms.reserve(data.len() / dimension);
        for row in chunks {
            store.add(row)?;
        }
        Ok(store)
    }

    /// Appends a vector and returns its id.
    ///
    /// The first insertion fixes the dimension of a store created with
    /// [`VectorStore::new`].
    ///
    /// # Errors
    /// Returns [`StoreError::ZeroDimension`] for an empty vector,
    /// [`StoreError::DimensionMismatch`] when the width differs from the
    /// store dimension, and [`StoreError::NonFinite`] for NaN or infinite
    /// components. The store is unchanged on error.
    pub fn add(&mut self, vector: &[f32]) -> Result<usize, StoreError> {
        if vector.is_empty() {
            return Err(StoreError::ZeroDimension);
        }
        if let Some(expected) = self.dimension {
            if vector.len() != expected {
                return Err(StoreError::DimensionMismatch {
                    expected,
                    actual: vector.len(),
                });
            }
        }
        ensure_finite(vector)?;

        let id = self.len();
        self.dimension = Some(vector.len());
        self.data.extend_from_slice(vector);
        self.squared_norms.push(helpers::squared_sum(vector));
        Ok(id)
    }

    /// Returns the vector stored under `id`.
    ///
    /// # Errors
    /// Returns [`StoreError::OutOfRange`] when `id` is not a stored index.
    pub fn get(&self, id: usize) -> Result<&[f32], StoreError> {
        let out_of_range = || StoreError::OutOfRange {
            id,
            len: self.len(),
        };
        let dimension = self.dimension.ok_or_else(out_of_range)?;
        let start = id.checked_mul(dimension).ok_or_else(out_of_range)?;
        let end = start.checked_add(dimension).ok_or_else(out_of_range)?;
        self.data.get(start..end).ok_or_else(out_of_range)
    }

    /// Returns the number of stored vectors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.squared_norms.len()
    }

    /// Returns whether the store holds no vectors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.squared_norms.is_empty()
    }

    /// Returns the fixed dimension, or `None` before the first insertion.
    #[must_use]
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// Iterates over `(id, vector)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[f32])> {
        self.dimension
            .into_iter()
            .flat_map(move |dimension| self.data.chunks_exact(dimension))
            .enumerate()
    }

    /// Checks that `query` can be compared against the stored vectors.
    ///
    /// # Errors
    /// Returns [`StoreError::DimensionMismatch`] for a query of the wrong
    /// width (or any query against a store without a dimension),
    /// [`StoreError::ZeroDimension`] for an empty query, and
    /// [`StoreError::NonFinite`] for NaN or infinite components.
    pub fn validate_query(&self, query: &[f32]) -> Result<(), StoreError> {
        if query.is_empty() {
            return Err(StoreError::ZeroDimension);
        }
        match self.dimension {
            Some(expected) if expected == query.len() => ensure_finite(query),
            Some(expected) => Err(StoreError::DimensionMismatch {
                expected,
                actual: query.len(),
            }),
            None => Err(StoreError::DimensionMismatch {
                expected: 0,
                actual: query.len(),
            }),
        }
    }

    /// Cosine similarity between the stored vector `id` and `query`.
    ///
    /// # Errors
    /// Returns [`StoreError`] for an invalid id or query, and
    /// [`DistanceError::ZeroMagnitude`] under [`ZeroNormPolicy::Reject`]
    /// when either vector has zero magnitude.
    pub fn similarity(
        &self,
        id: usize,
        query: &[f32],
        policy: ZeroNormPolicy,
    ) -> Result<f64, SearchError> {
        self.validate_query(query)?;
        let query_squares = helpers::squared_sum(query);
        self.similarity_unchecked(id, query, query_squares, policy)
    }

    /// Squared Euclidean distance between the stored vector `id` and `query`.
    ///
    /// # Errors
    /// Returns [`StoreError`] for an invalid id or query.
    pub fn distance(&self, id: usize, query: &[f32]) -> Result<f64, StoreError> {
        self.validate_query(query)?;
        self.distance_unchecked(id, query)
    }

    /// Squared Euclidean distance between two stored vectors.
    ///
    /// # Errors
    /// Returns [`StoreError::OutOfRange`] when either id is invalid.
    pub fn distance_between(&self, left: usize, right: usize) -> Result<f64, StoreError> {
        let left = self.get(left)?;
        let right = self.get(right)?;
        Ok(helpers::squared_l2(left, right))
    }

    /// Distance from a query that has already passed [`Self::validate_query`].
    pub(crate) fn distance_unchecked(&self, id: usize, query: &[f32]) -> Result<f64, StoreError> {
        Ok(helpers::squared_l2(self.get(id)?, query))
    }

    /// Cosine similarity against a validated query whose squared norm is known.
    pub(crate) fn similarity_unchecked(
        &self,
        id: usize,
        query: &[f32],
        query_squares: f64,
        policy: ZeroNormPolicy,
    ) -> Result<f64, SearchError> {
        let vector = self.get(id)?;
        let stored_squares = self.squared_norms[id];
        let dot = helpers::dot(vector, query);
        // Stored vector is the left operand so zero-norm errors name it first.
        Ok(similarity_from_parts(
            dot,
            stored_squares,
            query_squares,
            policy,
        )?)
    }
}

fn ensure_finite(vector: &[f32]) -> Result<(), StoreError> {
    match vector
        .iter()
        .copied()
        .enumerate()
        .find(|(_, value)| !value.is_finite())
    {
        Some((index, value)) => Err(StoreError::NonFinite { index, value }),
        None => Ok(()),
    }
}
