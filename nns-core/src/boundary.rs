//! Shape-checked entry points for callers holding raw buffers.
//!
//! A host binding hands over a row-major `[n, dim]` matrix of vectors, a
//! `[dim]` query, and a signed `top_k`. Every check runs before any vector is
//! copied or scored, so a rejected call produces no partial output.

use tracing::instrument;

use crate::{
    brute_force::BruteForceSearch,
    error::{Result, SearchError},
    hash::{HashParams, HashSearch},
    hnsw::{HnswIndex, HnswParams},
    store::VectorStore,
};

/// Borrowed row-major matrix of `rows × cols` vectors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Matrix<'a> {
    data: &'a [f32],
    rows: usize,
    cols: usize,
}

impl<'a> Matrix<'a> {
    /// Wraps `data` with the supplied `shape`.
    ///
    /// # Errors
    /// Returns [`SearchError::Shape`] unless `shape` has exactly two
    /// dimensions whose product equals `data.len()`.
    ///
    /// # Examples
    /// ```
    /// use nns_core::boundary::Matrix;
    ///
    /// let data = [1.0, 0.0, 0.0, 1.0, 1.0, 1.0];
    /// let matrix = Matrix::new(&data, &[3, 2])?;
    /// assert_eq!((matrix.rows(), matrix.cols()), (3, 2));
    /// assert!(Matrix::new(&data, &[6]).is_err());
    /// # Ok::<(), nns_core::SearchError>(())
    /// ```
    pub fn new(data: &'a [f32], shape: &[usize]) -> Result<Self> {
        let &[rows, cols] = shape else {
            return Err(shape_error("vectors", 2, shape));
        };
        if rows.checked_mul(cols) != Some(data.len()) {
            return Err(shape_error("vectors", 2, shape));
        }
        Ok(Self { data, rows, cols })
    }

    /// Number of vectors.
    #[must_use]
    #[rustfmt::skip]
    pub fn rows(&self) -> usize { self.rows }

    /// Vector dimension.
    #[must_use]
    #[rustfmt::skip]
    pub fn cols(&self) -> usize { self.cols }

    /// Row-major backing buffer.
    #[must_use]
    #[rustfmt::skip]
    pub fn data(&self) -> &'a [f32] { self.data }
}

/// Borrowed one-dimensional query vector.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QueryBuffer<'a> {
    data: &'a [f32],
}

impl<'a> QueryBuffer<'a> {
    /// Wraps `data` with the supplied `shape`.
    ///
    /// # Errors
    /// Returns [`SearchError::Shape`] unless `shape` is `[data.len()]`.
    pub fn new(data: &'a [f32], shape: &[usize]) -> Result<Self> {
        match shape {
            &[len] if len == data.len() => Ok(Self { data }),
            _ => Err(shape_error("query", 1, shape)),
        }
    }

    /// Number of components.
    #[must_use]
    #[rustfmt::skip]
    pub fn len(&self) -> usize { self.data.len() }

    /// Returns whether the query has no components.
    #[must_use]
    #[rustfmt::skip]
    pub fn is_empty(&self) -> bool { self.data.is_empty() }

    /// Query components.
    #[must_use]
    #[rustfmt::skip]
    pub fn data(&self) -> &'a [f32] { self.data }
}

/// Exact cosine top-k over `vectors`.
///
/// # Errors
/// - [`SearchError::InvalidArgument`] when `top_k` is not positive.
/// - [`SearchError::DimensionMismatch`] when `query.len() != vectors.cols()`.
/// - [`SearchError::EmptyStore`] when `vectors` has no rows.
///
/// # Examples
/// ```
/// use nns_core::boundary::{Matrix, QueryBuffer, brute_force_search};
///
/// let data = [1.0, 0.0, 0.0, 1.0, 1.0, 1.0, -1.0, 0.0];
/// let vectors = Matrix::new(&data, &[4, 2])?;
/// let query = QueryBuffer::new(&[1.0, 0.1], &[2])?;
/// assert_eq!(brute_force_search(&vectors, &query, 2)?, vec![0, 2]);
/// # Ok::<(), nns_core::SearchError>(())
/// ```
#[instrument(
    name = "boundary.brute_force_search",
    err,
    skip(vectors, query),
    fields(rows = vectors.rows(), cols = vectors.cols()),
)]
pub fn brute_force_search(vectors: &Matrix<'_>, query: &QueryBuffer<'_>, top_k: i64) -> Result<Vec<usize>> {
    let (store, top_k) = prepare(vectors, query, top_k)?;
    BruteForceSearch::new().search(&store, query.data(), top_k)
}

/// Approximate top-k by squared Euclidean distance through an HNSW index
/// built with [`HnswParams::default`].
///
/// # Errors
/// As for [`brute_force_search`], plus [`SearchError::Hnsw`] for index
/// failures.
pub fn hnsw_search(vectors: &Matrix<'_>, query: &QueryBuffer<'_>, top_k: i64) -> Result<Vec<usize>> {
    hnsw_search_with(vectors, query, top_k, HnswParams::default())
}

/// [`hnsw_search`] with explicit index parameters.
///
/// # Errors
/// As for [`hnsw_search`].
#[instrument(
    name = "boundary.hnsw_search",
    err,
    skip(vectors, query, params),
    fields(rows = vectors.rows(), cols = vectors.cols()),
)]
pub fn hnsw_search_with(
    vectors: &Matrix<'_>,
    query: &QueryBuffer<'_>,
    top_k: i64,
    params: HnswParams,
) -> Result<Vec<usize>> {
    let (store, top_k) = prepare(vectors, query, top_k)?;
    let index = HnswIndex::build(&store, params)?;
    Ok(index.knn_search(&store, query.data(), top_k)?)
}

/// Approximate cosine top-k through SimHash buckets built with
/// [`HashParams::default`].
///
/// # Errors
/// As for [`brute_force_search`].
pub fn hash_search(vectors: &Matrix<'_>, query: &QueryBuffer<'_>, top_k: i64) -> Result<Vec<usize>> {
    hash_search_with(vectors, query, top_k, HashParams::default())
}

/// [`hash_search`] with explicit hashing parameters.
///
/// # Errors
/// As for [`hash_search`].
#[instrument(
    name = "boundary.hash_search",
    err,
    skip(vectors, query, params),
    fields(rows = vectors.rows(), cols = vectors.cols()),
)]
pub fn hash_search_with(
    vectors: &Matrix<'_>,
    query: &QueryBuffer<'_>,
    top_k: i64,
    params: HashParams,
) -> Result<Vec<usize>> {
    let (store, top_k) = prepare(vectors, query, top_k)?;
    HashSearch::build(&store, params)?.search(&store, query.data(), top_k)
}

fn prepare(vectors: &Matrix<'_>, query: &QueryBuffer<'_>, top_k: i64) -> Result<(VectorStore, usize)> {
    let top_k = usize::try_from(top_k)
        .ok()
        .filter(|&k| k > 0)
        .ok_or_else(|| SearchError::InvalidArgument {
            reason: format!("top_k must be positive (got {top_k})"),
        })?;
    if query.len() != vectors.cols() {
        return Err(SearchError::DimensionMismatch {
            expected: vectors.cols(),
            actual: query.len(),
        });
    }
    if vectors.rows() == 0 {
        return Err(SearchError::EmptyStore);
    }
    let store = VectorStore::from_flat(vectors.data(), vectors.cols())?;
    Ok((store, top_k))
}

fn shape_error(buffer: &'static str, expected: usize, shape: &[usize]) -> SearchError {
    SearchError::Shape {
        buffer,
        expected,
        shape: shape.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const VECTORS: [f32; 8] = [1.0, 0.0, 0.0, 1.0, 1.0, 1.0, -1.0, 0.0];

    #[rstest]
    #[case(&[8][..])]
    #[case(&[2, 2, 2][..])]
    #[case(&[3, 2][..])]
    fn matrix_rejects_bad_shapes(#[case] shape: &[usize]) {
        let err = Matrix::new(&VECTORS, shape).expect_err("shape must fail");
        assert!(matches!(err, SearchError::Shape { buffer: "vectors", expected: 2, .. }));
    }

    #[rstest]
    #[case(&[1, 2][..])]
    #[case(&[3][..])]
    #[case(&[][..])]
    fn query_rejects_bad_shapes(#[case] shape: &[usize]) {
        let err = QueryBuffer::new(&[1.0, 0.0], shape).expect_err("shape must fail");
        assert!(matches!(err, SearchError::Shape { buffer: "query", expected: 1, .. }));
    }

    #[rstest]
    #[case(0)]
    #[case(-3)]
    fn non_positive_top_k_is_rejected(#[case] top_k: i64) {
        let vectors = Matrix::new(&VECTORS, &[4, 2]).expect("valid shape");
        let query = QueryBuffer::new(&[1.0, 0.0], &[2]).expect("valid shape");
        for result in [
            brute_force_search(&vectors, &query, top_k),
            hnsw_search(&vectors, &query, top_k),
            hash_search(&vectors, &query, top_k),
        ] {
            assert!(matches!(result, Err(SearchError::InvalidArgument { .. })));
        }
    }

    #[rstest]
    fn zero_rows_report_empty_store() {
        let vectors = Matrix::new(&[], &[0, 2]).expect("empty matrix is well formed");
        let query = QueryBuffer::new(&[1.0, 0.0], &[2]).expect("valid shape");
        assert_eq!(
            brute_force_search(&vectors, &query, 1),
            Err(SearchError::EmptyStore)
        );
    }

    #[rstest]
    fn hnsw_search_finds_nearest_by_distance() {
        let vectors = Matrix::new(&VECTORS, &[4, 2]).expect("valid shape");
        let query = QueryBuffer::new(&[0.9, 0.9], &[2]).expect("valid shape");
        let ids = hnsw_search(&vectors, &query, 2).expect("search must succeed");
        assert_eq!(ids, vec![2, 0]);
    }
}
