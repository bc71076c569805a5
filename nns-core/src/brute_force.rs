//! Exact top-k retrieval by cosine similarity.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::instrument;

use crate::{
    distance::{ZeroNormPolicy, helpers},
    error::{Result, SearchError, StoreError},
    store::VectorStore,
    topk::{ScoredCandidate, select_top_k},
};

/// Exhaustive cosine-similarity search over a [`VectorStore`].
///
/// Every stored vector is scored against the query; the `top_k` most similar
/// are returned with ties broken by ascending id.
///
/// # Examples
/// ```
/// use nns_core::{BruteForceSearch, VectorStore};
///
/// let store = VectorStore::from_rows(&[[1.0, 0.0], [0.0, 1.0], [1.0, 1.0], [-1.0, 0.0]])?;
/// let ids = BruteForceSearch::new().search(&store, &[1.0, 0.1], 2)?;
/// assert_eq!(ids, vec![0, 2]);
/// # Ok::<(), nns_core::SearchError>(())
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BruteForceSearch {
    zero_norm_policy: ZeroNormPolicy,
}

impl BruteForceSearch {
    /// Creates a searcher that rejects zero-magnitude vectors.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Chooses how zero-magnitude vectors are scored.
    #[must_use]
    pub fn with_zero_norm_policy(mut self, policy: ZeroNormPolicy) -> Self {
        self.zero_norm_policy = policy;
        self
    }

    /// Returns the configured [`ZeroNormPolicy`].
    #[must_use]
    pub fn zero_norm_policy(&self) -> ZeroNormPolicy {
        self.zero_norm_policy
    }

    /// Returns the ids of the `min(top_k, store.len())` vectors most similar
    /// to `query`, most similar first.
    ///
    /// # Errors
    /// - [`SearchError::InvalidArgument`] when `top_k` is zero.
    /// - [`SearchError::EmptyStore`] when the store holds no vectors.
    /// - [`SearchError::DimensionMismatch`] when the query width differs from
    ///   the store.
    /// - [`SearchError::Distance`] when a vector has zero magnitude under
    ///   [`ZeroNormPolicy::Reject`].
    pub fn search(&self, store: &VectorStore, query: &[f32], top_k: usize) -> Result<Vec<usize>> {
        let ranked = self.rank(store, query, top_k)?;
        Ok(ranked.into_iter().map(|candidate| candidate.id).collect())
    }

    /// Like [`BruteForceSearch::search`] but pairs each id with its cosine
    /// similarity.
    ///
    /// # Errors
    /// As for [`BruteForceSearch::search`].
    pub fn search_scored(
        &self,
        store: &VectorStore,
        query: &[f32],
        top_k: usize,
    ) -> Result<Vec<(usize, f64)>> {
        let ranked = self.rank(store, query, top_k)?;
        Ok(ranked
            .into_iter()
            .map(|candidate| (candidate.id, -candidate.score))
            .collect())
    }

    /// Runs [`BruteForceSearch::search`] for every query on the Rayon pool.
    ///
    /// # Errors
    /// Returns the first error raised by any query.
    #[cfg(feature = "parallel")]
    #[cfg_attr(docsrs, doc(cfg(feature = "parallel")))]
    pub fn batch_search<Q>(
        &self,
        store: &VectorStore,
        queries: &[Q],
        top_k: usize,
    ) -> Result<Vec<Vec<usize>>>
    where
        Q: AsRef<[f32]> + Sync,
    {
        queries
            .par_iter()
            .map(|query| self.search(store, query.as_ref(), top_k))
            .collect()
    }

    #[instrument(
        name = "core.brute_force.search",
        err,
        skip(self, store, query),
        fields(items = store.len(), policy = ?self.zero_norm_policy),
    )]
    fn rank(
        &self,
        store: &VectorStore,
        query: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredCandidate>> {
        ensure_searchable(store, query, top_k)?;
        let query_squares = helpers::squared_sum(query);
        let scores = (0..store.len())
            .map(|id| {
                store
                    .similarity_unchecked(id, query, query_squares, self.zero_norm_policy)
                    .map(|similarity| ScoredCandidate::new(-similarity, id))
            })
            .collect::<Result<Vec<_>>>()?;
        #[cfg(feature = "metrics")]
        metrics::counter!("brute_force_queries").increment(1);
        select_top_k(scores, top_k)
    }
}

/// Checks the preconditions shared by every search entry point: a positive
/// `top_k`, a populated store, and a finite query of the store's width.
pub(crate) fn ensure_searchable(store: &VectorStore, query: &[f32], top_k: usize) -> Result<()> {
    if top_k == 0 {
        return Err(SearchError::invalid_k(top_k));
    }
    if store.is_empty() {
        return Err(SearchError::EmptyStore);
    }
    store.validate_query(query).map_err(|error| match error {
        StoreError::DimensionMismatch { expected, actual } => {
            SearchError::DimensionMismatch { expected, actual }
        }
        other => SearchError::Store(other),
    })
}
