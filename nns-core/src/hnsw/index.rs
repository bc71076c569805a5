//! The public HNSW index: incremental insertion, batch build, and k-NN
//! queries over vectors held in a [`VectorStore`].

use rand::{Rng, SeedableRng, rngs::SmallRng};
use tracing::{Span, debug, instrument};

use crate::{store::VectorStore, topk::ScoredCandidate};

use super::{
    error::HnswError,
    graph::Graph,
    insert::{InsertionPlanner, commit_plan},
    invariants::{HnswInvariantChecker, HnswInvariantViolation},
    params::HnswParams,
    search::SearchContext,
    types::{EntryPoint, InsertionPlan},
};

/// Hierarchical Navigable Small World index over a [`VectorStore`].
///
/// The index refers to vectors by id only; the store that owns them is passed
/// to every call. Mutation takes `&mut self` and queries take `&self`, so a
/// single writer excludes concurrent readers at compile time.
///
/// # Examples
/// ```
/// use nns_core::{HnswIndex, HnswParams, VectorStore};
/// use rand::{SeedableRng, rngs::SmallRng};
///
/// let mut store = VectorStore::new();
/// let mut index = HnswIndex::new(HnswParams::default())?;
/// let mut rng = SmallRng::seed_from_u64(7);
/// for row in [[0.0, 0.0], [1.0, 0.0], [5.0, 5.0], [0.9, 0.1]] {
///     index.insert(&mut store, &row, &mut rng)?;
/// }
/// let nearest = index.knn_search(&store, &[1.0, 0.05], 2)?;
/// assert_eq!(nearest, vec![1, 3]);
/// # Ok::<(), nns_core::HnswError>(())
/// ```
#[derive(Clone, Debug)]
pub struct HnswIndex {
    pub(super) params: HnswParams,
    pub(super) graph: Graph,
}

impl HnswIndex {
    /// Creates an empty index.
    ///
    /// # Errors
    /// Returns [`HnswError::InvalidParameters`] when `params` fail
    /// [`HnswParams::validate`].
    pub fn new(params: HnswParams) -> Result<Self, HnswError> {
        params.validate()?;
        Ok(Self {
            params,
            graph: Graph::default(),
        })
    }

    /// Indexes every vector already held by `store`, in id order.
    ///
    /// Levels are drawn from a [`SmallRng`] seeded with
    /// [`HnswParams::rng_seed`], so the same store and parameters always
    /// produce the same graph.
    ///
    /// # Errors
    /// Returns [`HnswError::InvalidParameters`] for invalid parameters and
    /// propagates any failure raised while linking a node.
    #[instrument(
        name = "hnsw.build",
        err,
        skip(store, params),
        fields(items = store.len(), m = params.max_connections()),
    )]
    pub fn build(store: &VectorStore, params: HnswParams) -> Result<Self, HnswError> {
        let mut index = Self::new(params)?;
        let mut rng = SmallRng::seed_from_u64(index.params.rng_seed());
        for (id, vector) in store.iter() {
            if index.graph.entry().is_none() {
                index.seed(id)?;
                continue;
            }
            let level = index.params.sample_level(&mut rng);
            let plan = index.plan(store, vector, level)?;
            index.attach(store, id, level, plan)?;
        }
        Ok(index)
    }

    /// Appends `vector` to `store` and links it into the graph, returning its
    /// id.
    ///
    /// The first vector becomes the entry point on layer 0. Every later
    /// vector draws a level from `rng`, descends greedily from the entry
    /// point, and is linked to its `M` closest candidates on each layer it
    /// shares with the graph.
    ///
    /// # Errors
    /// - [`HnswError::StoreMismatch`] when `store` does not hold exactly the
    ///   vectors this index has indexed.
    /// - [`HnswError::Store`] when `vector` is rejected by the store; the
    ///   store and index are unchanged.
    #[instrument(
        name = "hnsw.insert",
        err,
        skip(self, store, vector, rng),
        fields(id = store.len(), level = tracing::field::Empty),
    )]
    pub fn insert<R: Rng + ?Sized>(
        &mut self,
        store: &mut VectorStore,
        vector: &[f32],
        rng: &mut R,
    ) -> Result<usize, HnswError> {
        self.ensure_store_matches(store)?;
        if self.graph.entry().is_none() {
            let id = store.add(vector)?;
            self.seed(id)?;
            Span::current().record("level", 0);
            return Ok(id);
        }

        store.validate_query(vector)?;
        let level = self.params.sample_level(rng);
        Span::current().record("level", level);
        let plan = self.plan(store, vector, level)?;
        let id = store.add(vector)?;
        self.attach(store, id, level, plan)?;
        Ok(id)
    }

    /// Returns the ids of the (approximately) `k` nearest vectors to `query`
    /// by squared Euclidean distance, closest first.
    ///
    /// Layer 0 is searched with a beam of `k`.
    ///
    /// # Errors
    /// - [`HnswError::InvalidArgument`] when `k` is zero.
    /// - [`HnswError::GraphEmpty`] when nothing has been indexed.
    /// - [`HnswError::Store`] when the query width differs from the store.
    pub fn knn_search(
        &self,
        store: &VectorStore,
        query: &[f32],
        k: usize,
    ) -> Result<Vec<usize>, HnswError> {
        self.knn_search_with_ef(store, query, k, k)
    }

    /// Like [`HnswIndex::knn_search`] but searches layer 0 with a beam of
    /// `max(ef, k)`, trading speed for recall.
    ///
    /// # Errors
    /// As for [`HnswIndex::knn_search`].
    pub fn knn_search_with_ef(
        &self,
        store: &VectorStore,
        query: &[f32],
        k: usize,
        ef: usize,
    ) -> Result<Vec<usize>, HnswError> {
        let scored = self.search(store, query, k, ef)?;
        Ok(scored.into_iter().map(|candidate| candidate.id).collect())
    }

    /// Like [`HnswIndex::knn_search`] but returns each id with its squared
    /// Euclidean distance as the score.
    ///
    /// # Errors
    /// As for [`HnswIndex::knn_search`].
    pub fn knn_search_scored(
        &self,
        store: &VectorStore,
        query: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredCandidate>, HnswError> {
        self.search(store, query, k, k)
    }

    #[instrument(
        name = "hnsw.knn_search",
        err,
        skip(self, store, query),
        fields(items = self.len()),
    )]
    fn search(
        &self,
        store: &VectorStore,
        query: &[f32],
        k: usize,
        ef: usize,
    ) -> Result<Vec<ScoredCandidate>, HnswError> {
        if k == 0 {
            return Err(HnswError::invalid_k(k));
        }
        let entry = self.graph.entry().ok_or(HnswError::GraphEmpty)?;
        self.ensure_store_matches(store)?;
        store.validate_query(query)?;

        let searcher = self.graph.searcher();
        let mut current = entry.node;
        for layer in (1..=entry.level).rev() {
            current = searcher.greedy_search_layer(
                store,
                SearchContext {
                    query,
                    entry: current,
                    layer,
                },
            )?;
        }
        let mut neighbours = searcher.search_layer(
            store,
            SearchContext {
                query,
                entry: current,
                layer: 0,
            }
            .with_ef(ef.max(k)),
        )?;
        neighbours.truncate(k);
        #[cfg(feature = "metrics")]
        metrics::counter!("hnsw_queries").increment(1);
        Ok(neighbours)
    }

    /// Returns the number of indexed vectors.
    #[must_use]
    #[rustfmt::skip]
    pub fn len(&self) -> usize { self.graph.len() }

    /// Returns whether the index holds no vectors.
    #[must_use]
    #[rustfmt::skip]
    pub fn is_empty(&self) -> bool { self.graph.len() == 0 }

    /// Returns the parameters the index was built with.
    #[must_use]
    #[rustfmt::skip]
    pub fn params(&self) -> &HnswParams { &self.params }

    /// Returns the entry node and its level, or `None` for an empty index.
    #[must_use]
    pub fn entry_point(&self) -> Option<(usize, usize)> {
        self.graph.entry().map(|entry| (entry.node, entry.level))
    }

    /// Returns the number of allocated layers.
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.graph.layer_count()
    }

    /// Returns the level assigned to `node`.
    #[must_use]
    pub fn level_of(&self, node: usize) -> Option<usize> {
        self.graph.level_of(node)
    }

    /// Returns the neighbours of `node` on `layer`, or `None` when the node is
    /// not registered on that layer.
    #[must_use]
    pub fn neighbours(&self, node: usize, layer: usize) -> Option<&[usize]> {
        self.graph.neighbours(node, layer)
    }

    /// Returns a checker for the graph's structural invariants.
    #[must_use]
    pub fn invariants(&self) -> HnswInvariantChecker<'_> {
        HnswInvariantChecker::new(self)
    }

    /// Runs every structural invariant check.
    ///
    /// # Errors
    /// Returns the first [`HnswInvariantViolation`] found.
    pub fn check_invariants(&self) -> Result<(), HnswInvariantViolation> {
        self.invariants().check_all()
    }

    fn ensure_store_matches(&self, store: &VectorStore) -> Result<(), HnswError> {
        if store.len() == self.graph.len() {
            Ok(())
        } else {
            Err(HnswError::StoreMismatch {
                store_len: store.len(),
                indexed: self.graph.len(),
            })
        }
    }

    fn seed(&mut self, id: usize) -> Result<(), HnswError> {
        self.graph.register(id, 0)?;
        self.graph.set_entry(EntryPoint { node: id, level: 0 });
        Ok(())
    }

    fn plan(
        &self,
        store: &VectorStore,
        query: &[f32],
        level: usize,
    ) -> Result<InsertionPlan, HnswError> {
        InsertionPlanner::new(&self.graph).plan(store, query, level, &self.params)
    }

    fn attach(
        &mut self,
        store: &VectorStore,
        id: usize,
        level: usize,
        plan: InsertionPlan,
    ) -> Result<(), HnswError> {
        self.graph.register(id, level)?;
        commit_plan(&mut self.graph, store, &self.params, id, plan)?;
        if self.graph.top_layer() == Some(level) {
            self.graph.set_entry(EntryPoint { node: id, level });
        }
        debug!(id, level, "node inserted");
        #[cfg(feature = "metrics")]
        metrics::counter!("hnsw_insertions").increment(1);
        Ok(())
    }
}
