//! Approximate cosine search by sign-random-projection (SimHash) buckets.
//!
//! Each table draws `bits` random hyperplanes; a vector's key in that table
//! is the bit pattern of the signs of its projections. Vectors separated by a
//! small angle agree on most signs, so the union of the query's buckets over
//! all tables holds its likely neighbours. Candidates are re-ranked by exact
//! cosine similarity.

use std::collections::HashMap;

use rand::{Rng, SeedableRng, rngs::SmallRng};
use tracing::{debug, instrument};

use crate::{
    brute_force::ensure_searchable,
    distance::{ZeroNormPolicy, helpers},
    error::{Result, SearchError},
    store::VectorStore,
    topk::{ScoredCandidate, select_top_k},
};

const MAX_BITS: usize = 64;

/// Configuration for [`HashSearch`].
///
/// # Examples
/// ```
/// use nns_core::HashParams;
///
/// let params = HashParams::new(4, 12)?.with_rng_seed(3);
/// assert_eq!((params.tables(), params.bits()), (4, 12));
/// assert!(HashParams::new(4, 65).is_err());
/// # Ok::<(), nns_core::SearchError>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HashParams {
    tables: usize,
    bits: usize,
    rng_seed: u64,
}

impl HashParams {
    /// Creates parameters for `tables` hash tables of `bits`-bit keys.
    ///
    /// # Errors
    /// Returns [`SearchError::InvalidArgument`] when `tables` is zero or
    /// `bits` is outside `1..=64`.
    pub fn new(tables: usize, bits: usize) -> Result<Self> {
        if tables == 0 {
            return Err(SearchError::InvalidArgument {
                reason: "hash tables must be greater than zero".into(),
            });
        }
        if !(1..=MAX_BITS).contains(&bits) {
            return Err(SearchError::InvalidArgument {
                reason: format!("hash bits must be within 1..={MAX_BITS} (got {bits})"),
            });
        }
        Ok(Self {
            tables,
            bits,
            rng_seed: 0x5EED_CAFE,
        })
    }

    /// Seeds the hyperplane generator.
    #[must_use]
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = seed;
        self
    }

    /// Number of hash tables.
    #[must_use]
    #[rustfmt::skip]
    pub fn tables(&self) -> usize { self.tables }

    /// Key width in bits.
    #[must_use]
    #[rustfmt::skip]
    pub fn bits(&self) -> usize { self.bits }

    /// Seed for the hyperplane generator.
    #[must_use]
    #[rustfmt::skip]
    pub fn rng_seed(&self) -> u64 { self.rng_seed }
}

impl Default for HashParams {
    fn default() -> Self {
        Self {
            tables: 8,
            bits: 8,
            rng_seed: 0x5EED_CAFE,
        }
    }
}

#[derive(Clone, Debug)]
struct HashTable {
    /// `bits` hyperplanes of `dimension` components, row-major.
    planes: Vec<f32>,
    buckets: HashMap<u64, Vec<usize>>,
}

impl HashTable {
    fn key(&self, vector: &[f32]) -> u64 {
        self.planes
            .chunks_exact(vector.len())
            .enumerate()
            .filter(|(_, plane)| helpers::dot(plane, vector) >= 0.0)
            .fold(0u64, |key, (bit, _)| key | (1 << bit))
    }
}

/// SimHash index over the vectors of a [`VectorStore`].
///
/// Results always hold `min(top_k, store.len())` ids: when the query's
/// buckets yield too few candidates the remainder is filled from an exact
/// scan of the other vectors.
///
/// # Examples
/// ```
/// use nns_core::{HashParams, HashSearch, VectorStore};
///
/// let store = VectorStore::from_rows(&[[1.0, 0.0], [0.0, 1.0], [1.0, 1.0], [-1.0, 0.0]])?;
/// let index = HashSearch::build(&store, HashParams::default())?;
/// let ids = index.search(&store, &[1.0, 0.1], 2)?;
/// assert_eq!(ids.len(), 2);
/// assert_eq!(ids[0], 0);
/// # Ok::<(), nns_core::SearchError>(())
/// ```
#[derive(Clone, Debug)]
pub struct HashSearch {
    params: HashParams,
    tables: Vec<HashTable>,
    indexed: usize,
    zero_norm_policy: ZeroNormPolicy,
}

impl HashSearch {
    /// Hashes every vector in `store`.
    ///
    /// # Errors
    /// Returns [`SearchError::EmptyStore`] when `store` holds no vectors.
    #[instrument(
        name = "hash.build",
        err,
        skip(store, params),
        fields(items = store.len(), tables = params.tables, bits = params.bits),
    )]
    pub fn build(store: &VectorStore, params: HashParams) -> Result<Self> {
        let dimension = store.dimension().ok_or(SearchError::EmptyStore)?;
        let mut rng = SmallRng::seed_from_u64(params.rng_seed);
        let mut tables: Vec<HashTable> = (0..params.tables)
            .map(|_| HashTable {
                planes: (0..params.bits * dimension)
                    .map(|_| rng.gen_range(-1.0..1.0))
                    .collect(),
                buckets: HashMap::new(),
            })
            .collect();
        for table in &mut tables {
            for (id, vector) in store.iter() {
                let key = table.key(vector);
                table.buckets.entry(key).or_default().push(id);
            }
        }
        debug!(
            buckets = tables.iter().map(|table| table.buckets.len()).sum::<usize>(),
            "hash tables populated"
        );
        Ok(Self {
            params,
            tables,
            indexed: store.len(),
            zero_norm_policy: ZeroNormPolicy::default(),
        })
    }

    /// Chooses how zero-magnitude vectors are scored during re-ranking.
    #[must_use]
    pub fn with_zero_norm_policy(mut self, policy: ZeroNormPolicy) -> Self {
        self.zero_norm_policy = policy;
        self
    }

    /// Returns the parameters the index was built with.
    #[must_use]
    #[rustfmt::skip]
    pub fn params(&self) -> &HashParams { &self.params }

    /// Returns the ids of `min(top_k, store.len())` vectors similar to
    /// `query`, bucket candidates first by descending cosine similarity.
    ///
    /// # Errors
    /// - [`SearchError::InvalidArgument`] when `top_k` is zero or `store` is
    ///   not the store the index was built over.
    /// - [`SearchError::EmptyStore`] when the store holds no vectors.
    /// - [`SearchError::DimensionMismatch`] when the query width differs from
    ///   the store.
    #[instrument(
        name = "hash.search",
        err,
        skip(self, store, query),
        fields(items = store.len(), candidates = tracing::field::Empty),
    )]
    pub fn search(&self, store: &VectorStore, query: &[f32], top_k: usize) -> Result<Vec<usize>> {
        ensure_searchable(store, query, top_k)?;
        if store.len() != self.indexed {
            return Err(SearchError::InvalidArgument {
                reason: format!(
                    "store holds {} vectors but the hash index covers {}",
                    store.len(),
                    self.indexed
                ),
            });
        }

        let mut is_candidate = vec![false; store.len()];
        for table in &self.tables {
            if let Some(bucket) = table.buckets.get(&table.key(query)) {
                for &id in bucket {
                    is_candidate[id] = true;
                }
            }
        }
        let candidate_count = is_candidate.iter().filter(|&&flag| flag).count();
        tracing::Span::current().record("candidates", candidate_count);

        let query_squares = helpers::squared_sum(query);
        let score = |wanted: bool| -> Result<Vec<ScoredCandidate>> {
            is_candidate
                .iter()
                .enumerate()
                .filter(|&(_, &flag)| flag == wanted)
                .map(|(id, _)| {
                    store
                        .similarity_unchecked(id, query, query_squares, self.zero_norm_policy)
                        .map(|similarity| ScoredCandidate::new(-similarity, id))
                })
                .collect()
        };

        let mut ranked = if candidate_count == 0 {
            Vec::new()
        } else {
            select_top_k(score(true)?, top_k)?
        };
        let wanted = top_k.min(store.len());
        if ranked.len() < wanted {
            let fill = select_top_k(score(false)?, wanted - ranked.len())?;
            ranked.extend(fill);
        }
        Ok(ranked.into_iter().map(|candidate| candidate.id).collect())
    }
}
