//! Parameter handling for the HNSW index.

use rand::{Rng, distributions::Standard};

use crate::hnsw::error::HnswError;

const DEFAULT_MAX_CONNECTIONS: usize = 10;
const DEFAULT_EF_CONSTRUCTION: usize = 10;
const DEFAULT_LEVEL_LIMIT: usize = 2;
const DEFAULT_RNG_SEED: u64 = 0x5EED_CAFE;
/// Upper-layer and base-layer caps default to this multiple of `M`.
const DEFAULT_CAP_FACTOR: usize = 3;

/// Configuration parameters for the HNSW index.
///
/// `M` (`max_connections`) neighbours are selected per layer on insertion;
/// adjacency lists are pruned back to `MMax` on upper layers and `MMax0` on
/// layer 0. `ml` both caps the sampled level and sets the promotion
/// probability `1 / ml`.
///
/// # Examples
/// ```
/// use nns_core::HnswParams;
///
/// let params = HnswParams::new(8, 32)?
///     .with_max_connections0(24)
///     .with_ml(3)
///     .with_rng_seed(7);
/// assert_eq!(params.max_connections(), 8);
/// assert_eq!(params.max_connections_upper(), 24);
/// assert_eq!(params.max_connections0(), 24);
/// assert_eq!(params.ml(), 3);
/// # Ok::<(), nns_core::HnswError>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HnswParams {
    max_connections: usize,
    max_connections_upper: usize,
    max_connections0: usize,
    ef_construction: usize,
    ml: usize,
    rng_seed: u64,
}

impl HnswParams {
    /// Creates a parameter set with explicit neighbour and search widths.
    ///
    /// Both degree caps default to `3 * max_connections` and `ml` to 2.
    ///
    /// # Errors
    /// Returns [`HnswError::InvalidParameters`] when `max_connections` is zero
    /// or when `ef_construction` is smaller than `max_connections`.
    pub fn new(max_connections: usize, ef_construction: usize) -> Result<Self, HnswError> {
        let cap = max_connections.saturating_mul(DEFAULT_CAP_FACTOR);
        let params = Self {
            max_connections,
            max_connections_upper: cap,
            max_connections0: cap,
            ef_construction,
            ml: DEFAULT_LEVEL_LIMIT,
            rng_seed: DEFAULT_RNG_SEED,
        };
        params.validate()?;
        Ok(params)
    }

    /// Overrides the degree cap (`MMax`) applied on layers above 0.
    #[must_use]
    pub fn with_max_connections(mut self, max_connections_upper: usize) -> Self {
        self.max_connections_upper = max_connections_upper;
        self
    }

    /// Overrides the degree cap (`MMax0`) applied on layer 0.
    #[must_use]
    pub fn with_max_connections0(mut self, max_connections0: usize) -> Self {
        self.max_connections0 = max_connections0;
        self
    }

    /// Overrides the level limit and promotion divisor `ml`.
    #[must_use]
    pub fn with_ml(mut self, ml: usize) -> Self {
        self.ml = ml;
        self
    }

    /// Seeds the RNG used by [`crate::HnswIndex::build`].
    #[must_use]
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = seed;
        self
    }

    /// Returns the neighbour fan-out (`M`) selected during insertion.
    #[must_use]
    #[rustfmt::skip]
    pub fn max_connections(&self) -> usize { self.max_connections }

    /// Returns the degree cap (`MMax`) for layers above 0.
    #[must_use]
    #[rustfmt::skip]
    pub fn max_connections_upper(&self) -> usize { self.max_connections_upper }

    /// Returns the degree cap (`MMax0`) for layer 0.
    #[must_use]
    #[rustfmt::skip]
    pub fn max_connections0(&self) -> usize { self.max_connections0 }

    /// Returns the construction search breadth (`efConstruction`).
    #[must_use]
    #[rustfmt::skip]
    pub fn ef_construction(&self) -> usize { self.ef_construction }

    /// Returns the level limit `ml`.
    #[must_use]
    #[rustfmt::skip]
    pub fn ml(&self) -> usize { self.ml }

    /// Returns the seed used by [`crate::HnswIndex::build`].
    #[must_use]
    #[rustfmt::skip]
    pub fn rng_seed(&self) -> u64 { self.rng_seed }

    /// Degree cap for `layer`.
    pub(crate) fn cap_for_layer(&self, layer: usize) -> usize {
        if layer == 0 {
            self.max_connections0
        } else {
            self.max_connections_upper
        }
    }

    /// Checks the relationships between the parameters.
    ///
    /// Builder overrides are not validated eagerly; [`crate::HnswIndex::new`]
    /// calls this before accepting a parameter set.
    ///
    /// # Errors
    /// Returns [`HnswError::InvalidParameters`] describing the first violated
    /// constraint.
    pub fn validate(&self) -> Result<(), HnswError> {
        let invalid = |reason: String| Err(HnswError::InvalidParameters { reason });
        if self.max_connections == 0 {
            return invalid("max_connections must be greater than zero".into());
        }
        if self.ef_construction < self.max_connections {
            return invalid(format!(
                "ef_construction ({}) must be >= max_connections ({})",
                self.ef_construction, self.max_connections
            ));
        }
        if self.max_connections_upper < self.max_connections {
            return invalid(format!(
                "upper-layer cap ({}) must be >= max_connections ({})",
                self.max_connections_upper, self.max_connections
            ));
        }
        if self.max_connections0 < self.max_connections {
            return invalid(format!(
                "layer-0 cap ({}) must be >= max_connections ({})",
                self.max_connections0, self.max_connections
            ));
        }
        if self.ml == 0 {
            return invalid("ml must be greater than zero".into());
        }
        Ok(())
    }

    /// Draws the level for a new node.
    ///
    /// Starting at 0 the level is promoted while it is below `ml` and a
    /// uniform draw from `[0, 1)` is at least `1 / ml`, so `ml == 1` pins
    /// every node to layer 0.
    pub(crate) fn sample_level<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let threshold = 1.0 / self.ml as f64;
        let mut level = 0;
        while level < self.ml && rng.sample::<f64, _>(Standard) >= threshold {
            level += 1;
        }
        level
    }
}

impl Default for HnswParams {
    fn default() -> Self {
        let cap = DEFAULT_MAX_CONNECTIONS * DEFAULT_CAP_FACTOR;
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            max_connections_upper: cap,
            max_connections0: cap,
            ef_construction: DEFAULT_EF_CONSTRUCTION,
            ml: DEFAULT_LEVEL_LIMIT,
            rng_seed: DEFAULT_RNG_SEED,
        }
    }
}
