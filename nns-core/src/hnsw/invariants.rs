//! Structural invariant checks for the HNSW graph.
//!
//! The checkers are surfaced via [`HnswIndex::invariants`] so property-based
//! tests can assert graph health after each operation without reimplementing
//! internal traversal logic.

use thiserror::Error;
use tracing::{Level, debug, trace};

use super::{HnswIndex, graph::Graph, params::HnswParams};

/// Enumerates the structural invariants maintained by the HNSW graph.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HnswInvariant {
    /// Every node on layer `ℓ > 0` is also registered on layer `ℓ - 1`, and
    /// every edge targets a node registered on the same layer.
    LayerConsistency,
    /// Degrees stay within `MMax0` on layer 0 and `MMax` above it.
    DegreeBounds,
    /// Every edge has a matching reverse edge on the same layer.
    BidirectionalLinks,
    /// No node lists itself as a neighbour.
    NoSelfLoops,
    /// A populated graph has an entry point registered on the top layer.
    EntryPoint,
}

impl HnswInvariant {
    /// Returns all invariants in the order they are evaluated.
    #[must_use]
    pub const fn all() -> [Self; 5] {
        [
            Self::LayerConsistency,
            Self::DegreeBounds,
            Self::BidirectionalLinks,
            Self::NoSelfLoops,
            Self::EntryPoint,
        ]
    }
}

/// Reports an invariant violation surfaced by [`HnswInvariantChecker`].
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum HnswInvariantViolation {
    /// A node is present on a layer but missing from the layer below.
    #[error("node {node} is registered on layer {layer} but missing from the layer below")]
    MissingLowerLayer {
        /// Node with the gap in its layer membership.
        node: usize,
        /// Layer the node was found on.
        layer: usize,
    },
    /// A node references a neighbour that is not registered on the layer.
    #[error("node {origin} references {target} at layer {layer}, which is not registered there")]
    LayerConsistency {
        /// Node that emitted the invalid reference.
        origin: usize,
        /// Referenced neighbour identifier.
        target: usize,
        /// Layer index of the reference.
        layer: usize,
    },
    /// A node exceeded the configured degree bound for a specific layer.
    #[error("node {node} has {degree} connection(s) on layer {layer}, exceeding limit {limit}")]
    DegreeBounds {
        /// Node whose adjacency exceeded the allowed bound.
        node: usize,
        /// Layer containing the overflow.
        layer: usize,
        /// Actual neighbouring nodes counted.
        degree: usize,
        /// Maximum permitted neighbours for the layer.
        limit: usize,
    },
    /// A directed edge is missing its counterpart at the same layer.
    #[error("edge {origin}->{target} at layer {layer} is missing the reverse link")]
    MissingBacklink {
        /// Source node that exposes the one-way edge.
        origin: usize,
        /// Target node lacking the reverse edge.
        target: usize,
        /// Layer index containing the asymmetric edge.
        layer: usize,
    },
    /// A node lists itself as a neighbour.
    #[error("node {node} links to itself at layer {layer}")]
    SelfLoop {
        /// Offending node.
        node: usize,
        /// Layer holding the loop.
        layer: usize,
    },
    /// Reported when a populated graph lacks an entry point.
    #[error("graph entry point missing despite populated nodes")]
    MissingEntryPoint,
    /// The entry point does not sit on the top layer.
    #[error("entry point {node} at level {level} is not registered on top layer {top}")]
    InvalidEntryPoint {
        /// Entry node identifier.
        node: usize,
        /// Level recorded for the entry point.
        level: usize,
        /// Highest allocated layer.
        top: usize,
    },
}

/// Helper returned by [`HnswIndex::invariants`] to run structural checks.
#[derive(Debug)]
pub struct HnswInvariantChecker<'index> {
    graph: &'index Graph,
    params: &'index HnswParams,
}

impl<'index> HnswInvariantChecker<'index> {
    pub(super) fn new(index: &'index HnswIndex) -> Self {
        Self {
            graph: &index.graph,
            params: &index.params,
        }
    }

    /// Runs all invariants, returning the first violation encountered.
    ///
    /// # Errors
    /// Returns the first [`HnswInvariantViolation`] found.
    pub fn check_all(&self) -> Result<(), HnswInvariantViolation> {
        HnswInvariant::all()
            .into_iter()
            .try_for_each(|invariant| self.check(invariant))
    }

    /// Runs a single invariant.
    ///
    /// # Errors
    /// Returns the first [`HnswInvariantViolation`] found for `invariant`.
    pub fn check(&self, invariant: HnswInvariant) -> Result<(), HnswInvariantViolation> {
        trace!(?invariant, "checking HNSW invariant");
        let outcome = match invariant {
            HnswInvariant::LayerConsistency => self.check_layer_consistency(),
            HnswInvariant::DegreeBounds => self.check_degree_bounds(),
            HnswInvariant::BidirectionalLinks => self.check_bidirectional(),
            HnswInvariant::NoSelfLoops => self.check_self_loops(),
            HnswInvariant::EntryPoint => self.check_entry_point(),
        };
        if let Err(violation) = &outcome {
            debug!(?invariant, %violation, "HNSW invariant violated");
        }
        outcome
    }

    fn for_each_edge(
        &self,
        mut f: impl FnMut(usize, usize, usize) -> Result<(), HnswInvariantViolation>,
    ) -> Result<(), HnswInvariantViolation> {
        for (layer, nodes) in self.graph.layers() {
            for (&origin, neighbours) in nodes {
                for &target in neighbours {
                    f(origin, target, layer)?;
                }
            }
        }
        Ok(())
    }

    fn check_layer_consistency(&self) -> Result<(), HnswInvariantViolation> {
        for (layer, nodes) in self.graph.layers().skip(1) {
            for &node in nodes.keys() {
                if self.graph.neighbours(node, layer - 1).is_none() {
                    return Err(HnswInvariantViolation::MissingLowerLayer { node, layer });
                }
            }
        }
        self.for_each_edge(|origin, target, layer| {
            if self.graph.neighbours(target, layer).is_some() {
                Ok(())
            } else {
                Err(HnswInvariantViolation::LayerConsistency {
                    origin,
                    target,
                    layer,
                })
            }
        })
    }

    fn check_degree_bounds(&self) -> Result<(), HnswInvariantViolation> {
        for (layer, nodes) in self.graph.layers() {
            let limit = self.params.cap_for_layer(layer);
            for (&node, neighbours) in nodes {
                if neighbours.len() > limit {
                    return Err(HnswInvariantViolation::DegreeBounds {
                        node,
                        layer,
                        degree: neighbours.len(),
                        limit,
                    });
                }
            }
        }
        Ok(())
    }

    fn check_bidirectional(&self) -> Result<(), HnswInvariantViolation> {
        if tracing::enabled!(Level::TRACE) {
            let edges: usize = self
                .graph
                .layers()
                .flat_map(|(_, nodes)| nodes.values())
                .map(Vec::len)
                .sum();
            trace!(edges, "checking bidirectional links");
        }
        self.for_each_edge(|origin, target, layer| {
            let has_backlink = self
                .graph
                .neighbours(target, layer)
                .is_some_and(|neighbours| neighbours.contains(&origin));
            if has_backlink {
                Ok(())
            } else {
                Err(HnswInvariantViolation::MissingBacklink {
                    origin,
                    target,
                    layer,
                })
            }
        })
    }

    fn check_self_loops(&self) -> Result<(), HnswInvariantViolation> {
        self.for_each_edge(|origin, target, layer| {
            if origin == target {
                Err(HnswInvariantViolation::SelfLoop {
                    node: origin,
                    layer,
                })
            } else {
                Ok(())
            }
        })
    }

    fn check_entry_point(&self) -> Result<(), HnswInvariantViolation> {
        if self.graph.len() == 0 {
            return Ok(());
        }
        let entry = self
            .graph
            .entry()
            .ok_or(HnswInvariantViolation::MissingEntryPoint)?;
        let top = self.graph.top_layer().unwrap_or_default();
        let registered = self.graph.neighbours(entry.node, top).is_some();
        if entry.level != top || !registered {
            return Err(HnswInvariantViolation::InvalidEntryPoint {
                node: entry.node,
                level: entry.level,
                top,
            });
        }
        Ok(())
    }
}
