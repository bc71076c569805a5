//! Layered adjacency storage for the HNSW index.
//!
//! Each layer maps a node id to its neighbour list. A node assigned level `ℓ`
//! holds an (initially empty) list on every layer `0..=ℓ`, so layer membership
//! is explicit and layer 0 contains every indexed node.

use std::collections::HashMap;

use tracing::debug;

use super::{error::HnswError, search::LayerSearcher, types::EntryPoint};

type Layer = HashMap<usize, Vec<usize>>;

#[derive(Clone, Debug, Default)]
pub(crate) struct Graph {
    layers: Vec<Layer>,
    levels: Vec<usize>,
    entry: Option<EntryPoint>,
}

impl Graph {
    pub(crate) fn searcher(&self) -> LayerSearcher<'_> {
        LayerSearcher::new(self)
    }

    pub(crate) fn entry(&self) -> Option<EntryPoint> {
        self.entry
    }

    pub(crate) fn set_entry(&mut self, entry: EntryPoint) {
        debug!(node = entry.node, level = entry.level, "entry point promoted");
        self.entry = Some(entry);
    }

    /// Number of indexed nodes.
    pub(crate) fn len(&self) -> usize {
        self.levels.len()
    }

    pub(crate) fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Index of the highest allocated layer, if any.
    pub(crate) fn top_layer(&self) -> Option<usize> {
        self.layers.len().checked_sub(1)
    }

    pub(crate) fn level_of(&self, node: usize) -> Option<usize> {
        self.levels.get(node).copied()
    }

    pub(crate) fn neighbours(&self, node: usize, layer: usize) -> Option<&[usize]> {
        self.layers
            .get(layer)
            .and_then(|nodes| nodes.get(&node))
            .map(Vec::as_slice)
    }

    pub(crate) fn layers(&self) -> impl Iterator<Item = (usize, &Layer)> {
        self.layers.iter().enumerate()
    }

    /// Registers the next node id on layers `0..=level`, growing the layer
    /// stack when needed. Nodes must be registered in id order.
    pub(crate) fn register(&mut self, node: usize, level: usize) -> Result<(), HnswError> {
        if node != self.levels.len() {
            return Err(HnswError::GraphInvariantViolation {
                message: format!(
                    "node {node} registered out of order (expected {})",
                    self.levels.len()
                ),
            });
        }
        while self.layers.len() <= level {
            debug!(layer = self.layers.len(), "allocating layer");
            self.layers.push(Layer::new());
        }
        for layer in &mut self.layers[..=level] {
            layer.insert(node, Vec::new());
        }
        self.levels.push(level);
        Ok(())
    }

    /// Adds the undirected edge `left <-> right` on `layer`.
    pub(crate) fn link(&mut self, left: usize, right: usize, layer: usize) -> Result<(), HnswError> {
        if left == right {
            return Err(HnswError::GraphInvariantViolation {
                message: format!("refusing self-loop on node {left} at layer {layer}"),
            });
        }
        for (origin, target) in [(left, right), (right, left)] {
            let list = self.list_mut(origin, layer)?;
            if !list.contains(&target) {
                list.push(target);
            }
        }
        Ok(())
    }

    /// Replaces the adjacency of `node` on `layer` with `kept`, dropping the
    /// reverse edge of every neighbour that was removed.
    pub(crate) fn retain_neighbours(
        &mut self,
        node: usize,
        layer: usize,
        kept: Vec<usize>,
    ) -> Result<(), HnswError> {
        let previous = std::mem::replace(self.list_mut(node, layer)?, kept);
        let removed: Vec<usize> = {
            let current = self.list_mut(node, layer)?;
            previous
                .into_iter()
                .filter(|candidate| !current.contains(candidate))
                .collect()
        };
        for target in removed {
            self.list_mut(target, layer)?.retain(|&id| id != node);
        }
        Ok(())
    }

    /// Appends `origin -> target` without its reverse edge.
    #[cfg(test)]
    pub(crate) fn push_directed(
        &mut self,
        origin: usize,
        target: usize,
        layer: usize,
    ) -> Result<(), HnswError> {
        self.list_mut(origin, layer)?.push(target);
        Ok(())
    }

    /// Drops `node` from `layer` only, leaving its other layers intact.
    #[cfg(test)]
    pub(crate) fn evict_from_layer(&mut self, node: usize, layer: usize) {
        if let Some(nodes) = self.layers.get_mut(layer) {
            nodes.remove(&node);
        }
    }

    fn list_mut(&mut self, node: usize, layer: usize) -> Result<&mut Vec<usize>, HnswError> {
        self.layers
            .get_mut(layer)
            .and_then(|nodes| nodes.get_mut(&node))
            .ok_or_else(|| HnswError::GraphInvariantViolation {
                message: format!("node {node} is not registered on layer {layer}"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn graph_with(levels: &[usize]) -> Graph {
        let mut graph = Graph::default();
        for (node, &level) in levels.iter().enumerate() {
            graph.register(node, level).expect("nodes registered in order");
        }
        graph
    }

    #[rstest]
    fn register_allocates_layers_and_membership() {
        let graph = graph_with(&[0, 2, 1]);
        assert_eq!(graph.layer_count(), 3);
        assert_eq!(graph.top_layer(), Some(2));
        assert_eq!(graph.neighbours(1, 2), Some(&[][..]));
        assert_eq!(graph.neighbours(0, 1), None);
        assert_eq!(graph.neighbours(2, 0), Some(&[][..]));
        assert_eq!(graph.level_of(1), Some(2));
    }

    #[rstest]
    fn register_rejects_out_of_order_ids() {
        let mut graph = graph_with(&[0]);
        let err = graph.register(3, 0).expect_err("id 3 skips 1 and 2");
        assert!(matches!(err, HnswError::GraphInvariantViolation { .. }));
    }

    #[rstest]
    fn link_is_symmetric_and_idempotent() {
        let mut graph = graph_with(&[0, 0]);
        graph.link(0, 1, 0).expect("both nodes on layer 0");
        graph.link(1, 0, 0).expect("repeat link is a no-op");
        assert_eq!(graph.neighbours(0, 0), Some(&[1][..]));
        assert_eq!(graph.neighbours(1, 0), Some(&[0][..]));
    }

    #[rstest]
    fn link_rejects_self_loops_and_missing_layers() {
        let mut graph = graph_with(&[0, 0]);
        assert!(graph.link(0, 0, 0).is_err());
        assert!(graph.link(0, 1, 1).is_err());
    }

    #[rstest]
    fn retain_neighbours_removes_reverse_edges() {
        let mut graph = graph_with(&[0, 0, 0, 0]);
        for target in 1..4 {
            graph.link(0, target, 0).expect("layer 0 membership");
        }
        graph
            .retain_neighbours(0, 0, vec![2])
            .expect("node 0 is registered");
        assert_eq!(graph.neighbours(0, 0), Some(&[2][..]));
        assert_eq!(graph.neighbours(1, 0), Some(&[][..]));
        assert_eq!(graph.neighbours(2, 0), Some(&[0][..]));
        assert_eq!(graph.neighbours(3, 0), Some(&[][..]));
    }
}
