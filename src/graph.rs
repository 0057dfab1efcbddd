//! Flattened graphs: the union of a subset of layers as one simple undirected graph.
//!
//! Nodes are inserted in sorted name order, so `NodeIndex::new(i)` is the i-th node by name and
//! the dense adjacency matrix rows line up with [`FlattenedGraph::nodes`].

use crate::types::{Layer, Node};
use faer::Mat;
use petgraph::{
    graph::{NodeIndex, UnGraph},
    visit::EdgeRef,
};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone)]
pub struct FlattenedGraph {
    graph: UnGraph<Node, ()>,
    node_map: BTreeMap<Node, NodeIndex>,
}

impl FlattenedGraph {
    /// Union the nodes and edges of `layers`; duplicate edges collapse.
    pub fn from_layers<'a>(layers: impl IntoIterator<Item = &'a Layer>) -> Self {
        let layers: Vec<&Layer> = layers.into_iter().collect();

        let names: BTreeSet<&str> = layers.iter().flat_map(|layer| layer.nodes()).collect();
        let mut graph = UnGraph::with_capacity(names.len(), 0);
        let mut node_map = BTreeMap::new();
        for name in names {
            let idx = graph.add_node(name.to_string());
            node_map.insert(name.to_string(), idx);
        }

        for layer in layers {
            for (a, b) in layer.edges() {
                if let (Some(&ia), Some(&ib)) = (node_map.get(a), node_map.get(b)) {
                    graph.update_edge(ia, ib, ());
                }
            }
        }

        Self { graph, node_map }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn contains(&self, node: &str) -> bool {
        self.node_map.contains_key(node)
    }

    /// Node names in index order
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.node_map.keys().map(String::as_str)
    }

    pub fn degree(&self, node: &str) -> Option<usize> {
        let idx = self.node_map.get(node)?;
        Some(self.graph.neighbors(*idx).count())
    }

    pub(crate) fn inner(&self) -> &UnGraph<Node, ()> {
        &self.graph
    }

    /// Neighbour indices per node, in index order
    pub(crate) fn adjacency_lists(&self) -> Vec<Vec<usize>> {
        self.graph
            .node_indices()
            .map(|idx| self.graph.neighbors(idx).map(|n| n.index()).collect())
            .collect()
    }

    /// Dense symmetric 0/1 adjacency matrix
    pub(crate) fn adjacency_matrix(&self) -> Mat<f64> {
        let n = self.node_count();
        let mut adjacency = Mat::zeros(n, n);
        for edge in self.graph.edge_references() {
            let (i, j) = (edge.source().index(), edge.target().index());
            adjacency[(i, j)] = 1.0;
            adjacency[(j, i)] = 1.0;
        }
        adjacency
    }

    /// Attach node names to a score vector laid out in index order
    pub(crate) fn label_scores(&self, scores: impl IntoIterator<Item = f64>) -> BTreeMap<Node, f64> {
        self.node_map.keys().cloned().zip(scores).collect()
    }
}
