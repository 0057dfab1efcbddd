use crate::graph::FlattenedGraph;
use std::collections::{BTreeMap, BTreeSet};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "borsh")]
use borsh::{BorshDeserialize, BorshSerialize};

// For clarity
pub type Node = String;
pub type LayerName = String;

/// Layer name → percentage share for one node
pub type NodeLayerAttribution = BTreeMap<LayerName, f64>;

/// Per-node layer attribution, keyed by node
pub type LayerCentralityOutput = BTreeMap<Node, NodeLayerAttribution>;

/// One row of an edge list: `layer,from,to`.
///
/// A row without `to` registers `from` as a node of the layer without adding an edge.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EdgeRecord {
    pub layer: LayerName,
    pub from: Node,
    pub to: Option<Node>,
}

impl EdgeRecord {
    pub fn new(layer: &str, from: &str, to: &str) -> Self {
        Self {
            layer: layer.to_string(),
            from: from.to_string(),
            to: Some(to.to_string()),
        }
    }

    pub fn isolated(layer: &str, node: &str) -> Self {
        Self {
            layer: layer.to_string(),
            from: node.to_string(),
            to: None,
        }
    }
}

/// An undirected simple graph: one relationship type of a multilayer network.
///
/// Edges are stored with their endpoints ordered, so `(a, b)` and `(b, a)` are the same edge.
/// Self-loops are not kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layer {
    nodes: BTreeSet<Node>,
    edges: BTreeSet<(Node, Node)>,
}

impl Layer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a layer from an edge list
    pub fn from_edges<'a>(edges: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut layer = Self::new();
        for (a, b) in edges {
            layer.add_edge(a, b);
        }
        layer
    }

    pub fn add_node(&mut self, node: &str) {
        if !self.nodes.contains(node) {
            self.nodes.insert(node.to_string());
        }
    }

    pub fn add_edge(&mut self, a: &str, b: &str) {
        self.add_node(a);
        self.add_node(b);
        if a == b {
            return;
        }
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        self.edges.insert((lo.to_string(), hi.to_string()));
    }

    pub fn contains_node(&self, node: &str) -> bool {
        self.nodes.contains(node)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(String::as_str)
    }

    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.edges.iter().map(|(a, b)| (a.as_str(), b.as_str()))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

/// A set of layers over a shared node universe, keyed (and therefore ordered) by layer name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultilayerNetwork {
    layers: BTreeMap<LayerName, Layer>,
}

impl MultilayerNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a network from edge list rows
    pub fn from_records(records: impl IntoIterator<Item = EdgeRecord>) -> Self {
        let mut network = Self::new();
        for record in records {
            match record.to {
                Some(to) => network.add_edge(&record.layer, &record.from, &to),
                None => network.add_node(&record.layer, &record.from),
            }
        }
        network
    }

    /// Insert (or replace) a whole layer
    pub fn add_layer(&mut self, name: &str, layer: Layer) {
        self.layers.insert(name.to_string(), layer);
    }

    pub fn add_edge(&mut self, layer: &str, a: &str, b: &str) {
        self.layers.entry(layer.to_string()).or_default().add_edge(a, b);
    }

    pub fn add_node(&mut self, layer: &str, node: &str) {
        self.layers.entry(layer.to_string()).or_default().add_node(node);
    }

    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.get(name)
    }

    pub fn layers(&self) -> &BTreeMap<LayerName, Layer> {
        &self.layers
    }

    pub fn layer_names(&self) -> impl Iterator<Item = &str> {
        self.layers.keys().map(String::as_str)
    }

    /// Every node present in at least one layer, sorted
    pub fn actors(&self) -> BTreeSet<&str> {
        self.layers.values().flat_map(Layer::nodes).collect()
    }

    /// Get the number of layers
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Union the named layers into one simple graph. Unknown names contribute nothing.
    pub fn flatten<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> FlattenedGraph {
        FlattenedGraph::from_layers(names.into_iter().filter_map(|name| self.layers.get(name)))
    }
}

/// Export form of a [`LayerCentralityOutput`]: one row per node, one column per layer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
pub struct AttributionTable {
    pub layers: Vec<LayerName>,
    pub rows: Vec<AttributionRow>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
pub struct AttributionRow {
    pub node: Node,
    /// Percentages in the order of [`AttributionTable::layers`]
    pub shares: Vec<f64>,
}

impl AttributionTable {
    pub fn from_output(output: &LayerCentralityOutput) -> Self {
        let layers: Vec<LayerName> = output
            .values()
            .flat_map(|attribution| attribution.keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let rows = output
            .iter()
            .map(|(node, attribution)| AttributionRow {
                node: node.clone(),
                shares: layers
                    .iter()
                    .map(|layer| attribution.get(layer).copied().unwrap_or(0.0))
                    .collect(),
            })
            .collect();

        Self { layers, rows }
    }

    /// Share column for a layer
    pub fn column(&self, layer: &str) -> Option<Vec<f64>> {
        let idx = self.layers.iter().position(|l| l == layer)?;
        Some(self.rows.iter().map(|row| row.shares[idx]).collect())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(feature = "serde")]
mod csv_support {
    use super::*;
    use crate::error::Result;
    use std::{io, path::Path};
    use tabled::{builder::Builder as TableBuilder, settings::Style};

    impl MultilayerNetwork {
        /// Read a network from a `layer,from,to` CSV file
        pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
            let reader = csv::Reader::from_path(path)?;
            Self::read_records(reader)
        }

        /// Read a network from any `layer,from,to` CSV source
        pub fn from_reader<R: io::Read>(reader: R) -> Result<Self> {
            Self::read_records(csv::Reader::from_reader(reader))
        }

        fn read_records<R: io::Read>(mut reader: csv::Reader<R>) -> Result<Self> {
            let records = reader
                .deserialize()
                .collect::<std::result::Result<Vec<EdgeRecord>, _>>()?;
            Ok(Self::from_records(records))
        }
    }

    impl AttributionTable {
        /// Write the table as CSV with a `node` column followed by one column per layer
        pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<()> {
            let mut wtr = csv::Writer::from_writer(writer);
            wtr.write_record(std::iter::once("node").chain(self.layers.iter().map(String::as_str)))?;
            for row in &self.rows {
                wtr.write_record(
                    std::iter::once(row.node.clone())
                        .chain(row.shares.iter().map(|share| format!("{share:.4}"))),
                )?;
            }
            wtr.flush()?;
            Ok(())
        }

        /// Render as a text table with shares rounded to two decimals
        pub fn render(&self) -> String {
            let mut records: Vec<Vec<String>> = Vec::with_capacity(self.rows.len() + 1);
            records.push(
                std::iter::once("node".to_string())
                    .chain(self.layers.iter().cloned())
                    .collect(),
            );
            for row in &self.rows {
                records.push(
                    std::iter::once(row.node.clone())
                        .chain(row.shares.iter().map(|share| format!("{share:.2}")))
                        .collect(),
                );
            }

            TableBuilder::from(records)
                .build()
                .with(Style::psql().remove_horizontals())
                .to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_edges_are_undirected_and_simple() {
        let layer = Layer::from_edges([("b", "a"), ("a", "b"), ("c", "c")]);
        assert_eq!(layer.node_count(), 3);
        assert_eq!(layer.edge_count(), 1);
        assert_eq!(layer.edges().collect::<Vec<_>>(), vec![("a", "b")]);
        assert!(layer.contains_node("c"));
    }

    #[test]
    fn test_network_from_records() {
        let network = MultilayerNetwork::from_records(vec![
            EdgeRecord::new("work", "U1", "U2"),
            EdgeRecord::new("lunch", "U2", "U3"),
            EdgeRecord::isolated("lunch", "U9"),
        ]);

        assert_eq!(network.len(), 2);
        assert_eq!(network.layer_names().collect::<Vec<_>>(), vec!["lunch", "work"]);
        assert_eq!(
            network.actors().into_iter().collect::<Vec<_>>(),
            vec!["U1", "U2", "U3", "U9"]
        );
        let lunch = network.layer("lunch").expect("lunch layer exists");
        assert_eq!(lunch.node_count(), 3);
        assert_eq!(lunch.edge_count(), 1);
    }

    #[test]
    fn test_flatten_unions_layers() {
        let mut network = MultilayerNetwork::new();
        network.add_layer("A", Layer::from_edges([("1", "2"), ("2", "3")]));
        network.add_layer("B", Layer::from_edges([("2", "3"), ("3", "4")]));

        let flat = network.flatten(["A", "B"]);
        assert_eq!(flat.node_count(), 4);
        assert_eq!(flat.edge_count(), 3);

        let only_a = network.flatten(["A"]);
        assert_eq!(only_a.node_count(), 3);
        assert!(!only_a.contains("4"));
    }

    #[test]
    fn test_attribution_table_fills_missing_layers() {
        let mut output = LayerCentralityOutput::new();
        output.insert(
            "n1".to_string(),
            BTreeMap::from([("A".to_string(), 75.0), ("B".to_string(), 25.0)]),
        );
        output.insert("n2".to_string(), BTreeMap::from([("B".to_string(), 100.0)]));

        let table = AttributionTable::from_output(&output);
        assert_eq!(table.layers, vec!["A", "B"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[1].shares, vec![0.0, 100.0]);
        assert_eq!(table.column("A"), Some(vec![75.0, 0.0]));
        assert_eq!(table.column("C"), None);
    }
}
