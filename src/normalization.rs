//! Turns raw Shapley values into percentage attributions.
//!
//! Every node gets one entry per layer. Layers the node does not belong to are pinned to 0
//! before the remaining layers are rescaled to sum to 100. A node whose total mass is zero
//! (no centrality anywhere, or not in the network at all) gets 0 everywhere.

use crate::{
    shapley::RawShapleyValues,
    subset::LayerSet,
    types::{LayerCentralityOutput, MultilayerNetwork, NodeLayerAttribution},
};
use tracing::debug;

/// Normalise one node's raw values. `present[i]` is false when the node is structurally
/// absent from layer `i`.
pub fn normalize_node(raw: &[f64], present: &[bool], layer_set: &LayerSet) -> NodeLayerAttribution {
    let masked: Vec<f64> = raw
        .iter()
        .zip(present)
        .map(|(&value, &present)| if present { value } else { 0.0 })
        .collect();

    let total: f64 = masked.iter().sum();
    layer_set
        .names()
        .iter()
        .zip(masked)
        .map(|(layer, value)| {
            let share = if total != 0.0 { value / total * 100.0 } else { 0.0 };
            (layer.clone(), share)
        })
        .collect()
}

/// Which layers of `layer_set` contain `node`
pub fn layer_presence(network: &MultilayerNetwork, layer_set: &LayerSet, node: &str) -> Vec<bool> {
    layer_set
        .names()
        .iter()
        .map(|name| network.layer(name).is_some_and(|layer| layer.contains_node(node)))
        .collect()
}

pub fn normalize(
    raw: RawShapleyValues,
    network: &MultilayerNetwork,
    layer_set: &LayerSet,
) -> LayerCentralityOutput {
    raw.into_iter()
        .map(|(node, values)| {
            let present = layer_presence(network, layer_set, &node);
            let attribution = normalize_node(&values, &present, layer_set);
            if attribution.values().all(|share| *share == 0.0) {
                debug!(node = %node, "zero shapley mass");
            }
            (node, attribution)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Layer;

    fn layer_set() -> LayerSet {
        LayerSet::new(["A", "B", "C"])
    }

    #[test]
    fn test_rescales_to_one_hundred() {
        let attribution = normalize_node(&[1.5, 0.5, 0.0], &[true, true, true], &layer_set());
        assert_eq!(attribution["A"], 75.0);
        assert_eq!(attribution["B"], 25.0);
        assert_eq!(attribution["C"], 0.0);
    }

    #[test]
    fn test_zero_mass_is_all_zero() {
        let attribution = normalize_node(&[0.0, 0.0, 0.0], &[true, false, true], &layer_set());
        assert_eq!(attribution.len(), 3);
        assert!(attribution.values().all(|share| *share == 0.0));
    }

    #[test]
    fn test_absent_layer_pinned_to_zero() {
        let attribution = normalize_node(&[1.0, 3.0, 1.0], &[true, false, true], &layer_set());
        assert_eq!(attribution["A"], 50.0);
        assert_eq!(attribution["B"], 0.0);
        assert_eq!(attribution["C"], 50.0);
    }

    #[test]
    fn test_layer_presence() {
        let mut network = MultilayerNetwork::new();
        network.add_layer("A", Layer::from_edges([("x", "y")]));
        network.add_layer("B", Layer::from_edges([("y", "z")]));
        let layer_set = LayerSet::from_network(&network);

        assert_eq!(layer_presence(&network, &layer_set, "x"), vec![true, false]);
        assert_eq!(layer_presence(&network, &layer_set, "y"), vec![true, true]);
        assert_eq!(layer_presence(&network, &layer_set, "w"), vec![false, false]);
    }

    #[test]
    fn test_normalize_keeps_every_node_and_layer() {
        let mut network = MultilayerNetwork::new();
        network.add_layer("A", Layer::from_edges([("x", "y")]));
        network.add_layer("B", Layer::from_edges([("y", "z")]));
        let layer_set = LayerSet::from_network(&network);

        let raw = RawShapleyValues::from([
            ("y".to_string(), vec![1.0, 1.0]),
            ("ghost".to_string(), vec![0.0, 0.0]),
        ]);
        let output = normalize(raw, &network, &layer_set);

        assert_eq!(output.len(), 2);
        assert_eq!(output["y"]["A"], 50.0);
        assert_eq!(output["ghost"].len(), 2);
        assert!(output["ghost"].values().all(|share| *share == 0.0));
    }
}
