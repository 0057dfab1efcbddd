//! Downstream statistics over a finished attribution.

use crate::types::{
    Layer, LayerCentralityOutput, LayerName, MultilayerNetwork, Node, NodeLayerAttribution,
};
use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use {
    serde::{Deserialize, Serialize},
    tabled::Tabled,
};

/// Smoothing added to every share by [`js_divergence`] callers that have no better choice
pub const DEFAULT_JS_SMOOTHING: f64 = 0.1;

/// Base-2 Shannon entropy of a node's shares, read as an unnormalised distribution.
///
/// Negative shares carry no mass. An all-zero row has entropy 0.
pub fn shannon_entropy(attribution: &NodeLayerAttribution) -> f64 {
    let mass: Vec<f64> = attribution.values().map(|share| share.max(0.0)).collect();
    let total: f64 = mass.iter().sum();
    if total == 0.0 {
        return 0.0;
    }

    -mass
        .iter()
        .filter(|m| **m > 0.0)
        .map(|m| {
            let p = m / total;
            p * p.log2()
        })
        .sum::<f64>()
}

/// Entropy of every node in the output
pub fn entropies(output: &LayerCentralityOutput) -> BTreeMap<Node, f64> {
    output
        .iter()
        .map(|(node, attribution)| (node.clone(), shannon_entropy(attribution)))
        .collect()
}

/// Jensen-Shannon divergence (natural log) between two share vectors after adding `alpha` to
/// every entry and renormalising. Returns `None` when the lengths differ or a side has no mass.
pub fn js_divergence(p: &[f64], q: &[f64], alpha: f64) -> Option<f64> {
    if p.len() != q.len() || p.is_empty() {
        return None;
    }

    let smooth = |v: &[f64]| -> Option<Vec<f64>> {
        let shifted: Vec<f64> = v.iter().map(|x| x + alpha).collect();
        let total: f64 = shifted.iter().sum();
        (total > 0.0).then(|| shifted.into_iter().map(|x| x / total).collect())
    };
    let p = smooth(p)?;
    let q = smooth(q)?;
    let m: Vec<f64> = p.iter().zip(&q).map(|(a, b)| (a + b) / 2.0).collect();

    Some((kl_divergence(&p, &m) + kl_divergence(&q, &m)) / 2.0)
}

fn kl_divergence(p: &[f64], q: &[f64]) -> f64 {
    p.iter()
        .zip(q)
        .filter(|(a, _)| **a > 0.0)
        .map(|(a, b)| a * (a / b).ln())
        .sum()
}

/// Per-layer view across all nodes of an output
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize, Tabled))]
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSummary {
    pub layer: LayerName,
    /// Nodes whose largest share is this layer
    pub most_influenced: usize,
    pub max_share: f64,
    pub min_share: f64,
    pub mean_share: f64,
}

/// Summarise each layer column. Nodes with an all-zero row are left out of the
/// most-influenced count; ties go to the first layer by name.
pub fn summarize(output: &LayerCentralityOutput) -> Vec<LayerSummary> {
    let mut columns: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    let mut most_influenced: BTreeMap<&str, usize> = BTreeMap::new();

    for attribution in output.values() {
        let mut best: Option<(&str, f64)> = None;
        for (layer, &share) in attribution {
            columns.entry(layer.as_str()).or_default().push(share);
            if share > 0.0 && best.is_none_or(|(_, b)| share > b) {
                best = Some((layer.as_str(), share));
            }
        }
        if let Some((layer, _)) = best {
            *most_influenced.entry(layer).or_default() += 1;
        }
    }

    columns
        .into_iter()
        .map(|(layer, shares)| LayerSummary {
            layer: layer.to_string(),
            most_influenced: most_influenced.get(layer).copied().unwrap_or(0),
            max_share: shares.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            min_share: shares.iter().copied().fold(f64::INFINITY, f64::min),
            mean_share: shares.iter().sum::<f64>() / shares.len() as f64,
        })
        .collect()
}

/// Descriptive counts for one layer of the input network
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize, Tabled))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerStats {
    pub layer: LayerName,
    pub nodes: usize,
    pub edges: usize,
    /// Degree of the best connected node, 0 for a layer without edges
    pub max_degree: usize,
    /// Nodes with no edge in this layer
    pub isolated_nodes: usize,
    /// Nodes with exactly one edge in this layer
    pub pendant_nodes: usize,
}

fn degrees(layer: &Layer) -> BTreeMap<&str, usize> {
    let mut degrees: BTreeMap<&str, usize> = layer.nodes().map(|node| (node, 0)).collect();
    for (a, b) in layer.edges() {
        *degrees.entry(a).or_default() += 1;
        *degrees.entry(b).or_default() += 1;
    }
    degrees
}

/// Node, edge and degree counts of every layer, in layer order
pub fn layer_stats(network: &MultilayerNetwork) -> Vec<LayerStats> {
    network
        .layers()
        .iter()
        .map(|(name, layer)| {
            let degrees = degrees(layer);
            LayerStats {
                layer: name.clone(),
                nodes: layer.node_count(),
                edges: layer.edge_count(),
                max_degree: degrees.values().copied().max().unwrap_or(0),
                isolated_nodes: degrees.values().filter(|d| **d == 0).count(),
                pendant_nodes: degrees.values().filter(|d| **d == 1).count(),
            }
        })
        .collect()
}
