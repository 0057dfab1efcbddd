use crate::{
    cache::SubsetCentralityCache,
    subset::LayerSubset,
    types::{MultilayerNetwork, Node},
    utils::{factorial, next_permutation},
};
use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::{info, instrument};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Raw (averaged, not yet normalised) Shapley value per layer index, keyed by node
pub type RawShapleyValues = BTreeMap<Node, Vec<f64>>;

/// How the orderings of layers are averaged
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ShapleyStrategy {
    /// Walk every ordering of the node's layers prefix by prefix
    #[default]
    Permutations,
    /// Visit each (coalition, joining layer) pair once with weight (|S|-1)!(P-|S|)!/P!,
    /// P being the number of layers that contain the node
    Coalitions,
}

impl ShapleyStrategy {
    /// Largest layer count the strategy accepts
    pub fn layer_limit(self) -> usize {
        match self {
            ShapleyStrategy::Permutations => 10,
            ShapleyStrategy::Coalitions => 20,
        }
    }
}

/// Marginal contribution when the node is scored in only one of two consecutive prefixes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PresenceRule {
    /// Contribute nothing
    #[default]
    Skip,
    /// Read the missing score as 0, so a node that newly appears is credited its full score
    AbsentAsZero,
}

/// Running per-layer sums of marginal contributions for one node
#[derive(Debug, Clone, PartialEq)]
pub struct ShapleyAccumulator {
    totals: Vec<f64>,
    orderings: u64,
}

impl ShapleyAccumulator {
    pub fn new(n_layers: usize) -> Self {
        Self {
            totals: vec![0.0; n_layers],
            orderings: 0,
        }
    }

    pub fn add(&mut self, layer: usize, contribution: f64) {
        self.totals[layer] += contribution;
    }

    pub fn complete_ordering(&mut self) {
        self.orderings += 1;
    }

    pub fn orderings(&self) -> u64 {
        self.orderings
    }

    /// Divide each running sum by the number of orderings walked
    pub fn average(self) -> Vec<f64> {
        if self.orderings == 0 {
            return self.totals;
        }
        let n = self.orderings as f64;
        self.totals.into_iter().map(|total| total / n).collect()
    }
}

/// Score gained by `node` when the layer completing `subset` joins `predecessor`.
/// A missing predecessor means the layer is first in the ordering.
fn marginal(
    cache: &SubsetCentralityCache,
    subset: LayerSubset,
    predecessor: Option<LayerSubset>,
    node: &str,
    rule: PresenceRule,
) -> f64 {
    let current = cache.score(subset, node);
    let Some(predecessor) = predecessor else {
        return current.unwrap_or(0.0);
    };

    match (current, cache.score(predecessor, node), rule) {
        (Some(with), Some(without), _) => with - without,
        (with, without, PresenceRule::AbsentAsZero) => {
            with.unwrap_or(0.0) - without.unwrap_or(0.0)
        }
        (_, _, PresenceRule::Skip) => 0.0,
    }
}

/// Average marginal contribution over every ordering of the `players` layers, enumerated
/// lexicographically
fn permutation_walk(
    cache: &SubsetCentralityCache,
    players: LayerSubset,
    node: &str,
    rule: PresenceRule,
) -> Vec<f64> {
    let mut accumulator = ShapleyAccumulator::new(cache.layer_set().len());
    let mut ordering: Vec<usize> = players.indices().collect();

    loop {
        let mut prefix: Option<LayerSubset> = None;
        for &layer in &ordering {
            let subset = prefix.map_or(LayerSubset::single(layer), |p| p.with(layer));
            accumulator.add(layer, marginal(cache, subset, prefix, node, rule));
            prefix = Some(subset);
        }
        accumulator.complete_ordering();

        if !next_permutation(&mut ordering) {
            break;
        }
    }

    accumulator.average()
}

/// Same values as [`permutation_walk`], grouping orderings by the coalition a layer joins
fn coalition_walk(
    cache: &SubsetCentralityCache,
    players: LayerSubset,
    node: &str,
    rule: PresenceRule,
) -> Vec<f64> {
    let n_players = players.len();
    let fact_n = factorial(n_players);
    let mut shapley_values = vec![0.0; cache.layer_set().len()];

    for k in players.indices() {
        // Coalitions of players with this layer
        for subset in players.submasks().filter(|s| s.contains(k)) {
            let size = subset.len();
            let weight = factorial(size - 1) * factorial(n_players - size) / fact_n;
            shapley_values[k] += weight * marginal(cache, subset, subset.without(k), node, rule);
        }
    }

    shapley_values
}

/// Raw Shapley value of every layer for every requested node.
///
/// Each node plays its own game whose players are the layers that contain it; every other
/// layer is pinned to 0. A node in no layer gets all zeros. Nodes are walked independently
/// and each sums its orderings in a fixed order, so the parallel and sequential paths give
/// identical results.
#[instrument(skip_all, fields(metric = %cache.metric(), nodes = nodes.len(), strategy = ?strategy, rule = ?rule))]
pub fn decompose(
    cache: &SubsetCentralityCache,
    network: &MultilayerNetwork,
    nodes: &[Node],
    strategy: ShapleyStrategy,
    rule: PresenceRule,
    parallel: bool,
) -> RawShapleyValues {
    let n_layers = cache.layer_set().len();
    let walk = |node: &Node| {
        let values = match cache.layer_set().presence(network, node) {
            None => vec![0.0; n_layers],
            Some(players) => match strategy {
                ShapleyStrategy::Permutations => permutation_walk(cache, players, node, rule),
                ShapleyStrategy::Coalitions => coalition_walk(cache, players, node, rule),
            },
        };
        (node.clone(), values)
    };

    let raw: RawShapleyValues = if parallel {
        nodes.par_iter().map(walk).collect()
    } else {
        nodes.iter().map(walk).collect()
    };

    info!(nodes = raw.len(), "shapley decomposition complete");
    raw
}
