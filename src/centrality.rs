//! Centrality metrics over flattened graphs.
//!
//! [`CentralityMetric`] names the metric a run uses. Before any subset is scored it is turned
//! into a [`PreparedMetric`] carrying everything it needs; only Katz has real work to do here,
//! since its damping constant is calibrated against every layer subset of the network.

use crate::{
    error::{LayerCentralityError, Result},
    graph::FlattenedGraph,
    spectral::{self, KatzCalibration},
    subset::{LayerSet, SubsetKey},
    types::{MultilayerNetwork, Node},
};
use petgraph::{algo::dijkstra, graph::NodeIndex};
use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter},
    str::FromStr,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Node → centrality score for one flattened subset.
///
/// Nodes the metric could not score are missing, which callers treat exactly like nodes absent
/// from the subset.
pub type NodeScores = BTreeMap<Node, f64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CentralityMetric {
    /// Count of incident edges
    Degree,
    /// Sum of inverse shortest-path distances to every reachable node
    Harmonic,
    /// Principal eigenvector of the adjacency matrix
    Eigenvector,
    /// Damped count of walks ending at the node
    Katz,
    /// Closed walks weighted by the inverse factorial of their length
    Subgraph,
    /// `1/(deg(v)+1) + Σ_{u∈N(v)} 1/(deg(u)+1)`
    GameTheoretic,
}

impl CentralityMetric {
    pub const ALL: [CentralityMetric; 6] = [
        CentralityMetric::Degree,
        CentralityMetric::Harmonic,
        CentralityMetric::Eigenvector,
        CentralityMetric::Katz,
        CentralityMetric::Subgraph,
        CentralityMetric::GameTheoretic,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CentralityMetric::Degree => "degree",
            CentralityMetric::Harmonic => "harmonic",
            CentralityMetric::Eigenvector => "eigenvector",
            CentralityMetric::Katz => "katz",
            CentralityMetric::Subgraph => "subgraph",
            CentralityMetric::GameTheoretic => "game_theoretic",
        }
    }

    /// Resolve run-wide parameters. For Katz this runs the spectral pre-pass over every
    /// subset of `layer_set`.
    pub fn prepare(
        self,
        network: &MultilayerNetwork,
        layer_set: &LayerSet,
        settings: &MetricSettings,
        parallel: bool,
    ) -> Result<PreparedMetric> {
        settings.validate()?;

        Ok(match self {
            CentralityMetric::Degree => PreparedMetric::Degree,
            CentralityMetric::Harmonic => PreparedMetric::Harmonic,
            CentralityMetric::Eigenvector => PreparedMetric::Eigenvector {
                max_iter: settings.eigenvector_max_iter,
                tolerance: settings.tolerance,
            },
            CentralityMetric::Katz => {
                let calibration = KatzCalibration::run(network, layer_set, settings, parallel)?;
                PreparedMetric::Katz {
                    alpha: calibration.alpha,
                    max_iter: settings.katz_max_iter,
                    tolerance: settings.tolerance,
                }
            }
            CentralityMetric::Subgraph => PreparedMetric::Subgraph,
            CentralityMetric::GameTheoretic => PreparedMetric::GameTheoretic,
        })
    }
}

impl Display for CentralityMetric {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CentralityMetric {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        CentralityMetric::ALL
            .into_iter()
            .find(|metric| metric.name() == s.to_ascii_lowercase().replace('-', "_"))
            .ok_or_else(|| format!("unknown centrality metric: {s}"))
    }
}

/// Iteration caps and damping for the iterative metrics
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSettings {
    pub eigenvector_max_iter: usize,
    pub katz_max_iter: usize,
    /// Per-node convergence tolerance; a run stops once Σ|Δx| < n·tolerance
    pub tolerance: f64,
    /// Katz alpha = 1 / (divisor · smallest subset spectral radius); must exceed 1
    pub katz_damping_divisor: f64,
}

impl Default for MetricSettings {
    fn default() -> Self {
        Self {
            eigenvector_max_iter: 10_000,
            katz_max_iter: 1_000,
            tolerance: 1e-6,
            katz_damping_divisor: 10.0,
        }
    }
}

impl MetricSettings {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.eigenvector_max_iter == 0 || self.katz_max_iter == 0 {
            return Err(LayerCentralityError::InvalidSettings(
                "iteration caps must be at least 1".to_string(),
            ));
        }
        if !(self.tolerance > 0.0 && self.tolerance.is_finite()) {
            return Err(LayerCentralityError::InvalidSettings(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        if !(self.katz_damping_divisor > 1.0 && self.katz_damping_divisor.is_finite()) {
            return Err(LayerCentralityError::InvalidSettings(format!(
                "katz damping divisor must be greater than 1, got {}",
                self.katz_damping_divisor
            )));
        }
        Ok(())
    }
}

/// A metric with its run-wide parameters resolved
#[derive(Debug, Clone, PartialEq)]
pub enum PreparedMetric {
    Degree,
    Harmonic,
    Eigenvector { max_iter: usize, tolerance: f64 },
    Katz { alpha: f64, max_iter: usize, tolerance: f64 },
    Subgraph,
    GameTheoretic,
}

/// Why a metric produced no scores for a subset
#[derive(Debug, Clone, PartialEq)]
pub enum MetricFailure {
    NotConverged { iterations: usize },
    Spectral(String),
}

impl MetricFailure {
    pub(crate) fn into_error(self, metric: CentralityMetric, subset: &SubsetKey) -> LayerCentralityError {
        match self {
            MetricFailure::NotConverged { iterations } => LayerCentralityError::MetricConvergence {
                metric,
                subset: subset.to_string(),
                iterations,
            },
            MetricFailure::Spectral(reason) => LayerCentralityError::SpectralDecomposition {
                subset: subset.to_string(),
                reason,
            },
        }
    }
}

impl PreparedMetric {
    pub fn metric(&self) -> CentralityMetric {
        match self {
            PreparedMetric::Degree => CentralityMetric::Degree,
            PreparedMetric::Harmonic => CentralityMetric::Harmonic,
            PreparedMetric::Eigenvector { .. } => CentralityMetric::Eigenvector,
            PreparedMetric::Katz { .. } => CentralityMetric::Katz,
            PreparedMetric::Subgraph => CentralityMetric::Subgraph,
            PreparedMetric::GameTheoretic => CentralityMetric::GameTheoretic,
        }
    }

    /// Score every node of `graph` that the metric can score
    pub fn score(&self, graph: &FlattenedGraph) -> std::result::Result<NodeScores, MetricFailure> {
        match *self {
            PreparedMetric::Degree => Ok(degree(graph)),
            PreparedMetric::Harmonic => Ok(harmonic(graph)),
            PreparedMetric::Eigenvector {
                max_iter,
                tolerance,
            } => spectral::eigenvector(graph, max_iter, tolerance),
            PreparedMetric::Katz {
                alpha,
                max_iter,
                tolerance,
            } => spectral::katz(graph, alpha, max_iter, tolerance),
            PreparedMetric::Subgraph => spectral::subgraph(graph),
            PreparedMetric::GameTheoretic => Ok(game_theoretic(graph)),
        }
    }
}

fn degree(graph: &FlattenedGraph) -> NodeScores {
    graph.label_scores(graph.adjacency_lists().iter().map(|nbrs| nbrs.len() as f64))
}

/// Nodes with no reachable peer are left unscored
fn harmonic(graph: &FlattenedGraph) -> NodeScores {
    let inner = graph.inner();
    graph
        .nodes()
        .zip(inner.node_indices())
        .filter_map(|(name, start)| {
            let mut distances: Vec<(NodeIndex, usize)> = dijkstra(inner, start, None, |_| 1usize)
                .into_iter()
                .filter(|(idx, _)| *idx != start)
                .collect();
            if distances.is_empty() {
                return None;
            }
            // Fixed summation order keeps results reproducible
            distances.sort_unstable();
            let score = distances.iter().map(|(_, d)| 1.0 / *d as f64).sum();
            Some((name.to_string(), score))
        })
        .collect()
}

fn game_theoretic(graph: &FlattenedGraph) -> NodeScores {
    let adjacency = graph.adjacency_lists();
    let inverse: Vec<f64> = adjacency
        .iter()
        .map(|nbrs| 1.0 / (nbrs.len() as f64 + 1.0))
        .collect();

    graph.label_scores(
        adjacency
            .iter()
            .enumerate()
            .map(|(v, nbrs)| inverse[v] + nbrs.iter().map(|&u| inverse[u]).sum::<f64>()),
    )
}
