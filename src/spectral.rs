//! Spectral centralities: eigenvector, Katz and subgraph centrality, plus the Katz damping
//! calibration.
//!
//! # Katz calibration
//!
//! The Katz series `x = Σ_k αᵏ Aᵏ 1` converges only when `α < 1/λ_max(A)`. Every subset of a
//! run shares one `α` so that scores stay comparable between subsets, which means the
//! constant has to satisfy the bound for the subset with the *smallest* spectral radius:
//!
//! ```text
//! α = 1 / (divisor · min_S λ_max(A_S))
//! ```
//!
//! [`KatzCalibration::run`] computes `λ_max` for all 2^L − 1 subsets before a single Katz score
//! is produced. Subsets without edges have no walks to damp and are left out of the minimum.

use crate::{
    centrality::{CentralityMetric, MetricFailure, MetricSettings, NodeScores},
    error::Result,
    graph::FlattenedGraph,
    subset::{LayerSet, LayerSubset, SubsetKey},
    types::MultilayerNetwork,
};
use faer::Side;
use rayon::prelude::*;
use tracing::{debug, info, instrument, warn};

/// Power iteration on `A + I`, L2-normalised each step.
///
/// A graph without edges has no principal direction; every node is left unscored.
pub(crate) fn eigenvector(
    graph: &FlattenedGraph,
    max_iter: usize,
    tolerance: f64,
) -> std::result::Result<NodeScores, MetricFailure> {
    let n = graph.node_count();
    if n == 0 || graph.edge_count() == 0 {
        return Ok(NodeScores::new());
    }

    let adjacency = graph.adjacency_lists();
    let threshold = n as f64 * tolerance;
    let mut x = vec![1.0 / n as f64; n];

    for _ in 0..max_iter {
        let last = x.clone();
        for (v, nbrs) in adjacency.iter().enumerate() {
            for &u in nbrs {
                x[u] += last[v];
            }
        }

        let norm = x.iter().map(|v| v * v).sum::<f64>().sqrt();
        let norm = if norm == 0.0 { 1.0 } else { norm };
        x.iter_mut().for_each(|v| *v /= norm);

        let delta: f64 = x.iter().zip(&last).map(|(a, b)| (a - b).abs()).sum();
        if delta < threshold {
            return Ok(graph.label_scores(x));
        }
    }

    Err(MetricFailure::NotConverged {
        iterations: max_iter,
    })
}

/// Fixed-point iteration of `x ← α·A·x + 1`
pub(crate) fn katz(
    graph: &FlattenedGraph,
    alpha: f64,
    max_iter: usize,
    tolerance: f64,
) -> std::result::Result<NodeScores, MetricFailure> {
    let n = graph.node_count();
    if n == 0 {
        return Ok(NodeScores::new());
    }

    let adjacency = graph.adjacency_lists();
    let threshold = n as f64 * tolerance;
    let mut x = vec![0.0; n];

    for _ in 0..max_iter {
        let last = std::mem::replace(&mut x, vec![0.0; n]);
        for (v, nbrs) in adjacency.iter().enumerate() {
            for &u in nbrs {
                x[u] += last[v];
            }
        }
        x.iter_mut().for_each(|v| *v = alpha * *v + 1.0);

        let delta: f64 = x.iter().zip(&last).map(|(a, b)| (a - b).abs()).sum();
        if delta < threshold {
            return Ok(graph.label_scores(x));
        }
    }

    Err(MetricFailure::NotConverged {
        iterations: max_iter,
    })
}

/// `SC(i) = Σ_j U_ij² · exp(λ_j)` from the symmetric eigen-decomposition `A = U Λ Uᵀ`
pub(crate) fn subgraph(graph: &FlattenedGraph) -> std::result::Result<NodeScores, MetricFailure> {
    let n = graph.node_count();
    if n == 0 {
        return Ok(NodeScores::new());
    }

    let adjacency = graph.adjacency_matrix();
    let evd = adjacency
        .self_adjoint_eigen(Side::Lower)
        .map_err(|e| MetricFailure::Spectral(format!("{e:?}")))?;
    let eigenvalues = evd.S().column_vector();
    let eigenvectors = evd.U();

    let exp_lambda: Vec<f64> = (0..n).map(|j| eigenvalues[j].exp()).collect();
    Ok(graph.label_scores((0..n).map(|i| {
        exp_lambda
            .iter()
            .enumerate()
            .map(|(j, e)| eigenvectors[(i, j)].powi(2) * e)
            .sum::<f64>()
    })))
}

/// Spectral radius of the adjacency matrix; `None` for graphs without edges
pub fn largest_eigenvalue(graph: &FlattenedGraph) -> std::result::Result<Option<f64>, MetricFailure> {
    if graph.edge_count() == 0 {
        return Ok(None);
    }

    let eigenvalues = graph
        .adjacency_matrix()
        .self_adjoint_eigenvalues(Side::Lower)
        .map_err(|e| MetricFailure::Spectral(format!("{e:?}")))?;

    Ok(eigenvalues.into_iter().reduce(f64::max))
}

/// Result of the Katz pre-pass
#[derive(Debug, Clone, PartialEq)]
pub struct KatzCalibration {
    /// Smallest spectral radius over all subsets that have edges
    pub min_spectral_radius: Option<f64>,
    /// The subset that attained it
    pub subset: Option<SubsetKey>,
    pub alpha: f64,
}

impl KatzCalibration {
    #[instrument(skip_all, fields(layers = layer_set.len(), subsets = layer_set.subset_count()))]
    pub fn run(
        network: &MultilayerNetwork,
        layer_set: &LayerSet,
        settings: &MetricSettings,
        parallel: bool,
    ) -> Result<Self> {
        let evaluate = |subset: LayerSubset| -> Result<(LayerSubset, Option<f64>)> {
            let graph = network.flatten(layer_set.members(subset));
            let radius = largest_eigenvalue(&graph)
                .map_err(|f| f.into_error(CentralityMetric::Katz, &layer_set.key(subset)))?;
            debug!(subset = %layer_set.key(subset), ?radius, "spectral radius");
            Ok((subset, radius))
        };

        let subsets: Vec<LayerSubset> = layer_set.subsets().collect();
        let radii: Vec<(LayerSubset, Option<f64>)> = if parallel {
            subsets.into_par_iter().map(&evaluate).collect::<Result<_>>()?
        } else {
            subsets.into_iter().map(&evaluate).collect::<Result<_>>()?
        };

        let smallest = radii
            .into_iter()
            .filter_map(|(subset, radius)| radius.map(|r| (subset, r)))
            .min_by(|a, b| a.1.total_cmp(&b.1));

        let calibration = match smallest {
            Some((subset, radius)) => Self {
                min_spectral_radius: Some(radius),
                subset: Some(layer_set.key(subset)),
                alpha: 1.0 / (settings.katz_damping_divisor * radius),
            },
            None => {
                warn!("no layer subset has edges; katz damping falls back to 1/divisor");
                Self {
                    min_spectral_radius: None,
                    subset: None,
                    alpha: 1.0 / settings.katz_damping_divisor,
                }
            }
        };

        info!(
            alpha = calibration.alpha,
            min_spectral_radius = ?calibration.min_spectral_radius,
            "katz damping calibrated"
        );
        Ok(calibration)
    }
}
