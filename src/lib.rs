//! Layer centrality decomposition for multilayer networks
//!
//! Attributes each node's centrality in the flattened network to the individual layers it is
//! built from. Every layer is a player in a cooperative game whose value is the node's
//! centrality in the union of the participating layers; the Shapley value of a layer is its
//! average marginal contribution over all orderings, rescaled so a node's layers sum to 100.

pub mod analysis;
pub mod cache;
pub mod centrality;
pub mod error;
pub mod graph;
pub mod layer_centrality;
pub mod normalization;
pub mod shapley;
pub mod spectral;
pub mod subset;
pub mod types;
mod utils;
mod validation;

// Re-export main types and functions
pub use analysis::{
    LayerStats, LayerSummary, entropies, js_divergence, layer_stats, shannon_entropy, summarize,
};
pub use cache::{BuildOptions, SubsetCentralityCache};
pub use centrality::{CentralityMetric, MetricSettings, NodeScores, PreparedMetric};
pub use error::{LayerCentralityError, Result};
pub use graph::FlattenedGraph;
pub use layer_centrality::{DecompositionSettings, LayerCentralityInput};
pub use shapley::{PresenceRule, RawShapleyValues, ShapleyStrategy, decompose};
pub use spectral::KatzCalibration;
pub use subset::{LayerSet, LayerSubset, MAX_LAYERS, SubsetKey};
pub use types::{
    AttributionRow, AttributionTable, EdgeRecord, Layer, LayerCentralityOutput, LayerName,
    MultilayerNetwork, Node, NodeLayerAttribution,
};
