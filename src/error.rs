use crate::centrality::CentralityMetric;
use thiserror::Error;

/// Error types for the layer centrality computation
#[derive(Debug, Error)]
pub enum LayerCentralityError {
    /// The network has no layers to decompose over
    #[error("The multilayer network has no layers.")]
    EmptyNetwork,

    /// Layer names must be non-empty
    #[error("Invalid layer name {0:?}; layer names must be non-empty.")]
    InvalidLayerName(String),

    /// Too many layers for the selected Shapley walk
    #[error("There are too many layers ({count}); the selected strategy supports at most {limit}.")]
    TooManyLayers { count: usize, limit: usize },

    /// Lookup by a layer name that is not part of the layer set
    #[error("Unknown layer: {0}")]
    UnknownLayer(String),

    /// Lookup with a subset mask naming layers outside the layer set
    #[error("Layer subset {bits:#b} is not a subset of the {layers} layers of this run")]
    ForeignSubset { bits: u32, layers: usize },

    /// Lookup with zero layers
    #[error("A layer subset must contain at least one layer.")]
    EmptySubset,

    /// An iterative metric failed to stabilise within its iteration cap
    #[error(
        "{metric} centrality failed to converge on layer subset {subset} after {iterations} iterations"
    )]
    MetricConvergence {
        metric: CentralityMetric,
        subset: String,
        iterations: usize,
    },

    /// Eigen-decomposition of a subset adjacency matrix failed
    #[error("Spectral decomposition failed on layer subset {subset}: {reason}")]
    SpectralDecomposition { subset: String, reason: String },

    /// Rejected settings
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// The caller deadline passed between subset evaluations
    #[error("Deadline exceeded after evaluating {evaluated} of {total} layer subsets")]
    DeadlineExceeded { evaluated: usize, total: usize },

    /// IO error while loading a network
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed edge list
    #[cfg(feature = "serde")]
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type alias for layer centrality operations
pub type Result<T> = std::result::Result<T, LayerCentralityError>;
