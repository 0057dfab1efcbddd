use crate::{
    error::{LayerCentralityError, Result},
    layer_centrality::DecompositionSettings,
    subset::MAX_LAYERS,
    types::MultilayerNetwork,
};

/// Validate all inputs for a layer centrality computation
pub(crate) fn check_inputs(
    network: &MultilayerNetwork,
    settings: &DecompositionSettings,
) -> Result<()> {
    if network.is_empty() {
        return Err(LayerCentralityError::EmptyNetwork);
    }

    if let Some(name) = network.layer_names().find(|name| name.trim().is_empty()) {
        return Err(LayerCentralityError::InvalidLayerName(name.to_string()));
    }

    // Hard limit: the walk is factorial (or exponential) in the layer count
    let limit = settings.strategy.layer_limit().min(MAX_LAYERS);
    if network.len() > limit {
        return Err(LayerCentralityError::TooManyLayers {
            count: network.len(),
            limit,
        });
    }

    settings.metric.validate()
}
