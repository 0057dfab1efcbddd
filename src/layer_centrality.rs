use crate::{
    cache::{BuildOptions, SubsetCentralityCache},
    centrality::{CentralityMetric, MetricSettings},
    error::Result,
    normalization::normalize,
    shapley::{PresenceRule, ShapleyStrategy, decompose},
    subset::LayerSet,
    types::{LayerCentralityOutput, MultilayerNetwork, Node},
    validation::check_inputs,
};
use faer::Par;
use std::{sync::Once, time::Instant};
use tracing::{info, instrument};

/// Knobs shared by every metric
#[derive(Debug, Clone, PartialEq)]
pub struct DecompositionSettings {
    pub strategy: ShapleyStrategy,
    pub presence_rule: PresenceRule,
    pub metric: MetricSettings,
    /// Fan subset evaluation and per-node walks out over rayon
    pub parallel: bool,
    /// Abort with `DeadlineExceeded` once passed
    pub deadline: Option<Instant>,
}

impl Default for DecompositionSettings {
    fn default() -> Self {
        Self {
            strategy: ShapleyStrategy::default(),
            presence_rule: PresenceRule::default(),
            metric: MetricSettings::default(),
            parallel: true,
            deadline: None,
        }
    }
}

/// Input parameters for a layer centrality decomposition
#[derive(Debug, Clone)]
pub struct LayerCentralityInput {
    pub network: MultilayerNetwork,
    /// Nodes to attribute. Nodes outside the network come back with all-zero rows.
    pub nodes: Vec<Node>,
    pub metric: CentralityMetric,
    pub settings: DecompositionSettings,
}

impl LayerCentralityInput {
    /// Attribute every actor of `network` with default settings
    pub fn new(network: MultilayerNetwork, metric: CentralityMetric) -> Self {
        let nodes = network.actors().into_iter().map(str::to_string).collect();
        Self {
            network,
            nodes,
            metric,
            settings: DecompositionSettings::default(),
        }
    }

    pub fn compute(&self) -> Result<LayerCentralityOutput> {
        let decomposition = LayerCentrality::new(
            &self.network,
            &self.nodes,
            self.metric,
            &self.settings,
        );

        let output = decomposition.compute()?;
        Ok(output)
    }
}

static FAER_PARALLELISM: Once = Once::new();

/// Subsets and nodes fan out over rayon, so each eigendecomposition stays on its own thread.
/// Sequential runs need the same setting to stay on one thread.
fn single_threaded_faer() {
    FAER_PARALLELISM.call_once(|| faer::set_global_parallelism(Par::Seq));
}

#[derive(Debug)]
struct LayerCentrality<'a> {
    network: &'a MultilayerNetwork,
    nodes: &'a [Node],
    metric: CentralityMetric,
    settings: &'a DecompositionSettings,
}

impl<'a> LayerCentrality<'a> {
    fn new(
        network: &'a MultilayerNetwork,
        nodes: &'a [Node],
        metric: CentralityMetric,
        settings: &'a DecompositionSettings,
    ) -> Self {
        Self {
            network,
            nodes,
            metric,
            settings,
        }
    }

    #[instrument(skip_all, fields(metric = %self.metric, layers = self.network.len(), nodes = self.nodes.len()))]
    fn compute(&self) -> Result<LayerCentralityOutput> {
        check_inputs(self.network, self.settings)?;

        let parallel = self.settings.parallel;
        single_threaded_faer();

        let layer_set = LayerSet::from_network(self.network);
        let prepared = self
            .metric
            .prepare(self.network, &layer_set, &self.settings.metric, parallel)?;

        let cache = SubsetCentralityCache::build(
            self.network,
            &layer_set,
            &prepared,
            BuildOptions {
                parallel,
                deadline: self.settings.deadline,
            },
        )?;

        let raw = decompose(
            &cache,
            self.network,
            self.nodes,
            self.settings.strategy,
            self.settings.presence_rule,
            parallel,
        );
        let output = normalize(raw, self.network, &layer_set);

        info!(
            evaluations = cache.evaluations(),
            attributed = output.len(),
            "layer centrality decomposition complete"
        );
        Ok(output)
    }
}
