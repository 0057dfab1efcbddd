//! Subset centrality cache.
//!
//! Scores every non-empty layer subset exactly once and serves them to the Shapley walk. There
//! are 2^L − 1 subsets but L! orderings, so each subset is read many times by the walk and only
//! ever written during [`SubsetCentralityCache::build`]. Entries are indexed by subset mask.

use crate::{
    centrality::{CentralityMetric, NodeScores, PreparedMetric},
    error::{LayerCentralityError, Result},
    subset::{LayerSet, LayerSubset},
    types::MultilayerNetwork,
};
use rayon::prelude::*;
use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::Instant,
};
use tracing::{debug, info, instrument};

/// How the cache build runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    pub parallel: bool,
    /// Checked before each subset evaluation
    pub deadline: Option<Instant>,
}

#[derive(Debug)]
pub struct SubsetCentralityCache {
    layer_set: LayerSet,
    metric: CentralityMetric,
    /// `entries[bits - 1]` holds the scores of subset `bits`
    entries: Vec<NodeScores>,
    evaluations: usize,
}

impl SubsetCentralityCache {
    /// Flatten and score every non-empty subset of `layer_set`
    #[instrument(skip_all, fields(metric = %metric.metric(), subsets = layer_set.subset_count()))]
    pub fn build(
        network: &MultilayerNetwork,
        layer_set: &LayerSet,
        metric: &PreparedMetric,
        options: BuildOptions,
    ) -> Result<Self> {
        let total = layer_set.subset_count();
        let evaluated = AtomicUsize::new(0);

        let evaluate = |subset: LayerSubset| -> Result<NodeScores> {
            if let Some(deadline) = options.deadline {
                if Instant::now() >= deadline {
                    return Err(LayerCentralityError::DeadlineExceeded {
                        evaluated: evaluated.load(Ordering::Relaxed),
                        total,
                    });
                }
            }

            let graph = network.flatten(layer_set.members(subset));
            let scores = metric
                .score(&graph)
                .map_err(|f| f.into_error(metric.metric(), &layer_set.key(subset)))?;
            evaluated.fetch_add(1, Ordering::Relaxed);
            debug!(
                subset = %layer_set.key(subset),
                nodes = graph.node_count(),
                edges = graph.edge_count(),
                scored = scores.len(),
                "subset scored"
            );
            Ok(scores)
        };

        let subsets: Vec<LayerSubset> = layer_set.subsets().collect();
        let entries: Vec<NodeScores> = if options.parallel {
            subsets.into_par_iter().map(&evaluate).collect::<Result<_>>()?
        } else {
            subsets.into_iter().map(&evaluate).collect::<Result<_>>()?
        };

        let evaluations = evaluated.into_inner();
        info!(evaluations, "subset centrality cache built");

        Ok(Self {
            layer_set: layer_set.clone(),
            metric: metric.metric(),
            entries,
            evaluations,
        })
    }

    /// Scores of one subset. Fails for masks built against a different layer set.
    pub fn get(&self, subset: LayerSubset) -> Result<&NodeScores> {
        if !self.layer_set.covers(subset) {
            return Err(LayerCentralityError::ForeignSubset {
                bits: subset.bits(),
                layers: self.layer_set.len(),
            });
        }
        Ok(&self.entries[subset.bits() as usize - 1])
    }

    /// Scores of the subset named by an ordered sequence of layers (e.g. a permutation prefix)
    pub fn get_by_names<S: AsRef<str>>(&self, names: &[S]) -> Result<&NodeScores> {
        let subset = self.layer_set.subset_of(names)?;
        self.get(subset)
    }

    /// `None` when the node is absent from the subset, the metric left it unscored, or the
    /// subset is foreign to this cache
    pub fn score(&self, subset: LayerSubset, node: &str) -> Option<f64> {
        self.get(subset).ok()?.get(node).copied()
    }

    pub fn metric(&self) -> CentralityMetric {
        self.metric
    }

    pub fn layer_set(&self) -> &LayerSet {
        &self.layer_set
    }

    /// Number of metric evaluations performed during the build
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
