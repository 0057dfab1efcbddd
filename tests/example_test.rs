use layer_centrality::{
    CentralityMetric, Layer, LayerCentralityInput, LayerCentralityOutput, MultilayerNetwork,
    ShapleyStrategy,
};

/// Three overlapping layers over eight actors, with one actor only in the "mail" layer and one
/// isolated in "chat"
fn social_network() -> MultilayerNetwork {
    let mut network = MultilayerNetwork::new();
    network.add_layer(
        "work",
        Layer::from_edges([("ann", "bob"), ("bob", "cat"), ("cat", "dan"), ("dan", "ann")]),
    );
    network.add_layer(
        "chat",
        Layer::from_edges([("ann", "cat"), ("bob", "eve"), ("eve", "fay"), ("fay", "bob")]),
    );
    network.add_layer("mail", Layer::from_edges([("ann", "gus"), ("gus", "eve")]));
    network.add_node("chat", "hal");
    network
}

fn compute(metric: CentralityMetric) -> LayerCentralityOutput {
    LayerCentralityInput::new(social_network(), metric)
        .compute()
        .unwrap_or_else(|e| panic!("{metric} failed: {e}"))
}

fn row_total(output: &LayerCentralityOutput, node: &str) -> f64 {
    output[node].values().sum()
}

#[test]
fn test_every_metric_returns_complete_rows() {
    for metric in CentralityMetric::ALL {
        let output = compute(metric);
        assert_eq!(output.len(), 8, "{metric}: one row per actor");
        for (node, shares) in &output {
            assert_eq!(shares.len(), 3, "{metric}: {node} has one share per layer");
            let total = row_total(&output, node);
            assert!(
                total.abs() < 1e-9 || (total - 100.0).abs() < 1e-6,
                "{metric}: {node} shares sum to {total}"
            );
        }
    }
}

#[test]
fn test_absent_layers_always_zero() {
    for metric in CentralityMetric::ALL {
        let output = compute(metric);
        // gus only belongs to mail; dan only to work
        assert_eq!(output["gus"]["work"], 0.0, "{metric}");
        assert_eq!(output["gus"]["chat"], 0.0, "{metric}");
        assert_eq!(output["dan"]["chat"], 0.0, "{metric}");
        assert_eq!(output["dan"]["mail"], 0.0, "{metric}");
    }
}

#[test]
fn test_isolated_node_has_no_attribution() {
    // Degree scores hal 0 and harmonic leaves it unscored
    for metric in [CentralityMetric::Degree, CentralityMetric::Harmonic] {
        let output = compute(metric);
        assert!(
            output["hal"].values().all(|share| *share == 0.0),
            "{metric}: {:?}",
            output["hal"]
        );
    }
}

#[test]
fn test_single_layer_actor_gets_full_share() {
    for metric in CentralityMetric::ALL {
        let output = compute(metric);
        assert!((output["gus"]["mail"] - 100.0).abs() < 1e-6, "{metric}");
        assert!((output["dan"]["work"] - 100.0).abs() < 1e-6, "{metric}");
    }
}

#[test]
fn test_identical_layers_split_evenly() {
    let edges = [("a", "b"), ("b", "c"), ("c", "d"), ("b", "d")];
    let mut network = MultilayerNetwork::new();
    network.add_layer("left", Layer::from_edges(edges));
    network.add_layer("right", Layer::from_edges(edges));

    for metric in CentralityMetric::ALL {
        let output = LayerCentralityInput::new(network.clone(), metric)
            .compute()
            .unwrap();
        for (node, shares) in &output {
            assert!((shares["left"] - 50.0).abs() < 1e-6, "{metric}: {node}");
            assert!((shares["right"] - 50.0).abs() < 1e-6, "{metric}: {node}");
        }
    }
}

#[test]
fn test_repeated_runs_are_identical() {
    for metric in [CentralityMetric::Degree, CentralityMetric::GameTheoretic] {
        assert_eq!(compute(metric), compute(metric), "{metric}");
    }
}

#[test]
fn test_coalition_strategy_matches_permutations() {
    for metric in CentralityMetric::ALL {
        let permutations = compute(metric);

        let mut input = LayerCentralityInput::new(social_network(), metric);
        input.settings.strategy = ShapleyStrategy::Coalitions;
        let coalitions = input.compute().unwrap();

        for (node, shares) in &permutations {
            for (layer, share) in shares {
                assert!(
                    (coalitions[node][layer] - share).abs() < 1e-6,
                    "{metric}: {node}/{layer} {share} vs {}",
                    coalitions[node][layer]
                );
            }
        }
    }
}
