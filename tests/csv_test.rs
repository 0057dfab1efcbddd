#![cfg(feature = "serde")]

use layer_centrality::{
    AttributionTable, CentralityMetric, LayerCentralityError, LayerCentralityInput,
    LayerCentralityOutput, MultilayerNetwork, entropies, summarize,
};
use std::fs::File;
use tabled::{Table, settings::Style};

fn read_network(file_path: &str) -> MultilayerNetwork {
    MultilayerNetwork::from_csv(file_path).unwrap()
}

fn assert_attribution(output: &LayerCentralityOutput, node: &str, expected: &[(&str, f64)]) {
    let shares = output
        .get(node)
        .unwrap_or_else(|| panic!("Node {} not found in results", node));

    for (layer, expected_share) in expected {
        let share = shares[*layer];
        assert!(
            (share - expected_share).abs() < 0.0001,
            "Share mismatch for {}/{}: expected {}, got {}",
            node,
            layer,
            expected_share,
            share
        );
    }
}

#[test]
fn test_csv_network_loading() {
    let network = read_network("tests/toy_network.csv");

    assert_eq!(network.len(), 2);
    assert_eq!(network.layer("A").unwrap().edge_count(), 2);
    assert_eq!(network.layer("B").unwrap().edge_count(), 2);
    // Empty `to` declares an isolated node
    assert!(network.layer("B").unwrap().contains_node("5"));
    assert_eq!(network.actors().len(), 5);
}

#[test]
fn test_csv_degree_attribution() {
    let network = read_network("tests/toy_network.csv");
    let result = LayerCentralityInput::new(network, CentralityMetric::Degree)
        .compute()
        .unwrap();

    let table = AttributionTable::from_output(&result).render();
    println!("{table}");

    assert_attribution(&result, "1", &[("A", 100.0), ("B", 0.0)]);
    assert_attribution(&result, "2", &[("A", 75.0), ("B", 25.0)]);
    assert_attribution(&result, "3", &[("A", 25.0), ("B", 75.0)]);
    assert_attribution(&result, "4", &[("A", 0.0), ("B", 100.0)]);
    assert_attribution(&result, "5", &[("A", 0.0), ("B", 0.0)]);
}

#[test]
fn test_csv_export() {
    let network = read_network("tests/toy_network.csv");
    let result = LayerCentralityInput::new(network, CentralityMetric::Degree)
        .compute()
        .unwrap();

    let mut buffer = Vec::new();
    AttributionTable::from_output(&result)
        .write_csv(&mut buffer)
        .unwrap();
    let text = String::from_utf8(buffer).unwrap();

    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("node,A,B"));
    assert_eq!(lines.next(), Some("1,100.0000,0.0000"));
    assert_eq!(lines.next(), Some("2,75.0000,25.0000"));
    assert_eq!(text.lines().count(), 6);
}

#[test]
fn test_csv_entropy_and_summary() {
    let network = read_network("tests/toy_network.csv");
    let result = LayerCentralityInput::new(network, CentralityMetric::Degree)
        .compute()
        .unwrap();

    let entropy = entropies(&result);
    assert_eq!(entropy["1"], 0.0);
    assert_eq!(entropy["5"], 0.0);
    // -(0.75 log2 0.75 + 0.25 log2 0.25)
    assert!((entropy["2"] - 0.811278).abs() < 1e-6);

    let summary = summarize(&result);
    let table = Table::new(&summary)
        .with(Style::psql().remove_horizontals())
        .to_string();
    println!("{table}");

    assert_eq!(summary.len(), 2);
    assert_eq!(summary[0].most_influenced, 2);
    assert_eq!(summary[1].most_influenced, 2);
}

#[test]
fn test_csv_missing_file() {
    let result = MultilayerNetwork::from_csv("tests/does_not_exist.csv");
    assert!(matches!(result, Err(LayerCentralityError::Csv(_))));
}
