use layer_centrality::{
    CentralityMetric, Layer, LayerCentralityInput, MultilayerNetwork, error::Result,
};

fn build_sample_network() -> MultilayerNetwork {
    let mut network = MultilayerNetwork::new();

    // Co-authorship
    network.add_layer(
        "papers",
        Layer::from_edges([("ada", "ben"), ("ben", "cy"), ("cy", "ada"), ("cy", "dee")]),
    );

    // Shared grants
    network.add_layer("grants", Layer::from_edges([("ben", "dee"), ("dee", "eli")]));

    // Advisor relationships
    network.add_layer("advising", Layer::from_edges([("ada", "eli"), ("eli", "fox")]));

    network
}

fn main() -> Result<()> {
    let network = build_sample_network();

    for metric in [CentralityMetric::Degree, CentralityMetric::Katz] {
        let result = LayerCentralityInput::new(network.clone(), metric).compute()?;

        println!("{metric}");
        for (node, shares) in &result {
            let row: Vec<String> = shares
                .iter()
                .map(|(layer, share)| format!("{layer}: {share:>6.2}%"))
                .collect();
            println!("  {node:>4}  {}", row.join("  "));
        }
    }

    Ok(())
}
