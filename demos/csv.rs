use layer_centrality::{
    AttributionTable, CentralityMetric, LayerCentralityInput, MultilayerNetwork, error::Result,
    summarize,
};
use tabled::{Table, settings::Style};

fn main() -> Result<()> {
    let network = MultilayerNetwork::from_csv("tests/toy_network.csv")?;

    for metric in CentralityMetric::ALL {
        let result = LayerCentralityInput::new(network.clone(), metric).compute()?;

        println!("{metric}");
        println!("{}", AttributionTable::from_output(&result).render());

        let summary = Table::new(summarize(&result))
            .with(Style::psql().remove_horizontals())
            .to_string();
        println!("{summary}\n");
    }

    Ok(())
}
