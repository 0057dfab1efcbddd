use clap::{Parser, ValueEnum};
use layer_centrality::{
    AttributionTable, CentralityMetric, DecompositionSettings, LayerCentralityInput,
    LayerCentralityOutput, LayerStats, LayerSummary, MetricSettings, MultilayerNetwork,
    PresenceRule, ShapleyStrategy, entropies, layer_stats, summarize,
};
use serde::Serialize;
use std::{
    collections::BTreeMap,
    env,
    io,
    path::PathBuf,
    process::ExitCode,
    time::{Duration, Instant},
};
use tabled::{Table, settings::Style};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Attribute node centrality to the layers of a multilayer network",
    long_about = None
)]
struct Cli {
    /// Edge list CSV with a `layer,from,to` header. An empty `to` declares an isolated node.
    #[arg(short, long)]
    edges: PathBuf,

    /// Centrality measure to decompose
    #[arg(short, long, value_enum, default_value_t = CentralityMetric::Degree)]
    metric: CentralityMetric,

    /// Nodes to attribute (comma separated); every node in the network when omitted
    #[arg(short, long, value_delimiter = ',')]
    nodes: Vec<String>,

    #[arg(long, value_enum, default_value_t = ShapleyStrategy::Permutations)]
    strategy: ShapleyStrategy,

    /// Marginal contribution when a node is missing from one of two consecutive prefixes
    #[arg(long, value_enum, default_value_t = PresenceRule::Skip)]
    presence_rule: PresenceRule,

    /// Katz damping is 1 / (divisor * smallest spectral radius)
    #[arg(long, default_value_t = 10.0)]
    katz_divisor: f64,

    /// Give up after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Run on a single thread
    #[arg(long)]
    sequential: bool,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Also report the Shannon entropy of each node's shares
    #[arg(long)]
    entropy: bool,

    /// Also report per-layer statistics
    #[arg(long)]
    summary: bool,

    /// Also report node, edge and degree counts of each input layer
    #[arg(long)]
    layer_stats: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    attribution: &'a LayerCentralityOutput,
    #[serde(skip_serializing_if = "Option::is_none")]
    entropy: Option<BTreeMap<String, f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<Vec<LayerSummary>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    layer_stats: Option<Vec<LayerStats>>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("LAYER_CENTRALITY_LOG")
        .unwrap_or_else(|_| EnvFilter::new("layer_centrality=info,warn"));

    let format = env::var("LAYER_CENTRALITY_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    // Logs go to stderr so stdout stays machine readable
    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(io::stderr))
                .init();
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let network = MultilayerNetwork::from_csv(&cli.edges)?;
    info!(
        path = %cli.edges.display(),
        layers = network.len(),
        actors = network.actors().len(),
        "network loaded"
    );

    let stats = cli.layer_stats.then(|| layer_stats(&network));

    let mut input = LayerCentralityInput::new(network, cli.metric);
    if !cli.nodes.is_empty() {
        input.nodes = cli.nodes.clone();
    }
    input.settings = DecompositionSettings {
        strategy: cli.strategy,
        presence_rule: cli.presence_rule,
        metric: MetricSettings {
            katz_damping_divisor: cli.katz_divisor,
            ..Default::default()
        },
        parallel: !cli.sequential,
        deadline: cli
            .timeout_secs
            .map(|secs| Instant::now() + Duration::from_secs(secs)),
    };

    let output = input.compute()?;
    let entropy = cli.entropy.then(|| entropies(&output));
    let summary = cli.summary.then(|| summarize(&output));

    match cli.format {
        OutputFormat::Table => {
            println!("{}", AttributionTable::from_output(&output).render());
            if let Some(entropy) = entropy {
                let rows: Vec<Vec<String>> = std::iter::once(vec![
                    "node".to_string(),
                    "entropy".to_string(),
                ])
                .chain(
                    entropy
                        .iter()
                        .map(|(node, h)| vec![node.clone(), format!("{h:.4}")]),
                )
                .collect();
                println!(
                    "\n{}",
                    tabled::builder::Builder::from(rows)
                        .build()
                        .with(Style::psql().remove_horizontals())
                );
            }
            if let Some(summary) = summary {
                println!(
                    "\n{}",
                    Table::new(summary).with(Style::psql().remove_horizontals())
                );
            }
            if let Some(stats) = stats {
                println!(
                    "\n{}",
                    Table::new(stats).with(Style::psql().remove_horizontals())
                );
            }
        }
        OutputFormat::Json => {
            let report = JsonReport {
                attribution: &output,
                entropy,
                summary,
                layer_stats: stats,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Csv => {
            AttributionTable::from_output(&output).write_csv(io::stdout())?;
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("Error computing layer centrality: {e}");
            ExitCode::FAILURE
        }
    }
}
