use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use layer_centrality::{
    BuildOptions, CentralityMetric, Layer, LayerCentralityInput, LayerSet, MetricSettings,
    MultilayerNetwork, PresenceRule, ShapleyStrategy, SubsetCentralityCache, decompose,
};
use std::hint::black_box;

/// Ring of `n_nodes` actors where layer `i` links every node to its neighbour `i + 1` steps
/// ahead, so every layer is connected and layers overlap on all nodes
fn generate_test_network(n_layers: usize, n_nodes: usize) -> MultilayerNetwork {
    let names: Vec<String> = (0..n_nodes).map(|i| format!("n{i:03}")).collect();
    let mut network = MultilayerNetwork::new();

    for layer_idx in 0..n_layers {
        let step = layer_idx + 1;
        let layer = Layer::from_edges(
            (0..n_nodes).map(|i| (names[i].as_str(), names[(i + step) % n_nodes].as_str())),
        );
        network.add_layer(&format!("layer{layer_idx:02}"), layer);
    }

    network
}

/// Benchmark the full decomposition for growing layer counts
fn benchmark_decomposition(c: &mut Criterion) {
    let mut group = c.benchmark_group("layer_centrality");

    let configs = vec![(2, 100), (4, 100), (6, 50), (8, 10)];

    for (n_layers, sample_size) in configs {
        group.sample_size(sample_size);
        let network = generate_test_network(n_layers, 40);

        for metric in [CentralityMetric::Degree, CentralityMetric::Harmonic] {
            group.bench_with_input(
                BenchmarkId::new(metric.name(), n_layers),
                &n_layers,
                |b, _| {
                    b.iter(|| {
                        LayerCentralityInput::new(black_box(network.clone()), metric).compute()
                    })
                },
            );
        }
    }

    group.finish();
}

/// Benchmark the cache build and the two Shapley walks separately
fn benchmark_components(c: &mut Criterion) {
    let mut group = c.benchmark_group("layer_centrality_components");

    let network = generate_test_network(7, 40);
    let layer_set = LayerSet::from_network(&network);
    let prepared = CentralityMetric::Degree
        .prepare(&network, &layer_set, &MetricSettings::default(), true)
        .unwrap();
    let nodes: Vec<String> = network.actors().into_iter().map(str::to_string).collect();

    group.bench_function("cache_build", |b| {
        b.iter(|| {
            SubsetCentralityCache::build(
                black_box(&network),
                black_box(&layer_set),
                black_box(&prepared),
                BuildOptions {
                    parallel: true,
                    deadline: None,
                },
            )
        })
    });

    let cache = SubsetCentralityCache::build(
        &network,
        &layer_set,
        &prepared,
        BuildOptions {
            parallel: true,
            deadline: None,
        },
    )
    .unwrap();

    for strategy in [ShapleyStrategy::Permutations, ShapleyStrategy::Coalitions] {
        group.bench_with_input(
            BenchmarkId::new("decompose", format!("{strategy:?}")),
            &strategy,
            |b, &strategy| {
                b.iter(|| {
                    decompose(
                        black_box(&cache),
                        black_box(&network),
                        black_box(&nodes),
                        strategy,
                        PresenceRule::Skip,
                        true,
                    )
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, benchmark_decomposition, benchmark_components);
criterion_main!(benches);
