use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use linkrank::{page_rank, CsrGraph, EdgeDirection, PageRank, RankConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random directed graph with `size` nodes and ~8 out-edges per node.
fn random_graph(size: u64, direction: EdgeDirection) -> CsrGraph {
    let mut rng = StdRng::seed_from_u64(42);
    let nodes: Vec<u64> = (0..size).collect();
    let mut edges = Vec::with_capacity(size as usize * 8);
    for source in 0..size {
        for _ in 0..8 {
            edges.push((source, rng.gen_range(0..size)));
        }
    }
    CsrGraph::from_edges(size - 1, &nodes, &edges, direction).unwrap()
}

/// Full run to the iteration cap, pull-mode storage
fn bench_page_rank_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("page_rank_run");

    for size in [1_000u64, 10_000].iter() {
        let graph = random_graph(*size, EdgeDirection::Incoming);
        let config = RankConfig::new(0.85, Some(20), 0.0).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let state = page_rank(&graph, config.clone()).unwrap();
                criterion::black_box(state.scores.len());
            });
        });
    }
    group.finish();
}

/// One transition round, push vs. pull over the same edge set
fn bench_push_vs_pull_round(c: &mut Criterion) {
    use linkrank::RankingAlgorithm;

    let mut group = c.benchmark_group("transition_round");
    let config = RankConfig::default();

    for (label, direction) in [
        ("pull", EdgeDirection::Incoming),
        ("push", EdgeDirection::Outgoing),
    ] {
        let graph = random_graph(10_000, direction);
        let kernel = PageRank::new(&graph, config.clone()).unwrap();
        let initial = kernel.initial_state();

        group.bench_function(label, |b| {
            b.iter(|| {
                let next = kernel.transition(&initial).unwrap();
                criterion::black_box(next.error);
            });
        });
    }
    group.finish();
}

/// Kernel construction, dominated by the out-degree precompute
fn bench_degree_precompute(c: &mut Criterion) {
    let mut group = c.benchmark_group("degree_precompute");

    for size in [1_000u64, 10_000].iter() {
        let graph = random_graph(*size, EdgeDirection::Incoming);
        let config = RankConfig::default();

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let kernel = PageRank::new(&graph, config.clone()).unwrap();
                criterion::black_box(&kernel);
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_page_rank_run,
    bench_push_vs_pull_round,
    bench_degree_precompute
);
criterion_main!(benches);
