//! [`aka_graph_core::report::analyze_clusters`] benchmark: full-store scan,
//! per-root grouping, and overlap computation.
#![allow(clippy::expect_used)]

use aka_graph_bench::{SizeTier, generate_records};
use aka_graph_core::{GraphConfig, IngestSession, MemoryStore, analyze_clusters};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

fn setup(tier: SizeTier) -> (MemoryStore, GraphConfig) {
    let records = generate_records(&tier.config(42));
    let store = MemoryStore::new();
    let config = GraphConfig::default();
    let mut session = IngestSession::open(&store, &config);
    for record in records {
        session.add_record(record, true).expect("add_record");
    }
    session.close().expect("close");
    (store, config)
}

fn bench_analyze_clusters(c: &mut Criterion) {
    let mut group = c.benchmark_group("report/analyze_clusters");

    for (name, tier) in [("S", SizeTier::Small), ("M", SizeTier::Medium)] {
        let (store, config) = setup(tier);
        group.bench_function(BenchmarkId::from_parameter(name), |b| {
            b.iter(|| {
                let _ = analyze_clusters(&store, &config, 0, 50, 10).expect("analyze_clusters");
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_analyze_clusters);
criterion_main!(benches);
