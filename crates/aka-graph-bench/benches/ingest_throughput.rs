//! End-to-end ingest throughput: record buffering, flush, equivalence
//! discovery, and probabilistic union, across size tiers.
#![allow(clippy::expect_used)]

use std::sync::Arc;

use aka_graph_bench::{SizeTier, generate_records};
use aka_graph_core::{GraphConfig, IngestSession, MemoryStore};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

fn bench_cold_ingest(c: &mut Criterion) {
    let mut group = c.benchmark_group("ingest/cold");

    for (name, tier) in [
        ("S", SizeTier::Small),
        ("M", SizeTier::Medium),
        ("L", SizeTier::Large),
    ] {
        let records = generate_records(&tier.config(42));
        group.throughput(Throughput::Elements(records.len() as u64));

        group.bench_with_input(BenchmarkId::from_parameter(name), &records, |b, records| {
            b.iter(|| {
                let store = MemoryStore::new();
                let config = GraphConfig {
                    score_fn: Arc::new(aka_graph_bench::generator::identifiers::synthetic_rarity_score),
                    ..GraphConfig::default()
                };
                let mut session = IngestSession::open(&store, &config);
                for record in records {
                    session
                        .add_record(record.clone(), true)
                        .expect("add_record");
                }
                session.close().expect("close");
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_cold_ingest);
criterion_main!(benches);
