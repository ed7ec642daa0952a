//! Synthetic equivalence-dataset generator.
//!
//! Produces deterministic batches of [`aka_graph_core::Record`]s with
//! controllable cluster topology and identifier density, for benchmarking
//! and property testing the ingestion pipeline and query engine.

pub mod clusters;
pub mod identifiers;

use aka_graph_core::Record;
use rand::SeedableRng;
use rand::rngs::StdRng;

use clusters::build_dataset;

/// Configuration for the equivalence-dataset generator.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Seed for the random number generator (deterministic).
    pub seed: u64,
    /// Number of distinct real-world entities to simulate.
    pub num_clusters: usize,
    /// Number of noisy sighting records per entity.
    pub records_per_cluster: usize,
    /// Number of hard-selector fields each entity carries values for.
    pub hard_selectors_per_record: usize,
    /// Number of soft-selector fields each entity carries values for.
    pub soft_selectors_per_record: usize,
    /// Additional single-record entities with no relation to anything
    /// else, as a fraction of `num_clusters`.
    pub noise_record_fraction: f64,
    /// Fraction of clusters whose first soft value is drawn from a small
    /// shared pool instead of being unique, producing weak cross-cluster
    /// links for confidence-scoring benchmarks.
    pub cross_cluster_leak_rate: f64,
}

/// Predefined size tiers for benchmarking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeTier {
    /// ~30 entities, ~90 records.
    Small,
    /// ~300 entities, ~900 records.
    Medium,
    /// ~3,000 entities, ~9,000 records.
    Large,
    /// ~30,000 entities, ~90,000 records.
    XLarge,
}

impl SizeTier {
    /// Returns the default [`GeneratorConfig`] for this size tier.
    #[must_use]
    pub fn config(self, seed: u64) -> GeneratorConfig {
        let num_clusters = match self {
            SizeTier::Small => 30,
            SizeTier::Medium => 300,
            SizeTier::Large => 3_000,
            SizeTier::XLarge => 30_000,
        };
        GeneratorConfig {
            seed,
            num_clusters,
            records_per_cluster: 3,
            hard_selectors_per_record: 2,
            soft_selectors_per_record: 1,
            noise_record_fraction: 0.2,
            cross_cluster_leak_rate: 0.1,
        }
    }
}

/// Generates a dataset of [`Record`]s from the given configuration.
///
/// All randomness is deterministic, seeded from `config.seed`.
#[must_use]
pub fn generate_records(config: &GeneratorConfig) -> Vec<Record> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    build_dataset(config, &mut rng)
}
