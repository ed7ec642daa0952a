//! Synthetic dataset generation and invariant checking for benchmarking and
//! property-based testing of `aka-graph-core`.

use std::path::PathBuf;

pub mod correctness;
pub mod generator;

pub use generator::{GeneratorConfig, SizeTier, generate_records};

/// Returns the path where the huge-tier JSON fixture is stored on disk.
///
/// The file lives under `target/bench-fixtures/huge.records.json` so it is
/// automatically gitignored and shared between the generator binary and the
/// `huge_file` benchmark.
#[must_use]
pub fn huge_fixture_path() -> PathBuf {
    let manifest = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    manifest
        .join("..")
        .join("..")
        .join("target")
        .join("bench-fixtures")
        .join("huge.records.json")
}
