//! Generates the huge-tier benchmark fixture to disk.
//!
//! Run via `cargo run -p aka-graph-bench --bin gen-huge`. Writes a JSON
//! fixture to `target/bench-fixtures/`, loaded by `benches/huge_file.rs` at
//! benchmark time so the generator cost isn't paid on every run.
use std::error::Error;
use std::fs;
use std::io::BufWriter;

use aka_graph_bench::{SizeTier, generate_records, huge_fixture_path};

fn main() -> Result<(), Box<dyn Error>> {
    let path = huge_fixture_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    eprintln!("Generating XLarge tier (~120K records)...");
    let records = generate_records(&SizeTier::XLarge.config(42));
    eprintln!("Generated {} records", records.len());

    eprintln!("Writing JSON to {}...", path.display());
    let out = fs::File::create(&path)?;
    let writer = BufWriter::new(out);
    serde_json::to_writer(writer, &records)?;

    let meta = fs::metadata(&path)?;
    eprintln!("JSON: {:.1} MB", meta.len() as f64 / (1024.0 * 1024.0));
    Ok(())
}
