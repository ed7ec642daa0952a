//! Implementation of `aka-graph inspect`.
//!
//! Prints summary statistics about the store: total record count, root
//! count in replica 0, and the largest component's size — built on
//! [`PersistedUnionFind::all_roots`].
use std::path::Path;

use aka_graph_core::{PersistedUnionFind, SledStore, Store as _};

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::format::{self, InspectSummary};

/// Runs the `inspect` command.
///
/// # Errors
///
/// Returns [`CliError`] if the store cannot be opened or scanned.
pub fn run(store_path: &Path, format_opt: OutputFormat) -> Result<(), CliError> {
    let store = SledStore::open(store_path)?;
    let record_count = store.scan_all_urls()?.len();
    let puf = PersistedUnionFind::new(&store);
    let roots = puf.all_roots(0)?;
    let largest_component = roots.values().copied().max().unwrap_or(0);

    let summary = InspectSummary {
        record_count,
        root_count: roots.len(),
        largest_component,
    };
    format::print_inspect(&summary, format_opt);
    Ok(())
}
