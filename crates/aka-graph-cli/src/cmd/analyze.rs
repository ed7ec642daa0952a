//! Implementation of `aka-graph analyze`.
//!
//! Prints the cluster report from [`aka_graph_core::analyze_clusters`]: the
//! largest clusters (replica 0), per-cluster identifier overlaps, and
//! summary statistics over every cluster's size.
use std::path::Path;

use aka_graph_core::{GraphConfig, SledStore, analyze_clusters};

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::format;

/// Runs the `analyze` command.
///
/// # Errors
///
/// Returns [`CliError`] if the store cannot be opened or scanned.
pub fn run(
    store_path: &Path,
    limit: usize,
    candidates_limit: usize,
    config: &GraphConfig,
    format_opt: OutputFormat,
) -> Result<(), CliError> {
    let store = SledStore::open(store_path)?;
    let report = analyze_clusters(&store, config, 0, limit, candidates_limit)?;
    format::print_cluster_report(&report, format_opt);
    Ok(())
}
