//! Implementation of `aka-graph query`.
//!
//! Resolves `selector` to its connected component via
//! [`aka_graph_core::find_connected_component`] and prints the ranked
//! members with their confidence. An empty result is a well-defined logical
//! failure (exit code 1), not a crash.
use std::path::Path;

use aka_graph_core::{GraphConfig, SledStore, find_connected_component};

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::format;

/// Runs the `query` command.
///
/// # Errors
///
/// Returns [`CliError::StoreUnavailable`] if the store cannot be opened,
/// [`CliError::StoreOperationFailed`] if the lookup fails, or
/// [`CliError::EmptyComponent`] if `selector` resolves to nothing.
pub fn run(
    store_path: &Path,
    selector: &str,
    config: &GraphConfig,
    format_opt: OutputFormat,
) -> Result<(), CliError> {
    let store = SledStore::open(store_path)?;
    let members = find_connected_component(selector, config, &store)?;
    if members.is_empty() {
        return Err(CliError::EmptyComponent {
            selector: selector.to_owned(),
        });
    }
    format::print_component(selector, &members, format_opt);
    Ok(())
}
