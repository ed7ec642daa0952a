//! Implementation of `aka-graph init`.
//!
//! Creates a fresh [`SledStore`] at `--store` and provisions its indexes.
//! Idempotent: running `init` against an existing store is a no-op beyond
//! re-asserting the index exists.
use std::path::Path;

use aka_graph_core::{SledStore, Store as _};

use crate::error::CliError;

/// Runs the `init` command.
///
/// # Errors
///
/// Returns [`CliError::StoreUnavailable`] if the store cannot be opened or
/// its index cannot be created.
pub fn run(store_path: &Path) -> Result<(), CliError> {
    let store = SledStore::open(store_path)?;
    store.ensure_index()?;
    println!("initialized store at {}", store_path.display());
    Ok(())
}
