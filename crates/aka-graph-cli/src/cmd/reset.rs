//! Implementation of `aka-graph reset`.
//!
//! Tears down the store's indexes via [`Store::delete_index`], the
//! natural complement to `init`. Useful for test fixtures and operators
//! clearing a scratch store.
use std::path::Path;

use aka_graph_core::{SledStore, Store as _};

use crate::error::CliError;

/// Runs the `reset` command.
///
/// # Errors
///
/// Returns [`CliError::StoreUnavailable`] if the store cannot be opened or
/// its indexes cannot be torn down.
pub fn run(store_path: &Path) -> Result<(), CliError> {
    let store = SledStore::open(store_path)?;
    store.delete_index()?;
    println!("reset store at {}", store_path.display());
    Ok(())
}
