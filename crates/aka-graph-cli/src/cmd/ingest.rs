//! Implementation of `aka-graph ingest`.
//!
//! Opens a session against the store at `--store`, buffers every record
//! parsed from `--file`, and closes the session — flushing records (and
//! running equivalence discovery over them, unless `--no-union` is set)
//! followed by any buffered edges.
use std::path::Path;

use aka_graph_core::{GraphConfig, IngestSession, SledStore};

use crate::error::CliError;
use crate::io;

/// Runs the `ingest` command.
///
/// # Errors
///
/// Returns [`CliError`] if the store cannot be opened, the input file
/// cannot be read or parsed, or a session flush fails.
pub fn run(
    store_path: &Path,
    file: &Path,
    no_union: bool,
    config: &GraphConfig,
) -> Result<(), CliError> {
    let records = io::read_records(file)?;
    let count = records.len();
    let store = SledStore::open(store_path)?;
    let mut session = IngestSession::open(&store, config);
    for record in records {
        session.add_record(record, !no_union)?;
    }
    session.close()?;
    println!("ingested {count} record(s) into {}", store_path.display());
    Ok(())
}
