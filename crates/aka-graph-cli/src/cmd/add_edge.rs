//! Implementation of `aka-graph add-edge`.
//!
//! Asserts an explicit pairwise relationship between `--ids`, at the given
//! `--strength`, with optional `--evidence`. A thin wrapper around a single
//! `IngestSession::add_edge` + `close`.
use std::path::Path;

use aka_graph_core::{GraphConfig, IngestSession, SledStore};

use crate::error::CliError;

/// Runs the `add-edge` command.
///
/// # Errors
///
/// Returns [`CliError`] if the store cannot be opened or the session flush
/// fails.
pub fn run(
    store_path: &Path,
    ids: &[String],
    strength: f64,
    evidence: Option<String>,
    config: &GraphConfig,
) -> Result<(), CliError> {
    let store = SledStore::open(store_path)?;
    let mut session = IngestSession::open(&store, config);
    session.add_edge(ids.to_vec(), strength, evidence)?;
    session.close()?;
    println!("asserted edge across {} identifier(s)", ids.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use aka_graph_core::{PersistedUnionFind, ReplicatedNode};

    use super::*;

    #[test]
    fn full_strength_edge_unites_all_replicas() {
        let store_dir = tempfile::tempdir().expect("tempdir");
        let config = GraphConfig::default();

        run(
            store_dir.path(),
            &["a".to_owned(), "b".to_owned()],
            1.0,
            None,
            &config,
        )
        .expect("add-edge");

        let store = SledStore::open(store_dir.path()).expect("reopen");
        let puf = PersistedUnionFind::new(&store);
        for replica in 0..config.k {
            let root_a = puf
                .find_root(&ReplicatedNode::new("a", replica))
                .expect("root a");
            let root_b = puf
                .find_root(&ReplicatedNode::new("b", replica))
                .expect("root b");
            assert_eq!(root_a.node, root_b.node);
        }
    }
}
