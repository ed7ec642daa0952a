//! Core library for the AKA Graph probabilistic equivalence engine.
//!
//! Implements the equivalence-discovery pipeline end to end:
//!
//! Ingest → [`session::IngestSession`] → ([`equivalence::find_equivs`] →
//! [`weighting::edge_weight`]) → ([`local_uf::LocalUnionFind`] dedup →
//! [`persisted_uf::PersistedUnionFind`]). Query →
//! [`store::Store`] (identifier → records) → `PersistedUnionFind` (roots
//! across replicas) → [`query::find_connected_component`].
#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod config;
pub mod equivalence;
pub mod local_uf;
pub mod persisted_uf;
pub mod prng;
pub mod query;
pub mod record;
pub mod replica;
pub mod report;
pub mod session;
pub mod store;
pub mod weighting;

pub use config::{GraphConfig, ScoreFn};
pub use equivalence::{EquivCandidate, find_equivs};
pub use local_uf::LocalUnionFind;
pub use persisted_uf::{PersistedUnionFind, RootInfo};
pub use prng::{RandomSource, det};
pub use query::{ComponentMember, find_connected_component, find_urls_by_selector};
pub use record::Record;
pub use replica::ReplicatedNode;
pub use report::{Cluster, ClusterReport, ClusterSummary, analyze_clusters};
pub use session::{IngestError, IngestSession};
pub use store::{MemoryStore, SelectorQuery, SledStore, Store, StoreError, UnionEdgeRow};
pub use weighting::{SelectorClass, edge_weight};

/// Returns the current version of the aka-graph-core library.
#[must_use]
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn version_is_semver() {
        let v = version();
        let parts: Vec<&str> = v.split('.').collect();
        assert_eq!(parts.len(), 3, "version should have 3 parts: {v}");
        for part in parts {
            part.parse::<u32>().expect("each part should be a number");
        }
    }

    /// Transitive chain decay with independent (null-evidence) probabilistic
    /// edges.
    #[test]
    fn transitive_chain_decay() {
        let store = MemoryStore::new();
        let config = GraphConfig::default();
        let mut session = IngestSession::open_with_random_source(
            &store,
            &config,
            RandomSource::cycle(vec![0.05, 0.95]),
        );
        session
            .add_edge(vec!["d".to_owned(), "e".to_owned()], 0.7, None)
            .expect("d-e");
        session
            .add_edge(vec!["e".to_owned(), "f".to_owned()], 0.7, None)
            .expect("e-f");
        session
            .add_edge(vec!["f".to_owned(), "g".to_owned()], 0.7, None)
            .expect("f-g");
        session.close().expect("close");

        let count = |a: &str, b: &str| -> usize {
            let puf = PersistedUnionFind::new(&store);
            (0..config.k)
                .filter(|&r| {
                    let ra = puf.find_root(&ReplicatedNode::new(a, r)).expect("root a");
                    let rb = puf.find_root(&ReplicatedNode::new(b, r)).expect("root b");
                    ra.node == rb.node
                })
                .count()
        };

        let de = count("d", "e");
        let df = count("d", "f");
        let dg = count("d", "g");
        let ed = count("e", "d");
        assert!(de >= df);
        assert!(df >= dg);
        assert_eq!(de, ed);
    }
}
