//! The Batch Ingestor / Session: owns the record and edge buffers, and the
//! two-phase flush (records, then discovered equivalences).
//!
//! Modeled as [`IngestSession`] borrowing a `&dyn Store` and `&GraphConfig`,
//! with `open`/`close` free functions rather than a `Drop` impl, because the
//! "flush on success, discard on error" contract needs to distinguish the
//! two outcomes explicitly — something a fallible
//! `close(self) -> Result<(), IngestError>` expresses directly and a `Drop`
//! impl cannot (it can't report errors or see whether the scope exited via
//! `?`). The "must be inside a session" precondition is structural: nothing
//! outside this module can construct or mutate an `IngestSession`.
use std::fmt;

use crate::config::GraphConfig;
use crate::equivalence::find_equivs;
use crate::local_uf::LocalUnionFind;
use crate::persisted_uf::PersistedUnionFind;
use crate::prng::{RandomSource, det};
use crate::record::Record;
use crate::replica::ReplicatedNode;
use crate::store::{Store, StoreError};

/// Errors an [`IngestSession`] can surface.
#[derive(Debug)]
pub enum IngestError {
    /// Documents the "must be inside a session" precondition for callers
    /// (e.g. across an FFI boundary) where Rust's compile-time ownership
    /// guarantee doesn't apply. Never constructed by
    /// this crate's own API, since `close(self)` takes ownership and makes
    /// reuse after close a compile error rather than a runtime one.
    NotInSession,
    /// A store operation failed.
    Store(StoreError),
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInSession => f.write_str("operation attempted outside an open session"),
            Self::Store(e) => write!(f, "store error during session flush: {e}"),
        }
    }
}

impl std::error::Error for IngestError {}

impl From<StoreError> for IngestError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

/// A buffered record, and whether it should participate in equivalence
/// discovery once flushed.
struct BufferedRecord {
    record: Record,
    use_for_union: bool,
}

/// A buffered explicit pairwise relationship assertion.
struct BufferedEdge {
    ids: Vec<String>,
    strength: f64,
    evidence: Option<String>,
}

/// A scoped acquisition during which records and edges may be buffered.
///
/// `IngestSession::open` immediately starts buffering; `close` flushes both
/// buffers (records first, honoring the ordering guarantee that discovered
/// edges can only reference already-indexed records) and consumes `self`.
/// There is no explicit "discard" flush path beyond simply
/// dropping the session without calling `close` — the buffers are owned
/// data with no external visibility until a flush writes them out.
pub struct IngestSession<'a> {
    store: &'a dyn Store,
    config: &'a GraphConfig,
    record_buffer: Vec<BufferedRecord>,
    edge_buffer: Vec<BufferedEdge>,
    random_source: RandomSource,
}

impl<'a> IngestSession<'a> {
    /// Opens a session against `store` and `config`, using the process RNG
    /// for independent-sample probabilistic unions.
    #[must_use]
    pub fn open(store: &'a dyn Store, config: &'a GraphConfig) -> Self {
        Self::open_with_random_source(store, config, RandomSource::system())
    }

    /// Opens a session with an injected [`RandomSource`], for tests that
    /// need a fixed, repeatable sampling sequence.
    #[must_use]
    pub fn open_with_random_source(
        store: &'a dyn Store,
        config: &'a GraphConfig,
        random_source: RandomSource,
    ) -> Self {
        Self {
            store,
            config,
            record_buffer: Vec::new(),
            edge_buffer: Vec::new(),
            random_source,
        }
    }

    /// Buffers a record for ingest. `use_for_union` controls whether the
    /// record participates in equivalence discovery on flush; records
    /// ingested purely for provenance (no identifier fields worth matching)
    /// can pass `false` to skip the multi-search cost.
    ///
    /// Auto-flushes records once the buffer reaches `config.buffer_size`.
    pub fn add_record(&mut self, record: Record, use_for_union: bool) -> Result<(), IngestError> {
        self.record_buffer.push(BufferedRecord {
            record,
            use_for_union,
        });
        if self.record_buffer.len() >= self.config.buffer_size {
            self.flush_records()?;
        }
        Ok(())
    }

    /// Buffers an explicit pairwise relationship assertion between `ids`, at
    /// strength `strength` (`(0, 1]`), with optional `evidence`.
    ///
    /// Auto-flushes edges once the buffer reaches `config.buffer_size`.
    pub fn add_edge(
        &mut self,
        ids: Vec<String>,
        strength: f64,
        evidence: Option<String>,
    ) -> Result<(), IngestError> {
        self.edge_buffer.push(BufferedEdge {
            ids,
            strength,
            evidence,
        });
        if self.edge_buffer.len() >= self.config.buffer_size {
            self.flush_edges()?;
        }
        Ok(())
    }

    /// Flushes the record buffer: creates the index if absent, bulk-writes
    /// the buffered records, refreshes the store so they are immediately
    /// queryable, then runs the Equivalence Finder over the records flagged
    /// `use_for_union` and commits the discovered edges.
    ///
    /// The refresh *must* happen before equivalence discovery runs — the
    /// Equivalence Finder relies on freshly-written records being queryable.
    pub fn flush_records(&mut self) -> Result<(), IngestError> {
        if self.record_buffer.is_empty() {
            return Ok(());
        }
        self.store.ensure_index()?;
        let records: Vec<Record> = self
            .record_buffer
            .iter()
            .map(|b| b.record.clone())
            .collect();
        self.store.bulk_index_records(&records)?;
        self.store.refresh()?;

        let union_candidates: Vec<Record> = self
            .record_buffer
            .iter()
            .filter(|b| b.use_for_union)
            .map(|b| b.record.clone())
            .collect();
        self.record_buffer.clear();

        if union_candidates.is_empty() {
            return Ok(());
        }

        let mut local_uf = LocalUnionFind::new();
        let equivs = find_equivs(&union_candidates, self.config, self.store)?;
        for equiv in equivs {
            let mut ids: Vec<String> = equiv.candidates.into_iter().collect();
            ids.push(equiv.record_url);
            self.probabilistically_unite(&ids, equiv.weight, equiv.evidence, &mut local_uf)?;
        }
        Ok(())
    }

    /// Flushes the edge buffer: commits every buffered assertion via
    /// `probabilistically_unite`.
    pub fn flush_edges(&mut self) -> Result<(), IngestError> {
        if self.edge_buffer.is_empty() {
            return Ok(());
        }
        let edges = std::mem::take(&mut self.edge_buffer);
        let mut local_uf = LocalUnionFind::new();
        for edge in edges {
            self.probabilistically_unite(&edge.ids, edge.strength, edge.evidence, &mut local_uf)?;
        }
        Ok(())
    }

    /// Flushes both buffers (records first) and consumes the session.
    pub fn close(mut self) -> Result<(), IngestError> {
        self.flush_records()?;
        self.flush_edges()
    }

    /// `s == 1.0` collapses `ids` through `local_uf` first (deduplicating
    /// redundant store round trips within the batch) and only hits the
    /// store if at least two distinct local roots survived. `0 < s < 1`
    /// decides per-replica inclusion deterministically via `det(evidence,
    /// replica)` when evidence is supplied, or via independent `unif()`
    /// samples otherwise. Replicas are unioned in index order for
    /// reproducibility. A store refresh follows every commit.
    fn probabilistically_unite(
        &mut self,
        ids: &[String],
        strength: f64,
        evidence: Option<String>,
        local_uf: &mut LocalUnionFind,
    ) -> Result<(), IngestError> {
        if ids.len() < 2 {
            return Ok(());
        }

        let mut committed = false;

        if strength >= 1.0 {
            let folded = local_uf.find_all_and_union(ids);
            if folded.len() < 2 {
                return Ok(());
            }
            for replica in 0..self.config.k {
                let nodes: Vec<ReplicatedNode> =
                    ids.iter().map(|id| ReplicatedNode::new(id.clone(), replica)).collect();
                PersistedUnionFind::new(self.store).unite(&nodes)?;
                committed = true;
            }
        } else if strength > 0.0 {
            for replica in 0..self.config.k {
                let include = match &evidence {
                    Some(token) => det(&[token.as_str(), &replica.to_string()]) < strength,
                    None => self.random_source.sample() < strength,
                };
                if include {
                    let nodes: Vec<ReplicatedNode> = ids
                        .iter()
                        .map(|id| ReplicatedNode::new(id.clone(), replica))
                        .collect();
                    PersistedUnionFind::new(self.store).unite(&nodes)?;
                    committed = true;
                }
            }
        }

        if committed {
            self.store.refresh()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;
    use crate::prng::RandomSource;
    use crate::store::MemoryStore;

    fn record_with(url: &str, field: &str, value: &str) -> Record {
        let mut r = Record::new(url);
        r.push_field(field, value);
        r
    }

    #[test]
    fn hard_chain_merges_with_full_confidence() {
        let store = MemoryStore::new();
        let config = GraphConfig::default();
        let mut session = IngestSession::open(&store, &config);
        session
            .add_record(record_with("a", "email", "x"), true)
            .expect("a");
        let mut b = record_with("b", "email", "x");
        b.push_field("skype", "y");
        session.add_record(b, true).expect("b");
        session
            .add_record(record_with("c", "skype", "y"), true)
            .expect("c");
        session.close().expect("close");

        let puf = PersistedUnionFind::new(&store);
        let root_a = puf
            .find_root(&ReplicatedNode::new("a", 0))
            .expect("root a");
        let root_b = puf
            .find_root(&ReplicatedNode::new("b", 0))
            .expect("root b");
        let root_c = puf
            .find_root(&ReplicatedNode::new("c", 0))
            .expect("root c");
        assert_eq!(root_a.node, root_b.node);
        assert_eq!(root_b.node, root_c.node);
    }

    #[test]
    fn add_edge_strength_one_is_idempotent() {
        let store = MemoryStore::new();
        let config = GraphConfig::default();
        let mut session = IngestSession::open(&store, &config);
        session
            .add_edge(vec!["a".to_owned(), "a2".to_owned()], 1.0, None)
            .expect("edge 1");
        session
            .add_edge(vec!["a".to_owned(), "a2".to_owned()], 1.0, None)
            .expect("edge 2");
        session.close().expect("close");

        let puf = PersistedUnionFind::new(&store);
        let root1 = puf.find_root(&ReplicatedNode::new("a", 0)).expect("root");
        assert_eq!(root1.cardinality, 2);
    }

    #[test]
    fn deterministic_evidence_is_idempotent_across_sessions() {
        let store = MemoryStore::new();
        let config = GraphConfig::default();

        for _ in 0..3 {
            let mut session = IngestSession::open(&store, &config);
            session
                .add_edge(
                    vec!["a".to_owned(), "a2".to_owned()],
                    0.3,
                    Some("username".to_owned()),
                )
                .expect("edge");
            session.close().expect("close");
        }

        let puf = PersistedUnionFind::new(&store);
        let mut merged_replicas = 0;
        for replica in 0..config.k {
            let root_a = puf
                .find_root(&ReplicatedNode::new("a", replica))
                .expect("root a");
            let root_a2 = puf
                .find_root(&ReplicatedNode::new("a2", replica))
                .expect("root a2");
            if root_a.node == root_a2.node {
                merged_replicas += 1;
            }
        }
        assert!(merged_replicas > 0);
    }

    #[test]
    fn independent_evidence_composes_across_calls() {
        let store = MemoryStore::new();
        let config = GraphConfig::default();

        let count_merged = |store: &MemoryStore| {
            let puf = PersistedUnionFind::new(store);
            let mut merged = 0;
            for replica in 0..config.k {
                let root_b = puf.find_root(&ReplicatedNode::new("b", replica)).expect("b");
                let root_b2 = puf.find_root(&ReplicatedNode::new("b2", replica)).expect("b2");
                if root_b.node == root_b2.node {
                    merged += 1;
                }
            }
            merged
        };

        let mut session = IngestSession::open_with_random_source(
            &store,
            &config,
            RandomSource::cycle(vec![0.1, 0.9]),
        );
        session
            .add_edge(vec!["b".to_owned(), "b2".to_owned()], 0.3, None)
            .expect("edge 1");
        session.close().expect("close");
        let first = count_merged(&store);

        let mut session = IngestSession::open_with_random_source(
            &store,
            &config,
            RandomSource::cycle(vec![0.1, 0.9]),
        );
        session
            .add_edge(vec!["b".to_owned(), "b2".to_owned()], 0.3, None)
            .expect("edge 2");
        session.close().expect("close");
        let second = count_merged(&store);

        assert!(second >= first);
    }

    #[test]
    fn zero_strength_edge_is_noop() {
        let store = MemoryStore::new();
        let config = GraphConfig::default();
        let mut session = IngestSession::open(&store, &config);
        session
            .add_edge(vec!["x".to_owned(), "y".to_owned()], 0.0, None)
            .expect("edge");
        session.close().expect("close");

        let puf = PersistedUnionFind::new(&store);
        let root_x = puf.find_root(&ReplicatedNode::new("x", 0)).expect("x");
        assert_eq!(root_x.node, ReplicatedNode::new("x", 0));
    }
}
