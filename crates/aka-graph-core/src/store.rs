//! The Store Adapter: abstract persistence for the three document kinds —
//! Record, UnionEdge, and the reserved RootSize type.
//!
//! [`Store`] is a synchronous trait with two implementations,
//! [`MemoryStore`] (in-process, used by tests and `aka-graph-bench`) and
//! [`SledStore`] (embedded, disk-persisted via the `sled` crate), so an
//! alternative networked backend can be dropped in later with no change to
//! the union-find logic built on top of it.
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::record::Record;

/// Errors a [`Store`] implementation can surface.
///
/// Transient errors are retried by the caller (`PersistedUnionFind::find_root`
/// retries up to 3 times); `Corrupt` is fatal data corruption (a cycle in
/// the parent chain); `NotFound` is used internally and callers generally
/// treat it as an empty result rather than propagate it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A timeout, queue-full condition, or other condition expected to clear
    /// up on retry.
    Transient(String),
    /// Structural corruption was detected (e.g. a cycle in a parent chain).
    /// Fatal; surfaced for operator intervention.
    Corrupt(String),
    /// The requested document does not exist.
    NotFound,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transient(msg) => write!(f, "transient store error: {msg}"),
            Self::Corrupt(msg) => write!(f, "store corruption detected: {msg}"),
            Self::NotFound => f.write_str("document not found"),
        }
    }
}

impl std::error::Error for StoreError {}

/// One row of the `UnionEdge` document kind.
///
/// `_id` is `child`. A root row has `parent == None` and carries `rank` +
/// `cardinality`; a child row has `parent == Some(new_root_canonical)` and
/// carries neither (both fields are only ever maintained on the current
/// root of a tree).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnionEdgeRow {
    /// Canonical form of the node this row describes. For a root row this is
    /// the root's own canonical form (the "child" name is a schema artifact
    /// inherited from the row being keyed by this field either way).
    pub child: String,
    /// Canonical form of the parent, or `None` if `child` is currently a
    /// root.
    pub parent: Option<String>,
    /// Which of the `K` replicas this row belongs to.
    pub replica: usize,
    /// Present only on root rows: the rank of this tree.
    pub rank: Option<u32>,
    /// Present only on root rows: the number of nodes in this tree.
    pub cardinality: Option<usize>,
}

impl UnionEdgeRow {
    /// `true` if this row has no `parent` (i.e. `child` is a root).
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// An OR-of-terms selector query: `{field == value}` for each `(field,
/// value)` pair in `terms`, optionally excluding one document id.
///
/// Used both for the combined hard-selector query and the per-value soft
/// queries the equivalence finder builds, and for the query engine's
/// `find_urls_by_selector` OR clause.
#[derive(Debug, Clone, Default)]
pub struct SelectorQuery {
    /// The `(field, value)` pairs to OR together.
    pub terms: Vec<(String, String)>,
    /// A document id to exclude from the result, so a record's own fields
    /// never match itself.
    pub exclude_id: Option<String>,
}

/// Abstract persistence for Records and UnionEdges.
///
/// Deliberately narrow: bulk index, multi-get, multi-search, term scan,
/// term search, refresh, index create/delete. An alternative backend can
/// implement this trait with no change to the union-find logic above it.
pub trait Store: Send + Sync {
    /// Creates the backing index/trees if absent. Idempotent.
    fn ensure_index(&self) -> Result<(), StoreError>;

    /// Tears down the backing index/trees. Idempotent.
    fn delete_index(&self) -> Result<(), StoreError>;

    /// Upserts a single record by `url`.
    fn index_record(&self, record: &Record) -> Result<(), StoreError>;

    /// Upserts many records in one round-trip.
    fn bulk_index_records(&self, records: &[Record]) -> Result<(), StoreError>;

    /// Fetches records by `url`, preserving input order. A missing `url`
    /// yields `None` at that position rather than shortening the result —
    /// dangling references degrade to placeholders, not errors.
    fn get_records(&self, urls: &[String]) -> Result<Vec<Option<Record>>, StoreError>;

    /// Writes many `UnionEdge` rows in one round-trip. The caller guarantees
    /// the new root row is present in the same batch as the redirect rows
    /// that reference it.
    fn bulk_write_edges(&self, rows: &[UnionEdgeRow]) -> Result<(), StoreError>;

    /// Fetches the single `UnionEdge` row keyed by `canonical`, or `None` if
    /// absent (the node has never participated in a union).
    fn get_edge(&self, canonical: &str) -> Result<Option<UnionEdgeRow>, StoreError>;

    /// Returns every row whose `parent` equals `parent_canonical`.
    fn children_of(&self, parent_canonical: &str) -> Result<Vec<UnionEdgeRow>, StoreError>;

    /// Runs `queries` as a single multi-search round trip. Each element of
    /// the result corresponds positionally to the query at the same index;
    /// a sub-query failure is reported as an `Err` at that position without
    /// failing the other sub-queries.
    fn msearch(
        &self,
        queries: &[SelectorQuery],
    ) -> Result<Vec<Result<Vec<String>, StoreError>>, StoreError>;

    /// Runs a single [`SelectorQuery`] and returns the matching, deduplicated
    /// `url`s.
    fn search(&self, query: &SelectorQuery) -> Result<Vec<String>, StoreError>;

    /// Returns every known record `url`.
    fn scan_all_urls(&self) -> Result<Vec<String>, StoreError>;

    /// Makes prior writes visible to subsequent reads. A no-op for backends
    /// with no write buffering, but every session flush calls it so the
    /// contract holds regardless of backend.
    fn refresh(&self) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// An in-process, `HashMap`-backed [`Store`]. The default for tests and
/// `aka-graph-bench`; nothing is persisted across process restarts.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, Record>>,
    edges: RwLock<HashMap<String, UnionEdgeRow>>,
    /// `(field, value) -> urls carrying that value`. Populated for every
    /// field a record carries, plus a synthetic `"url"` field so `url ==
    /// value` selector terms resolve without a special case.
    field_index: RwLock<HashMap<(String, String), HashSet<String>>>,
    /// `parent_canonical -> child_canonical`s, maintained incrementally by
    /// `bulk_write_edges`.
    children_index: RwLock<HashMap<String, HashSet<String>>>,
}

impl MemoryStore {
    /// Constructs an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn index_one_record(
        field_index: &mut HashMap<(String, String), HashSet<String>>,
        record: &Record,
    ) {
        field_index
            .entry(("url".to_owned(), record.url.clone()))
            .or_default()
            .insert(record.url.clone());
        for (field, values) in &record.fields {
            for value in values {
                field_index
                    .entry((field.clone(), value.clone()))
                    .or_default()
                    .insert(record.url.clone());
            }
        }
    }
}

impl Store for MemoryStore {
    fn ensure_index(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn delete_index(&self) -> Result<(), StoreError> {
        self.records.write().unwrap_or_else(|e| e.into_inner()).clear();
        self.edges.write().unwrap_or_else(|e| e.into_inner()).clear();
        self.field_index
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
        self.children_index
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
        Ok(())
    }

    fn index_record(&self, record: &Record) -> Result<(), StoreError> {
        self.bulk_index_records(std::slice::from_ref(record))
    }

    fn bulk_index_records(&self, records: &[Record]) -> Result<(), StoreError> {
        let mut store = self.records.write().unwrap_or_else(|e| e.into_inner());
        let mut index = self.field_index.write().unwrap_or_else(|e| e.into_inner());
        for record in records {
            Self::index_one_record(&mut index, record);
            store.insert(record.url.clone(), record.clone());
        }
        Ok(())
    }

    fn get_records(&self, urls: &[String]) -> Result<Vec<Option<Record>>, StoreError> {
        let store = self.records.read().unwrap_or_else(|e| e.into_inner());
        Ok(urls.iter().map(|u| store.get(u).cloned()).collect())
    }

    fn bulk_write_edges(&self, rows: &[UnionEdgeRow]) -> Result<(), StoreError> {
        let mut edges = self.edges.write().unwrap_or_else(|e| e.into_inner());
        let mut children = self
            .children_index
            .write()
            .unwrap_or_else(|e| e.into_inner());
        for row in rows {
            if let Some(parent) = &row.parent {
                children
                    .entry(parent.clone())
                    .or_default()
                    .insert(row.child.clone());
            }
            edges.insert(row.child.clone(), row.clone());
        }
        Ok(())
    }

    fn get_edge(&self, canonical: &str) -> Result<Option<UnionEdgeRow>, StoreError> {
        let edges = self.edges.read().unwrap_or_else(|e| e.into_inner());
        Ok(edges.get(canonical).cloned())
    }

    fn children_of(&self, parent_canonical: &str) -> Result<Vec<UnionEdgeRow>, StoreError> {
        let children = self
            .children_index
            .read()
            .unwrap_or_else(|e| e.into_inner());
        let edges = self.edges.read().unwrap_or_else(|e| e.into_inner());
        let Some(child_names) = children.get(parent_canonical) else {
            return Ok(Vec::new());
        };
        Ok(child_names
            .iter()
            .filter_map(|name| edges.get(name).cloned())
            .collect())
    }

    fn msearch(
        &self,
        queries: &[SelectorQuery],
    ) -> Result<Vec<Result<Vec<String>, StoreError>>, StoreError> {
        Ok(queries.iter().map(|q| self.search(q)).collect())
    }

    fn search(&self, query: &SelectorQuery) -> Result<Vec<String>, StoreError> {
        let index = self.field_index.read().unwrap_or_else(|e| e.into_inner());
        let mut matched: HashSet<String> = HashSet::new();
        for (field, value) in &query.terms {
            if let Some(urls) = index.get(&(field.clone(), value.clone())) {
                matched.extend(urls.iter().cloned());
            }
        }
        if let Some(excluded) = &query.exclude_id {
            matched.remove(excluded);
        }
        Ok(matched.into_iter().collect())
    }

    fn scan_all_urls(&self) -> Result<Vec<String>, StoreError> {
        let store = self.records.read().unwrap_or_else(|e| e.into_inner());
        Ok(store.keys().cloned().collect())
    }

    fn refresh(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SledStore
// ---------------------------------------------------------------------------

const RECORDS_TREE: &str = "records";
const EDGES_TREE: &str = "edges";
const FIELD_INDEX_TREE: &str = "field_index";
const CHILDREN_INDEX_TREE: &str = "children_index";
/// Reserved RootSize document kind; provisioned for schema completeness
/// but never written to (see `DESIGN.md`).
const ROOT_SIZE_TREE: &str = "root_size";
const INDEX_KEY_SEP: char = '\u{1}';

/// An embedded, disk-persisted [`Store`] backed by `sled`.
///
/// Each document kind lives in its own `sled::Tree`; term-query support
/// comes from two append-only secondary index trees keyed so that a prefix
/// scan (`field\x01value\x01url`, `parent\x01child`) enumerates matches
/// without a read-modify-write cycle.
pub struct SledStore {
    db: sled::Db,
    records: sled::Tree,
    edges: sled::Tree,
    field_index: sled::Tree,
    children_index: sled::Tree,
    #[allow(dead_code)]
    root_size: sled::Tree,
}

impl SledStore {
    /// Opens (creating if absent) a `SledStore` at `path`.
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, StoreError> {
        let db = sled::open(path).map_err(sled_err)?;
        let records = db.open_tree(RECORDS_TREE).map_err(sled_err)?;
        let edges = db.open_tree(EDGES_TREE).map_err(sled_err)?;
        let field_index = db.open_tree(FIELD_INDEX_TREE).map_err(sled_err)?;
        let children_index = db.open_tree(CHILDREN_INDEX_TREE).map_err(sled_err)?;
        let root_size = db.open_tree(ROOT_SIZE_TREE).map_err(sled_err)?;
        Ok(Self {
            db,
            records,
            edges,
            field_index,
            children_index,
            root_size,
        })
    }

    fn field_index_key(field: &str, value: &str, url: &str) -> String {
        format!("{field}{INDEX_KEY_SEP}{value}{INDEX_KEY_SEP}{url}")
    }

    fn field_index_prefix(field: &str, value: &str) -> String {
        format!("{field}{INDEX_KEY_SEP}{value}{INDEX_KEY_SEP}")
    }

    fn children_index_key(parent: &str, child: &str) -> String {
        format!("{parent}{INDEX_KEY_SEP}{child}")
    }

    fn children_index_prefix(parent: &str) -> String {
        format!("{parent}{INDEX_KEY_SEP}")
    }
}

fn sled_err(e: sled::Error) -> StoreError {
    StoreError::Transient(e.to_string())
}

fn to_json(value: &impl Serialize) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec(value).map_err(|e| StoreError::Transient(e.to_string()))
}

fn from_json<T: for<'de> Deserialize<'de>>(bytes: &sled::IVec) -> Result<T, StoreError> {
    serde_json::from_slice(bytes).map_err(|e| StoreError::Corrupt(e.to_string()))
}

impl Store for SledStore {
    fn ensure_index(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn delete_index(&self) -> Result<(), StoreError> {
        self.records.clear().map_err(sled_err)?;
        self.edges.clear().map_err(sled_err)?;
        self.field_index.clear().map_err(sled_err)?;
        self.children_index.clear().map_err(sled_err)?;
        self.root_size.clear().map_err(sled_err)?;
        Ok(())
    }

    fn index_record(&self, record: &Record) -> Result<(), StoreError> {
        self.bulk_index_records(std::slice::from_ref(record))
    }

    fn bulk_index_records(&self, records: &[Record]) -> Result<(), StoreError> {
        for record in records {
            let bytes = to_json(record)?;
            self.records.insert(record.url.as_bytes(), bytes).map_err(sled_err)?;
            self.field_index
                .insert(Self::field_index_key("url", &record.url, &record.url), &[])
                .map_err(sled_err)?;
            for (field, values) in &record.fields {
                for value in values {
                    self.field_index
                        .insert(
                            Self::field_index_key(field, value, &record.url),
                            &[],
                        )
                        .map_err(sled_err)?;
                }
            }
        }
        Ok(())
    }

    fn get_records(&self, urls: &[String]) -> Result<Vec<Option<Record>>, StoreError> {
        let mut out = Vec::with_capacity(urls.len());
        for url in urls {
            let record = match self.records.get(url.as_bytes()).map_err(sled_err)? {
                Some(bytes) => Some(from_json::<Record>(&bytes)?),
                None => None,
            };
            out.push(record);
        }
        Ok(out)
    }

    fn bulk_write_edges(&self, rows: &[UnionEdgeRow]) -> Result<(), StoreError> {
        for row in rows {
            let bytes = to_json(row)?;
            self.edges.insert(row.child.as_bytes(), bytes).map_err(sled_err)?;
            if let Some(parent) = &row.parent {
                self.children_index
                    .insert(Self::children_index_key(parent, &row.child), &[])
                    .map_err(sled_err)?;
            }
        }
        Ok(())
    }

    fn get_edge(&self, canonical: &str) -> Result<Option<UnionEdgeRow>, StoreError> {
        match self.edges.get(canonical.as_bytes()).map_err(sled_err)? {
            Some(bytes) => Ok(Some(from_json(&bytes)?)),
            None => Ok(None),
        }
    }

    fn children_of(&self, parent_canonical: &str) -> Result<Vec<UnionEdgeRow>, StoreError> {
        let prefix = Self::children_index_prefix(parent_canonical);
        let mut out = Vec::new();
        for entry in self.children_index.scan_prefix(prefix.as_bytes()) {
            let (key, _) = entry.map_err(sled_err)?;
            let key = String::from_utf8_lossy(&key).into_owned();
            let Some(child) = key.rsplit(INDEX_KEY_SEP).next() else {
                continue;
            };
            if let Some(row) = self.get_edge(child)? {
                out.push(row);
            }
        }
        Ok(out)
    }

    fn msearch(
        &self,
        queries: &[SelectorQuery],
    ) -> Result<Vec<Result<Vec<String>, StoreError>>, StoreError> {
        Ok(queries.iter().map(|q| self.search(q)).collect())
    }

    fn search(&self, query: &SelectorQuery) -> Result<Vec<String>, StoreError> {
        let mut matched: HashSet<String> = HashSet::new();
        for (field, value) in &query.terms {
            let prefix = Self::field_index_prefix(field, value);
            for entry in self.field_index.scan_prefix(prefix.as_bytes()) {
                let (key, _) = entry.map_err(sled_err)?;
                let key = String::from_utf8_lossy(&key).into_owned();
                if let Some(url) = key.rsplit(INDEX_KEY_SEP).next() {
                    matched.insert(url.to_owned());
                }
            }
        }
        if let Some(excluded) = &query.exclude_id {
            matched.remove(excluded);
        }
        Ok(matched.into_iter().collect())
    }

    fn scan_all_urls(&self) -> Result<Vec<String>, StoreError> {
        let mut out = Vec::new();
        for entry in self.records.iter() {
            let (key, _) = entry.map_err(sled_err)?;
            out.push(String::from_utf8_lossy(&key).into_owned());
        }
        Ok(out)
    }

    fn refresh(&self) -> Result<(), StoreError> {
        self.db.flush().map_err(sled_err)?;
        Ok(())
    }
}
