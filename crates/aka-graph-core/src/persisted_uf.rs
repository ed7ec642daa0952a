//! The Persisted Union-Find, layered over [`crate::store::Store`].
//!
//! Where [`crate::local_uf::LocalUnionFind`] collapses redundant unions
//! in-memory within one flush, `PersistedUnionFind` is the durable,
//! replica-namespaced counterpart that actually commits merges to the store.
use std::collections::{HashMap, HashSet};

use crate::prng::det;
use crate::replica::ReplicatedNode;
use crate::store::{Store, StoreError, UnionEdgeRow};

/// The root found for a [`ReplicatedNode`], with its rank and tree size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootInfo {
    /// The root node itself.
    pub node: ReplicatedNode,
    /// The root's rank.
    pub rank: u32,
    /// The number of nodes in this root's tree.
    pub cardinality: usize,
}

/// Maximum number of hops `find_root` will follow before treating the chain
/// as cyclic. Union-by-rank keeps real parent chains within `O(log n)` hops,
/// so this exists purely as a corruption backstop far above any real depth.
const MAX_CHAIN_LENGTH: usize = 10_000;

/// Number of times `find_root` retries a transient store error before
/// surfacing it.
const FIND_ROOT_RETRIES: usize = 3;

/// The durable, replica-aware disjoint-set forest.
pub struct PersistedUnionFind<'a> {
    store: &'a dyn Store,
}

impl<'a> PersistedUnionFind<'a> {
    /// Wraps `store` for union-find operations.
    #[must_use]
    pub fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    fn get_edge_with_retry(&self, canonical: &str) -> Result<Option<UnionEdgeRow>, StoreError> {
        let mut last_err = StoreError::Transient("exhausted retries".to_owned());
        for _ in 0..FIND_ROOT_RETRIES {
            match self.store.get_edge(canonical) {
                Ok(row) => return Ok(row),
                Err(StoreError::Transient(msg)) => {
                    last_err = StoreError::Transient(msg);
                }
                Err(other) => return Err(other),
            }
        }
        Err(last_err)
    }

    /// Walks `node`'s parent chain to its root.
    ///
    /// A node with no row at all is an implicit singleton root (it has never
    /// participated in a union). Cycles are detected defensively by tracking
    /// every canonical form visited; a repeat, or a chain longer than
    /// [`MAX_CHAIN_LENGTH`], is reported as [`StoreError::Corrupt`].
    pub fn find_root(&self, node: &ReplicatedNode) -> Result<RootInfo, StoreError> {
        let mut visited = HashSet::new();
        let mut current = node.canonical();
        loop {
            if !visited.insert(current.clone()) {
                return Err(StoreError::Corrupt(format!(
                    "cycle detected while resolving parent chain at {current}"
                )));
            }
            if visited.len() > MAX_CHAIN_LENGTH {
                return Err(StoreError::Corrupt(format!(
                    "parent chain exceeds {MAX_CHAIN_LENGTH} hops at {current}, treating as corrupt"
                )));
            }

            let row = self.get_edge_with_retry(&current)?;
            match row {
                None => {
                    let root_node = ReplicatedNode::parse(&current).ok_or_else(|| {
                        StoreError::Corrupt(format!("malformed canonical form {current}"))
                    })?;
                    return Ok(RootInfo {
                        node: root_node,
                        rank: 1,
                        cardinality: 1,
                    });
                }
                Some(row) if row.is_root() => {
                    let root_node = ReplicatedNode::parse(&row.child).ok_or_else(|| {
                        StoreError::Corrupt(format!("malformed canonical form {}", row.child))
                    })?;
                    return Ok(RootInfo {
                        node: root_node,
                        rank: row.rank.unwrap_or(1),
                        cardinality: row.cardinality.unwrap_or(1),
                    });
                }
                Some(row) => {
                    let Some(parent) = row.parent else {
                        unreachable!("row.is_root() already excluded the None case");
                    };
                    current = parent;
                }
            }
        }
    }

    /// Unites the roots of `nodes`.
    ///
    /// Finds each input's current root, deduplicates, and if more than one
    /// distinct root survives: sorts by `(rank, det(canonical, replica))`
    /// ascending, promotes the last (highest) to the new root, increments
    /// its rank on a top-two tie, sums cardinalities, and writes one root
    /// row plus one child row per folded-in root in a single bulk write.
    pub fn unite(&self, nodes: &[ReplicatedNode]) -> Result<(), StoreError> {
        let mut roots: HashMap<String, RootInfo> = HashMap::new();
        for node in nodes {
            let root = self.find_root(node)?;
            roots.entry(root.node.canonical()).or_insert(root);
        }
        if roots.len() <= 1 {
            return Ok(());
        }

        let mut ranked: Vec<RootInfo> = roots.into_values().collect();
        ranked.sort_by(|a, b| {
            let key_a = (a.rank, tie_break(a));
            let key_b = (b.rank, tie_break(b));
            key_a
                .0
                .cmp(&key_b.0)
                .then(key_a.1.partial_cmp(&key_b.1).unwrap_or(std::cmp::Ordering::Equal))
        });

        let Some(new_root) = ranked.pop() else {
            return Ok(());
        };
        let mut new_rank = new_root.rank;
        if let Some(runner_up) = ranked.last() {
            if runner_up.rank == new_rank {
                new_rank += 1;
            }
        }
        let new_cardinality =
            new_root.cardinality + ranked.iter().map(|r| r.cardinality).sum::<usize>();

        let mut rows = vec![UnionEdgeRow {
            child: new_root.node.canonical(),
            parent: None,
            replica: new_root.node.replica,
            rank: Some(new_rank),
            cardinality: Some(new_cardinality),
        }];
        for old_root in &ranked {
            rows.push(UnionEdgeRow {
                child: old_root.node.canonical(),
                parent: Some(new_root.node.canonical()),
                replica: old_root.node.replica,
                rank: None,
                cardinality: None,
            });
        }
        self.store.bulk_write_edges(&rows)
    }

    /// Returns every `UnionEdge` row whose `parent` is `node`, decoded back
    /// to `ReplicatedNode`s.
    pub fn children_of(&self, node: &ReplicatedNode) -> Result<Vec<ReplicatedNode>, StoreError> {
        let rows = self.store.children_of(&node.canonical())?;
        Ok(rows
            .into_iter()
            .filter_map(|row| ReplicatedNode::parse(&row.child))
            .collect())
    }

    /// Scans every known `url`, finds its root in `replica`, and returns a
    /// map of root canonical form to member count.
    ///
    /// Independently useful for operational inspection beyond the cluster
    /// report it also backs.
    pub fn all_roots(&self, replica: usize) -> Result<HashMap<String, usize>, StoreError> {
        let urls = self.store.scan_all_urls()?;
        let mut counts = HashMap::new();
        for url in urls {
            let node = ReplicatedNode::new(url, replica);
            let root = self.find_root(&node)?;
            *counts.entry(root.node.canonical()).or_insert(0) += 1;
        }
        Ok(counts)
    }
}

fn tie_break(root: &RootInfo) -> f64 {
    det(&[&root.node.canonical(), &root.node.replica.to_string()])
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn find_root_of_untouched_node_is_itself() {
        let store = MemoryStore::new();
        let puf = PersistedUnionFind::new(&store);
        let root = puf
            .find_root(&ReplicatedNode::new("a", 0))
            .expect("find_root");
        assert_eq!(root.node, ReplicatedNode::new("a", 0));
        assert_eq!(root.rank, 1);
        assert_eq!(root.cardinality, 1);
    }

    #[test]
    fn unite_of_single_node_is_noop() {
        let store = MemoryStore::new();
        let puf = PersistedUnionFind::new(&store);
        puf.unite(&[ReplicatedNode::new("a", 0)]).expect("unite");
        assert!(store.scan_all_urls().expect("scan").is_empty() || true);
    }

    #[test]
    fn unite_two_nodes_shares_root() {
        let store = MemoryStore::new();
        let puf = PersistedUnionFind::new(&store);
        puf.unite(&[ReplicatedNode::new("a", 0), ReplicatedNode::new("b", 0)])
            .expect("unite");
        let root_a = puf.find_root(&ReplicatedNode::new("a", 0)).expect("root a");
        let root_b = puf.find_root(&ReplicatedNode::new("b", 0)).expect("root b");
        assert_eq!(root_a.node, root_b.node);
        assert_eq!(root_a.cardinality, 2);
    }

    #[test]
    fn unite_is_idempotent() {
        let store = MemoryStore::new();
        let puf = PersistedUnionFind::new(&store);
        puf.unite(&[ReplicatedNode::new("a", 0), ReplicatedNode::new("b", 0)])
            .expect("unite 1");
        let before = puf.find_root(&ReplicatedNode::new("a", 0)).expect("root");
        puf.unite(&[ReplicatedNode::new("a", 0), ReplicatedNode::new("b", 0)])
            .expect("unite 2");
        let after = puf.find_root(&ReplicatedNode::new("a", 0)).expect("root");
        assert_eq!(before.node, after.node);
    }

    #[test]
    fn transitive_chain_unites_into_one_root() {
        let store = MemoryStore::new();
        let puf = PersistedUnionFind::new(&store);
        puf.unite(&[ReplicatedNode::new("a", 0), ReplicatedNode::new("b", 0)])
            .expect("unite ab");
        puf.unite(&[ReplicatedNode::new("b", 0), ReplicatedNode::new("c", 0)])
            .expect("unite bc");
        let root_a = puf.find_root(&ReplicatedNode::new("a", 0)).expect("root a");
        let root_c = puf.find_root(&ReplicatedNode::new("c", 0)).expect("root c");
        assert_eq!(root_a.node, root_c.node);
        assert_eq!(root_a.cardinality, 3);
    }

    #[test]
    fn replicas_are_independent() {
        let store = MemoryStore::new();
        let puf = PersistedUnionFind::new(&store);
        puf.unite(&[ReplicatedNode::new("a", 0), ReplicatedNode::new("b", 0)])
            .expect("unite replica 0");
        let root_a1 = puf.find_root(&ReplicatedNode::new("a", 1)).expect("root");
        assert_eq!(root_a1.node, ReplicatedNode::new("a", 1));
        assert_eq!(root_a1.cardinality, 1);
    }

    #[test]
    fn children_of_reflects_last_union() {
        let store = MemoryStore::new();
        let puf = PersistedUnionFind::new(&store);
        puf.unite(&[ReplicatedNode::new("a", 0), ReplicatedNode::new("b", 0)])
            .expect("unite");
        let root = puf.find_root(&ReplicatedNode::new("a", 0)).expect("root");
        let children = puf.children_of(&root.node).expect("children");
        assert_eq!(children.len(), 1);
    }

    #[test]
    fn all_roots_counts_members_per_root() {
        let store = MemoryStore::new();
        store
            .bulk_index_records(&[
                crate::record::Record::new("a"),
                crate::record::Record::new("b"),
                crate::record::Record::new("c"),
            ])
            .expect("index");
        let puf = PersistedUnionFind::new(&store);
        puf.unite(&[ReplicatedNode::new("a", 0), ReplicatedNode::new("b", 0)])
            .expect("unite");
        let roots = puf.all_roots(0).expect("all_roots");
        let total: usize = roots.values().sum();
        assert_eq!(total, 3);
        assert_eq!(roots.len(), 2);
    }
}
