//! Post-ingest invariant checkers for correctness validation.
//!
//! Mirrors `spec.md` §8's invariants: acyclicity, a single root per
//! component, and replica independence. Used by `tests/correctness_invariants.rs`
//! and available to callers who want to sanity-check a store after a large
//! synthetic ingest.
use std::collections::{HashSet, VecDeque};

use aka_graph_core::{GraphConfig, PersistedUnionFind, ReplicatedNode, Store};

/// Verifies that, for every known `url` and every configured replica,
/// `find_root` terminates without reporting a cycle.
pub fn check_acyclic(store: &dyn Store, config: &GraphConfig) -> Result<(), String> {
    let urls = store
        .scan_all_urls()
        .map_err(|e| format!("scan_all_urls failed: {e}"))?;
    let puf = PersistedUnionFind::new(store);
    for url in &urls {
        for replica in 0..config.k {
            puf.find_root(&ReplicatedNode::new(url.clone(), replica))
                .map_err(|e| format!("find_root({url}, {replica}) failed: {e}"))?;
        }
    }
    Ok(())
}

/// Verifies that within a single replica, every node reachable from a root
/// by following child pointers stays in that same replica — no
/// `UnionEdge` row's `parent` crosses into a different replica than its
/// `child`.
pub fn check_replica_independence(store: &dyn Store, config: &GraphConfig) -> Result<(), String> {
    let urls = store
        .scan_all_urls()
        .map_err(|e| format!("scan_all_urls failed: {e}"))?;
    let puf = PersistedUnionFind::new(store);

    for replica in 0..config.k {
        let mut seen_roots: HashSet<String> = HashSet::new();
        for url in &urls {
            let root = puf
                .find_root(&ReplicatedNode::new(url.clone(), replica))
                .map_err(|e| format!("find_root({url}, {replica}) failed: {e}"))?;
            if root.node.replica != replica {
                return Err(format!(
                    "root of ({url}, {replica}) resolved to replica {}",
                    root.node.replica
                ));
            }
            if !seen_roots.insert(root.node.canonical()) {
                continue;
            }

            let mut queue = VecDeque::from([root.node.clone()]);
            let mut visited = HashSet::new();
            while let Some(node) = queue.pop_front() {
                if !visited.insert(node.canonical()) {
                    continue;
                }
                if node.replica != replica {
                    return Err(format!(
                        "node {} reachable from replica-{replica} root but tagged replica {}",
                        node.canonical(),
                        node.replica
                    ));
                }
                let children = puf
                    .children_of(&node)
                    .map_err(|e| format!("children_of({node}) failed: {e}"))?;
                queue.extend(children);
            }
        }
    }
    Ok(())
}

/// Verifies that every root's `cardinality` equals the number of distinct
/// `url`s whose root (in `replica`) resolves to it — the invariant backing
/// [`aka_graph_core::report::analyze_clusters`]'s size field.
pub fn check_cardinality_matches_membership(
    store: &dyn Store,
    config: &GraphConfig,
    replica: usize,
) -> Result<(), String> {
    let urls = store
        .scan_all_urls()
        .map_err(|e| format!("scan_all_urls failed: {e}"))?;
    let puf = PersistedUnionFind::new(store);

    let mut membership: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
    let mut roots_by_canonical = std::collections::HashMap::new();
    for url in &urls {
        let root = puf
            .find_root(&ReplicatedNode::new(url.clone(), replica))
            .map_err(|e| format!("find_root({url}, {replica}) failed: {e}"))?;
        *membership.entry(root.node.canonical()).or_insert(0) += 1;
        roots_by_canonical.insert(root.node.canonical(), root);
    }

    for (canonical, count) in membership {
        let root = &roots_by_canonical[&canonical];
        if root.cardinality != count {
            return Err(format!(
                "root {canonical} reports cardinality {} but {count} urls resolve to it",
                root.cardinality
            ));
        }
    }
    Ok(())
}
