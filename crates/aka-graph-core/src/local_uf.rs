//! In-memory, per-batch disjoint-set forest keyed by arbitrary string labels.
//!
//! Before a batch touches the persisted store, redundant unions within the
//! same flush are collapsed locally so the store only sees the unions that
//! actually change anything. It is not shared across flushes and carries no
//! replica namespacing — see [`crate::persisted_uf::PersistedUnionFind`] for
//! the durable, replica-aware counterpart built on the same ranked-union rule.
use std::collections::{HashMap, HashSet};

/// A disjoint-set forest over `String` labels, with path compression and
/// ranked union.
///
/// Grows its label set lazily as `find` first encounters each label, since a
/// batch's canonical-form keys are sparse and not known in advance.
#[derive(Debug, Default, Clone)]
pub struct LocalUnionFind {
    parent: HashMap<String, String>,
    rank: HashMap<String, u32>,
}

impl LocalUnionFind {
    /// Creates an empty forest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the representative label for `name`, introducing `name` as a
    /// fresh singleton if it has not been seen before.
    ///
    /// Uses full path compression: every label visited while walking to the
    /// root is repointed directly at the root in a second pass over the
    /// visited set.
    pub fn find(&mut self, name: &str) -> String {
        let mut seen = Vec::new();
        let mut current = name.to_owned();
        while let Some(parent) = self.parent.get(&current) {
            seen.push(current.clone());
            current = parent.clone();
        }
        for label in seen {
            self.parent.insert(label, current.clone());
        }
        current
    }

    fn rank_of(&self, name: &str) -> u32 {
        self.rank.get(name).copied().unwrap_or(1)
    }

    /// Finds the roots of `names`, unions them all together, and returns the
    /// set of *old* roots that were folded into the new one.
    ///
    /// Rules:
    /// 1. Fewer than two distinct inputs: no-op, returns empty.
    /// 2. All inputs already share a root: no-op, returns empty.
    /// 3. Roots are ranked ascending; the highest-rank root wins. Ties are
    ///    broken by the lexicographically lowest label, for determinism.
    ///    If the top two ranks are equal, the new root's rank increments.
    /// 4. Every other old root is repointed at the new root.
    pub fn find_all_and_union(&mut self, names: &[String]) -> HashSet<String> {
        let distinct_inputs: HashSet<&String> = names.iter().collect();
        if distinct_inputs.len() < 2 {
            return HashSet::new();
        }

        let roots: HashSet<String> = names.iter().map(|n| self.find(n)).collect();
        if roots.len() < 2 {
            return HashSet::new();
        }

        let mut ranked: Vec<(u32, String)> = roots
            .iter()
            .map(|r| (self.rank_of(r), r.clone()))
            .collect();
        // Ascending by rank, then descending by label so pop() picks the
        // highest rank and, on a tie, the lexicographically lowest label.
        ranked.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

        let Some((new_rank, new_root)) = ranked.pop() else {
            return HashSet::new();
        };
        let mut new_rank = new_rank;
        if let Some((top_remaining_rank, _)) = ranked.last() {
            if *top_remaining_rank == new_rank {
                new_rank += 1;
            }
        }
        self.rank.insert(new_root.clone(), new_rank);

        for (_, old_root) in &ranked {
            self.parent.insert(old_root.clone(), new_root.clone());
        }

        roots
    }
}
