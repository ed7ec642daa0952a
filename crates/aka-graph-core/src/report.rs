//! Cluster reporting — a read-only derived view over the persisted
//! union-find and query structures, for operational inspection of the
//! overall graph shape rather than a single selector lookup.
use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::config::GraphConfig;
use crate::persisted_uf::PersistedUnionFind;
use crate::replica::ReplicatedNode;
use crate::store::{Store, StoreError};

/// One connected component, as surfaced by [`analyze_clusters`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cluster {
    /// Canonical form of this cluster's root, in the inspected replica.
    pub root: String,
    /// Total number of members in the cluster.
    pub size: usize,
    /// Member `url`s, truncated to `candidates_limit`.
    pub urls: Vec<String>,
    /// Identifier values that recur across 2 or more member records,
    /// ranked by descending recurrence.
    pub overlaps: Vec<(String, usize)>,
}

/// Summary statistics over every cluster's size.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterSummary {
    /// The largest cluster's size.
    pub largest: usize,
    /// The smallest cluster's size.
    pub smallest: usize,
    /// Mean cluster size.
    pub mean: f64,
    /// Median cluster size.
    pub median: f64,
    /// Cluster-size histogram: size -> number of clusters of that size.
    pub histogram: BTreeMap<usize, usize>,
}

/// The full cluster report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterReport {
    /// Clusters, sorted by descending size (ties broken by root name).
    pub clusters: Vec<Cluster>,
    /// Summary statistics over every cluster (not just the ones retained
    /// after `size_limit` truncation).
    pub summary: ClusterSummary,
}

/// Scans every root in `replica`, builds its connected component, and
/// returns up to `size_limit` clusters (largest first) with per-cluster
/// identifier overlaps (at most `candidates_limit` member `url`s listed per
/// cluster) plus summary statistics over the full cluster population.
pub fn analyze_clusters(
    store: &dyn Store,
    config: &GraphConfig,
    replica: usize,
    size_limit: usize,
    candidates_limit: usize,
) -> Result<ClusterReport, StoreError> {
    let puf = PersistedUnionFind::new(store);
    let urls = store.scan_all_urls()?;

    let mut groups: HashMap<String, Vec<String>> = HashMap::new();
    for url in urls {
        let root = puf.find_root(&ReplicatedNode::new(url.clone(), replica))?;
        groups.entry(root.node.canonical()).or_default().push(url);
    }

    let sizes: Vec<usize> = groups.values().map(Vec::len).collect();
    let summary = summarize(&sizes);

    let mut clusters: Vec<Cluster> = Vec::with_capacity(groups.len());
    for (root, mut members) in groups {
        members.sort();
        let overlaps = find_overlaps(&members, config, store)?;
        let size = members.len();
        members.truncate(candidates_limit);
        clusters.push(Cluster {
            root,
            size,
            urls: members,
            overlaps,
        });
    }
    clusters.sort_by(|a, b| b.size.cmp(&a.size).then(a.root.cmp(&b.root)));
    clusters.truncate(size_limit);

    Ok(ClusterReport { clusters, summary })
}

fn summarize(sizes: &[usize]) -> ClusterSummary {
    if sizes.is_empty() {
        return ClusterSummary {
            largest: 0,
            smallest: 0,
            mean: 0.0,
            median: 0.0,
            histogram: BTreeMap::new(),
        };
    }

    let mut sorted = sizes.to_vec();
    sorted.sort_unstable();
    let largest = *sorted.last().unwrap_or(&0);
    let smallest = *sorted.first().unwrap_or(&0);
    #[allow(clippy::cast_precision_loss)]
    let mean = sorted.iter().sum::<usize>() as f64 / sorted.len() as f64;
    let median = median_of_sorted(&sorted);

    let mut histogram = BTreeMap::new();
    for size in sizes {
        *histogram.entry(*size).or_insert(0) += 1;
    }

    ClusterSummary {
        largest,
        smallest,
        mean,
        median,
        histogram,
    }
}

#[allow(clippy::cast_precision_loss)]
fn median_of_sorted(sorted: &[usize]) -> f64 {
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2] as f64
    } else {
        (sorted[n / 2 - 1] as f64 + sorted[n / 2] as f64) / 2.0
    }
}

/// Identifier values that recur across 2 or more of `member_urls`'
/// records, ranked by descending recurrence.
fn find_overlaps(
    member_urls: &[String],
    config: &GraphConfig,
    store: &dyn Store,
) -> Result<Vec<(String, usize)>, StoreError> {
    let records = store.get_records(member_urls)?;
    let fields = config.all_selector_fields();

    let mut value_counts: HashMap<String, usize> = HashMap::new();
    for record in records.into_iter().flatten() {
        let mut values_in_record: HashSet<String> = HashSet::new();
        for field in &fields {
            for value in record.values(field) {
                values_in_record.insert(value.clone());
            }
        }
        for value in values_in_record {
            *value_counts.entry(value).or_insert(0) += 1;
        }
    }

    let mut overlaps: Vec<(String, usize)> =
        value_counts.into_iter().filter(|(_, count)| *count >= 2).collect();
    overlaps.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    Ok(overlaps)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;
    use crate::session::IngestSession;
    use crate::store::MemoryStore;
    use crate::record::Record;

    fn record_with(url: &str, field: &str, value: &str) -> Record {
        let mut r = Record::new(url);
        r.push_field(field, value);
        r
    }

    #[test]
    fn two_triangles_report_two_clusters_of_size_three() {
        let store = MemoryStore::new();
        let config = GraphConfig::default();
        let mut session = IngestSession::open(&store, &config);
        session.add_record(record_with("a1", "email", "e1"), true).expect("a1");
        session.add_record(record_with("a2", "email", "e1"), true).expect("a2");
        session.add_record(record_with("a3", "email", "e1"), true).expect("a3");
        session.add_record(record_with("b1", "email", "e2"), true).expect("b1");
        session.add_record(record_with("b2", "email", "e2"), true).expect("b2");
        session.add_record(record_with("b3", "email", "e2"), true).expect("b3");
        session.close().expect("close");

        let report = analyze_clusters(&store, &config, 0, 10, 10).expect("report");
        assert_eq!(report.clusters.len(), 2);
        assert_eq!(report.clusters[0].size, 3);
        assert_eq!(report.clusters[1].size, 3);
        assert_eq!(report.summary.largest, 3);
        assert_eq!(report.summary.smallest, 3);
        assert_eq!(report.summary.mean, 3.0);
    }

    #[test]
    fn overlaps_report_values_shared_across_members() {
        let store = MemoryStore::new();
        let config = GraphConfig::default();
        let mut session = IngestSession::open(&store, &config);
        session.add_record(record_with("a1", "email", "shared"), true).expect("a1");
        session.add_record(record_with("a2", "email", "shared"), true).expect("a2");
        session.close().expect("close");

        let report = analyze_clusters(&store, &config, 0, 10, 10).expect("report");
        assert_eq!(report.clusters.len(), 1);
        assert_eq!(report.clusters[0].overlaps, vec![("shared".to_owned(), 2)]);
    }

    #[test]
    fn empty_store_yields_empty_summary() {
        let store = MemoryStore::new();
        let config = GraphConfig::default();
        let report = analyze_clusters(&store, &config, 0, 10, 10).expect("report");
        assert!(report.clusters.is_empty());
        assert_eq!(report.summary.largest, 0);
        assert_eq!(report.summary.mean, 0.0);
    }
}
