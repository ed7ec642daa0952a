//! The Query Engine: resolve an identifier string to a scored connected
//! component.
use std::collections::{HashMap, HashSet, VecDeque};

use crate::config::GraphConfig;
use crate::persisted_uf::PersistedUnionFind;
use crate::record::Record;
use crate::replica::ReplicatedNode;
use crate::store::{SelectorQuery, Store, StoreError};

/// One ranked member of a connected component.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentMember {
    /// The member's record (a placeholder `{url: id}` if the record itself
    /// is missing from the store).
    pub record: Record,
    /// How many (replica, discovered-node) occurrences this `url` had
    /// during the BFS.
    pub count: usize,
    /// `count / K` — the fraction of replicas in which this member shares a
    /// root with the query.
    pub confidence: f64,
}

/// An OR query over `{url == v}` plus every configured hard selector, and
/// (if `use_soft`) every configured soft selector. Returns deduplicated
/// `url`s.
pub fn find_urls_by_selector(
    value: &str,
    config: &GraphConfig,
    store: &dyn Store,
    use_soft: bool,
) -> Result<Vec<String>, StoreError> {
    let mut terms = vec![("url".to_owned(), value.to_owned())];
    for field in &config.hard_selectors {
        terms.push((field.clone(), value.to_owned()));
    }
    if use_soft {
        for field in &config.soft_selectors {
            terms.push((field.clone(), value.to_owned()));
        }
    }
    store.search(&SelectorQuery {
        terms,
        exclude_id: None,
    })
}

/// Resolves `value` to the `url`s that carry it, seeds a BFS frontier with
/// each `url`'s root in every replica, walks children across all replicas
/// counting `url` occurrences, ranks by (descending count, ascending `url`),
/// applies the component-size truncation heuristic, and attaches a
/// confidence (`count / K`) to each emitted member.
///
/// If `value` matches no stored `url` or identifier at all, it is treated as
/// an orphan `url` candidate: the bare record is fetched and returned alone
/// at confidence 1.0, but only if it carries fields beyond the bare `url`
/// placeholder — otherwise the component is empty.
pub fn find_connected_component(
    value: &str,
    config: &GraphConfig,
    store: &dyn Store,
) -> Result<Vec<ComponentMember>, StoreError> {
    let urls = find_urls_by_selector(value, config, store, true)?;

    if urls.is_empty() {
        let record = store
            .get_records(&[value.to_owned()])?
            .into_iter()
            .next()
            .flatten()
            .unwrap_or_else(|| Record::new(value));
        if record.is_placeholder() {
            return Ok(Vec::new());
        }
        return Ok(vec![ComponentMember {
            record,
            count: config.k,
            confidence: 1.0,
        }]);
    }

    let puf = PersistedUnionFind::new(store);

    let mut visited: HashSet<String> = HashSet::new();
    let mut queue: VecDeque<ReplicatedNode> = VecDeque::new();
    for url in &urls {
        for replica in 0..config.k {
            let root = puf.find_root(&ReplicatedNode::new(url.clone(), replica))?;
            if visited.insert(root.node.canonical()) {
                queue.push_back(root.node);
            }
        }
    }

    let mut url_counts: HashMap<String, usize> = HashMap::new();
    while let Some(node) = queue.pop_front() {
        *url_counts.entry(node.url.clone()).or_insert(0) += 1;
        for child in puf.children_of(&node)? {
            if visited.insert(child.canonical()) {
                queue.push_back(child);
            }
        }
    }

    let mut ranked: Vec<(String, usize)> = url_counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut truncated = Vec::new();
    for (i, (url, count)) in ranked.into_iter().enumerate() {
        if i >= config.component_truncate_min && count <= config.component_truncate_max_count {
            break;
        }
        truncated.push((url, count));
    }

    let fetch_urls: Vec<String> = truncated.iter().map(|(u, _)| u.clone()).collect();
    let fetched = store.get_records(&fetch_urls)?;

    let mut out = Vec::with_capacity(truncated.len());
    for ((url, count), record_opt) in truncated.into_iter().zip(fetched) {
        let record = record_opt.unwrap_or_else(|| Record::new(url));
        #[allow(clippy::cast_precision_loss)]
        let confidence = count as f64 / config.k as f64;
        out.push(ComponentMember {
            record,
            count,
            confidence,
        });
    }
    Ok(out)
}
