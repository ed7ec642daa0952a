//! The Equivalence Finder: for each ingested record, builds the multi-query
//! against the store and turns the responses into weighted candidate edges.
use std::collections::HashSet;

use crate::config::GraphConfig;
use crate::record::Record;
use crate::store::{SelectorQuery, Store, StoreError};
use crate::weighting::{SelectorClass, edge_weight};

/// One weighted candidate edge discovered for a record.
///
/// `candidates` never includes `record_url` itself; callers that need the
/// full edge set (as `probabilistically_unite` does) union it in explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct EquivCandidate {
    /// The ingested record's `url`.
    pub record_url: String,
    /// The final edge strength, after downweighting.
    pub weight: f64,
    /// Evidence token: the JSON-serialized hard OR-clause for hard-selector
    /// edges, or the identifier value itself for soft-selector edges.
    pub evidence: Option<String>,
    /// The matched candidate `url`s.
    pub candidates: HashSet<String>,
}

enum QueryOrigin {
    Hard,
    Soft { value: String },
}

/// Builds and dispatches the multi-query for every record in `records`,
/// returning one [`EquivCandidate`] per non-empty, above-cutoff match.
///
/// One combined hard query per record (skipped if the record has no
/// hard-selector values), one soft query per `(field, value)` pair above
/// `config.score_cutoff` (skipped entirely when `config.k == 1`), all
/// dispatched in a single [`Store::msearch`] round trip. A sub-query that
/// errors is logged and skipped; an empty match set produces no edge.
pub fn find_equivs(
    records: &[Record],
    config: &GraphConfig,
    store: &dyn Store,
) -> Result<Vec<EquivCandidate>, StoreError> {
    let all_fields = config.all_selector_fields();

    let mut queries = Vec::new();
    let mut origins = Vec::new();

    for record in records {
        let identifier_count = record.identifier_count(&all_fields);

        let mut hard_terms = Vec::new();
        for field in &config.hard_selectors {
            for value in record.values(field) {
                hard_terms.push((field.clone(), value.clone()));
            }
        }
        if !hard_terms.is_empty() {
            let evidence = serde_json::to_string(&hard_terms).unwrap_or_default();
            queries.push(SelectorQuery {
                terms: hard_terms,
                exclude_id: Some(record.url.clone()),
            });
            origins.push((record, identifier_count, QueryOrigin::Hard, evidence));
        }

        if config.k == 1 {
            continue;
        }
        for field in &config.soft_selectors {
            for value in record.values(field) {
                if (config.score_fn)(value) <= config.score_cutoff {
                    continue;
                }
                queries.push(SelectorQuery {
                    terms: vec![(field.clone(), value.clone())],
                    exclude_id: Some(record.url.clone()),
                });
                origins.push((
                    record,
                    identifier_count,
                    QueryOrigin::Soft {
                        value: value.clone(),
                    },
                    value.clone(),
                ));
            }
        }
    }

    if queries.is_empty() {
        return Ok(Vec::new());
    }

    let responses = store.msearch(&queries)?;

    let mut out = Vec::new();
    for ((record, identifier_count, origin, evidence), response) in
        origins.into_iter().zip(responses)
    {
        let candidates: HashSet<String> = match response {
            Ok(urls) => urls.into_iter().collect(),
            Err(err) => {
                tracing::warn!(url = %record.url, error = %err, "multi-search sub-query failed, skipping");
                continue;
            }
        };
        if candidates.is_empty() {
            continue;
        }

        let (class, value) = match &origin {
            QueryOrigin::Hard => (SelectorClass::Hard, ""),
            QueryOrigin::Soft { value } => (SelectorClass::Soft, value.as_str()),
        };
        let Some(weight) = edge_weight(class, value, identifier_count, candidates.len(), config)
        else {
            continue;
        };

        out.push(EquivCandidate {
            record_url: record.url.clone(),
            weight,
            evidence: Some(evidence),
            candidates,
        });
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use std::sync::Arc;

    use super::*;
    use crate::store::MemoryStore;

    fn record_with(url: &str, field: &str, value: &str) -> Record {
        let mut r = Record::new(url);
        r.push_field(field, value);
        r
    }

    #[test]
    fn hard_selector_match_yields_strength_one() {
        let store = MemoryStore::new();
        store
            .bulk_index_records(&[
                record_with("a", "email", "x@example.com"),
                record_with("b", "email", "x@example.com"),
            ])
            .expect("index");
        let config = GraphConfig::default();
        let result = find_equivs(&[record_with("a", "email", "x@example.com")], &config, &store)
            .expect("find_equivs");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].weight, 1.0);
        assert_eq!(result[0].candidates, HashSet::from(["b".to_owned()]));
    }

    #[test]
    fn record_with_no_hard_identifiers_produces_no_hard_edge() {
        let store = MemoryStore::new();
        let config = GraphConfig::default();
        let result = find_equivs(&[Record::new("a")], &config, &store).expect("find_equivs");
        assert!(result.is_empty());
    }

    #[test]
    fn k_one_disables_soft_queries() {
        let store = MemoryStore::new();
        store
            .bulk_index_records(&[
                record_with("a", "name", "Alice"),
                record_with("b", "name", "Alice"),
            ])
            .expect("index");
        let config = GraphConfig {
            k: 1,
            score_fn: Arc::new(|_| 0.9),
            ..GraphConfig::default()
        };
        let result = find_equivs(&[record_with("a", "name", "Alice")], &config, &store)
            .expect("find_equivs");
        assert!(result.is_empty());
    }

    #[test]
    fn score_fn_zero_produces_no_soft_edges() {
        let store = MemoryStore::new();
        store
            .bulk_index_records(&[
                record_with("a", "name", "Alice"),
                record_with("b", "name", "Alice"),
            ])
            .expect("index");
        let config = GraphConfig::default();
        let result = find_equivs(&[record_with("a", "name", "Alice")], &config, &store)
            .expect("find_equivs");
        assert!(result.is_empty());
    }

    #[test]
    fn empty_candidate_set_produces_no_edge() {
        let store = MemoryStore::new();
        store
            .bulk_index_records(&[record_with("a", "email", "x@example.com")])
            .expect("index");
        let config = GraphConfig::default();
        let result = find_equivs(&[record_with("a", "email", "x@example.com")], &config, &store)
            .expect("find_equivs");
        assert!(result.is_empty());
    }

    #[test]
    fn soft_selector_evidence_is_the_value_itself() {
        let store = MemoryStore::new();
        store
            .bulk_index_records(&[
                record_with("a", "username", "foo123"),
                record_with("b", "username", "foo123"),
            ])
            .expect("index");
        let config = GraphConfig {
            k: 10,
            score_fn: Arc::new(|_| 0.5),
            ..GraphConfig::default()
        };
        let result = find_equivs(&[record_with("a", "username", "foo123")], &config, &store)
            .expect("find_equivs");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].evidence.as_deref(), Some("foo123"));
    }
}
