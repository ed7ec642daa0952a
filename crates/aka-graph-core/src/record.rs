//! [`Record`] — the dynamic multi-map document ingested into the AKA Graph.
//!
//! A record carries a mandatory `url` and an open set of `fieldName -> list
//! of values`. Fields are not schema-coupled: any field the caller supplies
//! is stored verbatim and becomes eligible for hard/soft-selector matching
//! purely based on the session's [`crate::config::GraphConfig`] selector
//! lists, not anything declared on the record itself.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// An immutable, once-ingested record describing a real-world entity.
///
/// `url` is the record's opaque globally-unique identifier. `fields` holds
/// every other supplied attribute as an ordered list of string values,
/// preserving insertion order of keys via `BTreeMap`'s lexical ordering
/// (sufficient determinism for the multi-query construction in
/// [`crate::equivalence`], which does not depend on field iteration order
/// for correctness, only for reproducible query batching in tests).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// The record's opaque unique identifier.
    pub url: String,
    /// Every other field supplied on ingest, verbatim.
    #[serde(flatten)]
    pub fields: BTreeMap<String, Vec<String>>,
}

impl Record {
    /// Constructs a record with no fields beyond its `url`.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Adds a field value, appending to any existing values for `field`.
    pub fn push_field(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.entry(field.into()).or_default().push(value.into());
    }

    /// Returns the values stored for `field`, or an empty slice if absent.
    #[must_use]
    pub fn values(&self, field: &str) -> &[String] {
        self.fields.get(field).map_or(&[], Vec::as_slice)
    }

    /// The total number of identifier values carried by `field_names` (used
    /// by [`crate::weighting`] for the source-cardinality downweight).
    #[must_use]
    pub fn identifier_count(&self, field_names: &[String]) -> usize {
        field_names
            .iter()
            .map(|f| self.values(f).len())
            .sum()
    }

    /// `true` if this record carries no fields beyond `url`.
    ///
    /// Used by the query engine's degenerate single-URL case: a placeholder
    /// record fetched for a URL that was never actually ingested looks
    /// exactly like `Record::new(url)`.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.fields.is_empty()
    }
}
