//! [`GraphConfig`] — the session-scoped configuration bag.
//!
//! A plain struct with public fields and a `Default` impl documenting each
//! default, no builder macro.
use std::fmt;
use std::sync::Arc;

/// The external character-n-gram rarity scorer, injected by the caller. The
/// default (`|_| 0.0`) disables soft selectors entirely.
pub type ScoreFn = dyn Fn(&str) -> f64 + Send + Sync;

/// Session-scoped configuration for the AKA Graph engine.
///
/// Includes two component-size truncation knobs
/// (`component_truncate_min`/`component_truncate_max_count`) exposed here
/// rather than left as literals inside the query engine.
#[derive(Clone)]
pub struct GraphConfig {
    /// Number of independent Monte-Carlo union-find replicas. Default: 10.
    pub k: usize,
    /// Identifier classes treated as globally unique (strength-1 edges).
    /// Default: `["email", "phone", "skype", "hostname"]`.
    pub hard_selectors: Vec<String>,
    /// Identifier classes treated as shared but informative (strength =
    /// `score_fn` output). Default: `["name", "username", "postal_address"]`.
    pub soft_selectors: Vec<String>,
    /// Number of buffered records/edges a session accumulates before an
    /// automatic flush. Default: 20.
    pub buffer_size: usize,
    /// `α` in the source-cardinality downweight `exp(-α·(m-1))`. Default: 0
    /// (disabled).
    pub num_identifier_downweight: f64,
    /// `β` in the target-popularity downweight `exp(-β·(h-1))`. Default: 0
    /// (disabled).
    pub popular_identifier_downweight: f64,
    /// Soft-selector edges with `score_fn(value) <= score_cutoff` are
    /// dropped. Default: 0.001.
    pub score_cutoff: f64,
    /// The external string-rarity scorer. Default: `|_| 0.0`, which disables
    /// soft-selector edges outright (a safe default, per §8).
    pub score_fn: Arc<ScoreFn>,
    /// Component-size truncation: the minimum number of ranked members
    /// always emitted before the "stop when count is small" rule kicks in.
    /// Default: 10.
    pub component_truncate_min: usize,
    /// Component-size truncation: once `component_truncate_min` members have
    /// been emitted, stop as soon as the next member's count is at or below
    /// this value. Default: 2.
    pub component_truncate_max_count: usize,
}

impl GraphConfig {
    /// Every configured hard and soft selector field name, in that order.
    #[must_use]
    pub fn all_selector_fields(&self) -> Vec<String> {
        self.hard_selectors
            .iter()
            .chain(self.soft_selectors.iter())
            .cloned()
            .collect()
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            k: 10,
            hard_selectors: ["email", "phone", "skype", "hostname"]
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
            soft_selectors: ["name", "username", "postal_address"]
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
            buffer_size: 20,
            num_identifier_downweight: 0.0,
            popular_identifier_downweight: 0.0,
            score_cutoff: 0.001,
            score_fn: Arc::new(|_: &str| 0.0),
            component_truncate_min: 10,
            component_truncate_max_count: 2,
        }
    }
}

impl fmt::Debug for GraphConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphConfig")
            .field("k", &self.k)
            .field("hard_selectors", &self.hard_selectors)
            .field("soft_selectors", &self.soft_selectors)
            .field("buffer_size", &self.buffer_size)
            .field("num_identifier_downweight", &self.num_identifier_downweight)
            .field(
                "popular_identifier_downweight",
                &self.popular_identifier_downweight,
            )
            .field("score_cutoff", &self.score_cutoff)
            .field("score_fn", &"<fn>")
            .field("component_truncate_min", &self.component_truncate_min)
            .field(
                "component_truncate_max_count",
                &self.component_truncate_max_count,
            )
            .finish()
    }
}
