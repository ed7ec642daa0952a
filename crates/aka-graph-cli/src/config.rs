//! Config-file overrides layered under CLI flags.
//!
//! [`aka_graph_core::GraphConfig`] cannot derive `Deserialize` directly (its
//! `score_fn` field is a trait object), so `--config` files are parsed into
//! this plain, fully-optional mirror struct and applied onto
//! `GraphConfig::default()` field by field. CLI flags are then applied on
//! top by [`crate::cli::Cli::resolve_config`], so CLI flags always override
//! file values.
use aka_graph_core::GraphConfig;
use serde::Deserialize;

/// A fully-optional mirror of the JSON-serializable subset of
/// [`GraphConfig`]'s fields.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigOverrides {
    pub k: Option<usize>,
    pub hard_selectors: Option<Vec<String>>,
    pub soft_selectors: Option<Vec<String>>,
    pub buffer_size: Option<usize>,
    pub num_identifier_downweight: Option<f64>,
    pub popular_identifier_downweight: Option<f64>,
    pub score_cutoff: Option<f64>,
    pub component_truncate_min: Option<usize>,
    pub component_truncate_max_count: Option<usize>,
}

impl ConfigOverrides {
    /// Applies every present field onto `base`, returning the updated config.
    #[must_use]
    pub fn apply(self, mut base: GraphConfig) -> GraphConfig {
        if let Some(k) = self.k {
            base.k = k;
        }
        if let Some(v) = self.hard_selectors {
            base.hard_selectors = v;
        }
        if let Some(v) = self.soft_selectors {
            base.soft_selectors = v;
        }
        if let Some(v) = self.buffer_size {
            base.buffer_size = v;
        }
        if let Some(v) = self.num_identifier_downweight {
            base.num_identifier_downweight = v;
        }
        if let Some(v) = self.popular_identifier_downweight {
            base.popular_identifier_downweight = v;
        }
        if let Some(v) = self.score_cutoff {
            base.score_cutoff = v;
        }
        if let Some(v) = self.component_truncate_min {
            base.component_truncate_min = v;
        }
        if let Some(v) = self.component_truncate_max_count {
            base.component_truncate_max_count = v;
        }
        base
    }
}
