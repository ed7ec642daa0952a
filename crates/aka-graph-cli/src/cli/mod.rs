//! Clap CLI definition: root struct, subcommands, and shared argument types.
use std::path::PathBuf;

use aka_graph_core::GraphConfig;
use clap::{Parser, Subcommand, ValueEnum};

use crate::error::CliError;
use crate::io;

/// Output format for CLI commands.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tabular output (default).
    #[default]
    Human,
    /// Structured JSON output.
    Json,
}

/// All top-level subcommands exposed by the `aka-graph` binary.
#[derive(Subcommand)]
pub enum Command {
    /// Create a fresh store at `--store` and provision its indexes.
    Init,

    /// Ingest records from a JSON file (an array of `{url, ...fields}`
    /// objects), opening a session and flushing per `--buffer-size`.
    Ingest {
        /// Path to a JSON file containing an array of records.
        #[arg(long, value_name = "FILE")]
        file: PathBuf,
        /// Skip equivalence discovery for every ingested record (still
        /// persists them). Useful for bulk-loading provenance-only data.
        #[arg(long)]
        no_union: bool,
    },

    /// Assert an explicit pairwise relationship between identifiers.
    #[command(name = "add-edge")]
    AddEdge {
        /// Comma-separated identifiers to unite.
        #[arg(long, value_delimiter = ',', num_args = 2.., required = true)]
        ids: Vec<String>,
        /// Edge strength in `(0, 1]`.
        #[arg(long)]
        strength: f64,
        /// Evidence token. If supplied, the probabilistic union is
        /// deterministic and idempotent across repeated calls; if omitted,
        /// each call draws independent samples.
        #[arg(long)]
        evidence: Option<String>,
    },

    /// Resolve an identifier to its connected component.
    Query {
        /// The identifier string to resolve.
        selector: String,
    },

    /// Print summary statistics about the store.
    Inspect,

    /// Print the cluster report (largest components, size histogram,
    /// per-cluster identifier overlaps).
    Analyze {
        /// Maximum number of clusters to report.
        #[arg(long, default_value = "20")]
        limit: usize,
        /// Maximum number of member URLs to list per cluster.
        #[arg(long, default_value = "10")]
        candidates_limit: usize,
    },

    /// Tear down the store's indexes.
    Reset,
}

/// Root CLI struct for the `aka-graph` binary.
#[derive(Parser)]
#[command(
    name = "aka-graph",
    version,
    about = "AKA Graph reference CLI",
    long_about = "Maintains a probabilistic equivalence graph over records \
                  that describe real-world entities using noisy identifier \
                  sets. Ingests records and explicit relationship assertions, \
                  merges equivalent records across K Monte-Carlo union-find \
                  replicas, and answers identifier queries with a confidence \
                  score."
)]
pub struct Cli {
    /// Active subcommand.
    #[command(subcommand)]
    pub command: Command,

    /// Path to the embedded store directory.
    #[arg(long, global = true, env = "AKA_GRAPH_STORE", default_value = "./aka-graph-store")]
    pub store: PathBuf,

    /// Output format: human (default) or json.
    #[arg(long, short = 'f', default_value = "human", global = true)]
    pub format: OutputFormat,

    /// Increase stderr verbosity (installs a `tracing` subscriber at debug
    /// level; without this flag only warnings are logged).
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Path to a JSON file overriding `GraphConfig` fields (`k`,
    /// `hard_selectors`, `soft_selectors`, `buffer_size`,
    /// `num_identifier_downweight`, `popular_identifier_downweight`,
    /// `score_cutoff`). CLI flags below take precedence over this file.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Number of Monte-Carlo union-find replicas. Overrides `--config`.
    #[arg(long, global = true)]
    pub k: Option<usize>,

    /// Hard-selector field name (repeatable). Overrides `--config`.
    #[arg(long = "hard-selector", global = true, value_name = "FIELD")]
    pub hard_selectors: Vec<String>,

    /// Soft-selector field name (repeatable). Overrides `--config`.
    #[arg(long = "soft-selector", global = true, value_name = "FIELD")]
    pub soft_selectors: Vec<String>,

    /// Session buffer size before an automatic flush. Overrides `--config`.
    #[arg(long, global = true)]
    pub buffer_size: Option<usize>,
}

impl Cli {
    /// Resolves the effective [`GraphConfig`] for this invocation:
    /// `GraphConfig::default()`, overridden by `--config` (if present),
    /// overridden by the individual `--k`/`--hard-selector`/`--soft-selector`/
    /// `--buffer-size` flags.
    pub fn resolve_config(&self) -> Result<GraphConfig, CliError> {
        let mut config = match &self.config {
            Some(path) => io::read_config_overrides(path)?,
            None => GraphConfig::default(),
        };
        if let Some(k) = self.k {
            config.k = k;
        }
        if !self.hard_selectors.is_empty() {
            config.hard_selectors = self.hard_selectors.clone();
        }
        if !self.soft_selectors.is_empty() {
            config.soft_selectors = self.soft_selectors.clone();
        }
        if let Some(buffer_size) = self.buffer_size {
            config.buffer_size = buffer_size;
        }
        Ok(config)
    }
}
