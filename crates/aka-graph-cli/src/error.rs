/// CLI error types with associated exit codes.
///
/// [`CliError`] is the top-level error type for the `aka-graph` binary.
/// Every variant maps to a stable exit code (1 or 2) via
/// [`CliError::exit_code`]:
///
/// - Exit code **2** — input failure: the tool could not read its input, open
///   the store, or otherwise satisfy a precondition. These errors terminate
///   early before any domain logic runs.
/// - Exit code **1** — logical failure: the tool ran to completion but the
///   result is a well-defined failure (an unresolvable query, a store-level
///   error surfaced from an otherwise valid operation).
use std::fmt;
use std::path::PathBuf;

use aka_graph_core::{IngestError, StoreError};

// ---------------------------------------------------------------------------
// CliError
// ---------------------------------------------------------------------------

/// All error conditions that the `aka-graph` CLI can produce.
///
/// Use [`CliError::exit_code`] to obtain the exit code associated with each
/// variant. [`CliError::message`] returns the human-readable error string
/// that should be printed to stderr before exiting.
#[derive(Debug)]
pub enum CliError {
    // --- Exit code 2: input failures ---
    /// A file argument could not be found on the filesystem.
    FileNotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// The input file was not valid JSON, or not shaped as an array of
    /// records.
    InvalidInput {
        /// A human-readable description of the problem.
        detail: String,
    },

    /// A generic I/O error reading a file.
    IoError {
        /// A human-readable label for the source.
        source: String,
        /// The underlying I/O error message.
        detail: String,
    },

    /// The store at `--store` could not be opened.
    StoreUnavailable {
        /// The underlying store error.
        detail: String,
    },

    // --- Exit code 1: logical failures ---
    /// A query selector resolved to an empty component.
    EmptyComponent {
        /// The selector that was queried.
        selector: String,
    },

    /// A store-level error surfaced from an otherwise well-formed operation
    /// (a detected cycle, a corrupt edge row).
    StoreOperationFailed {
        /// The underlying store error.
        detail: String,
    },
}

impl CliError {
    /// Returns the process exit code for this error.
    ///
    /// - `2` — input failure (file not found, parse error, store unreachable).
    /// - `1` — logical failure (empty query result, store operation failure).
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound { .. }
            | Self::InvalidInput { .. }
            | Self::IoError { .. }
            | Self::StoreUnavailable { .. } => 2,

            Self::EmptyComponent { .. } | Self::StoreOperationFailed { .. } => 1,
        }
    }

    /// Returns a human-readable error message suitable for printing to stderr.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::FileNotFound { path } => {
                format!("error: file not found: {}", path.display())
            }
            Self::InvalidInput { detail } => format!("error: invalid input: {detail}"),
            Self::IoError { source, detail } => {
                format!("error: I/O error reading {source}: {detail}")
            }
            Self::StoreUnavailable { detail } => {
                format!("error: could not open store: {detail}")
            }
            Self::EmptyComponent { selector } => {
                format!("error: no component found for selector {selector:?}")
            }
            Self::StoreOperationFailed { detail } => {
                format!("error: store operation failed: {detail}")
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for CliError {}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Transient(_) => Self::StoreUnavailable {
                detail: e.to_string(),
            },
            StoreError::Corrupt(_) | StoreError::NotFound => Self::StoreOperationFailed {
                detail: e.to_string(),
            },
        }
    }
}

impl From<IngestError> for CliError {
    fn from(e: IngestError) -> Self {
        match e {
            IngestError::Store(store_err) => store_err.into(),
            IngestError::NotInSession => Self::StoreOperationFailed {
                detail: e.to_string(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
