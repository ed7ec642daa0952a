/// File reading and JSON parsing helpers.
///
/// This module is the single entry point for filesystem I/O in the
/// `aka-graph` binary. `aka-graph-core` never touches the filesystem; all
/// reading happens here, with errors mapped to exit-code-2 [`CliError`]
/// variants.
use std::path::Path;

use aka_graph_core::{GraphConfig, Record};

use crate::config::ConfigOverrides;
use crate::error::CliError;

/// Reads a disk file into a `String`, mapping I/O errors to [`CliError`].
pub fn read_file(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => CliError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => CliError::IoError {
            source: path.display().to_string(),
            detail: e.to_string(),
        },
    })
}

/// Reads and parses a JSON array of records (the ingest file format:
/// `[{"url": "...", "field": ["value", ...], ...}, ...]`).
pub fn read_records(path: &Path) -> Result<Vec<Record>, CliError> {
    let contents = read_file(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::InvalidInput {
        detail: format!("{} is not a JSON array of records: {e}", path.display()),
    })
}

/// Reads and parses a `--config` override file, applying it on top of
/// [`GraphConfig::default`]. CLI flags layered on afterwards by the caller
/// take precedence over file values.
pub fn read_config_overrides(path: &Path) -> Result<GraphConfig, CliError> {
    let contents = read_file(path)?;
    let overrides: ConfigOverrides = serde_json::from_str(&contents).map_err(|e| CliError::InvalidInput {
        detail: format!("{} is not a valid config file: {e}", path.display()),
    })?;
    Ok(overrides.apply(GraphConfig::default()))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use std::io::Write as _;

    use super::*;

    #[test]
    fn read_file_missing_is_file_not_found() {
        let err = read_file(Path::new("/no/such/file/ever.json")).expect_err("should fail");
        assert!(matches!(err, CliError::FileNotFound { .. }));
    }

    #[test]
    fn read_records_parses_array() {
        let mut f = tempfile::NamedTempFile::new().expect("temp file");
        write!(f, r#"[{{"url": "a", "email": ["a@example.com"]}}]"#).expect("write");
        let records = read_records(f.path()).expect("parse");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].url, "a");
        assert_eq!(records[0].values("email"), ["a@example.com"]);
    }

    #[test]
    fn read_records_rejects_non_array() {
        let mut f = tempfile::NamedTempFile::new().expect("temp file");
        write!(f, r#"{{"url": "a"}}"#).expect("write");
        let err = read_records(f.path()).expect_err("should fail");
        assert!(matches!(err, CliError::InvalidInput { .. }));
    }

    #[test]
    fn read_config_overrides_applies_k() {
        let mut f = tempfile::NamedTempFile::new().expect("temp file");
        write!(f, r#"{{"k": 5}}"#).expect("write");
        let config = read_config_overrides(f.path()).expect("parse");
        assert_eq!(config.k, 5);
    }
}
