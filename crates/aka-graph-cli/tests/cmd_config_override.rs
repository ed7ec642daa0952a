//! `--config` file and flag-override behavior for session-opening commands.
use std::io::Write as _;
use std::process::Command;

fn bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_aka-graph"))
}

#[test]
fn config_file_hard_selector_drives_matching() {
    let store_dir = tempfile::tempdir().expect("tempdir");

    let mut config_file = tempfile::NamedTempFile::new().expect("temp file");
    write!(config_file, r#"{{"hard_selectors": ["ssn"]}}"#).expect("write config");

    let mut records_file = tempfile::NamedTempFile::new().expect("temp file");
    write!(
        records_file,
        r#"[{{"url": "a", "ssn": ["123-45-6789"]}}, {{"url": "b", "ssn": ["123-45-6789"]}}]"#
    )
    .expect("write records");

    let status = bin()
        .args(["ingest", "--store"])
        .arg(store_dir.path())
        .args(["--file"])
        .arg(records_file.path())
        .args(["--config"])
        .arg(config_file.path())
        .status()
        .expect("run ingest");
    assert!(status.success());

    let output = bin()
        .args(["query", "--store"])
        .arg(store_dir.path())
        .args(["--config"])
        .arg(config_file.path())
        .args(["123-45-6789"])
        .output()
        .expect("run query");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains('a') && stdout.contains('b'), "stdout: {stdout}");
}

#[test]
fn cli_flag_overrides_config_file() {
    let store_dir = tempfile::tempdir().expect("tempdir");
    let mut config_file = tempfile::NamedTempFile::new().expect("temp file");
    write!(config_file, r#"{{"k": 3}}"#).expect("write config");

    // --k on the command line should win over the file's k=3; this is a
    // smoke test that both flags are accepted together without error.
    let status = bin()
        .args(["add-edge", "--store"])
        .arg(store_dir.path())
        .args(["--config"])
        .arg(config_file.path())
        .args(["--k", "2"])
        .args(["--ids", "a,b", "--strength", "1.0"])
        .status()
        .expect("run add-edge");
    assert!(status.success());
}
