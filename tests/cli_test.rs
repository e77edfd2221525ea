//! CLI Interface Tests
//!
//! Runs the rusty-txf binary against extracted-text fixtures, so no
//! pdftotext install is needed.

use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::tempdir;

fn binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_rusty-txf"))
}

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn test_converts_and_prints_totals() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("out.txf");

    let result = binary()
        .arg(fixture("checkbox_statement.txt"))
        .arg(&output)
        .args(["--date", "02/14/2021"])
        .output()
        .unwrap();

    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains("TXF file written to"));
    assert!(stdout.contains("Category: Box B Checked (2 records)"));
    assert!(stdout.contains("Total Proceeds (Box 1d):                     $30146.91"));
    assert!(stdout.contains("Category: Box E Checked (2 records)"));

    let written = std::fs::read_to_string(&output).unwrap();
    assert!(written.starts_with("V042\nASelf\nD02/14/2021\n^\n"));
    assert_eq!(written.matches("\n^\n").count(), 5);
}

#[test]
fn test_usage_error_without_arguments() {
    let result = binary().output().unwrap();
    assert!(!result.status.success());
}

#[test]
fn test_rejects_non_txf_output() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("out.csv");

    let result = binary()
        .arg(fixture("checkbox_statement.txt"))
        .arg(&output)
        .output()
        .unwrap();

    assert_eq!(result.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&result.stderr).contains("unexpected output file format"));
    assert!(!output.exists());
}

#[test]
fn test_parse_failure_writes_nothing() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("statement.txt");
    std::fs::write(
        &input,
        "02079K107\n2 SHARES OF GOOG\n01/27/2020 2,933.94 2,933.42 X\n02/06/2020 GROSS\nBox B checked\n",
    )
    .unwrap();
    let output = dir.path().join("out.txf");

    let result = binary()
        .arg(&input)
        .arg(&output)
        .args(["--layout", "checkbox"])
        .output()
        .unwrap();

    assert_eq!(result.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("Form 8949 checkbox"), "{stderr}");
    assert!(!output.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_config_file_sets_account() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "account = \"Trust\"\n").unwrap();
    let output = dir.path().join("out.txf");

    let result = binary()
        .arg(fixture("self_contained_statement.txt"))
        .arg(&output)
        .arg("--config")
        .arg(&config)
        .output()
        .unwrap();

    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));
    let written = std::fs::read_to_string(&output).unwrap();
    assert!(written.starts_with("V042\nATrust\n"));
    assert!(written.contains("N715\nC1\nL1\n"));
}
