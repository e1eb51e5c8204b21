//! End-to-end tests for the unnest binary.

use std::fs;
use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

fn run_unnest(args: &[&str]) -> (String, String, bool) {
    let output = Command::new(env!("CARGO_BIN_EXE_unnest"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run unnest");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

fn add_file(root: &Path, rel: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, rel).unwrap();
}

#[test]
fn test_no_arguments_prints_usage() {
    let (stdout, _stderr, success) = run_unnest(&[]);
    assert!(success, "usage errors still exit 0");
    assert_eq!(stdout.trim(), "usage: unnest <dir>");
}

#[test]
fn test_two_arguments_prints_usage() {
    let (stdout, _stderr, success) = run_unnest(&["one", "two"]);
    assert!(success);
    assert!(stdout.starts_with("usage: unnest <dir>"));
}

#[test]
fn test_missing_directory() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("missing");
    let missing = missing.to_str().unwrap();

    let (stdout, _stderr, success) = run_unnest(&[missing]);
    assert!(success);
    assert_eq!(stdout.trim(), format!("Directory not found: {missing}"));
}

#[test]
fn test_flattens_and_prunes() {
    let temp = TempDir::new().unwrap();
    add_file(temp.path(), "a/b/c/x.txt");
    fs::create_dir_all(temp.path().join("empty/inner")).unwrap();

    let root = temp.path().to_str().unwrap();
    let (stdout, _stderr, success) = run_unnest(&[root, "--settle-ms", "0"]);

    assert!(success);
    assert!(stdout.contains("Flattening directories..."), "{stdout}");
    assert!(stdout.contains("Deleting empty directories..."), "{stdout}");
    assert!(temp.path().join("a/x.txt").is_file());
    assert!(!temp.path().join("a/b").exists());
    assert!(!temp.path().join("empty").exists());
}

#[test]
fn test_conflict_reports_and_exits_zero() {
    let temp = TempDir::new().unwrap();
    add_file(temp.path(), "proj/src/v1/src/lib.rs");
    add_file(temp.path(), "proj/src/v1/README");

    let root = temp.path().to_str().unwrap();
    let (stdout, _stderr, success) = run_unnest(&[root, "--settle-ms", "0"]);

    assert!(success);
    assert!(stdout.lines().last().unwrap().contains("already exists"), "{stdout}");
    // Nothing was pruned after the failure
    assert!(temp.path().join("proj/src/v1/src/lib.rs").is_file());
}

#[test]
fn test_json_format() {
    let temp = TempDir::new().unwrap();
    add_file(temp.path(), "a/b/x.txt");

    let root = temp.path().to_str().unwrap();
    let (stdout, _stderr, success) = run_unnest(&[root, "--settle-ms", "0", "--format", "json"]);

    assert!(success);
    for line in stdout.lines() {
        assert!(line.starts_with('{') && line.ends_with('}'), "not JSON: {line}");
    }
    assert!(stdout.contains("\"event\":\"finished\""));
}
