//! Integration tests for `cfdeploy config` command.
//!
//! All filesystem-touching tests set `CFDEPLOY_CONFIG` to a temp path so they
//! never read or write `~/.cfdeploy/config.yaml`.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn cfdeploy() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("cfdeploy"));
    cmd.env("NO_COLOR", "1").env_remove("CFDEPLOY_TOKEN");
    cmd
}

/// Returns a `TempDir` and the path string for a config file inside it.
fn temp_config_path() -> (TempDir, String) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir
        .path()
        .join("config.yaml")
        .to_string_lossy()
        .into_owned();
    (dir, path)
}

// ---------------------------------------------------------------------------
// Subcommand registration
// ---------------------------------------------------------------------------

#[test]
fn test_config_help_shows_show_and_set_subcommands() {
    cfdeploy()
        .args(["config", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("show"))
        .stdout(predicate::str::contains("set"));
}

// ---------------------------------------------------------------------------
// `cfdeploy config show`
// ---------------------------------------------------------------------------

#[test]
fn test_config_show_no_config_file_uses_defaults() {
    let (_dir, path) = temp_config_path();
    cfdeploy()
        .args(["config", "show"])
        .env("CFDEPLOY_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("target.api:"))
        .stdout(predicate::str::contains("(not set)"))
        .stdout(predicate::str::contains("retry.staging_max_attempts:"))
        .stdout(predicate::str::contains("10"));
}

#[test]
fn test_config_show_lists_environment_variables() {
    let (_dir, path) = temp_config_path();
    cfdeploy()
        .args(["config", "show"])
        .env("CFDEPLOY_CONFIG", &path)
        .env("CFDEPLOY_TOKEN", "secret-token")
        .assert()
        .success()
        .stdout(predicate::str::contains("CFDEPLOY_TOKEN:"))
        .stdout(predicate::str::contains("(set)"))
        .stdout(predicate::str::contains("secret-token").not());
}

#[test]
fn test_config_show_json_is_a_single_document() {
    let (_dir, path) = temp_config_path();
    let assert = cfdeploy()
        .args(["--json", "config", "show"])
        .env("CFDEPLOY_CONFIG", &path)
        .assert()
        .success();
    let value: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).expect("valid JSON");
    assert_eq!(value["config"]["tracker"]["poll_interval_ms"], 200);
    assert_eq!(value["config"]["retry"]["staging_max_attempts"], 10);
    assert!(value["path"].as_str().expect("path").ends_with("config.yaml"));
}

// ---------------------------------------------------------------------------
// `cfdeploy config set`
// ---------------------------------------------------------------------------

#[test]
fn test_config_set_persists_value() {
    let (_dir, path) = temp_config_path();
    cfdeploy()
        .args(["config", "set", "target.api", "https://api.example.com/"])
        .env("CFDEPLOY_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Set target.api"));

    let contents = std::fs::read_to_string(&path).expect("config written");
    assert!(contents.contains("https://api.example.com"), "got: {contents}");
    assert!(!contents.contains("https://api.example.com/"), "got: {contents}");

    cfdeploy()
        .args(["config", "show"])
        .env("CFDEPLOY_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("https://api.example.com"));
}

#[test]
fn test_config_set_numeric_value() {
    let (_dir, path) = temp_config_path();
    cfdeploy()
        .args(["config", "set", "tracker.max_wait_secs", "300"])
        .env("CFDEPLOY_CONFIG", &path)
        .assert()
        .success();

    let contents = std::fs::read_to_string(&path).expect("config written");
    assert!(contents.contains("max_wait_secs: 300"), "got: {contents}");
}

#[test]
fn test_config_set_unknown_key_fails() {
    let (_dir, path) = temp_config_path();
    cfdeploy()
        .args(["config", "set", "target.region", "eu"])
        .env("CFDEPLOY_CONFIG", &path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown setting: target.region"));
    assert!(!std::path::Path::new(&path).exists());
}

#[test]
fn test_config_set_invalid_value_fails() {
    let (_dir, path) = temp_config_path();
    cfdeploy()
        .args(["config", "set", "target.api", "ftp://api.example.com"])
        .env("CFDEPLOY_CONFIG", &path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid value for target.api"));
}

#[test]
fn test_config_set_zero_interval_fails() {
    let (_dir, path) = temp_config_path();
    cfdeploy()
        .args(["config", "set", "tracker.poll_interval_ms", "0"])
        .env("CFDEPLOY_CONFIG", &path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("positive integer"));
}

#[test]
fn test_config_set_json_error_object() {
    let (_dir, path) = temp_config_path();
    let assert = cfdeploy()
        .args(["--json", "config", "set", "nope", "1"])
        .env("CFDEPLOY_CONFIG", &path)
        .assert()
        .failure();
    let value: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).expect("valid JSON");
    assert_eq!(value["error"], true);
    assert_eq!(value["code"], "ERROR");
}
