//! Integration tests for the cfdeploy CLI skeleton
//!
//! These tests verify the command hierarchy and global argument parsing.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;

fn cfdeploy() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("cfdeploy"));
    cmd.env("NO_COLOR", "1");
    cmd
}

// --- Help and version tests ---

#[test]
fn test_cli_no_args_shows_help_and_exits_two() {
    cfdeploy().assert().code(2).stderr(predicate::str::contains(
        "Deploy and manage applications on a cloud-foundry controller",
    ));
}

#[test]
fn test_cli_help_flag_shows_help() {
    cfdeploy()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Commands:"));
}

#[test]
fn test_cli_version_flag_shows_version() {
    cfdeploy()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("cfdeploy 0.1.0"));
}

// --- Command hierarchy tests ---

#[test]
fn test_help_lists_every_command() {
    let assert = cfdeploy().arg("--help").assert().success();
    let out = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8");
    for command in [
        "push", "start", "stop", "restart", "scale", "urls", "delete", "status", "logs",
        "services", "routes", "ssh-code", "config",
    ] {
        assert!(out.contains(command), "help is missing {command}:\n{out}");
    }
}

#[test]
fn test_routes_help_shows_subcommands() {
    cfdeploy()
        .args(["routes", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("prune"))
        .stdout(predicate::str::contains("domains"));
}

#[test]
fn test_status_stats_conflicts_with_offline() {
    cfdeploy()
        .args(["status", "web", "--stats", "--offline"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_services_help_shows_subcommands() {
    cfdeploy()
        .args(["services", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("offerings"))
        .stdout(predicate::str::contains("create"))
        .stdout(predicate::str::contains("delete"));
}

#[test]
fn test_push_help_shows_deployment_flags() {
    cfdeploy()
        .args(["push", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--memory"))
        .stdout(predicate::str::contains("--instances"))
        .stdout(predicate::str::contains("--no-start"));
}

// --- Argument validation tests ---

#[test]
fn test_start_requires_module_id() {
    cfdeploy().arg("start").assert().code(2);
}

#[test]
fn test_push_rejects_env_without_equals() {
    cfdeploy()
        .args(["push", "web", "--env", "NOVALUE"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("KEY=VALUE"));
}

#[test]
fn test_services_delete_requires_a_name() {
    cfdeploy().args(["services", "delete"]).assert().code(2);
}

#[test]
fn test_unknown_command_exits_with_error() {
    cfdeploy()
        .arg("nonexistent")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

// --- Global flags tests ---

#[test]
fn test_global_flags_accepted_before_subcommand() {
    cfdeploy()
        .args(["--quiet", "--no-color", "-v", "-y", "config", "--help"])
        .assert()
        .success();
}
