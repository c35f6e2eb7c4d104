//! Smoke tests for the sondear CLI
//!
//! These cover argument handling and the list command; actually driving a
//! browser needs a chromium install and a live target, which the scenario
//! runner's own tests cover with a mock session instead.

#![allow(deprecated)] // Allow deprecated Command::cargo_bin until assert_cmd is updated
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a command for the sondear binary
fn sondear() -> Command {
    Command::cargo_bin("sondear").expect("sondear binary should exist")
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    sondear()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_version_propagates_to_subcommands() {
    sondear()
        .args(["run", "--version"])
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_flag() {
    sondear()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("list"));
}

#[test]
fn test_no_args_shows_help() {
    // Running with no args should error gracefully
    sondear().assert().failure(); // Requires a subcommand
}

// ============================================================================
// Subcommand Help Tests
// ============================================================================

#[test]
fn test_run_subcommand_help() {
    sondear()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--base-url"))
        .stdout(predicate::str::contains("--format"))
        .stdout(predicate::str::contains("--headed"))
        .stdout(predicate::str::contains("--output"));
}

#[test]
fn test_run_help_names_env_vars() {
    sondear()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("SONDA_BASE_URL"))
        .stdout(predicate::str::contains("CHROMIUM_PATH"));
}

#[test]
fn test_list_subcommand_help() {
    sondear()
        .args(["list", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("List"));
}

// ============================================================================
// List Command
// ============================================================================

#[test]
fn test_list_names_every_scenario() {
    sondear()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("smoke"))
        .stdout(predicate::str::contains("github-integration"))
        .stdout(predicate::str::contains("pwa"));
}

#[test]
fn test_list_shows_step_counts() {
    sondear()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("steps"))
        .stdout(predicate::str::contains("preconditions"));
}

#[test]
fn test_list_quiet() {
    sondear().args(["-q", "list"]).assert().success();
}

// ============================================================================
// Run Argument Validation
// ============================================================================

#[test]
fn test_unknown_scenario_is_rejected() {
    sondear()
        .args(["run", "bogus"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown scenario"))
        .stderr(predicate::str::contains("smoke"));
}

#[test]
fn test_unknown_scenario_writes_nothing() {
    let temp = TempDir::new().expect("create temp dir");
    let out = temp.path().join("reports");

    sondear()
        .args(["run", "bogus", "--output", out.to_str().unwrap()])
        .assert()
        .failure();

    // Argument validation happens before any directory is created
    assert!(!out.exists());
}

#[test]
fn test_invalid_format_is_rejected() {
    sondear()
        .args(["run", "--format", "yaml"])
        .assert()
        .failure();
}

// ============================================================================
// Verbosity Flags
// ============================================================================

#[test]
fn test_verbose_flag() {
    sondear().args(["-v", "--help"]).assert().success();
}

#[test]
fn test_quiet_flag() {
    sondear().args(["-q", "--help"]).assert().success();
}

// ============================================================================
// Error Handling
// ============================================================================

#[test]
fn test_invalid_subcommand() {
    sondear()
        .arg("notacommand")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_invalid_flag() {
    sondear().arg("--notaflag").assert().failure();
}
