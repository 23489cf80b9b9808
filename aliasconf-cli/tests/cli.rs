//! Integration tests for the aliasconf CLI.
//!
//! These tests verify that the CLI binary behaves correctly, including
//! argument parsing, help text, and version output.

use assert_cmd::Command;
use predicates::prelude::*;

fn aliasconf() -> Command {
    let mut cmd = Command::cargo_bin("aliasconf").expect("Failed to find aliasconf binary");
    cmd.env_remove("ALIASCONF_CONFIG");
    cmd
}

/// Test that the binary run without arguments fails and shows usage.
#[test]
fn test_cli_no_arguments() {
    aliasconf()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

/// Test that the --version flag displays version information.
#[test]
fn test_cli_version_flag() {
    aliasconf()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("aliasconf"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

/// Test that the --help flag lists every subcommand.
#[test]
fn test_cli_help_flag() {
    let assert = aliasconf().arg("--help").assert().success();
    let output = assert.get_output();
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stdout.contains("Query configuration files through key aliases"));
    for command in ["get", "has", "all", "dump", "aliases", "format", "completions"] {
        assert!(stdout.contains(command), "help is missing '{command}'");
    }
}

/// Test that subcommand help documents its options.
#[test]
fn test_get_help() {
    aliasconf()
        .args(["get", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--type"))
        .stdout(predicate::str::contains("--default"))
        .stdout(predicate::str::contains("--show-path"));
}

/// Test that an unknown subcommand is rejected by clap.
#[test]
fn test_unknown_subcommand() {
    aliasconf()
        .arg("frobnicate")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

/// Test shell completion generation.
#[test]
fn test_completions_bash() {
    aliasconf()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("aliasconf"));
}
