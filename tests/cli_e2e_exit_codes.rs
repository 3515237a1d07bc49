//! End-to-end tests for CLI exit codes.
//!
//! - Exit code 0: Success
//! - Exit code 1: General error
//! - Exit code 2: Invalid command-line usage (handled by clap)

#[allow(dead_code)]
mod common;
use common::prelude::*;

/// Exit code 0 is returned for --help.
#[test]
fn test_exit_code_help() {
    let mut cmd = cargo_bin_cmd!("ingest-modularize");

    cmd.arg("--help")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("find-files"))
        .stdout(predicate::str::contains("migrate-koza"));
}

/// Exit code 0 is returned for --version.
#[test]
fn test_exit_code_version() {
    let mut cmd = cargo_bin_cmd!("ingest-modularize");

    cmd.arg("--version")
        .assert()
        .code(0)
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

/// Exit code 2 is returned for an unknown subcommand.
#[test]
fn test_exit_code_unknown_subcommand() {
    let mut cmd = cargo_bin_cmd!("ingest-modularize");

    cmd.arg("extract").assert().code(2);
}

/// Exit code 2 is returned when a required tag is missing.
#[test]
fn test_exit_code_missing_tag() {
    let fixture = TestFixture::new();

    fixture
        .command()
        .arg("create-history")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("<TAG>"));
}

/// Exit code 1 is returned for an explicitly named settings file that
/// does not exist.
#[test]
fn test_exit_code_config_not_found() {
    let fixture = TestFixture::new();

    fixture
        .command()
        .arg("clean")
        .arg("hpoa")
        .arg("--config")
        .arg("missing.yaml")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration file not found"))
        .stderr(predicate::str::contains("hint:"));
}

/// Exit code 1 is returned for a settings file with an unknown key.
#[test]
fn test_exit_code_invalid_config() {
    let fixture = TestFixture::new().with_config("upstream_gti: x\n");

    fixture
        .command()
        .arg("clean")
        .arg("hpoa")
        .assert()
        .code(1)
        .stderr(predicate::str::contains(".modularize.yaml"));
}

/// Exit code 1 is returned for a tag that cannot name a directory.
#[test]
fn test_exit_code_invalid_tag() {
    let fixture = TestFixture::new();

    fixture
        .command()
        .arg("find-files")
        .arg("../hpoa")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid ingest tag"));

    fixture.child("monarch-ingest").assert(predicate::path::missing());
}

/// Exit code 1 is returned for a misspelled log level, with a suggestion.
#[test]
fn test_exit_code_invalid_log_level() {
    let fixture = TestFixture::new();

    fixture
        .command()
        .args(["--log-level", "degub", "clean", "hpoa"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Did you mean 'debug'?"));
}
