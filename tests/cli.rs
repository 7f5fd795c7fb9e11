//! Command-line behavior that needs no network access.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn suitesplit() -> Command {
    assert_cmd::cargo::cargo_bin_cmd!("suitesplit")
}

fn required_args(cmd: &mut Command) -> &mut Command {
    cmd.args([
        "--task-name",
        "jsCore",
        "--project",
        "mongodb-mongo-master",
        "--variant",
        "linux-64",
        "--fallback-num-sub-suites",
        "4",
    ])
}

#[test]
fn test_validate_with_required_flags() {
    let mut cmd = suitesplit();
    cmd.arg("validate");
    required_args(&mut cmd);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid!"))
        .stdout(predicate::str::contains("Suite: jsCore"))
        .stdout(predicate::str::contains("Target runtime: 60 min"))
        .stdout(predicate::str::contains("Max sub-suites: unlimited"));
}

#[test]
fn test_validate_missing_project() {
    suitesplit()
        .args([
            "validate",
            "--task-name",
            "jsCore",
            "--variant",
            "linux-64",
            "--fallback-num-sub-suites",
            "4",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("project"));
}

#[test]
fn test_validate_rejects_zero_fallback() {
    suitesplit()
        .args([
            "validate",
            "--task-name",
            "jsCore",
            "--project",
            "p",
            "--variant",
            "v",
            "--fallback-num-sub-suites",
            "0",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("fallback_num_sub_suites"));
}

#[test]
fn test_validate_rejects_out_of_range_window() {
    let mut cmd = suitesplit();
    cmd.arg("validate");
    required_args(&mut cmd);
    cmd.args(["--analysis-duration", "100000000"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("analysis_duration_days"));
}

#[test]
fn test_validate_rejects_bad_boolean() {
    let mut cmd = suitesplit();
    cmd.arg("validate");
    required_args(&mut cmd);
    cmd.args(["--is-patch", "sometimes"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("is_patch"));
}

#[test]
fn test_expansion_file_with_flag_override() {
    let dir = TempDir::new().unwrap();
    let expansions = dir.path().join("expansions.yml");
    fs::write(
        &expansions,
        "task: jsCore\nproject: from-file\nbuild_variant: linux-64\nfallback_num_sub_suites: 3\nsuite: core\ndepends_on: aggregation,auth\n",
    )
    .unwrap();

    suitesplit()
        .arg("validate")
        .arg("--expansion-file")
        .arg(&expansions)
        .args(["--project", "from-cli"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Project: from-cli"))
        .stdout(predicate::str::contains("Suite: core"))
        .stdout(predicate::str::contains("Fallback sub-suites: 3"))
        .stdout(predicate::str::contains("Depends on: aggregation, auth"));
}

#[test]
fn test_missing_expansion_file() {
    suitesplit()
        .args(["validate", "--expansion-file", "/nonexistent/expansions.yml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config file"));
}

#[test]
fn test_resmoke_args_accept_hyphen_values() {
    let mut cmd = suitesplit();
    cmd.arg("validate");
    required_args(&mut cmd);
    cmd.args(["--resmoke-args", "--storageEngine=wiredTiger"]);

    cmd.assert().success();
}

#[test]
fn test_plan_fails_fast_on_config_error() {
    suitesplit()
        .args(["plan", "--task-name", "jsCore"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"));
}

#[test]
fn test_plan_fails_without_credentials() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("evergreen.yml");

    let mut cmd = suitesplit();
    cmd.arg("plan");
    required_args(&mut cmd);
    cmd.arg("--evergreen-config").arg(&missing);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to set up Evergreen client"));
}
