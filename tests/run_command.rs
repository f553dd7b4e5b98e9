//! Integration tests for the `bucketwise` binary.
//!
//! These run command blocks end to end through the binary: parsing,
//! ledger mutation, result rendering, JSON export and settings layering.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get a Command instance for the bucketwise binary
#[allow(deprecated)]
fn bucketwise_cmd() -> Command {
    let mut cmd = Command::cargo_bin("bucketwise").expect("Failed to find bucketwise binary");
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_invalid_line_does_not_abort_block() {
    bucketwise_cmd()
        .args(["run", "--no-color"])
        .write_stdin("FOO BAR\nADD_BUCKET x 10\n")
        .assert()
        .success()
        .stdout("❌ Invalid command: FOO BAR\n✅ Added bucket 'x' with 10% allocation\n");
}

#[test]
fn test_overflowing_add_is_rejected() {
    bucketwise_cmd()
        .args(["run", "--no-color", "--status"])
        .write_stdin("ADD_BUCKET rent 50\nADD_BUCKET food 60\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("✅ Added bucket 'rent' with 50% allocation"))
        .stdout(predicate::str::contains("❌ Failed to add bucket 'food' - would exceed 100% total"))
        .stdout(predicate::str::contains("Total percentage: 50.00%"));
}

#[test]
fn test_run_from_file_with_budget() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let script = temp_dir.path().join("plan.txt");
    fs::write(
        &script,
        "ADD_BUCKET food 10\nNO_ACTION\n\nADD_AMOUNT food 100\nADD_AMOUNT savings 50\n",
    )
    .expect("Failed to write script");

    bucketwise_cmd()
        .args(["run", "--no-color", "--budget", "2000"])
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::contains("✅ Added $100.00 to bucket 'food' (now 15.00%)"))
        .stdout(predicate::str::contains(
            "✅ Created bucket 'savings' at 0.00% and added $50.00",
        ))
        .stdout(predicate::str::contains("NO_ACTION").not());
}

#[test]
fn test_json_output() {
    let output = bucketwise_cmd()
        .args(["run", "--json", "--budget", "1000"])
        .write_stdin("ADD_BUCKET rent 40\nADD_BUCKET food 10\nAUTO_RESIZE_TO_100\n")
        .output()
        .expect("Failed to run bucketwise");

    assert!(output.status.success());
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");

    assert_eq!(json["report"]["outcomes"].as_array().map(Vec::len), Some(3));
    let status = &json["session"]["status"];
    assert_eq!(status["is_fully_allocated"], true);
    assert_eq!(status["buckets"][0]["name"], "rent");
    assert_eq!(status["buckets"][0]["percentage"], 40.0);
    let food_amount = status["buckets"][1]["amount"].as_f64().unwrap_or_default();
    assert!((food_amount - 600.0).abs() < 1e-6);
}

#[test]
fn test_failures_do_not_change_exit_code() {
    bucketwise_cmd()
        .args(["run", "--no-color"])
        .write_stdin("REMOVE_BUCKET ghost\nRESIZE_BUCKET food lots\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("❌ Failed to remove bucket 'ghost'"))
        .stdout(predicate::str::contains("❌ Invalid argument"));
}

#[test]
fn test_config_file_seeds_budget() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = temp_dir.path().join("config.toml");
    fs::write(&config, "color = false\n\n[ledger]\ntotal_budget = 500.0\n")
        .expect("Failed to write config");

    bucketwise_cmd()
        .arg("--config")
        .arg(&config)
        .arg("run")
        .write_stdin("ADD_BUCKET fun 10\nREBALANCE\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("✅ Rebalanced 1 buckets against $500.00"));
}

#[test]
fn test_config_command_applies_env_overrides() {
    bucketwise_cmd()
        .arg("config")
        .env("BUCKETWISE_LEDGER__TOTAL_BUDGET", "2500")
        .env("BUCKETWISE_LOG_LEVEL", "error")
        .assert()
        .success()
        .stdout(predicate::str::contains("[ledger]"))
        .stdout(predicate::str::contains("total_budget = 2500.0"))
        .stdout(predicate::str::contains("log_level = \"error\""));
}

#[test]
fn test_missing_config_file_fails() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    bucketwise_cmd()
        .arg("--config")
        .arg(temp_dir.path().join("nope.toml"))
        .arg("config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}
