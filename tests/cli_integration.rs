//! CLI Integration Tests
//!
//! End-to-end tests for CLI commands using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the spendguard binary for testing
fn spendguard_cmd() -> Command {
    Command::cargo_bin("spendguard").unwrap()
}

#[test]
fn test_version_output() {
    spendguard_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("spendguard"));
}

#[test]
fn test_help_shows_all_commands() {
    spendguard_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("config"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn test_serve_help() {
    spendguard_cmd()
        .args(["serve", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--config"))
        .stdout(predicate::str::contains("--port"))
        .stdout(predicate::str::contains("--no-scheduler"));
}

#[test]
fn test_config_init_then_check() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("spendguard.toml");

    spendguard_cmd()
        .args(["config", "init", "-o", config_path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration file created"));

    spendguard_cmd()
        .args(["check", "-c", config_path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Spring hiking launch"))
        .stdout(predicate::str::contains("3 campaigns"));
}

#[test]
fn test_config_init_no_overwrite() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("spendguard.toml");
    std::fs::write(&config_path, "existing content").unwrap();

    spendguard_cmd()
        .args(["config", "init", "-o", config_path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    let content = std::fs::read_to_string(&config_path).unwrap();
    assert_eq!(content, "existing content");
}

#[test]
fn test_check_json() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("spendguard.toml");
    std::fs::write(
        &config_path,
        r#"
        [[brands]]
        id = 1
        name = "Acme"
        daily_budget = 100
        monthly_budget = 1000

        [[campaigns]]
        id = 5
        brand_id = 1
        name = "Solo"
        "#,
    )
    .unwrap();

    let output = spendguard_cmd()
        .args(["check", "--json", "-c", config_path.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["campaigns"][0]["id"], 5);
    assert_eq!(parsed["campaigns"][0]["initial_state"], "inactive");
    assert_eq!(parsed["campaigns"][0]["daily_budget"], "100");
}

#[test]
fn test_check_rejects_invalid_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("spendguard.toml");
    std::fs::write(&config_path, "[scheduler]\ntick_interval_seconds = 0\n").unwrap();

    spendguard_cmd()
        .args(["check", "-c", config_path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("tick_interval_seconds"));
}

#[test]
fn test_check_missing_file() {
    spendguard_cmd()
        .args(["check", "-c", "/nonexistent/spendguard.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_completions_bash() {
    spendguard_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("spendguard"));
}
