//! Integration tests for the `flowboard` CLI binary.
//!
//! Every test isolates the environment so the user's real configuration
//! is never read or written.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

fn flowboard_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("flowboard");
    cmd.env("HOME", "/tmp/flowboard-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/flowboard-cli-test-nonexistent")
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("FLOWBOARD_CONFIG")
        .env_remove("FLOWBOARD_REMOTE__LATENCY_MS")
        .env_remove("FLOWBOARD_REMOTE__FAILURE_RATE")
        .env_remove("FLOWBOARD_REMOTE__RNG_SEED")
        .env_remove("FLOWBOARD_BOARD__SERIALIZE_PER_ITEM")
        .env_remove("FLOWBOARD_BOARD__NOTIFICATION_CAPACITY");
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

fn config_arg(path: &Path) -> String {
    path.display().to_string()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = flowboard_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn test_help_lists_commands() {
    flowboard_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("demo")
            .and(predicate::str::contains("board"))
            .and(predicate::str::contains("config")),
    );
}

#[test]
fn test_version_flag() {
    flowboard_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("flowboard"));
}

#[test]
fn test_completions_bash() {
    flowboard_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Board ───────────────────────────────────────────────────────────

#[test]
fn test_board_table_shows_seed() {
    flowboard_cmd().arg("board").assert().success().stdout(
        predicate::str::contains("Draft project brief")
            .and(predicate::str::contains("In Progress"))
            .and(predicate::str::contains("Kickoff meeting")),
    );
}

#[test]
fn test_board_json_has_three_items_and_no_session() {
    let output = flowboard_cmd().args(["board", "-o", "json"]).output().unwrap();
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["items"].as_array().unwrap().len(), 3);
    assert!(json["session"].is_null());
}

// ── Demo ────────────────────────────────────────────────────────────

#[test]
fn test_demo_without_failures_applies_every_mutation() {
    let output = flowboard_cmd()
        .args(["demo", "--latency-ms", "0", "--failure-rate", "0", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let json = stdout_json(&output);
    let notes = json["notifications"].as_array().unwrap();
    assert_eq!(notes.len(), 5);
    assert!(notes.iter().all(|n| n["kind"] == "success"));

    let items = json["board"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 4);
    assert!(items.iter().any(|i| i["title"] == "Set up CI pipeline"));
    assert!(items.iter().all(|i| i["id"] != "3"));
    assert_eq!(json["board"]["session"]["identity"], "demo");
}

#[test]
fn test_demo_with_certain_failure_keeps_seed() {
    let output = flowboard_cmd()
        .args(["demo", "--latency-ms", "0", "--failure-rate", "1", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let json = stdout_json(&output);
    let notes = json["notifications"].as_array().unwrap();
    assert_eq!(notes.len(), 5);
    assert!(notes.iter().all(|n| n["kind"] == "failure"));

    let ids: Vec<&str> = json["board"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["1", "2", "3"]);
}

#[test]
fn test_demo_table_prints_notifications() {
    flowboard_cmd()
        .args(["demo", "--latency-ms", "0", "--failure-rate", "0"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Created \"Write release notes\"")
                .and(predicate::str::contains("Renamed \"Set up repository\"")),
        );
}

#[test]
fn test_demo_rejects_out_of_range_failure_rate() {
    let output = flowboard_cmd()
        .args(["demo", "--latency-ms", "0", "--failure-rate", "2"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("failure_rate"));
}

#[test]
fn test_demo_rejects_blank_identity() {
    let output = flowboard_cmd()
        .args(["demo", "--latency-ms", "0", "--identity", "  "])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_honors_flag() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.toml");
    flowboard_cmd()
        .args(["config", "path", "--config", &config_arg(&path)])
        .assert()
        .success()
        .stdout(predicate::str::contains("custom.toml"));
}

#[test]
fn test_config_init_then_show() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    flowboard_cmd()
        .args(["config", "init", "--config", &config_arg(&path)])
        .assert()
        .success();
    assert!(path.exists());

    let output = flowboard_cmd()
        .args(["config", "show", "-o", "json", "--config", &config_arg(&path)])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["remote"]["latency_ms"], 1500);
    assert_eq!(json["board"]["serialize_per_item"], true);
}

#[test]
fn test_config_init_refuses_to_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[remote]\nlatency_ms = 5\n").unwrap();

    let output = flowboard_cmd()
        .args(["config", "init", "--config", &config_arg(&path)])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(6));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "[remote]\nlatency_ms = 5\n");
}

#[test]
fn test_env_overrides_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[remote]\nlatency_ms = 5\nfailure_rate = 0.5\n").unwrap();

    let output = flowboard_cmd()
        .env("FLOWBOARD_REMOTE__LATENCY_MS", "42")
        .args(["config", "show", "-o", "json", "--config", &config_arg(&path)])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    let json = stdout_json(&output);
    assert_eq!(json["remote"]["latency_ms"], 42);
    assert_eq!(json["remote"]["failure_rate"], 0.5);
}

#[test]
fn test_malformed_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[remote\nlatency_ms = ").unwrap();

    let output = flowboard_cmd()
        .args(["board", "--config", &config_arg(&path)])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
}
