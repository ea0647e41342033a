//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run against the dev data directory
//! and verify outputs.

use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "dojotrack-cli", "--quiet", "--"])
        .args(args)
        .env("DOJOTRACK_ENV", "dev")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_help() {
    let (_, _, code) = run_cli(&["--help"]);
    assert_eq!(code, 0, "help failed");
}

#[test]
fn test_config_get_cooldown() {
    let (stdout, _, code) = run_cli(&["config", "get", "checkin.cooldown_hours"]);
    assert_eq!(code, 0, "config get failed");
    assert_eq!(stdout.trim(), "6");
}

#[test]
fn test_config_get_unknown_key_fails() {
    let (_, stderr, code) = run_cli(&["config", "get", "checkin.nope"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown config key"));
}

#[test]
fn test_stats_all() {
    let (stdout, _, code) = run_cli(&["stats", "all"]);
    assert_eq!(code, 0, "stats all failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(parsed["total_check_ins"].is_u64());
}

#[test]
fn test_member_add_and_cooldown_rejects_second_checkin() {
    let (stdout, _, code) = run_cli(&["member", "add", "E2E Member"]);
    assert_eq!(code, 0, "member add failed");
    let member: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(member["belt"], "white");
    let id = member["id"].as_str().unwrap().to_string();

    let (_, _, code) = run_cli(&["checkin", &id]);
    assert_eq!(code, 0, "first checkin failed");

    // Immediately again: the cooldown gate must reject.
    let (_, stderr, code) = run_cli(&["checkin", &id]);
    assert_eq!(code, 1);
    assert!(stderr.contains("cooldown active"));

    let (stdout, _, code) = run_cli(&["member", "progress", &id]);
    assert_eq!(code, 0, "member progress failed");
    let progress: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(progress["within_tier"], 1);
    assert_eq!(progress["tier"], 1);
}
