//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own scratch data directory.

use std::process::Command;

use serde_json::Value;
use tempfile::TempDir;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(dir: &TempDir, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_sunguard"))
        .args(args)
        .env("SUNGUARD_DATA_DIR", dir.path())
        .env_remove("SUNGUARD_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_json(dir: &TempDir, args: &[&str]) -> Value {
    let (stdout, stderr, code) = run_cli(dir, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    serde_json::from_str(&stdout).expect("Failed to parse JSON output")
}

#[test]
fn burn_without_profile_uses_default_type() {
    let dir = TempDir::new().unwrap();
    let out = run_json(&dir, &["burn", "--uv", "6", "--at", "2026-07-01T12:00:00Z"]);
    assert_eq!(out["skin_type"], "iii");
    assert_eq!(out["defaulted_profile"], true);
    assert_eq!(out["warning_level"], "warning");
}

#[test]
fn burn_with_unknown_uv_reports_unknown() {
    let dir = TempDir::new().unwrap();
    let out = run_json(&dir, &["burn"]);
    assert_eq!(out["minutes_to_burn"], "unknown");
    assert!(out["warning_level"].is_null());
}

#[test]
fn profile_set_then_show() {
    let dir = TempDir::new().unwrap();
    run_json(&dir, &["profile", "set", "II"]);
    let out = run_json(&dir, &["profile", "show"]);
    assert_eq!(out["profile"]["skin_type"], "ii");

    let (_, stderr, code) = run_cli(&dir, &["profile", "set", "7"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("skin type"));
}

#[test]
fn sunscreen_apply_schedules_reminder_and_status_counts_down() {
    let dir = TempDir::new().unwrap();
    let out = run_json(
        &dir,
        &["sunscreen", "apply", "--spf", "50", "--activity", "active", "--at", "2026-07-01T10:00:00Z"],
    );
    assert_eq!(out["due_at"], "2026-07-01T11:00:00Z");
    let commands = out["decision"]["commands"].as_array().unwrap();
    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0]["command"], "schedule");

    let status = run_json(&dir, &["sunscreen", "status", "--at", "2026-07-01T10:30:00Z"]);
    assert_eq!(status["remaining_minutes"], 30);
    assert_eq!(status["needs_reapplication"], false);

    let status = run_json(&dir, &["sunscreen", "status", "--at", "2026-07-01T11:00:01Z"]);
    assert!(status["current"].is_null());
    assert_eq!(status["needs_reapplication"], true);
}

#[test]
fn reapply_cancels_previous_reminder() {
    let dir = TempDir::new().unwrap();
    run_json(&dir, &["sunscreen", "apply", "--spf", "30", "--at", "2026-07-01T09:00:00Z"]);
    let out = run_json(&dir, &["sunscreen", "reapply", "--at", "2026-07-01T10:00:00Z"]);
    let kinds: Vec<&str> = out["decision"]["commands"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["command"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["cancel", "schedule"]);

    let history = run_json(&dir, &["sunscreen", "history"]);
    assert_eq!(history.as_array().unwrap().len(), 2);
}

#[test]
fn config_change_reaches_a_persisted_engine() {
    let dir = TempDir::new().unwrap();
    run_json(&dir, &["engine", "uv", "5", "--at", "2026-07-01T09:00:00Z"]);
    let (_, _, code) = run_cli(&dir, &["config", "set", "sunscreen.active_multiplier", "0.25"]);
    assert_eq!(code, 0);

    let out = run_json(
        &dir,
        &["sunscreen", "apply", "--spf", "30", "--activity", "active", "--at", "2026-07-01T10:00:00Z"],
    );
    assert_eq!(out["due_at"], "2026-07-01T10:30:00Z");
    assert_eq!(
        out["decision"]["commands"][0]["request"]["trigger_at"],
        "2026-07-01T10:30:00Z"
    );
}

#[test]
fn reapply_without_history_fails() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(&dir, &["sunscreen", "reapply"]);
    assert_eq!(code, 1);
    assert!(stderr.starts_with("error:"));
}

#[test]
fn leave_home_alert_fires_once_per_episode() {
    let dir = TempDir::new().unwrap();
    run_json(&dir, &["engine", "uv", "5", "--at", "2026-07-01T09:00:00Z"]);
    let out = run_json(&dir, &["engine", "exit", "--at", "2026-07-01T09:05:00Z"]);
    assert_eq!(out["decision"]["commands"][0]["command"], "deliver");
    assert_eq!(out["decision"]["commands"][0]["request"]["dedupe_key"], "leave-home:1");

    let out = run_json(&dir, &["engine", "uv", "8", "--at", "2026-07-01T09:30:00Z"]);
    assert!(out["decision"]["commands"].as_array().unwrap().is_empty());

    let status = run_json(&dir, &["engine", "status"]);
    assert_eq!(status["leave_home"]["state"], "notified");
}

#[test]
fn exit_under_low_uv_stays_quiet() {
    let dir = TempDir::new().unwrap();
    run_json(&dir, &["engine", "uv", "2", "--at", "2026-07-01T08:00:00Z"]);
    let out = run_json(&dir, &["engine", "exit", "--at", "2026-07-01T08:05:00Z"]);
    assert!(out["decision"]["commands"].as_array().unwrap().is_empty());
}

#[test]
fn forecast_reports_window() {
    let dir = TempDir::new().unwrap();
    let out = run_json(
        &dir,
        &["forecast", "--start", "2026-07-01T06:00:00Z", "--uv", "1,3,6,4,2"],
    );
    assert_eq!(out["summary"]["window"]["start"], "2026-07-01T07:00:00Z");
    assert_eq!(out["summary"]["window"]["end"], "2026-07-01T10:00:00Z");
    assert_eq!(out["summary"]["hourly"].as_array().unwrap().len(), 5);
}

#[test]
fn config_get_set_roundtrip() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(&dir, &["config", "get", "sunscreen.base_duration_min"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "120");

    let (_, _, code) = run_cli(&dir, &["config", "set", "sunscreen.base_duration_min", "90"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(&dir, &["config", "get", "sunscreen.base_duration_min"]);
    assert_eq!(stdout.trim(), "90");

    let (_, stderr, code) = run_cli(&dir, &["config", "get", "sunscreen.nope"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Unknown configuration key"));
}
