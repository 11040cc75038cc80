//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary with HOME pointed at a temporary directory
//! and verify outputs.

use std::process::Command;

use tempfile::TempDir;

/// Run a CLI command offline against an isolated data directory.
fn run_cli(home: &TempDir, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_innerbloom"))
        .arg("--offline")
        .args(args)
        .env("HOME", home.path())
        .env_remove("INNERBLOOM_ENV")
        .env_remove("GEMINI_API_KEY")
        .output()
        .expect("Failed to execute CLI command");

    let code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    (code, stdout, stderr)
}

fn json(stdout: &str) -> serde_json::Value {
    serde_json::from_str(stdout).expect("Failed to parse JSON output")
}

const CHECKIN: &[&str] = &[
    "checkin",
    "--mood",
    "4",
    "--energy",
    "3",
    "--sleep",
    "5",
    "--gratitude",
    "tea",
    "rain",
    "music",
];

#[test]
fn test_checkin_then_status() {
    let home = TempDir::new().unwrap();
    let output = run_cli(&home, CHECKIN);
    assert_eq!(output.0, 0, "checkin failed: {}", output.2);
    let result = json(&output.1);
    assert_eq!(result["reward"]["streak"], 1);
    assert_eq!(result["reward"]["points_awarded"], 10);

    let output = run_cli(&home, &["status"]);
    assert_eq!(output.0, 0);
    let status = json(&output.1);
    assert_eq!(status["streak"], 1);
    assert_eq!(status["points"], 10);
    assert_eq!(status["sync"]["online"], false);
}

#[test]
fn test_second_checkin_same_day_fails() {
    let home = TempDir::new().unwrap();
    assert_eq!(run_cli(&home, CHECKIN).0, 0);
    let output = run_cli(&home, CHECKIN);
    assert_ne!(output.0, 0);
    assert!(output.2.contains("Already checked in today"));
}

#[test]
fn test_checkin_rejects_out_of_range_mood() {
    let home = TempDir::new().unwrap();
    let mut args = CHECKIN.to_vec();
    args[2] = "9";
    assert_ne!(run_cli(&home, &args).0, 0);
}

#[test]
fn test_offline_journal_entry_is_queued() {
    let home = TempDir::new().unwrap();
    let output = run_cli(&home, &["journal", "add", "A calm afternoon."]);
    assert_eq!(output.0, 0, "journal add failed: {}", output.2);
    let written = json(&output.1);
    assert_eq!(written["entry"]["synced"], false);
    assert_eq!(written["reflection"]["status"], "pending");
    assert_eq!(written["unlocks"]["unlocked"][0], "first_entry");

    let output = run_cli(&home, &["journal", "list", "--pending"]);
    assert_eq!(output.0, 0);
    assert_eq!(json(&output.1).as_array().unwrap().len(), 1);

    let output = run_cli(&home, &["journal", "sync"]);
    assert_eq!(output.0, 0);
    assert_eq!(json(&output.1)["status"], "offline");
}

#[test]
fn test_journey_lifecycle() {
    let home = TempDir::new().unwrap();
    let output = run_cli(&home, &["journey", "start", "gratitude_7_day"]);
    assert_eq!(output.0, 0, "journey start failed: {}", output.2);
    assert_eq!(json(&output.1)["id"], "d1");

    let output = run_cli(&home, &["journey", "start", "gratitude_7_day"]);
    assert_ne!(output.0, 0);

    let output = run_cli(&home, &["journey", "step"]);
    assert_eq!(output.0, 0);
    assert_eq!(json(&output.1)["status"], "advanced");

    let output = run_cli(&home, &["journey", "status"]);
    assert_eq!(json(&output.1)["step"], 2);
}

#[test]
fn test_unknown_journey_fails() {
    let home = TempDir::new().unwrap();
    let output = run_cli(&home, &["journey", "start", "nope"]);
    assert_ne!(output.0, 0);
    assert!(output.2.contains("nope"));
}

#[test]
fn test_layout_set() {
    let home = TempDir::new().unwrap();
    let output = run_cli(&home, &["layout", "set", "insight", "stats"]);
    assert_eq!(output.0, 0);
    assert_eq!(json(&output.1), serde_json::json!(["insight", "stats"]));
    assert_ne!(run_cli(&home, &["layout", "set", "garden"]).0, 0);
}

#[test]
fn test_insight_not_due_for_new_user() {
    let home = TempDir::new().unwrap();
    let output = run_cli(&home, &["insight"]);
    assert_eq!(output.0, 0);
    assert_eq!(json(&output.1)["outcome"]["status"], "not_due");
}

#[test]
fn test_config_get_set() {
    let home = TempDir::new().unwrap();
    let output = run_cli(&home, &["config", "get", "rewards.check_in_points"]);
    assert_eq!(output.0, 0);
    assert_eq!(output.1.trim(), "10");

    assert_eq!(run_cli(&home, &["config", "set", "rewards.check_in_points", "15"]).0, 0);
    assert_eq!(run_cli(&home, CHECKIN).0, 0);
    let status = json(&run_cli(&home, &["status"]).1);
    assert_eq!(status["points"], 15);

    assert_ne!(run_cli(&home, &["config", "get", "missing.key"]).0, 0);
}

#[test]
fn test_achievements_list() {
    let home = TempDir::new().unwrap();
    let output = run_cli(&home, &["achievements"]);
    assert_eq!(output.0, 0);
    let list = json(&output.1);
    assert_eq!(list.as_array().unwrap().len(), 4);
    assert!(list.as_array().unwrap().iter().all(|a| a["unlocked"] == false));
}
