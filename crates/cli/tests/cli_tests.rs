//! CLI integration tests

use std::process::Command;

fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new("cargo")
        .args(["run", "-q", "-p", "phq9-cli", "--"])
        .args(args)
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to execute command")
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = run_cli(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("PHQ-9"), "Should show app name");
    assert!(stdout.contains("predict"), "Should show predict command");
    assert!(stdout.contains("health"), "Should show health command");
    assert!(stdout.contains("model-info"), "Should show model-info command");
    assert!(stdout.contains("score"), "Should show score command");
    assert!(stdout.contains("bands"), "Should show bands command");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = run_cli(&["--version"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("phq9"), "Should show binary name");
}

#[test]
fn test_predict_help() {
    let output = run_cli(&["predict", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Predict help should succeed");
    assert!(stdout.contains("ANSWERS"), "Should show answers argument");
}

#[test]
fn test_api_url_option() {
    let output = run_cli(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stdout.contains("--api-url"), "Should show api-url option");
    assert!(stdout.contains("PHQ9_API_URL"), "Should show env var");
}

#[test]
fn test_score_offline() {
    let output = run_cli(&["--format", "json", "score", "2", "2", "2", "2", "2", "2", "2", "2", "2"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Offline score should succeed");
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("score emits JSON");
    assert_eq!(json["raw_score"], 18);
    assert_eq!(json["severity"], "Moderately Severe");
    assert_eq!(json["band"], serde_json::json!([15, 19]));
    assert_eq!(json["crisis_alert"], true);
    assert!(json["recommendations"][1].as_str().unwrap().contains("crisis line"));
}

#[test]
fn test_score_below_crisis_threshold() {
    // 14 is the top of Moderate
    let output = run_cli(&["--format", "json", "score", "2", "2", "2", "2", "2", "1", "1", "1", "1"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("score emits JSON");
    assert_eq!(json["raw_score"], 14);
    assert_eq!(json["crisis_alert"], false);
    assert_eq!(json["recommendations"].as_array().unwrap().len(), 2);
}

#[test]
fn test_score_rejects_out_of_range_answer() {
    let output = run_cli(&["score", "1", "4"]);

    assert!(!output.status.success(), "Answer 4 should be rejected");
}

#[test]
fn test_bands_table() {
    let output = run_cli(&["bands"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("Moderately Severe"));
    assert!(stdout.contains("20-27"));
}

/// Test invalid command handling
#[test]
fn test_invalid_command() {
    let output = run_cli(&["invalid-command"]);

    assert!(!output.status.success(), "Invalid command should fail");
}

#[test]
fn test_unreachable_service_fails() {
    let output = run_cli(&["--api-url", "http://127.0.0.1:9", "health"]);

    assert!(!output.status.success(), "Health against a closed port should fail");
}
