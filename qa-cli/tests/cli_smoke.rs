//! Binary-level smoke tests, driven through the compiled `qa` binary via
//! `Command::new(env!("CARGO_BIN_EXE_qa"))`.

use std::process::Command;

fn run_qa(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_qa"))
        .args(args)
        .output()
        .expect("failed to run qa binary")
}

#[test]
fn cli_help_succeeds() {
    let out = run_qa(&["--help"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("run"));
    assert!(stdout.contains("serve"));
    assert!(stdout.contains("state"));
}

#[test]
fn state_on_missing_file_fails() {
    let out = run_qa(&["state", "/nonexistent/team-state-that-does-not-exist.json"]);
    assert!(!out.status.success());
}

#[test]
fn state_prints_sanitized_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("team.json");
    let mut state = qa_core::model::TeamState::default();
    state.settings.parallelism = 9999;
    std::fs::write(&path, serde_json::to_string(&state).unwrap()).unwrap();

    let out = run_qa(&["state", path.to_str().unwrap()]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    let value: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert!(value["settings"]["parallelism"].as_u64().unwrap() <= 250);
}
