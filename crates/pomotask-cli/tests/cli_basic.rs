//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own data directory.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use tempfile::TempDir;

fn cli(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_pomotask"));
    cmd.env("POMOTASK_DATA_DIR", dir).env("RUST_LOG", "off");
    cmd
}

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = cli(dir)
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

/// Drive an interactive session with `input` on stdin.
fn run_session(dir: &Path, input: &str) -> (String, i32) {
    let mut child = cli(dir)
        .arg("run")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to start session");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(input.as_bytes())
        .expect("Failed to write session input");
    let output = child.wait_with_output().expect("Session did not finish");
    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        output.status.code().unwrap_or(-1),
    )
}

fn task_list(dir: &Path) -> Vec<serde_json::Value> {
    let (stdout, _, code) = run_cli(dir, &["task", "list", "--json"]);
    assert_eq!(code, 0, "task list --json failed");
    serde_json::from_str(&stdout).expect("task list is JSON")
}

#[test]
fn test_first_run_lists_seed_tasks() {
    let dir = TempDir::new().unwrap();
    let tasks = task_list(dir.path());
    assert_eq!(tasks.len(), 4);
    assert_eq!(tasks[0]["text"], "Complete project requirements");
    assert_eq!(tasks[0]["completed"], true);
}

#[test]
fn test_task_add_and_toggle() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["task", "add", "  Buy milk  "]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Task added: 5"));

    let (_, _, code) = run_cli(dir.path(), &["task", "done", "5"]);
    assert_eq!(code, 0);

    let tasks = task_list(dir.path());
    let milk = tasks.iter().find(|t| t["id"] == 5).unwrap();
    assert_eq!(milk["text"], "Buy milk");
    assert_eq!(milk["completed"], true);
}

#[test]
fn test_blank_task_is_rejected() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["task", "add", "   "]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
    assert_eq!(task_list(dir.path()).len(), 4);
}

#[test]
fn test_unknown_task_is_an_error() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["task", "delete", "99"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Task not found: 99"));
}

#[test]
fn test_settings_set_and_show() {
    let dir = TempDir::new().unwrap();
    let (_, _, code) = run_cli(dir.path(), &["settings", "set", "--work", "20"]);
    assert_eq!(code, 0);

    let (stdout, _, code) = run_cli(dir.path(), &["settings", "show", "--json"]);
    assert_eq!(code, 0);
    let settings: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(settings["work"], 20);
    assert_eq!(settings["shortBreak"], 5);
    assert_eq!(settings["autoStart"], true);
}

#[test]
fn test_out_of_range_settings_are_rejected() {
    let dir = TempDir::new().unwrap();
    let (_, _, code) = run_cli(dir.path(), &["settings", "set", "--work", "0"]);
    assert_eq!(code, 1);

    let (stdout, _, _) = run_cli(dir.path(), &["settings", "show", "--json"]);
    let settings: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(settings["work"], 25);
}

#[test]
fn test_config_set_and_get() {
    let dir = TempDir::new().unwrap();
    let (_, _, code) = run_cli(
        dir.path(),
        &["config", "set", "timer.break_extension_minutes", "10"],
    );
    assert_eq!(code, 0);

    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "timer.break_extension_minutes"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "10");

    let (_, _, code) = run_cli(dir.path(), &["config", "get", "no.such.key"]);
    assert_eq!(code, 1);
}

#[test]
fn test_session_adds_tasks() {
    let dir = TempDir::new().unwrap();
    let (stdout, code) = run_session(dir.path(), "add Buy milk\ntasks\nquit\n");
    assert_eq!(code, 0);
    assert!(stdout.contains("Task added: 5 Buy milk"));
    assert!(stdout.contains("Tasks (1/5 completed)"));
    assert_eq!(task_list(dir.path()).len(), 5);
}

#[test]
fn test_session_controls_the_timer() {
    let dir = TempDir::new().unwrap();
    let (stdout, code) = run_session(dir.path(), "start\npause\nstatus\nquit\n");
    assert_eq!(code, 0);
    assert!(stdout.contains("Work Phase started"));
    assert!(stdout.contains("(paused)"));
}

#[test]
fn test_session_ends_at_end_of_input() {
    let dir = TempDir::new().unwrap();
    let (stdout, code) = run_session(dir.path(), "next\n");
    assert_eq!(code, 0);
    assert!(stdout.contains("Current focus: Design user interface"));
}
