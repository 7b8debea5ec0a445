#![forbid(unsafe_code)]

use std::process::{Command, Output};

fn mtime(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_mtime"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

#[test]
fn format_normalises_units() {
    let output = mtime(&["format", "1500ms"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "1.5s\n");

    let output = mtime(&["format", "-p", "0", "1.6s"]);
    assert_eq!(String::from_utf8_lossy(&output.stdout), "2s\n");
}

#[test]
fn precision_from_environment() {
    let output = Command::new(env!("CARGO_BIN_EXE_mtime"))
        .args(["format", "1.26ms"])
        .env("MTIME_FORMAT__PRECISION", "1")
        .output()
        .unwrap();
    assert_eq!(String::from_utf8_lossy(&output.stdout), "1.3ms\n");
}

#[test]
fn sleep_reports_drift() {
    let output = mtime(&["sleep", "5ms"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("slept "), "{stdout}");
}

#[test]
fn negative_sleep_returns_at_once() {
    let output = mtime(&["sleep", "-5ms"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("overshot by 5"), "{stdout}");
}

#[test]
fn failing_command_exits_non_zero() {
    let output = mtime(&["measure", "false"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("exited unsuccessfully"), "{stderr}");
}

#[test]
fn bad_duration_is_a_usage_error() {
    let output = mtime(&["format", "soon"]);
    assert_eq!(output.status.code(), Some(2));
}
