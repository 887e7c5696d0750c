#![cfg(feature = "cli")]

use std::process::{Command, Output};

use serde_json::Value;

fn mfchar(args: &[&str]) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_mfchar"));
    cmd.env_remove("MFCHAR_DEVICE")
        .env_remove("MFCHAR_BUFFER_MODE")
        .env_remove("MFCHAR_MAX_HANDLES")
        .arg("--log-level")
        .arg("error")
        .args(args);
    cmd
}

fn run(args: &[&str]) -> Output {
    mfchar(args).output().expect("mfchar should run")
}

fn json_of(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

#[test]
fn probe_opens_and_closes() {
    let output = run(&["--format", "json", "probe"]);
    assert!(output.status.success());

    let out = json_of(&output);
    assert_eq!(out["path"], "/dev/mfchar");
    assert_eq!(out["devnum"], "254:0");
    assert_eq!(out["opened"], true);
    assert_eq!(out["closed"], true);
}

#[test]
fn probe_pretty_prints_greeting_lines() {
    let output = run(&["--format", "pretty", "probe"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Device successfully opened."));
    assert!(stdout.contains("Device closed."));
}

#[test]
fn exchange_round_trips_default_greeting() {
    let output = run(&["--format", "json", "exchange"]);
    assert!(output.status.success());

    let out = json_of(&output);
    assert_eq!(out["requested"], 13);
    assert_eq!(out["accepted"], 13);
    assert_eq!(out["truncated"], false);
    assert_eq!(out["delivered"], 13);
    assert_eq!(out["payload"], "Hello Kernel!");
    assert_eq!(out["second_read"], 0);
}

#[test]
fn exchange_truncates_oversized_payload_and_short_reads() {
    let data = "z".repeat(200);
    let output = run(&[
        "--format",
        "json",
        "exchange",
        "--data",
        &data,
        "--read-size",
        "50",
    ]);
    assert!(output.status.success());

    let out = json_of(&output);
    assert_eq!(out["requested"], 200);
    assert_eq!(out["accepted"], 128);
    assert_eq!(out["truncated"], true);
    assert_eq!(out["delivered"], 50);
    // The short read consumed the whole slot.
    assert_eq!(out["second_read"], 0);
}

#[test]
fn exchange_raw_emits_payload_bytes() {
    let output = run(&["--format", "raw", "exchange", "--nul"]);
    assert!(output.status.success());
    assert_eq!(output.stdout, b"Hello Kernel!\0");
}

#[test]
fn exchange_without_read_reports_no_delivery() {
    let output = run(&["--format", "json", "exchange", "--no-read"]);
    assert!(output.status.success());

    let out = json_of(&output);
    assert_eq!(out["accepted"], 13);
    assert!(out["delivered"].is_null());
}

#[test]
fn isolate_per_handle_succeeds() {
    let output = run(&["--format", "json", "isolate", "--handles", "6"]);
    assert!(output.status.success());

    let out = json_of(&output);
    assert_eq!(out["buffer_mode"], "per-handle");
    assert_eq!(out["isolated"], true);
    assert_eq!(out["handles"].as_array().map(Vec::len), Some(6));
}

#[test]
fn isolate_shared_mode_reports_mixing() {
    let output = run(&[
        "--format",
        "json",
        "--buffer-mode",
        "shared",
        "isolate",
        "--handles",
        "3",
    ]);
    assert_eq!(output.status.code(), Some(1));

    let out = json_of(&output);
    assert_eq!(out["buffer_mode"], "shared");
    assert_eq!(out["isolated"], false);
}

#[test]
fn isolate_beyond_handle_limit_is_resource_exhausted() {
    let output = run(&["isolate", "--handles", "3", "--max-handles", "2"]);
    assert_eq!(output.status.code(), Some(71));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("open failed"));
}

#[test]
fn info_honours_device_env() {
    let output = mfchar(&["--format", "json", "info"])
        .env("MFCHAR_DEVICE", "scratch")
        .env("MFCHAR_MAX_HANDLES", "8")
        .output()
        .expect("info should run");
    assert!(output.status.success());

    let out = json_of(&output);
    assert_eq!(out["name"], "scratch");
    assert_eq!(out["path"], "/dev/scratch");
    assert_eq!(out["major"], 254);
    assert_eq!(out["minor"], 0);
    assert_eq!(out["capacity"], 128);
    assert_eq!(out["max_open_handles"], 8);
    assert_eq!(out["open_handles"], 0);
}

#[test]
fn invalid_device_name_is_usage_error() {
    let output = run(&["--device", "a/b", "probe"]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn version_prints_package_version() {
    let output = run(&["version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("mfchar "));
}

#[test]
fn extended_version_reports_build_info() {
    let output = run(&["--format", "json", "version", "--extended"]);
    assert!(output.status.success());

    let out = json_of(&output);
    assert_eq!(out["name"], "mfchar");
    assert_eq!(out["slot_capacity"], 128);
    assert_eq!(out["default_device"], "/dev/mfchar");
}
