//! Tests driving the acl-sjson binary.

use std::fs;
use std::process::{Command, Output};

use tempfile::TempDir;

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_acl-sjson"))
        .args(args)
        .output()
        .expect("Failed to run acl-sjson")
}

const DOCUMENT: &str = r#"{
    "version": 6,
    "track_list": { "name": "fade", "num_samples": 3, "sample_rate": 24 },
    "tracks": [ { "name": "alpha", "type": "float1f", "data": [[0], [0.5], [1]] } ]
}"#;

#[test]
fn test_no_action_prints_usage_and_fails() {
    let output = run(&[]);
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--convert"));
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")), "{stdout}");
}

#[test]
fn test_bad_target_is_an_argument_error() {
    let output = run(&["--convert", "a.acl.sjson", "b.acl", "--target", "1.9"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("--target requires a valid version"));
}

#[test]
fn test_convert_then_info() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let input = dir.path().join("fade.acl.sjson");
    let output = dir.path().join("fade.acl");
    fs::write(&input, DOCUMENT).expect("write input");

    let input = input.to_str().expect("utf-8 path");
    let output = output.to_str().expect("utf-8 path");

    let result = run(&["--bogus", "--convert", input, output, "--target", "2.0"]);
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));
    assert!(String::from_utf8_lossy(&result.stderr).contains("Unknown argument: --bogus"));

    let result = run(&["--info", output]);
    assert!(result.status.success());
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains("Version: 2.0"), "{stdout}");
    assert!(stdout.contains("Num tracks: 1"), "{stdout}");
    assert!(stdout.contains("Num samples per track: 3"), "{stdout}");
    assert!(stdout.contains("Sample rate: 24.00"), "{stdout}");
}

#[test]
fn test_failed_conversion_exits_with_one() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let missing = dir.path().join("missing.acl");
    let output = dir.path().join("out.acl.sjson");

    let result = run(&[
        "--convert",
        missing.to_str().expect("utf-8 path"),
        output.to_str().expect("utf-8 path"),
    ]);
    assert_eq!(result.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&result.stderr).starts_with("Error: "));
    assert!(!output.exists());
}

#[test]
fn test_oversized_clip_header_is_an_error() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let input = dir.path().join("huge.acl.sjson");
    fs::write(
        &input,
        r#"{"version":5,"clip":{"num_samples":4294967295,"sample_rate":30},"bones":[{"name":"root"}]}"#,
    )
    .expect("write input");

    let result = run(&["--info", input.to_str().expect("utf-8 path")]);
    assert_eq!(result.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.starts_with("Error: Invalid SJSON content"), "{stderr}");
}
