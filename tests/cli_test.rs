//! Integration tests for the notedown CLI.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_notedown-cli"))
}

#[test]
fn test_custom_mode_writes_markdown() {
    let temp_dir = TempDir::new().unwrap();
    let input_path = temp_dir.path().join("report.html");
    fs::write(&input_path, "<h1>Report</h1><p>Done.</p>").unwrap();

    cli()
        .arg(&input_path)
        .args(["--mode", "custom"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Success:"))
        .stdout(predicate::str::contains("Conversion complete: 1/1 files successful"));

    let output = fs::read_to_string(temp_dir.path().join("report.md")).unwrap();
    assert_eq!(output, "# Report\nDone.");
}

#[test]
fn test_explicit_output() {
    let temp_dir = TempDir::new().unwrap();
    let input_path = temp_dir.path().join("in.html");
    let output_path = temp_dir.path().join("out").join("notes.md");
    fs::write(&input_path, "<p>Output test</p>").unwrap();

    cli()
        .arg(&input_path)
        .arg("-o")
        .arg(&output_path)
        .args(["-m", "custom"])
        .assert()
        .success();

    assert_eq!(fs::read_to_string(&output_path).unwrap(), "Output test");
}

#[test]
fn test_no_images_flag() {
    let temp_dir = TempDir::new().unwrap();
    let input_path = temp_dir.path().join("img.html");
    fs::write(&input_path, r#"<img src="data:image/png;base64,AAAA" alt="plot">"#).unwrap();

    cli()
        .arg(&input_path)
        .args(["--mode", "custom", "--no-images"])
        .assert()
        .success();

    let output = fs::read_to_string(temp_dir.path().join("img.md")).unwrap();
    assert_eq!(output, "*[Image: plot]*");
}

#[test]
fn test_missing_input_fails() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("missing.html");

    cli()
        .arg(&missing)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Failed:"))
        .stdout(predicate::str::contains("0/1 files successful"));
}

#[test]
fn test_partial_batch_fails() {
    let temp_dir = TempDir::new().unwrap();
    let good = temp_dir.path().join("good.html");
    fs::write(&good, "<p>ok</p>").unwrap();
    let missing = temp_dir.path().join("missing.html");

    cli()
        .arg(&good)
        .arg(&missing)
        .args(["--mode", "custom"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("1/2 files successful"));
}

#[test]
fn test_output_conflicts_with_many_inputs() {
    let temp_dir = TempDir::new().unwrap();
    let a = temp_dir.path().join("a.html");
    let b = temp_dir.path().join("b.html");
    fs::write(&a, "<p>a</p>").unwrap();
    fs::write(&b, "<p>b</p>").unwrap();

    cli()
        .arg(&a)
        .arg(&b)
        .args(["-o", "out.md"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("single input"));
}

#[test]
fn test_json_summary() {
    let temp_dir = TempDir::new().unwrap();
    let input_path = temp_dir.path().join("j.html");
    fs::write(&input_path, "<p>json</p>").unwrap();

    let assert = cli()
        .arg(&input_path)
        .args(["--mode", "custom", "--json"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let reports: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(reports.as_array().unwrap().len(), 1);
    assert!(reports[0]["output"].as_str().unwrap().ends_with("j.md"));
    assert!(reports[0]["error"].is_null());
    assert_eq!(reports[0]["backend"], "custom");
}

#[test]
fn test_unknown_mode_rejected() {
    cli()
        .args(["x.html", "--mode", "latex"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("latex"));
}

#[test]
fn test_pandoc_unavailable_falls_back() {
    let temp_dir = TempDir::new().unwrap();
    let input_path = temp_dir.path().join("fb.html");
    fs::write(&input_path, "<h2>Fallback</h2>").unwrap();

    let assert = cli()
        .arg(&input_path)
        .args(["--pandoc", "notedown-missing-pandoc", "--json"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let reports: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_ne!(reports[0]["backend"], "high-fidelity");

    assert!(temp_dir.path().join("fb.md").exists());
}
