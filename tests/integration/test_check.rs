//! Integration tests for the one-shot `check` command.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

fn project(files: &[(&str, &str)]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    for (name, contents) in files {
        std::fs::write(dir.path().join(name), contents).expect("write fixture");
    }
    dir
}

#[test]
fn test_check_clean_project_succeeds() {
    let dir = project(&[("main.js", "var main = 1;\n")]);

    let mut cmd = cargo_bin_cmd!("jscd");
    cmd.arg("check").arg("--base-dir").arg(dir.path()).arg("main.js");

    let output = cmd.output().expect("failed to run jscd check");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "check failed: {stdout}");
    assert!(predicate::str::contains("0 error(s), 0 warning(s)").eval(&stdout));
    assert!(predicate::str::contains("compiled output:").eval(&stdout));
}

#[test]
fn test_check_missing_file_exits_nonzero() {
    let dir = project(&[]);

    let mut cmd = cargo_bin_cmd!("jscd");
    cmd.arg("check").arg("--base-dir").arg(dir.path()).arg("gone.js");

    let output = cmd.output().expect("failed to run jscd check");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!output.status.success());
    assert!(predicate::str::contains("ERROR").eval(&stdout));
    assert!(predicate::str::contains("gone.js").eval(&stdout));
    assert!(predicate::str::contains("1 error(s)").eval(&stdout));
}

#[test]
fn test_check_invalid_define_is_reported() {
    let dir = project(&[("main.js", "var main = 1;\n")]);

    let mut cmd = cargo_bin_cmd!("jscd");
    cmd.arg("check")
        .arg("--base-dir")
        .arg(dir.path())
        .arg("main.js")
        .arg("--define")
        .arg("=true");

    let output = cmd.output().expect("failed to run jscd check");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!output.status.success());
    assert!(predicate::str::contains("empty name for define").eval(&stdout));
}

#[test]
fn test_check_json_format() {
    let dir = project(&[("main.js", "var main = 1;\n")]);

    let mut cmd = cargo_bin_cmd!("jscd");
    cmd.arg("check")
        .arg("--base-dir")
        .arg(dir.path())
        .arg("main.js")
        .arg("--format")
        .arg("json");

    let output = cmd.output().expect("failed to run jscd check");
    assert!(output.status.success());

    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert!(value["diagnostics"].as_array().expect("diagnostics array").is_empty());
    assert!(value["code"].as_str().expect("code string").contains("var main = 1;"));
}

#[test]
fn test_check_with_defines_and_entry_points() {
    let dir = project(&[("main.js", "var main = 1;\n")]);

    let mut cmd = cargo_bin_cmd!("jscd");
    cmd.arg("check")
        .arg("--base-dir")
        .arg(dir.path())
        .arg("main.js")
        .arg("--define")
        .arg("DEBUG=false")
        .arg("--define")
        .arg("VERSION=1.3")
        .arg("--entry-point")
        .arg("main.js");

    let output = cmd.output().expect("failed to run jscd check");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "check failed: {stdout}");
}

#[test]
fn test_check_requires_files() {
    let dir = project(&[]);

    let mut cmd = cargo_bin_cmd!("jscd");
    cmd.arg("check").arg("--base-dir").arg(dir.path());

    let output = cmd.output().expect("failed to run jscd check");
    assert!(!output.status.success());
}
