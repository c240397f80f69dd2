//! Basic CLI integration tests: argument handling, exit codes, summaries.

mod common;

use common::{run_cli, run_cli_all_output, run_cli_success, write_fixtures};

#[test]
fn help_works() {
    let output = run_cli_success(&["--help"]);
    assert!(output.contains("release"));
}

#[test]
fn versions_lists_newest_per_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let (snapshot, _) = write_fixtures(dir.path());

    let output = run_cli_success(&[
        "release",
        "versions",
        "--snapshot",
        snapshot.to_str().unwrap(),
    ]);

    assert!(output.contains("6.2"));
    assert!(output.contains("6.2.8-c317"));
    assert!(output.contains("6.3.2-c650"));
    // The superseded build never shows up.
    assert!(!output.contains("6.2.8-c263"));
}

#[test]
fn check_reports_stale_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let (snapshot, doc) = write_fixtures(dir.path());

    let (ok, output) = run_cli_all_output(&[
        "release",
        "check",
        "--snapshot",
        snapshot.to_str().unwrap(),
        "--doc",
        doc.to_str().unwrap(),
    ]);

    assert!(ok);
    assert!(output.contains("6.2.8-c263 -> 6.2.8-c317"));
    assert!(output.contains("up to date"));
}

#[test]
fn check_exits_zero_when_nothing_to_do() {
    let dir = tempfile::tempdir().unwrap();
    let (snapshot, doc) = write_fixtures(dir.path());

    // Publish the newest 6.2 build in the doc, leaving nothing stale.
    let current = common::DOC.replace("6.2.8-c263", "6.2.8-c317");
    std::fs::write(&doc, current).unwrap();

    let (ok, output) = run_cli_all_output(&[
        "release",
        "check",
        "--snapshot",
        snapshot.to_str().unwrap(),
        "--doc",
        doc.to_str().unwrap(),
    ]);

    assert!(ok);
    assert!(output.contains("No updates needed."));
}

#[test]
fn check_json_output_is_parseable() {
    let dir = tempfile::tempdir().unwrap();
    let (snapshot, doc) = write_fixtures(dir.path());

    let output = run_cli_success(&[
        "release",
        "check",
        "--snapshot",
        snapshot.to_str().unwrap(),
        "--doc",
        doc.to_str().unwrap(),
        "--json",
    ]);

    let proposals: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(proposals[0]["cycle"], "6.2");
    assert_eq!(proposals[0]["new_version"], "6.2.8-c317");
}

#[test]
fn missing_snapshot_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let (_, doc) = write_fixtures(dir.path());

    let output = run_cli(&[
        "release",
        "check",
        "--snapshot",
        "/nonexistent/versions.json",
        "--doc",
        doc.to_str().unwrap(),
    ]);

    assert!(!output.status.success());
}

#[test]
fn reconcile_requires_a_backend() {
    let dir = tempfile::tempdir().unwrap();
    let (snapshot, doc) = write_fixtures(dir.path());

    let output = run_cli(&[
        "release",
        "reconcile",
        "--snapshot",
        snapshot.to_str().unwrap(),
        "--doc",
        doc.to_str().unwrap(),
    ]);

    assert!(!output.status.success());
}
