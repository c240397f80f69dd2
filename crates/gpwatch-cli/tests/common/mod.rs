use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Snapshot fixture with one stale cycle (6.2) and one current cycle (6.3).
pub const SNAPSHOT: &str = r#"[
    {
        "version": "6.3.2-c650",
        "size-kb": "95000",
        "released-on": "2025/06/02 10:00:00",
        "latest": "no",
        "sha256": null
    },
    {
        "version": "6.2.8-c317",
        "size-kb": "91228",
        "released-on": "2025/04/03 15:22:41",
        "latest": "yes",
        "sha256": null
    },
    {
        "version": "6.2.8-c263",
        "size-kb": "91100",
        "released-on": "2025/01/10 09:00:00",
        "latest": "no",
        "sha256": null
    }
]"#;

/// Tracker document fixture matching the snapshot above.
pub const DOC: &str = "\
---
title: GlobalProtect
releases:
  - releaseCycle: \"6.3\"
    releaseDate: 2024-09-10
    latest: \"6.3.2-c650\"
    latestReleaseDate: 2025-06-02
  - releaseCycle: \"6.2\"
    releaseDate: 2023-06-21
    latest: \"6.2.8-c263\"
    latestReleaseDate: 2025-01-10
---

GlobalProtect release tracking.
";

/// Write the standard fixtures into a directory, returning their paths.
pub fn write_fixtures(dir: &Path) -> (PathBuf, PathBuf) {
    let snapshot = dir.join("versions.json");
    let doc = dir.join("pan-gp.md");
    std::fs::write(&snapshot, SNAPSHOT).expect("write snapshot fixture");
    std::fs::write(&doc, DOC).expect("write doc fixture");
    (snapshot, doc)
}

/// Run the CLI binary with arguments.
pub fn run_cli(args: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_gpwatch"));
    cmd.args(args);
    cmd.env_remove("GITHUB_TOKEN");
    cmd.output().expect("Failed to execute CLI")
}

/// Run the CLI and expect success.
pub fn run_cli_success(args: &[&str]) -> String {
    let output = run_cli(args);
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Combined stdout+stderr for assertions on summary lines.
pub fn run_cli_all_output(args: &[&str]) -> (bool, String) {
    let output = run_cli(args);
    let mut text = String::from_utf8_lossy(&output.stdout).to_string();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    (output.status.success(), text)
}
