#![allow(dead_code)]

use std::{path::PathBuf, sync::Mutex};

use assert_cmd::Command;
use once_cell::sync::Lazy;
use tempfile::TempDir;

pub const PINNED_TODAY: &str = "2025-03-10";

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates an isolated data directory that outlives the calling test.
pub fn test_home() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    path
}

/// Script-mode shell bound to `home`, with the date pinned.
pub fn cli(home: &PathBuf) -> Command {
    let mut cmd = Command::cargo_bin("flowplan_cli").expect("binary built");
    cmd.env("FLOWPLAN_HOME", home)
        .env("FLOWPLAN_CLI_SCRIPT", "1")
        .env("FLOWPLAN_TODAY", PINNED_TODAY)
        .env_remove("RUST_LOG");
    cmd
}

/// Joins script lines into stdin input.
pub fn script(lines: &[&str]) -> String {
    let mut input = lines.join("\n");
    input.push('\n');
    input
}
