//! Common test utilities for CLI integration tests.
//!
//! Each test gets an isolated data directory and builds `labres` commands
//! against it. Dates are far in the future so the default policy, which
//! refuses reservations that start in the past, never gets in the way.

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Administrator used by the helpers.
pub const ADMIN: &str = "carol";

/// Test environment with isolated data directory.
pub struct TestEnv {
    /// Temporary directory (kept alive for the duration of the test)
    #[allow(dead_code)]
    temp_dir: TempDir,
    /// Path to the labres data directory
    pub data_dir: PathBuf,
}

/// A date in June 2099, formatted for `--from`/`--to`.
#[allow(dead_code)]
pub fn june(day: u32) -> String {
    format!("2099-06-{day:02}")
}

#[allow(dead_code)]
impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let data_dir = temp_dir.path().join("labres-data");
        Self { temp_dir, data_dir }
    }

    /// Get a bare command builder with identity variables cleared.
    pub fn command_bare(&self) -> Command {
        let mut cmd = Command::cargo_bin("labres").expect("Failed to find labres binary");
        for var in [
            "LABRES_USER",
            "LABRES_ROLE",
            "LABRES_DATA_DIR",
            "LABRES_BUSY_TIMEOUT",
            "LABRES_OUTPUT_FORMAT",
            "LABRES_LOG_MODE",
        ] {
            cmd.env_remove(var);
        }
        cmd
    }

    /// Get a command builder with the data directory pre-configured.
    pub fn command(&self) -> Command {
        let mut cmd = self.command_bare();
        cmd.arg("--data-dir").arg(&self.data_dir);
        cmd
    }

    /// Command acting as a regular user.
    pub fn as_user(&self, user: &str) -> Command {
        let mut cmd = self.command();
        cmd.arg("--as").arg(user);
        cmd
    }

    /// Command acting as the administrator.
    pub fn as_admin(&self) -> Command {
        let mut cmd = self.as_user(ADMIN);
        cmd.arg("--admin");
        cmd
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Registers a resource and returns its id.
    pub fn add_resource(&self, label: &str) -> i64 {
        let output = self
            .as_admin()
            .args(["resource", "add", label])
            .output()
            .expect("Failed to run resource add");
        parse_id(&output)
    }

    /// Requests `resource` for the given June 2099 days, 09:00-12:00.
    pub fn reserve(&self, user: &str, resource: i64, from: u32, to: u32) -> i64 {
        let output = self
            .as_user(user)
            .arg("reserve")
            .arg("--resource")
            .arg(resource.to_string())
            .args(["--from", &june(from), "--to", &june(to)])
            .args(["--start", "09:00", "--end", "12:00"])
            .args(["--reason", "experiment"])
            .output()
            .expect("Failed to run reserve");
        parse_id(&output)
    }

    /// Approves a reservation, asserting success.
    pub fn approve(&self, reservation: i64) {
        self.as_admin()
            .arg("approve")
            .arg(reservation.to_string())
            .assert()
            .success();
    }

    /// Runs `list` with JSON output and returns the parsed rows.
    pub fn list_json(&self, args: &[&str]) -> Vec<serde_json::Value> {
        let output = self
            .as_admin()
            .arg("list")
            .args(args)
            .args(["--format", "json"])
            .output()
            .expect("Failed to run list");
        assert!(
            output.status.success(),
            "List failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("list output is not a JSON array")
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses the leading id a mutation command prints on stdout.
pub fn parse_id(output: &std::process::Output) -> i64 {
    assert!(
        output.status.success(),
        "Command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout
        .split_whitespace()
        .next()
        .and_then(|id| id.parse().ok())
        .expect("Output does not start with an id")
}
