//! Common utilities for CLI E2E tests.
//!
//! Every [`Sandbox`] points `HOME` at its own temp directory, so config and
//! the SQLite store never touch the developer's real data.

#![allow(dead_code)]

use std::io::Write;
use std::process::{Command, Stdio};

use tempfile::TempDir;

pub struct Sandbox {
    home: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            home: TempDir::new().expect("Failed to create temp HOME"),
        }
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_ecomonitor-cli"));
        cmd.args(args)
            .env("HOME", self.home.path())
            .env_remove("ECOMONITOR_ENV")
            .env("RUST_LOG", "warn");
        cmd
    }

    /// Invoke a CLI command and return (stdout, stderr, exit code).
    pub fn run(&self, args: &[&str]) -> (String, String, i32) {
        self.run_with_input(args, "")
    }

    /// Invoke a CLI command with `input` on stdin.
    pub fn run_with_input(&self, args: &[&str], input: &str) -> (String, String, i32) {
        let mut child = self
            .command(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("Failed to execute CLI command");

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(input.as_bytes())
                .expect("Failed to write CLI stdin");
        }

        let output = child.wait_with_output().expect("Failed to wait for CLI");
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let code = output.status.code().unwrap_or(-1);

        (stdout, stderr, code)
    }

    /// Invoke a CLI command and expect success.
    pub fn run_success(&self, args: &[&str]) -> String {
        let (stdout, stderr, code) = self.run(args);
        assert_eq!(code, 0, "CLI command {args:?} failed with code {code}: {stderr}");
        stdout
    }

    /// Invoke a CLI command and expect failure.
    pub fn run_failure(&self, args: &[&str]) -> (String, String, i32) {
        let (stdout, stderr, code) = self.run(args);
        assert!(code != 0, "CLI command unexpectedly succeeded: {args:?}");
        (stdout, stderr, code)
    }

    /// Invoke a CLI command and parse its stdout as JSON.
    pub fn run_json(&self, args: &[&str]) -> serde_json::Value {
        parse_json(&self.run_success(args))
    }
}

/// Parse JSON output from CLI.
pub fn parse_json(json: &str) -> serde_json::Value {
    serde_json::from_str(json).expect("Failed to parse JSON output")
}

/// Check if string contains substring
pub fn assert_contains(haystack: &str, needle: &str) {
    assert!(
        haystack.contains(needle),
        "Expected '{}' to contain '{}'",
        haystack, needle
    );
}
