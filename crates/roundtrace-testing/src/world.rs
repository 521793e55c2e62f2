//! TestWorld pattern for CLI integration tests.
//!
//! Provides a fluent interface for:
//! - Creating an isolated home and config directory
//! - Placing sample or hand-written logs
//! - Executing the `roundtrace` binary with that context

use anyhow::{Context, Result};
use assert_cmd::Command;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::fixtures::SampleFiles;

/// Declarative test environment builder.
///
/// # Example
/// ```no_run
/// use roundtrace_testing::TestWorld;
///
/// let world = TestWorld::new();
/// let log = world.copy_sample("claude_session.jsonl", "session.jsonl").unwrap();
///
/// let result = world.run(&["rounds", log.to_str().unwrap()]).unwrap();
/// assert!(result.success());
/// ```
pub struct TestWorld {
    temp_dir: TempDir,
    home_dir: PathBuf,
    env_vars: HashMap<String, String>,
    samples: SampleFiles,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorld {
    /// Create a new isolated test environment.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let home_dir = temp_dir.path().join("home");
        std::fs::create_dir_all(&home_dir).expect("Failed to create home dir");

        Self {
            temp_dir,
            home_dir,
            env_vars: HashMap::new(),
            samples: SampleFiles::new(),
        }
    }

    /// Get the temp directory root.
    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Set an environment variable for CLI execution.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.insert(key.into(), value.into());
        self
    }

    /// Write `contents` as the config file and point `ROUNDTRACE_CONFIG` at it.
    pub fn with_config(self, contents: &str) -> Self {
        let path = self.temp_dir.path().join("config.toml");
        std::fs::write(&path, contents).expect("Failed to write config");
        let path = path.to_string_lossy().to_string();
        self.with_env("ROUNDTRACE_CONFIG", path)
    }

    /// Copy a sample log into the environment and return its path.
    pub fn copy_sample(&self, sample_name: &str, dest_name: &str) -> Result<PathBuf> {
        let dest = self.temp_dir.path().join(dest_name);
        self.samples.copy_to(sample_name, &dest)?;
        Ok(dest)
    }

    /// Write a hand-written log into the environment and return its path.
    pub fn write_log(&self, dest_name: &str, contents: &str) -> Result<PathBuf> {
        let dest = self.temp_dir.path().join(dest_name);
        std::fs::write(&dest, contents)
            .with_context(|| format!("Failed to write {}", dest.display()))?;
        Ok(dest)
    }

    /// Configure a CLI command with this test environment's settings.
    ///
    /// The user's own config and log level never leak into the run.
    pub fn configure_command<'a>(&self, cmd: &'a mut Command) -> &'a mut Command {
        cmd.current_dir(self.temp_dir.path())
            .env("HOME", &self.home_dir)
            .env("XDG_CONFIG_HOME", self.home_dir.join(".config"))
            .env_remove("ROUNDTRACE_CONFIG")
            .env_remove("RUST_LOG");

        for (key, value) in &self.env_vars {
            cmd.env(key, value);
        }

        cmd
    }

    /// Execute the `roundtrace` binary and capture its output.
    ///
    /// Uses `Command::cargo_bin()`, so the binary must have been built by
    /// the surrounding `cargo test` run.
    #[allow(deprecated)]
    pub fn run(&self, args: &[&str]) -> Result<CliResult> {
        let mut cmd = Command::cargo_bin("roundtrace")
            .map_err(|e| anyhow::anyhow!("Failed to find roundtrace binary: {}", e))?;

        self.configure_command(&mut cmd);
        cmd.args(args);

        let output = cmd.output()?;

        Ok(CliResult {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Result of a CLI command execution.
#[derive(Debug)]
pub struct CliResult {
    pub status: std::process::ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CliResult {
    /// Check if the command succeeded.
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Parse stdout as JSON.
    pub fn json(&self) -> Result<serde_json::Value> {
        serde_json::from_str(&self.stdout).with_context(|| {
            format!("stdout is not JSON:\n{}\nstderr:\n{}", self.stdout, self.stderr)
        })
    }

    /// Get stdout as a string.
    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    /// Get stderr as a string.
    pub fn stderr(&self) -> &str {
        &self.stderr
    }
}
