//! Common test utilities for CLI testing.

use std::path::{Path, PathBuf};
use std::process::Output;

use assert_cmd::Command;
use tempfile::{tempdir, TempDir};

/// Test context with a temporary project directory
pub struct TestContext {
    pub temp_dir: TempDir,
    pub config_path: PathBuf,
}

impl TestContext {
    pub fn new() -> Self {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join(".stepgen").join("config.yaml");

        Self {
            temp_dir,
            config_path,
        }
    }

    /// Write the project's config file
    pub fn with_config(self, config: &str) -> Self {
        std::fs::create_dir_all(self.config_path.parent().expect("config has a parent"))
            .expect("Failed to create config dir");
        std::fs::write(&self.config_path, config).expect("Failed to write config");
        self
    }

    /// Add a feature file under `tests/features`
    pub fn with_feature(self, name: &str, content: &str) -> Self {
        let path = self.path().join("tests/features").join(name);
        std::fs::create_dir_all(path.parent().expect("feature has a parent"))
            .expect("Failed to create features dir");
        std::fs::write(path, content).expect("Failed to write feature");
        self
    }

    /// Get path to temp directory
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Read a file relative to the project
    pub fn read(&self, relative: &str) -> String {
        std::fs::read_to_string(self.path().join(relative))
            .unwrap_or_else(|e| panic!("Failed to read {relative}: {e}"))
    }

    /// Create a command configured for this context
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("stepgen").expect("Binary not found");
        cmd.current_dir(self.path())
            .env_remove("STEPGEN_PROJECT_DIR")
            .env_remove("STEPGEN_CONFIG")
            .env_remove("STEPGEN_LOG_LEVEL")
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1"); // Disable colors for predictable output
        cmd
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Assert helpers for CLI output
pub trait OutputAssertions {
    fn assert_success(&self);
    fn assert_failure(&self);
    fn assert_stdout_contains(&self, text: &str);
    fn assert_stderr_contains(&self, text: &str);
    fn assert_exit_code(&self, code: i32);
}

impl OutputAssertions for Output {
    fn assert_success(&self) {
        assert!(
            self.status.success(),
            "Command failed with status: {}\nstderr: {}",
            self.status,
            String::from_utf8_lossy(&self.stderr)
        );
    }

    fn assert_failure(&self) {
        assert!(
            !self.status.success(),
            "Command succeeded unexpectedly\nstdout: {}",
            String::from_utf8_lossy(&self.stdout)
        );
    }

    fn assert_stdout_contains(&self, text: &str) {
        let stdout = String::from_utf8_lossy(&self.stdout);
        assert!(
            stdout.contains(text),
            "stdout did not contain '{}'\nstdout: {}",
            text,
            stdout
        );
    }

    fn assert_stderr_contains(&self, text: &str) {
        let stderr = String::from_utf8_lossy(&self.stderr);
        assert!(
            stderr.contains(text),
            "stderr did not contain '{}'\nstderr: {}",
            text,
            stderr
        );
    }

    fn assert_exit_code(&self, code: i32) {
        assert_eq!(
            self.status.code(),
            Some(code),
            "Expected exit code {}, got {:?}",
            code,
            self.status.code()
        );
    }
}
