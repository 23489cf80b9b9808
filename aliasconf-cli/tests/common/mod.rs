//! Common test utilities for CLI integration tests.
//!
//! This module provides shared helpers for CLI testing, including:
//! - Test environment setup with temporary directories
//! - Command builder helpers for common patterns
//! - Test data fixtures

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A configuration used by most tests.
#[allow(dead_code)]
pub const LANGUAGES: &str = "\
python:
  aliases: [py, python3]
  timeout: 30
  bin: python3
  command: '{bin} {script}'
langs:
  cpp:
    aliases: [c++, cxx]
    compiler: g++
    flags: [-O2, -Wall]
database:
  aliases: [db]
  host: localhost
  port: 5432
";

/// Test environment with an isolated directory for configuration files.
pub struct TestEnv {
    /// Temporary directory (kept alive for the duration of the test)
    #[allow(dead_code)]
    temp_dir: TempDir,
    /// Path to the temporary directory
    pub temp_path: PathBuf,
}

#[allow(dead_code)]
impl TestEnv {
    /// Create a new test environment.
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let temp_path = temp_dir.path().to_path_buf();
        Self {
            temp_dir,
            temp_path,
        }
    }

    /// Get a bare command builder without pre-configured flags.
    ///
    /// `ALIASCONF_CONFIG` and `ALIASCONF_LOG_MODE` are cleared so the host
    /// environment cannot leak into tests.
    pub fn command_bare(&self) -> Command {
        let mut cmd = Command::cargo_bin("aliasconf").expect("Failed to find aliasconf binary");
        cmd.env_remove("ALIASCONF_CONFIG")
            .env_remove("ALIASCONF_LOG_MODE")
            .current_dir(&self.temp_path);
        cmd
    }

    /// Get a command builder with `--config` pointing at each file in order.
    pub fn command<P: AsRef<Path>>(&self, configs: &[P]) -> Command {
        let mut cmd = self.command_bare();
        for config in configs {
            cmd.arg("--config").arg(config.as_ref());
        }
        cmd
    }

    /// Write a configuration file and return its path.
    pub fn write_config(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_path.join(name);
        std::fs::write(&path, contents).expect("Failed to write config file");
        path
    }

    /// Write [`LANGUAGES`] to `languages.yaml`.
    pub fn languages(&self) -> PathBuf {
        self.write_config("languages.yaml", LANGUAGES)
    }

    /// Get the temp path.
    pub fn path(&self) -> &Path {
        &self.temp_path
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
