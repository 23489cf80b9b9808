//! Common test utilities for integration tests.
//!
//! Fixture lookup, temporary config files, and environment guards shared by
//! the aliasconf integration tests.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Path to a file under `tests/fixtures/configs`.
#[allow(dead_code)]
pub fn fixture_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("configs")
        .join(relative)
}

/// Write `content` to `dir/filename` and return the path.
#[allow(dead_code)]
pub fn create_temp_config(dir: &Path, filename: &str, content: &str) -> PathBuf {
    let path = dir.join(filename);
    fs::write(&path, content).unwrap();
    path
}

/// Parse a YAML snippet.
#[allow(dead_code)]
pub fn yaml(text: &str) -> serde_yaml::Value {
    serde_yaml::from_str(text).unwrap()
}

/// RAII guard for setting and restoring environment variables.
///
/// Tests using this must be marked `#[serial]`: the environment is
/// process-global.
#[allow(dead_code)]
pub struct EnvGuard {
    key: String,
    old_value: Option<String>,
}

#[allow(dead_code)]
impl EnvGuard {
    pub fn new(key: &str, value: &str) -> Self {
        let old_value = env::var(key).ok();
        env::set_var(key, value);
        Self {
            key: key.to_string(),
            old_value,
        }
    }

    pub fn remove(key: &str) -> Self {
        let old_value = env::var(key).ok();
        env::remove_var(key);
        Self {
            key: key.to_string(),
            old_value,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match &self.old_value {
            Some(val) => env::set_var(&self.key, val),
            None => env::remove_var(&self.key),
        }
    }
}
