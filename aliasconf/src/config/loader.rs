//! Configuration file loading.
//!
//! Files are decoded into a plain nested [`Value`]; building the tree is
//! left to the caller. YAML (`.yaml`, `.yml`) and JSON (`.json`) are
//! supported, chosen by extension.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};

use crate::config::merger::ConfigMerger;
use crate::error::{Error, Result};

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML 1.2.
    Yaml,
    /// JSON.
    Json,
}

impl ConfigFormat {
    /// Pick a format from a file extension (case-insensitive).
    ///
    /// # Examples
    ///
    /// ```
    /// use aliasconf::config::ConfigFormat;
    /// use std::path::Path;
    ///
    /// assert_eq!(ConfigFormat::from_path(Path::new("app.YML")), Some(ConfigFormat::Yaml));
    /// assert_eq!(ConfigFormat::from_path(Path::new("app.json")), Some(ConfigFormat::Json));
    /// assert_eq!(ConfigFormat::from_path(Path::new("app.toml")), None);
    /// ```
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_lowercase();
        match extension.as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yaml => write!(f, "yaml"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// A decoded document together with its precedence.
///
/// Lower precedence values are overridden by higher ones.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    /// Where the document came from.
    pub path: PathBuf,
    /// Precedence level (higher values take priority).
    pub precedence: usize,
    /// Decoded data.
    pub data: Value,
}

/// Loads configuration documents.
///
/// # Examples
///
/// ```no_run
/// use aliasconf::config::ConfigLoader;
/// use std::path::Path;
///
/// let merged = ConfigLoader::load_all(&[Path::new("base.yaml"), Path::new("local.yaml")]).unwrap();
/// println!("{}", serde_yaml::to_string(&merged).unwrap());
/// ```
pub struct ConfigLoader;

impl ConfigLoader {
    /// Read and decode one file.
    ///
    /// An empty document yields an empty map.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, a validation error
    /// for unsupported extensions, and a parse error for malformed content.
    pub fn load_file(path: &Path) -> Result<Value> {
        let format = ConfigFormat::from_path(path).ok_or_else(|| {
            Error::validation(
                path.display().to_string(),
                "unsupported file format (expected .yaml, .yml or .json)",
            )
        })?;

        let contents = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;

        log::debug!("loading {format} configuration from {}", path.display());
        Self::parse_str(&contents, format, &path.display().to_string())
    }

    /// Decode a document held in memory.
    ///
    /// `origin` names the document in error messages.
    ///
    /// # Errors
    ///
    /// Returns a parse error for malformed content.
    pub fn parse_str(contents: &str, format: ConfigFormat, origin: &str) -> Result<Value> {
        if contents.trim().is_empty() {
            return Ok(Value::Mapping(Mapping::new()));
        }

        let parsed: Value = match format {
            ConfigFormat::Yaml => serde_yaml::from_str(contents).map_err(|e| Error::Parse {
                origin: origin.to_string(),
                message: e.to_string(),
            })?,
            ConfigFormat::Json => serde_json::from_str(contents).map_err(|e| Error::Parse {
                origin: origin.to_string(),
                message: e.to_string(),
            })?,
        };

        Ok(match parsed {
            Value::Null => Value::Mapping(Mapping::new()),
            other => other,
        })
    }

    /// Load every file in order, assigning increasing precedence.
    ///
    /// # Errors
    ///
    /// Returns the first load error, or a validation error if `paths` is
    /// empty.
    pub fn load_sources<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<ConfigSource>> {
        if paths.is_empty() {
            return Err(Error::validation(
                "paths",
                "at least one file path must be provided",
            ));
        }

        paths
            .iter()
            .enumerate()
            .map(|(index, path)| {
                let path = path.as_ref();
                Ok(ConfigSource {
                    path: path.to_path_buf(),
                    precedence: index + 1,
                    data: Self::load_file(path)?,
                })
            })
            .collect()
    }

    /// Load every file and deep-merge them, later files winning.
    ///
    /// # Errors
    ///
    /// Same as [`ConfigLoader::load_sources`].
    pub fn load_all<P: AsRef<Path>>(paths: &[P]) -> Result<Value> {
        Ok(ConfigMerger::merge(Self::load_sources(paths)?))
    }
}
