//! Builder for assembling a [`Config`] from several sources.

use std::path::PathBuf;

use serde_yaml::{Mapping, Value};

use crate::cache::DEFAULT_LRU_CAPACITY;
use crate::config::environment::EnvLoader;
use crate::config::loader::{ConfigLoader, ConfigSource};
use crate::config::manager::{Config, MergeStrategy};
use crate::config::merger::ConfigMerger;
use crate::error::Result;

/// Assembles a configuration from files, in-memory values and the
/// environment.
///
/// Files and values are merged in the order they were added, later ones
/// winning. Environment variables, when enabled, are applied last.
///
/// # Examples
///
/// ```
/// use aliasconf::config::ConfigBuilder;
///
/// let base = serde_yaml::from_str("python:\n  aliases: [py]\n  timeout: 30\n").unwrap();
/// let overlay = serde_yaml::from_str("python:\n  timeout: 60\n").unwrap();
///
/// let config = ConfigBuilder::new()
///     .with_value(base)
///     .with_value(overlay)
///     .build()
///     .unwrap();
/// assert_eq!(config.get::<i64>("py.timeout").unwrap(), 60);
/// ```
#[derive(Debug)]
pub struct ConfigBuilder {
    layers: Vec<Layer>,
    env: Option<EnvLoader>,
    strategy: MergeStrategy,
    lru_capacity: usize,
}

#[derive(Debug)]
enum Layer {
    File(PathBuf),
    Value(Value),
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    /// An empty builder: no sources, no environment.
    #[must_use]
    pub fn new() -> Self {
        Self {
            layers: Vec::new(),
            env: None,
            strategy: MergeStrategy::default(),
            lru_capacity: DEFAULT_LRU_CAPACITY,
        }
    }

    /// Add a YAML or JSON file.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.layers.push(Layer::File(path.into()));
        self
    }

    /// Add several files in order.
    #[must_use]
    pub fn with_files<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.layers
            .extend(paths.into_iter().map(|path| Layer::File(path.into())));
        self
    }

    /// Add an in-memory document.
    #[must_use]
    pub fn with_value(mut self, value: Value) -> Self {
        self.layers.push(Layer::Value(value));
        self
    }

    /// Apply environment variables read by `loader` after every other
    /// source.
    #[must_use]
    pub fn with_env(mut self, loader: EnvLoader) -> Self {
        self.env = Some(loader);
        self
    }

    /// How environment data is merged over the sources.
    #[must_use]
    pub fn merge_strategy(mut self, strategy: MergeStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Maximum number of cached path resolutions.
    #[must_use]
    pub fn lru_capacity(mut self, capacity: usize) -> Self {
        self.lru_capacity = capacity;
        self
    }

    /// Load every source and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns the first load, parse, or structure error.
    pub fn build(self) -> Result<Config> {
        let sources = self
            .layers
            .into_iter()
            .enumerate()
            .map(|(index, layer)| {
                let (path, data) = match layer {
                    Layer::File(path) => {
                        let data = ConfigLoader::load_file(&path)?;
                        (path, data)
                    }
                    Layer::Value(data) => (PathBuf::from(format!("<value {index}>")), data),
                };
                Ok(ConfigSource {
                    path,
                    precedence: index + 1,
                    data,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        log::debug!("building configuration from {} sources", sources.len());
        let merged = if sources.is_empty() {
            Value::Mapping(Mapping::new())
        } else {
            ConfigMerger::merge(sources)
        };

        let config = Config::with_capacity(&merged, self.lru_capacity)?;
        if let Some(loader) = &self.env {
            config.load_env(loader, self.strategy)?;
        }
        Ok(config)
    }
}
