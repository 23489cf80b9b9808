//! Configuration loading and the [`Config`] façade.
//!
//! Data reaches a [`Config`] from three kinds of source:
//!
//! - YAML and JSON files ([`ConfigLoader`])
//! - in-memory documents
//! - environment variables ([`EnvLoader`], `ALIASCONF_*` by default)
//!
//! # Precedence
//!
//! Sources are merged from lowest to highest precedence:
//!
//! 1. Files and documents, in the order they were added
//! 2. Environment variables
//!
//! Maps merge key by key; any other value is replaced by the higher
//! precedence source.
//!
//! # Examples
//!
//! ```
//! use aliasconf::config::ConfigBuilder;
//!
//! let source = serde_yaml::from_str(
//!     "langs:\n  cpp:\n    aliases: [c++, cxx]\n    compiler: g++\n",
//! )
//! .unwrap();
//! let config = ConfigBuilder::new().with_value(source).build().unwrap();
//!
//! assert_eq!(config.get::<String>("cxx.compiler").unwrap(), "g++");
//! assert_eq!(config.get::<String>("langs.c++.compiler").unwrap(), "g++");
//! ```
//!
//! Loading from files with environment overrides:
//!
//! ```no_run
//! use aliasconf::config::{ConfigBuilder, EnvLoader};
//!
//! let config = ConfigBuilder::new()
//!     .with_file("config.yaml")
//!     .with_file("config.local.yaml")
//!     .with_env(EnvLoader::default())
//!     .build()
//!     .unwrap();
//! ```

pub mod builder;
pub mod environment;
pub mod loader;
pub mod manager;
pub mod merger;

#[cfg(all(test, feature = "property-tests"))]
mod proptests;

// Re-export key types at module root
pub use builder::ConfigBuilder;
pub use environment::EnvLoader;
pub use loader::{ConfigFormat, ConfigLoader, ConfigSource};
pub use manager::{Config, MergeStrategy};
pub use merger::{deep_merge, ConfigMerger};
