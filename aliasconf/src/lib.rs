#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # aliasconf
//!
//! Hierarchical configuration with alias-aware key resolution.
//!
//! Any map in a configuration may declare an `aliases` list. The node that
//! owns that map then answers to each alias as well as to its own key, so
//! `py.timeout`, `python3.timeout` and `python.timeout` all reach the same
//! value. Paths may also be partial: `compiler` finds `langs.cpp.compiler`
//! when nothing closer matches.
//!
//! ## Core Types
//!
//! - [`Config`] and [`ConfigBuilder`]: loading, typed access and updates
//! - [`ConfigPath`]: validated dotted paths
//! - [`Tree`], [`Node`] and [`NodeId`]: the arena behind a configuration
//! - [`ResolutionCache`]: indexed and memoized path lookups
//! - [`Error`] and [`Result`]: error handling types
//! - [`Logger`] and [`LogLevel`]: logging infrastructure
//!
//! ## Examples
//!
//! ```
//! use aliasconf::Config;
//!
//! let config = Config::from_yaml_str(
//!     "python:\n  aliases: [py, python3]\n  timeout: 30\n  args: [-u]\n",
//! )
//! .unwrap();
//!
//! assert_eq!(config.get::<i64>("py.timeout").unwrap(), 30);
//! assert_eq!(config.get::<Vec<String>>("python3.args").unwrap(), ["-u"]);
//! assert!(config.get::<i64>("ruby.version").is_err());
//! ```

pub mod builder;
pub mod cache;
pub mod config;
pub mod convert;
pub mod error;
pub mod format;
pub mod logging;
pub mod node;
pub mod path;
pub mod resolver;

// Re-export key types at crate root for convenience
pub use builder::build;
pub use cache::{CacheStats, ResolutionCache};
pub use config::{Config, ConfigBuilder, EnvLoader, MergeStrategy};
pub use convert::{FromValue, ValueType};
pub use error::{Error, Result};
pub use format::Formatter;
pub use logging::{init_logger, LogLevel, Logger};
pub use node::{Node, NodeId, NodeValue, Tree};
pub use path::{ConfigPath, IntoConfigPath, PathComponent};
pub use resolver::Match;
pub use serde_yaml::Value;
