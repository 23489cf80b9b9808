//! Utility functions for CLI operations.
//!
//! This module provides common utility functions used across CLI commands,
//! including configuration loading, argument parsing, and output rendering.

use crate::cli::OutputFormat;
use crate::error::CliError;
use aliasconf::config::{ConfigBuilder, EnvLoader};
use aliasconf::convert::render;
use aliasconf::{Config, ConfigPath, Value};
use std::collections::HashMap;
use std::path::PathBuf;

/// Global CLI options shared across all commands.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Suppress non-essential output.
    pub quiet: bool,

    /// Configuration files, lowest precedence first.
    pub config_files: Vec<PathBuf>,

    /// Prefix of environment variables to merge, if any.
    pub env_prefix: Option<String>,

    /// Rewrite alias paths in environment variables.
    pub env_aliases: bool,
}

/// Load the configuration described by the global options.
///
/// Configuration is merged from multiple sources with precedence:
/// 1. Environment variables (when `--env-prefix` is given)
/// 2. Configuration files, later files winning
pub fn load_configuration(global: &GlobalOptions) -> Result<Config, CliError> {
    let mut builder = ConfigBuilder::new().with_files(global.config_files.iter().cloned());

    if let Some(prefix) = &global.env_prefix {
        builder = builder
            .with_env(EnvLoader::new(prefix.clone()).with_alias_resolution(global.env_aliases));
    }

    if global.config_files.is_empty() && global.env_prefix.is_none() && !global.quiet {
        log::warn!("no configuration files given; use --config or ALIASCONF_CONFIG");
    }

    builder.build().map_err(CliError::Config)
}

/// Parse a dotted path given on the command line.
pub fn parse_path(raw: &str) -> Result<ConfigPath, CliError> {
    ConfigPath::parse(raw).map_err(|e| CliError::InvalidArguments(e.to_string()))
}

/// Parse `key=value` pairs into a template context.
pub fn parse_context(pairs: &[String]) -> Result<HashMap<String, String>, CliError> {
    pairs
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .filter(|(key, _)| !key.is_empty())
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .ok_or_else(|| {
                    CliError::InvalidArguments(format!("expected KEY=VALUE, got '{pair}'"))
                })
        })
        .collect()
}

/// Serialize a value in the requested format.
pub fn serialize(value: &Value, format: OutputFormat) -> Result<String, CliError> {
    match format {
        OutputFormat::Yaml => serde_yaml::to_string(value)
            .map(|text| text.trim_end().to_string())
            .map_err(|e| CliError::Output(e.to_string())),
        OutputFormat::Json => {
            serde_json::to_string_pretty(value).map_err(|e| CliError::Output(e.to_string()))
        }
    }
}

/// Render a value for terminal output.
///
/// Scalars print as plain text; collections are serialized with `format`.
pub fn display_value(value: &Value, format: OutputFormat) -> Result<String, CliError> {
    match value {
        Value::Sequence(_) | Value::Mapping(_) => serialize(value, format),
        scalar => Ok(render(scalar)),
    }
}
