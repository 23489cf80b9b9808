//! CLI structure and command definitions.
//!
//! This module defines the main CLI structure using clap's derive macros,
//! including global options and subcommands.

use crate::commands::{
    AliasesCommand, AllCommand, CompletionsCommand, DumpCommand, FormatCommand, GetCommand,
    HasCommand,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Command-line tool for querying alias-aware configuration.
#[derive(Parser)]
#[command(name = "aliasconf")]
#[command(version, about = "Query configuration files through key aliases", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Configuration file to load (repeatable; later files win)
    #[arg(
        short = 'c',
        long = "config",
        value_name = "PATH",
        global = true,
        env = "ALIASCONF_CONFIG",
        value_delimiter = ','
    )]
    pub config: Vec<PathBuf>,

    /// Merge environment variables starting with this prefix over the files
    #[arg(long, value_name = "PREFIX", global = true)]
    pub env_prefix: Option<String>,

    /// Rewrite environment paths that go through aliases onto their targets
    #[arg(long, global = true)]
    pub env_aliases: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Command {
    /// Print the value at a path
    Get(GetCommand),

    /// Check whether a path resolves
    Has(HasCommand),

    /// Print every value matching a path, best match first
    All(AllCommand),

    /// Print the whole configuration
    Dump(DumpCommand),

    /// List every node that declares aliases
    Aliases(AliasesCommand),

    /// Expand the template stored at a path
    Format(FormatCommand),

    /// Generate shell completion scripts
    Completions(CompletionsCommand),
}

/// Serialization format for structured output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// YAML
    #[default]
    Yaml,
    /// Pretty-printed JSON
    Json,
}
