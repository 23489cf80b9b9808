//! Library exports for aliasconf-cli.
//!
//! This module exports the CLI structure so that documentation tooling can
//! inspect the command tree.

pub mod cli;
pub mod commands;
pub mod error;
pub mod utils;

pub use cli::Cli;
