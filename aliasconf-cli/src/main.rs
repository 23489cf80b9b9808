//! Main entry point for the aliasconf CLI.
//!
//! This is the command-line front end for alias-aware configuration files.
//! It provides commands for querying configuration:
//! - `get`: Print the value at a path
//! - `has`: Check whether a path resolves
//! - `all`: Print every match for a path
//! - `dump`: Print the merged configuration
//! - `aliases`: List declared aliases
//! - `format`: Expand a stored template

mod cli;
mod commands;
mod error;
mod utils;

use clap::Parser;
use cli::Cli;
use utils::GlobalOptions;

fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Route library logging through our stderr logger
    let _ = aliasconf::init_logger(cli.verbose, cli.quiet).install();

    let global = GlobalOptions {
        quiet: cli.quiet,
        config_files: cli.config,
        env_prefix: cli.env_prefix,
        env_aliases: cli.env_aliases,
    };

    let result = match cli.command {
        cli::Command::Get(cmd) => cmd.execute(&global),
        cli::Command::Has(cmd) => cmd.execute(&global),
        cli::Command::All(cmd) => cmd.execute(&global),
        cli::Command::Dump(cmd) => cmd.execute(&global),
        cli::Command::Aliases(cmd) => cmd.execute(&global),
        cli::Command::Format(cmd) => cmd.execute(&global),
        cli::Command::Completions(cmd) => cmd.execute(&global),
    };

    // Handle errors and set exit code
    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
