//! Command to check whether a path resolves.

use crate::error::CliError;
use crate::utils::{load_configuration, parse_path, GlobalOptions};
use clap::Args;

/// Check whether a path resolves; exits with 1 if it does not.
#[derive(Args)]
pub struct HasCommand {
    /// Dotted path to check
    #[arg(value_name = "PATH")]
    pub path: String,
}

impl HasCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let path = parse_path(&self.path)?;
        let config = load_configuration(global)?;

        match config.resolve(&path) {
            Ok(resolved) => {
                if !global.quiet {
                    println!("{resolved}");
                }
                Ok(())
            }
            Err(e) if e.is_not_found() => Err(CliError::SemanticFailure(format!(
                "Path '{path}' does not resolve"
            ))),
            Err(e) => Err(e.into()),
        }
    }
}
