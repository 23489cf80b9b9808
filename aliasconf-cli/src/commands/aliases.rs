//! Command to list declared aliases.

use crate::error::CliError;
use crate::utils::{load_configuration, GlobalOptions};
use clap::Args;

/// List every node that declares aliases, one per line.
#[derive(Args)]
pub struct AliasesCommand {}

impl AliasesCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global)?;
        for (path, aliases) in config.aliases() {
            println!("{path}: {}", aliases.join(", "));
        }
        Ok(())
    }
}
