//! Command to print the whole configuration.

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::utils::{load_configuration, serialize, GlobalOptions};
use clap::Args;

/// Print the merged configuration.
#[derive(Args)]
pub struct DumpCommand {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
    pub format: OutputFormat,

    /// Keep `aliases` entries in the output
    #[arg(long)]
    pub aliases: bool,
}

impl DumpCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global)?;
        println!("{}", serialize(&config.to_value(self.aliases), self.format)?);
        Ok(())
    }
}
