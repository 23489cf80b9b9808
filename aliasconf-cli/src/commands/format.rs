//! Command to expand a stored template.

use crate::error::CliError;
use crate::utils::{load_configuration, parse_context, parse_path, GlobalOptions};
use clap::Args;

/// Read the template at a path and expand its `{placeholders}`.
///
/// Placeholders are filled from `--set` values first, then from the
/// configuration itself. Unresolved placeholders are left as written.
#[derive(Args)]
pub struct FormatCommand {
    /// Dotted path of the template
    #[arg(value_name = "PATH")]
    pub path: String,

    /// Placeholder value (repeatable)
    #[arg(short = 's', long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,
}

impl FormatCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let path = parse_path(&self.path)?;
        let context = parse_context(&self.set)?;
        let config = load_configuration(global)?;

        println!("{}", config.get_formatted(&path, &context)?);
        Ok(())
    }
}
