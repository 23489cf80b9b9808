//! Command to print every match for a path.

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::utils::{display_value, load_configuration, parse_path, GlobalOptions};
use aliasconf::resolver::resolve_ranked;
use clap::Args;

/// Print every node a path matches, best match first.
#[derive(Args)]
pub struct AllCommand {
    /// Dotted path to match
    #[arg(value_name = "PATH")]
    pub path: String,

    /// Include each match's priority score
    #[arg(long)]
    pub scores: bool,

    /// Format for list and map values
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

impl AllCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let path = parse_path(&self.path)?;
        let config = load_configuration(global)?;
        let tree = config.tree();

        let matches = resolve_ranked(&tree, &path);
        if matches.is_empty() {
            return Err(CliError::SemanticFailure(format!(
                "Path '{path}' does not resolve"
            )));
        }

        for candidate in matches {
            let value = tree.effective_value(candidate.node);
            let text = display_value(&value, self.format)?;
            let key_path = tree.key_path(candidate.node);
            if self.scores {
                println!("{key_path} = {text}\t(score {})", candidate.score);
            } else {
                println!("{key_path} = {text}");
            }
        }
        Ok(())
    }
}
