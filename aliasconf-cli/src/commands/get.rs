//! Command to print the value at a path.

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::utils::{display_value, load_configuration, parse_path, GlobalOptions};
use aliasconf::convert::convert;
use aliasconf::{Value, ValueType};
use clap::Args;

/// Print the value a path resolves to.
#[derive(Args)]
pub struct GetCommand {
    /// Dotted path to read (aliases and partial paths are accepted)
    #[arg(value_name = "PATH")]
    pub path: String,

    /// Convert the value before printing (str, int, bool, float, list, map)
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    pub value_type: Option<String>,

    /// Print this value instead of failing when the path does not resolve
    #[arg(long, value_name = "VALUE")]
    pub default: Option<String>,

    /// Prefix the value with the key path it was found at
    #[arg(long)]
    pub show_path: bool,

    /// Format for list and map values
    #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
    pub format: OutputFormat,
}

impl GetCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let path = parse_path(&self.path)?;
        let value_type = self
            .value_type
            .as_deref()
            .map(ValueType::parse)
            .transpose()
            .map_err(|e| CliError::InvalidArguments(e.to_string()))?;

        let config = load_configuration(global)?;
        let (resolved, value) = match config.resolve(&path) {
            Ok(resolved) => {
                let value: Value = config.get(&path)?;
                (Some(resolved), value)
            }
            Err(e) if e.is_not_found() => match self.default {
                Some(default) => (None, Value::String(default)),
                None => return Err(e.into()),
            },
            Err(e) => return Err(e.into()),
        };

        let value = match value_type {
            Some(target) => convert(&value, target)?,
            None => value,
        };
        let text = display_value(&value, self.format)?;

        match resolved {
            Some(resolved) if self.show_path => println!("{resolved} = {text}"),
            _ => println!("{text}"),
        }
        Ok(())
    }
}
