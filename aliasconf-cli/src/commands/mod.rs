//! CLI command implementations.
//!
//! This module contains the implementations of all CLI commands:
//! - `get`: Print the value at a path
//! - `has`: Check whether a path resolves
//! - `all`: Print every match for a path, best first
//! - `dump`: Print the whole configuration
//! - `aliases`: List declared aliases
//! - `format`: Expand a stored template
//! - `completions`: Generate shell completion scripts

pub mod aliases;
pub mod all;
pub mod completions;
pub mod dump;
pub mod format;
pub mod get;
pub mod has;

pub use aliases::AliasesCommand;
pub use all::AllCommand;
pub use completions::CompletionsCommand;
pub use dump::DumpCommand;
pub use format::FormatCommand;
pub use get::GetCommand;
pub use has::HasCommand;
