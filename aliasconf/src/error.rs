//! Error types for the aliasconf library.
//!
//! Every failure the library reports is a variant of [`Error`], so callers
//! can catch "any aliasconf error" in one place. The four core categories
//! (`Structure`, `Node`, `Resolver`, `Validation`) come from tree building,
//! resolution and coercion; `Io` and `Parse` come from the file loaders.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for operations that may fail with an aliasconf error.
///
/// # Examples
///
/// ```
/// use aliasconf::{Error, Result};
///
/// fn example_operation() -> Result<i64> {
///     Ok(30)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the aliasconf library.
#[derive(Debug, Error)]
pub enum Error {
    /// The source data violates basic shape rules.
    ///
    /// Raised while building a tree: the top level is not a map, an
    /// `aliases` entry is not a list of strings, or a key is empty or
    /// reserved.
    #[error("structure error: {message}")]
    Structure {
        /// Description of the violation.
        message: String,
    },

    /// A tree invariant was violated while linking nodes.
    #[error("node error: {message}")]
    Node {
        /// Description of the violated invariant.
        message: String,
    },

    /// A path could not be resolved to any node.
    #[error("cannot resolve '{path}': {reason}")]
    Resolver {
        /// The dotted path that was requested.
        path: String,
        /// Why resolution failed.
        reason: String,
    },

    /// A value could not be converted, or an argument failed validation.
    #[error("validation error for '{field}': {message}")]
    Validation {
        /// The field, path or target type that failed validation.
        field: String,
        /// A description of the validation failure.
        message: String,
    },

    /// A configuration file could not be read.
    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        /// The file being read.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A configuration document could not be decoded.
    #[error("failed to parse {origin}: {message}")]
    Parse {
        /// Where the document came from (file path or "<string>").
        origin: String,
        /// The decoder's message.
        message: String,
    },
}

impl Error {
    pub(crate) fn structure(message: impl Into<String>) -> Self {
        Self::Structure {
            message: message.into(),
        }
    }

    pub(crate) fn node(message: impl Into<String>) -> Self {
        Self::Node {
            message: message.into(),
        }
    }

    pub(crate) fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub(crate) fn not_found(path: impl Into<String>) -> Self {
        Self::Resolver {
            path: path.into(),
            reason: "no matching configuration node".into(),
        }
    }

    /// Check if error indicates a path could not be resolved.
    ///
    /// # Examples
    ///
    /// ```
    /// use aliasconf::Error;
    ///
    /// let err = Error::Resolver {
    ///     path: "python.timeout".into(),
    ///     reason: "no matching configuration node".into(),
    /// };
    /// assert!(err.is_not_found());
    /// ```
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Resolver { .. })
    }

    /// Check if error is a coercion or argument validation failure.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}
