//! Validated configuration paths.
//!
//! A [`ConfigPath`] is an ordered list of non-empty components. It can be
//! parsed from a dotted string (`"python.timeout"`), built from a list of
//! strings, or from a mix of string and integer components (integers address
//! list elements and are stringified).

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// An ordered sequence of non-empty path components.
///
/// # Examples
///
/// ```
/// use aliasconf::ConfigPath;
///
/// let path = ConfigPath::parse("python.timeout").unwrap();
/// assert_eq!(path.len(), 2);
/// assert_eq!(path.to_string(), "python.timeout");
///
/// assert!(ConfigPath::parse("python..timeout").is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConfigPath {
    components: Vec<String>,
}

/// A single component used when building a path from mixed parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathComponent {
    /// A named key.
    Key(String),
    /// A list index.
    Index(i64),
}

impl From<&str> for PathComponent {
    fn from(s: &str) -> Self {
        Self::Key(s.to_string())
    }
}

impl From<String> for PathComponent {
    fn from(s: String) -> Self {
        Self::Key(s)
    }
}

impl From<i64> for PathComponent {
    fn from(i: i64) -> Self {
        Self::Index(i)
    }
}

impl From<usize> for PathComponent {
    fn from(i: usize) -> Self {
        Self::Index(i64::try_from(i).unwrap_or(i64::MAX))
    }
}

impl ConfigPath {
    /// The empty path. Resolving it always yields no matches.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            components: Vec::new(),
        }
    }

    /// Parse a dotted path string.
    ///
    /// Components are trimmed of surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the string is blank or has a leading,
    /// trailing, or doubled dot.
    pub fn parse(dotted: &str) -> Result<Self> {
        if dotted.trim().is_empty() {
            return Err(Error::validation("path", "path cannot be an empty string"));
        }

        let parts: Vec<&str> = dotted.split('.').collect();
        let last = parts.len() - 1;
        let mut components = Vec::with_capacity(parts.len());
        for (i, part) in parts.into_iter().enumerate() {
            let part = part.trim();
            if part.is_empty() {
                let message = if i == 0 {
                    "path cannot start with a dot"
                } else if i == last {
                    "path cannot end with a dot"
                } else {
                    "path cannot contain empty components (double dots)"
                };
                return Err(Error::validation(dotted, message));
            }
            components.push(part.to_string());
        }

        Ok(Self { components })
    }

    /// Build a path from string and integer components.
    ///
    /// # Errors
    ///
    /// Returns a validation error if there are no components or any
    /// component is blank.
    ///
    /// # Examples
    ///
    /// ```
    /// use aliasconf::{ConfigPath, PathComponent};
    ///
    /// let path = ConfigPath::from_components([
    ///     PathComponent::from("servers"),
    ///     PathComponent::from(0usize),
    ///     PathComponent::from("host"),
    /// ])
    /// .unwrap();
    /// assert_eq!(path.to_string(), "servers.0.host");
    /// ```
    pub fn from_components<I, C>(parts: I) -> Result<Self>
    where
        I: IntoIterator<Item = C>,
        C: Into<PathComponent>,
    {
        let mut components = Vec::new();
        for part in parts {
            let text = match part.into() {
                PathComponent::Key(key) => key.trim().to_string(),
                PathComponent::Index(index) => index.to_string(),
            };
            if text.is_empty() {
                return Err(Error::validation("path", "path parts cannot be empty"));
            }
            components.push(text);
        }

        if components.is_empty() {
            return Err(Error::validation("path", "path cannot be empty"));
        }

        Ok(Self { components })
    }

    /// The components of this path.
    #[must_use]
    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Number of components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether this is the empty path.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// The first component, if any.
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        self.components.first().map(String::as_str)
    }

    /// Iterate over components.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.components.iter().map(String::as_str)
    }

    /// Return a new path with `component` appended.
    #[must_use]
    pub fn join(&self, component: &str) -> Self {
        let mut components = self.components.clone();
        components.push(component.to_string());
        Self { components }
    }

    pub(crate) fn from_trusted(components: Vec<String>) -> Self {
        Self { components }
    }
}

impl fmt::Display for ConfigPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.components.join("."))
    }
}

impl FromStr for ConfigPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Conversion into a validated [`ConfigPath`].
///
/// Implemented for dotted strings, string lists and paths themselves so that
/// accessors can take whichever form is at hand.
pub trait IntoConfigPath {
    /// Convert into a path.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the input is not a valid path.
    fn into_config_path(self) -> Result<ConfigPath>;
}

impl IntoConfigPath for ConfigPath {
    fn into_config_path(self) -> Result<ConfigPath> {
        Ok(self)
    }
}

impl IntoConfigPath for &ConfigPath {
    fn into_config_path(self) -> Result<ConfigPath> {
        Ok(self.clone())
    }
}

impl IntoConfigPath for &str {
    fn into_config_path(self) -> Result<ConfigPath> {
        ConfigPath::parse(self)
    }
}

impl IntoConfigPath for String {
    fn into_config_path(self) -> Result<ConfigPath> {
        ConfigPath::parse(&self)
    }
}

impl IntoConfigPath for &String {
    fn into_config_path(self) -> Result<ConfigPath> {
        ConfigPath::parse(self)
    }
}

impl IntoConfigPath for &[&str] {
    fn into_config_path(self) -> Result<ConfigPath> {
        ConfigPath::from_components(self.iter().copied())
    }
}

impl<const N: usize> IntoConfigPath for [&str; N] {
    fn into_config_path(self) -> Result<ConfigPath> {
        ConfigPath::from_components(self)
    }
}

impl IntoConfigPath for Vec<&str> {
    fn into_config_path(self) -> Result<ConfigPath> {
        ConfigPath::from_components(self)
    }
}

impl IntoConfigPath for Vec<String> {
    fn into_config_path(self) -> Result<ConfigPath> {
        ConfigPath::from_components(self)
    }
}

impl IntoConfigPath for Vec<PathComponent> {
    fn into_config_path(self) -> Result<ConfigPath> {
        ConfigPath::from_components(self)
    }
}
