//! Environment variable ingestion.
//!
//! Variables such as `ALIASCONF_DATABASE__HOST=db.internal` become nested
//! data (`{database: {host: db.internal}}`) that can be merged over a
//! configuration. Keys are lower-cased. With the default `__` delimiter,
//! single underscores also separate levels, so `ALIASCONF_DB_HOST` reads as
//! `db.host`.

use std::env;

use serde_yaml::{Mapping, Value};

use crate::node::{NodeId, Tree, WILDCARD};

/// Default variable prefix.
pub const DEFAULT_PREFIX: &str = "ALIASCONF_";

/// Default nesting delimiter.
pub const DEFAULT_DELIMITER: &str = "__";

/// Loads configuration data from environment variables.
///
/// # Examples
///
/// ```
/// use aliasconf::config::EnvLoader;
///
/// let loader = EnvLoader::new("APP_");
/// let data = loader.load_from([
///     ("APP_DATABASE__PORT".to_string(), "5432".to_string()),
///     ("OTHER".to_string(), "ignored".to_string()),
/// ]);
/// let expected: serde_yaml::Value = serde_yaml::from_str("database:\n  port: 5432\n").unwrap();
/// assert_eq!(data, expected);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvLoader {
    prefix: String,
    delimiter: String,
    type_conversion: bool,
    resolve_aliases: bool,
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl EnvLoader {
    /// A loader for variables starting with `prefix`.
    ///
    /// An empty prefix loads every variable.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            delimiter: DEFAULT_DELIMITER.to_string(),
            type_conversion: true,
            resolve_aliases: false,
        }
    }

    /// Use `delimiter` to separate nesting levels.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Enable or disable conversion of values to bools, numbers and JSON.
    #[must_use]
    pub fn with_type_conversion(mut self, enabled: bool) -> Self {
        self.type_conversion = enabled;
        self
    }

    /// Rewrite paths that go through aliases onto the aliased keys before
    /// merging. See [`rewrite_aliases`].
    #[must_use]
    pub fn with_alias_resolution(mut self, enabled: bool) -> Self {
        self.resolve_aliases = enabled;
        self
    }

    /// The variable prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether alias rewriting is enabled.
    #[must_use]
    pub fn resolves_aliases(&self) -> bool {
        self.resolve_aliases
    }

    /// Load from the process environment.
    #[must_use]
    pub fn load(&self) -> Value {
        self.load_from(env::vars())
    }

    /// Load from an explicit set of variables.
    ///
    /// Variables are applied in sorted order so that overlapping keys give
    /// the same result on every run.
    #[must_use]
    pub fn load_from<I>(&self, vars: I) -> Value
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut vars: Vec<(String, String)> = vars
            .into_iter()
            .filter(|(key, _)| key.starts_with(&self.prefix))
            .collect();
        vars.sort();

        let mut result = Value::Mapping(Mapping::new());
        for (key, raw) in vars {
            let path = self.parse_key(&key[self.prefix.len()..]);
            if path.is_empty() {
                continue;
            }

            let value = if self.type_conversion {
                convert_env_value(&raw)
            } else {
                Value::String(raw)
            };
            log::trace!("environment variable {key} sets {}", path.join("."));
            set_nested(&mut result, &path, value);
        }
        result
    }

    /// Split a prefix-stripped variable name into lower-cased components.
    #[must_use]
    pub fn parse_key(&self, key: &str) -> Vec<String> {
        let parts: Vec<&str> = if self.delimiter == DEFAULT_DELIMITER {
            key.split(DEFAULT_DELIMITER)
                .flat_map(|part| part.split('_'))
                .collect()
        } else if self.delimiter.is_empty() {
            vec![key]
        } else {
            key.split(self.delimiter.as_str()).collect()
        };

        parts
            .into_iter()
            .filter(|part| !part.is_empty())
            .map(str::to_lowercase)
            .collect()
    }
}

/// Interpret an environment value.
///
/// `true`/`1` and `false`/`0` become bools, integers and decimals become
/// numbers, and text starting with `[` or `{` is tried as JSON. Anything
/// else stays a string.
///
/// # Examples
///
/// ```
/// use aliasconf::config::environment::convert_env_value;
/// use serde_yaml::Value;
///
/// assert_eq!(convert_env_value("1"), Value::Bool(true));
/// assert_eq!(convert_env_value("8080"), Value::from(8080));
/// assert_eq!(convert_env_value("0.5"), Value::from(0.5));
/// assert_eq!(convert_env_value("localhost"), Value::from("localhost"));
/// ```
#[must_use]
pub fn convert_env_value(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::String(String::new());
    }

    match raw.to_lowercase().as_str() {
        "true" | "1" => return Value::Bool(true),
        "false" | "0" => return Value::Bool(false),
        _ => {}
    }

    let trimmed = raw.trim();
    if trimmed.contains('.') {
        if let Ok(float) = trimmed.parse::<f64>() {
            return Value::from(float);
        }
    } else if let Ok(int) = trimmed.parse::<i64>() {
        return Value::from(int);
    }

    if raw.starts_with('[') || raw.starts_with('{') {
        if let Ok(parsed) = serde_json::from_str::<Value>(raw) {
            return parsed;
        }
    }

    Value::String(raw.to_string())
}

fn is_index(component: &str) -> bool {
    !component.is_empty() && component.bytes().all(|b| b.is_ascii_digit())
}

fn empty_container(next: &str) -> Value {
    if is_index(next) {
        Value::Sequence(Vec::new())
    } else {
        Value::Mapping(Mapping::new())
    }
}

/// Set `value` at `path` inside `data`, creating intermediate levels.
///
/// A numeric component under a list addresses a slot, growing the list
/// with nulls as needed. A missing level followed by a numeric component is
/// created as a list. Scalars in the way are replaced.
pub fn set_nested(data: &mut Value, path: &[String], value: Value) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };

    let mut current = data;
    for (i, key) in parents.iter().enumerate() {
        let next = path[i + 1].as_str();
        current = if current.is_sequence() && is_index(key) {
            let Value::Sequence(items) = current else {
                return;
            };
            let Ok(index) = key.parse::<usize>() else {
                return;
            };
            if items.len() <= index {
                items.resize(index + 1, Value::Null);
            }
            let slot = &mut items[index];
            if !matches!(slot, Value::Mapping(_) | Value::Sequence(_)) {
                *slot = empty_container(next);
            }
            slot
        } else {
            if !current.is_mapping() {
                *current = Value::Mapping(Mapping::new());
            }
            let Value::Mapping(map) = current else {
                return;
            };
            let slot = map
                .entry(Value::String(key.clone()))
                .or_insert_with(|| empty_container(next));
            if !matches!(slot, Value::Mapping(_) | Value::Sequence(_)) {
                *slot = Value::Mapping(Mapping::new());
            }
            slot
        };
    }

    match current {
        Value::Sequence(items) if is_index(last) => {
            if let Ok(index) = last.parse::<usize>() {
                if items.len() <= index {
                    items.resize(index + 1, Value::Null);
                }
                items[index] = value;
            }
        }
        Value::Mapping(map) => {
            map.insert(Value::String(last.clone()), value);
        }
        _ => {}
    }
}

/// Rewrite every leaf path in `data` so that components naming an alias
/// are replaced by the key of the node that declares it.
///
/// Paths are followed through `tree` one level at a time; once a component
/// has no counterpart in the tree, the rest of the path is kept as written.
/// A child whose key equals the component is preferred over one that only
/// declares it as an alias.
#[must_use]
pub fn rewrite_aliases(tree: &Tree, data: &Value) -> Value {
    let mut leaves = Vec::new();
    flatten(data, &mut Vec::new(), &mut leaves);

    let mut result = Value::Mapping(Mapping::new());
    for (path, value) in leaves {
        let canonical = canonical_path(tree, &path);
        if canonical != path {
            log::debug!(
                "environment path {} rewritten to {}",
                path.join("."),
                canonical.join(".")
            );
        }
        set_nested(&mut result, &canonical, value);
    }
    result
}

fn flatten(value: &Value, prefix: &mut Vec<String>, out: &mut Vec<(Vec<String>, Value)>) {
    match value {
        Value::Mapping(map) if !map.is_empty() => {
            for (key, child) in map {
                let Some(key) = key.as_str() else {
                    continue;
                };
                prefix.push(key.to_string());
                flatten(child, prefix, out);
                prefix.pop();
            }
        }
        leaf if !prefix.is_empty() => out.push((prefix.clone(), leaf.clone())),
        _ => {}
    }
}

pub(crate) fn canonical_path(tree: &Tree, path: &[String]) -> Vec<String> {
    let mut current: Option<NodeId> = Some(tree.root());
    path.iter()
        .map(|component| {
            let Some(parent) = current else {
                return component.clone();
            };
            let candidates = tree.matching_children(parent, component);
            let chosen = candidates
                .iter()
                .copied()
                .find(|&id| tree.node(id).key() == component)
                .or_else(|| candidates.first().copied());
            current = chosen;
            match chosen {
                Some(id) if component != WILDCARD => tree.node(id).key().to_string(),
                _ => component.clone(),
            }
        })
        .collect()
}
