//! The [`Config`] façade.
//!
//! A `Config` owns an immutable snapshot (tree plus resolution cache).
//! Readers load the current snapshot without locking. Every mutation builds
//! a complete new snapshot from the serialized data and swaps it in, so a
//! reader sees either the old configuration or the new one, never a mix.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwap;
use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};

use crate::builder::build;
use crate::cache::{CacheStats, ResolutionCache, DEFAULT_LRU_CAPACITY};
use crate::config::environment::{canonical_path, rewrite_aliases, set_nested, EnvLoader};
use crate::config::loader::{ConfigFormat, ConfigLoader};
use crate::config::merger::deep_merge;
use crate::convert::FromValue;
use crate::error::{Error, Result};
use crate::format::Formatter;
use crate::node::{NodeId, Tree, ALIASES_KEY, VALUE_KEY};
use crate::path::{ConfigPath, IntoConfigPath};
use crate::resolver;

/// How externally loaded data is combined with the current configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Deep-merge: maps merge key by key, other values are replaced.
    #[default]
    Replace,
    /// Every top-level key in the new data replaces the existing subtree
    /// wholesale.
    Override,
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Replace => write!(f, "replace"),
            Self::Override => write!(f, "override"),
        }
    }
}

impl FromStr for MergeStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "replace" => Ok(Self::Replace),
            "override" => Ok(Self::Override),
            _ => Err(Error::validation(
                "merge_strategy",
                format!("unknown merge strategy '{s}', expected 'replace' or 'override'"),
            )),
        }
    }
}

#[derive(Debug)]
struct Snapshot {
    tree: Arc<Tree>,
    cache: ResolutionCache,
}

impl Snapshot {
    fn new(tree: Arc<Tree>, lru_capacity: usize) -> Self {
        let mut cache = ResolutionCache::new(lru_capacity);
        cache.initialize(&tree);
        Self { tree, cache }
    }

    fn resolve(&self, path: &ConfigPath) -> Option<NodeId> {
        self.cache.resolve_best(&self.tree, path)
    }

    fn require(&self, path: &ConfigPath) -> Result<NodeId> {
        self.resolve(path)
            .ok_or_else(|| Error::not_found(path.to_string()))
    }
}

/// Alias-aware configuration with typed access.
///
/// # Examples
///
/// ```
/// use aliasconf::Config;
///
/// let config = Config::from_yaml_str(
///     "python:\n  aliases: [py, python3]\n  timeout: 30\n",
/// )
/// .unwrap();
///
/// let timeout: i64 = config.get("py.timeout").unwrap();
/// assert_eq!(timeout, 30);
/// assert_eq!(config.get::<i64>("python3.timeout").unwrap(), 30);
/// assert!(config.has("python.timeout"));
/// ```
#[derive(Debug)]
pub struct Config {
    snapshot: ArcSwap<Snapshot>,
    lru_capacity: usize,
    writer: Mutex<()>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// An empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::from_tree(Tree::new(), DEFAULT_LRU_CAPACITY)
    }

    fn from_tree(tree: Tree, lru_capacity: usize) -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(Snapshot::new(Arc::new(tree), lru_capacity)),
            lru_capacity,
            writer: Mutex::new(()),
        }
    }

    /// Build from a nested map.
    ///
    /// # Errors
    ///
    /// Returns a structure error if `source` is not a valid configuration
    /// map.
    pub fn from_value(source: &Value) -> Result<Self> {
        Self::with_capacity(source, DEFAULT_LRU_CAPACITY)
    }

    /// Build from a nested map, keeping at most `lru_capacity` resolved
    /// paths cached.
    ///
    /// # Errors
    ///
    /// Same as [`Config::from_value`].
    pub fn with_capacity(source: &Value, lru_capacity: usize) -> Result<Self> {
        Ok(Self::from_tree(build(source)?, lru_capacity))
    }

    /// Parse a YAML document.
    ///
    /// # Errors
    ///
    /// Returns a parse error for malformed YAML or a structure error for
    /// invalid configuration.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Self::from_value(&ConfigLoader::parse_str(text, ConfigFormat::Yaml, "<string>")?)
    }

    /// Parse a JSON document.
    ///
    /// # Errors
    ///
    /// Returns a parse error for malformed JSON or a structure error for
    /// invalid configuration.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Self::from_value(&ConfigLoader::parse_str(text, ConfigFormat::Json, "<string>")?)
    }

    /// Load a YAML or JSON file.
    ///
    /// # Errors
    ///
    /// See [`ConfigLoader::load_file`] and [`Config::from_value`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_value(&ConfigLoader::load_file(path.as_ref())?)
    }

    /// Load several files, later files deep-merged over earlier ones.
    ///
    /// # Errors
    ///
    /// See [`ConfigLoader::load_all`] and [`Config::from_value`].
    pub fn from_files<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        Self::from_value(&ConfigLoader::load_all(paths)?)
    }

    fn load(&self) -> arc_swap::Guard<Arc<Snapshot>> {
        self.snapshot.load()
    }

    /// Read `path` as `T`.
    ///
    /// A node that only wraps a `value` child (as created by
    /// [`Config::add_alias`] on a scalar) reads as that child.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an invalid path or a value that does
    /// not convert, and a resolver error if nothing matches.
    pub fn get<T: FromValue>(&self, path: impl IntoConfigPath) -> Result<T> {
        let path = path.into_config_path()?;
        let snapshot = self.load();
        let node = snapshot.require(&path)?;
        T::from_value(snapshot.tree.effective_value(node).as_ref())
    }

    /// Read `path` as `T`, or return `default` when nothing matches or the
    /// value is null.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an invalid path or a value that does
    /// not convert.
    ///
    /// # Examples
    ///
    /// ```
    /// use aliasconf::Config;
    ///
    /// let config = Config::from_yaml_str("app:\n  name: demo\n").unwrap();
    /// assert_eq!(config.get_or("app.port", 8080_i64).unwrap(), 8080);
    /// assert_eq!(config.get_or("app.name", String::new()).unwrap(), "demo");
    /// ```
    pub fn get_or<T: FromValue>(&self, path: impl IntoConfigPath, default: T) -> Result<T> {
        let path = path.into_config_path()?;
        let snapshot = self.load();
        let Some(node) = snapshot.resolve(&path) else {
            return Ok(default);
        };
        match snapshot.tree.effective_value(node).as_ref() {
            Value::Null => Ok(default),
            value => T::from_value(value),
        }
    }

    /// Read every node matching `path` as `T`, best match first.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an invalid path or any value that
    /// does not convert.
    pub fn get_all<T: FromValue>(&self, path: impl IntoConfigPath) -> Result<Vec<T>> {
        let path = path.into_config_path()?;
        let snapshot = self.load();
        resolver::resolve_ranked(&snapshot.tree, &path)
            .into_iter()
            .map(|candidate| T::from_value(snapshot.tree.effective_value(candidate.node).as_ref()))
            .collect()
    }

    /// Deserialize the subtree at `path` into any serde type.
    ///
    /// # Errors
    ///
    /// Returns a resolver error if nothing matches and a validation error if
    /// the subtree does not fit `T`.
    pub fn extract<T: DeserializeOwned>(&self, path: impl IntoConfigPath) -> Result<T> {
        let path = path.into_config_path()?;
        let snapshot = self.load();
        let node = snapshot.require(&path)?;
        serde_yaml::from_value(snapshot.tree.value_of(node).into_owned())
            .map_err(|e| Error::validation(path.to_string(), e.to_string()))
    }

    /// Whether `path` resolves to anything. Invalid paths resolve to
    /// nothing.
    pub fn has(&self, path: impl IntoConfigPath) -> bool {
        path.into_config_path()
            .map(|path| self.load().resolve(&path).is_some())
            .unwrap_or(false)
    }

    /// The key path of the node `path` resolves to.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an invalid path and a resolver error
    /// if nothing matches.
    ///
    /// # Examples
    ///
    /// ```
    /// use aliasconf::Config;
    ///
    /// let config = Config::from_yaml_str("langs:\n  cpp:\n    aliases: [c++, cxx]\n    compiler: g++\n").unwrap();
    /// assert_eq!(config.resolve("cxx.compiler").unwrap().to_string(), "langs.cpp.compiler");
    /// ```
    pub fn resolve(&self, path: impl IntoConfigPath) -> Result<ConfigPath> {
        let path = path.into_config_path()?;
        let snapshot = self.load();
        let node = snapshot.require(&path)?;
        Ok(snapshot.tree.key_path(node))
    }

    /// Read `path` as a template and expand its placeholders.
    ///
    /// Placeholders are looked up in `context` first, then in the
    /// configuration, preferring nodes near the template itself.
    ///
    /// # Errors
    ///
    /// Same as [`Config::get`] for the template value.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::HashMap;
    /// use aliasconf::Config;
    ///
    /// let config = Config::from_yaml_str(
    ///     "python:\n  aliases: [py]\n  bin: python3\n  command: '{bin} {script}'\n",
    /// )
    /// .unwrap();
    /// let context = HashMap::from([("script".to_string(), "test.py".to_string())]);
    /// assert_eq!(config.get_formatted("py.command", &context).unwrap(), "python3 test.py");
    /// ```
    pub fn get_formatted(
        &self,
        path: impl IntoConfigPath,
        context: &HashMap<String, String>,
    ) -> Result<String> {
        let path = path.into_config_path()?;
        let snapshot = self.load();
        let node = snapshot.require(&path)?;
        let template = String::from_value(snapshot.tree.effective_value(node).as_ref())?;

        Ok(Formatter::new(&snapshot.tree)
            .with_cache(&snapshot.cache)
            .from_node(node)
            .format(&template, context))
    }

    /// Serialize back to a nested map.
    #[must_use]
    pub fn to_value(&self, include_aliases: bool) -> Value {
        self.load().tree.to_value(include_aliases)
    }

    /// The current tree.
    #[must_use]
    pub fn tree(&self) -> Arc<Tree> {
        Arc::clone(&self.load().tree)
    }

    /// Every node that declares aliases, with its key path and aliases.
    #[must_use]
    pub fn aliases(&self) -> Vec<(ConfigPath, Vec<String>)> {
        let snapshot = self.load();
        let tree = &snapshot.tree;
        tree.walk()
            .into_iter()
            .filter(|&id| !tree.node(id).aliases().is_empty())
            .map(|id| (tree.key_path(id), tree.node(id).aliases().to_vec()))
            .collect()
    }

    /// A new configuration with `other` deep-merged over this one.
    ///
    /// # Errors
    ///
    /// Returns a structure error if the merged data is invalid.
    pub fn merge(&self, other: &Config) -> Result<Config> {
        let merged = deep_merge(&self.to_value(true), &other.to_value(true));
        Self::with_capacity(&merged, self.lru_capacity)
    }

    /// Set `path` to `value`.
    ///
    /// Components that name an existing node through an alias are written
    /// to that node; missing levels are created as maps.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an invalid path and a structure error
    /// if the result is not a valid configuration.
    pub fn set(&self, path: impl IntoConfigPath, value: impl Into<Value>) -> Result<()> {
        let path = path.into_config_path()?;
        let value = value.into();
        self.update(|tree, data| {
            let target = canonical_path(tree, path.components());
            set_nested(data, &target, value);
            Ok(())
        })
    }

    /// Make `alias_path` another name for `target_path`.
    ///
    /// Both paths must have the same depth. Wherever a component of
    /// `alias_path` differs from `target_path`, the differing name becomes
    /// an alias of the target node at that depth. A scalar target is
    /// wrapped as `{value: <scalar>, aliases: [..]}`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the depths differ, the target does not
    /// exist, or an alias would have to be attached to a list.
    ///
    /// # Examples
    ///
    /// ```
    /// use aliasconf::Config;
    ///
    /// let config = Config::from_yaml_str("database:\n  host: localhost\n").unwrap();
    /// config.add_alias("db.host", "database.host").unwrap();
    /// assert_eq!(config.get::<String>("db.host").unwrap(), "localhost");
    /// ```
    pub fn add_alias(
        &self,
        alias_path: impl IntoConfigPath,
        target_path: impl IntoConfigPath,
    ) -> Result<()> {
        let alias = alias_path.into_config_path()?;
        let target = target_path.into_config_path()?;
        if alias.len() != target.len() {
            return Err(Error::validation(
                alias.to_string(),
                format!(
                    "alias path depth ({}) must match target path depth ({})",
                    alias.len(),
                    target.len()
                ),
            ));
        }

        self.update(|_, data| {
            let targets = target.components();
            if lookup(data, targets).is_none() {
                return Err(Error::validation(
                    target.to_string(),
                    "target path does not exist",
                ));
            }

            for (depth, (alias_key, target_key)) in alias.iter().zip(targets).enumerate() {
                if alias_key == target_key {
                    continue;
                }
                let node = lookup_mut(data, &targets[..=depth]).ok_or_else(|| {
                    Error::validation(target.to_string(), "target path does not exist")
                })?;
                attach_alias(node, alias_key, &target)?;
            }
            Ok(())
        })
    }

    /// Merge `overlay` into the configuration using `strategy`.
    ///
    /// # Errors
    ///
    /// Returns a structure error if the result is not a valid
    /// configuration.
    pub fn merge_value(&self, overlay: &Value, strategy: MergeStrategy) -> Result<()> {
        self.update(|_, data| {
            match (strategy, overlay) {
                (MergeStrategy::Override, Value::Mapping(entries)) => {
                    if let Value::Mapping(current) = data {
                        for (key, value) in entries {
                            current.insert(key.clone(), value.clone());
                        }
                    }
                }
                _ => *data = deep_merge(data, overlay),
            }
            Ok(())
        })
    }

    /// Load environment variables with `loader` and merge them in.
    ///
    /// # Errors
    ///
    /// Returns a structure error if the result is not a valid
    /// configuration.
    pub fn load_env(&self, loader: &EnvLoader, strategy: MergeStrategy) -> Result<()> {
        let mut env_data = loader.load();
        if is_empty_map(&env_data) {
            log::debug!("no environment variables with prefix '{}'", loader.prefix());
            return Ok(());
        }
        if loader.resolves_aliases() {
            env_data = rewrite_aliases(&self.load().tree, &env_data);
        }
        self.merge_value(&env_data, strategy)
    }

    /// Drop every cached resolution and rebuild the path index.
    pub fn clear_cache(&self) {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let tree = Arc::clone(&self.load().tree);
        self.snapshot
            .store(Arc::new(Snapshot::new(tree, self.lru_capacity)));
    }

    /// Resolution cache counters for the current snapshot.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.load().cache.stats()
    }

    /// Apply `edit` to the serialized configuration (aliases included) and
    /// swap in a snapshot built from the result.
    fn update<F>(&self, edit: F) -> Result<()>
    where
        F: FnOnce(&Tree, &mut Value) -> Result<()>,
    {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let current = self.load_full();
        let mut data = current.tree.to_value(true);
        edit(&current.tree, &mut data)?;

        let tree = build(&data)?;
        log::debug!("configuration rebuilt with {} nodes", tree.len());
        self.snapshot
            .store(Arc::new(Snapshot::new(Arc::new(tree), self.lru_capacity)));
        Ok(())
    }

    fn load_full(&self) -> Arc<Snapshot> {
        self.snapshot.load_full()
    }
}

fn is_empty_map(value: &Value) -> bool {
    matches!(value, Value::Mapping(map) if map.is_empty())
}

fn child<'v>(value: &'v Value, key: &str) -> Option<&'v Value> {
    match value {
        Value::Mapping(map) => map.get(key),
        Value::Sequence(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn child_mut<'v>(value: &'v mut Value, key: &str) -> Option<&'v mut Value> {
    match value {
        Value::Mapping(map) => map.get_mut(key),
        Value::Sequence(items) => key.parse::<usize>().ok().and_then(|i| items.get_mut(i)),
        _ => None,
    }
}

fn lookup<'v>(data: &'v Value, path: &[String]) -> Option<&'v Value> {
    path.iter().try_fold(data, |current, key| child(current, key))
}

fn lookup_mut<'v>(data: &'v mut Value, path: &[String]) -> Option<&'v mut Value> {
    path.iter().try_fold(data, |current, key| child_mut(current, key))
}

fn attach_alias(node: &mut Value, alias: &str, target: &ConfigPath) -> Result<()> {
    match node {
        Value::Mapping(map) => {
            let entry = map
                .entry(Value::from(ALIASES_KEY))
                .or_insert_with(|| Value::Sequence(Vec::new()));
            let Value::Sequence(names) = entry else {
                return Err(Error::validation(
                    target.to_string(),
                    "existing aliases entry is not a list",
                ));
            };
            if !names.iter().any(|name| name.as_str() == Some(alias)) {
                names.push(Value::from(alias));
            }
            Ok(())
        }
        Value::Sequence(_) => Err(Error::validation(
            target.to_string(),
            "aliases cannot be attached to a list",
        )),
        scalar => {
            let mut wrapper = Mapping::new();
            wrapper.insert(Value::from(VALUE_KEY), std::mem::take(scalar));
            wrapper.insert(
                Value::from(ALIASES_KEY),
                Value::Sequence(vec![Value::from(alias)]),
            );
            *scalar = Value::Mapping(wrapper);
            Ok(())
        }
    }
}
