//! `{placeholder}` expansion backed by configuration lookups.
//!
//! A placeholder is a run of word characters and dots in braces, such as
//! `{script}` or `{python.timeout}`. Each one is looked up in the caller's
//! context first and then in the tree. Replacement text may itself contain
//! placeholders, so expansion repeats until nothing changes, up to
//! [`MAX_PASSES`] times. Placeholders that cannot be resolved are left as
//! written.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex_lite::{Captures, Regex};
use serde_yaml::Value;

use crate::cache::ResolutionCache;
use crate::convert::render;
use crate::node::{NodeId, Tree};
use crate::path::ConfigPath;
use crate::resolver;

/// Maximum number of expansion passes over a template.
pub const MAX_PASSES: usize = 5;

const PLACEHOLDER_PATTERN: &str = r"\{([\w.]+)\}";

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(PLACEHOLDER_PATTERN).expect("placeholder pattern is a valid regex")
    })
}

/// Names of the placeholders in `template`, in order of appearance.
///
/// # Examples
///
/// ```
/// use aliasconf::format::placeholders;
///
/// assert_eq!(placeholders("{python.cmd} {script}"), ["python.cmd", "script"]);
/// ```
#[must_use]
pub fn placeholders(template: &str) -> Vec<String> {
    placeholder_regex()
        .captures_iter(template)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Expands templates against a tree.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
///
/// use aliasconf::builder::build;
/// use aliasconf::format::Formatter;
///
/// let source = serde_yaml::from_str("python:\n  bin: python3\n  command: '{bin} {script}'\n").unwrap();
/// let tree = build(&source).unwrap();
///
/// let context = HashMap::from([("script".to_string(), "test.py".to_string())]);
/// let text = Formatter::new(&tree).format("{python.command}", &context);
/// assert_eq!(text, "python3 test.py");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Formatter<'t> {
    tree: &'t Tree,
    cache: Option<&'t ResolutionCache>,
    origin: Option<NodeId>,
}

impl<'t> Formatter<'t> {
    /// A formatter that resolves placeholders anywhere in `tree`.
    #[must_use]
    pub fn new(tree: &'t Tree) -> Self {
        Self {
            tree,
            cache: None,
            origin: None,
        }
    }

    /// Resolve dotted placeholders through `cache`.
    #[must_use]
    pub fn with_cache(mut self, cache: &'t ResolutionCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Prefer nodes close to `origin` for bare placeholders.
    ///
    /// Typically `origin` is the node the template was read from, so that
    /// `{bin}` inside `python.command` finds `python.bin` before any other
    /// `bin` in the tree.
    #[must_use]
    pub fn from_node(mut self, origin: NodeId) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Expand every resolvable placeholder in `template`.
    #[must_use]
    pub fn format(&self, template: &str, context: &HashMap<String, String>) -> String {
        let re = placeholder_regex();
        let mut text = template.to_string();
        for pass in 0..MAX_PASSES {
            let next = re
                .replace_all(&text, |caps: &Captures<'_>| {
                    self.lookup(&caps[1], context)
                        .unwrap_or_else(|| caps[0].to_string())
                })
                .into_owned();
            if next == text {
                return text;
            }
            log::trace!("format pass {} expanded '{text}' to '{next}'", pass + 1);
            text = next;
        }

        if re.is_match(&text) {
            log::debug!("template still has placeholders after {MAX_PASSES} passes: '{text}'");
        }
        text
    }

    fn lookup(&self, key: &str, context: &HashMap<String, String>) -> Option<String> {
        if let Some(value) = context.get(key) {
            return Some(value.clone());
        }

        let node = if key.contains('.') {
            let path = ConfigPath::parse(key).ok()?;
            match self.cache {
                Some(cache) => cache.resolve_best(self.tree, &path),
                None => resolver::resolve_best(self.tree, &path),
            }
        } else {
            self.origin
                .and_then(|origin| self.tree.nearest_by_key(origin, key))
                .filter(|&id| id != self.tree.root())
                .or_else(|| {
                    let path = ConfigPath::from_trusted(vec![key.to_string()]);
                    resolver::resolve_best(self.tree, &path)
                })
        }?;

        match self.tree.effective_value(node).as_ref() {
            Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
            scalar => Some(render(scalar)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;

    fn tree(text: &str) -> Tree {
        build(&serde_yaml::from_str(text).unwrap()).unwrap()
    }

    fn context(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_placeholder_pattern_compiles() {
        let re = placeholder_regex();
        assert!(re.is_match("{python.timeout}"));
        assert!(!re.is_match("{ spaced }"));
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(placeholders("no placeholders"), Vec::<String>::new());
        assert_eq!(placeholders("{a}-{b.c}-{ d }"), ["a", "b.c"]);
    }

    #[test]
    fn test_context_wins_over_tree() {
        let t = tree("name: tree\n");
        let out = Formatter::new(&t).format("hi {name}", &context(&[("name", "ctx")]));
        assert_eq!(out, "hi ctx");
    }

    #[test]
    fn test_dotted_lookup_uses_aliases() {
        let t = tree("python:\n  aliases: [py]\n  timeout: 30\n");
        let out = Formatter::new(&t).format("wait {py.timeout}s", &HashMap::new());
        assert_eq!(out, "wait 30s");
    }

    #[test]
    fn test_nested_expansion() {
        let t = tree("name: Alice\ngreeting: 'Hello {name}'\nmessage: '{greeting}, welcome!'\n");
        let out = Formatter::new(&t).format("{message}", &HashMap::new());
        assert_eq!(out, "Hello Alice, welcome!");
    }

    #[test]
    fn test_unresolved_placeholders_left_in_place() {
        let t = tree("a: 1\n");
        let out = Formatter::new(&t).format("{a} {missing} {x.y}", &HashMap::new());
        assert_eq!(out, "1 {missing} {x.y}");
    }

    #[test]
    fn test_collections_are_not_substituted() {
        let t = tree("db:\n  host: h\nlist: [1, 2]\n");
        let out = Formatter::new(&t).format("{db} {list}", &HashMap::new());
        assert_eq!(out, "{db} {list}");
    }

    #[test]
    fn test_self_reference_stops_after_max_passes() {
        let t = tree("loop: 'x{loop}'\n");
        let out = Formatter::new(&t).format("{loop}", &HashMap::new());
        assert_eq!(out, format!("{}{{loop}}", "x".repeat(MAX_PASSES)));
    }

    #[test]
    fn test_origin_prefers_nearby_nodes() {
        let t = tree("bin: global\npython:\n  bin: python3\n  command: run\n");
        let python = t.node(t.root()).children()[1];
        let command = t.node(python).children()[1];

        let near = Formatter::new(&t).from_node(command).format("{bin}", &HashMap::new());
        assert_eq!(near, "python3");
        let anywhere = Formatter::new(&t).format("{bin}", &HashMap::new());
        assert_eq!(anywhere, "global");
    }

    #[test]
    fn test_with_cache() {
        let t = tree("python:\n  aliases: [py]\n  timeout: 30\n");
        let mut cache = ResolutionCache::default();
        cache.initialize(&t);
        let out = Formatter::new(&t)
            .with_cache(&cache)
            .format("{py.timeout}", &HashMap::new());
        assert_eq!(out, "30");
        assert_eq!(cache.cached_len(), 1);
    }
}
