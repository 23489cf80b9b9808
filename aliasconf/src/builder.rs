//! Building configuration trees from nested maps.
//!
//! [`build`] is the only way source data enters the library. Loaders for
//! files and environment variables first produce a plain nested
//! [`serde_yaml::Value`] and then hand it here.

use std::collections::{HashSet, VecDeque};

use serde_yaml::{Mapping, Value};

use crate::error::{Error, Result};
use crate::node::{NodeId, NodeValue, Tree, ALIASES_KEY};

/// Top-level keys reserved for internal use.
pub const RESERVED_KEYS: [&str; 2] = ["__aliasconf_internal__", "__meta__"];

/// A source fragment as seen by the builder.
enum Fragment<'a> {
    Scalar(&'a Value),
    Map(&'a Mapping),
    Sequence(&'a [Value]),
}

impl<'a> Fragment<'a> {
    fn classify(value: &'a Value) -> Self {
        match value {
            Value::Mapping(map) => Self::Map(map),
            Value::Sequence(items) => Self::Sequence(items),
            Value::Tagged(tagged) => Self::classify(&tagged.value),
            other => Self::Scalar(other),
        }
    }

    fn node_value(&self) -> NodeValue {
        match self {
            Self::Scalar(value) => NodeValue::Scalar((*value).clone()),
            Self::Map(_) => NodeValue::Map,
            Self::Sequence(_) => NodeValue::Sequence,
        }
    }
}

/// Build a tree from a nested map.
///
/// Each map level may carry an `aliases` list naming alternative keys for
/// the node that owns that map. Sequences become children keyed `"0"`,
/// `"1"`, and so on. The source is never modified.
///
/// # Errors
///
/// Returns a structure error if the source is not a map, if an `aliases`
/// entry is not a list of non-empty strings, or if a key is empty,
/// duplicated, reserved, or not a string/number/bool. A node error here
/// indicates a builder bug.
///
/// # Examples
///
/// ```
/// use aliasconf::builder::build;
///
/// let source = serde_yaml::from_str(
///     "python:\n  aliases: [py, python3]\n  timeout: 30\n",
/// )
/// .unwrap();
/// let tree = build(&source).unwrap();
/// let python = tree.node(tree.root()).children()[0];
/// assert!(tree.node(python).answers_to("py"));
/// assert_eq!(tree.node(python).children().len(), 1);
/// ```
pub fn build(source: &Value) -> Result<Tree> {
    let Fragment::Map(top) = Fragment::classify(source) else {
        return Err(Error::structure(format!(
            "only map data is supported at the top level, got {}",
            kind_of(source)
        )));
    };

    for reserved in RESERVED_KEYS {
        if top.contains_key(reserved) {
            return Err(Error::structure(format!(
                "configuration key '{reserved}' is reserved"
            )));
        }
    }

    let mut tree = Tree::new();
    let mut queue: VecDeque<(NodeId, Fragment<'_>)> = VecDeque::new();
    queue.push_back((tree.root(), Fragment::Map(top)));

    while let Some((parent, fragment)) = queue.pop_front() {
        match fragment {
            Fragment::Scalar(_) => {}
            Fragment::Map(map) => {
                if let Some(aliases) = map.get(ALIASES_KEY) {
                    let aliases = parse_aliases(aliases)?;
                    tree.node_mut(parent).add_aliases(aliases);
                }

                let mut seen = HashSet::with_capacity(map.len());
                for (key, value) in map {
                    let key = key_text(key)?;
                    if key == ALIASES_KEY {
                        continue;
                    }
                    if !seen.insert(key.clone()) {
                        return Err(Error::structure(format!("duplicate key '{key}'")));
                    }
                    let child_fragment = Fragment::classify(value);
                    let child = tree.insert_node(key, child_fragment.node_value());
                    tree.add_child(parent, child)?;
                    queue.push_back((child, child_fragment));
                }
            }
            Fragment::Sequence(items) => {
                for (index, value) in items.iter().enumerate() {
                    let child_fragment = Fragment::classify(value);
                    let child = tree.insert_node(index.to_string(), child_fragment.node_value());
                    tree.add_child(parent, child)?;
                    queue.push_back((child, child_fragment));
                }
            }
        }
    }

    log::debug!("built configuration tree with {} nodes", tree.len());
    Ok(tree)
}

fn parse_aliases(value: &Value) -> Result<Vec<String>> {
    let Value::Sequence(items) = value else {
        return Err(Error::structure(format!(
            "aliases must be a list of strings, got {}",
            kind_of(value)
        )));
    };

    items
        .iter()
        .map(|item| match item {
            Value::String(alias) if !alias.trim().is_empty() => Ok(alias.clone()),
            Value::String(_) => Err(Error::structure("alias cannot be an empty string")),
            other => Err(Error::structure(format!(
                "alias must be a string, got {}",
                kind_of(other)
            ))),
        })
        .collect()
}

fn key_text(key: &Value) -> Result<String> {
    let text = match key {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => {
            return Err(Error::structure(format!(
                "configuration keys must be strings, got {}",
                kind_of(other)
            )))
        }
    };

    if text.trim().is_empty() {
        return Err(Error::structure("configuration keys cannot be empty strings"));
    }
    Ok(text)
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "string",
        Value::Sequence(_) => "list",
        Value::Mapping(_) => "map",
        Value::Tagged(tagged) => kind_of(&tagged.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::WILDCARD;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    fn child<'t>(tree: &'t Tree, parent: NodeId, key: &str) -> NodeId {
        *tree
            .node(parent)
            .children()
            .iter()
            .find(|&&id| tree.node(id).key() == key)
            .unwrap_or_else(|| panic!("no child {key}"))
    }

    #[test]
    fn test_build_nested_map() {
        let tree = build(&yaml("database:\n  host: localhost\n  port: 5432\n")).unwrap();
        let db = child(&tree, tree.root(), "database");
        let port = child(&tree, db, "port");
        assert_eq!(tree.node(db).value(), &NodeValue::Map);
        assert_eq!(tree.node(port).scalar(), Some(&Value::from(5432)));
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn test_aliases_attach_to_owning_node() {
        let tree = build(&yaml("python:\n  aliases: [py, python3]\n  timeout: 30\n")).unwrap();
        let python = child(&tree, tree.root(), "python");
        let node = tree.node(python);
        assert_eq!(node.aliases(), ["py", "python3"]);
        for name in ["python", "py", "python3", WILDCARD] {
            assert!(node.answers_to(name), "missing {name}");
        }
        assert_eq!(node.children().len(), 1);
        assert!(tree
            .walk()
            .iter()
            .all(|&id| tree.node(id).key() != ALIASES_KEY));
    }

    #[test]
    fn test_root_level_aliases() {
        let tree = build(&yaml("aliases: [top]\nvalue: 1\n")).unwrap();
        assert!(tree.node(tree.root()).answers_to("top"));
        assert_eq!(tree.node(tree.root()).children().len(), 1);
    }

    #[test]
    fn test_empty_alias_list() {
        let tree = build(&yaml("item:\n  aliases: []\n  value: 3\n")).unwrap();
        let item = child(&tree, tree.root(), "item");
        assert!(tree.node(item).aliases().is_empty());
        assert_eq!(tree.node(item).matches().len(), 2);
    }

    #[test]
    fn test_sequences_become_indexed_children() {
        let tree = build(&yaml("servers:\n  - name: a\n  - name: b\n")).unwrap();
        let servers = child(&tree, tree.root(), "servers");
        assert_eq!(tree.node(servers).value(), &NodeValue::Sequence);
        let second = child(&tree, servers, "1");
        let name = child(&tree, second, "name");
        assert_eq!(tree.node(name).scalar(), Some(&Value::from("b")));
    }

    #[test]
    fn test_wide_sequence_builds() {
        let items: Vec<Value> = (0..200_000).map(Value::from).collect();
        let mut source = Mapping::new();
        source.insert(Value::from("items"), Value::Sequence(items));

        let tree = build(&Value::Mapping(source)).unwrap();
        let items = child(&tree, tree.root(), "items");
        assert_eq!(tree.node(items).children().len(), 200_000);
        let last = child(&tree, items, "199999");
        assert_eq!(tree.node(last).scalar(), Some(&Value::from(199_999)));
    }

    #[test]
    fn test_aliases_inside_sequence_items() {
        let tree = build(&yaml("langs:\n  - aliases: [first]\n    name: rust\n")).unwrap();
        let langs = child(&tree, tree.root(), "langs");
        let item = child(&tree, langs, "0");
        assert!(tree.node(item).answers_to("first"));
    }

    #[test]
    fn test_children_follow_source_order() {
        let tree = build(&yaml("zeta: 1\nalpha: 2\nmid: 3\n")).unwrap();
        let keys: Vec<&str> = tree
            .node(tree.root())
            .children()
            .iter()
            .map(|&id| tree.node(id).key())
            .collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_numeric_keys_stringified() {
        let tree = build(&yaml("codes:\n  404: not found\n  true: yes\n")).unwrap();
        let codes = child(&tree, tree.root(), "codes");
        child(&tree, codes, "404");
        child(&tree, codes, "true");
    }

    #[test]
    fn test_non_map_top_level_rejected() {
        for text in ["- a\n- b\n", "42\n", "null\n"] {
            let err = build(&yaml(text)).unwrap_err();
            assert!(matches!(err, Error::Structure { .. }), "{text:?}");
        }
    }

    #[test]
    fn test_invalid_aliases_rejected() {
        let cases = [
            "python:\n  aliases: py\n",
            "python:\n  aliases: [py, 3]\n",
            "python:\n  aliases: [\"\"]\n",
            "python:\n  aliases:\n",
        ];
        for text in cases {
            let err = build(&yaml(text)).unwrap_err();
            assert!(matches!(err, Error::Structure { .. }), "{text:?}");
        }
    }

    #[test]
    fn test_invalid_keys_rejected() {
        assert!(build(&yaml("\"\": 1\n")).is_err());
        assert!(build(&yaml("? [a, b]\n: 1\n")).is_err());
        assert!(build(&yaml("a:\n  1: x\n  \"1\": y\n")).is_err());
    }

    #[test]
    fn test_reserved_keys_rejected() {
        let err = build(&yaml("__meta__: 1\n")).unwrap_err();
        assert!(err.to_string().contains("reserved"));
    }

    #[test]
    fn test_source_not_modified() {
        let source = yaml("python:\n  aliases: [py]\n  timeout: 30\n");
        let before = source.clone();
        build(&source).unwrap();
        assert_eq!(source, before);
    }

    #[test]
    fn test_round_trip_without_aliases() {
        let source = yaml(
            "python:\n  aliases: [py]\n  timeout: 30\n  args: [-u, -B]\ndatabase:\n  host: localhost\n",
        );
        let tree = build(&source).unwrap();
        let expected = yaml(
            "python:\n  timeout: 30\n  args: [-u, -B]\ndatabase:\n  host: localhost\n",
        );
        assert_eq!(tree.to_value(false), expected);
        assert_eq!(tree.to_value(true), source);
    }
}
