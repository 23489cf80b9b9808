//! Configuration tree nodes.
//!
//! The tree is an arena: every [`Node`] lives in a [`Tree`] and is addressed
//! by a [`NodeId`]. Parents are stored as ids and children as an ordered list
//! of ids, so the tree can be walked in both directions without shared
//! ownership.

use std::borrow::Cow;
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};

use serde_yaml::{Mapping, Value};

use crate::error::{Error, Result};
use crate::path::ConfigPath;

/// Key of the synthetic root node.
pub const ROOT_KEY: &str = "root";

/// Name every node answers to.
pub const WILDCARD: &str = "*";

/// Reserved map key that declares aliases for the enclosing node.
pub const ALIASES_KEY: &str = "aliases";

/// Child key holding the payload of a scalar that was wrapped to carry
/// aliases, as in `{value: 5432, aliases: [port]}`.
pub const VALUE_KEY: &str = "value";

static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(1);

/// Handle to a node inside a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in its tree's arena.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// What a node holds once the tree is built.
///
/// Maps and sequences are represented by the node's children; only scalars
/// carry their value directly.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeValue {
    /// A leaf value (string, number, bool or null).
    Scalar(Value),
    /// A map whose entries are the node's children.
    Map,
    /// A sequence whose elements are the node's children, keyed by index.
    Sequence,
}

/// A vertex of the configuration tree.
#[derive(Debug, Clone)]
pub struct Node {
    key: String,
    value: NodeValue,
    matches: HashSet<String>,
    aliases: Vec<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(key: String, value: NodeValue) -> Self {
        let mut matches = HashSet::with_capacity(2);
        matches.insert(key.clone());
        matches.insert(WILDCARD.to_string());
        Self {
            key,
            value,
            matches,
            aliases: Vec::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    /// The primary key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The node's value.
    #[must_use]
    pub fn value(&self) -> &NodeValue {
        &self.value
    }

    /// The scalar value, if this is a leaf.
    #[must_use]
    pub fn scalar(&self) -> Option<&Value> {
        match &self.value {
            NodeValue::Scalar(value) => Some(value),
            NodeValue::Map | NodeValue::Sequence => None,
        }
    }

    /// Every name this node answers to: its key, `*`, and declared aliases.
    #[must_use]
    pub fn matches(&self) -> &HashSet<String> {
        &self.matches
    }

    /// Whether `name` addresses this node.
    #[must_use]
    pub fn answers_to(&self, name: &str) -> bool {
        self.matches.contains(name)
    }

    /// Declared aliases in source order.
    #[must_use]
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// The parent node; `None` for the root and for detached nodes.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in source order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub(crate) fn add_aliases(&mut self, aliases: Vec<String>) {
        for alias in &aliases {
            self.matches.insert(alias.clone());
        }
        self.aliases.extend(aliases);
    }
}

/// An arena-backed configuration tree with a single `"root"` node.
///
/// Trees are built once (see [`crate::builder::build`]) and treated as
/// immutable snapshots afterwards.
#[derive(Debug)]
pub struct Tree {
    id: u64,
    nodes: Vec<Node>,
}

impl Tree {
    /// Create a tree holding only an empty root map.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed),
            nodes: vec![Node::new(ROOT_KEY.to_string(), NodeValue::Map)],
        }
    }

    /// Identity of this tree; unique per process.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The root node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree has at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Borrow a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this tree.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Borrow a node, returning `None` for foreign ids.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Allocate a detached node. Attach it with [`Tree::add_child`].
    pub fn insert_node(&mut self, key: impl Into<String>, value: NodeValue) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(key.into(), value));
        id
    }

    /// Attach `child` under `parent`.
    ///
    /// # Errors
    ///
    /// Returns a node error if the edge already exists, if `child` already
    /// has a parent, or if the edge would create a cycle.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if self.get(parent).is_none() || self.get(child).is_none() {
            return Err(Error::node("node does not belong to this tree"));
        }

        if self.node(child).parent == Some(parent) {
            return Err(Error::node(format!(
                "edge to '{}' already exists",
                self.node(child).key
            )));
        }

        if let Some(existing) = self.node(child).parent {
            return Err(Error::node(format!(
                "node '{}' already has parent '{}'",
                self.node(child).key,
                self.node(existing).key
            )));
        }

        if child == self.root() || self.ancestors(parent).any(|id| id == child) || parent == child
        {
            return Err(Error::node(format!(
                "edge from '{}' to '{}' would create a cycle",
                self.node(parent).key,
                self.node(child).key
            )));
        }

        self.node_mut(parent).children.push(child);
        self.node_mut(child).parent = Some(parent);
        Ok(())
    }

    /// Direct children of `id` that answer to `key`.
    #[must_use]
    pub fn matching_children(&self, id: NodeId, key: &str) -> Vec<NodeId> {
        self.node(id)
            .children
            .iter()
            .copied()
            .filter(|&child| self.node(child).answers_to(key))
            .collect()
    }

    /// Strict ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.node(id).parent, |&current| self.node(current).parent)
    }

    /// Keys from the root down to `id`, both inclusive.
    ///
    /// # Examples
    ///
    /// ```
    /// use aliasconf::builder::build;
    /// use aliasconf::resolver::resolve_best;
    /// use aliasconf::ConfigPath;
    ///
    /// let source = serde_yaml::from_str("database:\n  host: localhost\n").unwrap();
    /// let tree = build(&source).unwrap();
    /// let node = resolve_best(&tree, &ConfigPath::parse("database.host").unwrap()).unwrap();
    /// assert_eq!(tree.path_from_root(node), ["root", "database", "host"]);
    /// ```
    #[must_use]
    pub fn path_from_root(&self, id: NodeId) -> Vec<&str> {
        let mut keys: Vec<&str> = std::iter::once(id)
            .chain(self.ancestors(id))
            .map(|current| self.node(current).key.as_str())
            .collect();
        keys.reverse();
        keys
    }

    /// Keys from the first level below the root down to `id`.
    #[must_use]
    pub fn key_path(&self, id: NodeId) -> ConfigPath {
        let mut keys: Vec<String> = std::iter::once(id)
            .chain(self.ancestors(id))
            .filter(|&current| current != self.root())
            .map(|current| self.node(current).key.clone())
            .collect();
        keys.reverse();
        ConfigPath::from_trusted(keys)
    }

    /// Breadth-first search outward from `id`, through parents and
    /// children, for the closest node answering to `key`.
    ///
    /// This is not indexed; it visits nodes until one matches.
    #[must_use]
    pub fn nearest_by_key(&self, id: NodeId, key: &str) -> Option<NodeId> {
        let mut visited = vec![false; self.nodes.len()];
        let mut queue = VecDeque::from([id]);

        while let Some(current) = queue.pop_front() {
            if std::mem::replace(&mut visited[current.0], true) {
                continue;
            }

            let node = self.node(current);
            if node.answers_to(key) {
                return Some(current);
            }

            if let Some(parent) = node.parent {
                if !visited[parent.0] {
                    queue.push_back(parent);
                }
            }
            queue.extend(node.children.iter().copied().filter(|c| !visited[c.0]));
        }

        None
    }

    /// All node ids reachable from the root, in pre-order.
    #[must_use]
    pub fn walk(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.node(id).children.iter().rev().copied());
        }
        order
    }

    /// The value of `id` as a plain nested structure.
    ///
    /// Scalars are borrowed; maps and sequences are rebuilt from the
    /// children without alias metadata.
    #[must_use]
    pub fn value_of(&self, id: NodeId) -> Cow<'_, Value> {
        match &self.node(id).value {
            NodeValue::Scalar(value) => Cow::Borrowed(value),
            NodeValue::Map | NodeValue::Sequence => Cow::Owned(self.subtree_value(id, false)),
        }
    }

    /// The value a typed accessor should read for `id`.
    ///
    /// A map whose only child is `value` is a wrapped scalar and reads as
    /// that child; anything else reads as [`Tree::value_of`].
    #[must_use]
    pub fn effective_value(&self, id: NodeId) -> Cow<'_, Value> {
        let node = self.node(id);
        match (&node.value, node.children.as_slice()) {
            (NodeValue::Map, [only]) if self.node(*only).key == VALUE_KEY => self.value_of(*only),
            _ => self.value_of(id),
        }
    }

    /// Serialize the subtree under `id` back to a nested map.
    ///
    /// With `include_aliases`, every map that declared aliases gets its
    /// `aliases` entry back.
    #[must_use]
    pub fn subtree_value(&self, id: NodeId, include_aliases: bool) -> Value {
        let node = self.node(id);
        match &node.value {
            NodeValue::Scalar(value) => value.clone(),
            NodeValue::Sequence => Value::Sequence(
                node.children
                    .iter()
                    .map(|&child| self.subtree_value(child, include_aliases))
                    .collect(),
            ),
            NodeValue::Map => {
                let mut map = Mapping::new();
                if include_aliases && !node.aliases.is_empty() {
                    map.insert(
                        Value::String(ALIASES_KEY.to_string()),
                        Value::Sequence(
                            node.aliases.iter().cloned().map(Value::String).collect(),
                        ),
                    );
                }
                for &child in &node.children {
                    map.insert(
                        Value::String(self.node(child).key.clone()),
                        self.subtree_value(child, include_aliases),
                    );
                }
                Value::Mapping(map)
            }
        }
    }

    /// Serialize the whole tree back to a nested map.
    #[must_use]
    pub fn to_value(&self, include_aliases: bool) -> Value {
        self.subtree_value(self.root(), include_aliases)
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}
