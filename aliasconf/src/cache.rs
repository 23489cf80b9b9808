//! Path index and LRU cache for repeated lookups.
//!
//! [`ResolutionCache`] answers the same question as
//! [`resolver::resolve_best`], but first consults a direct index of every
//! full key path and alias, and remembers answers in a bounded LRU.
//!
//! The cache holds no hooks into the tree. Whoever owns the tree calls
//! [`ResolutionCache::initialize`] after building it and
//! [`ResolutionCache::clear`] before discarding it.
//!
//! # Examples
//!
//! ```
//! use aliasconf::builder::build;
//! use aliasconf::cache::ResolutionCache;
//! use aliasconf::ConfigPath;
//!
//! let source = serde_yaml::from_str("python:\n  aliases: [py]\n  timeout: 30\n").unwrap();
//! let tree = build(&source).unwrap();
//!
//! let mut cache = ResolutionCache::default();
//! cache.initialize(&tree);
//!
//! let path = ConfigPath::parse("py.timeout").unwrap();
//! let node = cache.resolve_best(&tree, &path).unwrap();
//! assert_eq!(tree.key_path(node).to_string(), "python.timeout");
//! assert_eq!(cache.stats().misses, 1);
//!
//! let _ = cache.resolve_best(&tree, &path);
//! assert_eq!(cache.stats().hits, 1);
//! ```

use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::node::{NodeId, Tree, WILDCARD};
use crate::path::ConfigPath;
use crate::resolver::{self, Match, BASE_SCORE};

/// Default number of resolved paths kept by the LRU.
pub const DEFAULT_LRU_CAPACITY: usize = 1000;

/// Direct lookup tables built from one traversal of a tree.
#[derive(Debug, Default)]
pub struct PathIndex {
    paths: HashMap<Vec<String>, NodeId>,
    aliases: HashMap<String, BTreeSet<Vec<String>>>,
}

impl PathIndex {
    /// Index every node of `tree`.
    #[must_use]
    pub fn build(tree: &Tree) -> Self {
        let mut index = Self::default();
        for id in tree.walk().into_iter().skip(1) {
            let node = tree.node(id);
            let full_path = tree.key_path(id).components().to_vec();

            for alias in node.matches() {
                if alias != node.key() && alias != WILDCARD {
                    index
                        .aliases
                        .entry(alias.clone())
                        .or_default()
                        .insert(full_path.clone());
                }
            }
            index.paths.insert(full_path, id);
        }
        index
    }

    /// The node at exactly `path` (keys only, no aliases).
    #[must_use]
    pub fn get(&self, path: &[String]) -> Option<NodeId> {
        self.paths.get(path).copied()
    }

    /// Full paths of every node that declares `alias`, in sorted order.
    pub fn paths_with_alias<'a>(&'a self, alias: &str) -> impl Iterator<Item = &'a [String]> + 'a {
        self.aliases
            .get(alias)
            .into_iter()
            .flatten()
            .map(Vec::as_slice)
    }

    /// Number of indexed nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether nothing is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.paths.clear();
        self.aliases.clear();
    }
}

/// Hit, miss and eviction counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that had to be resolved.
    pub misses: u64,
    /// Entries dropped to stay within capacity.
    pub evictions: u64,
}

impl CacheStats {
    /// Fraction of lookups answered from the cache (0.0 - 1.0).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// A bounded least-recently-used map.
///
/// `get` promotes the entry; inserting past capacity evicts the entry that
/// was used least recently.
#[derive(Debug)]
pub struct LruCache<K, V> {
    capacity: usize,
    entries: HashMap<K, (V, u64)>,
    order: BTreeMap<u64, K>,
    tick: u64,
    stats: CacheStats,
}

impl<K: Hash + Eq + Clone, V> LruCache<K, V> {
    /// Create a cache holding at most `capacity` entries.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::new(),
            order: BTreeMap::new(),
            tick: 0,
            stats: CacheStats::default(),
        }
    }

    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    /// Look up `key`, marking it most recently used.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let tick = self.next_tick();
        let Some((_, last_used)) = self.entries.get_mut(key) else {
            self.stats.misses += 1;
            return None;
        };

        if let Some(owned_key) = self.order.remove(last_used) {
            self.order.insert(tick, owned_key);
        }
        *last_used = tick;
        self.stats.hits += 1;
        self.entries.get(key).map(|(value, _)| value)
    }

    /// Whether `key` is present, without promoting it.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }

    /// Insert or replace `key`, marking it most recently used.
    pub fn put(&mut self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }

        let tick = self.next_tick();
        if let Some((_, last_used)) = self.entries.remove(&key) {
            self.order.remove(&last_used);
        }
        self.order.insert(tick, key.clone());
        self.entries.insert(key, (value, tick));

        while self.entries.len() > self.capacity {
            let Some((_, oldest)) = self.order.pop_first() else {
                break;
            };
            self.entries.remove(&oldest);
            self.stats.evictions += 1;
        }
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Counters since creation.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Drop every entry. Counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}

/// Index plus LRU for one tree.
///
/// Lookups take `&self`; only the LRU's internal ordering changes on read
/// and it sits behind its own mutex. Rebuilding requires `&mut self`.
#[derive(Debug)]
pub struct ResolutionCache {
    index: PathIndex,
    lru: Mutex<LruCache<ConfigPath, Option<NodeId>>>,
    tree_id: Option<u64>,
}

impl Default for ResolutionCache {
    fn default() -> Self {
        Self::new(DEFAULT_LRU_CAPACITY)
    }
}

impl ResolutionCache {
    /// Create an uninitialized cache with the given LRU capacity.
    #[must_use]
    pub fn new(lru_capacity: usize) -> Self {
        Self {
            index: PathIndex::default(),
            lru: Mutex::new(LruCache::new(lru_capacity)),
            tree_id: None,
        }
    }

    /// Build the index for `tree`, discarding anything cached before.
    pub fn initialize(&mut self, tree: &Tree) {
        self.index = PathIndex::build(tree);
        self.lru_mut().clear();
        self.tree_id = Some(tree.id());
        log::debug!(
            "indexed {} configuration paths for tree {}",
            self.index.len(),
            tree.id()
        );
    }

    /// Drop the index and every cached answer.
    pub fn clear(&mut self) {
        self.index.clear();
        self.lru_mut().clear();
        self.tree_id = None;
    }

    /// Whether [`initialize`](Self::initialize) has run since the last clear.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.tree_id.is_some()
    }

    /// Whether this cache was initialized from `tree`.
    #[must_use]
    pub fn is_initialized_for(&self, tree: &Tree) -> bool {
        self.tree_id == Some(tree.id())
    }

    /// The path index.
    #[must_use]
    pub fn index(&self) -> &PathIndex {
        &self.index
    }

    /// LRU counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.lru().stats()
    }

    /// Number of cached answers.
    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.lru().len()
    }

    fn lru(&self) -> MutexGuard<'_, LruCache<ConfigPath, Option<NodeId>>> {
        self.lru.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lru_mut(&mut self) -> &mut LruCache<ConfigPath, Option<NodeId>> {
        self.lru.get_mut().unwrap_or_else(PoisonError::into_inner)
    }

    /// Resolve the best node for `path`, using the index and LRU.
    ///
    /// Always returns the same node as [`resolver::resolve_best`], ties
    /// included. If the cache was not initialized for `tree`, the plain
    /// resolver is used and nothing is cached.
    #[must_use]
    pub fn resolve_best(&self, tree: &Tree, path: &ConfigPath) -> Option<NodeId> {
        if path.is_empty() {
            return None;
        }

        if !self.is_initialized_for(tree) {
            log::warn!("resolution cache not initialized for this tree; resolving '{path}' directly");
            return resolver::resolve_best(tree, path);
        }

        if let Some(cached) = self.lru().get(path).copied() {
            return cached;
        }

        let result = self
            .try_exact(path)
            .or_else(|| self.try_indexed_continuations(tree, path))
            .or_else(|| {
                log::trace!("falling back to full search for '{path}'");
                resolver::resolve_best(tree, path)
            });

        self.lru().put(path.clone(), result);
        result
    }

    /// The node whose key path is exactly `path`.
    ///
    /// Such a node always reaches the maximum score and wins every tie, so
    /// it is the plain resolver's answer too.
    fn try_exact(&self, path: &ConfigPath) -> Option<NodeId> {
        self.index.get(path.components())
    }

    /// Continue from indexed prefixes and from nodes aliased by the first
    /// component.
    ///
    /// A candidate is accepted only if it has the maximum attainable score
    /// and sits at depth `path.len()`. Every such node descends from a
    /// top-level node keyed or aliased by the first component, and those are
    /// exactly the anchors enumerated here, so the ranking sees the same
    /// best-tier candidates as the full search. Wildcard paths can match
    /// anchors the index does not record and always take the full search.
    fn try_indexed_continuations(&self, tree: &Tree, path: &ConfigPath) -> Option<NodeId> {
        if path.iter().any(|component| component == WILDCARD) {
            return None;
        }

        let mut candidates = self.prefix_candidates(tree, path);
        candidates.extend(self.alias_candidates(tree, path));

        let best = resolver::rank(tree, path, candidates).into_iter().next()?;
        let conclusive = best.score == resolver::max_score(path.len())
            && tree.key_path(best.node).len() == path.len();
        conclusive.then_some(best.node)
    }

    fn prefix_candidates(&self, tree: &Tree, path: &ConfigPath) -> Vec<Match> {
        let components = path.components();
        let n = components.len();
        let per_component = resolver::weight(n, 0);

        let mut candidates = Vec::new();
        for prefix_len in (1..n).rev() {
            let Some(anchor) = self.index.get(&components[..prefix_len]) else {
                continue;
            };
            let consumed = u64::try_from(prefix_len)
                .ok()
                .and_then(|len| per_component.checked_mul(len))
                .map_or(u64::MAX, |points| points.saturating_add(BASE_SCORE));
            candidates.extend(resolver::search(
                tree,
                n,
                &components[prefix_len..],
                consumed,
                anchor,
            ));
        }
        candidates
    }

    fn alias_candidates(&self, tree: &Tree, path: &ConfigPath) -> Vec<Match> {
        let components = path.components();
        let n = components.len();
        let Some(first) = path.first() else {
            return Vec::new();
        };

        let mut candidates = Vec::new();
        for alias_path in self.index.paths_with_alias(first) {
            let Some(anchor) = self.index.get(alias_path) else {
                continue;
            };
            if !reachable_with_full_path(tree, anchor, components) {
                continue;
            }

            let score = BASE_SCORE.saturating_add(resolver::weight(n, 0));
            if n == 1 {
                candidates.push(Match {
                    node: anchor,
                    score,
                });
            } else {
                candidates.extend(resolver::search(tree, n, &components[1..], score, anchor));
            }
        }
        candidates
    }
}

/// Whether the full search reaches `node` with nothing consumed yet: no
/// ancestor below the root answers to any component of the path.
fn reachable_with_full_path(tree: &Tree, node: NodeId, components: &[String]) -> bool {
    tree.ancestors(node)
        .filter(|&id| id != tree.root())
        .all(|id| {
            let ancestor = tree.node(id);
            !components.iter().any(|c| ancestor.answers_to(c))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;

    fn tree(text: &str) -> Tree {
        build(&serde_yaml::from_str(text).unwrap()).unwrap()
    }

    fn path(dotted: &str) -> ConfigPath {
        ConfigPath::parse(dotted).unwrap()
    }

    fn cache_for(tree: &Tree) -> ResolutionCache {
        let mut cache = ResolutionCache::default();
        cache.initialize(tree);
        cache
    }

    #[test]
    fn test_path_index_contents() {
        let t = tree("python:\n  aliases: [py, python3]\n  timeout: 30\n");
        let index = PathIndex::build(&t);
        assert_eq!(index.len(), 2);

        let timeout = index
            .get(&["python".to_string(), "timeout".to_string()])
            .unwrap();
        assert_eq!(t.node(timeout).key(), "timeout");

        let aliased: Vec<&[String]> = index.paths_with_alias("py").collect();
        assert_eq!(aliased, [["python".to_string()].as_slice()]);
        assert_eq!(index.paths_with_alias("python").count(), 0);
        assert_eq!(index.paths_with_alias("*").count(), 0);
    }

    #[test]
    fn test_lru_evicts_least_recently_used() {
        let mut lru = LruCache::new(2);
        lru.put("a", 1);
        lru.put("b", 2);
        assert_eq!(lru.get("a"), Some(&1));
        lru.put("c", 3);

        assert!(lru.contains("a"));
        assert!(!lru.contains("b"));
        assert!(lru.contains("c"));
        assert_eq!(lru.len(), 2);
        assert_eq!(lru.stats().evictions, 1);
    }

    #[test]
    fn test_lru_put_replaces_and_promotes() {
        let mut lru = LruCache::new(2);
        lru.put("a", 1);
        lru.put("b", 2);
        lru.put("a", 10);
        lru.put("c", 3);

        assert_eq!(lru.get("a"), Some(&10));
        assert!(!lru.contains("b"));
    }

    #[test]
    fn test_lru_zero_capacity_stores_nothing() {
        let mut lru = LruCache::new(0);
        lru.put("a", 1);
        assert!(lru.is_empty());
        assert_eq!(lru.get("a"), None);
    }

    #[test]
    fn test_lru_stats() {
        let mut lru = LruCache::new(4);
        lru.put("a", 1);
        lru.get("a");
        lru.get("a");
        lru.get("missing");
        let stats = lru.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_rate() - 2.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_default_capacity() {
        let cache = ResolutionCache::default();
        assert_eq!(cache.lru().capacity(), DEFAULT_LRU_CAPACITY);
        assert!(!cache.is_initialized());
    }

    #[test]
    fn test_exact_hit() {
        let t = tree("database:\n  host: localhost\n");
        let cache = cache_for(&t);
        let node = cache.resolve_best(&t, &path("database.host")).unwrap();
        assert_eq!(t.key_path(node).to_string(), "database.host");
    }

    #[test]
    fn test_alias_paths() {
        let t = tree("python:\n  aliases: [py, python3]\n  timeout: 30\n");
        let cache = cache_for(&t);
        for dotted in ["py.timeout", "python3.timeout", "py", "*.timeout"] {
            assert_eq!(
                cache.resolve_best(&t, &path(dotted)),
                resolver::resolve_best(&t, &path(dotted)),
                "{dotted}"
            );
        }
    }

    #[test]
    fn test_prefix_continuation_through_alias() {
        let t = tree("langs:\n  cpp:\n    aliases: [c++, cxx]\n    compiler: g++\n");
        let cache = cache_for(&t);
        let node = cache.resolve_best(&t, &path("langs.cxx.compiler")).unwrap();
        assert_eq!(t.key_path(node).to_string(), "langs.cpp.compiler");
    }

    #[test]
    fn test_partial_path_falls_back_to_full_search() {
        let t = tree("a:\n  b:\n    c: 1\n");
        let cache = cache_for(&t);
        let node = cache.resolve_best(&t, &path("c")).unwrap();
        assert_eq!(t.key_path(node).to_string(), "a.b.c");
    }

    #[test]
    fn test_unreachable_alias_is_not_used() {
        // The full search stops at the top-level `b`, which consumes the
        // last component before `x` is ever visited.
        let t = tree("b:\n  x:\n    aliases: [a]\n    b: 1\n");
        let cache = cache_for(&t);
        let p = path("a.b");
        assert_eq!(cache.resolve_best(&t, &p), resolver::resolve_best(&t, &p));
        assert_eq!(t.key_path(cache.resolve_best(&t, &p).unwrap()).to_string(), "b");
    }

    #[test]
    fn test_deep_alias_loses_tie_to_shallower_match() {
        // Both `z.a.b` and `q.r.s.b` score the maximum for `a.b`; the
        // shallower one wins the tie.
        let t = tree("z:\n  a:\n    b: 1\nq:\n  r:\n    s:\n      aliases: [a]\n      b: 2\n");
        let cache = cache_for(&t);
        let p = path("a.b");

        let ranked = resolver::resolve_ranked(&t, &p);
        assert_eq!(ranked[0].score, ranked[1].score);
        assert_eq!(t.key_path(ranked[0].node).to_string(), "z.a.b");

        let node = cache.resolve_best(&t, &p).unwrap();
        assert_eq!(Some(node), resolver::resolve_best(&t, &p));
        assert_eq!(t.key_path(node).to_string(), "z.a.b");
    }

    #[test]
    fn test_wildcard_paths_use_full_search() {
        let t = tree("a:\n  aliases: ['*']\n  b: 1\nc:\n  b: 2\n");
        let cache = cache_for(&t);
        let p = path("*.b");
        assert_eq!(cache.resolve_best(&t, &p), resolver::resolve_best(&t, &p));
    }

    #[test]
    fn test_negative_results_are_cached() {
        let t = tree("a: 1\n");
        let cache = cache_for(&t);
        assert!(cache.resolve_best(&t, &path("missing")).is_none());
        assert!(cache.resolve_best(&t, &path("missing")).is_none());
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.cached_len(), 1);
    }

    #[test]
    fn test_uninitialized_cache_resolves_directly() {
        let t = tree("a:\n  b: 1\n");
        let cache = ResolutionCache::default();
        assert!(cache.resolve_best(&t, &path("a.b")).is_some());
        assert_eq!(cache.cached_len(), 0);
    }

    #[test]
    fn test_cache_for_other_tree_is_ignored() {
        let old = tree("a:\n  b: 1\n");
        let new = tree("a:\n  b: 2\n  c: 3\n");
        let cache = cache_for(&old);
        assert!(!cache.is_initialized_for(&new));

        let node = cache.resolve_best(&new, &path("a.c")).unwrap();
        assert_eq!(new.node(node).key(), "c");
    }

    #[test]
    fn test_clear_then_initialize_uses_new_tree() {
        let old = tree("a:\n  b: 1\n");
        let mut cache = cache_for(&old);
        assert!(cache.resolve_best(&old, &path("a.b")).is_some());
        cache.clear();
        assert!(!cache.is_initialized());
        assert_eq!(cache.cached_len(), 0);

        let new = tree("x: 0\na:\n  b: 2\n");
        cache.initialize(&new);
        let node = cache.resolve_best(&new, &path("a.b")).unwrap();
        assert_eq!(
            new.value_of(node).into_owned(),
            serde_yaml::Value::from(2)
        );
    }

    #[test]
    fn test_empty_path() {
        let t = tree("a: 1\n");
        let cache = cache_for(&t);
        assert!(cache.resolve_best(&t, &ConfigPath::empty()).is_none());
    }
}
