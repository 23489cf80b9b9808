//! Property-based tests for tree building, merging and resolution.

use std::collections::BTreeSet;

use proptest::prelude::*;
use serde_yaml::{Mapping, Value};

use super::merger::deep_merge;
use crate::builder::build;
use crate::cache::ResolutionCache;
use crate::path::ConfigPath;
use crate::resolver;

const KEYS: &str = "[a-d]{1,2}";
const ALIASES: &str = "[p-s]{1,2}";

fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
        "[a-z]{0,6}".prop_map(Value::from),
    ]
}

fn map_from(entries: Vec<(String, Value)>, aliases: BTreeSet<String>) -> Value {
    let mut map = Mapping::new();
    if !aliases.is_empty() {
        map.insert(
            Value::from("aliases"),
            Value::Sequence(aliases.into_iter().map(Value::from).collect()),
        );
    }
    for (key, value) in entries {
        map.insert(Value::from(key), value);
    }
    Value::Mapping(map)
}

// Nested maps with short, colliding keys and optional alias lists
fn config_strategy() -> impl Strategy<Value = Value> {
    let leaf = scalar_strategy();
    let node = leaf.prop_recursive(4, 48, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..3).prop_map(Value::Sequence),
            (
                prop::collection::btree_map(KEYS, inner, 0..4),
                prop::collection::btree_set(ALIASES, 0..2),
            )
                .prop_map(|(entries, aliases)| map_from(entries.into_iter().collect(), aliases)),
        ]
    });
    prop::collection::btree_map(KEYS, node, 0..4)
        .prop_map(|entries| map_from(entries.into_iter().collect(), BTreeSet::new()))
}

fn path_strategy() -> impl Strategy<Value = ConfigPath> {
    prop::collection::vec(prop_oneof!["[a-d]{1,2}", "[p-s]{1,2}", "[0-2]"], 1..4)
        .prop_map(|parts| ConfigPath::from_components(parts).unwrap())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 512,
        .. ProptestConfig::default()
    })]

    // Serializing with aliases gives back the source
    #[test]
    fn build_round_trips(source in config_strategy()) {
        let tree = build(&source).unwrap();
        prop_assert_eq!(tree.to_value(true), source);
    }

    // Building the same data twice resolves every path identically
    #[test]
    fn resolution_is_deterministic(source in config_strategy(), path in path_strategy()) {
        let first = build(&source).unwrap();
        let second = build(&source).unwrap();

        let a = resolver::resolve_best(&first, &path).map(|id| first.key_path(id));
        let b = resolver::resolve_best(&second, &path).map(|id| second.key_path(id));
        prop_assert_eq!(a, b);
    }

    // The cached lookup agrees with the plain resolver, ties included
    #[test]
    fn cache_agrees_with_resolver(source in config_strategy(), path in path_strategy()) {
        let tree = build(&source).unwrap();
        let mut cache = ResolutionCache::default();
        cache.initialize(&tree);

        let expected = resolver::resolve_ranked(&tree, &path)
            .first()
            .map(|candidate| candidate.node);
        prop_assert_eq!(cache.resolve_best(&tree, &path), expected);
        // Second lookup comes from the LRU
        prop_assert_eq!(cache.resolve_best(&tree, &path), expected);
    }

    // Every candidate consumes at least one component, so scores never drop
    // to the base score
    #[test]
    fn candidates_score_above_base(source in config_strategy(), path in path_strategy()) {
        let tree = build(&source).unwrap();
        for candidate in resolver::resolve_ranked(&tree, &path) {
            prop_assert!(candidate.score > resolver::BASE_SCORE);
        }
    }

    // Merging with an empty overlay is the identity
    #[test]
    fn merge_with_empty_is_identity(source in config_strategy()) {
        let empty = Value::Mapping(Mapping::new());
        prop_assert_eq!(deep_merge(&source, &empty), source.clone());
        prop_assert_eq!(deep_merge(&empty, &source), source);
    }

    // Merging a document over itself changes nothing
    #[test]
    fn merge_is_idempotent(source in config_strategy()) {
        prop_assert_eq!(deep_merge(&source, &source), source);
    }
}
