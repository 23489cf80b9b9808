//! Deep merging of configuration documents.
//!
//! Maps merge key by key, recursively; any other value in the overlay
//! replaces what was there. `aliases` lists are the exception: they are
//! unioned so that an overlay cannot silently drop a name the base declared.

use serde_yaml::Value;

use crate::config::loader::ConfigSource;
use crate::node::ALIASES_KEY;

/// Merges configuration documents according to precedence.
///
/// # Examples
///
/// ```
/// use aliasconf::config::ConfigMerger;
///
/// let mut base = serde_yaml::from_str("a:\n  x: 1\n  y: 2\nb: 3\n").unwrap();
/// let overlay = serde_yaml::from_str("a:\n  y: 20\n  z: 30\nc: 4\n").unwrap();
///
/// ConfigMerger::merge_into(&mut base, &overlay);
/// let expected: serde_yaml::Value =
///     serde_yaml::from_str("a:\n  x: 1\n  y: 20\n  z: 30\nb: 3\nc: 4\n").unwrap();
/// assert_eq!(base, expected);
/// ```
pub struct ConfigMerger;

impl ConfigMerger {
    /// Merge sources from lowest to highest precedence.
    #[must_use]
    pub fn merge(mut sources: Vec<ConfigSource>) -> Value {
        sources.sort_by_key(|source| source.precedence);

        let mut result = Value::Mapping(serde_yaml::Mapping::new());
        for source in &sources {
            Self::merge_into(&mut result, &source.data);
        }
        result
    }

    /// Merge `overlay` into `target`; `overlay` wins on conflicts.
    pub fn merge_into(target: &mut Value, overlay: &Value) {
        match (target, overlay) {
            (Value::Mapping(target_map), Value::Mapping(overlay_map)) => {
                for (key, overlay_value) in overlay_map {
                    match target_map.get_mut(key) {
                        Some(existing) if is_aliases_key(key) => {
                            union_aliases(existing, overlay_value);
                        }
                        Some(existing) => Self::merge_into(existing, overlay_value),
                        None => {
                            target_map.insert(key.clone(), overlay_value.clone());
                        }
                    }
                }
            }
            (target, overlay) => *target = overlay.clone(),
        }
    }
}

/// Merge `overlay` over `base`, returning a new document.
#[must_use]
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    let mut merged = base.clone();
    ConfigMerger::merge_into(&mut merged, overlay);
    merged
}

fn is_aliases_key(key: &Value) -> bool {
    key.as_str() == Some(ALIASES_KEY)
}

fn union_aliases(existing: &mut Value, overlay: &Value) {
    match (existing, overlay) {
        (Value::Sequence(names), Value::Sequence(extra)) => {
            for name in extra {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
        }
        (existing, overlay) => *existing = overlay.clone(),
    }
}
