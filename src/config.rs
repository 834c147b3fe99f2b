//! # Submodule Configuration Values
//!
//! Configuration in `.submoduler.ini` files is a flat set of string keys
//! mapped to string values. This module defines [`ConfigMap`], the ordered
//! map those values live in, and [`merge_configurations`], which overlays a
//! child's `[default]` section on the parent repository's defaults.
//!
//! ## Merge Rule
//!
//! For every key, the child's value wins when the child sets it; otherwise
//! the parent's value is kept. A key counts as an *override* only when both
//! sides set it and the values differ. A child introducing a key the parent
//! never set is an addition, not an override.
//!
//! ```
//! use submoduler::config::{merge_configurations, ConfigMap};
//!
//! let parent = ConfigMap::from([("require_test", "true")]);
//! let child = ConfigMap::from([("require_test", "false")]);
//!
//! let merged = merge_configurations(&parent, &child);
//! assert_eq!(merged.config.get("require_test"), Some("false"));
//! assert_eq!(merged.overrides, vec!["require_test".to_string()]);
//! ```

use serde::ser::{Serialize, SerializeMap, Serializer};

/// An insertion-ordered mapping from configuration key to value.
///
/// Keys are unique. Re-inserting an existing key replaces its value but
/// keeps the key's original position, so iteration order always reflects
/// the order in which keys were first seen in the source file.
///
/// Equality compares contents only: two maps holding the same pairs in a
/// different order are equal.
#[derive(Debug, Clone, Default)]
pub struct ConfigMap {
    entries: Vec<(String, String)>,
}

impl ConfigMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value, returning the previous value if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Look up a value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Iterate over keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl PartialEq for ConfigMap {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl Eq for ConfigMap {}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ConfigMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = ConfigMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for ConfigMap {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl Serialize for ConfigMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// The outcome of overlaying child configuration on parent defaults.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MergedConfig {
    /// Parent defaults with every child value applied on top.
    pub config: ConfigMap,
    /// Keys set by both sides with differing values, in child order.
    pub overrides: Vec<String>,
}

/// Overlay `child` on `parent`.
///
/// Pure and total: no I/O, never fails. Parent keys keep their position;
/// keys only the child sets are appended in child order.
pub fn merge_configurations(parent: &ConfigMap, child: &ConfigMap) -> MergedConfig {
    let mut config = parent.clone();
    let mut overrides = Vec::new();

    for (key, value) in child.iter() {
        if parent.get(key).is_some_and(|p| p != value) {
            overrides.push(key.to_string());
        }
        config.insert(key, value);
    }

    MergedConfig { config, overrides }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces_in_place() {
        let mut map = ConfigMap::new();
        map.insert("a", "1");
        map.insert("b", "2");
        assert_eq!(map.insert("a", "3"), Some("1".to_string()));

        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(map.get("a"), Some("3"));
    }

    #[test]
    fn test_equality_ignores_order() {
        let left = ConfigMap::from([("a", "1"), ("b", "2")]);
        let right = ConfigMap::from([("b", "2"), ("a", "1")]);
        assert_eq!(left, right);
        assert_ne!(left, ConfigMap::from([("a", "1")]));
    }

    #[test]
    fn test_merge_new_key_is_not_override() {
        let merged = merge_configurations(&ConfigMap::new(), &ConfigMap::from([("a", "1")]));
        assert_eq!(merged.config, ConfigMap::from([("a", "1")]));
        assert!(merged.overrides.is_empty());
    }

    #[test]
    fn test_merge_differing_value_is_override() {
        let merged = merge_configurations(
            &ConfigMap::from([("a", "1")]),
            &ConfigMap::from([("a", "2")]),
        );
        assert_eq!(merged.config, ConfigMap::from([("a", "2")]));
        assert_eq!(merged.overrides, vec!["a".to_string()]);
    }

    #[test]
    fn test_merge_identical_value_is_not_override() {
        let merged = merge_configurations(
            &ConfigMap::from([("a", "1")]),
            &ConfigMap::from([("a", "1")]),
        );
        assert_eq!(merged.config, ConfigMap::from([("a", "1")]));
        assert!(merged.overrides.is_empty());
    }

    #[test]
    fn test_merge_empty_child_keeps_parent() {
        let merged = merge_configurations(&ConfigMap::from([("a", "1")]), &ConfigMap::new());
        assert_eq!(merged.config, ConfigMap::from([("a", "1")]));
        assert!(merged.overrides.is_empty());
    }

    #[test]
    fn test_merge_overrides_follow_child_order() {
        let parent = ConfigMap::from([("a", "1"), ("b", "1"), ("c", "1")]);
        let child = ConfigMap::from([("c", "2"), ("new", "x"), ("a", "2")]);
        let merged = merge_configurations(&parent, &child);
        assert_eq!(merged.overrides, vec!["c".to_string(), "a".to_string()]);

        let keys: Vec<&str> = merged.config.keys().collect();
        assert_eq!(keys, vec!["a", "b", "c", "new"]);
    }

    #[test]
    fn test_serialize_as_json_object() {
        let map = ConfigMap::from([("require_test", "true")]);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"require_test":"true"}"#);
    }
}
