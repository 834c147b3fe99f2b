//! Property-based tests for configuration merging.
//!
//! These tests use proptest to generate random parent and child maps and
//! verify that the merge invariants hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use crate::config::{merge_configurations, ConfigMap};
    use proptest::prelude::*;

    fn config_map() -> impl Strategy<Value = ConfigMap> {
        prop::collection::vec(("[a-e]{1,2}", "[a-z0-9]{1,4}"), 0..8)
            .prop_map(|pairs| pairs.into_iter().collect())
    }

    proptest! {
        /// Property: every child value wins
        #[test]
        fn child_values_win(parent in config_map(), child in config_map()) {
            let merged = merge_configurations(&parent, &child);
            for (key, value) in child.iter() {
                prop_assert_eq!(merged.config.get(key), Some(value));
            }
        }

        /// Property: parent keys the child does not set are kept unchanged
        #[test]
        fn parent_only_keys_survive(parent in config_map(), child in config_map()) {
            let merged = merge_configurations(&parent, &child);
            for (key, value) in parent.iter().filter(|(k, _)| !child.contains_key(k)) {
                prop_assert_eq!(merged.config.get(key), Some(value));
            }
        }

        /// Property: the merged keys are exactly the union of both sides
        #[test]
        fn merged_keys_are_union(parent in config_map(), child in config_map()) {
            let merged = merge_configurations(&parent, &child);
            for key in merged.config.keys() {
                prop_assert!(parent.contains_key(key) || child.contains_key(key));
            }
            let expected = parent
                .keys()
                .chain(child.keys().filter(|k| !parent.contains_key(k)))
                .count();
            prop_assert_eq!(merged.config.len(), expected);
        }

        /// Property: a key is an override iff both sides set it to different values
        #[test]
        fn overrides_are_exactly_differing_shared_keys(
            parent in config_map(),
            child in config_map()
        ) {
            let merged = merge_configurations(&parent, &child);
            for (key, value) in child.iter() {
                let differs = parent.get(key).is_some_and(|p| p != value);
                prop_assert_eq!(merged.overrides.iter().any(|o| o == key), differs);
            }
            prop_assert!(merged.overrides.iter().all(|o| child.contains_key(o)));
        }

        /// Property: merging with an empty parent yields the child with no overrides
        #[test]
        fn empty_parent_is_identity(child in config_map()) {
            let merged = merge_configurations(&ConfigMap::new(), &child);
            prop_assert_eq!(&merged.config, &child);
            prop_assert!(merged.overrides.is_empty());
        }

        /// Property: merging a map with itself changes nothing
        #[test]
        fn self_merge_has_no_overrides(map in config_map()) {
            let merged = merge_configurations(&map, &map);
            prop_assert_eq!(&merged.config, &map);
            prop_assert!(merged.overrides.is_empty());
        }
    }
}
