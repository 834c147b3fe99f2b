//! The resolved record describing one submodule.

use std::fmt;

use serde::Serialize;

use crate::config::{ConfigMap, MergedConfig};
use crate::defaults::REQUIRE_TEST_KEY;

/// One submodule's identity and effective configuration.
///
/// Entries are built fresh by the parsers on every invocation and are
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmoduleEntry {
    /// Unique name: the `.gitmodules` section name, or the path with its
    /// `submodules/` or `examples/` prefix removed.
    pub name: String,
    /// Directory relative to the repository root, `/`-separated.
    pub path: String,
    /// Remote url, or `"unknown"` when it could not be resolved.
    pub url: String,
    /// The parent url a child `.submoduler.ini` declares.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_url: Option<String>,
    /// Parent defaults overlaid with the submodule's own values.
    pub config: ConfigMap,
    /// Keys whose value differs from the parent default.
    pub config_overrides: Vec<String>,
}

impl SubmoduleEntry {
    /// An entry with no parent url and no configuration.
    pub fn new(name: impl Into<String>, path: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            url: url.into(),
            parent_url: None,
            config: ConfigMap::new(),
            config_overrides: Vec::new(),
        }
    }

    pub fn with_parent_url(mut self, parent_url: impl Into<String>) -> Self {
        self.parent_url = Some(parent_url.into());
        self
    }

    pub fn with_config(mut self, merged: MergedConfig) -> Self {
        self.config = merged.config;
        self.config_overrides = merged.overrides;
        self
    }

    /// Whether a failing test suite in this submodule fails the run.
    ///
    /// True only when `require_test` is set to `true` in any letter case.
    pub fn require_test(&self) -> bool {
        self.config
            .get(REQUIRE_TEST_KEY)
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }

    /// Whether `key` was set by the submodule itself to a value that
    /// differs from the parent default.
    pub fn is_overridden(&self, key: &str) -> bool {
        self.config_overrides.iter().any(|k| k == key)
    }
}

impl fmt::Display for SubmoduleEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.path)
    }
}
