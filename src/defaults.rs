//! Default values and well-known names used across submoduler.
//!
//! This module provides centralized constants used across the parsers and
//! commands, ensuring consistency and avoiding duplication.

/// Git's native submodule manifest, at the repository root.
pub const GITMODULES_FILENAME: &str = ".gitmodules";

/// Per-repository and per-submodule configuration file.
pub const SUBMODULER_INI_FILENAME: &str = ".submoduler.ini";

/// Directories under the repository root searched for child
/// `.submoduler.ini` files. Each is also stripped from the front of a
/// discovered path to form the submodule's name.
pub const SEARCH_ROOTS: [&str; 2] = ["submodules", "examples"];

/// Url recorded when a submodule's remote cannot be resolved.
pub const UNKNOWN_URL: &str = "unknown";

/// Remote used by `push` when none is given.
pub const DEFAULT_REMOTE: &str = "origin";

/// INI section holding configuration defaults.
pub const DEFAULT_SECTION: &str = "default";

/// INI section in a child file describing its parent repository.
pub const PARENT_SECTION: &str = "parent";

/// Configuration key gating `test` and `release` failures.
pub const REQUIRE_TEST_KEY: &str = "require_test";

/// Display name for the parent repository in status output.
pub const PARENT_DISPLAY_NAME: &str = "Parent Repository";
