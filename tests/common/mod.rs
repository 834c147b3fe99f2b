//! Shared test utilities for E2E tests.
//!
//! This module provides a fixture for a parent repository laid out on disk
//! and a few `.gitmodules` / `.submoduler.ini` snippets.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::repository().with_gitmodules(configs::ONE_SUBMODULE);
//!     fixture.command().arg("report").assert().code(1);
//! }
//! ```

use assert_fs::prelude::*;
use std::path::Path;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::configs;
    pub use super::TestFixture;
}

/// Configuration file snippets.
#[allow(dead_code)]
pub mod configs {
    /// One submodule under `submodules/core`.
    pub const ONE_SUBMODULE: &str = r#"[submodule "core"]
	path = submodules/core
	url = https://github.com/example/core.git
"#;

    /// A section that is missing its url.
    pub const MISSING_URL: &str = r#"[submodule "core"]
	path = submodules/core
"#;

    /// Parent defaults for `.submoduler.ini` at the repository root.
    pub const PARENT_DEFAULTS: &str = "[default]\nrequire_test = false\n";

    /// A child `.submoduler.ini` that requires passing tests.
    pub const CHILD_REQUIRES_TESTS: &str = "[parent]\nurl = https://github.com/example/parent.git\n\n[default]\nrequire_test = true\n";
}

/// A temporary directory standing in for a parent repository.
///
/// # Example
///
/// ```rust,ignore
/// let fixture = TestFixture::repository()
///     .with_file("submodules/core/README.md", "core");
///
/// fixture.command().arg("status").assert();
/// ```
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// An empty directory that is not a repository.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// A directory with a `.git` directory, enough to pass the repository check.
    pub fn repository() -> Self {
        let fixture = Self::new();
        fixture
            .temp_dir
            .child(".git")
            .create_dir_all()
            .expect("Failed to create .git");
        fixture
    }

    /// Add a `.gitmodules` file with the given content.
    pub fn with_gitmodules(self, content: &str) -> Self {
        self.with_file(".gitmodules", content)
    }

    /// Add a `.submoduler.ini` at the repository root.
    pub fn with_parent_ini(self, content: &str) -> Self {
        self.with_file(".submoduler.ini", content)
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a child path in the temp directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Create a command configured to run in this fixture's directory.
    ///
    /// Colors are disabled so output can be matched literally.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("submoduler");
        cmd.current_dir(self.path())
            .env_remove("SUBMODULER_REPO_ROOT")
            .env("NO_COLOR", "1");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_temp_dir() {
        let fixture = TestFixture::new();
        assert!(fixture.path().exists());
        assert!(!fixture.path().join(".git").exists());
    }

    #[test]
    fn test_repository_fixture_has_git_dir() {
        let fixture = TestFixture::repository();
        assert!(fixture.path().join(".git").is_dir());
    }

    #[test]
    fn test_fixture_with_file_creates_parents() {
        let fixture = TestFixture::new().with_file("submodules/core/.submoduler.ini", "");
        assert!(fixture.path().join("submodules/core/.submoduler.ini").exists());
    }
}
