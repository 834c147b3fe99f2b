//! `.submoduler.ini` discovery and merge
//!
//! A repository using the `.submoduler.ini` convention keeps one file at
//! its root and one inside each submodule:
//!
//! ```text
//! # <root>/.submoduler.ini
//! [default]
//!     require_test = true
//!
//! # <root>/submodules/core/.submoduler.ini
//! [parent]
//!     url = git@github.com:org/parent.git
//!
//! [default]
//!     require_test = false
//! ```
//!
//! The root file's `[default]` section supplies defaults for every
//! submodule. Each child file must name its parent in `[parent] url` and
//! may override defaults in its own `[default]` section.
//!
//! ## Discovery
//!
//! Child files are found with the globs `submodules/**/.submoduler.ini`
//! and `examples/**/.submoduler.ini`. The directory holding the file is the
//! submodule's path; stripping the leading `submodules/` or `examples/`
//! gives its name.
//!
//! ## Fault Isolation
//!
//! Each child file is handled independently. A file that fails to parse
//! or lacks `[parent] url` is logged as a warning and skipped, so one bad
//! submodule does not hide the others. Problems with the root file only
//! ever degrade to "no defaults".

use std::path::{Path, PathBuf};

use log::warn;

use crate::config::{merge_configurations, ConfigMap, MergedConfig};
use crate::defaults::{
    DEFAULT_SECTION, PARENT_SECTION, SEARCH_ROOTS, SUBMODULER_INI_FILENAME, UNKNOWN_URL,
};
use crate::entry::SubmoduleEntry;
use crate::error::{Error, Result};
use crate::git::GitRepo;
use crate::ini;
use crate::process::{CommandRunner, SystemRunner};

/// Parser for the `.submoduler.ini` files of one repository.
#[derive(Debug, Clone)]
pub struct SubmodulerIniParser<R = SystemRunner> {
    repo_root: PathBuf,
    parent_ini_path: PathBuf,
    runner: R,
}

impl SubmodulerIniParser<SystemRunner> {
    pub fn new(repo_root: &Path) -> Self {
        Self::with_runner(repo_root, SystemRunner)
    }
}

impl<R: CommandRunner> SubmodulerIniParser<R> {
    /// Create a parser that resolves submodule remotes through `runner`.
    pub fn with_runner(repo_root: &Path, runner: R) -> Self {
        Self {
            repo_root: repo_root.to_path_buf(),
            parent_ini_path: repo_root.join(SUBMODULER_INI_FILENAME),
            runner,
        }
    }

    /// Path of the repository-root `.submoduler.ini`.
    pub fn parent_ini_path(&self) -> &Path {
        &self.parent_ini_path
    }

    /// True if the root file exists or any child file can be discovered.
    pub fn exists(&self) -> bool {
        self.parent_ini_path.is_file() || !self.find_ini_files().is_empty()
    }

    /// The root file's `[default]` section.
    ///
    /// Never fails: a missing file, a file without `[default]`, or a file
    /// that does not parse all yield an empty map. Parse failures are
    /// logged as warnings.
    pub fn parse_parent_defaults(&self) -> ConfigMap {
        if !self.parent_ini_path.is_file() {
            return ConfigMap::new();
        }

        match ini::parse_file(&self.parent_ini_path) {
            Ok(doc) => doc.section(DEFAULT_SECTION).cloned().unwrap_or_default(),
            Err(e) => {
                warn!("Error parsing parent defaults: {}", e);
                ConfigMap::new()
            }
        }
    }

    /// Overlay a child's defaults on the parent's.
    ///
    /// See [`merge_configurations`].
    pub fn merge_configurations(&self, parent: &ConfigMap, child: &ConfigMap) -> MergedConfig {
        merge_configurations(parent, child)
    }

    /// Discover every child file and build an entry for each valid one.
    ///
    /// Invalid child files are skipped with a warning; this never fails
    /// because of a single file.
    pub fn parse(&self) -> Vec<SubmoduleEntry> {
        self.parse_with_defaults(&self.parse_parent_defaults())
    }

    /// [`parse`](Self::parse) with parent defaults the caller already read.
    pub fn parse_with_defaults(&self, parent_defaults: &ConfigMap) -> Vec<SubmoduleEntry> {
        self.find_ini_files()
            .into_iter()
            .filter_map(|file| match self.parse_submodule_ini(&file, parent_defaults) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Error parsing {}: {}", file.display(), e);
                    None
                }
            })
            .collect()
    }

    /// Child `.submoduler.ini` files under the search roots, in glob order.
    fn find_ini_files(&self) -> Vec<PathBuf> {
        let escaped_root = glob::Pattern::escape(&self.repo_root.to_string_lossy());
        let mut files = Vec::new();

        for search_root in SEARCH_ROOTS {
            let pattern = format!(
                "{}/{}/**/{}",
                escaped_root, search_root, SUBMODULER_INI_FILENAME
            );
            let paths = match glob::glob(&pattern) {
                Ok(paths) => paths,
                Err(e) => {
                    warn!("Invalid search pattern {}: {}", pattern, e);
                    continue;
                }
            };
            for path in paths {
                match path {
                    Ok(path) if path != self.parent_ini_path => files.push(path),
                    Ok(_) => {}
                    Err(e) => warn!("Unable to read {}", e),
                }
            }
        }

        files
    }

    fn parse_submodule_ini(&self, file: &Path, parent_defaults: &ConfigMap) -> Result<SubmoduleEntry> {
        let doc = ini::parse_file(file)?;

        let parent_url = doc
            .get(PARENT_SECTION, "url")
            .ok_or_else(|| Error::MissingParentUrl {
                path: file.to_path_buf(),
            })?
            .to_string();

        let path = self.submodule_path(file);
        let name = submodule_name(&path);
        let url = self
            .remote_url(&self.repo_root.join(&path))
            .unwrap_or_else(|| UNKNOWN_URL.to_string());

        let child_defaults = doc.section(DEFAULT_SECTION).cloned().unwrap_or_default();
        let merged = merge_configurations(parent_defaults, &child_defaults);

        Ok(SubmoduleEntry::new(name, path, url)
            .with_parent_url(parent_url)
            .with_config(merged))
    }

    /// Directory of `file` relative to the repository root, `/`-separated.
    fn submodule_path(&self, file: &Path) -> String {
        let dir = file.parent().unwrap_or(file);
        let relative = dir.strip_prefix(&self.repo_root).unwrap_or(dir);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// `remote.origin.url` of an initialized submodule.
    fn remote_url(&self, dir: &Path) -> Option<String> {
        let repo = GitRepo::new(dir, &self.runner);
        if !repo.is_initialized() {
            return None;
        }
        repo.remote_url()
    }
}

/// Strip a leading `submodules/` or `examples/` segment.
fn submodule_name(path: &str) -> String {
    SEARCH_ROOTS
        .iter()
        .find_map(|root| path.strip_prefix(root).and_then(|rest| rest.strip_prefix('/')))
        .unwrap_or(path)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::fake::FakeRunner;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn parser(root: &Path) -> SubmodulerIniParser<FakeRunner> {
        SubmodulerIniParser::with_runner(root, FakeRunner::new())
    }

    #[test]
    fn test_submodule_name() {
        assert_eq!(submodule_name("submodules/core/core"), "core/core");
        assert_eq!(submodule_name("examples/demo"), "demo");
        assert_eq!(submodule_name("submodulesx/demo"), "submodulesx/demo");
        assert_eq!(submodule_name("vendor/lib"), "vendor/lib");
    }

    #[test]
    fn test_exists_false_on_empty_repo() {
        let temp = TempDir::new().unwrap();
        assert!(!parser(temp.path()).exists());
    }

    #[test]
    fn test_exists_with_root_file_only() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), ".submoduler.ini", "[default]\nrequire_test = true\n");
        assert!(parser(temp.path()).exists());
    }

    #[test]
    fn test_exists_with_child_under_examples() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "examples/demo/.submoduler.ini", "[parent]\nurl = U\n");
        assert!(parser(temp.path()).exists());
    }

    #[test]
    fn test_parent_defaults_missing_file() {
        let temp = TempDir::new().unwrap();
        assert!(parser(temp.path()).parse_parent_defaults().is_empty());
    }

    #[test]
    fn test_parent_defaults_multiple_keys() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            ".submoduler.ini",
            "[default]\nrequire_test = true\nauto_update = false\n",
        );
        assert_eq!(
            parser(temp.path()).parse_parent_defaults(),
            ConfigMap::from([("require_test", "true"), ("auto_update", "false")])
        );
    }

    #[test]
    fn test_parent_defaults_without_default_section() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            ".submoduler.ini",
            "[submodule \"test\"]\npath = test/path\nurl = https://github.com/test/repo.git\n",
        );
        assert!(parser(temp.path()).parse_parent_defaults().is_empty());
    }

    #[test]
    fn test_parent_defaults_unparsable_warns_and_degrades() {
        testing_logger::setup();
        let temp = TempDir::new().unwrap();
        write(temp.path(), ".submoduler.ini", "not an ini file\n");

        assert!(parser(temp.path()).parse_parent_defaults().is_empty());

        testing_logger::validate(|logs| {
            assert_eq!(logs.len(), 1);
            assert_eq!(logs[0].level, log::Level::Warn);
            assert!(logs[0].body.contains("Error parsing parent defaults"));
        });
    }

    #[test]
    fn test_parse_merges_parent_defaults() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), ".submoduler.ini", "[default]\nrequire_test = true\n");
        write(temp.path(), "submodules/m1/.submoduler.ini", "[parent]\nurl = U\n");
        write(
            temp.path(),
            "submodules/m2/.submoduler.ini",
            "[parent]\nurl = U\n\n[default]\nrequire_test = false\n",
        );

        let entries = parser(temp.path()).parse();
        assert_eq!(entries.len(), 2);

        let m1 = entries.iter().find(|e| e.name == "m1").unwrap();
        assert_eq!(m1.path, "submodules/m1");
        assert_eq!(m1.config, ConfigMap::from([("require_test", "true")]));
        assert!(m1.config_overrides.is_empty());
        assert_eq!(m1.parent_url.as_deref(), Some("U"));

        let m2 = entries.iter().find(|e| e.name == "m2").unwrap();
        assert_eq!(m2.config, ConfigMap::from([("require_test", "false")]));
        assert_eq!(m2.config_overrides, vec!["require_test".to_string()]);
    }

    #[test]
    fn test_parse_skips_malformed_child_with_warning() {
        testing_logger::setup();
        let temp = TempDir::new().unwrap();
        write(temp.path(), "submodules/a/.submoduler.ini", "[parent]\nurl = U\n");
        write(temp.path(), "submodules/b/.submoduler.ini", "[default]\nrequire_test = true\n");
        write(temp.path(), "submodules/c/.submoduler.ini", "[parent]\nurl = U\n");

        let entries = parser(temp.path()).parse();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);

        testing_logger::validate(|logs| {
            let warnings: Vec<_> = logs.iter().filter(|l| l.level == log::Level::Warn).collect();
            assert_eq!(warnings.len(), 1);
            assert!(warnings[0].body.contains("Missing [parent] url"));
            assert!(warnings[0].body.contains("submodules/b"));
        });
    }

    #[test]
    fn test_parse_skips_syntax_error_child() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "submodules/a/.submoduler.ini", "[parent]\nurl = U\n");
        write(temp.path(), "submodules/b/.submoduler.ini", "[parent\nurl = U\n");

        let entries = parser(temp.path()).parse();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "a");
    }

    #[test]
    fn test_parse_nested_paths_and_examples_root() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "submodules/core/core/.submoduler.ini", "[parent]\nurl = U\n");
        write(temp.path(), "examples/demo/.submoduler.ini", "[parent]\nurl = U\n");

        let entries = parser(temp.path()).parse();
        let pairs: Vec<(&str, &str)> = entries
            .iter()
            .map(|e| (e.name.as_str(), e.path.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![("core/core", "submodules/core/core"), ("demo", "examples/demo")]
        );
    }

    #[test]
    fn test_url_unknown_when_uninitialized() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "submodules/m/.submoduler.ini", "[parent]\nurl = U\n");

        let parser = parser(temp.path());
        let entries = parser.parse();
        assert_eq!(entries[0].url, "unknown");
        assert!(parser.runner.commands().is_empty());
    }

    #[test]
    fn test_url_resolved_from_git_remote_in_submodule_dir() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "submodules/m/.submoduler.ini", "[parent]\nurl = U\n");
        fs::create_dir_all(temp.path().join("submodules/m/.git")).unwrap();

        let runner = FakeRunner::new().ok(
            "git config --get remote.origin.url",
            "git@example.com:org/m.git\n",
        );
        let parser = SubmodulerIniParser::with_runner(temp.path(), runner);
        let entries = parser.parse();

        assert_eq!(entries[0].url, "git@example.com:org/m.git");
        let calls = parser.runner.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, temp.path().join("submodules/m"));
    }

    #[test]
    fn test_url_unknown_when_remote_missing() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "submodules/m/.submoduler.ini", "[parent]\nurl = U\n");
        fs::write(temp.path().join("submodules/m/.git"), "gitdir: ../../.git/modules/m").unwrap();

        let runner = FakeRunner::new().fail("git config --get remote.origin.url", "");
        let entries = SubmodulerIniParser::with_runner(temp.path(), runner).parse();
        assert_eq!(entries[0].url, "unknown");
    }

    #[test]
    fn test_merge_configurations_delegates() {
        let temp = TempDir::new().unwrap();
        let merged = parser(temp.path()).merge_configurations(
            &ConfigMap::from([("require_test", "true")]),
            &ConfigMap::from([("auto_update", "false")]),
        );
        assert_eq!(
            merged.config,
            ConfigMap::from([("require_test", "true"), ("auto_update", "false")])
        );
        assert!(merged.overrides.is_empty());
    }
}
