//! # Submodule Health Checks
//!
//! The checks behind the `report` command. Each validator looks at every
//! entry and returns one [`ValidationResult`] per check:
//!
//! - **Path**: the configured path is relative and the directory exists.
//! - **Initialization**: the directory is checked out and has a `.git`.
//! - **Dirty**: an initialized submodule has no uncommitted changes.
//! - **Unpushed**: an initialized submodule has no commits ahead of its
//!   upstream.
//!
//! The dirty and unpushed checks pass for uninitialized submodules; the
//! initialization check already reports those.

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::entry::SubmoduleEntry;
use crate::process::CommandRunner;
use crate::status::check_repo_status;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckType {
    PathRelative,
    PathExists,
    Initialization,
    Dirty,
    Unpushed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Pass,
    Fail,
}

/// The outcome of one check against one submodule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub submodule_name: String,
    pub check_type: CheckType,
    pub status: CheckStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ValidationResult {
    fn pass(entry: &SubmoduleEntry, check_type: CheckType, message: Option<String>) -> Self {
        Self {
            submodule_name: entry.name.clone(),
            check_type,
            status: CheckStatus::Pass,
            message,
        }
    }

    fn fail(entry: &SubmoduleEntry, check_type: CheckType, message: String) -> Self {
        Self {
            submodule_name: entry.name.clone(),
            check_type,
            status: CheckStatus::Fail,
            message: Some(message),
        }
    }

    pub fn passed(&self) -> bool {
        self.status == CheckStatus::Pass
    }

    pub fn failed(&self) -> bool {
        self.status == CheckStatus::Fail
    }
}

/// Run every check in report order: path, initialization, dirty, unpushed.
pub fn validate_all<R: CommandRunner>(
    repo_root: &Path,
    entries: &[SubmoduleEntry],
    runner: &R,
) -> Vec<ValidationResult> {
    let mut results = validate_paths(repo_root, entries);
    results.extend(validate_initialization(repo_root, entries));
    results.extend(validate_dirty(repo_root, entries, runner));
    results.extend(validate_unpushed(repo_root, entries, runner));
    results
}

/// Relative-path and directory-exists checks.
///
/// A relative path produces no `PathRelative` result; only the failure is
/// worth reporting.
pub fn validate_paths(repo_root: &Path, entries: &[SubmoduleEntry]) -> Vec<ValidationResult> {
    let mut results = Vec::new();

    for entry in entries {
        if Path::new(&entry.path).is_absolute() {
            results.push(ValidationResult::fail(
                entry,
                CheckType::PathRelative,
                format!("Path is not relative: {}", entry.path),
            ));
        }

        if repo_root.join(&entry.path).is_dir() {
            results.push(ValidationResult::pass(
                entry,
                CheckType::PathExists,
                Some(format!("Directory exists: {}", entry.path)),
            ));
        } else {
            results.push(ValidationResult::fail(
                entry,
                CheckType::PathExists,
                format!("Directory not found: {}", entry.path),
            ));
        }
    }

    results
}

pub fn validate_initialization(
    repo_root: &Path,
    entries: &[SubmoduleEntry],
) -> Vec<ValidationResult> {
    entries
        .iter()
        .map(|entry| {
            let dir = repo_root.join(&entry.path);
            if !dir.is_dir() {
                ValidationResult::fail(
                    entry,
                    CheckType::Initialization,
                    "Cannot check initialization: directory does not exist".to_string(),
                )
            } else if is_empty_dir(&dir) {
                ValidationResult::fail(
                    entry,
                    CheckType::Initialization,
                    "Submodule not checked out: directory is empty".to_string(),
                )
            } else if dir.join(".git").exists() {
                ValidationResult::pass(
                    entry,
                    CheckType::Initialization,
                    Some("Submodule is initialized".to_string()),
                )
            } else {
                ValidationResult::fail(
                    entry,
                    CheckType::Initialization,
                    "Submodule not initialized: .git file/directory not found".to_string(),
                )
            }
        })
        .collect()
}

pub fn validate_dirty<R: CommandRunner>(
    repo_root: &Path,
    entries: &[SubmoduleEntry],
    runner: &R,
) -> Vec<ValidationResult> {
    entries
        .iter()
        .map(|entry| {
            let status = check_repo_status(&repo_root.join(&entry.path), &entry.name, runner);
            if !status.has_uncommitted() {
                return ValidationResult::pass(entry, CheckType::Dirty, None);
            }
            let files = status
                .uncommitted_files
                .iter()
                .map(|f| format!("{} {}", f.status, f.path))
                .collect::<Vec<_>>()
                .join("\n    ");
            ValidationResult::fail(
                entry,
                CheckType::Dirty,
                format!("Uncommitted changes:\n    {}", files),
            )
        })
        .collect()
}

pub fn validate_unpushed<R: CommandRunner>(
    repo_root: &Path,
    entries: &[SubmoduleEntry],
    runner: &R,
) -> Vec<ValidationResult> {
    entries
        .iter()
        .map(|entry| {
            let status = check_repo_status(&repo_root.join(&entry.path), &entry.name, runner);
            match status.commits_ahead {
                0 => ValidationResult::pass(entry, CheckType::Unpushed, None),
                1 => ValidationResult::fail(entry, CheckType::Unpushed, "1 unpushed commit".to_string()),
                n => ValidationResult::fail(entry, CheckType::Unpushed, format!("{} unpushed commits", n)),
            }
        })
        .collect()
}

/// An unreadable directory is treated as not empty.
fn is_empty_dir(dir: &Path) -> bool {
    fs::read_dir(dir).is_ok_and(|mut entries| entries.next().is_none())
}
