//! Working tree status of the parent repository and each submodule.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::git::{FileChange, GitRepo};
use crate::process::CommandRunner;

/// Snapshot of one repository's branch, upstream and local changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoStatus {
    pub name: String,
    pub path: PathBuf,
    pub branch: Option<String>,
    pub remote_branch: Option<String>,
    pub uncommitted_files: Vec<FileChange>,
    pub commits_ahead: usize,
    pub commits_behind: usize,
    pub is_initialized: bool,
    pub is_detached: bool,
}

impl RepoStatus {
    /// Status for a directory with no `.git`.
    pub fn uninitialized(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            branch: None,
            remote_branch: None,
            uncommitted_files: Vec::new(),
            commits_ahead: 0,
            commits_behind: 0,
            is_initialized: false,
            is_detached: false,
        }
    }

    /// Nothing uncommitted and nothing waiting to be pushed.
    pub fn is_clean(&self) -> bool {
        self.uncommitted_files.is_empty() && self.commits_ahead == 0
    }

    pub fn is_dirty(&self) -> bool {
        !self.is_clean()
    }

    pub fn has_uncommitted(&self) -> bool {
        !self.uncommitted_files.is_empty()
    }

    pub fn has_unpushed(&self) -> bool {
        self.commits_ahead > 0
    }

    pub fn tracking_configured(&self) -> bool {
        self.remote_branch.is_some()
    }
}

/// Collect the status of the working tree at `path`.
pub fn check_repo_status<R: CommandRunner>(path: &Path, name: &str, runner: &R) -> RepoStatus {
    let repo = GitRepo::new(path, runner);
    if !repo.is_initialized() {
        return RepoStatus::uninitialized(name, path);
    }

    let counts = repo.ahead_behind();
    RepoStatus {
        name: name.to_string(),
        path: path.to_path_buf(),
        branch: repo.current_branch(),
        remote_branch: repo.remote_tracking_branch(),
        uncommitted_files: repo.uncommitted_files(),
        commits_ahead: counts.ahead,
        commits_behind: counts.behind,
        is_initialized: true,
        is_detached: repo.is_detached(),
    }
}
