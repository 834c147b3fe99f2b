//! Git queries and mutations for a single working tree.
//!
//! This uses the system git command, which automatically handles SSH keys,
//! credential helpers and anything else configured in `~/.gitconfig`.
//! Every call runs with the repository directory as its working directory.
//!
//! Read-only queries return `Option` or a default when git fails: an
//! uninitialized submodule, a branch without upstream, or a detached HEAD
//! are ordinary states, not errors.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::process::{CommandOutput, CommandRunner};

/// One line of `git status --porcelain`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FileChange {
    /// The two-character `XY` status code, e.g. `" M"`, `"??"`, `"A "`.
    pub status: String,
    pub path: String,
}

impl FileChange {
    /// Staged in the index (added, modified, deleted, renamed or copied).
    pub fn is_staged(&self) -> bool {
        matches!(self.status.chars().next(), Some('A' | 'M' | 'D' | 'R' | 'C'))
    }
}

/// Commits on either side of the upstream branch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AheadBehind {
    pub ahead: usize,
    pub behind: usize,
}

/// A working tree plus the runner used to invoke git in it.
#[derive(Debug)]
pub struct GitRepo<'a, R> {
    path: PathBuf,
    runner: &'a R,
}

impl<'a, R: CommandRunner> GitRepo<'a, R> {
    pub fn new(path: impl Into<PathBuf>, runner: &'a R) -> Self {
        Self {
            path: path.into(),
            runner,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the directory has a `.git` file or directory.
    pub fn is_initialized(&self) -> bool {
        self.path.join(".git").exists()
    }

    /// Run `git <args>` and capture its output.
    pub fn git(&self, args: &[&str]) -> Result<CommandOutput> {
        self.runner.run("git", args, &self.path)
    }

    /// Run `git <args>` attached to the terminal.
    pub fn git_interactive(&self, args: &[&str]) -> Result<CommandOutput> {
        self.runner.run_interactive("git", args, &self.path)
    }

    /// Trimmed stdout of a successful, non-empty git query.
    fn query(&self, args: &[&str]) -> Option<String> {
        let output = self.git(args).ok()?;
        let text = output.text();
        (output.success && !text.is_empty()).then(|| text.to_string())
    }

    pub fn current_branch(&self) -> Option<String> {
        self.query(&["branch", "--show-current"])
    }

    /// Upstream of the current branch, e.g. `origin/main`.
    pub fn remote_tracking_branch(&self) -> Option<String> {
        self.query(&["rev-parse", "--abbrev-ref", "@{u}"])
    }

    /// Zero on both sides when there is no upstream.
    pub fn ahead_behind(&self) -> AheadBehind {
        self.query(&["rev-list", "--left-right", "--count", "@{u}...HEAD"])
            .map(|text| parse_ahead_behind(&text))
            .unwrap_or_default()
    }

    pub fn uncommitted_files(&self) -> Vec<FileChange> {
        match self.git(&["status", "--porcelain"]) {
            Ok(output) if output.success => parse_porcelain(&output.stdout),
            _ => Vec::new(),
        }
    }

    pub fn has_uncommitted_changes(&self) -> bool {
        !self.uncommitted_files().is_empty()
    }

    pub fn is_detached(&self) -> bool {
        !self
            .git(&["symbolic-ref", "-q", "HEAD"])
            .is_ok_and(|o| o.success)
    }

    pub fn remote_exists(&self, remote: &str) -> bool {
        self.git(&["remote", "get-url", remote])
            .is_ok_and(|o| o.success)
    }

    /// `git diff --cached --quiet` exits 1 exactly when something is staged.
    pub fn has_staged_changes(&self) -> bool {
        self.git(&["diff", "--cached", "--quiet"])
            .is_ok_and(|o| o.code == Some(1))
    }

    pub fn short_head(&self) -> Option<String> {
        self.query(&["rev-parse", "--short", "HEAD"])
    }

    pub fn remote_url(&self) -> Option<String> {
        self.query(&["config", "--get", "remote.origin.url"])
    }
}

/// Parse `git status --porcelain` (v1) output.
pub fn parse_porcelain(output: &str) -> Vec<FileChange> {
    output
        .lines()
        .filter_map(|line| {
            let status = line.get(..2)?;
            let path = line.get(3..)?.trim();
            (!path.is_empty()).then(|| FileChange {
                status: status.to_string(),
                path: path.to_string(),
            })
        })
        .collect()
}

/// Parse `rev-list --left-right --count @{u}...HEAD`: `<behind>\t<ahead>`.
fn parse_ahead_behind(text: &str) -> AheadBehind {
    let mut counts = text.split_whitespace().map(|n| n.parse().unwrap_or(0));
    let behind = counts.next().unwrap_or(0);
    let ahead = counts.next().unwrap_or(0);
    AheadBehind { ahead, behind }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::fake::FakeRunner;
    use tempfile::TempDir;

    #[test]
    fn test_parse_porcelain() {
        let changes = parse_porcelain(" M src/lib.rs\n?? notes.txt\nA  new.rs\nR  old.rs -> new.rs\n");
        assert_eq!(changes.len(), 4);
        assert_eq!(changes[0].status, " M");
        assert_eq!(changes[0].path, "src/lib.rs");
        assert!(!changes[0].is_staged());
        assert_eq!(changes[1].status, "??");
        assert!(!changes[1].is_staged());
        assert!(changes[2].is_staged());
        assert_eq!(changes[3].path, "old.rs -> new.rs");
    }

    #[test]
    fn test_parse_porcelain_empty() {
        assert!(parse_porcelain("").is_empty());
    }

    #[test]
    fn test_parse_ahead_behind() {
        assert_eq!(parse_ahead_behind("2\t5"), AheadBehind { ahead: 5, behind: 2 });
        assert_eq!(parse_ahead_behind("garbage"), AheadBehind::default());
    }

    #[test]
    fn test_queries_run_in_repo_dir() {
        let temp = TempDir::new().unwrap();
        let runner = FakeRunner::new()
            .ok("git branch --show-current", "main\n")
            .ok("git rev-parse --abbrev-ref @{u}", "origin/main\n")
            .ok("git rev-list --left-right --count @{u}...HEAD", "0\t3\n");
        let repo = GitRepo::new(temp.path(), &runner);

        assert_eq!(repo.current_branch().as_deref(), Some("main"));
        assert_eq!(repo.remote_tracking_branch().as_deref(), Some("origin/main"));
        assert_eq!(repo.ahead_behind(), AheadBehind { ahead: 3, behind: 0 });

        for (_, dir) in runner.calls.borrow().iter() {
            assert_eq!(dir, temp.path());
        }
    }

    #[test]
    fn test_failures_degrade() {
        let temp = TempDir::new().unwrap();
        let runner = FakeRunner::new();
        let repo = GitRepo::new(temp.path(), &runner);

        assert!(repo.current_branch().is_none());
        assert!(repo.remote_tracking_branch().is_none());
        assert_eq!(repo.ahead_behind(), AheadBehind::default());
        assert!(repo.uncommitted_files().is_empty());
        assert!(repo.is_detached());
        assert!(!repo.remote_exists("origin"));
        assert!(!repo.is_initialized());
    }

    #[test]
    fn test_has_staged_changes_uses_exit_code() {
        let temp = TempDir::new().unwrap();
        let staged = FakeRunner::new().fail("git diff --cached --quiet", "");
        assert!(GitRepo::new(temp.path(), &staged).has_staged_changes());

        let clean = FakeRunner::new().ok("git diff --cached --quiet", "");
        assert!(!GitRepo::new(temp.path(), &clean).has_staged_changes());
    }
}
