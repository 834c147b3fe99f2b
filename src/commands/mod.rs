//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `submoduler` command-line tool. Each subcommand is defined in its own file
//! to keep the logic separated and maintainable.
//!
//! ## Structure
//!
//! Each command module typically contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and the shared
//!   [`Context`], performs the command's logic, and returns the exit code.
//!
//! `release` composes the other commands by calling their `execute`
//! functions with arguments it builds itself.

pub mod add;
pub mod commit;
pub mod completions;
pub mod push;
pub mod release;
pub mod report;
pub mod status;
pub mod version;

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;

use submoduler::discovery::{self, Discovery, Source};
use submoduler::entry::SubmoduleEntry;
use submoduler::output::OutputConfig;
use submoduler::process::{CommandRunner, SystemRunner};

/// State shared by every command of one invocation.
#[derive(Debug)]
pub struct Context<R = SystemRunner> {
    /// Root of the parent repository. Always contains `.git`.
    pub repo_root: PathBuf,
    pub out: OutputConfig,
    /// Runs every git, bundle and test command.
    pub runner: R,
}

impl<R: CommandRunner> Context<R> {
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Discover submodules and apply the `--submodule` filter.
    pub fn discover(&self, filter: &SubmoduleFilter) -> Result<(Source, Vec<SubmoduleEntry>)> {
        let found = self.discovery(filter)?;
        Ok((found.source, found.entries))
    }

    /// Full discovery result, parent defaults included, with the filter applied.
    pub fn discovery(&self, filter: &SubmoduleFilter) -> Result<Discovery> {
        let mut found = discovery::discover(&self.repo_root, self.runner())
            .context("Failed to discover submodules")?;
        found.entries = discovery::filter_by_name(found.entries, &filter.submodules);
        Ok(found)
    }

    /// Discovered submodules only, for commands that do not report the source.
    pub fn entries(&self, filter: &SubmoduleFilter) -> Result<Vec<SubmoduleEntry>> {
        Ok(self.discover(filter)?.1)
    }

    /// Absolute working directory of a submodule.
    pub fn submodule_dir(&self, entry: &SubmoduleEntry) -> PathBuf {
        self.repo_root.join(&entry.path)
    }
}

/// Restrict a command to the named submodules.
#[derive(Args, Debug, Clone, Default)]
pub struct SubmoduleFilter {
    /// Operate only on this submodule (repeatable)
    #[arg(long = "submodule", value_name = "NAME")]
    pub submodules: Vec<String>,
}

/// `" (Dry Run)"` when `dry_run` is set, for command headers.
pub fn dry_run_suffix(dry_run: bool) -> &'static str {
    if dry_run {
        " (Dry Run)"
    } else {
        ""
    }
}

/// Current local time as shown in report headers.
pub fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
