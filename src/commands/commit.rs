//! # Commit Command Implementation
//!
//! This module implements the `commit` subcommand (alias `git-commit`),
//! which commits staged changes in every submodule and then in the parent
//! repository, using the same message everywhere.
//!
//! A repository is committed only when `git diff --cached --quiet` reports
//! staged changes. `-m/--message` is required; without it the command exits
//! with 2.

use anyhow::Result;
use clap::Args;

use submoduler::defaults::PARENT_DISPLAY_NAME;
use submoduler::exit_codes;
use submoduler::git::GitRepo;
use submoduler::output::{failure, header, info, success};
use submoduler::process::CommandRunner;

use super::{dry_run_suffix, Context, SubmoduleFilter};

/// Commit staged changes across submodules
#[derive(Args, Debug, Default, Clone)]
pub struct CommitArgs {
    /// Commit message
    #[arg(short, long, value_name = "MSG")]
    pub message: Option<String>,

    /// Commit all tracked changes, staged or not
    #[arg(short, long)]
    pub all: bool,

    /// Amend the last commit
    #[arg(long)]
    pub amend: bool,

    /// Allow a commit with no changes
    #[arg(long)]
    pub allow_empty: bool,

    /// Skip commit hooks
    #[arg(long)]
    pub no_verify: bool,

    /// GPG-sign commits, optionally with a specific key
    #[arg(long, value_name = "KEY", num_args = 0..=1, require_equals = true, default_missing_value = "")]
    pub gpg_sign: Option<String>,

    /// Override the commit author
    #[arg(long, value_name = "AUTHOR")]
    pub author: Option<String>,

    /// Override the author date
    #[arg(long, value_name = "DATE")]
    pub date: Option<String>,

    /// Show the diff in the commit message editor and print messages
    #[arg(short, long)]
    pub verbose: bool,

    /// Preview without committing
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub filter: SubmoduleFilter,
}

impl CommitArgs {
    /// Arguments for `git`, starting with `commit`.
    fn git_args(&self, message: &str) -> Vec<String> {
        let mut args = vec!["commit".to_string()];
        let flags = [
            (self.all, "--all"),
            (self.amend, "--amend"),
            (self.allow_empty, "--allow-empty"),
            (self.no_verify, "--no-verify"),
        ];
        args.extend(
            flags
                .iter()
                .filter(|(on, _)| *on)
                .map(|(_, flag)| flag.to_string()),
        );
        match self.gpg_sign.as_deref() {
            Some("") => args.push("--gpg-sign".to_string()),
            Some(key) => args.push(format!("--gpg-sign={}", key)),
            None => {}
        }
        if let Some(author) = &self.author {
            args.push(format!("--author={}", author));
        }
        if let Some(date) = &self.date {
            args.push(format!("--date={}", date));
        }
        if self.verbose {
            args.push("--verbose".to_string());
        }
        args.push("-m".to_string());
        args.push(message.to_string());
        args
    }
}

/// Execute the `commit` command.
pub fn execute<R: CommandRunner>(args: CommitArgs, ctx: &Context<R>) -> Result<i32> {
    let out = &ctx.out;
    let Some(message) = args.message.clone().filter(|m| !m.is_empty()) else {
        println!("{}", failure(out, "Commit message required. Use -m flag."));
        return Ok(exit_codes::ERROR);
    };

    println!(
        "{}",
        header(&format!("Committing Changes{}", dry_run_suffix(args.dry_run)))
    );

    let runner = ctx.runner();
    let mut committed = 0;

    for entry in ctx.entries(&args.filter)? {
        let dir = ctx.submodule_dir(&entry);
        if !dir.exists() {
            continue;
        }
        if commit_repository(&args, ctx, &GitRepo::new(dir, runner), &entry.name, &message)? {
            committed += 1;
        }
    }

    let parent = GitRepo::new(&ctx.repo_root, runner);
    if commit_repository(&args, ctx, &parent, PARENT_DISPLAY_NAME, &message)? {
        committed += 1;
    }

    if committed == 0 {
        println!("\n{}", info(out, "No changes to commit"));
    } else {
        println!(
            "\n{}",
            success(out, &format!("Committed {} repositories", committed))
        );
    }
    Ok(exit_codes::SUCCESS)
}

/// Whether a commit was made (or would be, in a dry run).
fn commit_repository<R: CommandRunner>(
    args: &CommitArgs,
    ctx: &Context<R>,
    repo: &GitRepo<'_, R>,
    name: &str,
    message: &str,
) -> Result<bool> {
    let out = &ctx.out;
    if !repo.has_staged_changes() && !args.allow_empty {
        return Ok(false);
    }

    println!("\n{}", info(out, &format!("Committing {}", name)));

    if args.dry_run {
        println!("  Would commit with message: {}", message);
        return Ok(true);
    }

    let git_args = args.git_args(message);
    let git_args: Vec<&str> = git_args.iter().map(String::as_str).collect();
    let result = repo.git(&git_args)?;

    if result.success {
        let sha = repo.short_head().unwrap_or_default();
        println!("{}", success(out, &format!("Committed as {}", sha)));
        if args.verbose {
            println!("  {}", message);
        }
        Ok(true)
    } else {
        println!("{}", failure(out, "Failed to commit"));
        let detail = result.combined();
        if !detail.is_empty() {
            println!("{}", detail);
        }
        Ok(false)
    }
}
