//! # Status Command Implementation
//!
//! This module implements the `status` subcommand (alias `git-status`),
//! which shows the working tree state of the parent repository followed by
//! every submodule.
//!
//! ## Output Modes
//!
//! - **Normal**: one section per repository with its problems
//! - **Compact** (`--compact`): one line per dirty repository
//! - **Verbose** (`--verbose`): branch, remote, path and every changed file
//! - **Porcelain** (`--porcelain`): `name|branch|remote|uncommitted|ahead|behind`
//!
//! The command exits with 1 when any repository is dirty.

use anyhow::Result;
use clap::Args;
use console::Color;

use submoduler::defaults::PARENT_DISPLAY_NAME;
use submoduler::exit_codes;
use submoduler::output::{emoji, failure, header, paint, section, success, warning, OutputConfig};
use submoduler::process::CommandRunner;
use submoduler::status::{check_repo_status, RepoStatus};

use super::{Context, SubmoduleFilter};

/// Uncommitted files listed per repository in normal mode.
const MAX_LISTED_FILES: usize = 5;

/// Show status across the parent repository and all submodules
#[derive(Args, Debug, Default)]
pub struct StatusArgs {
    /// Show only dirty repositories, one line each
    #[arg(long, conflicts_with = "porcelain")]
    pub compact: bool,

    /// Show branch, remote and every changed file
    #[arg(short, long)]
    pub verbose: bool,

    /// Machine-readable output
    #[arg(long)]
    pub porcelain: bool,

    #[command(flatten)]
    pub filter: SubmoduleFilter,
}

/// Execute the `status` command.
pub fn execute<R: CommandRunner>(args: StatusArgs, ctx: &Context<R>) -> Result<i32> {
    let runner = ctx.runner();
    let mut statuses = vec![check_repo_status(&ctx.repo_root, PARENT_DISPLAY_NAME, runner)];
    for entry in ctx.entries(&args.filter)? {
        statuses.push(check_repo_status(
            &ctx.submodule_dir(&entry),
            &entry.name,
            runner,
        ));
    }

    let out = &ctx.out;
    if args.porcelain {
        for status in &statuses {
            println!("{}", porcelain_line(status));
        }
    } else {
        if args.compact {
            for status in &statuses {
                if let Some(line) = compact_line(out, status, args.verbose) {
                    println!("{}", line);
                }
            }
        } else if args.verbose {
            println!("{}", header("Submodule Status Report (Verbose)"));
            for status in &statuses {
                println!("{}", verbose_block(out, status));
            }
        } else {
            println!("{}", header("Submodule Status Report"));
            for status in &statuses {
                println!("{}", normal_block(out, status));
            }
        }
        println!("{}", summary(out, &statuses));
    }

    Ok(if statuses.iter().all(RepoStatus::is_clean) {
        exit_codes::SUCCESS
    } else {
        exit_codes::FAILURE
    })
}

fn porcelain_line(status: &RepoStatus) -> String {
    format!(
        "{}|{}|{}|{}|{}|{}",
        status.name,
        status.branch.as_deref().unwrap_or_default(),
        status.remote_branch.as_deref().unwrap_or_default(),
        status.uncommitted_files.len(),
        status.commits_ahead,
        status.commits_behind
    )
}

/// `None` for clean repositories unless `show_clean` is set.
fn compact_line(out: &OutputConfig, status: &RepoStatus, show_clean: bool) -> Option<String> {
    if status.is_clean() && !show_clean {
        return None;
    }

    let symbol = if status.is_clean() {
        paint(out, "✓", Color::Green)
    } else {
        paint(out, "✗", Color::Red)
    };
    let mut details = Vec::new();
    if status.has_uncommitted() {
        details.push(format!("{} uncommitted", status.uncommitted_files.len()));
    }
    if status.has_unpushed() {
        details.push(format!("{} ahead", status.commits_ahead));
    }
    let details = if details.is_empty() {
        String::new()
    } else {
        format!(" - {}", details.join(", "))
    };

    Some(format!(
        "{} {} ({}){}",
        symbol,
        status.name,
        status.branch.as_deref().unwrap_or("detached"),
        details
    ))
}

fn normal_block(out: &OutputConfig, status: &RepoStatus) -> String {
    let title = format!(
        "{}{} ({})",
        emoji(out, "📦 ", ""),
        status.name,
        status.branch.as_deref().unwrap_or("detached")
    );
    let mut lines = vec![section(out, &title)];

    if !status.is_initialized {
        lines.push(format!("  {}", warning(out, "Not initialized")));
        return lines.join("\n");
    }

    if status.has_uncommitted() {
        let count = status.uncommitted_files.len();
        lines.push(format!(
            "  {}",
            failure(out, &format!("{} uncommitted files:", count))
        ));
        for file in status.uncommitted_files.iter().take(MAX_LISTED_FILES) {
            lines.push(format!("    {} {}", file.status, file.path));
        }
        if count > MAX_LISTED_FILES {
            lines.push(format!("    ... and {} more", count - MAX_LISTED_FILES));
        }
    }

    if status.has_unpushed() {
        lines.push(format!(
            "  {}",
            warning(
                out,
                &format!(
                    "{} commits ahead of {}",
                    status.commits_ahead,
                    status.remote_branch.as_deref().unwrap_or("remote")
                )
            )
        ));
    }

    if !status.tracking_configured() {
        lines.push(format!("  {}", warning(out, "No remote tracking configured")));
    }

    if status.is_clean() {
        lines.push(format!("  {}", success(out, "Clean - No uncommitted changes")));
        if status.tracking_configured() {
            lines.push(format!("  {}", success(out, "Up to date with remote")));
        }
    }

    lines.join("\n")
}

fn verbose_block(out: &OutputConfig, status: &RepoStatus) -> String {
    let mut lines = vec![
        section(out, &format!("{}{}", emoji(out, "📦 ", ""), status.name)),
        format!("  Branch: {}", status.branch.as_deref().unwrap_or("N/A")),
        format!(
            "  Remote: {}",
            status.remote_branch.as_deref().unwrap_or("No tracking")
        ),
        format!("  Path: {}", status.path.display()),
    ];

    if status.has_uncommitted() {
        lines.push("\n  Uncommitted Changes:".to_string());
        for file in &status.uncommitted_files {
            lines.push(format!("    {} {}", file.status, file.path));
        }
    }
    if status.has_unpushed() {
        lines.push(format!(
            "\n  {}",
            warning(
                out,
                &format!("{} commits ahead of remote", status.commits_ahead)
            )
        ));
    }
    if status.is_clean() {
        lines.push(format!("\n  {}", success(out, "Clean - No changes")));
    }
    lines.push(String::new());

    lines.join("\n")
}

fn summary(out: &OutputConfig, statuses: &[RepoStatus]) -> String {
    let clean = statuses.iter().filter(|s| s.is_clean()).count();
    let dirty = statuses.len() - clean;
    let uncommitted: usize = statuses.iter().map(|s| s.uncommitted_files.len()).sum();
    let unpushed: usize = statuses.iter().map(|s| s.commits_ahead).sum();

    let mut lines = vec![
        header("Summary"),
        format!("Total repositories: {}", statuses.len()),
        format!(
            "Clean: {}, Dirty: {}",
            paint(out, &clean.to_string(), Color::Green),
            paint(out, &dirty.to_string(), Color::Red)
        ),
    ];
    if uncommitted > 0 {
        lines.push(format!("Total uncommitted files: {}", uncommitted));
    }
    if unpushed > 0 {
        lines.push(format!("Total unpushed commits: {}", unpushed));
    }
    lines.join("\n")
}
