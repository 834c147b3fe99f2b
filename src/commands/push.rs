//! # Push Command Implementation
//!
//! This module implements the `push` subcommand, which pushes every
//! submodule that has unpushed commits and then the parent repository.
//!
//! Submodules are pushed first so that the parent never references commits
//! missing from a submodule's remote. The first failed push stops the
//! command with exit code 1. A repository without an upstream branch is
//! skipped with a hint instead of failing.

use anyhow::Result;
use clap::Args;

use submoduler::defaults::DEFAULT_REMOTE;
use submoduler::exit_codes;
use submoduler::git::GitRepo;
use submoduler::output::{failure, header, info, success, warning};
use submoduler::process::CommandRunner;
use submoduler::status::check_repo_status;

use super::{dry_run_suffix, Context, SubmoduleFilter};

/// Push submodules and the parent repository
#[derive(Args, Debug, Clone)]
pub struct PushArgs {
    /// Remote to push to
    #[arg(long, value_name = "NAME", default_value = DEFAULT_REMOTE)]
    pub remote: String,

    /// Force push
    #[arg(short, long)]
    pub force: bool,

    /// Preview without pushing
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub filter: SubmoduleFilter,
}

impl Default for PushArgs {
    fn default() -> Self {
        Self {
            remote: DEFAULT_REMOTE.to_string(),
            force: false,
            dry_run: false,
            filter: SubmoduleFilter::default(),
        }
    }
}

/// A submodule with commits waiting to be pushed.
struct Pending {
    name: String,
    repo_dir: std::path::PathBuf,
    branch: Option<String>,
}

/// Execute the `push` command.
pub fn execute<R: CommandRunner>(args: PushArgs, ctx: &Context<R>) -> Result<i32> {
    let out = &ctx.out;
    let runner = ctx.runner();

    println!(
        "{}",
        header(&format!("Pushing Submodules{}", dry_run_suffix(args.dry_run)))
    );

    let mut pending = Vec::new();
    for entry in ctx.entries(&args.filter)? {
        let dir = ctx.submodule_dir(&entry);
        if !dir.exists() {
            continue;
        }
        let status = check_repo_status(&dir, &entry.name, runner);
        if !status.is_initialized || !status.has_unpushed() {
            continue;
        }
        if status.has_uncommitted() {
            println!(
                "{}",
                warning(out, &format!("{} has uncommitted changes", entry.name))
            );
        }
        pending.push(Pending {
            name: entry.name,
            repo_dir: dir,
            branch: status.branch,
        });
    }

    if pending.is_empty() {
        println!("{}", success(out, "No submodules have unpushed commits"));
    }

    let total = pending.len();
    for (index, submodule) in pending.iter().enumerate() {
        println!(
            "\n{}",
            info(
                out,
                &format!(
                    "Pushing submodule {}/{}: {}",
                    index + 1,
                    total,
                    submodule.name
                )
            )
        );
        let repo = GitRepo::new(&submodule.repo_dir, runner);
        if !push_repository(&args, ctx, &repo, submodule.branch.as_deref())? {
            return Ok(exit_codes::FAILURE);
        }
    }

    push_parent(&args, ctx)
}

fn push_parent<R: CommandRunner>(args: &PushArgs, ctx: &Context<R>) -> Result<i32> {
    let out = &ctx.out;
    let runner = ctx.runner();
    let status = check_repo_status(&ctx.repo_root, "Parent", runner);

    if !status.has_unpushed() {
        println!("\n{}", success(out, "Parent repository is up to date"));
        return Ok(exit_codes::SUCCESS);
    }

    println!("\n{}", info(out, "Pushing parent repository"));
    let repo = GitRepo::new(&ctx.repo_root, runner);
    Ok(if push_repository(args, ctx, &repo, status.branch.as_deref())? {
        exit_codes::SUCCESS
    } else {
        exit_codes::FAILURE
    })
}

/// False only when the push was attempted and failed, or the remote is
/// missing. A repository without upstream counts as handled.
fn push_repository<R: CommandRunner>(
    args: &PushArgs,
    ctx: &Context<R>,
    repo: &GitRepo<'_, R>,
    branch: Option<&str>,
) -> Result<bool> {
    let out = &ctx.out;
    let remote = args.remote.as_str();
    let branch = branch.unwrap_or("HEAD");

    if !repo.remote_exists(remote) {
        println!(
            "{}",
            failure(out, &format!("Remote '{}' not found", remote))
        );
        return Ok(false);
    }

    if repo.remote_tracking_branch().is_none() {
        println!("{}", warning(out, "No remote tracking branch configured"));
        println!("  {}", upstream_hint(remote, branch));
        return Ok(true);
    }

    if args.dry_run {
        println!(
            "{}",
            info(out, &format!("Would push {} to {}", branch, remote))
        );
        return Ok(true);
    }

    let mut git_args = vec!["push", remote, branch];
    if args.force {
        git_args.push("--force");
    }
    let result = repo.git_interactive(&git_args)?;

    if result.success {
        println!(
            "{}",
            success(out, &format!("Successfully pushed to {}/{}", remote, branch))
        );
        Ok(true)
    } else {
        println!("{}", failure(out, "Failed to push"));
        Ok(false)
    }
}

fn upstream_hint(remote: &str, branch: &str) -> String {
    format!(
        "Suggestion: git branch --set-upstream-to={}/{} {}",
        remote, branch, branch
    )
}
