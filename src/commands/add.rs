//! # Add Command Implementation
//!
//! This module implements the `add` subcommand (alias `git-add`), which
//! stages changes inside every submodule and then stages the updated
//! submodule references in the parent repository.
//!
//! ## Functionality
//!
//! - **Patterns**: Paths passed to `git add` in each submodule (default `.`)
//! - **git add flags**: `--all`, `--update`, `--force`, `--intent-to-add`,
//!   `--patch`, `--interactive`, `--ignore-removal` and `--verbose` pass
//!   through unchanged
//! - **Dry Run**: Reports what would be staged without touching the index
//! - **Parent references**: Skipped with `--no-parent`
//!
//! Submodules without uncommitted changes are left alone.

use anyhow::Result;
use clap::Args;

use submoduler::entry::SubmoduleEntry;
use submoduler::exit_codes;
use submoduler::git::GitRepo;
use submoduler::output::{failure, header, info, success};
use submoduler::process::CommandRunner;

use super::{dry_run_suffix, Context, SubmoduleFilter};

/// Stage changes across submodules
#[derive(Args, Debug, Default, Clone)]
pub struct AddArgs {
    /// Paths to stage in each submodule
    #[arg(value_name = "PATTERN", default_value = ".")]
    pub patterns: Vec<String>,

    /// Stage all changes, including removals
    #[arg(short, long)]
    pub all: bool,

    /// Stage tracked files only
    #[arg(short, long)]
    pub update: bool,

    /// Allow adding ignored files
    #[arg(short, long)]
    pub force: bool,

    /// Record only that a path will be added later
    #[arg(short = 'N', long)]
    pub intent_to_add: bool,

    /// Choose hunks interactively
    #[arg(short, long)]
    pub patch: bool,

    /// Stage interactively
    #[arg(short, long)]
    pub interactive: bool,

    /// Ignore removed files
    #[arg(long)]
    pub ignore_removal: bool,

    /// Show staged files
    #[arg(short, long)]
    pub verbose: bool,

    /// Preview without staging
    #[arg(long)]
    pub dry_run: bool,

    /// Don't stage submodule references in the parent repository
    #[arg(long)]
    pub no_parent: bool,

    #[command(flatten)]
    pub filter: SubmoduleFilter,
}

impl AddArgs {
    /// Arguments for `git`, starting with `add`.
    fn git_args(&self) -> Vec<&str> {
        let mut args = vec!["add"];
        let flags = [
            (self.all, "--all"),
            (self.update, "--update"),
            (self.force, "--force"),
            (self.intent_to_add, "--intent-to-add"),
            (self.patch, "--patch"),
            (self.interactive, "--interactive"),
            (self.ignore_removal, "--ignore-removal"),
            (self.verbose, "--verbose"),
        ];
        args.extend(flags.iter().filter(|(on, _)| *on).map(|(_, flag)| *flag));
        if self.patterns.is_empty() {
            args.push(".");
        } else {
            args.extend(self.patterns.iter().map(String::as_str));
        }
        args
    }

    fn needs_terminal(&self) -> bool {
        self.patch || self.interactive
    }
}

/// Execute the `add` command.
pub fn execute<R: CommandRunner>(args: AddArgs, ctx: &Context<R>) -> Result<i32> {
    let out = &ctx.out;
    let runner = ctx.runner();
    let entries = ctx.entries(&args.filter)?;

    println!(
        "{}",
        header(&format!("Staging Changes{}", dry_run_suffix(args.dry_run)))
    );

    let mut total_staged = 0;
    for entry in &entries {
        let dir = ctx.submodule_dir(entry);
        if !dir.exists() {
            continue;
        }
        let repo = GitRepo::new(dir, runner);
        total_staged += stage_in_repository(&args, ctx, &repo, &entry.name)?;
    }

    if !args.no_parent {
        update_parent_references(&args, ctx, &entries)?;
    }

    println!(
        "\n{}",
        success(out, &format!("Total files staged: {}", total_staged))
    );
    Ok(exit_codes::SUCCESS)
}

/// Number of files staged (or that would be staged) in `repo`.
fn stage_in_repository<R: CommandRunner>(
    args: &AddArgs,
    ctx: &Context<R>,
    repo: &GitRepo<'_, R>,
    name: &str,
) -> Result<usize> {
    let out = &ctx.out;
    let changes = repo.uncommitted_files();
    if changes.is_empty() {
        return Ok(0);
    }

    println!("\n{}", info(out, &format!("Staging in {}", name)));

    if args.dry_run {
        println!("  Would stage {} files", changes.len());
        return Ok(changes.len());
    }

    let git_args = args.git_args();
    let result = if args.needs_terminal() {
        repo.git_interactive(&git_args)?
    } else {
        repo.git(&git_args)?
    };

    if !result.success {
        println!("{}", failure(out, "Failed to stage files"));
        let detail = result.combined();
        if !detail.is_empty() {
            println!("{}", detail);
        }
        return Ok(0);
    }

    let staged = repo
        .uncommitted_files()
        .iter()
        .filter(|f| f.is_staged())
        .count();
    if args.verbose {
        println!("{}", success(out, &format!("Staged {} files", staged)));
    }
    Ok(staged)
}

fn update_parent_references<R: CommandRunner>(
    args: &AddArgs,
    ctx: &Context<R>,
    entries: &[SubmoduleEntry],
) -> Result<()> {
    let out = &ctx.out;
    let runner = ctx.runner();
    let parent = GitRepo::new(&ctx.repo_root, runner);

    let changed: Vec<&SubmoduleEntry> = {
        let changes = parent.uncommitted_files();
        entries
            .iter()
            .filter(|e| changes.iter().any(|c| c.path.trim_end_matches('/') == e.path))
            .collect()
    };
    if changed.is_empty() {
        return Ok(());
    }

    println!(
        "\n{}",
        info(out, "Updating submodule references in parent")
    );

    if args.dry_run {
        println!(
            "  Would stage {} submodule reference(s)",
            changed.len()
        );
        return Ok(());
    }

    for entry in changed {
        let result = parent.git(&["add", entry.path.as_str()])?;
        if !result.success {
            println!(
                "{}",
                failure(out, &format!("Failed to stage reference for {}", entry.name))
            );
        }
    }
    println!("{}", success(out, "Staged submodule references"));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixture::{position, Workspace};
    use submoduler::process::fake::FakeRunner;

    #[test]
    fn test_git_args_default_pattern() {
        let args = AddArgs::default();
        assert_eq!(args.git_args(), vec!["add", "."]);
    }

    #[test]
    fn test_git_args_flags_in_order() {
        let args = AddArgs {
            patterns: vec!["lib".to_string(), "spec".to_string()],
            all: true,
            force: true,
            verbose: true,
            ..Default::default()
        };
        assert_eq!(
            args.git_args(),
            vec!["add", "--all", "--force", "--verbose", "lib", "spec"]
        );
        assert!(!args.needs_terminal());
    }

    #[test]
    fn test_patch_needs_terminal() {
        let args = AddArgs {
            patch: true,
            ..Default::default()
        };
        assert!(args.needs_terminal());
        assert!(args.git_args().contains(&"--patch"));
    }

    const PORCELAIN: &str = "git status --porcelain";

    #[test]
    fn test_stages_changed_submodules_then_parent_references() {
        let workspace = Workspace::gitmodules(&["core", "docs"]);
        let runner = FakeRunner::new()
            .ok_in(&workspace.submodule("core"), PORCELAIN, " M lib/core.rb\n")
            .ok_in(&workspace.root(), PORCELAIN, " M submodules/core\n")
            .ok(PORCELAIN, "")
            .ok("git add .", "")
            .ok("git add submodules/core", "");
        let ctx = workspace.context(runner);

        assert_eq!(execute(AddArgs::default(), &ctx).unwrap(), exit_codes::SUCCESS);
        assert_eq!(ctx.runner.dirs_for("git add ."), vec![workspace.submodule("core")]);
        assert_eq!(
            ctx.runner.dirs_for("git add submodules/core"),
            vec![workspace.root()]
        );
        assert!(
            position(&ctx.runner, "git add .") < position(&ctx.runner, "git add submodules/core")
        );
    }

    #[test]
    fn test_no_parent_leaves_parent_index_alone() {
        let workspace = Workspace::gitmodules(&["core"]);
        let runner = FakeRunner::new()
            .ok(PORCELAIN, " M submodules/core\n")
            .ok("git add --all .", "");
        let ctx = workspace.context(runner);
        let args = AddArgs {
            all: true,
            no_parent: true,
            ..Default::default()
        };

        assert_eq!(execute(args, &ctx).unwrap(), exit_codes::SUCCESS);
        assert_eq!(ctx.runner.dirs_for("git add --all ."), vec![workspace.submodule("core")]);
        assert!(ctx.runner.dirs_for(PORCELAIN).iter().all(|d| *d != workspace.root()));
    }

    #[test]
    fn test_dry_run_stages_nothing() {
        let workspace = Workspace::gitmodules(&["core"]);
        let ctx = workspace.context(FakeRunner::new().ok(PORCELAIN, " M submodules/core\n"));
        let args = AddArgs {
            dry_run: true,
            ..Default::default()
        };

        assert_eq!(execute(args, &ctx).unwrap(), exit_codes::SUCCESS);
        assert!(ctx.runner.commands().iter().all(|c| !c.starts_with("git add")));
    }
}
