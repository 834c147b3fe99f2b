//! # Release Command Implementation
//!
//! This module implements the `release` subcommand, which runs the whole
//! release workflow in four steps:
//!
//! 1.  `version --sync` to bring every submodule to one gem version
//! 2.  `add --all` followed by `commit -m <message>`
//! 3.  `test`
//! 4.  `push`
//!
//! Each step is the corresponding command's `execute` with arguments built
//! here. The workflow stops at the first step that does not exit with 0.
//! When the tests fail, the commits already exist locally, so instructions
//! for undoing them are printed.

use anyhow::Result;
use clap::Args;
use console::Color;

use submoduler::exit_codes;
use submoduler::output::{failure, paint, success, OutputConfig};
use submoduler::process::CommandRunner;

use super::add::AddArgs;
use super::commit::CommitArgs;
use super::push::PushArgs;
use super::test::TestArgs;
use super::version::VersionArgs;
use super::{add, commit, push, test, version, Context, SubmoduleFilter};

/// Width of the rules around the workflow title.
const REPORT_WIDTH: usize = 80;

/// Release with version sync, commit, test and push
#[derive(Args, Debug, Default, Clone)]
pub struct ReleaseArgs {
    /// Commit message for the release
    #[arg(short, long, value_name = "MSG")]
    pub message: Option<String>,

    /// Preview without changing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Show detailed output from every step
    #[arg(short, long)]
    pub verbose: bool,

    #[command(flatten)]
    pub filter: SubmoduleFilter,
}

/// Execute the `release` command.
pub fn execute<R: CommandRunner>(args: ReleaseArgs, ctx: &Context<R>) -> Result<i32> {
    let out = &ctx.out;
    let rule = "━".repeat(REPORT_WIDTH);
    println!("{}\nSubmoduler Release Workflow\n{}\n", rule, rule);

    let Some(message) = args.message.clone().filter(|m| !m.is_empty()) else {
        println!(
            "{}\n",
            failure(out, "Error: Release message is required. Use -m or --message option")
        );
        return Ok(exit_codes::ERROR);
    };
    println!("{}\n", success(out, &format!("Release message: \"{}\"", message)));

    step(out, 1, "Synchronizing versions");
    let code = version::execute(
        VersionArgs {
            sync: true,
            dry_run: args.dry_run,
            filter: args.filter.clone(),
        },
        ctx,
    )?;
    if !finish_step(out, code, "Versions synchronized", "Version synchronization failed") {
        return Ok(exit_codes::FAILURE);
    }

    step(out, 2, "Committing changes");
    let code = add::execute(
        AddArgs {
            patterns: vec![".".to_string()],
            all: true,
            verbose: args.verbose,
            dry_run: args.dry_run,
            filter: args.filter.clone(),
            ..Default::default()
        },
        ctx,
    )?;
    if code != exit_codes::SUCCESS {
        println!("\n{}", failure(out, "Failed to stage changes"));
        return Ok(exit_codes::FAILURE);
    }
    let code = commit::execute(
        CommitArgs {
            message: Some(message),
            verbose: args.verbose,
            dry_run: args.dry_run,
            filter: args.filter.clone(),
            ..Default::default()
        },
        ctx,
    )?;
    if !finish_step(out, code, "Changes committed", "Commit failed") {
        return Ok(exit_codes::FAILURE);
    }

    step(out, 3, "Running tests");
    let code = test::execute(
        TestArgs {
            verbose: args.verbose,
            filter: args.filter.clone(),
        },
        ctx,
    )?;
    if !finish_step(out, code, "All tests passed", "Tests failed") {
        println!("\n{}", rollback_instructions(out));
        return Ok(exit_codes::FAILURE);
    }

    step(out, 4, "Pushing changes");
    let code = push::execute(
        PushArgs {
            dry_run: args.dry_run,
            filter: args.filter,
            ..Default::default()
        },
        ctx,
    )?;
    if !finish_step(out, code, "Changes pushed", "Push failed") {
        return Ok(exit_codes::FAILURE);
    }

    println!("\n{}\n", success(out, "Release completed successfully!"));
    Ok(exit_codes::SUCCESS)
}

fn step(out: &OutputConfig, number: usize, title: &str) {
    println!(
        "{}\n",
        paint(out, &format!("Step {}: {}...", number, title), Color::Blue)
    );
}

/// Print the step's outcome and report whether the workflow may continue.
fn finish_step(out: &OutputConfig, code: i32, done: &str, failed: &str) -> bool {
    if code == exit_codes::SUCCESS {
        println!("\n{}\n", success(out, done));
        true
    } else {
        println!("\n{}", failure(out, failed));
        false
    }
}

fn rollback_instructions(out: &OutputConfig) -> String {
    [
        paint(out, "Commits created but not pushed.", Color::Yellow),
        String::new(),
        "To rollback commits:".to_string(),
        "  cd <submodule> && git reset --soft HEAD~1  # For each submodule".to_string(),
        "  git reset --soft HEAD~1                     # In parent repository".to_string(),
        String::new(),
        "Or fix the issues and run:".to_string(),
        "  submoduler test   # Verify tests pass".to_string(),
        "  submoduler push   # Push the commits".to_string(),
    ]
    .join("\n")
}
