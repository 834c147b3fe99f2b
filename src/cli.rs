//! CLI argument parsing and command dispatch

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};

use submoduler::exit_codes;
use submoduler::output::OutputConfig;
use submoduler::process::SystemRunner;

use crate::commands::{self, Context};

/// Submoduler - Git submodule management tool
#[derive(Parser, Debug)]
#[command(name = "submoduler")]
#[command(version, about, long_about = None)]
#[command(after_help = "Exit codes:\n  0  Success\n  1  Validation or operation failure\n  2  Script error (not a git repository, invalid arguments)")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Root of the parent git repository
    #[arg(
        short = 'C',
        long,
        global = true,
        value_name = "DIR",
        env = "SUBMODULER_REPO_ROOT"
    )]
    repo_root: Option<PathBuf>,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate submodule configuration and working trees
    Report(commands::report::ReportArgs),

    /// Show status across the parent repository and all submodules
    #[command(visible_alias = "git-status")]
    Status(commands::status::StatusArgs),

    /// Stage changes across submodules
    #[command(visible_alias = "git-add")]
    Add(commands::add::AddArgs),

    /// Commit staged changes across submodules
    #[command(visible_alias = "git-commit")]
    Commit(commands::commit::CommitArgs),

    /// Push submodules and the parent repository
    Push(commands::push::PushArgs),

    /// Manage gem versions across submodules
    Version(commands::version::VersionArgs),

    /// Run tests across submodules
    Test(commands::test::TestArgs),

    /// Release with version sync, commit, test and push
    Release(commands::release::ReleaseArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command, returning the process exit code.
    pub fn execute(self) -> Result<i32> {
        init_logging(&self.log_level);

        if let Commands::Completions(args) = self.command {
            commands::completions::execute(args)?;
            return Ok(exit_codes::SUCCESS);
        }

        let repo_root = match self.repo_root {
            Some(root) => root,
            None => std::env::current_dir().context("Failed to get current directory")?,
        };

        if !repo_root.join(".git").exists() {
            println!("Error: Not a git repository");
            println!("Please run this command from the root of a git repository");
            return Ok(exit_codes::ERROR);
        }

        let ctx = Context {
            repo_root,
            out: OutputConfig::from_env_and_flag(&self.color),
            runner: SystemRunner,
        };

        match self.command {
            Commands::Report(args) => commands::report::execute(args, &ctx),
            Commands::Status(args) => commands::status::execute(args, &ctx),
            Commands::Add(args) => commands::add::execute(args, &ctx),
            Commands::Commit(args) => commands::commit::execute(args, &ctx),
            Commands::Push(args) => commands::push::execute(args, &ctx),
            Commands::Version(args) => commands::version::execute(args, &ctx),
            Commands::Test(args) => commands::test::execute(args, &ctx),
            Commands::Release(args) => commands::release::execute(args, &ctx),
            Commands::Completions(_) => Ok(exit_codes::SUCCESS),
        }
    }
}

/// `RUST_LOG`, when set, takes precedence over `--log-level`.
fn init_logging(level: &str) {
    let mut builder = env_logger::Builder::new();
    builder.parse_filters(level);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.format_timestamp(None).format_target(false);
    let _ = builder.try_init();
}
