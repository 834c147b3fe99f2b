//! # Completions Command Implementation
//!
//! This module implements the `completions` subcommand, which prints a shell
//! completion script for every `submoduler` command, alias and option.
//! Unlike the other commands it needs no git repository.
//!
//! ## Supported Shells
//!
//! - **Bash**: Add to `.bashrc` or source directly
//! - **Zsh**: Add to `fpath` or source directly
//! - **Fish**: Save to `~/.config/fish/completions/`
//! - **PowerShell**: Add to PowerShell profile
//!
//! ## Example
//!
//! ```bash
//! submoduler completions bash > ~/.local/share/bash-completion/completions/submoduler
//! submoduler completions zsh > ~/.zfunc/_submoduler
//! ```

use anyhow::Result;
use clap::{Args, CommandFactory, ValueEnum};
use clap_complete::{generate, Shell};
use std::io;

use crate::cli::Cli;

/// Shell types for completion generation
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CompletionShell {
    /// Bourne Again Shell
    Bash,
    /// Z Shell
    Zsh,
    /// Fish Shell
    Fish,
    /// PowerShell
    #[value(name = "powershell")]
    PowerShell,
    /// Elvish Shell
    Elvish,
}

impl From<CompletionShell> for Shell {
    fn from(shell: CompletionShell) -> Self {
        match shell {
            CompletionShell::Bash => Shell::Bash,
            CompletionShell::Zsh => Shell::Zsh,
            CompletionShell::Fish => Shell::Fish,
            CompletionShell::PowerShell => Shell::PowerShell,
            CompletionShell::Elvish => Shell::Elvish,
        }
    }
}

/// Generate shell completion scripts
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// The shell to generate completions for
    #[arg(value_enum)]
    pub shell: CompletionShell,
}

/// Execute the `completions` command, writing the script to stdout.
pub fn execute(args: CompletionsArgs) -> Result<()> {
    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(Shell::from(args.shell), &mut cmd, bin_name, &mut io::stdout());
    Ok(())
}
