//! # Submoduler CLI
//!
//! This is the binary entry point for the `submoduler` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Executing the appropriate command based on the parsed arguments.
//! - Translating the command's outcome into the process exit code.
//!
//! The core application logic is defined in the `lib.rs` library crate, ensuring
//! that the binary is a thin wrapper around the reusable library functionality.

mod cli;
mod commands;

use clap::Parser;

use submoduler::exit_codes;

fn main() {
    let cli = cli::Cli::parse();
    let code = match cli.execute() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit_codes::ERROR
        }
    };
    std::process::exit(code);
}
