//! Subprocess execution
//!
//! Everything submoduler does to a repository goes through `git`, `bundle`
//! or a test runner. [`CommandRunner`] is the seam for that: it runs a
//! program in an explicitly given working directory and reports its exit
//! status and output. The process's own current directory is never changed,
//! so calls for different submodules cannot interfere with each other.
//!
//! [`SystemRunner`] is the real implementation. Tests substitute their own
//! runner to avoid depending on the host's git configuration.
//!
//! Calls block until the child exits. There is no timeout.

use std::path::Path;
use std::process::{Command, Stdio};

use log::debug;

use crate::error::{Error, Result};

/// Exit status and captured output of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    /// Exit code, `None` if the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Trimmed stdout.
    pub fn text(&self) -> &str {
        self.stdout.trim()
    }

    /// stdout followed by stderr, trimmed, for showing a failure to the user.
    pub fn combined(&self) -> String {
        let mut out = self.stdout.trim_end().to_string();
        let err = self.stderr.trim_end();
        if !err.is_empty() {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(err);
        }
        out.trim().to_string()
    }
}

/// Runs external programs on behalf of the library.
pub trait CommandRunner {
    /// Run `program` with `args` in `cwd`, capturing stdout and stderr.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Command`] only if the program could not be started.
    /// A program that starts and exits non-zero is reported through
    /// [`CommandOutput::success`].
    fn run(&self, program: &str, args: &[&str], cwd: &Path) -> Result<CommandOutput>;

    /// Run `program` attached to the user's terminal so its output streams
    /// live and it can prompt (e.g. `git add --patch`). Nothing is captured.
    fn run_interactive(&self, program: &str, args: &[&str], cwd: &Path) -> Result<CommandOutput> {
        self.run(program, args, cwd)
    }
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(&self, program: &str, args: &[&str], cwd: &Path) -> Result<CommandOutput> {
        (**self).run(program, args, cwd)
    }

    fn run_interactive(&self, program: &str, args: &[&str], cwd: &Path) -> Result<CommandOutput> {
        (**self).run_interactive(program, args, cwd)
    }
}

/// Runs commands with `std::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str], cwd: &Path) -> Result<CommandOutput> {
        debug!("Running `{}` in {}", render(program, args), cwd.display());
        let output = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| Error::Command {
                command: render(program, args),
                message: e.to_string(),
            })?;

        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn run_interactive(&self, program: &str, args: &[&str], cwd: &Path) -> Result<CommandOutput> {
        debug!(
            "Running `{}` interactively in {}",
            render(program, args),
            cwd.display()
        );
        let status = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .status()
            .map_err(|e| Error::Command {
                command: render(program, args),
                message: e.to_string(),
            })?;

        Ok(CommandOutput {
            success: status.success(),
            code: status.code(),
            ..Default::default()
        })
    }
}

/// Render a command line for messages and logs.
pub fn render(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

/// A scripted runner for tests of code built on [`CommandRunner`].
pub mod fake {
    use std::cell::RefCell;
    use std::path::{Path, PathBuf};

    use super::{render, CommandOutput, CommandRunner};
    use crate::error::Result;

    struct Reply {
        command: String,
        cwd: Option<PathBuf>,
        output: CommandOutput,
    }

    /// Replies to known command lines with canned output; anything else
    /// exits with status 1. Every call is recorded with its directory.
    ///
    /// A reply scripted for a directory takes precedence over one scripted
    /// for every directory.
    #[derive(Default)]
    pub struct FakeRunner {
        replies: Vec<Reply>,
        pub calls: RefCell<Vec<(String, PathBuf)>>,
    }

    impl FakeRunner {
        pub fn new() -> Self {
            Self::default()
        }

        /// Reply to `command` with a successful exit and `stdout`.
        pub fn ok(self, command: &str, stdout: &str) -> Self {
            self.reply(command, None, succeeded(stdout))
        }

        /// Reply to `command` with exit status 1 and `stderr`.
        pub fn fail(self, command: &str, stderr: &str) -> Self {
            self.reply(command, None, failed(stderr))
        }

        /// [`ok`](Self::ok), only when run in `cwd`.
        pub fn ok_in(self, cwd: &Path, command: &str, stdout: &str) -> Self {
            self.reply(command, Some(cwd), succeeded(stdout))
        }

        /// [`fail`](Self::fail), only when run in `cwd`.
        pub fn fail_in(self, cwd: &Path, command: &str, stderr: &str) -> Self {
            self.reply(command, Some(cwd), failed(stderr))
        }

        fn reply(mut self, command: &str, cwd: Option<&Path>, output: CommandOutput) -> Self {
            self.replies.push(Reply {
                command: command.to_string(),
                cwd: cwd.map(Path::to_path_buf),
                output,
            });
            self
        }

        pub fn commands(&self) -> Vec<String> {
            self.calls.borrow().iter().map(|(c, _)| c.clone()).collect()
        }

        /// Directories in which `command` ran, in call order.
        pub fn dirs_for(&self, command: &str) -> Vec<PathBuf> {
            self.calls
                .borrow()
                .iter()
                .filter(|(c, _)| c == command)
                .map(|(_, dir)| dir.clone())
                .collect()
        }
    }

    fn succeeded(stdout: &str) -> CommandOutput {
        CommandOutput {
            success: true,
            code: Some(0),
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    fn failed(stderr: &str) -> CommandOutput {
        CommandOutput {
            success: false,
            code: Some(1),
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }

    impl CommandRunner for FakeRunner {
        fn run(&self, program: &str, args: &[&str], cwd: &Path) -> Result<CommandOutput> {
            let line = render(program, args);
            self.calls.borrow_mut().push((line.clone(), cwd.to_path_buf()));

            let reply = self
                .replies
                .iter()
                .filter(|r| r.command == line && r.cwd.as_deref().map_or(true, |dir| dir == cwd))
                .min_by_key(|r| r.cwd.is_none());

            Ok(reply.map(|r| r.output.clone()).unwrap_or(CommandOutput {
                success: false,
                code: Some(1),
                ..Default::default()
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_render() {
        assert_eq!(render("git", &["status", "--porcelain"]), "git status --porcelain");
        assert_eq!(render("rspec", &[]), "rspec");
    }

    #[test]
    fn test_combined_joins_streams() {
        let out = CommandOutput {
            success: false,
            code: Some(1),
            stdout: "out\n".to_string(),
            stderr: "err\n".to_string(),
        };
        assert_eq!(out.combined(), "out\nerr");
    }

    #[test]
    fn test_combined_stderr_only() {
        let out = CommandOutput {
            stderr: "fatal: nope\n".to_string(),
            ..Default::default()
        };
        assert_eq!(out.combined(), "fatal: nope");
    }

    #[test]
    fn test_system_runner_missing_program() {
        let temp = TempDir::new().unwrap();
        let err = SystemRunner
            .run("definitely-not-a-real-program-xyz", &[], temp.path())
            .unwrap_err();
        assert!(matches!(err, Error::Command { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_uses_working_directory() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("marker.txt"), "x").unwrap();
        let out = SystemRunner.run("ls", &[], temp.path()).unwrap();
        assert!(out.success);
        assert!(out.stdout.contains("marker.txt"));
    }

    #[test]
    fn test_fake_runner_prefers_directory_reply() {
        use super::fake::FakeRunner;
        use std::path::PathBuf;

        let core = Path::new("/repo/core");
        let runner = FakeRunner::new()
            .ok("git diff --cached --quiet", "")
            .fail_in(core, "git diff --cached --quiet", "");

        let anywhere = runner.run("git", &["diff", "--cached", "--quiet"], Path::new("/repo")).unwrap();
        assert!(anywhere.success);
        let in_core = runner.run("git", &["diff", "--cached", "--quiet"], core).unwrap();
        assert_eq!(in_core.code, Some(1));
        assert_eq!(runner.run("git", &["push"], core).unwrap().code, Some(1));

        assert_eq!(
            runner.dirs_for("git diff --cached --quiet"),
            vec![PathBuf::from("/repo"), core.to_path_buf()]
        );
    }
}
