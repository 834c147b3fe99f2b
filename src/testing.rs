//! # Submodule Test Runner
//!
//! Runs the Ruby test suite of one submodule. A submodule is skipped when it
//! is not checked out or has neither a `spec/` nor a `test/` directory.
//! Submodules with a `Gemfile` get a `bundle install` first.
//!
//! ## Command detection
//!
//! | Gemfile | Condition                               | Command                 |
//! |---------|-----------------------------------------|-------------------------|
//! | yes     | `Gemfile.lock` mentions rspec           | `bundle exec rspec`     |
//! | yes     | `Rakefile` mentions spec                | `bundle exec rake spec` |
//! | no      | `rspec` is on `PATH`                    | `rspec`                 |
//! | either  | otherwise                               | `bundle exec rspec`     |

use std::ffi::OsStr;
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use log::info;

use crate::process::{render, CommandOutput, CommandRunner, SystemRunner};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestStatus {
    Passed,
    Failed,
    Skipped,
    Error,
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TestStatus::Passed => "passed",
            TestStatus::Failed => "failed",
            TestStatus::Skipped => "skipped",
            TestStatus::Error => "error",
        };
        f.write_str(s)
    }
}

/// What happened when one submodule's tests were run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestOutcome {
    pub submodule_name: String,
    pub status: TestStatus,
    /// Captured output. Empty for verbose runs, which stream to the terminal.
    pub output: String,
    pub skip_reason: Option<String>,
    pub duration: Duration,
    pub error: Option<String>,
}

impl TestOutcome {
    fn skipped(submodule_name: &str, reason: &str) -> Self {
        Self {
            submodule_name: submodule_name.to_string(),
            status: TestStatus::Skipped,
            output: String::new(),
            skip_reason: Some(reason.to_string()),
            duration: Duration::ZERO,
            error: None,
        }
    }

    fn errored(submodule_name: &str, output: String, error: String, started: Instant) -> Self {
        Self {
            submodule_name: submodule_name.to_string(),
            status: TestStatus::Error,
            output,
            skip_reason: None,
            duration: started.elapsed(),
            error: Some(error),
        }
    }

    /// Failed or errored.
    pub fn is_failure(&self) -> bool {
        matches!(self.status, TestStatus::Failed | TestStatus::Error)
    }
}

/// A test command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestCommand {
    pub program: &'static str,
    pub args: &'static [&'static str],
}

impl fmt::Display for TestCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(self.program, self.args))
    }
}

const BUNDLE_RSPEC: TestCommand = TestCommand {
    program: "bundle",
    args: &["exec", "rspec"],
};
const BUNDLE_RAKE_SPEC: TestCommand = TestCommand {
    program: "bundle",
    args: &["exec", "rake", "spec"],
};
const RSPEC: TestCommand = TestCommand {
    program: "rspec",
    args: &[],
};

/// Runs test suites through a [`CommandRunner`].
#[derive(Debug)]
pub struct TestRunner<R = SystemRunner> {
    runner: R,
    verbose: bool,
    rspec_on_path: bool,
}

impl TestRunner<SystemRunner> {
    pub fn new(verbose: bool) -> Self {
        Self::with_runner(SystemRunner, verbose)
    }
}

impl<R: CommandRunner> TestRunner<R> {
    pub fn with_runner(runner: R, verbose: bool) -> Self {
        Self {
            runner,
            verbose,
            rspec_on_path: which::which(RSPEC.program).is_ok(),
        }
    }

    /// Override the `PATH` lookup for a standalone `rspec`.
    pub fn with_rspec_on_path(mut self, available: bool) -> Self {
        self.rspec_on_path = available;
        self
    }

    /// Look for a standalone `rspec` in `paths` instead of `PATH`.
    pub fn with_rspec_search_path(mut self, paths: impl AsRef<OsStr>, cwd: &Path) -> Self {
        self.rspec_on_path = which::which_in(RSPEC.program, Some(paths), cwd).is_ok();
        self
    }

    /// Run the tests of the submodule checked out at `dir`.
    pub fn run(&self, dir: &Path, submodule_name: &str) -> TestOutcome {
        let started = Instant::now();

        if !dir.join(".git").exists() {
            return TestOutcome::skipped(submodule_name, "Not initialized");
        }
        if !dir.join("spec").is_dir() && !dir.join("test").is_dir() {
            return TestOutcome::skipped(submodule_name, "No tests found");
        }

        if dir.join("Gemfile").exists() {
            if self.verbose {
                info!("Installing dependencies for {}...", submodule_name);
            }
            match self.exec("bundle", &["install"], dir) {
                Ok(out) if out.success => {}
                Ok(out) => {
                    return TestOutcome::errored(
                        submodule_name,
                        out.combined(),
                        "Bundle install failed".to_string(),
                        started,
                    )
                }
                Err(e) => {
                    return TestOutcome::errored(
                        submodule_name,
                        String::new(),
                        format!("Error: {}", e),
                        started,
                    )
                }
            }
        }

        let command = self.detect_test_command(dir);
        if self.verbose {
            info!("Running: {}", command);
        }

        match self.exec(command.program, command.args, dir) {
            Ok(out) => TestOutcome {
                submodule_name: submodule_name.to_string(),
                status: if out.success {
                    TestStatus::Passed
                } else {
                    TestStatus::Failed
                },
                output: out.combined(),
                skip_reason: None,
                duration: started.elapsed(),
                error: (!out.success).then(|| "Tests failed".to_string()),
            },
            Err(e) => {
                TestOutcome::errored(submodule_name, String::new(), format!("Error: {}", e), started)
            }
        }
    }

    /// The command that runs the suite in `dir`.
    pub fn detect_test_command(&self, dir: &Path) -> TestCommand {
        if dir.join("Gemfile").exists() {
            if file_mentions(&dir.join("Gemfile.lock"), "rspec") {
                return BUNDLE_RSPEC;
            }
            if file_mentions(&dir.join("Rakefile"), "spec") {
                return BUNDLE_RAKE_SPEC;
            }
        } else if self.rspec_on_path {
            return RSPEC;
        }
        BUNDLE_RSPEC
    }

    fn exec(&self, program: &str, args: &[&str], dir: &Path) -> crate::error::Result<CommandOutput> {
        if self.verbose {
            self.runner.run_interactive(program, args, dir)
        } else {
            self.runner.run(program, args, dir)
        }
    }
}

fn file_mentions(path: &Path, needle: &str) -> bool {
    fs::read_to_string(path).is_ok_and(|content| content.contains(needle))
}
