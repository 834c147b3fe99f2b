//! End-to-end tests for the `submoduler completions` command.
//!
//! Completions need no repository, so these run from any directory.

#[allow(dead_code)]
mod common;
#[allow(unused_imports)]
use common::prelude::*;

#[test]
fn test_completions_help() {
    let mut cmd = cargo_bin_cmd!("submoduler");
    cmd.arg("completions")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Generate shell completion scripts",
        ))
        .stdout(predicate::str::contains("bash"))
        .stdout(predicate::str::contains("zsh"))
        .stdout(predicate::str::contains("fish"))
        .stdout(predicate::str::contains("powershell"))
        .stdout(predicate::str::contains("elvish"));
}

#[test]
fn test_completions_bash() {
    let fixture = TestFixture::new();
    fixture
        .command()
        .arg("completions")
        .arg("bash")
        .assert()
        .success()
        .stdout(predicate::str::contains("_submoduler()"))
        .stdout(predicate::str::contains("report"))
        .stdout(predicate::str::contains("git-status"))
        .stdout(predicate::str::contains("release"));
}

#[test]
fn test_completions_zsh() {
    let mut cmd = cargo_bin_cmd!("submoduler");
    cmd.arg("completions")
        .arg("zsh")
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef submoduler"))
        .stdout(predicate::str::contains("push"));
}

#[test]
fn test_completions_fish() {
    let mut cmd = cargo_bin_cmd!("submoduler");
    cmd.arg("completions")
        .arg("fish")
        .assert()
        .success()
        .stdout(predicate::str::contains("complete -c submoduler"));
}

#[test]
fn test_completions_invalid_shell() {
    let mut cmd = cargo_bin_cmd!("submoduler");
    cmd.arg("completions")
        .arg("tcsh")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid value"));
}
