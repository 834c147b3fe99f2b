//! # Report Command Implementation
//!
//! This module implements the `report` subcommand, which validates every
//! discovered submodule and prints a configuration report.
//!
//! ## Checks
//!
//! - **Path**: the configured path is relative and exists
//! - **Initialization**: the submodule is checked out with a `.git`
//! - **Clean status**: no uncommitted changes
//! - **Push status**: no commits ahead of the upstream
//!
//! After the checks, submodules that override a parent default are listed
//! grouped by key. The command exits with 1 when any check failed.

use anyhow::Result;
use clap::{Args, ValueEnum};
use console::Color;
use serde_json::json;

use submoduler::config::ConfigMap;
use submoduler::discovery::{Discovery, Source};
use submoduler::entry::SubmoduleEntry;
use submoduler::exit_codes;
use submoduler::output::{emoji, paint, plural, rule, OutputConfig};
use submoduler::process::CommandRunner;
use submoduler::validation::{validate_all, CheckType, ValidationResult};

use super::{timestamp, Context, SubmoduleFilter};

/// Validate submodule configuration and working trees
#[derive(Args, Debug, Default)]
pub struct ReportArgs {
    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: ReportFormat,

    #[command(flatten)]
    pub filter: SubmoduleFilter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum ReportFormat {
    /// Human-readable report
    #[default]
    Text,
    /// Machine-readable JSON
    Json,
}

/// Execute the `report` command.
pub fn execute<R: CommandRunner>(args: ReportArgs, ctx: &Context<R>) -> Result<i32> {
    let Discovery {
        source,
        entries,
        parent_defaults,
    } = match ctx.discovery(&args.filter) {
        Ok(found) => found,
        Err(e) => {
            println!("Error parsing .gitmodules: {:#}", e);
            return Ok(exit_codes::FAILURE);
        }
    };

    if source == Source::None {
        println!("No .submoduler.ini files found. No submodules configured.");
        return Ok(exit_codes::SUCCESS);
    }

    let results = validate_all(&ctx.repo_root, &entries, ctx.runner());

    match args.format {
        ReportFormat::Text => {
            println!("{}", format_report(&ctx.out, source, &entries, &results, &timestamp()));
            let overrides = format_overrides(&entries, &parent_defaults);
            if !overrides.is_empty() {
                println!("{}", overrides);
            }
        }
        ReportFormat::Json => {
            let passed = results.iter().filter(|r| r.passed()).count();
            let report = json!({
                "source": source,
                "submodules": entries,
                "parent_defaults": parent_defaults,
                "results": results,
                "summary": { "passed": passed, "failed": results.len() - passed },
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(if results.iter().any(|r| r.failed()) {
        exit_codes::FAILURE
    } else {
        exit_codes::SUCCESS
    })
}

fn format_report(
    out: &OutputConfig,
    source: Source,
    entries: &[SubmoduleEntry],
    results: &[ValidationResult],
    generated: &str,
) -> String {
    let sections = [
        format!(
            "Submodule Configuration Report\nGenerated: {}\n{}",
            generated,
            rule()
        ),
        format_configuration(out, source, entries.len()),
        format_section(
            out,
            &format!("{}Path Validation", emoji(out, "📁 ", "")),
            results,
            &[CheckType::PathRelative, CheckType::PathExists],
        ),
        format_section(
            out,
            &format!("{}Initialization Check", emoji(out, "🔧 ", "")),
            results,
            &[CheckType::Initialization],
        ),
        format_section(
            out,
            &format!("{}Clean Status Check", emoji(out, "🔍 ", "")),
            results,
            &[CheckType::Dirty],
        ),
        format_section(
            out,
            &format!("{}Push Status Check", emoji(out, "📤 ", "")),
            results,
            &[CheckType::Unpushed],
        ),
        format_summary(out, results),
    ];
    sections.join("\n\n")
}

fn format_configuration(out: &OutputConfig, source: Source, count: usize) -> String {
    let mut lines = vec![format!(
        "{}Submodule Configuration Check",
        emoji(out, "📋 ", "")
    )];
    let found = match source {
        Source::SubmodulerIni => "Found .submoduler.ini files",
        _ => "Found .gitmodules",
    };

    if count > 0 {
        lines.push(format!("  {} {}", paint(out, "✓", Color::Green), found));
        lines.push(format!(
            "  {} Parsed {}",
            paint(out, "✓", Color::Green),
            plural(count, "submodule entry", "submodule entries")
        ));
    } else {
        lines.push(format!(
            "  {} No submodules configured",
            paint(out, "✗", Color::Red)
        ));
    }
    lines.join("\n")
}

fn format_section(
    out: &OutputConfig,
    title: &str,
    results: &[ValidationResult],
    kinds: &[CheckType],
) -> String {
    let selected: Vec<&ValidationResult> = results
        .iter()
        .filter(|r| kinds.contains(&r.check_type))
        .collect();
    if selected.is_empty() {
        return format!("{}\n  No checks performed", title);
    }

    let mut lines = vec![title.to_string()];
    for result in selected {
        if result.passed() {
            lines.push(format!(
                "  {} {}",
                paint(out, "✓", Color::Green),
                result.submodule_name
            ));
        } else {
            lines.push(format!(
                "  {} {}",
                paint(out, "✗", Color::Red),
                result.submodule_name
            ));
            if let Some(message) = &result.message {
                lines.push(format!("    {}", message));
            }
        }
    }
    lines.join("\n")
}

fn format_summary(out: &OutputConfig, results: &[ValidationResult]) -> String {
    let passed = results.iter().filter(|r| r.passed()).count();
    let failed = results.len() - passed;
    let failed_color = if failed > 0 { Color::Red } else { Color::Green };
    format!(
        "{}\nSummary: {}, {}",
        rule(),
        paint(out, &format!("{} passed", passed), Color::Green),
        paint(out, &format!("{} failed", failed), failed_color)
    )
}

/// Overrides of parent defaults, grouped by key in first-seen order.
///
/// Empty when there are no parent defaults or nothing overrides them.
fn format_overrides(entries: &[SubmoduleEntry], parent_defaults: &ConfigMap) -> String {
    if entries.is_empty() || parent_defaults.is_empty() {
        return String::new();
    }

    let mut by_key: Vec<(&str, Vec<(&str, &str)>)> = Vec::new();
    for entry in entries {
        for key in &entry.config_overrides {
            let value = entry.config.get(key).unwrap_or_default();
            let name = entry.name.as_str();
            match by_key.iter_mut().find(|(k, _)| *k == key.as_str()) {
                Some((_, list)) => list.push((name, value)),
                None => by_key.push((key.as_str(), vec![(name, value)])),
            }
        }
    }
    if by_key.is_empty() {
        return String::new();
    }

    let mut lines = vec!["\n=== Configuration Overrides ===\n".to_string()];
    for (key, overrides) in by_key {
        lines.push(format!("\n{}:", key));
        lines.push(format!(
            "  Parent default: {}",
            parent_defaults.get(key).unwrap_or_default()
        ));
        lines.push(String::new());
        for (name, value) in overrides {
            lines.push(format!("  {} → {}", name, value));
        }
    }
    lines.join("\n")
}
