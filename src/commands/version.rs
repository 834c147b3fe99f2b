//! # Version Command Implementation
//!
//! This module implements the `version` subcommand, which shows the gem
//! version of every submodule and, with `--sync`, brings them all to one
//! version.
//!
//! The target version is the highest detected version with its patch
//! component bumped. Nothing is written when the versions already agree or
//! when `--dry-run` is given.
//!
//! ## Exit codes
//!
//! - `0` on a dry run, after a fully successful sync, or when no mismatch exists
//! - `1` when versions disagree and `--sync` was not given

use anyhow::Result;
use clap::Args;
use console::Color;
use log::debug;

use submoduler::discovery::Source;
use submoduler::exit_codes;
use submoduler::output::{emoji, paint, plural, OutputConfig};
use submoduler::process::CommandRunner;
use submoduler::version::{
    check_mismatch, detect_version, increment_patch, synchronize, SyncResult, VersionInfo,
    VersionMismatch,
};

use super::{timestamp, Context, SubmoduleFilter};

/// Width of the rules in the version report.
const REPORT_WIDTH: usize = 80;

/// Manage gem versions across submodules
#[derive(Args, Debug, Default, Clone)]
pub struct VersionArgs {
    /// Synchronize all submodules to the next patch version
    #[arg(long)]
    pub sync: bool,

    /// Preview without writing version files
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub filter: SubmoduleFilter,
}

/// Execute the `version` command.
pub fn execute<R: CommandRunner>(args: VersionArgs, ctx: &Context<R>) -> Result<i32> {
    let (source, entries) = ctx.discover(&args.filter)?;
    if source == Source::None {
        println!("No .submoduler.ini files found. No submodules configured.");
        return Ok(exit_codes::SUCCESS);
    }

    let infos: Vec<VersionInfo> = entries
        .iter()
        .map(|entry| detect_version(&ctx.submodule_dir(entry), &entry.name))
        .collect();
    let mismatch = check_mismatch(&infos);

    let target = match &mismatch {
        Some(m) => Some(increment_patch(&m.highest_version)?),
        None => None,
    };

    let sync_results = match (&target, args.sync && !args.dry_run) {
        (Some(target), true) => {
            debug!("Synchronizing versions to {}", target);
            Some(synchronize(&infos, target))
        }
        _ => None,
    };

    let report = VersionReport {
        infos: &infos,
        mismatch: mismatch.as_ref(),
        target: target.as_deref(),
        sync_results: sync_results.as_deref(),
        dry_run: args.dry_run,
    };
    println!("{}", report.format(&ctx.out, &timestamp()));

    if args.dry_run {
        return Ok(exit_codes::SUCCESS);
    }
    if let Some(results) = &sync_results {
        return Ok(if results.iter().all(SyncResult::success) {
            exit_codes::SUCCESS
        } else {
            exit_codes::FAILURE
        });
    }
    Ok(if mismatch.is_some() && !args.sync {
        exit_codes::FAILURE
    } else {
        exit_codes::SUCCESS
    })
}

struct VersionReport<'a> {
    infos: &'a [VersionInfo],
    mismatch: Option<&'a VersionMismatch>,
    /// Next patch after the highest version, when versions disagree.
    target: Option<&'a str>,
    sync_results: Option<&'a [SyncResult]>,
    dry_run: bool,
}

impl VersionReport<'_> {
    fn format(&self, out: &OutputConfig, generated: &str) -> String {
        let mut parts = vec![
            format!(
                "Submodule Version Report\nGenerated: {}\n{}",
                generated,
                "━".repeat(REPORT_WIDTH)
            ),
            self.table(out),
        ];
        if let Some(mismatch) = self.mismatch {
            parts.push(self.mismatch_warning(out, mismatch));
        }
        if let Some(results) = self.sync_results {
            parts.push(sync_summary(out, results));
        }
        parts.push(self.footer());
        parts.join("\n\n")
    }

    fn table(&self, out: &OutputConfig) -> String {
        let name_width = column_width(self.infos.iter().map(|i| i.submodule_name.len()), 15);
        let gem_width = column_width(
            self.infos
                .iter()
                .map(|i| i.gem_name.as_deref().unwrap_or("N/A").len()),
            20,
        );
        let version_width = column_width(
            self.infos
                .iter()
                .map(|i| i.version.as_deref().unwrap_or("N/A").len()),
            10,
        );

        let mut lines = vec![
            format!("{}Gem Versions", emoji(out, "📦 ", "")),
            String::new(),
            format!(
                "  {:<nw$}  {:<gw$}  {:<vw$}",
                "Submodule",
                "Gem Name",
                "Version",
                nw = name_width,
                gw = gem_width,
                vw = version_width
            ),
            format!("  {}", "─".repeat(name_width + gem_width + version_width + 4)),
        ];

        for info in self.infos {
            let shown = info
                .version
                .as_deref()
                .or(info.error.as_deref())
                .unwrap_or("N/A");
            let color = if info.error.is_some() {
                Color::Yellow
            } else {
                match self.mismatch {
                    Some(m) if info.version.as_deref() != Some(m.highest_version.as_str()) => {
                        Color::Red
                    }
                    _ => Color::Green,
                }
            };
            lines.push(format!(
                "  {:<nw$}  {:<gw$}  {}",
                info.submodule_name,
                info.gem_name.as_deref().unwrap_or("N/A"),
                paint(out, shown, color),
                nw = name_width,
                gw = gem_width
            ));
        }
        lines.join("\n")
    }

    fn mismatch_warning(&self, out: &OutputConfig, mismatch: &VersionMismatch) -> String {
        let highest = mismatch.highest_version.as_str();
        let mut lines = vec![
            paint(
                out,
                &format!("{}Version Mismatch Detected", emoji(out, "⚠️  ", "")),
                Color::Yellow,
            ),
            String::new(),
            format!("  Highest version: {}", paint(out, highest, Color::Green)),
            String::new(),
            "  Versions found:".to_string(),
        ];

        let mut groups: Vec<&(String, Vec<String>)> = mismatch.groups.iter().collect();
        groups.sort_by(|a, b| b.0.cmp(&a.0));
        for (version, names) in groups {
            let (marker, color) = if version == highest {
                ("✓", Color::Green)
            } else {
                ("✗", Color::Red)
            };
            lines.push(format!(
                "    {} {}: {}",
                paint(out, marker, color),
                version,
                names.join(", ")
            ));
        }

        if let Some(target) = self.target {
            if self.dry_run {
                lines.push(String::new());
                lines.push(format!(
                    "  Would synchronize all to: {}",
                    paint(out, target, Color::Blue)
                ));
            } else if self.sync_results.is_none() {
                lines.push(String::new());
                lines.push(format!(
                    "  Run with --sync to update all to: {}",
                    paint(out, target, Color::Blue)
                ));
            }
        }
        lines.join("\n")
    }

    fn footer(&self) -> String {
        let total = self.infos.len();
        let with_version = self.infos.iter().filter(|i| i.version.is_some()).count();
        let without_version = total - with_version;

        let mut parts = vec![format!("Total: {}", plural(total, "submodule", "submodules"))];
        if with_version > 0 {
            parts.push(format!("{} with versions", with_version));
        }
        if without_version > 0 {
            parts.push(format!("{} without versions", without_version));
        }
        format!("{}\n{}", "━".repeat(REPORT_WIDTH), parts.join(", "))
    }
}

fn sync_summary(out: &OutputConfig, results: &[SyncResult]) -> String {
    let updated = results.iter().filter(|r| r.success()).count();
    let failed = results.len() - updated;

    let mut lines = vec![
        paint(out, "✓ Version Synchronization Complete", Color::Green),
        String::new(),
        format!("  Updated {}", plural(updated, "submodule", "submodules")),
    ];
    if failed > 0 {
        lines.push(format!(
            "  {}",
            paint(
                out,
                &format!("Failed to update {}", plural(failed, "submodule", "submodules")),
                Color::Red
            )
        ));
    }
    lines.push(String::new());
    lines.push("  Changes:".to_string());
    for result in results {
        match &result.error {
            None => lines.push(format!(
                "    {} {}: {} → {}",
                paint(out, "✓", Color::Green),
                result.submodule_name,
                result.old_version.as_deref().unwrap_or("N/A"),
                result.new_version
            )),
            Some(error) => lines.push(format!(
                "    {} {}: {}",
                paint(out, "✗", Color::Red),
                result.submodule_name,
                error
            )),
        }
    }
    lines.join("\n")
}

fn column_width(lengths: impl Iterator<Item = usize>, minimum: usize) -> usize {
    lengths.max().unwrap_or(0).max(minimum)
}
