//! Choosing where a repository's submodule list comes from.
//!
//! The `.submoduler.ini` convention is preferred because it carries
//! configuration; `.gitmodules` is the fallback for repositories that
//! have not adopted it.

use std::path::Path;

use log::debug;
use serde::Serialize;

use crate::config::ConfigMap;
use crate::entry::SubmoduleEntry;
use crate::error::Result;
use crate::gitmodules::GitModulesParser;
use crate::process::CommandRunner;
use crate::submoduler_ini::SubmodulerIniParser;

/// Which file the submodule list was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    SubmodulerIni,
    GitModules,
    None,
}

/// Everything discovery learned about a repository.
#[derive(Debug, Clone, PartialEq)]
pub struct Discovery {
    pub source: Source,
    pub entries: Vec<SubmoduleEntry>,
    /// The root `.submoduler.ini` defaults the entries were merged with.
    /// Empty unless the source is [`Source::SubmodulerIni`].
    pub parent_defaults: ConfigMap,
}

/// Entries for `repo_root` and where they came from.
///
/// `.submoduler.ini` wins when present. Otherwise `.gitmodules` is parsed
/// and its structural errors propagate. A repository with neither yields
/// no entries.
pub fn discover<R: CommandRunner>(repo_root: &Path, runner: R) -> Result<Discovery> {
    let ini = SubmodulerIniParser::with_runner(repo_root, runner);
    if ini.exists() {
        debug!("Reading submodules from .submoduler.ini files");
        let parent_defaults = ini.parse_parent_defaults();
        return Ok(Discovery {
            source: Source::SubmodulerIni,
            entries: ini.parse_with_defaults(&parent_defaults),
            parent_defaults,
        });
    }

    let gitmodules = GitModulesParser::new(repo_root);
    if gitmodules.exists() {
        debug!("Reading submodules from {}", gitmodules.path().display());
        return Ok(Discovery {
            source: Source::GitModules,
            entries: gitmodules.parse()?,
            parent_defaults: ConfigMap::new(),
        });
    }

    Ok(Discovery {
        source: Source::None,
        entries: Vec::new(),
        parent_defaults: ConfigMap::new(),
    })
}

/// [`discover`] without the parent defaults.
pub fn discover_submodules<R: CommandRunner>(
    repo_root: &Path,
    runner: R,
) -> Result<(Source, Vec<SubmoduleEntry>)> {
    discover(repo_root, runner).map(|found| (found.source, found.entries))
}

/// Keep entries whose name is in `names`. An empty filter keeps everything.
pub fn filter_by_name(entries: Vec<SubmoduleEntry>, names: &[String]) -> Vec<SubmoduleEntry> {
    if names.is_empty() {
        return entries;
    }
    entries
        .into_iter()
        .filter(|e| names.iter().any(|n| *n == e.name))
        .collect()
}
