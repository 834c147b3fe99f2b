//! `.gitmodules` parsing
//!
//! Reads git's own submodule manifest:
//!
//! ```text
//! [submodule "NAME"]
//!     path = RELATIVE_PATH
//!     url = URL
//! ```
//!
//! Every block must end up with both `path` and `url`. Keys other than
//! those two (`branch`, `update`, ...) are accepted and ignored. A value
//! that itself starts with `path =` or `url =` is the signature of a
//! doubled line left behind by a bad merge or a broken script, and is
//! rejected rather than recorded as a path.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::defaults::GITMODULES_FILENAME;
use crate::entry::SubmoduleEntry;
use crate::error::{Error, Result};

/// Parser for the `.gitmodules` file at a repository root.
#[derive(Debug, Clone)]
pub struct GitModulesParser {
    gitmodules_path: PathBuf,
}

impl GitModulesParser {
    pub fn new(repo_root: &Path) -> Self {
        Self {
            gitmodules_path: repo_root.join(GITMODULES_FILENAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.gitmodules_path
    }

    pub fn exists(&self) -> bool {
        self.gitmodules_path.is_file()
    }

    /// Read and parse `.gitmodules` into entries, in file order.
    ///
    /// # Errors
    ///
    /// - [`Error::GitModulesNotFound`] if the file is absent.
    /// - [`Error::FileRead`] if it cannot be read.
    /// - Any error from [`parse_content`].
    pub fn parse(&self) -> Result<Vec<SubmoduleEntry>> {
        if !self.exists() {
            return Err(Error::GitModulesNotFound {
                path: self.gitmodules_path.clone(),
            });
        }
        let content = fs::read_to_string(&self.gitmodules_path)
            .map_err(|e| Error::file_read(&self.gitmodules_path, &e))?;
        parse_content(&content)
    }
}

/// Fields collected for the block currently being read.
#[derive(Default)]
struct Pending {
    name: String,
    path: Option<String>,
    url: Option<String>,
}

impl Pending {
    fn finish(self) -> Result<SubmoduleEntry> {
        match (self.path, self.url) {
            (Some(path), Some(url)) => Ok(SubmoduleEntry::new(self.name, path, url)),
            (path, url) => {
                let fields = match (path.is_none(), url.is_none()) {
                    (true, true) => "path and url",
                    (true, false) => "path",
                    _ => "url",
                };
                Err(Error::MissingFields {
                    submodule: self.name,
                    fields: fields.to_string(),
                })
            }
        }
    }
}

/// Parse `.gitmodules` text.
///
/// # Errors
///
/// - [`Error::DuplicateKey`] for a `path`/`url` value beginning with
///   `path =` or `url =`.
/// - [`Error::MissingFields`] for a block lacking `path` or `url`.
pub fn parse_content(content: &str) -> Result<Vec<SubmoduleEntry>> {
    let mut entries = Vec::new();
    let mut pending: Option<Pending> = None;

    for raw in content.lines() {
        let line = raw.trim();

        if let Some(name) = submodule_header(line) {
            if let Some(done) = pending.take() {
                entries.push(done.finish()?);
            }
            pending = Some(Pending {
                name: name.to_string(),
                ..Default::default()
            });
            continue;
        }

        let (slot, value) = if let Some(value) = assignment(line, "path") {
            ("path", value)
        } else if let Some(value) = assignment(line, "url") {
            ("url", value)
        } else {
            continue;
        };

        if is_doubled(value) {
            return Err(Error::DuplicateKey {
                line: line.to_string(),
                submodule: pending.as_ref().map(|p| p.name.clone()).unwrap_or_default(),
            });
        }

        let Some(current) = pending.as_mut() else {
            debug!("Ignoring '{}' outside of a [submodule] block", line);
            continue;
        };

        let value = Some(value.to_string());
        if slot == "path" {
            current.path = value;
        } else {
            current.url = value;
        }
    }

    if let Some(done) = pending {
        entries.push(done.finish()?);
    }

    Ok(entries)
}

/// `[submodule "NAME"]` with a non-empty name.
fn submodule_header(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("[submodule")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let name = rest.trim_start().strip_prefix('"')?.strip_suffix("\"]")?;
    if name.is_empty() || name.contains('"') {
        None
    } else {
        Some(name)
    }
}

/// The trimmed, non-empty value of a `key = value` line for `key`.
fn assignment<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let value = line
        .strip_prefix(key)?
        .trim_start()
        .strip_prefix('=')?
        .trim();
    (!value.is_empty()).then_some(value)
}

fn is_doubled(value: &str) -> bool {
    ["path", "url"].iter().any(|key| {
        value
            .strip_prefix(key)
            .is_some_and(|rest| rest.trim_start().starts_with('='))
    })
}
