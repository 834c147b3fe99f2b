//! INI document parsing
//!
//! A small, strict, line-oriented parser for the `[section]` /
//! `key = value` files submoduler reads. Unlike a permissive INI reader it
//! rejects any line it cannot classify, so typos in a `.submoduler.ini`
//! surface as errors with a line number instead of silently dropping
//! configuration.
//!
//! ## Syntax
//!
//! - Leading and trailing whitespace is ignored on every line, so tab or
//!   space indentation before keys is fine.
//! - Blank lines and lines starting with `#` or `;` are skipped.
//! - `[name]` opens a section. Opening a section that already exists
//!   resets it to empty.
//! - `key = value` assigns into the current section. Keys are word
//!   characters (`A-Z`, `a-z`, `0-9`, `_`); the value is everything after
//!   the first `=`, trimmed, and must not be empty. A repeated key replaces
//!   the earlier value.
//!
//! ## Example
//!
//! ```
//! use submoduler::ini;
//!
//! let doc = ini::parse_content("[default]\n\trequire_test = true\n").unwrap();
//! assert_eq!(doc.get("default", "require_test"), Some("true"));
//! ```

use std::fs;
use std::path::Path;

use crate::config::ConfigMap;
use crate::error::{Error, Result};

/// A parsed INI document: named sections in the order they first appeared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniDocument {
    sections: Vec<(String, ConfigMap)>,
}

impl IniDocument {
    /// Look up a section by name.
    pub fn section(&self, name: &str) -> Option<&ConfigMap> {
        self.sections
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, section)| section)
    }

    /// Look up a single value.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section).and_then(|s| s.get(key))
    }

    /// Section names in document order.
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|(n, _)| n.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Open `name` as the current section, clearing any earlier contents,
    /// and return its index.
    fn open_section(&mut self, name: &str) -> usize {
        match self.sections.iter().position(|(n, _)| n == name) {
            Some(index) => {
                self.sections[index].1 = ConfigMap::new();
                index
            }
            None => {
                self.sections.push((name.to_string(), ConfigMap::new()));
                self.sections.len() - 1
            }
        }
    }
}

/// Read and parse an INI file.
///
/// # Errors
///
/// Returns [`Error::FileRead`] if the file cannot be read, or
/// [`Error::IniSyntax`] for the first malformed line.
pub fn parse_file(path: &Path) -> Result<IniDocument> {
    let content = fs::read_to_string(path).map_err(|e| Error::file_read(path, &e))?;
    parse_content(&content)
}

/// Parse INI text.
///
/// # Errors
///
/// Returns [`Error::IniSyntax`] naming the 1-based line number of the first
/// line that is neither a section header, a key/value pair, a comment, nor
/// blank, or of a key/value pair that appears before any section header.
pub fn parse_content(content: &str) -> Result<IniDocument> {
    let mut doc = IniDocument::default();
    let mut current: Option<usize> = None;

    for (index, raw) in content.lines().enumerate() {
        let line_number = index + 1;
        let line = raw.trim();

        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(name) = section_header(line) {
            current = Some(doc.open_section(name));
        } else if let Some((key, value)) = key_value(line) {
            let Some(section) = current else {
                return Err(Error::IniSyntax {
                    line: line_number,
                    message: "Key-value pair outside of section".to_string(),
                });
            };
            doc.sections[section].1.insert(key, value);
        } else {
            return Err(Error::IniSyntax {
                line: line_number,
                message: format!("Invalid INI format: {}", line),
            });
        }
    }

    Ok(doc)
}

/// `[name]` with a non-empty name containing no `]`.
fn section_header(line: &str) -> Option<&str> {
    let name = line.strip_prefix('[')?.strip_suffix(']')?;
    if name.is_empty() || name.contains(']') {
        None
    } else {
        Some(name)
    }
}

/// `key = value` with a word-character key and a non-empty value.
fn key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim_end();
    let value = value.trim();
    if key.is_empty() || value.is_empty() || !key.chars().all(is_word_char) {
        return None;
    }
    Some((key, value))
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
