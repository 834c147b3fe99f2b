//! # Error Handling
//!
//! This module defines the centralized error type for the `submoduler`
//! library. It uses the `thiserror` library to create an `Error` enum that
//! covers the structural failures the parsers and git wrappers can report.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum that represents all possible errors that can
//!   occur within the library. Each variant carries enough context (file
//!   path, line number, submodule name) for the message to be actionable on
//!   its own.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! Conditions that are expected in normal operation (a missing parent
//! defaults file, a submodule without a configured remote) are not errors;
//! those call sites return `Option` or an empty value instead.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for submoduler operations
#[derive(Error, Debug)]
pub enum Error {
    /// A line of an INI document could not be classified.
    #[error("{message} at line {line}")]
    IniSyntax { line: usize, message: String },

    /// A configuration file could not be read from disk.
    #[error("{message}: {}", path.display())]
    FileRead { path: PathBuf, message: String },

    /// `.gitmodules` was required but is absent.
    #[error("No .gitmodules file found at {}", path.display())]
    GitModulesNotFound { path: PathBuf },

    /// A `path`/`url` line whose value repeats the key, e.g. `path = path = x`.
    #[error("Malformed .gitmodules: duplicate key in '{line}' for submodule '{submodule}'")]
    DuplicateKey { line: String, submodule: String },

    /// A completed `[submodule]` block lacks `path`, `url`, or both.
    #[error("Malformed submodule entry: {submodule} is missing path or url ({fields})")]
    MissingFields { submodule: String, fields: String },

    /// A child `.submoduler.ini` without a `[parent]` section carrying `url`.
    #[error("Missing [parent] url in {}", path.display())]
    MissingParentUrl { path: PathBuf },

    /// A subprocess could not be started or reported failure.
    #[error("Command failed: {command} - {message}")]
    Command { command: String, message: String },

    /// A version string could not be interpreted.
    #[error("Invalid version '{version}'")]
    Version { version: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    GlobPattern(#[from] glob::PatternError),

    /// A glob iteration error, wrapped from `glob::GlobError`.
    #[error("Glob error: {0}")]
    Glob(#[from] glob::GlobError),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Build a `FileRead` error from an I/O failure, wording the common
    /// cases the way a user expects to read them.
    pub fn file_read(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        let message = match err.kind() {
            std::io::ErrorKind::NotFound => "File not found".to_string(),
            std::io::ErrorKind::PermissionDenied => "Permission denied".to_string(),
            _ => format!("Unable to read file ({})", err),
        };
        Error::FileRead {
            path: path.into(),
            message,
        }
    }
}
