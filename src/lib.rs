//! # Submoduler Library
//!
//! This library provides the core functionality for working with a git
//! repository whose components live in submodules. It is designed to be used
//! by the `submoduler` command-line tool but can also be integrated into
//! other tools that need to discover submodules and their configuration.
//!
//! ## Quick Example
//!
//! ```
//! use submoduler::config::{merge_configurations, ConfigMap};
//! use submoduler::gitmodules;
//!
//! let entries = gitmodules::parse_content(
//!     "[submodule \"core\"]\n\tpath = submodules/core\n\turl = git@example.com:core.git\n",
//! )
//! .unwrap();
//! assert_eq!(entries[0].path, "submodules/core");
//!
//! let parent = ConfigMap::from([("require_test", "false")]);
//! let child = ConfigMap::from([("require_test", "true")]);
//! let merged = merge_configurations(&parent, &child);
//! assert_eq!(merged.config.get("require_test"), Some("true"));
//! assert_eq!(merged.overrides, vec!["require_test".to_string()]);
//! ```
//!
//! ## Core Concepts
//!
//! - **INI files (`ini`)**: A strict INI reader with line-numbered errors.
//! - **`.gitmodules` (`gitmodules`)**: git's own manifest of submodule
//!   names, paths and URLs.
//! - **`.submoduler.ini` (`submoduler_ini`)**: The configuration convention.
//!   The parent repository carries defaults; each child carries its own
//!   defaults and the parent's URL. Child values override parent values.
//! - **Discovery (`discovery`)**: Chooses between the two sources.
//! - **Entries (`entry`)**: The resolved record for one submodule.
//! - **Git and processes (`git`, `process`, `status`)**: Queries and
//!   mutations on a working tree, always run in an explicit directory.
//! - **Checks (`validation`, `version`, `testing`)**: Health checks, gem
//!   version synchronization and test execution per submodule.
//!
//! ## Discovery Flow
//!
//! 1.  If `<root>/.submoduler.ini` exists, read its `[default]` section.
//! 2.  Find every `.submoduler.ini` under `submodules/` and `examples/`.
//! 3.  For each child, read its `[default]` and `[parent]` sections, merge
//!     the defaults over the parent's, and resolve its remote URL.
//! 4.  A child that cannot be read is logged and skipped.
//!
//! Otherwise `.gitmodules` is parsed, and its structural errors are fatal.

pub mod config;
pub mod defaults;
pub mod discovery;
pub mod entry;
pub mod error;
pub mod exit_codes;
pub mod git;
pub mod gitmodules;
pub mod ini;
pub mod output;
pub mod process;
pub mod status;
pub mod submoduler_ini;
pub mod testing;
pub mod validation;
pub mod version;

#[cfg(test)]
mod config_proptest;
