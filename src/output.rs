//! # Output Configuration
//!
//! This module provides utilities for controlling CLI output appearance:
//! colored status symbols, section headers and emoji, based on terminal
//! capabilities and user preferences.
//!
//! ## Respecting User Preferences
//!
//! The module respects the following environment variables and flags:
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals
//!
//! ## Usage
//!
//! ```
//! use submoduler::output::{success, OutputConfig};
//!
//! let config = OutputConfig::without_color();
//! assert_eq!(success(&config, "core"), "✓ core");
//! ```

use std::env;

use console::{style, Color};

/// Width of the `━` rule under headers and above summaries.
pub const RULE_WIDTH: usize = 60;

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors and emojis should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// # Arguments
    /// * `color_flag` - The value of the --color CLI flag: "always", "never", or "auto"
    ///
    /// # Behavior
    /// - `--color=always`: Force colors on (overrides NO_COLOR)
    /// - `--color=never`: Force colors off
    /// - `--color=auto`: Detect based on environment
    ///
    /// In auto mode, colors are disabled if:
    /// - `NO_COLOR` environment variable is set (any value, including empty)
    /// - `CLICOLOR=0` is set
    /// - `TERM=dumb` is set
    /// - stdout is not a TTY (unless `CLICOLOR_FORCE=1`)
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        // The presence of NO_COLOR (even if empty) disables colors
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    /// A configuration with colors always enabled.
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    /// A configuration with colors always disabled.
    pub fn without_color() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Returns the appropriate string based on color configuration.
///
/// When colors are enabled, returns the emoji. When disabled, returns
/// the plain text alternative.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

/// `text` in `color` when colors are enabled, unchanged otherwise.
pub fn paint(config: &OutputConfig, text: &str, color: Color) -> String {
    if config.use_color {
        style(text).fg(color).force_styling(true).to_string()
    } else {
        text.to_string()
    }
}

pub fn success(config: &OutputConfig, text: &str) -> String {
    format!("{} {}", paint(config, "✓", Color::Green), text)
}

pub fn failure(config: &OutputConfig, text: &str) -> String {
    format!("{} {}", paint(config, "✗", Color::Red), text)
}

pub fn warning(config: &OutputConfig, text: &str) -> String {
    format!("{} {}", paint(config, "⚠", Color::Yellow), text)
}

pub fn info(config: &OutputConfig, text: &str) -> String {
    format!("{} {}", paint(config, "ℹ", Color::Blue), text)
}

pub fn rule() -> String {
    "━".repeat(RULE_WIDTH)
}

/// A title followed by a full-width rule, surrounded by blank lines.
pub fn header(text: &str) -> String {
    format!("\n{}\n{}\n", text, rule())
}

pub fn section(config: &OutputConfig, title: &str) -> String {
    format!("\n{}\n", paint(config, title, Color::Blue))
}

/// `"1 entry"`, `"2 entries"`.
pub fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}
