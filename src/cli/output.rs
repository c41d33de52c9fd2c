//! Output formatting and progress indicators
//!
//! This module provides spinners, status prefixes, and error display for
//! command output. Build progress itself is drawn by
//! [`crate::infra::terminal`].

use crossterm::style::Stylize;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;

/// Create a spinner for operations with unknown duration
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.blue} {msg}")
            .expect("Invalid spinner template"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}

/// Print an error and its causes to stderr
pub fn display_error(err: &anyhow::Error) {
    let prefix = if std::io::stderr().is_terminal() {
        status::ERROR.red().to_string()
    } else {
        status::ERROR.to_string()
    };
    eprintln!("{prefix} {}", format_error(err));
}

/// Error message followed by its cause chain, one cause per line
pub fn format_error(err: &anyhow::Error) -> String {
    let mut message = err.to_string();
    for cause in err.chain().skip(1) {
        message.push_str(&format!("\n  caused by: {cause}"));
    }
    message
}

/// Status message prefixes
pub mod status {
    /// Success prefix (green checkmark)
    pub const SUCCESS: &str = "✓";

    /// Error prefix (red X)
    pub const ERROR: &str = "✗";

    /// Warning prefix (yellow triangle)
    pub const WARNING: &str = "⚠";
}
