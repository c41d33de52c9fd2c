//! Build report rendering
//!
//! Formats a [`ProgressState`] into the text block redrawn on every update:
//!
//! ```text
//! Environment Name: my-env
//! Build ID: 42
//!
//! instances  0/5  Pending
//! networks   1/2  Creating
//!
//! Status: Applying
//! ```

use crossterm::style::{StyledContent, Stylize};
use std::fmt::Write;

use super::progress::{OverallStatus, ProgressState, RowStatus};

/// Placeholder row shown when a build plans no changes
pub const NO_CHANGES: &str = "No changes detected";

/// Render the report block.
///
/// Labels and counts are padded to their longest entries so status words
/// line up. With `color` set, status words carry ANSI styling; the padding
/// is computed on the plain text either way.
pub fn render(state: &ProgressState, color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Environment Name: {}", state.env_name);
    let _ = writeln!(out, "Build ID: {}", state.build_id);
    out.push('\n');

    if state.is_empty() {
        let _ = writeln!(out, "{NO_CHANGES}");
    } else {
        let counts: Vec<(&str, String, RowStatus)> = state
            .rows()
            .map(|(label, row)| (label, format!("{}/{}", row.current, row.target), row.status))
            .collect();
        let label_width = counts.iter().map(|(label, _, _)| label.len()).max().unwrap_or(0);
        let count_width = counts.iter().map(|(_, count, _)| count.len()).max().unwrap_or(0);

        for (label, count, status) in counts {
            let _ = write!(out, "{label:<label_width$}  {count:<count_width$}  ");
            if color {
                let _ = writeln!(out, "{}", paint_row(status));
            } else {
                let _ = writeln!(out, "{status}");
            }
        }
    }

    out.push('\n');
    let overall = state.overall();
    if color {
        let _ = writeln!(out, "Status: {}", paint_overall(overall));
    } else {
        let _ = writeln!(out, "Status: {overall}");
    }
    out
}

fn paint_row(status: RowStatus) -> StyledContent<String> {
    let word = status.to_string();
    if status == RowStatus::Error {
        word.red()
    } else if status.is_done() {
        word.green()
    } else if status.is_in_progress() {
        word.yellow()
    } else {
        word.dark_grey()
    }
}

fn paint_overall(status: OverallStatus) -> StyledContent<String> {
    let word = status.to_string();
    match status {
        OverallStatus::Error => word.red().bold(),
        s if s.is_success() => word.green().bold(),
        _ => word.yellow(),
    }
}
