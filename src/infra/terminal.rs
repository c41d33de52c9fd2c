//! In-place report redraw
//!
//! On an interactive terminal each new report replaces the previous one:
//! the cursor moves back to the first line of the last block and the
//! screen is cleared from there down before writing. Anywhere else the
//! blocks are written one after another as plain text.

use crossterm::style::Stylize;
use crossterm::{cursor, queue, terminal};
use std::io::{self, IsTerminal, Write};

use crate::core::monitor::ReportSink;
use crate::core::progress::{ComponentFailure, ProgressState};
use crate::core::report;

/// How reports are written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawMode {
    /// Redraw in place, optionally colored
    Live { color: bool },
    /// Append plain blocks
    Plain,
    /// Print failures only
    Quiet,
}

/// Report sink writing to a terminal or any other writer
#[derive(Debug)]
pub struct Terminal<W> {
    out: W,
    mode: DrawMode,
    drawn_lines: u16,
}

impl Terminal<io::Stdout> {
    /// Stdout sink; live redraw only when stdout is a tty
    pub fn stdout(color: bool, quiet: bool) -> Self {
        let out = io::stdout();
        let mode = if quiet {
            DrawMode::Quiet
        } else if out.is_terminal() {
            DrawMode::Live { color }
        } else {
            DrawMode::Plain
        };
        Self::new(out, mode)
    }
}

impl<W: Write> Terminal<W> {
    pub fn new(out: W, mode: DrawMode) -> Self {
        Self {
            out,
            mode,
            drawn_lines: 0,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for Terminal<W> {
    fn draw(&mut self, state: &ProgressState) -> io::Result<()> {
        let block = match self.mode {
            DrawMode::Quiet => return Ok(()),
            DrawMode::Live { color } => {
                if self.drawn_lines > 0 {
                    queue!(
                        self.out,
                        cursor::MoveToPreviousLine(self.drawn_lines),
                        terminal::Clear(terminal::ClearType::FromCursorDown)
                    )?;
                }
                report::render(state, color)
            }
            DrawMode::Plain => {
                if self.drawn_lines > 0 {
                    writeln!(self.out)?;
                }
                report::render(state, false)
            }
        };

        self.out.write_all(block.as_bytes())?;
        self.out.flush()?;
        self.drawn_lines = u16::try_from(block.lines().count()).unwrap_or(u16::MAX);
        Ok(())
    }

    fn failure(&mut self, failure: &ComponentFailure) -> io::Result<()> {
        match self.mode {
            DrawMode::Live { color: true } => writeln!(self.out, "{} {failure}", "✗".red())?,
            _ => writeln!(self.out, "✗ {failure}")?,
        }
        // Failure lines sit below the block; never redraw over them.
        self.drawn_lines = 0;
        self.out.flush()
    }
}
