//! Renderers, one per output kind
//!
//! Renderers write to any `io::Write` so the CLI can hand them stdout and
//! tests a byte buffer. Colour comes from a [`Palette`], which is plain
//! unless stdout is a terminal, and is applied inside the column padding
//! so escape codes never skew the layout.

pub mod boolean;
pub mod highstate;
pub mod raw;

use std::io::Write;

use crossterm::style::Stylize;

use super::envelope::JobEnvelope;
use crate::constants::output;
use crate::errors::RenderResult;

pub use boolean::render_boolean;
pub use highstate::{render_highstate, render_profile};
pub use raw::{render_json, render_yaml};

/// Colour of a table cell or marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Good,
    Bad,
    Accent,
}

/// Whether rendered text carries ANSI colour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Palette {
    color: bool,
}

impl Palette {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// No escape codes at all
    pub fn plain() -> Self {
        Self::new(false)
    }

    /// Colour only when stdout is a terminal
    pub fn detect() -> Self {
        Self::new(atty::is(atty::Stream::Stdout))
    }

    pub fn is_colored(&self) -> bool {
        self.color
    }

    pub fn paint(&self, text: &str, tone: Tone) -> String {
        if !self.color || text.is_empty() {
            return text.to_string();
        }
        match tone {
            Tone::Plain => text.to_string(),
            Tone::Good => text.green().to_string(),
            Tone::Bad => text.red().to_string(),
            Tone::Accent => text.magenta().to_string(),
        }
    }

    pub fn bold(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }
}

/// Success or failure marker
pub fn marker(success: bool) -> (&'static str, Tone) {
    if success {
        (output::SUCCESS_MARK, Tone::Good)
    } else {
        (output::FAILURE_MARK, Tone::Bad)
    }
}

/// Minimal column-aligned table
#[derive(Debug, Default)]
pub struct Table {
    title: String,
    headers: Vec<String>,
    rows: Vec<Vec<(String, Tone)>>,
    separators: Vec<usize>,
}

impl Table {
    pub fn new(title: impl Into<String>, headers: &[&str]) -> Self {
        Self {
            title: title.into(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn add_row(&mut self, row: Vec<(String, Tone)>) {
        self.rows.push(row);
    }

    /// Draw a rule before the next row
    pub fn add_section(&mut self) {
        self.separators.push(self.rows.len());
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, (cell, _)) in row.iter().enumerate() {
                let width = cell.chars().count();
                match widths.get_mut(i) {
                    Some(current) => *current = (*current).max(width),
                    None => widths.push(width),
                }
            }
        }
        widths
    }

    pub fn write_to<W: Write>(&self, out: &mut W, palette: Palette) -> RenderResult<()> {
        let widths = self.widths();
        let rule: String = widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-");

        if !self.title.is_empty() {
            writeln!(out, "{}", palette.bold(&self.title))?;
        }
        let header: Vec<(&str, Tone)> =
            self.headers.iter().map(|h| (h.as_str(), Tone::Accent)).collect();
        writeln!(out, "{}", line(&header, &widths, palette))?;
        writeln!(out, "{}", rule)?;

        for (index, row) in self.rows.iter().enumerate() {
            if self.separators.contains(&index) {
                writeln!(out, "{}", rule)?;
            }
            let cells: Vec<(&str, Tone)> =
                row.iter().map(|(cell, tone)| (cell.as_str(), *tone)).collect();
            writeln!(out, "{}", line(&cells, &widths, palette))?;
        }
        Ok(())
    }
}

/// Join cells into one row, padding outside the colour codes
///
/// Trailing padding stays plain, so trimming the joined line removes it.
fn line(cells: &[(&str, Tone)], widths: &[usize], palette: Palette) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|((text, tone), width)| {
            let fill = width.saturating_sub(text.chars().count());
            format!("{}{}", palette.paint(text, *tone), " ".repeat(fill))
        })
        .collect::<Vec<_>>()
        .join(" | ")
        .trim_end()
        .to_string()
}

/// List targeted minions that never answered
pub fn render_non_returns<W: Write>(
    out: &mut W,
    envelope: &JobEnvelope<'_>,
    palette: Palette,
) -> RenderResult<()> {
    let missing = envelope.missing_minions();
    if missing.is_empty() {
        writeln!(out, "All minions returned")?;
        return Ok(());
    }

    writeln!(out, "{}", palette.paint("Minions that did not return:", Tone::Bad))?;
    let listed: Vec<String> = missing
        .iter()
        .map(|minion| palette.paint(&format!("{} {}", output::FAILURE_MARK, minion), Tone::Bad))
        .collect();
    writeln!(out, "{}", listed.join(", "))?;
    Ok(())
}
