//! Result set grid rendering
//!
//! Renders one fetched window of a result set as an aligned text grid:
//! - header row (column names through the text formatter)
//! - separator row of dashes
//! - data rows, left-aligned and padded, columns joined by `|`
//!
//! Widths are computed over the whole window before any line is produced.

use std::fmt;
use std::io::Write;

use crate::connection::{Column, Row};
use crate::error::Result;
use crate::formatter::value::{FormattedCell, format_text, format_value};
use crate::repl::session_config::SessionConfig;

/// Column separator
pub const SEPARATOR: &str = "|";

/// Marker for a row total nobody knows
pub const UNKNOWN_COUNT: &str = "(unknown)";

/// Total rows of a result set, as far as it can be told
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowTotal {
    /// Every row was fetched, so the count is exact
    Exact(u64),
    /// The window was full; the driver reported this total
    Reported(u64),
    /// The window was full and the driver gave no total
    Unknown,
}

impl fmt::Display for RowTotal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowTotal::Exact(n) | RowTotal::Reported(n) => write!(f, "{n}"),
            RowTotal::Unknown => write!(f, "{UNKNOWN_COUNT}"),
        }
    }
}

/// Decide the total row count from the fetched window.
///
/// A window smaller than the cap (or an uncapped fetch) holds every row.
pub fn reconcile_row_count(fetched: usize, cap: usize, hint: Option<u64>) -> RowTotal {
    if cap == 0 || fetched < cap {
        return RowTotal::Exact(fetched as u64);
    }
    match hint {
        Some(total) => RowTotal::Reported(total),
        None => RowTotal::Unknown,
    }
}

/// A rendered result set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedGrid {
    /// Header, separator and data lines
    pub lines: Vec<String>,

    /// Final width of every column
    pub widths: Vec<usize>,

    /// Data rows rendered
    pub printed: usize,

    /// Total rows of the result set
    pub total: RowTotal,
}

impl RenderedGrid {
    /// Data lines, without header and separator
    pub fn data_lines(&self) -> &[String] {
        self.lines.get(2..).unwrap_or_default()
    }

    /// Summary line printed after the grid
    pub fn footer(&self) -> String {
        format!("Rows printed: {}/{}", self.printed, self.total)
    }

    /// Write the grid between blank lines, followed by its footer
    pub fn write_to(&self, out: &mut dyn Write) -> Result<()> {
        writeln!(out)?;
        for line in &self.lines {
            writeln!(out, "{line}")?;
        }
        writeln!(out, "\n{}", self.footer())?;
        Ok(())
    }
}

/// Render a fetched window of rows.
///
/// # Arguments
/// * `columns` - Result set columns
/// * `rows` - Fetched window, at most `rows_to_print` rows
/// * `row_count_hint` - Total reported by the driver, if any
/// * `config` - Session settings, read only
pub fn render(
    columns: &[Column],
    rows: &[Row],
    row_count_hint: Option<u64>,
    config: &SessionConfig,
) -> RenderedGrid {
    let headers: Vec<FormattedCell> = columns
        .iter()
        .map(|column| format_text(&column.name, config))
        .collect();

    // Short rows are padded so every line has one cell per column
    let cells: Vec<Vec<FormattedCell>> = rows
        .iter()
        .map(|row| {
            (0..columns.len())
                .map(|index| match row.get(index) {
                    Some(value) => format_value(value, config),
                    None => FormattedCell {
                        text: String::new(),
                        width: 0,
                    },
                })
                .collect()
        })
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            cells
                .iter()
                .map(|row| row[index].width)
                .fold(header.width, usize::max)
        })
        .collect();

    let mut lines = Vec::with_capacity(cells.len() + 2);
    lines.push(join_padded(&headers, &widths));
    lines.push(
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join(SEPARATOR),
    );
    lines.extend(cells.iter().map(|row| join_padded(row, &widths)));

    RenderedGrid {
        lines,
        widths,
        printed: rows.len(),
        total: reconcile_row_count(rows.len(), config.rows_to_print, row_count_hint),
    }
}

fn join_padded(cells: &[FormattedCell], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell.text, width = *width))
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}
