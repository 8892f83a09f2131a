//! Positional parameter counting and collection
//!
//! The count is a heuristic, not a SQL parser: a `?` counts as a parameter
//! marker only when it directly follows a space, a comma or `=`. A `?` inside
//! a string literal is counted whenever it happens to follow one of those, and
//! a marker after `(` is missed.

use std::io::Write;

use crate::error::Result;
use crate::repl::terminal::Terminal;

/// Substrings counted as one positional parameter each
pub const PARAMETER_MARKERS: [&str; 3] = [" ?", ",?", "=?"];

/// Count the positional parameters in query text
pub fn count_parameters(text: &str) -> usize {
    PARAMETER_MARKERS
        .iter()
        .map(|marker| text.matches(marker).count())
        .sum()
}

/// Prompt for `count` parameter values in order (`1> `, `2> `, ...)
pub fn prompt_parameters(count: usize, terminal: &mut dyn Terminal) -> Result<Vec<String>> {
    if count == 0 {
        return Ok(Vec::new());
    }
    writeln!(terminal.output())?;
    (1..=count)
        .map(|position| terminal.ask(&format!("{position}> ")))
        .collect()
}
