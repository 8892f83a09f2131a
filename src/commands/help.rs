//! `:help` output

use std::io::Write;

use super::{BUILTINS, Dispatcher, EXIT_KEYWORDS, Invocation};
use crate::error::Result;
use crate::repl::terminal::Terminal;

/// Width the named-command list is wrapped at
pub const HELP_WIDTH: usize = 79;

/// Column where command summaries start
const USAGE_WIDTH: usize = 22;

/// The fixed command reference
pub fn command_reference() -> String {
    let mut text = String::from("--Available commands--\n");
    text.push_str("Syntax: :command required_parameter [optional_parameter]\n\n");
    for descriptor in BUILTINS {
        text.push_str(&format!(
            "{:<width$}{}\n",
            descriptor.usage,
            descriptor.summary,
            width = USAGE_WIDTH
        ));
    }
    text.push_str(&format!(
        "{:<width$}Ends the session.\n",
        EXIT_KEYWORDS.join(", "),
        width = USAGE_WIDTH
    ));
    text
}

/// Join names with ", ", breaking lines before they exceed `width`
pub fn wrap_names<'a>(names: impl IntoIterator<Item = &'a str>, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for name in names {
        if line.is_empty() {
            line.push_str(name);
            continue;
        }
        // ", name" plus the comma that may follow it
        if line.chars().count() + name.chars().count() + 3 > width {
            line.push(',');
            lines.push(std::mem::take(&mut line));
            line.push_str(name);
        } else {
            line.push_str(", ");
            line.push_str(name);
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

pub(super) fn show(
    dispatcher: &mut Dispatcher<'_>,
    _invocation: &Invocation,
    terminal: &mut dyn Terminal,
) -> Result<Option<String>> {
    let out = terminal.output();
    writeln!(out, "{}", command_reference())?;

    let named = &dispatcher.config.named_commands;
    if !named.is_empty() {
        writeln!(
            out,
            "Commands declared in the \"queries\" section of the configuration file:"
        )?;
        for line in wrap_names(named.names(), HELP_WIDTH) {
            writeln!(out, "{line}")?;
        }
    }
    Ok(None)
}
