//! Built-in command handlers

use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{info, warn};

use super::{Dispatcher, EXACT_MODIFIER, Invocation, echo_query, expand_template};
use crate::connection::CatalogRequest;
use crate::error::{ConnectionError, QueryshError, Result};
use crate::executor::CsvExporter;
use crate::repl::session_config::{null_setting, replacement_setting};
use crate::repl::terminal::Terminal;

/// Argument of a command that shows or sets one value
enum Setting<'s> {
    Show,
    Set(&'s str),
    TooMany,
}

fn setting(invocation: &Invocation) -> Setting<'_> {
    match invocation.args() {
        [] => Setting::Show,
        [value] => Setting::Set(value),
        _ => Setting::TooMany,
    }
}

/// Parse a count argument; prints why it was rejected and yields `None`
fn parse_count<T: FromStr>(
    command: &str,
    invocation: &Invocation,
    out: &mut dyn Write,
) -> Result<Option<T>> {
    let value = match setting(invocation) {
        Setting::Show => return Ok(None),
        Setting::Set(value) => value,
        Setting::TooMany => {
            writeln!(out, "Invalid arguments for :{command}: expected one number.")?;
            return Ok(None);
        }
    };
    match value.parse::<T>() {
        Ok(count) => Ok(Some(count)),
        Err(_) => {
            writeln!(
                out,
                "Invalid value \"{value}\" for :{command}: expected a non-negative integer."
            )?;
            Ok(None)
        }
    }
}

pub(super) fn rows(
    dispatcher: &mut Dispatcher<'_>,
    invocation: &Invocation,
    terminal: &mut dyn Terminal,
) -> Result<Option<String>> {
    let out = terminal.output();
    if let Some(count) = parse_count("rows", invocation, out)? {
        dispatcher.config.rows_to_print = count;
    }
    match dispatcher.config.rows_to_print {
        0 => writeln!(out, "Printing ALL rows of each result set.")?,
        n => writeln!(out, "Printing {n} rows of each result set.")?,
    }
    Ok(None)
}

pub(super) fn chars(
    dispatcher: &mut Dispatcher<'_>,
    invocation: &Invocation,
    terminal: &mut dyn Terminal,
) -> Result<Option<String>> {
    let out = terminal.output();
    if let Some(count) = parse_count("chars", invocation, out)? {
        dispatcher.config.column_display_width = count;
    }
    match dispatcher.config.column_display_width {
        0 => writeln!(out, "Printing ALL characters of each column.")?,
        n => writeln!(out, "Printing a maximum of {n} characters of each column.")?,
    }
    Ok(None)
}

pub(super) fn null(
    dispatcher: &mut Dispatcher<'_>,
    invocation: &Invocation,
    terminal: &mut dyn Terminal,
) -> Result<Option<String>> {
    if let Some(value) = invocation.args().first() {
        dispatcher.config.null_string = null_setting(value);
    }
    writeln!(
        terminal.output(),
        "Using the string \"{}\" to print NULL values.",
        dispatcher.config.null_string
    )?;
    Ok(None)
}

pub(super) fn newline(
    dispatcher: &mut Dispatcher<'_>,
    invocation: &Invocation,
    terminal: &mut dyn Terminal,
) -> Result<Option<String>> {
    if let Some(value) = invocation.args().first() {
        dispatcher.config.newline_replacement = replacement_setting(value, '\n');
    }
    let out = terminal.output();
    if dispatcher.config.newline_replacement == "\n" {
        writeln!(
            out,
            "Printing newlines with no conversion (might break the display of query output)."
        )?;
    } else {
        writeln!(
            out,
            "Using the string \"{}\" to print literal new lines in values.",
            dispatcher.config.newline_replacement
        )?;
    }
    Ok(None)
}

pub(super) fn tab(
    dispatcher: &mut Dispatcher<'_>,
    invocation: &Invocation,
    terminal: &mut dyn Terminal,
) -> Result<Option<String>> {
    if let Some(value) = invocation.args().first() {
        dispatcher.config.tab_replacement = replacement_setting(value, '\t');
    }
    let out = terminal.output();
    if dispatcher.config.tab_replacement == "\t" {
        writeln!(
            out,
            "Printing tabs with no conversion (might break the display of query output)."
        )?;
    } else {
        writeln!(
            out,
            "Using the string \"{}\" to print literal tabs in values.",
            dispatcher.config.tab_replacement
        )?;
    }
    Ok(None)
}

pub(super) fn timeout(
    dispatcher: &mut Dispatcher<'_>,
    invocation: &Invocation,
    terminal: &mut dyn Terminal,
) -> Result<Option<String>> {
    if let Some(seconds) = parse_count::<u64>("timeout", invocation, terminal.output())? {
        match dispatcher.connections.set_timeout(seconds) {
            Ok(()) => dispatcher.config.timeout_secs = seconds,
            Err(QueryshError::Connection(ConnectionError::SettingRejected { reason, .. })) => {
                warn!("Driver refused command timeout of {seconds}s: {reason}");
                writeln!(
                    terminal.output(),
                    "Warning: the driver refused the timeout ({reason})."
                )?;
            }
            Err(e) => return Err(e),
        }
    }
    writeln!(
        terminal.output(),
        "Command timeout set to {} seconds.",
        dispatcher.connections.timeout()
    )?;
    Ok(None)
}

pub(super) fn reconnect(
    dispatcher: &mut Dispatcher<'_>,
    _invocation: &Invocation,
    terminal: &mut dyn Terminal,
) -> Result<Option<String>> {
    dispatcher.connections.reconnect()?;
    writeln!(terminal.output(), "Opened new connection.")?;
    Ok(None)
}

pub(super) fn csv(
    dispatcher: &mut Dispatcher<'_>,
    invocation: &Invocation,
    terminal: &mut dyn Terminal,
) -> Result<Option<String>> {
    let out = terminal.output();
    if invocation.args().is_empty() {
        dispatcher.config.csv_export_path = None;
        writeln!(out, "Disabled CSV writing")?;
        return Ok(None);
    }

    let path = absolute_path(&invocation.line.rest());
    if let Err(e) = CsvExporter::open_append(&path) {
        warn!("{e}");
        writeln!(out, "ERROR opening file \"{}\". Invalid path?", path.display())?;
        return Ok(None);
    }
    info!("CSV export armed for {}", path.display());
    writeln!(out, "CSV target \"{}\"", path.display())?;
    dispatcher.config.csv_export_path = Some(path);
    Ok(None)
}

pub(super) fn script(
    _dispatcher: &mut Dispatcher<'_>,
    invocation: &Invocation,
    terminal: &mut dyn Terminal,
) -> Result<Option<String>> {
    if invocation.args().is_empty() {
        writeln!(terminal.output(), "No input path provided")?;
        return Ok(None);
    }

    let path = absolute_path(&invocation.line.rest());
    if !path.exists() {
        writeln!(terminal.output(), "File \"{}\" does not exist", path.display())?;
        return Ok(None);
    }
    let text = match std::fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) => {
            warn!("Cannot read {}: {e}", path.display());
            writeln!(terminal.output(), "ERROR reading file \"{}\"", path.display())?;
            return Ok(None);
        }
    };
    writeln!(terminal.output(), "Loaded script file \"{}\"", path.display())?;
    expand_template(text.trim(), terminal).map(Some)
}

pub(super) fn tables(
    dispatcher: &mut Dispatcher<'_>,
    invocation: &Invocation,
    terminal: &mut dyn Terminal,
) -> Result<Option<String>> {
    let pattern = match invocation.args() {
        [] => None,
        [name] => Some(name.clone()),
        _ => {
            writeln!(terminal.output(), "Invalid arguments. Usage: :tables [-eq] [name]")?;
            return Ok(None);
        }
    };
    let request = CatalogRequest::Tables {
        pattern,
        exact: invocation.has_modifier(EXACT_MODIFIER),
    };
    catalog(dispatcher, &request, terminal)
}

pub(super) fn cols(
    dispatcher: &mut Dispatcher<'_>,
    invocation: &Invocation,
    terminal: &mut dyn Terminal,
) -> Result<Option<String>> {
    let [table] = invocation.args() else {
        writeln!(terminal.output(), "Invalid arguments. Usage: :cols [-eq] table")?;
        return Ok(None);
    };
    let request = CatalogRequest::Columns {
        table: table.clone(),
        exact: invocation.has_modifier(EXACT_MODIFIER),
    };
    catalog(dispatcher, &request, terminal)
}

fn catalog(
    dispatcher: &mut Dispatcher<'_>,
    request: &CatalogRequest,
    terminal: &mut dyn Terminal,
) -> Result<Option<String>> {
    let query = dispatcher.connections.get()?.catalog_query(request);
    echo_query(&query, terminal)?;
    Ok(Some(query))
}

/// Resolve a user-typed path against the working directory
fn absolute_path(typed: &str) -> PathBuf {
    let path = Path::new(typed);
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
