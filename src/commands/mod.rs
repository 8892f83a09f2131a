//! Command dispatch for querysh
//!
//! A `:`-prefixed input line is one of:
//! - a built-in command, which changes session settings or triggers an
//!   action (reconnect, export, script)
//! - a named command declared in the `[queries]` section of the
//!   configuration, which expands into query text
//! - anything else, which is reported as an invalid command
//!
//! Built-ins validate their own arguments: a bad value is printed and the
//! setting stays as it was. Template errors, reconnect failures and driver
//! errors are returned to the session loop.

use std::io::Write;

use tracing::debug;

use crate::connection::ConnectionManager;
use crate::error::Result;
use crate::parser::{CommandLine, Template};
use crate::repl::session_config::SessionConfig;
use crate::repl::terminal::Terminal;

mod builtins;
pub mod help;

#[cfg(test)]
mod tests;

/// Input lines that end the session
pub const EXIT_KEYWORDS: [&str; 2] = [":exit", ":quit"];

/// Printed for names that are neither built-in nor declared
pub const INVALID_COMMAND: &str = "Invalid command. Use :help for a list of available commands.";

/// Modifier switching catalog searches from "contains" to exact match
pub const EXACT_MODIFIER: &str = "-eq";

/// Whether the input line ends the session
pub fn is_exit(line: &str) -> bool {
    EXIT_KEYWORDS.contains(&line.trim())
}

/// Handler of a built-in command
type Handler = fn(&mut Dispatcher<'_>, &Invocation, &mut dyn Terminal) -> Result<Option<String>>;

/// A built-in command
pub struct CommandDescriptor {
    /// Name without the `:` prefix
    pub name: &'static str,

    /// Usage line shown by `:help`
    pub usage: &'static str,

    /// One-line description shown by `:help`
    pub summary: &'static str,

    /// Modifiers the command accepts before its arguments
    pub modifiers: &'static [&'static str],

    handler: Handler,
}

/// Built-in commands, in `:help` order
pub static BUILTINS: &[CommandDescriptor] = &[
    CommandDescriptor {
        name: "help",
        usage: ":help",
        summary: "Prints the command list.",
        modifiers: &[],
        handler: help::show,
    },
    CommandDescriptor {
        name: "rows",
        usage: ":rows [number]",
        summary: "Rows to print of each result set. No number shows the current value, 0 prints all rows.",
        modifiers: &[],
        handler: builtins::rows,
    },
    CommandDescriptor {
        name: "chars",
        usage: ":chars [number]",
        summary: "Characters to print per column. No number shows the current value, 0 never truncates.",
        modifiers: &[],
        handler: builtins::chars,
    },
    CommandDescriptor {
        name: "null",
        usage: ":null [string]",
        summary: "String shown for NULL values. OFF shows nothing, so empty strings and NULL look alike.",
        modifiers: &[],
        handler: builtins::null,
    },
    CommandDescriptor {
        name: "newline",
        usage: ":newline [string]",
        summary: "String replacing newlines in values. OFF keeps raw newlines, which may break the grid.",
        modifiers: &[],
        handler: builtins::newline,
    },
    CommandDescriptor {
        name: "tab",
        usage: ":tab [string]",
        summary: "String replacing tabs in values. OFF keeps raw tab characters.",
        modifiers: &[],
        handler: builtins::tab,
    },
    CommandDescriptor {
        name: "timeout",
        usage: ":timeout [seconds]",
        summary: "Seconds to wait for a command to finish running.",
        modifiers: &[],
        handler: builtins::timeout,
    },
    CommandDescriptor {
        name: "reconnect",
        usage: ":reconnect",
        summary: "Opens a new connection to the server, discarding the old one.",
        modifiers: &[],
        handler: builtins::reconnect,
    },
    CommandDescriptor {
        name: "csv",
        usage: ":csv [path]",
        summary: "Appends the output of the next query to a CSV file. No path prints results again.",
        modifiers: &[],
        handler: builtins::csv,
    },
    CommandDescriptor {
        name: "script",
        usage: ":script path",
        summary: "Runs the contents of a file as a named command, with {placeholders} and ? parameters.",
        modifiers: &[],
        handler: builtins::script,
    },
    CommandDescriptor {
        name: "tables",
        usage: ":tables [-eq] [name]",
        summary: "Lists tables, or tables whose name contains (with -eq: equals) name.",
        modifiers: &[EXACT_MODIFIER],
        handler: builtins::tables,
    },
    CommandDescriptor {
        name: "cols",
        usage: ":cols [-eq] table",
        summary: "Lists the columns of tables whose name contains (with -eq: equals) table.",
        modifiers: &[EXACT_MODIFIER],
        handler: builtins::cols,
    },
];

/// Look up a built-in by name
pub fn find_builtin(name: &str) -> Option<&'static CommandDescriptor> {
    BUILTINS.iter().find(|descriptor| descriptor.name == name)
}

/// A command line with its modifiers pulled out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Name and remaining arguments
    pub line: CommandLine,

    /// Modifiers given before the arguments
    pub modifiers: Vec<String>,
}

impl Invocation {
    pub fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.iter().any(|given| given == modifier)
    }

    pub fn args(&self) -> &[String] {
        &self.line.args
    }
}

/// Dispatcher of `:`-prefixed input lines
pub struct Dispatcher<'a> {
    /// Owner of the live connection
    connections: &'a mut ConnectionManager,

    /// Session settings
    config: &'a mut SessionConfig,
}

impl<'a> Dispatcher<'a> {
    /// Create a new dispatcher
    ///
    /// # Arguments
    /// * `connections` - Connection manager of the session
    /// * `config` - Session settings mutated by the built-ins
    pub fn new(connections: &'a mut ConnectionManager, config: &'a mut SessionConfig) -> Self {
        Self {
            connections,
            config,
        }
    }

    /// Dispatch one command line.
    ///
    /// # Returns
    /// * `Result<Option<String>>` - Query text to execute, or `None` when the
    ///   command was fully handled
    pub fn dispatch(&mut self, line: &str, terminal: &mut dyn Terminal) -> Result<Option<String>> {
        let Some(mut command) = CommandLine::parse(line) else {
            writeln!(terminal.output(), "{INVALID_COMMAND}")?;
            return Ok(None);
        };

        if let Some(descriptor) = find_builtin(&command.name) {
            let modifiers = command.take_modifiers(descriptor.modifiers);
            debug!("Running built-in :{}", descriptor.name);
            let invocation = Invocation {
                line: command,
                modifiers,
            };
            return (descriptor.handler)(self, &invocation, terminal);
        }

        if let Some(template) = self.config.named_commands.get(&command.name) {
            debug!("Expanding named command :{}", command.name);
            let template = template.to_string();
            return expand_template(&template, terminal).map(Some);
        }

        writeln!(terminal.output(), "{INVALID_COMMAND}")?;
        Ok(None)
    }
}

/// Expand a named command or script body, asking once per placeholder.
///
/// The resulting query text is echoed before it is returned.
pub fn expand_template(text: &str, terminal: &mut dyn Terminal) -> Result<String> {
    let template = Template::parse(text)?;
    if !template.placeholders().is_empty() {
        writeln!(terminal.output())?;
    }
    let query = template.expand(|name| terminal.ask(&format!("{name}> ")))?;
    echo_query(&query, terminal)?;
    Ok(query)
}

/// Show query text the shell built on the user's behalf
fn echo_query(query: &str, terminal: &mut dyn Terminal) -> Result<()> {
    writeln!(terminal.output(), "Command query:\n{query}")?;
    Ok(())
}
