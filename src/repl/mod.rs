//! Interactive session engine for querysh
//!
//! The session is an explicit state machine:
//!
//! ```text
//! AwaitingInput -> Dispatching -> Executing -> Reporting -> AwaitingInput
//!       |               |
//!       +---------------+-> Exited
//! ```
//!
//! Input units come from the [`StatementBuffer`] grammar. Errors raised while
//! dispatching or executing are printed between `---ERROR---` markers and the
//! loop carries on; only the first connection attempt is fatal.

use std::fmt::Display;
use std::io::Write;

use nu_ansi_term::Color;
use tracing::debug;

use crate::commands::{Dispatcher, is_exit};
use crate::connection::ConnectionManager;
use crate::error::Result;
use crate::executor::{ExecutionReport, QueryExecutor};
use crate::parser::{COMMAND_PREFIX, StatementBuffer};

pub mod completer;
pub mod prompt;
pub mod session_config;
pub mod terminal;


pub use completer::CommandCompleter;
pub use session_config::{NamedCommands, SessionConfig};
pub use terminal::{ReedlineTerminal, Terminal};

/// Line prompt
pub const PROMPT: &str = "> ";

/// Line prompt while a CSV export is armed
pub const CSV_PROMPT: &str = "csv> ";

/// Delimiter printed around error messages
pub const ERROR_MARKER: &str = "---ERROR---";

/// Where the session is in its read-dispatch-execute cycle
#[derive(Debug)]
pub enum SessionState {
    /// Waiting for a complete input unit
    AwaitingInput,

    /// A command line is being dispatched
    Dispatching(String),

    /// Query text is being executed
    Executing(String),

    /// An execution finished and its summary is due
    Reporting(ExecutionReport),

    /// The session is over
    Exited,
}

/// One interactive session against one data source
pub struct Session {
    /// Owner of the live connection
    connections: ConnectionManager,

    /// Session settings, shared with every component by reference
    config: SessionConfig,

    /// Lines of the input unit being composed
    buffer: StatementBuffer,
}

impl Session {
    /// Create a new session
    ///
    /// # Arguments
    /// * `connections` - Connection manager, not connected yet
    /// * `config` - Initial session settings
    pub fn new(connections: ConnectionManager, config: SessionConfig) -> Self {
        Self {
            connections,
            config,
            buffer: StatementBuffer::new(),
        }
    }

    /// Current session settings
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Header printed before every input unit, `server@database`
    pub fn prompt_header(&self) -> String {
        self.connections.info().prompt_header()
    }

    /// Greeting printed once the first connection is open
    pub fn banner(&self) -> String {
        let info = self.connections.info();
        format!(
            "Connected to server {} database {}\n\n\
             Special commands are prefixed with \"{COMMAND_PREFIX}\". For example, use \":exit\" \
             or \":quit\" to finish your session. Everything else is sent directly to the server.\n\
             Use \":help\" to get a list of commands available",
            info.server, info.database
        )
    }

    /// Run the session until an exit keyword or the end of input.
    ///
    /// # Returns
    /// * `Result<()>` - Error only if the first connection fails or the
    ///   terminal itself breaks
    pub fn run(&mut self, terminal: &mut dyn Terminal) -> Result<()> {
        self.connections.get()?;
        writeln!(terminal.output(), "{}", self.banner())?;
        writeln!(terminal.output(), "{}", self.prompt_header())?;

        let mut state = SessionState::AwaitingInput;
        loop {
            state = match state {
                SessionState::AwaitingInput => self.read_unit(terminal)?,
                SessionState::Dispatching(line) => self.dispatch(&line, terminal)?,
                SessionState::Executing(query) => self.execute(&query, terminal)?,
                SessionState::Reporting(report) => {
                    writeln!(terminal.output(), "\n{}", report.summary())?;
                    self.end_cycle(terminal)?
                }
                SessionState::Exited => break,
            };
        }

        debug!("Session ended");
        Ok(())
    }

    /// Read lines until the input grammar yields a unit
    fn read_unit(&mut self, terminal: &mut dyn Terminal) -> Result<SessionState> {
        loop {
            let prompt = if self.config.csv_export_path.is_some() {
                CSV_PROMPT
            } else {
                PROMPT
            };
            let Some(line) = terminal.read_line(prompt)? else {
                return Ok(SessionState::Exited);
            };
            let Some(unit) = self.buffer.push(&line) else {
                continue;
            };

            if is_exit(&unit) {
                return Ok(SessionState::Exited);
            }
            if unit.starts_with(COMMAND_PREFIX) {
                return Ok(SessionState::Dispatching(unit));
            }
            if !unit.trim().is_empty() {
                return Ok(SessionState::Executing(unit));
            }
        }
    }

    fn dispatch(&mut self, line: &str, terminal: &mut dyn Terminal) -> Result<SessionState> {
        let outcome =
            Dispatcher::new(&mut self.connections, &mut self.config).dispatch(line, terminal);
        match outcome {
            Ok(Some(query)) => Ok(SessionState::Executing(query)),
            Ok(None) => self.end_cycle(terminal),
            Err(e) => {
                self.print_error(&e, terminal)?;
                self.end_cycle(terminal)
            }
        }
    }

    fn execute(&mut self, query: &str, terminal: &mut dyn Terminal) -> Result<SessionState> {
        let outcome =
            QueryExecutor::new(&mut self.connections, &mut self.config).execute(query, terminal);
        match outcome {
            Ok(report) => Ok(SessionState::Reporting(report)),
            Err(e) => {
                self.print_error(&e, terminal)?;
                self.end_cycle(terminal)
            }
        }
    }

    /// Reprint the prompt header and wait for the next unit
    fn end_cycle(&self, terminal: &mut dyn Terminal) -> Result<SessionState> {
        writeln!(terminal.output(), "\n{}", self.prompt_header())?;
        Ok(SessionState::AwaitingInput)
    }

    fn print_error(&self, error: &dyn Display, terminal: &mut dyn Terminal) -> Result<()> {
        debug!("Cycle failed: {error}");
        let marker = if self.config.color_output {
            Color::Red.paint(ERROR_MARKER).to_string()
        } else {
            ERROR_MARKER.to_string()
        };
        writeln!(terminal.output(), "{marker}\n{error}\n{marker}")?;
        Ok(())
    }
}
