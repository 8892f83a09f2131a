//! querysh library
//!
//! This library provides the core of the querysh interactive SQL shell.
//! It can be used on its own to drive a session against any backend that
//! implements the [`connection::Driver`] trait.
//!
//! # Modules
//!
//! - `cli`: Command-line interface and argument parsing
//! - `commands`: Built-in and named `:` commands
//! - `config`: Configuration management
//! - `connection`: Driver, connection and cursor traits plus the SQLite backend
//! - `error`: Error types and handling
//! - `executor`: Query execution, parameter prompts and CSV export
//! - `formatter`: Value formatting and grid rendering
//! - `parser`: Input assembly, command lines and query templates
//! - `repl`: Interactive session engine
//!
//! # Example
//!
//! ```no_run
//! use querysh::{ConnectionManager, ReedlineTerminal, Session, SessionConfig};
//! use querysh::repl::CommandCompleter;
//! use querysh::config::Config;
//! use querysh::connection::SqliteDriver;
//!
//! fn main() -> querysh::Result<()> {
//!     let config = Config::default();
//!     let driver = SqliteDriver::new("shop.db");
//!     let connections = ConnectionManager::new(Box::new(driver), config.connection.timeout);
//!     let mut session = Session::new(connections, SessionConfig::from_config(&config));
//!     let completer = CommandCompleter::new(session.config().named_commands.names());
//!     session.run(&mut ReedlineTerminal::new(&config.history, completer))
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod connection;
pub mod error;
pub mod executor;
pub mod formatter;
pub mod parser;
pub mod repl;

// Re-export commonly used types
pub use config::Config;
pub use connection::{ConnectionManager, Driver};
pub use error::{QueryshError, Result};
pub use executor::{ExecutionReport, QueryExecutor};
pub use repl::{ReedlineTerminal, Session, SessionConfig, Terminal};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
pub fn version() -> &'static str {
    VERSION
}
