//! Connection management for querysh
//!
//! This module defines the seam between the session engine and the
//! connectivity layer:
//! - [`Driver`] opens connections from the current connection parameters
//! - [`Connection`] executes query text with positional parameters
//! - [`Cursor`] walks the result sets a single execution produced
//! - [`ConnectionManager`] owns the one live connection of a session
//!
//! The built-in backend is SQLite (see [`sqlite`]).

use tracing::{debug, info};

use crate::error::{ConnectionError, Result};

pub mod sqlite;
pub mod value;

#[cfg(test)]
pub(crate) mod mock;

pub use sqlite::SqliteDriver;
pub use value::{Column, Row, Value};

/// Outcome of advancing a cursor to its next result set
#[derive(Debug, Clone, PartialEq)]
pub enum ResultSetStep {
    /// A result set with the given columns is ready to be fetched
    Produced(Vec<Column>),

    /// The statement ran but produced no result set (DDL, DML, ...).
    /// Not an error: there is simply nothing to format.
    EmptyNoResultSet,

    /// Every result set of the execution has been consumed
    NoMoreSets,
}

/// Iterator-like handle over the result sets of one execution
pub trait Cursor {
    /// Advance to the next result set.
    ///
    /// The first call moves to the first result set.
    fn next_result_set(&mut self) -> Result<ResultSetStep>;

    /// Fetch up to `limit` rows of the current result set, or all remaining
    /// rows when `limit` is `None`.
    fn fetch(&mut self, limit: Option<usize>) -> Result<Vec<Row>>;

    /// Total row count of the current result set, if the driver knows it
    fn row_count_hint(&self) -> Option<u64>;

    /// Rows affected by the whole execution, if the driver knows it
    fn rows_affected(&self) -> Option<u64>;
}

/// What the catalog built-ins want to list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogRequest {
    /// Tables whose name matches the pattern (all tables when `None`)
    Tables { pattern: Option<String>, exact: bool },

    /// Columns of the tables whose name matches the pattern
    Columns { table: String, exact: bool },
}

impl CatalogRequest {
    /// Build a SQL predicate comparing `column` with the request pattern.
    ///
    /// Single quotes in the pattern are doubled.
    pub fn name_predicate(column: &str, pattern: &str, exact: bool) -> String {
        let escaped = pattern.replace('\'', "''");
        if exact {
            format!("{column} = '{escaped}'")
        } else {
            format!("{column} LIKE '%{escaped}%'")
        }
    }
}

/// A live connection to a data source
pub trait Connection {
    /// Execute query text, binding `params` positionally.
    ///
    /// Drivers may defer work until the cursor is advanced, so the cursor
    /// borrows the query text as well as the connection.
    fn execute<'a>(
        &'a mut self,
        sql: &'a str,
        params: &[String],
    ) -> Result<Box<dyn Cursor + 'a>>;

    /// Set the command timeout in seconds
    fn set_timeout(&mut self, seconds: u64) -> Result<()>;

    /// Current command timeout in seconds
    fn timeout(&self) -> u64;

    /// Query text listing catalog objects.
    ///
    /// Defaults to the standard INFORMATION_SCHEMA views.
    fn catalog_query(&self, request: &CatalogRequest) -> String {
        match request {
            CatalogRequest::Tables { pattern, exact } => {
                let mut sql = String::from(
                    "SELECT TABLE_CATALOG, TABLE_SCHEMA, TABLE_NAME, TABLE_TYPE \
                     FROM INFORMATION_SCHEMA.TABLES",
                );
                if let Some(pattern) = pattern {
                    sql.push_str(" WHERE ");
                    sql.push_str(&CatalogRequest::name_predicate("TABLE_NAME", pattern, *exact));
                }
                sql
            }
            CatalogRequest::Columns { table, exact } => format!(
                "SELECT TABLE_CATALOG, TABLE_SCHEMA, TABLE_NAME, COLUMN_NAME, DATA_TYPE \
                 FROM INFORMATION_SCHEMA.COLUMNS WHERE {}",
                CatalogRequest::name_predicate("TABLE_NAME", table, *exact)
            ),
        }
    }
}

/// Connection parameters shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    /// Server name (or a placeholder for serverless sources)
    pub server: String,
    /// Database name
    pub database: String,
}

impl ConnectionInfo {
    /// Prompt header shown after every cycle, `server@database`
    pub fn prompt_header(&self) -> String {
        format!("{}@{}", self.server, self.database)
    }
}

/// Opens connections from a fixed set of connection parameters
pub trait Driver {
    /// Open a new connection with the given command timeout
    fn connect(&self, timeout_secs: u64) -> Result<Box<dyn Connection>>;

    /// Describe the target of this driver
    fn describe(&self) -> ConnectionInfo;
}

/// Owner of the single live connection of a session
pub struct ConnectionManager {
    /// Driver used to open connections
    driver: Box<dyn Driver>,

    /// Live connection, opened lazily
    connection: Option<Box<dyn Connection>>,

    /// Timeout applied to new connections
    timeout_secs: u64,
}

impl ConnectionManager {
    /// Create a new connection manager
    ///
    /// # Arguments
    /// * `driver` - Driver opening the connections
    /// * `timeout_secs` - Command timeout applied to every new connection
    pub fn new(driver: Box<dyn Driver>, timeout_secs: u64) -> Self {
        Self {
            driver,
            connection: None,
            timeout_secs,
        }
    }

    /// Get the live connection, opening one if there is none yet
    pub fn get(&mut self) -> Result<&mut dyn Connection> {
        if self.connection.is_none() {
            debug!("Opening connection to {}", self.info().prompt_header());
            self.connection = Some(self.driver.connect(self.timeout_secs)?);
        }
        match self.connection.as_deref_mut() {
            Some(connection) => Ok(connection),
            None => Err(ConnectionError::NotConnected.into()),
        }
    }

    /// Discard the live connection and open a new one.
    ///
    /// The old handle is dropped without explicit teardown. On failure the
    /// manager is left without a connection and the next [`get`](Self::get)
    /// tries again.
    pub fn reconnect(&mut self) -> Result<()> {
        self.connection = None;
        self.connection = Some(self.driver.connect(self.timeout_secs)?);
        info!("Reconnected to {}", self.info().prompt_header());
        Ok(())
    }

    /// Set the command timeout on the live connection.
    ///
    /// Future connections only inherit a value the live connection accepted.
    pub fn set_timeout(&mut self, seconds: u64) -> Result<()> {
        self.get()?.set_timeout(seconds)?;
        self.timeout_secs = seconds;
        Ok(())
    }

    /// Timeout of the live connection, or the configured one if not connected
    pub fn timeout(&self) -> u64 {
        self.connection
            .as_ref()
            .map(|connection| connection.timeout())
            .unwrap_or(self.timeout_secs)
    }

    /// Connection parameters for display
    pub fn info(&self) -> ConnectionInfo {
        self.driver.describe()
    }

    /// Whether a live connection exists
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }
}
