use std::{fmt, io};

/// Crate-wide `Result` type using [`QueryshError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is intended
/// to be used throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, QueryshError>;

/// Top-level error type for querysh operations.
///
/// This type wraps more specific error kinds and provides a single
/// error type that can be used throughout the crate.
#[derive(Debug)]
pub enum QueryshError {
    /// Connection-related errors.
    Connection(ConnectionError),

    /// Template parsing errors.
    Parse(ParseError),

    /// Query execution errors.
    Execution(ExecutionError),

    /// Configuration errors.
    Config(ConfigError),

    /// I/O errors.
    Io(io::Error),

    /// SQLite driver errors.
    Sqlite(rusqlite::Error),

    /// CSV writer errors.
    Csv(csv::Error),
}

/// Connection-specific errors.
#[derive(Debug)]
pub enum ConnectionError {
    /// Failed to establish a connection.
    ConnectionFailed(String),

    /// Not currently connected.
    NotConnected,

    /// The driver refused a connection setting.
    SettingRejected { setting: String, reason: String },
}

/// Parsing-specific errors.
#[derive(Debug)]
pub enum ParseError {
    /// Malformed `{placeholder}` template.
    Template(String),
}

/// Execution-specific errors.
#[derive(Debug)]
pub enum ExecutionError {
    /// The driver failed to prepare or run a statement.
    QueryFailed(String),

    /// Invalid operation parameters.
    InvalidParameters(String),

    /// Export to a file failed.
    ExportFailed { path: String, reason: String },
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Invalid config format.
    InvalidFormat(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for QueryshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryshError::Connection(e) => write!(f, "Connection error: {e}"),
            QueryshError::Parse(e) => write!(f, "{e}"),
            QueryshError::Execution(e) => write!(f, "Execution error: {e}"),
            QueryshError::Config(e) => write!(f, "Configuration error: {e}"),
            QueryshError::Io(e) => write!(f, "I/O error: {e}"),
            QueryshError::Sqlite(e) => write!(f, "{e}"),
            QueryshError::Csv(e) => write!(f, "CSV error: {e}"),
        }
    }
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionError::ConnectionFailed(msg) => write!(f, "Failed to connect: {msg}"),
            ConnectionError::NotConnected => write!(f, "Not connected to a data source"),
            ConnectionError::SettingRejected { setting, reason } => {
                write!(f, "Driver rejected setting '{setting}': {reason}")
            }
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Template(msg) => write!(f, "Template error: {msg}"),
        }
    }
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionError::QueryFailed(msg) => write!(f, "Query failed: {msg}"),
            ExecutionError::InvalidParameters(msg) => write!(f, "Invalid parameters: {msg}"),
            ExecutionError::ExportFailed { path, reason } => {
                write!(f, "Export to \"{path}\" failed: {reason}")
            }
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
        }
    }
}

impl std::error::Error for QueryshError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QueryshError::Io(e) => Some(e),
            QueryshError::Sqlite(e) => Some(e),
            QueryshError::Csv(e) => Some(e),
            _ => None,
        }
    }
}
impl std::error::Error for ConnectionError {}
impl std::error::Error for ParseError {}
impl std::error::Error for ExecutionError {}
impl std::error::Error for ConfigError {}

/* ========================= Conversions to QueryshError ========================= */

impl From<io::Error> for QueryshError {
    fn from(err: io::Error) -> Self {
        QueryshError::Io(err)
    }
}

impl From<rusqlite::Error> for QueryshError {
    fn from(err: rusqlite::Error) -> Self {
        QueryshError::Sqlite(err)
    }
}

impl From<csv::Error> for QueryshError {
    fn from(err: csv::Error) -> Self {
        QueryshError::Csv(err)
    }
}

impl From<toml::de::Error> for QueryshError {
    fn from(err: toml::de::Error) -> Self {
        QueryshError::Config(ConfigError::InvalidFormat(err.to_string()))
    }
}

impl From<toml::ser::Error> for QueryshError {
    fn from(err: toml::ser::Error) -> Self {
        QueryshError::Config(ConfigError::InvalidFormat(err.to_string()))
    }
}

impl From<ConnectionError> for QueryshError {
    fn from(err: ConnectionError) -> Self {
        QueryshError::Connection(err)
    }
}

impl From<ParseError> for QueryshError {
    fn from(err: ParseError) -> Self {
        QueryshError::Parse(err)
    }
}

impl From<ExecutionError> for QueryshError {
    fn from(err: ExecutionError) -> Self {
        QueryshError::Execution(err)
    }
}

impl From<ConfigError> for QueryshError {
    fn from(err: ConfigError) -> Self {
        QueryshError::Config(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_error_display() {
        let err: QueryshError = ParseError::Template("unmatched '{'".to_string()).into();
        assert_eq!(err.to_string(), "Template error: unmatched '{'");
    }

    #[test]
    fn test_export_error_mentions_path() {
        let err: QueryshError = ExecutionError::ExportFailed {
            path: "/tmp/out.csv".to_string(),
            reason: "denied".to_string(),
        }
        .into();
        assert!(err.to_string().contains("/tmp/out.csv"));
    }

    #[test]
    fn test_io_error_conversion() {
        let err: QueryshError = io::Error::new(io::ErrorKind::NotFound, "missing").into();
        assert!(matches!(err, QueryshError::Io(_)));
    }
}
