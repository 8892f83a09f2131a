//! Error handling for querysh.
//!
//! All fallible operations in the crate return [`Result`], whose error type
//! [`QueryshError`] wraps the more specific kinds:
//! - connection failures and rejected driver settings
//! - template parse errors
//! - execution and export errors
//! - configuration errors
//!
//! Driver errors (`rusqlite`) and CSV writer errors convert automatically,
//! so backend code can use `?` directly.

pub mod kinds;

// Re-export commonly used types
pub use kinds::{ConfigError, ConnectionError, ExecutionError, ParseError, QueryshError, Result};
