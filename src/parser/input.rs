//! Multi-line input assembly
//!
//! Raw lines are accumulated until one of three terminators shows up:
//! - a line ending in `;;` ends the unit, keeping one `;`
//! - a line starting with `GO` (any case) ends the unit and is dropped
//! - a line starting with `:` is a command; it discards pending lines

/// Prefix of built-in and named commands
pub const COMMAND_PREFIX: char = ':';

/// Terminator kept as a single `;`
const DOUBLE_SEMICOLON: &str = ";;";

/// Batch separator line
const GO: &str = "GO";

/// Accumulates raw lines into logical input units
#[derive(Debug, Default)]
pub struct StatementBuffer {
    lines: Vec<String>,
}

impl StatementBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one raw line.
    ///
    /// Returns the completed input unit when this line terminates it.
    pub fn push(&mut self, line: &str) -> Option<String> {
        let trimmed = line.trim();

        if trimmed.ends_with(DOUBLE_SEMICOLON) {
            self.lines.push(line.to_string());
            let mut text = self.take().trim_end().to_string();
            text.pop();
            return Some(text);
        }

        if trimmed.to_uppercase().starts_with(GO) {
            return Some(self.take());
        }

        if line.starts_with(COMMAND_PREFIX) {
            if !self.lines.is_empty() {
                tracing::debug!("Command discards {} pending lines", self.lines.len());
            }
            self.lines.clear();
            return Some(line.to_string());
        }

        self.lines.push(line.to_string());
        None
    }

    /// Whether no lines are pending
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn take(&mut self) -> String {
        let text = self.lines.join("\n");
        self.lines.clear();
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_semicolon_single_line() {
        let mut buffer = StatementBuffer::new();
        assert_eq!(buffer.push("SELECT 1;;"), Some("SELECT 1;".to_string()));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_double_semicolon_joins_lines() {
        let mut buffer = StatementBuffer::new();
        assert_eq!(buffer.push("SELECT *"), None);
        assert_eq!(buffer.push("FROM t"), None);
        assert_eq!(
            buffer.push("WHERE a = 1;;  "),
            Some("SELECT *\nFROM t\nWHERE a = 1;".to_string())
        );
    }

    #[test]
    fn test_go_drops_its_line() {
        let mut buffer = StatementBuffer::new();
        buffer.push("SELECT 1");
        buffer.push("SELECT 2");
        assert_eq!(buffer.push("  go  "), Some("SELECT 1\nSELECT 2".to_string()));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_go_without_pending_lines_is_empty() {
        let mut buffer = StatementBuffer::new();
        assert_eq!(buffer.push("GO"), Some(String::new()));
    }

    #[test]
    fn test_command_discards_pending_lines() {
        let mut buffer = StatementBuffer::new();
        buffer.push("SELECT half a query");
        assert_eq!(buffer.push(":rows 5"), Some(":rows 5".to_string()));
        assert!(buffer.is_empty());
        assert_eq!(buffer.push("SELECT 1;;"), Some("SELECT 1;".to_string()));
    }

    #[test]
    fn test_single_semicolon_keeps_accumulating() {
        let mut buffer = StatementBuffer::new();
        assert_eq!(buffer.push("SELECT 1;"), None);
        assert!(!buffer.is_empty());
    }
}
