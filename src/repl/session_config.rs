//! Session-wide mutable settings
//!
//! A [`SessionConfig`] is built once from the loaded [`Config`] and then owned
//! by the session. Built-in commands mutate it in place and every component
//! reads it through a reference, so a change is visible on the next read.

use std::path::PathBuf;

use crate::config::Config;

/// Token that switches a substitution setting off
pub const OFF: &str = "OFF";

/// Session settings shared by the dispatcher, executor and formatters
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Rows fetched and printed per result set (0 = all)
    pub rows_to_print: usize,

    /// Maximum characters per column (0 = unbounded)
    pub column_display_width: usize,

    /// Text shown for NULL values
    pub null_string: String,

    /// Text replacing `\n` in values
    pub newline_replacement: String,

    /// Text replacing `\t` in values
    pub tab_replacement: String,

    /// Command timeout in seconds
    pub timeout_secs: u64,

    /// When set, result sets are appended to this CSV file instead of printed
    pub csv_export_path: Option<PathBuf>,

    /// Rows written per CSV batch
    pub csv_batch_size: usize,

    /// Color error markers
    pub color_output: bool,

    /// User-declared named command templates
    pub named_commands: NamedCommands,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl SessionConfig {
    /// Build the session settings from a loaded configuration
    pub fn from_config(config: &Config) -> Self {
        let display = &config.display;
        Self {
            rows_to_print: display.rows_to_print,
            column_display_width: display.column_display_width,
            null_string: null_setting(&display.null_string),
            newline_replacement: replacement_setting(&display.newline_replacement, '\n'),
            tab_replacement: replacement_setting(&display.tab_replacement, '\t'),
            timeout_secs: config.connection.timeout,
            csv_export_path: None,
            csv_batch_size: display.csv_batch_size.max(1),
            color_output: display.color_output,
            named_commands: config.named_commands().into_iter().collect(),
        }
    }

    /// Row window as a fetch limit, `None` meaning all rows
    pub fn fetch_limit(&self) -> Option<usize> {
        (self.rows_to_print > 0).then_some(self.rows_to_print)
    }
}

/// Interpret a null-string setting; `OFF` means an empty string
pub fn null_setting(value: &str) -> String {
    if value == OFF {
        String::new()
    } else {
        value.to_string()
    }
}

/// Interpret a control-character replacement; `OFF` keeps the raw character
pub fn replacement_setting(value: &str, raw: char) -> String {
    if value == OFF {
        raw.to_string()
    } else {
        value.to_string()
    }
}

/// Named command templates in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamedCommands {
    entries: Vec<(String, String)>,
}

impl NamedCommands {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a command, replacing the template of an existing one in place
    pub fn insert(&mut self, name: impl Into<String>, template: impl Into<String>) {
        let name = name.into();
        let template = template.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = template,
            None => self.entries.push((name, template)),
        }
    }

    /// Template of the named command
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, template)| template.as_str())
    }

    /// Command names in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for NamedCommands {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut commands = Self::new();
        for (name, template) in iter {
            commands.insert(name, template);
        }
        commands
    }
}
