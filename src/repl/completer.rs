//! Completer for reedline - completes `:` command names

use reedline::{Completer, Span, Suggestion};

use crate::commands::{BUILTINS, EXIT_KEYWORDS};
use crate::parser::COMMAND_PREFIX;

/// Completes built-in, exit and named command names at the start of a line
pub struct CommandCompleter {
    /// Candidates with their prefix, e.g. `:rows`
    candidates: Vec<(String, Option<String>)>,
}

impl CommandCompleter {
    /// Create a completer
    ///
    /// # Arguments
    /// * `named` - Names of the user's named commands
    pub fn new<'a>(named: impl IntoIterator<Item = &'a str>) -> Self {
        let mut candidates: Vec<(String, Option<String>)> = BUILTINS
            .iter()
            .map(|descriptor| {
                (
                    format!("{COMMAND_PREFIX}{}", descriptor.name),
                    Some(descriptor.summary.to_string()),
                )
            })
            .collect();
        candidates.extend(
            EXIT_KEYWORDS
                .iter()
                .map(|keyword| (keyword.to_string(), Some("Ends the session.".to_string()))),
        );
        candidates.extend(
            named
                .into_iter()
                .map(|name| (format!("{COMMAND_PREFIX}{name}"), None)),
        );
        Self { candidates }
    }
}

impl Completer for CommandCompleter {
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        let typed = &line[..pos.min(line.len())];
        // only the command word itself
        if !typed.starts_with(COMMAND_PREFIX) || typed.contains(char::is_whitespace) {
            return Vec::new();
        }

        self.candidates
            .iter()
            .filter(|(value, _)| value.starts_with(typed))
            .map(|(value, description)| Suggestion {
                value: value.clone(),
                description: description.clone(),
                span: Span::new(0, typed.len()),
                append_whitespace: true,
                ..Suggestion::default()
            })
            .collect()
    }
}
