//! Terminal access for the session
//!
//! Everything that reads from or writes to the user goes through the
//! [`Terminal`] trait, so the session engine can be driven by a scripted
//! terminal in tests.

use std::io::{self, Write};

use reedline::{
    ColumnarMenu, Emacs, FileBackedHistory, KeyCode, KeyModifiers, MenuBuilder, Reedline,
    ReedlineEvent, ReedlineMenu, Signal, default_emacs_keybindings,
};
use tracing::{debug, warn};

use crate::config::HistoryConfig;
use crate::error::{ExecutionError, Result};
use crate::repl::completer::CommandCompleter;
use crate::repl::prompt::LinePrompt;

/// Name of the Tab completion menu
const COMPLETION_MENU: &str = "completion_menu";

/// Line input plus an output stream
pub trait Terminal {
    /// Read one line after showing `prompt`.
    ///
    /// Returns `None` when input has ended (EOF, Ctrl-C or Ctrl-D).
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;

    /// Stream for everything the session prints
    fn output(&mut self) -> &mut dyn Write;

    /// Ask the user for a value; ended input is an error
    fn ask(&mut self, prompt: &str) -> Result<String> {
        match self.read_line(prompt)? {
            Some(answer) => Ok(answer),
            None => Err(ExecutionError::InvalidParameters(format!(
                "input ended while waiting for '{}'",
                prompt.trim_end()
            ))
            .into()),
        }
    }
}

/// Interactive terminal backed by reedline
pub struct ReedlineTerminal {
    /// Line editor
    editor: Reedline,

    /// Standard output
    stdout: io::Stdout,
}

impl ReedlineTerminal {
    /// Create a terminal, with persistent history when enabled
    ///
    /// # Arguments
    /// * `history` - History configuration
    /// * `completer` - Tab completion for command names
    pub fn new(history: &HistoryConfig, completer: CommandCompleter) -> Self {
        let mut keybindings = default_emacs_keybindings();
        keybindings.add_binding(
            KeyModifiers::NONE,
            KeyCode::Tab,
            ReedlineEvent::UntilFound(vec![
                ReedlineEvent::Menu(COMPLETION_MENU.to_string()),
                ReedlineEvent::MenuNext,
            ]),
        );
        let menu = ColumnarMenu::default().with_name(COMPLETION_MENU);

        let mut editor = Reedline::create()
            .with_completer(Box::new(completer))
            .with_menu(ReedlineMenu::EngineCompleter(Box::new(menu)))
            .with_edit_mode(Box::new(Emacs::new(keybindings)));

        if history.persist {
            match FileBackedHistory::with_file(history.max_size, history.file_path.clone()) {
                Ok(file_history) => {
                    debug!("Using history file {}", history.file_path.display());
                    editor = editor.with_history(Box::new(file_history));
                }
                Err(e) => warn!(
                    "History disabled, cannot open {}: {}",
                    history.file_path.display(),
                    e
                ),
            }
        }

        Self {
            editor,
            stdout: io::stdout(),
        }
    }
}

impl Terminal for ReedlineTerminal {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        self.stdout.flush()?;
        match self.editor.read_line(&LinePrompt::new(prompt))? {
            Signal::Success(line) => Ok(Some(line)),
            // Ctrl-C and Ctrl-D end the session
            _ => Ok(None),
        }
    }

    fn output(&mut self) -> &mut dyn Write {
        &mut self.stdout
    }
}
