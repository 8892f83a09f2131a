//! Line prompt for the reedline editor

use std::borrow::Cow;

use reedline::{Prompt, PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus};

/// Prompt showing a fixed text, such as `> `, `csv> ` or `name> `
pub struct LinePrompt {
    /// Text rendered left of the cursor
    text: String,
}

impl LinePrompt {
    /// Create a new line prompt
    ///
    /// # Arguments
    /// * `text` - Full prompt text, including any trailing space
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Prompt for LinePrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.text)
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        "".into()
    }

    /// The indicator is part of the prompt text already
    fn render_prompt_indicator(&self, _prompt_mode: PromptEditMode) -> Cow<'_, str> {
        "".into()
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        "... ".into()
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };

        format!("({}reverse-search: {}) ", prefix, history_search.term).into()
    }
}
