//! Command line splitting
//!
//! A command line is `:name [modifiers] [args]`, split on whitespace. Which
//! leading arguments count as modifiers depends on the command, so they are
//! only pulled out on request.

use crate::parser::input::COMMAND_PREFIX;

/// A command line split into its name and arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    /// Command name without the prefix
    pub name: String,

    /// Remaining whitespace-separated words
    pub args: Vec<String>,
}

impl CommandLine {
    /// Split a command line; `None` if it lacks the command prefix or a name
    pub fn parse(line: &str) -> Option<Self> {
        let body = line.trim().strip_prefix(COMMAND_PREFIX)?;
        let mut words = body.split_whitespace();
        let name = words.next()?.to_string();
        Some(Self {
            name,
            args: words.map(String::from).collect(),
        })
    }

    /// Remove leading arguments found in `allowed` and return them
    pub fn take_modifiers(&mut self, allowed: &[&str]) -> Vec<String> {
        let count = self
            .args
            .iter()
            .take_while(|arg| allowed.contains(&arg.as_str()))
            .count();
        self.args.drain(..count).collect()
    }

    /// Arguments joined back with single spaces
    pub fn rest(&self) -> String {
        self.args.join(" ")
    }
}
