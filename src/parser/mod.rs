//! Input parsing for querysh
//!
//! Nothing here looks at query semantics. The parser only deals with the
//! shell's own syntax:
//! - `input`: assembling raw lines into input units (`;;`, `GO`, `:command`)
//! - `command`: splitting a command line into name, modifiers and arguments
//! - `template`: `{placeholder}` templates of named commands and scripts

pub mod command;
pub mod input;
pub mod template;

pub use command::CommandLine;
pub use input::{COMMAND_PREFIX, StatementBuffer};
pub use template::Template;
