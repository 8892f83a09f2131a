//! `{placeholder}` templates
//!
//! Named commands and scripts are templates: literal text with `{name}`
//! placeholders. `{{` and `}}` stand for literal braces. Every distinct name is
//! asked for once, in order of first appearance, and all of its occurrences
//! receive the same value.

use crate::error::{ParseError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

/// A parsed template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Parse template text in one left-to-right scan.
    ///
    /// Unmatched braces and placeholders without a name (`{}`, `{0}`) are
    /// template errors: there is nothing to resolve them from.
    pub fn parse(text: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = text.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '{' => {
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some('{') | None => return Err(template_error("unmatched '{'")),
                            Some(c) => name.push(c),
                        }
                    }
                    validate_name(&name)?;
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder(name));
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '}' => return Err(template_error("single '}' encountered")),
                c => literal.push(c),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Self { segments })
    }

    /// Distinct placeholder names in order of first appearance
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for segment in &self.segments {
            if let Segment::Placeholder(name) = segment
                && !names.contains(&name.as_str())
            {
                names.push(name);
            }
        }
        names
    }

    /// Resolve every placeholder through `ask`, called once per distinct name
    pub fn expand(&self, mut ask: impl FnMut(&str) -> Result<String>) -> Result<String> {
        let mut values: Vec<(&str, String)> = Vec::new();
        for name in self.placeholders() {
            let value = ask(name)?;
            values.push((name, value));
        }

        let mut text = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(literal) => text.push_str(literal),
                Segment::Placeholder(name) => {
                    if let Some((_, value)) =
                        values.iter().find(|(known, _)| *known == name.as_str())
                    {
                        text.push_str(value);
                    }
                }
            }
        }
        Ok(text)
    }
}

fn validate_name(name: &str) -> Result<()> {
    let Some(first) = name.chars().next() else {
        return Err(template_error("positional placeholder '{}' cannot be resolved"));
    };
    if first.is_ascii_digit() {
        return Err(template_error(&format!(
            "positional placeholder '{{{name}}}' cannot be resolved"
        )));
    }
    let identifier = (first.is_alphabetic() || first == '_')
        && name.chars().all(|c| c.is_alphanumeric() || c == '_');
    if !identifier {
        return Err(template_error(&format!("invalid placeholder '{{{name}}}'")));
    }
    Ok(())
}

fn template_error(msg: &str) -> crate::error::QueryshError {
    ParseError::Template(msg.to_string()).into()
}
