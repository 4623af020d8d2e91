//! Variable interpolation for command templates.
//!
//! Templates use `${variable}` syntax; `$${text}` produces a literal
//! `${text}` so shell-style expansions can pass through untouched.
//!
//! ```
//! use kiln::config::{resolve_string, Variables};
//!
//! let mut vars = Variables::new();
//! vars.insert("dotnet", "dotnet");
//! vars.insert("solution", "App.sln");
//! let command = resolve_string("${dotnet} restore ${solution}", &vars).unwrap();
//! assert_eq!(command, "dotnet restore App.sln");
//! ```

use std::collections::BTreeMap;

use crate::error::{KilnError, Result};

/// A segment of an interpolated string.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Literal text
    Literal(String),
    /// Variable reference: ${name}
    Variable(String),
}

/// Parse a string containing `${var}` interpolations.
///
/// # Arguments
///
/// * `input` - A command template such as `${dotnet} build ${solution}`
///
/// # Returns
///
/// Segments in source order. Adjacent literal text is coalesced, so a
/// template without references yields a single `Literal`.
pub fn parse_interpolation(input: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = input;

    while let Some(pos) = rest.find('$') {
        literal.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if let Some(escaped) = tail.strip_prefix("$${") {
            // $${...} stays literal, braces included
            literal.push_str("${");
            match escaped.find('}') {
                Some(end) => {
                    literal.push_str(&escaped[..=end]);
                    rest = &escaped[end + 1..];
                }
                None => {
                    literal.push_str(escaped);
                    rest = "";
                }
            }
        } else if let Some(body) = tail.strip_prefix("${") {
            match body.find('}') {
                Some(end) => {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Variable(body[..end].trim().to_string()));
                    rest = &body[end + 1..];
                }
                None => {
                    // Unterminated reference is kept as text
                    literal.push_str(tail);
                    rest = "";
                }
            }
        } else {
            // Lone `$`, e.g. `$HOME` for the shell
            literal.push('$');
            rest = &tail[1..];
        }
    }

    literal.push_str(rest);
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }

    segments
}

/// Named values available to command templates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variables {
    values: BTreeMap<String, String>,
}

impl Variables {
    /// Create an empty variable set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Look up a variable.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Iterate over variables in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Resolve all variables in an interpolated string.
///
/// # Arguments
///
/// * `input` - The template to render
/// * `vars` - Values for every `${name}` the template references
///
/// # Returns
///
/// The rendered command line.
///
/// # Errors
///
/// Returns `ConfigValidationError` if any variable is not defined.
pub fn resolve_string(input: &str, vars: &Variables) -> Result<String> {
    let mut result = String::with_capacity(input.len());

    for segment in parse_interpolation(input) {
        match segment {
            Segment::Literal(text) => result.push_str(&text),
            Segment::Variable(name) => {
                let value = vars
                    .get(&name)
                    .ok_or_else(|| KilnError::ConfigValidationError {
                        message: format!("Unresolved variable: ${{{}}} in '{}'", name, input),
                    })?;
                result.push_str(value);
            }
        }
    }

    Ok(result)
}
