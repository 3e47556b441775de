//! Language configuration for code blocks.

use serde::{Deserialize, Serialize};

/// Comment delimiters for a language.
///
/// `close` is absent for line comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Comment opener, e.g. `//` or `#`.
    pub open: String,
    /// Comment closer for block-comment-only languages, e.g. `-->`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close: Option<String>,
}

impl Comment {
    /// Creates a line comment style.
    pub fn line(open: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: None,
        }
    }

    /// Creates a block comment style.
    pub fn block(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: Some(close.into()),
        }
    }
}

impl Default for Comment {
    fn default() -> Self {
        Comment::line("#")
    }
}

/// Language configuration: display name, fence identifiers, comment style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    /// Language name, e.g. "Python".
    pub name: String,

    /// Identifiers matching this language in fence info strings.
    #[serde(default)]
    pub identifiers: Vec<String>,

    /// Comment style used for annotation markers.
    pub comment: Comment,
}

impl Language {
    /// Creates a new Language configuration.
    pub fn new(name: impl Into<String>, comment: Comment) -> Self {
        Self {
            name: name.into(),
            identifiers: Vec::new(),
            comment,
        }
    }

    /// Adds fence identifiers.
    pub fn with_identifiers(mut self, identifiers: &[&str]) -> Self {
        self.identifiers = identifiers.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Checks whether a fence identifier selects this language.
    pub fn matches(&self, identifier: &str) -> bool {
        self.name.eq_ignore_ascii_case(identifier)
            || self.identifiers.iter().any(|id| id == identifier)
    }
}
