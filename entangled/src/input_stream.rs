//! Positioned line stream over a file's text.
//!
//! Readers consume an [`InputStream`], a peekable sequence of
//! `(TextLocation, line)` pairs. Lines keep their trailing newline; the
//! final line of a file need not end in one.

use std::path::Path;

use crate::text_location::TextLocation;

/// A peekable stream of located lines.
#[derive(Debug, Clone)]
pub struct InputStream<'a> {
    lines: Vec<(TextLocation, &'a str)>,
    pos: usize,
}

impl<'a> InputStream<'a> {
    /// Creates a stream over `text`, attributing lines to `filename`.
    pub fn new(filename: &Path, text: &'a str) -> Self {
        Self::starting_at(filename, text, 1)
    }

    /// Creates a stream whose first line carries number `first_line`.
    ///
    /// Used when a prefix of the file (the YAML header) has already been
    /// consumed.
    pub fn starting_at(filename: &Path, text: &'a str, first_line: usize) -> Self {
        let mut lines = Vec::new();
        let mut start = 0;
        let mut line_no = first_line;
        while let Some(nl) = text[start..].find('\n') {
            lines.push((
                TextLocation::new(filename, line_no),
                &text[start..start + nl + 1],
            ));
            start += nl + 1;
            line_no += 1;
        }
        if start < text.len() {
            lines.push((TextLocation::new(filename, line_no), &text[start..]));
        }
        Self { lines, pos: 0 }
    }

    /// Returns the next line without consuming it.
    pub fn peek(&self) -> Option<&(TextLocation, &'a str)> {
        self.lines.get(self.pos)
    }

    /// Consumes and returns the next line.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<(TextLocation, &'a str)> {
        let item = self.lines.get(self.pos).cloned();
        if item.is_some() {
            self.pos += 1;
        }
        item
    }

    /// Returns true if no lines remain.
    pub fn is_done(&self) -> bool {
        self.pos >= self.lines.len()
    }

    /// Location of the last consumed or current line, for end-of-input errors.
    pub fn last_location(&self) -> TextLocation {
        self.lines
            .get(self.pos.min(self.lines.len().saturating_sub(1)))
            .map(|(loc, _)| loc.clone())
            .unwrap_or_default()
    }
}
