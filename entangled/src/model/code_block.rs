//! Code block representation.

use std::path::PathBuf;

use super::reference_id::ReferenceId;
use super::reference_name::ReferenceName;
use crate::text_location::TextLocation;

/// A code block extracted from a markdown document.
///
/// `source` is the interior text with the fence indentation stripped and
/// every line keeping its newline. The opening fence, the verbatim
/// interior and the closing fence are kept as read so an unmodified
/// document can be reconstructed byte-exactly by the stitcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// Unique identifier for this code block instance.
    pub id: ReferenceId,

    /// The language identifier (e.g., "python", "rust").
    pub language: Option<String>,

    /// Additional classes from the code fence.
    pub classes: Vec<String>,

    /// Free attributes from the code fence.
    pub attributes: Vec<(String, String)>,

    /// Target output file, if declared with `file=`.
    pub target: Option<PathBuf>,

    /// Indentation-normalised source content.
    pub source: String,

    /// Location of the opening fence in the source document.
    pub location: TextLocation,

    /// Indentation of the code fence in the markdown.
    pub indent: String,

    /// Verbatim opening fence line.
    pub open_fence: String,

    /// Verbatim interior text, exactly as read.
    pub raw: String,

    /// Verbatim closing fence line.
    pub close_fence: String,
}

impl CodeBlock {
    /// Creates a new CodeBlock with empty fence metadata.
    pub fn new(
        id: ReferenceId,
        language: Option<String>,
        source: String,
        location: TextLocation,
    ) -> Self {
        let raw = source.clone();
        Self {
            id,
            language,
            classes: Vec::new(),
            attributes: Vec::new(),
            target: None,
            source,
            location,
            indent: String::new(),
            open_fence: String::new(),
            raw,
            close_fence: String::new(),
        }
    }

    /// Returns the reference name for this block.
    pub fn name(&self) -> &ReferenceName {
        &self.id.name
    }

    /// Returns true if this block seeds a target file.
    pub fn is_init(&self) -> bool {
        self.target.is_some()
    }

    /// Sets the target file.
    pub fn with_target(mut self, target: PathBuf) -> Self {
        self.target = Some(target);
        self
    }

    /// Gets an attribute value by key.
    pub fn get_attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Renders the block back into markdown with `content` as interior.
    ///
    /// Non-blank content lines receive the fence indentation; blank lines
    /// are kept bare, mirroring the tangler.
    pub fn render_with(&self, content: &str) -> String {
        let mut out = String::with_capacity(
            self.open_fence.len() + content.len() + self.close_fence.len() + 16,
        );
        out.push_str(&self.open_fence);
        for line in split_inclusive(content) {
            if line.trim().is_empty() {
                out.push_str(line);
            } else {
                out.push_str(&self.indent);
                out.push_str(line);
            }
        }
        out.push_str(&self.close_fence);
        out
    }

    /// Renders the block verbatim, as it appeared in the source document.
    pub fn render_verbatim(&self) -> String {
        format!("{}{}{}", self.open_fence, self.raw, self.close_fence)
    }
}

/// Splits text into lines, each keeping its trailing newline.
pub fn split_inclusive(text: &str) -> impl Iterator<Item = &str> {
    text.split_inclusive('\n')
}
