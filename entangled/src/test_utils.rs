//! Shared test utilities.

use std::path::PathBuf;

use crate::model::{CodeBlock, Ordinal, ReferenceId, ReferenceName};
use crate::text_location::TextLocation;

/// Creates a test code block with the given name and source.
pub fn make_block(name: &str, source: &str) -> CodeBlock {
    CodeBlock::new(
        ReferenceId::new(ReferenceName::from_str(name), "test.md", Ordinal::Count(0)),
        Some("python".to_string()),
        source.to_string(),
        TextLocation::new("test.md", 1),
    )
}

/// Creates a test code block that seeds a target file.
pub fn make_block_with_target(name: &str, source: &str, target: &str) -> CodeBlock {
    make_block(name, source).with_target(PathBuf::from(target))
}
