//! Annotation markers for tangled code.
//!
//! The marker grammar is fixed so databases and tangled files are stable
//! across runs; only the comment delimiters vary per language. The
//! back-reader's patterns in `readers::code` are the authoritative
//! grammar.

use once_cell::sync::Lazy;
use regex::Regex;

use super::language::Comment;
use crate::model::ReferenceId;

/// Sigil distinguishing Entangled markers from ordinary comments.
pub const ANNOTATION_PREFIX: &str = "~/~";

/// Pattern for noweb reference lines: optional indentation around a line
/// whose trimmed form is exactly `<<name>>`. Other uses of `<<` are
/// literal.
pub static REF_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<indent>[ \t]*)<<(?P<refname>[^\s<>]+)>>\s*$").unwrap());

/// Formats a begin marker for a block.
pub fn annotation_begin(comment: &Comment, id: &ReferenceId) -> String {
    format!(
        "{} {} begin <<{}#{}>>[{}]{}",
        comment.open,
        ANNOTATION_PREFIX,
        id.source.display(),
        id.name,
        id.ordinal,
        comment_tail(comment),
    )
}

/// Formats an end marker.
pub fn annotation_end(comment: &Comment) -> String {
    format!(
        "{} {} end{}",
        comment.open,
        ANNOTATION_PREFIX,
        comment_tail(comment)
    )
}

fn comment_tail(comment: &Comment) -> String {
    match &comment.close {
        Some(close) => format!(" {}", close),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Ordinal, ReferenceName};

    fn sample_id(ordinal: Ordinal) -> ReferenceId {
        ReferenceId::new(ReferenceName::from_str("greeting"), "docs/hi.md", ordinal)
    }

    #[test]
    fn test_annotation_begin_line_comment() {
        let comment = Comment::line("#");
        assert_eq!(
            annotation_begin(&comment, &sample_id(Ordinal::Count(0))),
            "# ~/~ begin <<docs/hi.md#greeting>>[0]"
        );
    }

    #[test]
    fn test_annotation_begin_init() {
        let comment = Comment::line("//");
        assert_eq!(
            annotation_begin(&comment, &sample_id(Ordinal::Init)),
            "// ~/~ begin <<docs/hi.md#greeting>>[init]"
        );
    }

    #[test]
    fn test_annotation_with_block_comment() {
        let comment = Comment::block("/*", "*/");
        assert_eq!(
            annotation_begin(&comment, &sample_id(Ordinal::Count(1))),
            "/* ~/~ begin <<docs/hi.md#greeting>>[1] */"
        );
        assert_eq!(annotation_end(&comment), "/* ~/~ end */");
    }

    #[test]
    fn test_annotation_end() {
        assert_eq!(annotation_end(&Comment::line("#")), "# ~/~ end");
    }

    #[test]
    fn test_ref_pattern() {
        let caps = REF_PATTERN.captures("    <<some-ref>>\n").unwrap();
        assert_eq!(&caps["indent"], "    ");
        assert_eq!(&caps["refname"], "some-ref");

        let caps = REF_PATTERN.captures("<<kernel.init>>").unwrap();
        assert_eq!(&caps["indent"], "");
        assert_eq!(&caps["refname"], "kernel.init");

        assert!(REF_PATTERN.captures("a << b").is_none());
        assert!(REF_PATTERN.captures("<<>>").is_none());
        assert!(REF_PATTERN.captures("x = y << 2 >> 1").is_none());
    }
}
