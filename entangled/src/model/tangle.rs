//! Tangle algorithm: noweb reference expansion with annotation markers.

use std::collections::HashSet;
use std::path::Path;

use crate::config::{annotation_begin, annotation_end, Comment, REF_PATTERN};
use crate::errors::{EntangledError, Result};

use super::code_block::{split_inclusive, CodeBlock};
use super::reference_map::ReferenceMap;
use super::reference_name::ReferenceName;

/// Guards reference expansion against infinite recursion.
#[derive(Debug, Clone, Default)]
pub struct CycleDetector {
    stack: Vec<ReferenceName>,
    seen: HashSet<ReferenceName>,
}

impl CycleDetector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enters a reference; fails when it is already on the stack.
    pub fn enter(&mut self, name: &ReferenceName) -> Result<()> {
        if self.seen.contains(name) {
            let mut cycle = self.stack.clone();
            cycle.push(name.clone());
            return Err(EntangledError::CycleDetected(cycle));
        }
        self.seen.insert(name.clone());
        self.stack.push(name.clone());
        Ok(())
    }

    /// Exits the most recently entered reference.
    pub fn exit(&mut self) {
        if let Some(name) = self.stack.pop() {
            self.seen.remove(&name);
        }
    }
}

/// Produces the text of a target file from its init block.
///
/// The init block's body is the file body; with a comment style given,
/// every expanded named block is bracketed in begin/end markers. With
/// `None`, no markers are emitted and stitching back becomes lossy.
pub fn tangle_target(
    refs: &ReferenceMap,
    target: &Path,
    comment: Option<&Comment>,
) -> Result<String> {
    let init = refs.target_init(target).ok_or_else(|| {
        EntangledError::Internal(format!(
            "no init block registered for target `{}`",
            target.display()
        ))
    })?;

    let mut out = String::new();
    let mut detector = CycleDetector::new();
    detector.enter(init.name())?;
    expand_into(&mut out, refs, init, "", comment, &mut detector)?;
    detector.exit();
    Ok(out)
}

/// Resolves a reference as written against the enclosing namespace.
///
/// Undotted names are looked up in the enclosing block's namespace first,
/// then at the root; dotted names are absolute.
fn resolve(refs: &ReferenceMap, raw: &str, enclosing: &[String]) -> ReferenceName {
    let parsed = ReferenceName::from_str(raw);
    if parsed.namespace().is_empty() && !enclosing.is_empty() {
        let relative = ReferenceName::new(enclosing.to_vec(), raw);
        if refs.contains_name(&relative) {
            return relative;
        }
    }
    parsed
}

fn expand_into(
    out: &mut String,
    refs: &ReferenceMap,
    block: &CodeBlock,
    indent: &str,
    comment: Option<&Comment>,
    detector: &mut CycleDetector,
) -> Result<()> {
    for (offset, line) in split_inclusive(&block.source).enumerate() {
        let Some(caps) = REF_PATTERN.captures(line) else {
            if line.trim().is_empty() {
                out.push_str(line);
            } else {
                out.push_str(indent);
                out.push_str(line);
            }
            continue;
        };

        let name = resolve(refs, &caps["refname"], block.name().namespace());
        let combined = format!("{}{}", indent, &caps["indent"]);

        let expansion = refs.get_by_name(&name);
        if expansion.is_empty() {
            return Err(EntangledError::UndefinedReference {
                name,
                location: block.location.offset(offset + 1),
            });
        }

        detector.enter(&name)?;
        for sub in expansion {
            if let Some(c) = comment {
                out.push_str(&combined);
                out.push_str(&annotation_begin(c, &sub.id));
                out.push('\n');
            }
            expand_into(out, refs, sub, &combined, comment, detector)?;
            if let Some(c) = comment {
                out.push_str(&combined);
                out.push_str(&annotation_end(c));
                out.push('\n');
            }
        }
        detector.exit();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{make_block, make_block_with_target};
    use std::path::PathBuf;

    fn map_with_target(blocks: Vec<crate::model::CodeBlock>) -> ReferenceMap {
        let mut refs = ReferenceMap::new();
        for block in blocks {
            refs.insert(block).unwrap();
        }
        refs
    }

    #[test]
    fn test_tangle_plain_body() {
        let refs = map_with_target(vec![make_block_with_target(
            "main",
            "print('hello')\nprint('world')\n",
            "out.py",
        )]);

        let result = tangle_target(&refs, &PathBuf::from("out.py"), None).unwrap();
        assert_eq!(result, "print('hello')\nprint('world')\n");
    }

    #[test]
    fn test_tangle_expands_reference_with_indent() {
        let refs = map_with_target(vec![
            make_block_with_target("main", "def main():\n    <<body>>\n", "out.py"),
            make_block("body", "print('hello')\n"),
        ]);

        let result = tangle_target(&refs, &PathBuf::from("out.py"), None).unwrap();
        assert_eq!(result, "def main():\n    print('hello')\n");
    }

    #[test]
    fn test_tangle_nested_indentation_composes() {
        let refs = map_with_target(vec![
            make_block_with_target("main", "if a:\n    <<inner>>\n", "out.py"),
            make_block("inner", "if b:\n    <<deepest>>\n"),
            make_block("deepest", "print('deep')\n"),
        ]);

        let result = tangle_target(&refs, &PathBuf::from("out.py"), None).unwrap();
        assert_eq!(result, "if a:\n    if b:\n        print('deep')\n");
    }

    #[test]
    fn test_tangle_annotated_markers() {
        let refs = map_with_target(vec![
            make_block_with_target("main", "<<greeting>>\n", "hi.txt"),
            make_block("greeting", "Hello\n"),
            make_block("greeting", "Goodbye\n"),
        ]);

        let comment = Comment::line("#");
        let result = tangle_target(&refs, &PathBuf::from("hi.txt"), Some(&comment)).unwrap();
        assert_eq!(
            result,
            "# ~/~ begin <<test.md#greeting>>[0]\n\
             Hello\n\
             # ~/~ end\n\
             # ~/~ begin <<test.md#greeting>>[1]\n\
             Goodbye\n\
             # ~/~ end\n"
        );
    }

    #[test]
    fn test_tangle_annotated_nested_markers_indented() {
        let refs = map_with_target(vec![
            make_block_with_target("main", "def main():\n    <<body>>\n", "out.py"),
            make_block("body", "pass\n"),
        ]);

        let comment = Comment::line("#");
        let result = tangle_target(&refs, &PathBuf::from("out.py"), Some(&comment)).unwrap();
        assert_eq!(
            result,
            "def main():\n    # ~/~ begin <<test.md#body>>[0]\n    pass\n    # ~/~ end\n"
        );
    }

    #[test]
    fn test_blank_lines_not_indented() {
        let refs = map_with_target(vec![
            make_block_with_target("main", "    <<body>>\n", "out.py"),
            make_block("body", "a\n\nb\n"),
        ]);

        let result = tangle_target(&refs, &PathBuf::from("out.py"), None).unwrap();
        assert_eq!(result, "    a\n\n    b\n");
    }

    #[test]
    fn test_relative_reference_resolution() {
        let refs = map_with_target(vec![
            make_block_with_target("main", "<<kernel.boot>>\n", "out.scm"),
            make_block("kernel.boot", "<<init>>\n"),
            make_block("kernel.init", "(init)\n"),
        ]);

        let result = tangle_target(&refs, &PathBuf::from("out.scm"), None).unwrap();
        assert_eq!(result, "(init)\n");
    }

    #[test]
    fn test_undefined_reference() {
        let refs = map_with_target(vec![make_block_with_target(
            "main",
            "<<missing>>\n",
            "out.py",
        )]);

        let err = tangle_target(&refs, &PathBuf::from("out.py"), None).unwrap_err();
        match err {
            EntangledError::UndefinedReference { name, location } => {
                assert_eq!(format!("{}", name), "missing");
                assert_eq!(location.line, 2);
            }
            other => panic!("expected undefined reference, got {:?}", other),
        }
    }

    #[test]
    fn test_cycle_detected() {
        let refs = map_with_target(vec![
            make_block_with_target("main", "<<a>>\n", "out.py"),
            make_block("a", "<<b>>\n"),
            make_block("b", "<<a>>\n"),
        ]);

        let err = tangle_target(&refs, &PathBuf::from("out.py"), None).unwrap_err();
        assert!(matches!(err, EntangledError::CycleDetected(_)));
    }

    #[test]
    fn test_literal_angle_brackets_untouched() {
        let refs = map_with_target(vec![make_block_with_target(
            "main",
            "x = y << 2\ncout << \"hi\";\n",
            "out.cpp",
        )]);

        let result = tangle_target(&refs, &PathBuf::from("out.cpp"), None).unwrap();
        assert_eq!(result, "x = y << 2\ncout << \"hi\";\n");
    }
}
