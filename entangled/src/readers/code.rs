//! Back-reader for tangled files.
//!
//! Parses a previously tangled file by its annotation markers and
//! extracts the edited block contents for stitching. The patterns here
//! are the authoritative annotation grammar; the tangler must emit
//! markers these patterns accept.

use std::path::PathBuf;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{EntangledError, Result};
use crate::input_stream::InputStream;
use crate::model::{Ordinal, ReferenceId, ReferenceName};

/// Pattern for begin markers, e.g. `# ~/~ begin <<docs/hi.md#greeting>>[0]`.
static OPEN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<indent>\s*).* ~/~ begin <<(?P<source>[^#<>]+)#(?P<ref_name>[^#<>]+)>>\[(?P<ord>\d+|init)\]",
    )
    .unwrap()
});

/// Pattern for end markers, e.g. `# ~/~ end`.
static CLOSE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<indent>\s*).* ~/~ end").unwrap());

/// A block recovered from a tangled file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBlock {
    /// Identity parsed from the begin marker.
    pub ref_id: ReferenceId,
    /// Block content with the marker indentation stripped.
    pub content: String,
}

#[derive(Debug)]
struct OpenMarker {
    ref_id: ReferenceId,
    indent: String,
}

fn open_marker(line: &str) -> Option<OpenMarker> {
    let caps = OPEN_PATTERN.captures(line)?;
    let ordinal = Ordinal::parse(&caps["ord"])?;
    Some(OpenMarker {
        ref_id: ReferenceId::new(
            ReferenceName::from_str(&caps["ref_name"]),
            PathBuf::from(&caps["source"]),
            ordinal,
        ),
        indent: caps["indent"].to_string(),
    })
}

fn close_marker(line: &str) -> Option<String> {
    // Begin markers also contain " ~/~ ", so rule them out first.
    if OPEN_PATTERN.is_match(line) {
        return None;
    }
    CLOSE_PATTERN
        .captures(line)
        .map(|caps| caps["indent"].to_string())
}

/// Reads every annotated block of a tangled file.
///
/// Lines outside any marker pair are target-file headers or trailers and
/// are discarded; they have no markdown counterpart.
pub fn read_code(input: &mut InputStream) -> Result<Vec<RawBlock>> {
    let mut blocks = Vec::new();
    while !input.is_done() {
        if read_block(&[], "", input, &mut blocks)?.is_none() {
            input.next();
        }
    }
    Ok(blocks)
}

/// Reads one annotated block (recursively) from the stream.
///
/// Returns `None` when the stream does not sit on a begin marker.
/// Otherwise returns the text that stands in for this block in its
/// parent: an indented `<<ref>>` placeholder for the first block of a
/// name, nothing for continuation blocks.
fn read_block(
    namespace: &[String],
    indent: &str,
    input: &mut InputStream,
    blocks: &mut Vec<RawBlock>,
) -> Result<Option<String>> {
    let Some((pos, line)) = input.peek().cloned() else {
        return Ok(None);
    };
    let Some(marker) = open_marker(line) else {
        return Ok(None);
    };
    input.next();

    tracing::debug!("reading code block {}", marker.ref_id);

    if marker.indent.len() < indent.len() {
        return Err(EntangledError::Indentation { location: pos });
    }

    let mut content = String::new();
    loop {
        if let Some(replacement) =
            read_block(marker.ref_id.name.namespace(), &marker.indent, input, blocks)?
        {
            content.push_str(&replacement);
            continue;
        }

        let Some((pos, line)) = input.next() else {
            return Err(EntangledError::parse(
                input.last_location(),
                "unexpected end of file inside annotated block",
            ));
        };

        match close_marker(line) {
            None => {
                if line.trim().is_empty() {
                    content.push_str(line.trim_start_matches([' ', '\t']));
                } else if let Some(stripped) = line.strip_prefix(marker.indent.as_str()) {
                    content.push_str(stripped);
                } else {
                    return Err(EntangledError::Indentation { location: pos });
                }
            }
            Some(close_indent) => {
                if close_indent != marker.indent {
                    return Err(EntangledError::Indentation { location: pos });
                }

                let ref_id = marker.ref_id;
                let is_first = ref_id.ordinal.is_first();
                let name = ref_id.name.clone();
                blocks.push(RawBlock {
                    ref_id,
                    content,
                });

                // The first block of a name stands for the whole noweb
                // reference; continuations are already covered by it.
                if is_first {
                    let extra_indent = marker
                        .indent
                        .strip_prefix(indent)
                        .unwrap_or("")
                        .to_string();
                    let ref_str = if name.namespace() == namespace {
                        name.name().to_string()
                    } else {
                        format!("{}", name)
                    };
                    return Ok(Some(format!("{}<<{}>>\n", extra_indent, ref_str)));
                }
                return Ok(Some(String::new()));
            }
        }
    }
}
