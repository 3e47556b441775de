//! Markdown reader: tokenizes fenced code blocks into the reference map.
//!
//! The reader produces a token stream in which labelled blocks are
//! replaced by their reference IDs and everything else is kept verbatim,
//! so the stitcher can re-render a document byte-exactly.

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::ConfigUpdate;
use crate::errors::{EntangledError, Result};
use crate::input_stream::InputStream;
use crate::model::{split_inclusive, CodeBlock, Ordinal, Properties, ReferenceId, ReferenceMap, ReferenceName};
use crate::text_location::TextLocation;

use super::yaml_header::{get_config_update, split_yaml_header};

/// Pattern for code fence openings (backticks or tildes, three or more).
/// Lines keep their newline, so the info group stops at end of line.
static FENCE_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<indent>[ \t]*)(?P<fence>`{3,}|~{3,})(?P<info>[^\n]*)").unwrap());

/// One element of a parsed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocToken {
    /// Verbatim markdown text, emitted unchanged.
    Text(String),
    /// A labelled code block, owned by the reference map.
    Block(ReferenceId),
}

/// A parsed markdown document.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// Path of the source file.
    pub path: PathBuf,
    /// Token stream covering the whole document.
    pub tokens: Vec<DocToken>,
    /// Configuration override from the YAML header, if any.
    pub config_update: Option<ConfigUpdate>,
}

impl ParsedDocument {
    /// Renders the document, taking block contents from `refs`.
    ///
    /// Blocks whose content is unchanged reproduce their verbatim text;
    /// stitched blocks are re-rendered with the fence indentation applied.
    pub fn render(&self, refs: &ReferenceMap) -> String {
        let mut out = String::new();
        for token in &self.tokens {
            match token {
                DocToken::Text(text) => out.push_str(text),
                DocToken::Block(id) => {
                    let Some(block) = refs.get(id) else { continue };
                    if block.source == strip_indent(&block.raw, &block.indent) {
                        out.push_str(&block.render_verbatim());
                    } else {
                        out.push_str(&block.render_with(&block.source));
                    }
                }
            }
        }
        out
    }
}

/// Strips the fence indentation from interior lines.
///
/// Blank lines lose their leading whitespace; lines not starting with the
/// indent are kept as-is.
pub fn strip_indent(text: &str, indent: &str) -> String {
    if indent.is_empty() {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    for line in split_inclusive(text) {
        if let Some(stripped) = line.strip_prefix(indent) {
            out.push_str(stripped);
        } else if line.trim().is_empty() {
            out.push_str(line.trim_start_matches([' ', '\t']));
        } else {
            out.push_str(line);
        }
    }
    out
}

/// Parses a markdown document, inserting labelled blocks into `refs`.
///
/// Ordinals count blocks per name across every document inserted into the
/// same map, so one map must be shared across the whole project load.
pub fn parse_markdown(
    path: &Path,
    text: &str,
    refs: &mut ReferenceMap,
) -> Result<ParsedDocument> {
    let (header, rest) = split_yaml_header(text);
    let (mut pending, first_line, config_update) = match header {
        Some(header) => {
            let update = get_config_update(&header)?;
            (header.raw.clone(), header.lines_consumed + 1, update)
        }
        None => (String::new(), 1, None),
    };

    let mut tokens = Vec::new();
    let mut input = InputStream::starting_at(path, rest, first_line);

    while let Some((location, line)) = input.next() {
        let Some(caps) = FENCE_OPEN.captures(line) else {
            pending.push_str(line);
            continue;
        };

        let indent = caps["indent"].to_string();
        let fence = caps["fence"].to_string();
        let info = caps["info"].trim().to_string();
        let open_fence = line.to_string();

        let (raw, close_fence) = read_fenced_body(&mut input, &fence, &location)?;

        let props = Properties::parse(&info)
            .map_err(|message| EntangledError::parse(location.clone(), message))?;

        let name = match (props.id(), props.file()) {
            (Some(id), _) => ReferenceName::from_str(id),
            (None, Some(file)) => ReferenceName::from_str(file),
            (None, None) => {
                // Anonymous block: stays verbatim in the text stream.
                pending.push_str(&open_fence);
                pending.push_str(&raw);
                pending.push_str(&close_fence);
                continue;
            }
        };

        let block = build_block(name, &props, path, &location, &indent, open_fence, raw, close_fence);

        if !pending.is_empty() {
            tokens.push(DocToken::Text(std::mem::take(&mut pending)));
        }
        let id = refs.insert(block)?;
        tokens.push(DocToken::Block(id));
    }

    if !pending.is_empty() {
        tokens.push(DocToken::Text(pending));
    }

    Ok(ParsedDocument {
        path: path.to_path_buf(),
        tokens,
        config_update,
    })
}

/// Collects interior lines up to the matching closing fence.
fn read_fenced_body(
    input: &mut InputStream,
    fence: &str,
    open_location: &TextLocation,
) -> Result<(String, String)> {
    let fence_char = fence.chars().next().unwrap_or('`');
    let mut raw = String::new();

    while let Some((_, line)) = input.next() {
        let trimmed = line.trim();
        if trimmed.len() >= fence.len() && trimmed.chars().all(|c| c == fence_char) {
            return Ok((raw, line.to_string()));
        }
        raw.push_str(line);
    }

    Err(EntangledError::parse(
        open_location.clone(),
        "unclosed code fence",
    ))
}

/// Builds a `CodeBlock` from the fence properties of a labelled block.
#[allow(clippy::too_many_arguments)]
fn build_block(
    name: ReferenceName,
    props: &Properties,
    path: &Path,
    location: &TextLocation,
    indent: &str,
    open_fence: String,
    raw: String,
    close_fence: String,
) -> CodeBlock {
    let source = strip_indent(&raw, indent);

    // The ordinal is provisional; ReferenceMap::insert assigns the real one.
    let mut block = CodeBlock::new(
        ReferenceId::new(name, path, Ordinal::Count(0)),
        props.language().map(|s| s.to_string()),
        source,
        location.clone(),
    );
    block.indent = indent.to_string();
    block.open_fence = open_fence;
    block.raw = raw;
    block.close_fence = close_fence;
    block.classes = props.classes().iter().skip(1).map(|s| s.to_string()).collect();
    block.attributes = props
        .free_attributes()
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    if let Some(file) = props.file() {
        block.target = Some(PathBuf::from(file));
    }

    block
}
