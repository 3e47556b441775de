//! YAML frontmatter extraction.

use crate::config::ConfigUpdate;
use crate::errors::{EntangledError, Result};

/// A YAML header split off the front of a document.
#[derive(Debug, Clone)]
pub struct YamlHeader {
    /// The YAML content between the `---` fences.
    pub content: String,
    /// The verbatim header text, fences included.
    pub raw: String,
    /// Number of lines consumed, fences included.
    pub lines_consumed: usize,
}

/// Splits a leading YAML header (between `---` fences) off a document.
///
/// Returns the header and the remaining text. A document that opens with
/// `---` but never closes it is treated as having no header.
pub fn split_yaml_header(input: &str) -> (Option<YamlHeader>, &str) {
    let rest = match input.strip_prefix("---") {
        Some(rest) if rest.starts_with('\n') || rest.starts_with("\r\n") => rest,
        _ => return (None, input),
    };
    let Some(nl) = rest.find('\n') else {
        return (None, input);
    };
    let rest = &rest[nl + 1..];

    let mut content_end = 0;
    let mut lines = 1;
    let mut scan = rest;
    loop {
        let (line, remainder) = match scan.find('\n') {
            Some(nl) => (&scan[..nl + 1], &scan[nl + 1..]),
            None => (scan, ""),
        };
        if line.is_empty() {
            return (None, input);
        }
        lines += 1;
        if line.trim_end() == "---" {
            let consumed = input.len() - remainder.len();
            return (
                Some(YamlHeader {
                    content: rest[..content_end].to_string(),
                    raw: input[..consumed].to_string(),
                    lines_consumed: lines,
                }),
                remainder,
            );
        }
        content_end += line.len();
        scan = remainder;
    }
}

/// Extracts the `entangled:` section of a YAML header as a config update.
///
/// Headers without that section yield `None`; a malformed section is a
/// user error rather than being silently ignored.
pub fn get_config_update(header: &YamlHeader) -> Result<Option<ConfigUpdate>> {
    let value: serde_yaml::Value = serde_yaml::from_str(&header.content)?;
    let Some(section) = value.get("entangled") else {
        return Ok(None);
    };
    let update: ConfigUpdate = serde_yaml::from_value(section.clone()).map_err(|e| {
        EntangledError::helpful(
            format!("Invalid `entangled` section in YAML header: {}", e),
            "Remove unknown fields or consult the configuration reference.".to_string(),
        )
    })?;
    Ok(Some(update))
}
