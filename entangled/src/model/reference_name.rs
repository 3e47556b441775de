//! Reference names for code blocks.

use std::fmt;

/// A hierarchical reference name: a dotted namespace plus a leaf name.
///
/// `kernel.init` has namespace `["kernel"]` and leaf name `init`; plain
/// `main` has an empty namespace. Equality and hashing are structural over
/// both parts. Names derived from target paths (`file=src/hello.py`) go
/// through the same parser, so they round-trip losslessly through
/// `Display`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReferenceName {
    namespace: Vec<String>,
    name: String,
}

impl ReferenceName {
    /// Parses a dotted name string.
    pub fn from_str(s: &str) -> Self {
        let mut parts: Vec<String> = s.split('.').map(|p| p.to_string()).collect();
        let name = parts.pop().unwrap_or_default();
        Self {
            namespace: parts,
            name,
        }
    }

    /// Builds a name from explicit namespace and leaf parts.
    pub fn new(namespace: Vec<String>, name: impl Into<String>) -> Self {
        Self {
            namespace,
            name: name.into(),
        }
    }

    /// The namespace components.
    pub fn namespace(&self) -> &[String] {
        &self.namespace
    }

    /// The leaf name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ReferenceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.namespace {
            write!(f, "{}.", part)?;
        }
        write!(f, "{}", self.name)
    }
}

impl From<&str> for ReferenceName {
    fn from(s: &str) -> Self {
        Self::from_str(s)
    }
}
