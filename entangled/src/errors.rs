//! Error types for the Entangled system.

use std::path::PathBuf;
use thiserror::Error;

use crate::model::ReferenceName;
use crate::text_location::TextLocation;

/// Main error type for Entangled operations.
#[derive(Error, Debug)]
pub enum EntangledError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Glob pattern error: {0}")]
    GlobPattern(#[from] glob::PatternError),

    #[error("Parse error at {location}: {message}")]
    Parse {
        location: TextLocation,
        message: String,
    },

    #[error("Indentation error at {location}")]
    Indentation { location: TextLocation },

    #[error("Undefined reference `{name}` at {location}")]
    UndefinedReference {
        name: ReferenceName,
        location: TextLocation,
    },

    #[error("Cycle detected in references: {0:?}")]
    CycleDetected(Vec<ReferenceName>),

    #[error("File conflict: `{path}` was modified outside of Entangled (use --force to overwrite)")]
    Conflict { path: PathBuf },

    #[error("{message}\n{hint}")]
    Helpful { message: String, hint: String },

    #[error("Watch error: {0}")]
    Watch(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl EntangledError {
    /// Builds a parse error at a location.
    pub fn parse(location: TextLocation, message: impl Into<String>) -> Self {
        Self::Parse {
            location,
            message: message.into(),
        }
    }

    /// Builds a user error with a remediation hint.
    pub fn helpful(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::Helpful {
            message: message.into(),
            hint: hint.into(),
        }
    }

    /// Returns a distinct exit code for this error category.
    ///
    /// - 1: file conflict (user can retry with `--force`)
    /// - 2: configuration error
    /// - 3: I/O error
    /// - 4: reference error (undefined, cycle)
    /// - 5: parse / internal error
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Conflict { .. } => 1,
            Self::TomlParse(_)
            | Self::YamlParse(_)
            | Self::JsonParse(_)
            | Self::GlobPattern(_)
            | Self::Helpful { .. } => 2,
            Self::Io(_) | Self::Watch(_) => 3,
            Self::UndefinedReference { .. } | Self::CycleDetected(_) => 4,
            Self::Parse { .. } | Self::Indentation { .. } | Self::Internal(_) => 5,
        }
    }
}

/// Result type alias for Entangled operations.
pub type Result<T> = std::result::Result<T, EntangledError>;
