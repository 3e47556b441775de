//! Annotation method configuration.

use serde::{Deserialize, Serialize};

/// How to annotate tangled output files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationMethod {
    /// No markers on block boundaries.
    None,

    /// Markers on every expanded named block.
    #[default]
    Standard,

    /// Plain output for publishing; stitching back is lossy.
    Naked,
}

impl AnnotationMethod {
    /// Returns true if this method emits markers.
    pub fn has_markers(&self) -> bool {
        matches!(self, AnnotationMethod::Standard)
    }
}
