//! Configuration loading and management.
//!
//! Configuration is read from `./entangled.toml`, or from the
//! `[tool.entangled]` table of `./pyproject.toml`. Per-document overrides
//! come from YAML headers and are folded in by the markdown reader.

mod annotation_method;
mod config_data;
mod config_update;
mod language;
mod markers;
mod templates;

use std::path::{Path, PathBuf};

pub use annotation_method::AnnotationMethod;
pub use config_data::Config;
pub use config_update::ConfigUpdate;
pub use language::{Comment, Language};
pub use markers::{annotation_begin, annotation_end, ANNOTATION_PREFIX, REF_PATTERN};
pub use templates::find_language;

use crate::errors::{EntangledError, Result};
use crate::io::FileCache;

/// Project configuration file.
pub const CONFIG_PATH: &str = "entangled.toml";
/// Fallback carrying configuration in its `[tool.entangled]` table.
pub const PYPROJECT_PATH: &str = "pyproject.toml";

/// Reads a configuration update from a TOML file, optionally from a
/// dotted section like `tool.entangled`.
pub fn read_config_from_toml(
    fs: &dyn FileCache,
    path: &Path,
    section: Option<&str>,
) -> Result<Option<ConfigUpdate>> {
    if !fs.exists(path) {
        return Ok(None);
    }
    let content = fs.read(path)?;
    let mut table: toml::Value = toml::from_str(&content)
        .map_err(|e| EntangledError::helpful(
            format!("Could not read config `{}`: {}", path.display(), e),
            "Check the TOML syntax.".to_string(),
        ))?;

    if let Some(section) = section {
        for key in section.split('.') {
            match table.get(key) {
                Some(inner) => table = inner.clone(),
                None => {
                    tracing::debug!(
                        "config file {} has no section {}",
                        path.display(),
                        section
                    );
                    return Ok(None);
                }
            }
        }
    }

    let update: ConfigUpdate = table.try_into().map_err(|e| {
        EntangledError::helpful(
            format!("Could not read config `{}`: {}", path.display(), e),
            "Remove unknown fields or consult the configuration reference.".to_string(),
        )
    })?;

    if update.version.is_none() {
        return Err(EntangledError::helpful(
            format!("Config `{}` does not set `version`.", path.display()),
            "Add a `version = \"...\"` entry.".to_string(),
        ));
    }

    tracing::debug!("read config from `{}`", path.display());
    Ok(Some(update))
}

/// Reads configuration from the hard-coded project locations.
///
/// Returns `None` when neither file exists; fold the result over
/// `Config::default()` to obtain the full configuration.
pub fn read_config(fs: &dyn FileCache) -> Result<Option<ConfigUpdate>> {
    if fs.exists(Path::new(CONFIG_PATH)) {
        return read_config_from_toml(fs, Path::new(CONFIG_PATH), None);
    }
    if fs.exists(Path::new(PYPROJECT_PATH)) {
        return read_config_from_toml(fs, Path::new(PYPROJECT_PATH), Some("tool.entangled"));
    }
    Ok(None)
}

/// Resolves the sorted list of input markdown files for a project.
pub fn get_input_files(fs: &dyn FileCache, config: &Config) -> Result<Vec<PathBuf>> {
    tracing::debug!(
        "watch list: {:?}; ignoring: {:?}",
        config.watch_list,
        config.ignore_list
    );

    let mut ignore = Vec::new();
    for pattern in &config.ignore_list {
        ignore.push(glob::Pattern::new(pattern)?);
    }

    let mut files = Vec::new();
    for pattern in &config.watch_list {
        for path in fs.glob(pattern)? {
            if !ignore.iter().any(|p| p.matches_path(&path)) {
                files.push(path);
            }
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}
