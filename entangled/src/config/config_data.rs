//! Configuration data structures.

use serde::{Deserialize, Serialize};

use super::annotation_method::AnnotationMethod;
use super::language::Language;

/// Full configuration for an Entangled project.
///
/// A `Config` is always complete; partial settings (from files or from
/// per-document YAML headers) are expressed as [`super::ConfigUpdate`]
/// values and folded in with `merge`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Version of the tool this configuration targets.
    #[serde(default = "default_version")]
    pub version: String,

    /// Glob patterns selecting input markdown files.
    #[serde(default = "default_watch_list")]
    pub watch_list: Vec<String>,

    /// Glob patterns excluded from the watch list.
    #[serde(default)]
    pub ignore_list: Vec<String>,

    /// How to annotate tangled output.
    #[serde(default)]
    pub annotation: AnnotationMethod,

    /// Names of hooks to run after tangling.
    #[serde(default)]
    pub hooks: Vec<String>,

    /// Language configurations, overriding built-ins by name.
    #[serde(default)]
    pub languages: Vec<Language>,
}

fn default_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_watch_list() -> Vec<String> {
    vec!["**/*.md".to_string()]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            watch_list: default_watch_list(),
            ignore_list: Vec::new(),
            annotation: AnnotationMethod::default(),
            hooks: Vec::new(),
            languages: Vec::new(),
        }
    }
}

impl Config {
    /// Looks up a language by fence identifier, configured languages first.
    pub fn find_language(&self, identifier: &str) -> Option<Language> {
        if let Some(lang) = self.languages.iter().find(|l| l.matches(identifier)) {
            return Some(lang.clone());
        }
        super::templates::find_language(identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::language::Comment;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.watch_list, vec!["**/*.md"]);
        assert_eq!(config.annotation, AnnotationMethod::Standard);
        assert!(config.hooks.is_empty());
    }

    #[test]
    fn test_find_language_builtin() {
        let config = Config::default();
        assert_eq!(config.find_language("python").unwrap().name, "Python");
    }

    #[test]
    fn test_find_language_custom_overrides() {
        let mut config = Config::default();
        config.languages.push(
            Language::new("Kernel", Comment::line(";")).with_identifiers(&["kernel", "python"]),
        );

        assert_eq!(config.find_language("kernel").unwrap().name, "Kernel");
        // Configured identifiers shadow built-ins
        assert_eq!(config.find_language("python").unwrap().name, "Kernel");
    }
}
