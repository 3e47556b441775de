//! Partial configuration overlays.

use serde::{Deserialize, Serialize};

use super::annotation_method::AnnotationMethod;
use super::config_data::Config;
use super::language::Language;

/// A partial configuration carrying only explicitly-set fields.
///
/// Decoded from `entangled.toml`, from `[tool.entangled]` in
/// `pyproject.toml`, or from a document's YAML header. Unknown fields are
/// rejected so typos surface instead of being silently dropped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigUpdate {
    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub watch_list: Option<Vec<String>>,

    #[serde(default)]
    pub ignore_list: Option<Vec<String>>,

    #[serde(default)]
    pub annotation: Option<AnnotationMethod>,

    #[serde(default)]
    pub hooks: Option<Vec<String>>,

    #[serde(default)]
    pub languages: Option<Vec<Language>>,
}

impl ConfigUpdate {
    /// Folds this update over a base configuration.
    ///
    /// Scalar fields replace the base; languages are merged, an update
    /// language replacing any base language of the same name.
    pub fn merge(self, base: &Config) -> Config {
        Config {
            version: self.version.unwrap_or_else(|| base.version.clone()),
            watch_list: self.watch_list.unwrap_or_else(|| base.watch_list.clone()),
            ignore_list: self.ignore_list.unwrap_or_else(|| base.ignore_list.clone()),
            annotation: self.annotation.unwrap_or(base.annotation),
            hooks: self.hooks.unwrap_or_else(|| base.hooks.clone()),
            languages: merge_languages(&base.languages, self.languages.as_deref().unwrap_or(&[])),
        }
    }
}

fn merge_languages(base: &[Language], update: &[Language]) -> Vec<Language> {
    let mut result = base.to_vec();
    for lang in update {
        result.retain(|l| l.name != lang.name);
        result.push(lang.clone());
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::language::Comment;

    #[test]
    fn test_empty_update_is_identity() {
        let base = Config::default();
        let merged = ConfigUpdate::default().merge(&base);
        assert_eq!(merged.watch_list, base.watch_list);
        assert_eq!(merged.annotation, base.annotation);
    }

    #[test]
    fn test_partial_update() {
        let base = Config::default();
        let update = ConfigUpdate {
            annotation: Some(AnnotationMethod::Naked),
            ..Default::default()
        };
        let merged = update.merge(&base);

        assert_eq!(merged.annotation, AnnotationMethod::Naked);
        assert_eq!(merged.watch_list, base.watch_list);
    }

    #[test]
    fn test_merge_languages_by_name() {
        let mut base = Config::default();
        base.languages.push(Language::new("Python", Comment::line("#")));

        let update = ConfigUpdate {
            languages: Some(vec![
                Language::new("Python", Comment::line("##")),
                Language::new("Kernel", Comment::line(";")),
            ]),
            ..Default::default()
        };
        let merged = update.merge(&base);

        assert_eq!(merged.languages.len(), 2);
        let python = merged.languages.iter().find(|l| l.name == "Python").unwrap();
        assert_eq!(python.comment, Comment::line("##"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<ConfigUpdate, _> = toml::from_str("no_such_field = 1");
        assert!(result.is_err());
    }
}
