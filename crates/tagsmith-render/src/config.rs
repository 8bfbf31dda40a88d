//! YAML configuration for transformers.
//!
//! ```yaml
//! newline: "<br />"
//! max_depth: 64
//! no_transform: [code, noparse]
//! builtin: true
//! template_dir: rules
//! templates:
//!   spoiler: '<details>{{ body }}</details>'
//! simple:
//!   user: '<a href="/u/${attribute}">${body}</a>'
//! ```
//!
//! Every field is optional. Rules are layered in order: built-in HTML rules,
//! then `template_dir`, then `templates`, then `simple`; a later layer
//! replaces same-named rules from an earlier one.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tagsmith_bbparser::{Parser, DEFAULT_MAX_DEPTH};

use crate::error::ConfigError;
use crate::template::RuleSet;
use crate::transformer::{Transformer, DEFAULT_NEWLINE};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransformerConfig {
    /// Replacement for `\n` in text.
    pub newline: String,
    /// Tag nesting limit for the parser.
    pub max_depth: usize,
    /// Tags whose content is kept verbatim and never transformed.
    pub no_transform: Vec<String>,
    /// Start from the built-in HTML rules.
    pub builtin: bool,
    /// Directory of template files, one rule per file.
    pub template_dir: Option<PathBuf>,
    /// Inline MiniJinja rules by tag name.
    pub templates: BTreeMap<String, String>,
    /// Inline `${variable}` rules by tag name.
    pub simple: BTreeMap<String, String>,
}

impl Default for TransformerConfig {
    fn default() -> Self {
        Self {
            newline: DEFAULT_NEWLINE.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
            no_transform: Vec::new(),
            builtin: true,
            template_dir: None,
            templates: BTreeMap::new(),
            simple: BTreeMap::new(),
        }
    }
}

impl TransformerConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes as null, not as an empty map
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Reads a config file. A relative `template_dir` is resolved against the
    /// file's directory.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_yaml(&yaml)?;

        if let (Some(dir), Some(base)) = (config.template_dir.as_mut(), path.parent()) {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
        log::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn build_rules(&self) -> Result<RuleSet, ConfigError> {
        let mut rules = if self.builtin {
            RuleSet::html().map_err(|source| ConfigError::Rule {
                name: "builtin".to_string(),
                source,
            })?
        } else {
            RuleSet::new()
        };

        if let Some(dir) = &self.template_dir {
            rules.extend_from_dir(dir)?;
        }

        for (name, source) in &self.templates {
            rules
                .add_template(name, source)
                .map_err(|source| ConfigError::Rule {
                    name: name.clone(),
                    source,
                })?;
        }
        for (name, source) in &self.simple {
            rules
                .add_simple(name, source)
                .map_err(|source| ConfigError::Rule {
                    name: name.clone(),
                    source,
                })?;
        }

        log::debug!("rule set ready: {:?}", rules.names());
        Ok(rules)
    }

    pub fn build_parser(&self) -> Parser {
        Parser::new()
            .with_max_depth(self.max_depth)
            .with_no_transform(self.no_transform.iter().cloned())
    }

    pub fn build_transformer(&self) -> Result<Transformer, ConfigError> {
        Ok(Transformer::new(self.build_rules()?).with_newline(self.newline.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = TransformerConfig::from_yaml("").unwrap();
        assert_eq!(config, TransformerConfig::default());
        assert_eq!(config.newline, "<br>");
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert!(config.builtin);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = TransformerConfig::from_yaml("newline: \"\\n\"\nno_transform: [code]\n").unwrap();
        assert_eq!(config.newline, "\n");
        assert_eq!(config.no_transform, ["code"]);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = TransformerConfig::from_yaml("newlines: x").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn test_layering() {
        let yaml = r#"
templates:
  b: "<b>{{ body }}</b>"
simple:
  b: "**${body}**"
  user: "@${attribute}"
"#;
        let config = TransformerConfig::from_yaml(yaml).unwrap();
        let transformer = config.build_transformer().unwrap();
        let doc = config.build_parser().parse("[b]x[/b] [user=ann][/user] [i]y[/i]");
        assert_eq!(
            transformer.transform_all(&doc).unwrap(),
            "**x** @ann <em>y</em>"
        );
    }

    #[test]
    fn test_without_builtin() {
        let config = TransformerConfig::from_yaml("builtin: false").unwrap();
        assert!(config.build_rules().unwrap().is_empty());
    }

    #[test]
    fn test_bad_inline_rule_named() {
        let config = TransformerConfig::from_yaml("simple:\n  u: \"${body\"\n").unwrap();
        let err = config.build_rules().unwrap_err();
        assert!(matches!(err, ConfigError::Rule { ref name, .. } if name == "u"));
    }

    #[test]
    fn test_parser_options() {
        let config =
            TransformerConfig::from_yaml("max_depth: 1\nno_transform: [code]\n").unwrap();
        let parser = config.build_parser();
        assert_eq!(parser.max_depth(), 1);

        let doc = parser.parse("[code][b]x[/b][/code]");
        let transformer = config.build_transformer().unwrap();
        assert_eq!(
            transformer.transform_all(&doc).unwrap(),
            "[code][b]x[/b][/code]"
        );
    }

    #[test]
    fn test_from_path_resolves_template_dir() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("rules")).unwrap();
        fs::write(
            dir.path().join("rules").join("spoiler.jinja"),
            "<details>{{ body }}</details>",
        )
        .unwrap();
        let config_path = dir.path().join("tagsmith.yaml");
        fs::write(&config_path, "template_dir: rules\nbuiltin: false\n").unwrap();

        let config = TransformerConfig::from_path(&config_path).unwrap();
        assert_eq!(config.template_dir, Some(dir.path().join("rules")));

        let rules = config.build_rules().unwrap();
        assert_eq!(rules.names(), ["spoiler"]);
    }

    #[test]
    fn test_from_path_missing_file() {
        let err = TransformerConfig::from_path("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
