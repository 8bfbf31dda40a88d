//! Rule sets: the mapping from tag name to render rule.
//!
//! A [`RuleSet`] is filled from three kinds of sources:
//!
//! 1. Built-in HTML rules, via [`RuleSet::html`]
//! 2. Template files in a directory, via [`RuleSet::extend_from_dir`]
//! 3. Rules added in code: [`add_template`](RuleSet::add_template),
//!    [`add_simple`](RuleSet::add_simple) and [`add_rule`](RuleSet::add_rule)
//!
//! Adding a rule under a name that already has one replaces it, so later
//! sources override earlier ones.
//!
//! # Template Directories
//!
//! Every file directly inside the directory whose name ends in one of
//! [`TEMPLATE_EXTENSIONS`] becomes a MiniJinja rule named after the file
//! stem: `quote.jinja` renders `[quote]` tags. Subdirectories are not
//! searched. When several files share a stem (e.g. `b.jinja` and `b.html`),
//! the extension listed first wins.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, RuleError};
use crate::rule::RenderRule;

use super::engine::TemplateRule;
use super::simple::SimpleRule;

/// Recognized template file extensions in priority order.
pub const TEMPLATE_EXTENSIONS: &[&str] = &[".jinja", ".jinja2", ".j2", ".html"];

/// The HTML rules installed by [`RuleSet::html`].
pub const BUILTIN_HTML: &[(&str, &str)] = &[
    ("b", "<strong>{{ body }}</strong>"),
    ("i", "<em>{{ body }}</em>"),
    ("u", "<u>{{ body }}</u>"),
    ("s", "<del>{{ body }}</del>"),
    ("code", "<pre><code>{{ body }}</code></pre>"),
    (
        "quote",
        "<blockquote>{% if attribute %}<cite>{{ attribute }}</cite>{% endif %}{{ body }}</blockquote>",
    ),
    ("url", "<a href=\"{{ attribute or body }}\">{{ body }}</a>"),
    (
        "img",
        "<img src=\"{{ attribute or body }}\"\
         {% if attributes.width %} width=\"{{ attributes.width }}\"{% endif %}\
         {% if attributes.height %} height=\"{{ attributes.height }}\"{% endif %}>",
    ),
    (
        "color",
        "{% if attribute %}<span style=\"color: {{ attribute }}\">{{ body }}</span>{% else %}{{ body }}{% endif %}",
    ),
    (
        "size",
        "{% if attribute %}<span style=\"font-size: {{ attribute }}\">{{ body }}</span>{% else %}{{ body }}{% endif %}",
    ),
    (
        "list",
        "{% if attribute %}<ol>{{ body }}</ol>{% else %}<ul>{{ body }}</ul>{% endif %}",
    ),
    ("li", "<li>{{ body }}</li>"),
];

/// A template file found in a rule directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleFile {
    /// Tag name the file renders: the file name without its extension.
    pub name: String,
    pub path: PathBuf,
}

impl RuleFile {
    /// Returns the extension priority (lower is higher priority).
    ///
    /// Returns `usize::MAX` if the extension is not recognized.
    pub fn extension_priority(&self) -> usize {
        let file_name = self
            .path
            .file_name()
            .map(|f| f.to_string_lossy())
            .unwrap_or_default();
        TEMPLATE_EXTENSIONS
            .iter()
            .position(|ext| file_name.ends_with(ext))
            .unwrap_or(usize::MAX)
    }
}

/// Lists the template files directly inside `dir`.
///
/// When several files share a stem only the highest-priority one is
/// returned. The result is sorted by tag name.
pub fn rule_files(dir: &Path) -> Result<Vec<RuleFile>, ConfigError> {
    let io_err = |source| ConfigError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut found: BTreeMap<String, RuleFile> = BTreeMap::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|f| f.to_str()) else {
            continue;
        };
        let Some(stem) = TEMPLATE_EXTENSIONS
            .iter()
            .find_map(|ext| file_name.strip_suffix(ext))
        else {
            continue;
        };
        if stem.is_empty() {
            continue;
        }

        let file = RuleFile {
            name: stem.to_string(),
            path: path.clone(),
        };
        match found.get(stem) {
            Some(existing) if existing.extension_priority() <= file.extension_priority() => {}
            _ => {
                found.insert(file.name.clone(), file);
            }
        }
    }

    Ok(found.into_values().collect())
}

/// Maps tag names to render rules.
///
/// Lookups are by exact, case-sensitive tag name. A `RuleSet` is immutable
/// once handed to a [`Transformer`](crate::Transformer) and may be shared
/// between threads.
#[derive(Default)]
pub struct RuleSet {
    rules: HashMap<String, Box<dyn RenderRule>>,
}

impl RuleSet {
    /// Creates an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a rule set holding the [`BUILTIN_HTML`] rules.
    pub fn html() -> Result<Self, RuleError> {
        let mut rules = Self::new();
        for (name, source) in BUILTIN_HTML {
            rules.add_template(name, source)?;
        }
        Ok(rules)
    }

    /// Adds a MiniJinja rule for `name`.
    pub fn add_template(&mut self, name: &str, source: &str) -> Result<(), RuleError> {
        let rule = TemplateRule::new(name, source)?;
        self.add_rule(name, rule);
        Ok(())
    }

    /// Adds a `${variable}` rule for `name`.
    pub fn add_simple(&mut self, name: &str, source: &str) -> Result<(), RuleError> {
        let rule = SimpleRule::new(source)?;
        self.add_rule(name, rule);
        Ok(())
    }

    /// Adds any rule for `name`, replacing an existing one.
    pub fn add_rule(&mut self, name: &str, rule: impl RenderRule + 'static) {
        if self
            .rules
            .insert(name.to_string(), Box::new(rule))
            .is_some()
        {
            log::debug!("rule for [{name}] replaced");
        }
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.rules.remove(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&dyn RenderRule> {
        self.rules.get(name).map(|rule| rule.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Rule names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Moves every rule of `other` into this set, replacing same-named ones.
    pub fn merge(&mut self, other: RuleSet) {
        self.rules.extend(other.rules);
    }

    /// Loads every template file in `dir` as a MiniJinja rule.
    ///
    /// Returns the number of rules loaded.
    pub fn extend_from_dir(&mut self, dir: impl AsRef<Path>) -> Result<usize, ConfigError> {
        let files = rule_files(dir.as_ref())?;
        for file in &files {
            let source = std::fs::read_to_string(&file.path).map_err(|source| ConfigError::Io {
                path: file.path.clone(),
                source,
            })?;
            self.add_template(&file.name, &source)
                .map_err(|source| ConfigError::Rule {
                    name: file.name.clone(),
                    source,
                })?;
            log::debug!("loaded rule [{}] from {}", file.name, file.path.display());
        }
        Ok(files.len())
    }
}

impl std::fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleSet")
            .field("rules", &self.names())
            .finish()
    }
}
