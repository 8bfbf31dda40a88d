//! Error types for rules, transformation and configuration.
//!
//! - [`RuleError`]: a single rule failed to compile or to render
//! - [`TransformError`]: a transformation was aborted by a failing rule
//! - [`ConfigError`]: configuration or a template directory could not be loaded
//!
//! Tags without a rule and tags that are switched off are not errors; the
//! transformer emits their raw text instead.

use std::path::PathBuf;

use thiserror::Error;

/// Error produced by a [`RenderRule`](crate::RenderRule).
#[derive(Debug, Error)]
pub enum RuleError {
    /// MiniJinja syntax error or rendering failure.
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    /// A `${` placeholder without its closing brace.
    #[error("unclosed placeholder: ${{{0}")]
    UnclosedPlaceholder(String),

    /// A `${}` placeholder with no variable name.
    #[error("empty placeholder in template")]
    EmptyPlaceholder,

    /// Failure reported by a custom rule.
    #[error("{0}")]
    Message(String),
}

impl RuleError {
    /// Creates a [`RuleError::Message`].
    pub fn msg(message: impl Into<String>) -> Self {
        RuleError::Message(message.into())
    }
}

/// Error that aborts [`Transformer::transform`](crate::Transformer::transform).
#[derive(Debug, Error)]
pub enum TransformError {
    /// A rule was found for the tag but failed to render it.
    #[error("rendering failed for tag [{tag}] with body {body:?}")]
    Rendering {
        /// Name of the tag being rendered.
        tag: String,
        /// The rendered children that were handed to the rule.
        body: String,
        #[source]
        source: RuleError,
    },
}

impl TransformError {
    /// Name of the tag whose rule failed.
    pub fn tag(&self) -> &str {
        match self {
            TransformError::Rendering { tag, .. } => tag,
        }
    }

    /// Body that was passed to the failing rule.
    pub fn body(&self) -> &str {
        match self {
            TransformError::Rendering { body, .. } => body,
        }
    }
}

/// Error raised while loading configuration or rule templates.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid rule for [{name}]: {source}")]
    Rule {
        name: String,
        #[source]
        source: RuleError,
    },
}
