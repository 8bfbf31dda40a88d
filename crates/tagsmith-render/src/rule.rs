//! The render rule abstraction.
//!
//! A [`RenderRule`] turns one tag into output text. The transformer renders a
//! tag's children first and hands the result to the rule as
//! [`RuleInput::body`], alongside the tag's attributes and the caller's
//! context.
//!
//! Besides the template-backed rules in [`template`](crate::template), any
//! `Fn(&RuleInput) -> Result<String, RuleError>` closure is a rule:
//!
//! ```rust
//! use tagsmith_render::{RuleError, RuleInput, RuleSet};
//!
//! let mut rules = RuleSet::new();
//! rules.add_rule("shout", |input: &RuleInput<'_>| -> Result<String, RuleError> {
//!     Ok(input.body.to_uppercase())
//! });
//! assert!(rules.contains("shout"));
//! ```

use std::collections::BTreeMap;

use serde::Serialize;
use tagsmith_bbparser::TagNode;

use crate::error::RuleError;

/// Everything a rule can see while rendering one tag.
///
/// Serializes to an object with the keys `body`, `attributes`, `attribute`
/// and `context`; template rules expose exactly those names as variables.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RuleInput<'a> {
    /// The tag's children, already rendered.
    pub body: &'a str,
    /// Named attributes, `key=value` pairs from the opening tag.
    pub attributes: &'a BTreeMap<String, String>,
    /// The primary attribute, from `[name=value]`.
    pub attribute: Option<&'a str>,
    /// Caller-supplied data, shared by every rule in one transformation.
    pub context: Option<&'a serde_json::Value>,
}

impl<'a> RuleInput<'a> {
    /// Builds the input for `tag` with an already rendered body.
    pub fn for_tag(
        tag: &'a TagNode,
        body: &'a str,
        context: Option<&'a serde_json::Value>,
    ) -> Self {
        Self {
            body,
            attributes: tag.attributes(),
            attribute: tag.attribute(),
            context,
        }
    }

    /// Looks up a named attribute.
    pub fn attr(&self, key: &str) -> Option<&'a str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// Renders a single tag.
///
/// Rules are shared by every transformation that uses their
/// [`RuleSet`](crate::RuleSet), possibly from several threads at once.
pub trait RenderRule: Send + Sync {
    fn render(&self, input: &RuleInput<'_>) -> Result<String, RuleError>;
}

impl<F> RenderRule for F
where
    F: Fn(&RuleInput<'_>) -> Result<String, RuleError> + Send + Sync,
{
    fn render(&self, input: &RuleInput<'_>) -> Result<String, RuleError> {
        self(input)
    }
}
