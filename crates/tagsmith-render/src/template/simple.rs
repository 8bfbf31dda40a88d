//! Placeholder-only render rules.
//!
//! [`SimpleRule`] is a lightweight alternative to
//! [`TemplateRule`](super::TemplateRule) for rules that only substitute
//! values: no loops, conditionals or filters.
//!
//! # Syntax
//!
//! - `${body}` - Variable substitution
//! - `${attributes.width}` - Nested property access via dot notation
//! - `${context.items.0}` - Array index access
//! - `$${` - Escaped placeholder (renders as `${`)
//!
//! A `$` that does not start a placeholder is copied as is.
//!
//! # Example
//!
//! ```rust
//! use tagsmith_render::template::SimpleRule;
//! use tagsmith_render::{RenderRule, RuleInput};
//! use std::collections::BTreeMap;
//!
//! let rule = SimpleRule::new("<a href=\"${attribute}\">${body}</a>").unwrap();
//! let attributes = BTreeMap::new();
//! let input = RuleInput {
//!     body: "home",
//!     attributes: &attributes,
//!     attribute: Some("/"),
//!     context: None,
//! };
//! assert_eq!(rule.render(&input).unwrap(), "<a href=\"/\">home</a>");
//! ```

use crate::error::RuleError;
use crate::rule::{RenderRule, RuleInput};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

/// A render rule using `${variable}` substitution.
///
/// The source is checked when the rule is built, so unclosed or empty
/// placeholders are reported once rather than on every render. A variable
/// that does not resolve is left in the output as written, `${name}`;
/// a variable that resolves to null renders as nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleRule {
    segments: Vec<Segment>,
}

impl SimpleRule {
    pub fn new(source: &str) -> Result<Self, RuleError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = source;

        while let Some(dollar) = rest.find('$') {
            literal.push_str(&rest[..dollar]);
            rest = &rest[dollar..];

            if let Some(after) = rest.strip_prefix("$${") {
                literal.push_str("${");
                rest = after;
            } else if let Some(after) = rest.strip_prefix("${") {
                let Some(close) = after.find('}') else {
                    return Err(RuleError::UnclosedPlaceholder(after.to_string()));
                };
                let name = after[..close].trim();
                if name.is_empty() {
                    return Err(RuleError::EmptyPlaceholder);
                }
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Placeholder(name.to_string()));
                rest = &after[close + 1..];
            } else {
                literal.push('$');
                rest = &rest[1..];
            }
        }

        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self { segments })
    }

    /// Names of the placeholders, in order of appearance.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Placeholder(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Resolves a dotted path in a JSON value.
    ///
    /// Supports:
    /// - Simple keys: `body`
    /// - Nested objects: `context.user.name`
    /// - Array indices: `context.items.0`
    fn resolve_path<'a>(
        value: &'a serde_json::Value,
        path: &str,
    ) -> Option<&'a serde_json::Value> {
        let mut current = value;

        for part in path.split('.') {
            current = match current {
                serde_json::Value::Object(map) => map.get(part)?,
                serde_json::Value::Array(arr) => {
                    let index: usize = part.parse().ok()?;
                    arr.get(index)?
                }
                _ => return None,
            };
        }

        Some(current)
    }

    /// Formats a JSON value as a string for output.
    fn format_value(value: &serde_json::Value) -> String {
        match value {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::Bool(b) => b.to_string(),
            serde_json::Value::Null => String::new(),
            // For arrays and objects, use JSON representation
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => value.to_string(),
        }
    }
}

impl RenderRule for SimpleRule {
    fn render(&self, input: &RuleInput<'_>) -> Result<String, RuleError> {
        let data = serde_json::to_value(input).map_err(|e| RuleError::msg(e.to_string()))?;
        let mut result = String::with_capacity(input.body.len());

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => result.push_str(text),
                Segment::Placeholder(name) => match Self::resolve_path(&data, name) {
                    Some(value) => result.push_str(&Self::format_value(value)),
                    // Left as written so the miss shows up in the output
                    None => {
                        result.push_str("${");
                        result.push_str(name);
                        result.push('}');
                    }
                },
            }
        }

        Ok(result)
    }
}
