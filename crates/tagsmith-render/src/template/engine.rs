//! MiniJinja-backed render rules.

use minijinja::{AutoEscape, Environment, Value};

use crate::error::RuleError;
use crate::rule::{RenderRule, RuleInput};

/// A render rule written as a MiniJinja template.
///
/// The template sees the [`RuleInput`] fields as variables:
///
/// | Variable     | Contents                                   |
/// |--------------|--------------------------------------------|
/// | `body`       | rendered children                          |
/// | `attribute`  | primary attribute, or none                 |
/// | `attributes` | map of named attributes                    |
/// | `context`    | caller data, or none                       |
///
/// Output is not escaped. The template is compiled once, in [`new`](Self::new).
///
/// ```rust
/// use tagsmith_render::template::TemplateRule;
/// use tagsmith_render::{RenderRule, RuleInput};
/// use std::collections::BTreeMap;
///
/// let rule = TemplateRule::new("b", "<b>{{ body }}</b>").unwrap();
/// let attributes = BTreeMap::new();
/// let input = RuleInput { body: "<i>x</i>", attributes: &attributes, attribute: None, context: None };
/// assert_eq!(rule.render(&input).unwrap(), "<b><i>x</i></b>");
/// ```
pub struct TemplateRule {
    env: Environment<'static>,
    name: String,
    source: String,
}

impl TemplateRule {
    /// Compiles `source` as the template for tag `name`.
    pub fn new(name: &str, source: &str) -> Result<Self, RuleError> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::None);
        register_filters(&mut env);
        env.add_template_owned(name.to_string(), source.to_string())?;
        Ok(Self {
            env,
            name: name.to_string(),
            source: source.to_string(),
        })
    }

    /// Template source as given to [`new`](Self::new).
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl RenderRule for TemplateRule {
    fn render(&self, input: &RuleInput<'_>) -> Result<String, RuleError> {
        let tmpl = self.env.get_template(&self.name)?;
        Ok(tmpl.render(Value::from_serialize(input))?)
    }
}

impl std::fmt::Debug for TemplateRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateRule")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Registers the filters available to every template rule.
///
/// - `nl`: appends a newline
/// - `attr_or`: `attributes | attr_or("key", "fallback")`
pub fn register_filters(env: &mut Environment<'static>) {
    env.add_filter("nl", |value: Value| -> String { format!("{}\n", value) });

    env.add_filter(
        "attr_or",
        |attributes: Value, key: String, fallback: String| -> String {
            match attributes.get_attr(&key) {
                Ok(value) if !value.is_undefined() && !value.is_none() => value.to_string(),
                _ => fallback,
            }
        },
    );
}
