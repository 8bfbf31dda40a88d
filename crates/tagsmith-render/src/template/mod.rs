//! Template-backed render rules.
//!
//! - [`TemplateRule`]: full MiniJinja templates (conditionals, filters)
//! - [`SimpleRule`]: `${variable}` substitution only
//! - [`RuleSet`]: tag name to rule mapping, with built-in HTML rules and
//!   directory loading

mod engine;
mod registry;
mod simple;

pub use engine::{register_filters, TemplateRule};
pub use registry::{rule_files, RuleFile, RuleSet, BUILTIN_HTML, TEMPLATE_EXTENSIONS};
pub use simple::SimpleRule;
