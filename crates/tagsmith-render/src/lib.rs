//! # Tagsmith Render - Template-Driven Markup Transformation
//!
//! `tagsmith-render` turns a parsed BBCode-style [`Document`] into output text
//! (usually HTML) by rendering each tag through a rule looked up by the tag's
//! name.
//!
//! ## Core Concepts
//!
//! - [`RenderRule`]: renders one tag, given its rendered children as `body`
//! - [`TemplateRule`] and [`SimpleRule`]: rules written as MiniJinja or
//!   `${variable}` templates
//! - [`RuleSet`]: tag name to rule mapping, with built-in HTML rules
//! - [`Transformer`]: walks the tree, applies rules, falls back to raw text
//! - [`TransformerConfig`]: YAML configuration for all of the above
//!
//! ## Quick Start
//!
//! ```rust
//! use tagsmith_bbparser::Parser;
//! use tagsmith_render::{RuleSet, Transformer};
//!
//! let mut rules = RuleSet::new();
//! rules.add_template("b", "<b>{{ body }}</b>").unwrap();
//! rules
//!     .add_template("quote", "<blockquote>{{ attribute }}: {{ body }}</blockquote>")
//!     .unwrap();
//!
//! let doc = Parser::new().parse("[quote=Ann][b]hello[/b]\nthere[/quote]");
//! let html = Transformer::new(rules).transform_all(&doc).unwrap();
//!
//! assert_eq!(html, "<blockquote>Ann: <b>hello</b><br>there</blockquote>");
//! ```
//!
//! ## Selective Transformation
//!
//! [`Transformer::transform`] takes a predicate; tags it rejects are written
//! back as their original source text, and so is everything inside them:
//!
//! ```rust
//! use tagsmith_bbparser::Parser;
//! use tagsmith_render::{RuleSet, Transformer};
//!
//! let transformer = Transformer::new(RuleSet::html().unwrap());
//! let doc = Parser::new().parse("[b]bold[/b] [quote][b]kept[/b][/quote]");
//!
//! let html = transformer
//!     .transform(&doc, |tag| tag.name() != "quote", None)
//!     .unwrap();
//! assert_eq!(html, "<strong>bold</strong> [quote][b]kept[/b][/quote]");
//! ```
//!
//! [`Document`]: tagsmith_bbparser::Document

pub mod config;
pub mod error;
pub mod rule;
pub mod template;
pub mod transformer;

pub use config::TransformerConfig;
pub use error::{ConfigError, RuleError, TransformError};
pub use rule::{RenderRule, RuleInput};
pub use template::{RuleSet, SimpleRule, TemplateRule};
pub use transformer::{Disposition, Transformer, DEFAULT_NEWLINE};
