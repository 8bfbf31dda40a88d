//! BBCode-style tag parser producing a document tree.
//!
//! This crate turns `[tag]content[/tag]` markup into a [`Document`]: an
//! ordered forest of [`Node`]s, each either a [`TagNode`] (name, attributes,
//! children, raw source) or a [`TextNode`]. Renderers walk the tree and fall
//! back to a node's raw source whenever they skip it.
//!
//! # Example
//!
//! ```rust
//! use tagsmith_bbparser::{Parser, Tree};
//!
//! let doc = Parser::new().parse("see [url=http://example.com]this[/url]");
//!
//! let tags = doc.tag_nodes();
//! assert_eq!(tags.len(), 1);
//! assert_eq!(tags[0].name(), "url");
//! assert_eq!(tags[0].attribute(), Some("http://example.com"));
//! assert_eq!(tags[0].raw(), "[url=http://example.com]this[/url]");
//! ```
//!
//! # Tag Syntax
//!
//! - `[name]...[/name]`
//! - `[name=value]...[/name]` sets the primary [`attribute`](TagNode::attribute)
//! - `[name key=value other="two words"]...[/name]` sets named
//!   [`attributes`](TagNode::attributes)
//!
//! Values are bare (up to whitespace) or quoted with `"` or `'`.
//!
//! Tag names and attribute keys follow CSS identifier rules:
//! - Start with a letter (`a-z`) or underscore (`_`)
//! - Followed by letters, digits (`0-9`), underscores, or hyphens (`-`)
//! - Case-sensitive
//!
//! Pattern: `[a-z_][a-z0-9_-]*`
//!
//! Malformed markup is never an error; see [`Parser`] for how it degrades to
//! text.

pub mod document;
pub mod node;
mod parser;
pub mod query;
mod tokenizer;

pub use document::Document;
pub use node::{Node, NodeKind, TagNode, TextNode};
pub use parser::{Parser, DEFAULT_MAX_DEPTH};
pub use query::{NodeVariant, Tree};
