//! The root container of a parsed tree.

use serde::Serialize;

use crate::node::Node;

/// A parsed document: the top-level nodes plus the text they came from.
///
/// For documents produced by [`Parser`](crate::Parser), concatenating the
/// [`raw`](Node::raw) text of the top-level nodes gives back [`source`](Self::source)
/// exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Document {
    source: String,
    children: Vec<Node>,
}

impl Document {
    /// Creates an empty document for the given source text.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            children: Vec::new(),
        }
    }

    /// Creates a document with the given top-level nodes.
    pub fn with_children(source: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            source: source.into(),
            children,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Appends a top-level node. Always succeeds.
    pub fn add_child(&mut self, child: Node) -> bool {
        self.children.push(child);
        true
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub(crate) fn child_slice(&self) -> &[Node] {
        &self.children
    }
}
