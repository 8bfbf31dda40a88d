//! Tree nodes: tags and literal text.
//!
//! A [`Node`] is either a [`TagNode`], which owns its children, or a
//! [`TextNode`] leaf. Every node can hand back the exact source text it was
//! parsed from through [`Node::raw`], which is what renderers emit when a tag
//! is skipped or has no rule.
//!
//! Nodes are plain owned data: children belong to exactly one parent and
//! there are no back-references, so a tree is always finite and acyclic.

use std::collections::BTreeMap;

use serde::Serialize;

/// The variant of a [`Node`], for value-level filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Tag,
    Text,
}

/// A node in a parsed document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Node {
    /// A bracketed tag with children.
    Tag(TagNode),
    /// Literal text.
    Text(TextNode),
}

impl Node {
    /// Creates a text node.
    pub fn text(body: impl Into<String>) -> Self {
        Node::Text(TextNode::new(body))
    }

    /// Returns which variant this node is.
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Tag(_) => NodeKind::Tag,
            Node::Text(_) => NodeKind::Text,
        }
    }

    /// Returns the source text this node was parsed from.
    pub fn raw(&self) -> &str {
        match self {
            Node::Tag(tag) => tag.raw(),
            Node::Text(text) => text.raw(),
        }
    }

    pub fn as_tag(&self) -> Option<&TagNode> {
        match self {
            Node::Tag(tag) => Some(tag),
            Node::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextNode> {
        match self {
            Node::Text(text) => Some(text),
            Node::Tag(_) => None,
        }
    }

    pub fn is_tag(&self) -> bool {
        matches!(self, Node::Tag(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }

    /// Appends a child to this node.
    ///
    /// Returns `false` without modifying anything when the node is text,
    /// since text nodes are leaves.
    pub fn add_child(&mut self, child: Node) -> bool {
        match self {
            Node::Tag(tag) => {
                tag.push_child(child);
                true
            }
            Node::Text(_) => false,
        }
    }
}

impl From<TagNode> for Node {
    fn from(tag: TagNode) -> Self {
        Node::Tag(tag)
    }
}

impl From<TextNode> for Node {
    fn from(text: TextNode) -> Self {
        Node::Text(text)
    }
}

/// A leaf holding literal text.
///
/// The markup has no escape sequences, so the body and the raw source are
/// the same string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextNode {
    body: String,
}

impl TextNode {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn raw(&self) -> &str {
        &self.body
    }

    /// Extends the body with text that directly follows it in the source.
    pub(crate) fn append(&mut self, text: &str) {
        self.body.push_str(text);
    }
}

/// A bracketed tag such as `[url=http://example.com]link[/url]`.
///
/// # Fields
///
/// - `name`: the tag identifier, used to look up a render rule
/// - `attribute`: the primary value written as `[name=value]`
/// - `attributes`: named values written as `[name key=value]`
/// - `children`: content between the opening and closing tag, in order
/// - `transform`: whether the tag takes part in templated rendering at all
/// - `raw`: the full source span, opening tag through closing tag
///
/// Tags are built once (by the parser or with the `with_*` builders) and
/// read afterwards. Per-render overrides belong in the renderer's
/// eligibility predicate, not in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagNode {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    attribute: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    attributes: BTreeMap<String, String>,
    children: Vec<Node>,
    transform: bool,
    raw: String,
}

impl TagNode {
    /// Creates a tag with no attributes and no children.
    ///
    /// # Panics
    ///
    /// Panics if `name` is empty.
    pub fn new(name: impl Into<String>, raw: impl Into<String>) -> Self {
        let name = name.into();
        assert!(!name.is_empty(), "tag name must not be empty");
        Self {
            name,
            attribute: None,
            attributes: BTreeMap::new(),
            children: Vec::new(),
            transform: true,
            raw: raw.into(),
        }
    }

    /// Sets the primary attribute.
    pub fn with_attribute(mut self, value: impl Into<String>) -> Self {
        self.attribute = Some(value.into());
        self
    }

    /// Adds a named attribute. A repeated key overwrites the earlier value.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Adds several named attributes.
    pub fn with_attributes<I, K, V>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.attributes
            .extend(attributes.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Appends a child.
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Replaces the children.
    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    /// Sets whether the tag takes part in templated rendering.
    pub fn with_transform(mut self, transform: bool) -> Self {
        self.transform = transform;
        self
    }

    /// Appends a child in place.
    pub fn push_child(&mut self, child: Node) {
        self.children.push(child);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attribute(&self) -> Option<&str> {
        self.attribute.as_deref()
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Looks up a single named attribute.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Whether this tag should be rendered through a rule. When `false` the
    /// tag and everything inside it is emitted as [`raw`](Self::raw).
    pub fn transform(&self) -> bool {
        self.transform
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub(crate) fn child_slice(&self) -> &[Node] {
        &self.children
    }
}
