//! Read-only traversal over document trees.
//!
//! The [`Tree`] trait is implemented by [`Node`], [`TagNode`] and
//! [`Document`], so the same queries work from any point in a tree. All
//! traversals are depth-first and pre-order, which is document order.
//!
//! ```rust
//! use tagsmith_bbparser::{Parser, TextNode, Tree};
//!
//! let doc = Parser::new().parse("a[b]x[i]y[/i][/b]z");
//!
//! let names: Vec<_> = doc.tag_nodes().iter().map(|t| t.name()).collect();
//! assert_eq!(names, ["b", "i"]);
//!
//! let mut text = String::new();
//! doc.walk::<TextNode, _>(|t| text.push_str(t.body()));
//! assert_eq!(text, "axyz");
//! ```
//!
//! Nothing here takes `&mut`, so any number of threads can query a shared
//! tree at once.

use crate::document::Document;
use crate::node::{Node, TagNode, TextNode};

/// A node type that [`Tree::walk`] can select.
///
/// `Node` matches everything; `TagNode` and `TextNode` match their variant.
pub trait NodeVariant {
    fn from_node(node: &Node) -> Option<&Self>;
}

impl NodeVariant for Node {
    fn from_node(node: &Node) -> Option<&Self> {
        Some(node)
    }
}

impl NodeVariant for TagNode {
    fn from_node(node: &Node) -> Option<&Self> {
        node.as_tag()
    }
}

impl NodeVariant for TextNode {
    fn from_node(node: &Node) -> Option<&Self> {
        node.as_text()
    }
}

/// Anything that owns an ordered list of child nodes.
pub trait Tree {
    /// The immediate children, in document order. Empty for text nodes.
    fn children(&self) -> &[Node];

    /// The receiver itself when it is a tag.
    fn self_tag(&self) -> Option<&TagNode> {
        None
    }

    /// The receiver itself when it is text.
    fn self_text(&self) -> Option<&TextNode> {
        None
    }

    /// Every tag in this subtree, the receiver included when it is a tag.
    fn tag_nodes(&self) -> Vec<&TagNode> {
        let mut out = Vec::new();
        if let Some(tag) = self.self_tag() {
            out.push(tag);
        }
        for child in self.children() {
            collect_tags(child, &mut out);
        }
        out
    }

    /// Every text node in this subtree, the receiver included when it is text.
    fn text_nodes(&self) -> Vec<&TextNode> {
        let mut out = Vec::new();
        if let Some(text) = self.self_text() {
            out.push(text);
        }
        for child in self.children() {
            collect_text(child, &mut out);
        }
        out
    }

    /// Applies `action` to every descendant accepted by `filter`.
    ///
    /// The receiver is not visited. Tags are always descended into, whether
    /// or not `filter` accepted them.
    fn walk_matching<'a, F, A>(&'a self, filter: F, mut action: A)
    where
        F: Fn(&Node) -> bool,
        A: FnMut(&'a Node),
    {
        for child in self.children() {
            walk_node(child, &filter, &mut action);
        }
    }

    /// Applies `action` to every descendant of type `T`.
    ///
    /// `walk::<Node, _>` visits everything, `walk::<TagNode, _>` only tags and
    /// `walk::<TextNode, _>` only text.
    fn walk<'a, T, A>(&'a self, mut action: A)
    where
        T: NodeVariant + 'a,
        A: FnMut(&'a T),
    {
        self.walk_matching(
            |node| T::from_node(node).is_some(),
            |node: &'a Node| {
                if let Some(item) = T::from_node(node) {
                    action(item);
                }
            },
        );
    }

    /// Applies `action` to every descendant.
    fn walk_all<'a, A>(&'a self, action: A)
    where
        A: FnMut(&'a Node),
    {
        self.walk::<Node, A>(action);
    }
}

fn collect_tags<'a>(node: &'a Node, out: &mut Vec<&'a TagNode>) {
    if let Node::Tag(tag) = node {
        out.push(tag);
        for child in tag.child_slice() {
            collect_tags(child, out);
        }
    }
}

fn collect_text<'a>(node: &'a Node, out: &mut Vec<&'a TextNode>) {
    match node {
        Node::Text(text) => out.push(text),
        Node::Tag(tag) => {
            for child in tag.child_slice() {
                collect_text(child, out);
            }
        }
    }
}

fn walk_node<'a, F, A>(node: &'a Node, filter: &F, action: &mut A)
where
    F: Fn(&Node) -> bool,
    A: FnMut(&'a Node),
{
    if filter(node) {
        action(node);
    }
    if let Node::Tag(tag) = node {
        for child in tag.child_slice() {
            walk_node(child, filter, action);
        }
    }
}

impl Tree for Node {
    fn children(&self) -> &[Node] {
        match self {
            Node::Tag(tag) => tag.child_slice(),
            Node::Text(_) => &[],
        }
    }

    fn self_tag(&self) -> Option<&TagNode> {
        self.as_tag()
    }

    fn self_text(&self) -> Option<&TextNode> {
        self.as_text()
    }
}

impl Tree for TagNode {
    fn children(&self) -> &[Node] {
        self.child_slice()
    }

    fn self_tag(&self) -> Option<&TagNode> {
        Some(self)
    }
}

impl Tree for Document {
    fn children(&self) -> &[Node] {
        self.child_slice()
    }
}
