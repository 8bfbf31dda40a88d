//! Builds a [`Document`] tree from BBCode-style markup.
//!
//! Parsing never fails. Anything that cannot become a well-formed tag is kept
//! as literal text, byte for byte:
//!
//! - an opening tag with no matching close tag later in the input
//! - a close tag that matches no open tag
//! - bracketed text that is not valid tag syntax (`[123]`, `[Bad]`, `[b=]`)
//! - tags that would open deeper than the nesting limit
//!
//! When a close tag matches an outer open tag (`[b][i]x[/b]`), the inner tags
//! that were never closed turn back into text and their children move up into
//! the enclosing tag.

use std::collections::{BTreeSet, HashMap};

use crate::document::Document;
use crate::node::{Node, TagNode, TextNode};
use crate::tokenizer::{OpenTag, Token, Tokenizer};

/// Default limit on tag nesting.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// A BBCode-style markup parser.
///
/// # Example
///
/// ```rust
/// use tagsmith_bbparser::{Parser, Tree};
///
/// let doc = Parser::new().parse("abc[b]bbb[/b]123");
/// let children = doc.children();
///
/// assert_eq!(children.len(), 3);
/// assert_eq!(children[1].raw(), "[b]bbb[/b]");
/// assert_eq!(children[1].as_tag().unwrap().name(), "b");
/// ```
#[derive(Debug, Clone)]
pub struct Parser {
    max_depth: usize,
    no_transform: BTreeSet<String>,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// An open tag waiting for its close tag.
struct Frame<'a> {
    open: OpenTag<'a>,
    start: usize,
    children: Vec<Node>,
}

impl Parser {
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            no_transform: BTreeSet::new(),
        }
    }

    /// Sets the maximum tag nesting depth. Tags beyond it are kept as text.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Marks tag names whose content is taken verbatim.
    ///
    /// Such tags are built with `transform = false`, and no tags are
    /// recognized inside them: their content is a single text child.
    pub fn with_no_transform<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.no_transform.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Parses `input` into a document.
    pub fn parse(&self, input: &str) -> Document {
        let tokens = Tokenizer::new(input).collect::<Vec<_>>();
        let closes = self.matching_closes(&tokens);
        let mut root: Vec<Node> = Vec::new();
        let mut stack: Vec<Frame<'_>> = Vec::new();
        let mut offset = 0;

        for (i, token) in tokens.iter().enumerate() {
            let start = offset;
            offset += token.raw().len();

            let verbatim = stack
                .last()
                .is_some_and(|frame| self.no_transform.contains(frame.open.name));

            match token {
                Token::Text(text) | Token::InvalidTag(text) => {
                    push_text(current(&mut root, &mut stack), text);
                }
                Token::OpenTag(open) => {
                    if verbatim {
                        push_text(current(&mut root, &mut stack), open.raw);
                    } else if stack.len() >= self.max_depth {
                        log::trace!(
                            "[{}] exceeds nesting limit {}; kept as text",
                            open.name,
                            self.max_depth
                        );
                        push_text(current(&mut root, &mut stack), open.raw);
                    } else if closes[i] {
                        stack.push(Frame {
                            open: open.clone(),
                            start,
                            children: Vec::new(),
                        });
                    } else {
                        log::trace!(
                            "[{}] has no matching close tag; kept as text",
                            open.name
                        );
                        push_text(current(&mut root, &mut stack), open.raw);
                    }
                }
                Token::CloseTag { name, raw } => {
                    let top_matches = stack
                        .last()
                        .is_some_and(|frame| frame.open.name == *name);
                    if top_matches {
                        self.close_top(input, offset, &mut root, &mut stack);
                    } else if !verbatim && stack.iter().any(|frame| frame.open.name == *name) {
                        // Mismatched nesting - unwind the unclosed inner tags
                        while stack.last().is_some_and(|frame| frame.open.name != *name) {
                            if let Some(frame) = stack.pop() {
                                log::trace!(
                                    "[{}] closed out of order; kept as text",
                                    frame.open.name
                                );
                                unwind(frame, current(&mut root, &mut stack));
                            }
                        }
                        self.close_top(input, offset, &mut root, &mut stack);
                    } else {
                        // Orphan close tag - treat as literal text
                        push_text(current(&mut root, &mut stack), raw);
                    }
                }
            }
        }

        // Anything still open never found its close tag
        while let Some(frame) = stack.pop() {
            unwind(frame, current(&mut root, &mut stack));
        }

        Document::with_children(input, root)
    }

    /// Marks, for every opening tag token, whether a close tag pairs with it.
    ///
    /// Same-name tags nest. A verbatim tag pairs with the next close of its
    /// name, and nothing inside it pairs at all. Runs in one pass per
    /// direction.
    fn matching_closes(&self, tokens: &[Token<'_>]) -> Vec<bool> {
        let mut next_close: Vec<Option<usize>> = vec![None; tokens.len()];
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for (i, token) in tokens.iter().enumerate().rev() {
            match token {
                Token::CloseTag { name, .. } => {
                    seen.insert(*name, i);
                }
                Token::OpenTag(open) => next_close[i] = seen.get(open.name).copied(),
                _ => {}
            }
        }

        let mut matched = vec![false; tokens.len()];
        let mut open_by_name: HashMap<&str, Vec<usize>> = HashMap::new();
        let mut i = 0;
        while i < tokens.len() {
            match &tokens[i] {
                Token::OpenTag(open) if self.no_transform.contains(open.name) => {
                    if let Some(close) = next_close[i] {
                        matched[i] = true;
                        i = close;
                    }
                }
                Token::OpenTag(open) => open_by_name.entry(open.name).or_default().push(i),
                Token::CloseTag { name, .. } => {
                    if let Some(j) = open_by_name.get_mut(name).and_then(Vec::pop) {
                        matched[j] = true;
                    }
                }
                _ => {}
            }
            i += 1;
        }
        matched
    }

    /// Closes the innermost frame, whose close tag ends at `end`.
    fn close_top(
        &self,
        input: &str,
        end: usize,
        root: &mut Vec<Node>,
        stack: &mut Vec<Frame<'_>>,
    ) {
        let Some(frame) = stack.pop() else {
            return;
        };
        let tag = TagNode::new(frame.open.name, &input[frame.start..end])
            .with_attributes(frame.open.attributes.iter().copied())
            .with_children(frame.children)
            .with_transform(!self.no_transform.contains(frame.open.name));
        let tag = match frame.open.attribute {
            Some(value) => tag.with_attribute(value),
            None => tag,
        };
        push_node(current(root, stack), tag.into());
    }
}

/// The child list new nodes go into: the innermost open tag, or the root.
fn current<'s>(root: &'s mut Vec<Node>, stack: &'s mut [Frame<'_>]) -> &'s mut Vec<Node> {
    match stack.last_mut() {
        Some(frame) => &mut frame.children,
        None => root,
    }
}

/// Turns an unclosed frame back into text, moving its children up.
fn unwind(frame: Frame<'_>, parent: &mut Vec<Node>) {
    push_text(parent, frame.open.raw);
    for child in frame.children {
        push_node(parent, child);
    }
}

fn push_text(children: &mut Vec<Node>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Node::Text(last)) = children.last_mut() {
        last.append(text);
    } else {
        children.push(Node::Text(TextNode::new(text)));
    }
}

fn push_node(children: &mut Vec<Node>, node: Node) {
    match node {
        Node::Text(text) => push_text(children, text.body()),
        tag => children.push(tag),
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Tree;

    fn parse(input: &str) -> Document {
        Parser::new().parse(input)
    }

    fn only_tag(doc: &Document) -> &TagNode {
        assert_eq!(doc.children().len(), 1, "{doc:?}");
        doc.children()[0].as_tag().expect("tag")
    }

    fn rejoined(doc: &Document) -> String {
        doc.children().iter().map(Node::raw).collect()
    }

    mod structure {
        use super::*;

        #[test]
        fn plain_text() {
            let doc = parse("hello world");
            assert_eq!(doc.children(), &[Node::text("hello world")]);
        }

        #[test]
        fn empty_input() {
            let doc = parse("");
            assert!(doc.is_empty());
            assert_eq!(doc.source(), "");
        }

        #[test]
        fn text_around_tag() {
            let doc = parse("abc[b]bbb[/b]123");
            let children = doc.children();
            assert_eq!(children.len(), 3);
            assert_eq!(children[0], Node::text("abc"));
            assert_eq!(children[2], Node::text("123"));

            let tag = children[1].as_tag().unwrap();
            assert_eq!(tag.name(), "b");
            assert_eq!(tag.raw(), "[b]bbb[/b]");
            assert_eq!(tag.children(), &[Node::text("bbb")]);
            assert!(tag.transform());
        }

        #[test]
        fn nested_tags() {
            let doc = parse("[b][i]x[/i][/b]");
            let b = only_tag(&doc);
            assert_eq!(b.raw(), "[b][i]x[/i][/b]");
            let i = b.children()[0].as_tag().unwrap();
            assert_eq!(i.raw(), "[i]x[/i]");
            assert_eq!(i.children(), &[Node::text("x")]);
        }

        #[test]
        fn same_name_nesting() {
            let doc = parse("[q]a[q]b[/q]c[/q]");
            let outer = only_tag(&doc);
            assert_eq!(outer.raw(), "[q]a[q]b[/q]c[/q]");
            assert_eq!(outer.children().len(), 3);
            assert_eq!(outer.children()[1].raw(), "[q]b[/q]");
        }

        #[test]
        fn adjacent_tags() {
            let doc = parse("[b]a[/b][i]b[/i]");
            let raws: Vec<_> = doc.children().iter().map(Node::raw).collect();
            assert_eq!(raws, ["[b]a[/b]", "[i]b[/i]"]);
        }

        #[test]
        fn empty_tag_has_no_children() {
            let tag_doc = parse("[b][/b]");
            assert!(only_tag(&tag_doc).children().is_empty());
        }

        #[test]
        fn attributes_are_attached() {
            let doc = parse("[img=a.png width=10 alt=\"a b\"]x[/img]");
            let tag = only_tag(&doc);
            assert_eq!(tag.attribute(), Some("a.png"));
            assert_eq!(tag.attr("width"), Some("10"));
            assert_eq!(tag.attr("alt"), Some("a b"));
        }

        #[test]
        fn multiline_content() {
            let doc = parse("[b]line1\nline2[/b]");
            assert_eq!(only_tag(&doc).children(), &[Node::text("line1\nline2")]);
        }
    }

    mod malformed {
        use super::*;

        #[test]
        fn unclosed_tag_is_text() {
            let doc = parse("[b]hello");
            assert_eq!(doc.children(), &[Node::text("[b]hello")]);
        }

        #[test]
        fn orphan_close_tag_is_text() {
            let doc = parse("hello[/b]");
            assert_eq!(doc.children(), &[Node::text("hello[/b]")]);
        }

        #[test]
        fn invalid_tags_are_text() {
            let doc = parse("[123]text[/123] [Bad]x[/Bad]");
            assert_eq!(doc.children(), &[Node::text("[123]text[/123] [Bad]x[/Bad]")]);
        }

        #[test]
        fn stray_close_inside_tag() {
            let doc = parse("[b]hello[/red][/b]");
            let tag = only_tag(&doc);
            assert_eq!(tag.children(), &[Node::text("hello[/red]")]);
        }

        #[test]
        fn out_of_order_close_unwinds_inner() {
            let doc = parse("[b][i]x[/b][/i]");
            let children = doc.children();
            assert_eq!(children.len(), 2);

            let b = children[0].as_tag().unwrap();
            assert_eq!(b.raw(), "[b][i]x[/b]");
            assert_eq!(b.children(), &[Node::text("[i]x")]);
            assert_eq!(children[1], Node::text("[/i]"));
        }

        #[test]
        fn unwound_children_keep_their_tags() {
            let doc = parse("[b][i]x[u]y[/u][/b][/i]");
            assert_eq!(doc.children().last(), Some(&Node::text("[/i]")));
            let trimmed = doc_without_tail(&doc);
            let b = only_tag(&trimmed);
            assert_eq!(b.children().len(), 2);
            assert_eq!(b.children()[0], Node::text("[i]x"));
            assert_eq!(b.children()[1].raw(), "[u]y[/u]");
        }

        fn doc_without_tail(doc: &Document) -> Document {
            let mut children = doc.children().to_vec();
            children.pop();
            Document::with_children(doc.source(), children)
        }

        #[test]
        fn brackets_in_content() {
            let doc = parse("[b]array[0][/b]");
            assert_eq!(only_tag(&doc).children(), &[Node::text("array[0]")]);
        }

        #[test]
        fn unclosed_quote_keeps_following_text() {
            let doc = parse("[url=\"http://x]link[/url] said \"hi\"]");
            let children = doc.children();
            assert_eq!(children.len(), 2);

            let url = children[0].as_tag().unwrap();
            assert_eq!(url.raw(), "[url=\"http://x]link[/url]");
            assert_eq!(url.attribute(), Some("http://x"));
            assert_eq!(url.children(), &[Node::text("link")]);
            assert_eq!(children[1], Node::text(" said \"hi\"]"));
        }

        #[test]
        fn unclosed_bracket() {
            let doc = parse("hello [b world");
            assert_eq!(doc.children(), &[Node::text("hello [b world")]);
        }
    }

    mod options {
        use super::*;

        #[test]
        fn depth_limit_keeps_deep_tags_as_text() {
            let doc = Parser::new().with_max_depth(1).parse("[b][i]x[/i][/b]");
            let b = only_tag(&doc);
            assert_eq!(b.children(), &[Node::text("[i]x[/i]")]);
        }

        #[test]
        fn zero_depth_parses_nothing() {
            let doc = Parser::new().with_max_depth(0).parse("[b]x[/b]");
            assert_eq!(doc.children(), &[Node::text("[b]x[/b]")]);
        }

        #[test]
        fn no_transform_tags_are_verbatim() {
            let doc = Parser::new()
                .with_no_transform(["code"])
                .parse("[code][b]x[/b][/code]");
            let code = only_tag(&doc);
            assert!(!code.transform());
            assert_eq!(code.children(), &[Node::text("[b]x[/b]")]);
            assert_eq!(code.raw(), "[code][b]x[/b][/code]");
        }

        #[test]
        fn no_transform_only_affects_named_tags() {
            let doc = Parser::new()
                .with_no_transform(["code"])
                .parse("[b]x[/b]");
            assert!(only_tag(&doc).transform());
        }
    }

    mod pairing {
        use super::*;
        use std::time::{Duration, Instant};

        fn closes(parser: &Parser, input: &str) -> Vec<bool> {
            let tokens: Vec<_> = Tokenizer::new(input).collect();
            parser.matching_closes(&tokens)
        }

        #[test]
        fn innermost_open_pairs_first() {
            // [b] [b] x [/b]
            assert_eq!(
                closes(&Parser::new(), "[b][b]x[/b]"),
                [false, true, false, false]
            );
        }

        #[test]
        fn pairs_are_per_name() {
            // [b] [i] x [/b] [/i]
            assert_eq!(
                closes(&Parser::new(), "[b][i]x[/b][/i]"),
                [true, true, false, false, false]
            );
        }

        #[test]
        fn verbatim_tag_pairs_with_next_close() {
            let parser = Parser::new().with_no_transform(["code"]);
            // [code] a [code] b [/code]
            assert_eq!(
                closes(&parser, "[code]a [code]b[/code]"),
                [true, false, false, false, false]
            );
        }

        #[test]
        fn verbatim_same_name_open_is_text() {
            let doc = Parser::new()
                .with_no_transform(["code"])
                .parse("[code]a [code]b[/code]");
            let code = only_tag(&doc);
            assert!(!code.transform());
            assert_eq!(code.children(), &[Node::text("a [code]b")]);
        }

        #[test]
        fn verbatim_closes_at_first_close() {
            let doc = Parser::new()
                .with_no_transform(["code"])
                .parse("[code]use [code]x[/code] here[/code]");
            let children = doc.children();
            assert_eq!(children.len(), 2);
            assert_eq!(children[0].raw(), "[code]use [code]x[/code]");
            assert_eq!(children[1], Node::text(" here[/code]"));
        }

        #[test]
        fn many_unclosed_tags_parse_in_linear_time() {
            let input = "[b]".repeat(100_000);
            let started = Instant::now();
            let doc = parse(&input);
            assert!(started.elapsed() < Duration::from_secs(10));
            assert_eq!(doc.children(), &[Node::text(input.as_str())]);
        }
    }

    #[test]
    fn raw_spans_rebuild_source() {
        for input in [
            "abc[b]bbb[/b]123",
            "[b][i]x[/b][/i]",
            "[b]unclosed [i]y[/i]",
            "x[/y]z[[a]]",
            "[url=\"a]b\"]t[/url]",
        ] {
            assert_eq!(rejoined(&parse(input)), input);
        }
    }
}
