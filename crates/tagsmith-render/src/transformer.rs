//! The recursive transformation engine.
//!
//! [`Transformer::transform`] walks a [`Document`] in order and writes:
//!
//! - text nodes as their body, each `\n` replaced by the newline marker
//! - tags rendered through the rule registered for their name
//! - every other tag as its raw source text, unchanged
//!
//! A tag is written as its raw text when its transform flag is off, when the
//! eligibility predicate rejects it, or when no rule matches its name. Raw
//! text covers the whole subtree, so nothing inside a skipped tag is
//! transformed.
//!
//! ```rust
//! use tagsmith_bbparser::Parser;
//! use tagsmith_render::{RuleSet, Transformer};
//!
//! let mut rules = RuleSet::new();
//! rules.add_template("b", "<b>{{ body }}</b>").unwrap();
//! let transformer = Transformer::new(rules);
//!
//! let doc = Parser::new().parse("[b]hi[/b]\n[x]?[/x]");
//! assert_eq!(transformer.transform_all(&doc).unwrap(), "<b>hi</b><br>[x]?[/x]");
//! ```

use tagsmith_bbparser::{Document, Node, TagNode, Tree};

use crate::error::TransformError;
use crate::rule::RuleInput;
use crate::template::RuleSet;

/// Newline marker used unless [`Transformer::with_newline`] says otherwise.
pub const DEFAULT_NEWLINE: &str = "<br>";

/// What [`Transformer::transform`] would do with a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// The tag's transform flag is off; raw text is emitted.
    Disabled,
    /// The eligibility predicate rejected the tag; raw text is emitted.
    Ineligible,
    /// No rule matches the tag name; raw text is emitted.
    NoRule,
    /// The tag is rendered through its rule.
    Render,
}

impl Disposition {
    /// Whether the tag's own raw text ends up in the output.
    pub fn is_raw(self) -> bool {
        self != Disposition::Render
    }
}

/// Renders documents through a [`RuleSet`].
///
/// A transformer holds no per-call state: one instance can serve any number
/// of [`transform`](Self::transform) calls, concurrently if shared.
#[derive(Debug)]
pub struct Transformer {
    rules: RuleSet,
    newline: String,
}

impl Transformer {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules,
            newline: DEFAULT_NEWLINE.to_string(),
        }
    }

    /// Sets the text that replaces each `\n` in text nodes.
    pub fn with_newline(mut self, newline: impl Into<String>) -> Self {
        self.newline = newline.into();
        self
    }

    pub fn newline(&self) -> &str {
        &self.newline
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Renders `document`, transforming only the tags `is_eligible` accepts.
    ///
    /// `context` is passed unchanged to every rule. Leading and trailing
    /// whitespace is trimmed from the result. Fails on the first rule that
    /// reports an error; no partial output is returned.
    pub fn transform<F>(
        &self,
        document: &Document,
        is_eligible: F,
        context: Option<&serde_json::Value>,
    ) -> Result<String, TransformError>
    where
        F: Fn(&TagNode) -> bool,
    {
        let mut out = String::with_capacity(document.source().len());
        for node in document.children() {
            self.render_node(&mut out, node, &is_eligible, context)?;
        }
        Ok(out.trim().to_string())
    }

    /// Renders `document` with every tag eligible and no context.
    pub fn transform_all(&self, document: &Document) -> Result<String, TransformError> {
        self.transform(document, |_| true, None)
    }

    /// Reports how [`transform`](Self::transform) would treat `tag`.
    ///
    /// Checks are made in order: transform flag, predicate, rule lookup.
    pub fn explain<F>(&self, tag: &TagNode, is_eligible: F) -> Disposition
    where
        F: Fn(&TagNode) -> bool,
    {
        if !tag.transform() {
            Disposition::Disabled
        } else if !is_eligible(tag) {
            Disposition::Ineligible
        } else if !self.rules.contains(tag.name()) {
            Disposition::NoRule
        } else {
            Disposition::Render
        }
    }

    fn render_node<F>(
        &self,
        out: &mut String,
        node: &Node,
        is_eligible: &F,
        context: Option<&serde_json::Value>,
    ) -> Result<(), TransformError>
    where
        F: Fn(&TagNode) -> bool,
    {
        match node {
            Node::Text(text) => {
                out.push_str(&text.body().replace('\n', &self.newline));
            }
            Node::Tag(tag) => self.render_tag(out, tag, is_eligible, context)?,
        }
        Ok(())
    }

    fn render_tag<F>(
        &self,
        out: &mut String,
        tag: &TagNode,
        is_eligible: &F,
        context: Option<&serde_json::Value>,
    ) -> Result<(), TransformError>
    where
        F: Fn(&TagNode) -> bool,
    {
        if !tag.transform() {
            log::debug!("[{}] has transform off; emitting raw", tag.name());
            out.push_str(tag.raw());
            return Ok(());
        }
        if !is_eligible(tag) {
            log::trace!("[{}] not eligible; emitting raw", tag.name());
            out.push_str(tag.raw());
            return Ok(());
        }

        // Children go first: a failing child aborts even when this tag has no rule.
        let mut body = String::new();
        for child in tag.children() {
            self.render_node(&mut body, child, is_eligible, context)?;
        }

        let Some(rule) = self.rules.get(tag.name()) else {
            log::debug!("no rule for [{}]; emitting raw", tag.name());
            out.push_str(tag.raw());
            return Ok(());
        };

        let input = RuleInput::for_tag(tag, &body, context);
        let rendered = rule
            .render(&input)
            .map_err(|source| TransformError::Rendering {
                tag: tag.name().to_string(),
                body: body.clone(),
                source,
            })?;
        log::trace!("[{}] rendered {} bytes", tag.name(), rendered.len());
        out.push_str(&rendered);
        Ok(())
    }
}
