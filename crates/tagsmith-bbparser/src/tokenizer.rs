//! Tokenizer for BBCode-style tags.
//!
//! Splits input into text, opening tags, closing tags and bracketed text that
//! only looks like a tag. Tokens borrow from the input and, laid end to end,
//! cover it exactly: every byte belongs to one token's [`raw`](Token::raw).

/// An opening tag with its attributes, e.g. `[img=a.png width="10"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OpenTag<'a> {
    pub name: &'a str,
    pub attribute: Option<&'a str>,
    pub attributes: Vec<(&'a str, &'a str)>,
    pub raw: &'a str,
}

/// Token types produced by the tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token<'a> {
    /// Plain text content.
    Text(&'a str),
    /// Opening tag: `[tagname]`, `[tagname=value]`, `[tagname key=value]`
    OpenTag(OpenTag<'a>),
    /// Closing tag: `[/tagname]`, with its raw text.
    CloseTag { name: &'a str, raw: &'a str },
    /// Invalid tag syntax (passed through as text).
    InvalidTag(&'a str),
}

impl<'a> Token<'a> {
    /// The source text this token covers.
    pub fn raw(&self) -> &'a str {
        match self {
            Token::Text(text) | Token::InvalidTag(text) => text,
            Token::OpenTag(open) => open.raw,
            Token::CloseTag { raw, .. } => raw,
        }
    }
}

pub(crate) struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
}

enum TagEnd {
    /// Byte index of the `]` that closes the tag.
    Close(usize),
    /// Another `[` starts before this one is closed.
    Nested(usize),
    Missing,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Checks if a string is a valid tag name (CSS identifier rules).
    ///
    /// Attribute keys follow the same rule.
    pub fn is_valid_tag_name(s: &str) -> bool {
        let mut chars = s.chars();
        let Some(first) = chars.next() else {
            return false;
        };

        // First char must be letter or underscore
        if !first.is_ascii_lowercase() && first != '_' {
            return false;
        }

        chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
    }

    /// Finds where the tag starting at `s[0] == '['` ends.
    ///
    /// With `quoted` set, a `"` or `'` directly after `=` opens a quoted value
    /// in which `]` and `[` are literal. A quoted value never runs past a
    /// close tag: reaching `[/` inside one gives up with `Missing`.
    fn find_tag_end(s: &str, quoted: bool) -> TagEnd {
        let mut quote: Option<char> = None;
        let mut prev = '[';
        for (i, c) in s.char_indices().skip(1) {
            match quote {
                Some(q) if c == q => quote = None,
                Some(_) if c == '[' && s[i + 1..].starts_with('/') => return TagEnd::Missing,
                Some(_) => {}
                None => match c {
                    ']' => return TagEnd::Close(i),
                    '[' => return TagEnd::Nested(i),
                    '"' | '\'' if quoted && prev == '=' => quote = Some(c),
                    _ => {}
                },
            }
            prev = c;
        }
        TagEnd::Missing
    }

    /// Classifies a complete `[...]` span.
    fn classify(full: &'a str) -> Token<'a> {
        let content = &full[1..full.len() - 1];

        if let Some(name) = content.strip_prefix('/') {
            return if Self::is_valid_tag_name(name) {
                Token::CloseTag { name, raw: full }
            } else {
                Token::InvalidTag(full)
            };
        }

        match parse_open_tag(content) {
            Some((name, attribute, attributes)) => Token::OpenTag(OpenTag {
                name,
                attribute,
                attributes,
                raw: full,
            }),
            None => Token::InvalidTag(full),
        }
    }
}

/// Parses the inside of an opening tag: `name`, then an optional `=value`,
/// then whitespace-separated `key=value` pairs.
#[allow(clippy::type_complexity)]
fn parse_open_tag(content: &str) -> Option<(&str, Option<&str>, Vec<(&str, &str)>)> {
    let name_end = content
        .find(|c: char| c == '=' || c.is_whitespace())
        .unwrap_or(content.len());
    let name = &content[..name_end];
    if !Tokenizer::is_valid_tag_name(name) {
        return None;
    }

    let mut rest = &content[name_end..];
    let mut attribute = None;
    if let Some(value_start) = rest.strip_prefix('=') {
        let (value, remaining) = take_value(value_start)?;
        attribute = Some(value);
        rest = remaining;
    }

    let mut attributes = Vec::new();
    loop {
        let trimmed = rest.trim_start();
        if trimmed.is_empty() {
            break;
        }
        // Pairs must be separated by whitespace: `[a x="1"y=2]` is not a tag.
        if trimmed.len() == rest.len() {
            return None;
        }
        let key_end = trimmed.find('=')?;
        let key = &trimmed[..key_end];
        if !Tokenizer::is_valid_tag_name(key) {
            return None;
        }
        let (value, remaining) = take_value(&trimmed[key_end + 1..])?;
        attributes.push((key, value));
        rest = remaining;
    }

    Some((name, attribute, attributes))
}

/// Reads one attribute value: quoted (quotes stripped, may be empty) or bare
/// (up to the next whitespace, never empty). A quote that is never closed
/// runs to the end of the tag.
fn take_value(input: &str) -> Option<(&str, &str)> {
    match input.chars().next() {
        Some(q @ ('"' | '\'')) => {
            let body = &input[1..];
            match body.find(q) {
                Some(end) => Some((&body[..end], &body[end + 1..])),
                None => Some((body, "")),
            }
        }
        Some(c) if !c.is_whitespace() => {
            let end = input.find(char::is_whitespace).unwrap_or(input.len());
            Some((&input[..end], &input[end..]))
        }
        _ => None,
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.input.len() {
            return None;
        }

        let remaining = &self.input[self.pos..];

        // Look for the next '['
        let bracket_pos = match remaining.find('[') {
            Some(pos) => pos,
            None => {
                // No more brackets - rest is text
                self.pos = self.input.len();
                return Some(Token::Text(remaining));
            }
        };

        if bracket_pos > 0 {
            self.pos += bracket_pos;
            return Some(Token::Text(&remaining[..bracket_pos]));
        }

        let end = match Self::find_tag_end(remaining, true) {
            // An unbalanced quote, or one crossing a close tag; retry without quoting.
            TagEnd::Missing => Self::find_tag_end(remaining, false),
            found => found,
        };

        match end {
            TagEnd::Close(close) => {
                self.pos += close + 1;
                Some(Self::classify(&remaining[..=close]))
            }
            TagEnd::Nested(next) => {
                self.pos += next;
                Some(Token::Text(&remaining[..next]))
            }
            TagEnd::Missing => {
                // No closing bracket - rest is text
                self.pos = self.input.len();
                Some(Token::Text(remaining))
            }
        }
    }
}
