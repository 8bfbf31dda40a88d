//! Indented text view of a parsed document, one node per line.
//!
//! ```text
//! "Hi "
//! [quote="Ann" author="x"]
//!   [b]
//!     "all"
//! [code] (verbatim)
//!   "[b]x[/b]"
//! ```

use tagsmith_bbparser::{Document, Node, TagNode, Tree};

const INDENT: &str = "  ";

pub fn outline(document: &Document) -> String {
    let mut lines = Vec::new();
    for node in document.children() {
        push_node(&mut lines, node, 0);
    }
    lines.join("\n")
}

fn push_node(lines: &mut Vec<String>, node: &Node, depth: usize) {
    let indent = INDENT.repeat(depth);
    match node {
        Node::Text(text) => lines.push(format!("{indent}{:?}", text.body())),
        Node::Tag(tag) => {
            lines.push(format!("{indent}{}", header(tag)));
            for child in tag.children() {
                push_node(lines, child, depth + 1);
            }
        }
    }
}

fn header(tag: &TagNode) -> String {
    let mut out = format!("[{}", tag.name());
    if let Some(attribute) = tag.attribute() {
        out.push_str(&format!("={attribute:?}"));
    }
    for (key, value) in tag.attributes() {
        out.push_str(&format!(" {key}={value:?}"));
    }
    out.push(']');
    if !tag.transform() {
        out.push_str(" (verbatim)");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use tagsmith_bbparser::Parser;

    #[test]
    fn test_outline_nesting() {
        let doc = Parser::new().parse("Hi [quote=Ann author=x][b]all[/b]\n[/quote]");
        assert_snapshot!(outline(&doc), @r#"
        "Hi "
        [quote="Ann" author="x"]
          [b]
            "all"
          "\n"
        "#);
    }

    #[test]
    fn test_outline_marks_verbatim_tags() {
        let doc = Parser::new()
            .with_no_transform(["code"])
            .parse("[code][b]x[/b][/code]");
        assert_eq!(outline(&doc), "[code] (verbatim)\n  \"[b]x[/b]\"");
    }

    #[test]
    fn test_outline_of_empty_document() {
        assert_eq!(outline(&Parser::new().parse("")), "");
    }

    #[test]
    fn test_malformed_markup_shows_as_text() {
        let doc = Parser::new().parse("[b]open [i]x[/i]");
        assert_eq!(outline(&doc), "\"[b]open \"\n[i]\n  \"x\"");
    }
}
