//! Heading model, parser, and hierarchy classifier.
//!
//! This module turns a tokenized markdown outline into an ordered list of
//! [`HeadingNode`]s with precise line spans. Parsing is a sequence of
//! passes, each filling in a designated part of the node:
//!
//! - [`extract_headings`] - levels, line spans, titles, tags
//! - [`classify`] - leaf flags and body end lines
//! - [`anchor::attach_anchor`] - embedded anchor link and body content
//!
//! The markdown tokenizer itself is an external concern; [`tokenize`]
//! adapts the `markdown` crate's syntax tree into the [`Token`] stream the
//! parser consumes.

use regex::Regex;
use std::sync::LazyLock;

pub mod anchor;
pub mod tokenize;

pub use anchor::{Anchor, AnchorError, attach_anchor};
pub use tokenize::{ParseError, tokenize};

/// In-memory hierarchical tag separator; `/` on disk, `::` in memory.
pub const TAG_SEPARATOR: &str = "::";

/// `#tag` or `#parent/child` tokens inside heading inline text.
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#([\w/]+)").expect("tag pattern"));

/// Trailing `{ ... }` attribute block on a heading line.
static ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^{}]*\}\s*$").expect("attribute pattern"));

/// Tokenizer events the heading parser consumes.
///
/// Line numbers are zero-based; `start_line..end_line` is the half-open
/// span of the heading line(s) themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    HeadingOpen {
        level: u8,
        start_line: usize,
        end_line: usize,
    },
    Inline {
        text: String,
    },
}

/// One heading and its body region.
///
/// Constructed once per run by [`extract_headings`], refined by
/// [`classify`] and [`attach_anchor`], mutated in place by the sync
/// engine, and consumed by the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingNode {
    pub level: u8,
    pub start_line: usize,
    /// Exclusive end of the heading line(s); first line of the body.
    pub title_end_line: usize,
    /// Exclusive end of the body region: the next heading's start line at
    /// any depth, or end of file. Filled by [`classify`].
    pub body_end_line: usize,
    /// Heading text with tags and attribute blocks stripped.
    pub title_text: String,
    /// Tags in first-seen order, duplicates preserved, `::`-separated.
    pub tags: Vec<String>,
    /// Filled by [`classify`].
    pub is_leaf: bool,
    /// Filled by [`attach_anchor`], for leaf nodes only.
    pub anchor: Option<Anchor>,
    /// Body lines minus the anchor span, blank edges stripped, no line
    /// terminators. Filled by [`attach_anchor`].
    pub other_content: Vec<String>,
}

/// Splits raw text into terminator-free lines.
///
/// A trailing newline does not produce a trailing empty line, so the line
/// indices match the tokenizer's line numbers.
pub fn split_lines(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect();
    if text.ends_with('\n') {
        lines.pop();
    }
    lines
}

/// Pairs `HeadingOpen` tokens with their following `Inline` content and
/// builds one node per pair.
///
/// A `HeadingOpen` with no following `Inline` token is malformed tokenizer
/// output; the node is skipped.
pub fn extract_headings(tokens: &[Token]) -> Vec<HeadingNode> {
    let mut nodes = Vec::new();
    for (index, token) in tokens.iter().enumerate() {
        let Token::HeadingOpen {
            level,
            start_line,
            end_line,
        } = *token
        else {
            continue;
        };
        let Some(Token::Inline { text }) = tokens.get(index + 1) else {
            continue;
        };
        nodes.push(HeadingNode {
            level,
            start_line,
            title_end_line: end_line,
            body_end_line: end_line,
            title_text: strip_title(text),
            tags: extract_tags(text),
            is_leaf: false,
            anchor: None,
            other_content: Vec::new(),
        });
    }
    nodes
}

/// Tags in order of appearance, slashes converted to [`TAG_SEPARATOR`].
/// Duplicates are kept.
fn extract_tags(inline: &str) -> Vec<String> {
    TAG_RE
        .captures_iter(inline)
        .map(|caps| caps[1].replace('/', TAG_SEPARATOR))
        .collect()
}

/// Title text with the attribute block and all tag tokens removed.
fn strip_title(inline: &str) -> String {
    let without_attrs = ATTR_RE.replace_all(inline, "");
    let without_tags = TAG_RE.replace_all(&without_attrs, "");
    without_tags.trim().to_string()
}

/// Marks leaves and computes body spans.
///
/// A node is a leaf iff the nearest following node is not strictly deeper
/// (or there is none). Every node's body runs to the very next heading at
/// any depth, or to end of file; children are separate nodes in the same
/// flat list and are processed independently.
pub fn classify(nodes: &mut [HeadingNode], total_lines: usize) {
    let levels: Vec<u8> = nodes.iter().map(|node| node.level).collect();
    let starts: Vec<usize> = nodes.iter().map(|node| node.start_line).collect();
    for (index, node) in nodes.iter_mut().enumerate() {
        node.is_leaf = match levels.get(index + 1) {
            Some(&next_level) => next_level <= levels[index],
            None => true,
        };
        node.body_end_line = starts.get(index + 1).copied().unwrap_or(total_lines);
    }
}

/// Drops blank lines from both ends of a body.
pub(crate) fn trim_blank_edges(lines: &mut Vec<String>) {
    while lines.first().is_some_and(|line| line.trim().is_empty()) {
        lines.remove(0);
    }
    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }
}

/// Splits a store body field back into normalized content lines.
pub(crate) fn split_body(body: &str) -> Vec<String> {
    let mut lines: Vec<String> = body.split('\n').map(str::to_string).collect();
    trim_blank_edges(&mut lines);
    lines
}

impl HeadingNode {
    /// Body content joined the way it is pushed to the store.
    pub fn body_text(&self) -> String {
        self.other_content.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_lines_drops_trailing_newline_only() {
        assert_eq!(split_lines("a\nb\n"), vec!["a", "b"]);
        assert_eq!(split_lines("a\nb"), vec!["a", "b"]);
        assert_eq!(split_lines("a\r\nb\r\n"), vec!["a", "b"]);
        assert_eq!(split_lines("a\n\n"), vec!["a", ""]);
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn tags_keep_order_and_duplicates() {
        assert_eq!(extract_tags("title #b #a/c #b"), vec!["b", "a::c", "b"]);
    }

    #[test]
    fn title_strips_tags_and_attribute_block() {
        assert_eq!(strip_title("My title #tag_a { key=1 }"), "My title");
        assert_eq!(strip_title("#only/tags"), "");
        assert_eq!(strip_title("  plain  "), "plain");
    }
}
