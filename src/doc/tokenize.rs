//! Adapter from the `markdown` crate's syntax tree to the heading token
//! stream the parser consumes.
//!
//! Only document-top-level headings produce events; a heading quoted
//! inside a blockquote or list is body prose, not a section boundary.

use super::Token;
use markdown::mdast::Node;
use markdown::{ParseOptions, to_mdast};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("markdown parse failed: {0}")]
    Markdown(String),
}

/// Tokenizes `source` into heading events with zero-based line spans.
pub fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let tree = to_mdast(source, &ParseOptions::default())
        .map_err(|message| ParseError::Markdown(message.to_string()))?;

    let mut tokens = Vec::new();
    let Node::Root(root) = tree else {
        return Ok(tokens);
    };
    for child in root.children {
        let Node::Heading(heading) = child else {
            continue;
        };
        let Some(position) = heading.position else {
            continue;
        };
        // mdast lines are one-based and inclusive; the half-open zero-based
        // span of the heading line(s) is [start - 1, end).
        let start_line = position.start.line - 1;
        let end_line = position.end.line;
        let inline = inline_text(source, position.start.offset, position.end.offset);
        tokens.push(Token::HeadingOpen {
            level: heading.depth,
            start_line,
            end_line,
        });
        tokens.push(Token::Inline { text: inline });
    }
    Ok(tokens)
}

/// Raw inline content of a heading: the first source line of its span with
/// the ATX marker stripped. Setext underlines fall outside the first line
/// and are dropped with the rest.
fn inline_text(source: &str, start: usize, end: usize) -> String {
    let raw = source.get(start..end).unwrap_or("");
    let first_line = raw.lines().next().unwrap_or("");
    first_line.trim_start_matches('#').trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atx_headings_produce_open_and_inline_pairs() {
        let tokens = tokenize("# One\n\nbody\n\n## Two #tag\n").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::HeadingOpen {
                    level: 1,
                    start_line: 0,
                    end_line: 1
                },
                Token::Inline {
                    text: "One".to_string()
                },
                Token::HeadingOpen {
                    level: 2,
                    start_line: 4,
                    end_line: 5
                },
                Token::Inline {
                    text: "Two #tag".to_string()
                },
            ]
        );
    }

    #[test]
    fn quoted_headings_are_not_section_boundaries() {
        let tokens = tokenize("# Top\n\n> # quoted\n").unwrap();
        assert_eq!(
            tokens
                .iter()
                .filter(|token| matches!(token, Token::HeadingOpen { .. }))
                .count(),
            1
        );
    }

    #[test]
    fn inline_keeps_literal_hash_prefixed_text() {
        let tokens = tokenize("# #tag_only\n").unwrap();
        assert_eq!(
            tokens[1],
            Token::Inline {
                text: "#tag_only".to_string()
            }
        );
    }
}
