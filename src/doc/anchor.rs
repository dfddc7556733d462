//! Anchor locating and body splitting.
//!
//! An anchor is the one machine-readable line inside a section body that
//! ties the section to a store record: a link labelled `note` whose target
//! is a `note://store/notes/` URL carrying an `id` and optionally a
//! `revision` query parameter. Everything else in the body is
//! human-authored prose and must pass through untouched.

use super::{HeadingNode, trim_blank_edges};
use crate::store::{NoteId, Revision};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

pub const ANCHOR_LABEL: &str = "note";
pub const ANCHOR_SCHEME: &str = "note";
pub const ANCHOR_HOST: &str = "store";
pub const ANCHOR_PATH: &str = "/notes/";

/// A line that is nothing but a `[note](...)` link.
static ANCHOR_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\[note\]\(([^()\s]+)\)\s*$").expect("anchor pattern"));

/// The embedded cross-reference between a section and a store record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub id: NoteId,
    /// Last revision this file has seen; absent until a sync completes.
    pub revision: Option<Revision>,
}

impl Anchor {
    /// Canonical single-line rendering of the anchor link.
    pub fn link_line(&self) -> String {
        let mut url = format!(
            "{ANCHOR_SCHEME}://{ANCHOR_HOST}{ANCHOR_PATH}?id={}",
            self.id
        );
        if let Some(revision) = self.revision {
            url.push_str(&format!("&revision={revision}"));
        }
        format!("[{ANCHOR_LABEL}]({url})")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnchorError {
    #[error("section at line {heading_line} contains more than one anchor link")]
    MultipleAnchors { heading_line: usize },
    #[error("anchor link at line {line} is missing the id parameter")]
    MissingId { line: usize },
    #[error("anchor link at line {line} has a malformed {parameter} value")]
    MalformedParameter { line: usize, parameter: &'static str },
}

/// Scans the node's body for an anchor link and splits the body into
/// anchor and other content.
///
/// At most one anchor may exist per section; a second match is a hard
/// error before any store interaction happens. A matching link missing its
/// `id` parameter is likewise rejected.
pub fn attach_anchor(lines: &[String], node: &mut HeadingNode) -> Result<(), AnchorError> {
    let range_start = node.title_end_line;
    let range_end = node.body_end_line.min(lines.len());

    let mut found: Option<(usize, Anchor)> = None;
    for index in range_start..range_end {
        let Some(caps) = ANCHOR_LINE_RE.captures(&lines[index]) else {
            continue;
        };
        let Some(anchor) = parse_anchor_url(&caps[1], index)? else {
            continue;
        };
        if found.is_some() {
            return Err(AnchorError::MultipleAnchors {
                heading_line: node.start_line,
            });
        }
        found = Some((index, anchor));
    }

    let consumed = match found {
        Some((index, anchor)) => {
            node.anchor = Some(anchor);
            // A standalone anchor (blank line on both sides within the
            // body) owns the blank line after it.
            let standalone = index > range_start
                && index + 1 < range_end
                && lines[index - 1].trim().is_empty()
                && lines[index + 1].trim().is_empty();
            if standalone {
                index..index + 2
            } else {
                index..index + 1
            }
        }
        None => range_start..range_start,
    };

    let mut content: Vec<String> = (range_start..range_end)
        .filter(|index| !consumed.contains(index))
        .map(|index| lines[index].clone())
        .collect();
    trim_blank_edges(&mut content);
    node.other_content = content;
    Ok(())
}

/// Parses a candidate link target. `Ok(None)` means the link is ordinary
/// prose, not an anchor; errors are reserved for links that are anchors by
/// scheme and host but malformed.
fn parse_anchor_url(target: &str, line: usize) -> Result<Option<Anchor>, AnchorError> {
    let Ok(url) = Url::parse(target) else {
        return Ok(None);
    };
    if url.scheme() != ANCHOR_SCHEME
        || url.host_str() != Some(ANCHOR_HOST)
        || url.path() != ANCHOR_PATH
    {
        return Ok(None);
    }

    let mut id = None;
    let mut revision = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "id" => {
                id = Some(value.parse::<i64>().map_err(|_| {
                    AnchorError::MalformedParameter {
                        line,
                        parameter: "id",
                    }
                })?);
            }
            "revision" => {
                revision = Some(value.parse::<i64>().map_err(|_| {
                    AnchorError::MalformedParameter {
                        line,
                        parameter: "revision",
                    }
                })?);
            }
            _ => {}
        }
    }

    let Some(id) = id else {
        return Err(AnchorError::MissingId { line });
    };
    Ok(Some(Anchor {
        id: NoteId(id),
        revision: revision.map(Revision),
    }))
}
