//! Deterministic re-serialization of a synced document.
//!
//! Non-leaf regions and the preamble are copied from the original lines
//! verbatim; leaf sections are re-emitted in canonical form (title line,
//! anchor block, normalized body, two blank separator lines). Rendering
//! the renderer's own output again, with no external changes in between,
//! reproduces it byte for byte.

use crate::doc::{HeadingNode, TAG_SEPARATOR};

/// Reassembles the full document from original lines and processed nodes.
pub fn render_document(lines: &[String], nodes: &[HeadingNode]) -> Vec<String> {
    let mut out = Vec::new();

    let preamble_end = nodes.first().map_or(lines.len(), |node| node.start_line);
    out.extend(lines[..preamble_end.min(lines.len())].iter().cloned());

    for node in nodes {
        if node.is_leaf {
            render_leaf(node, &mut out);
        } else {
            let end = node.body_end_line.min(lines.len());
            out.extend(lines[node.start_line..end].iter().cloned());
        }
    }

    // The two-blank-line section separator is not wanted at end of file.
    while out.last().is_some_and(|line| line.trim().is_empty()) {
        out.pop();
    }
    out
}

fn render_leaf(node: &HeadingNode, out: &mut Vec<String>) {
    out.push(title_line(node));
    if let Some(anchor) = node.anchor {
        out.push(String::new());
        out.push(anchor.link_line());
        out.push(String::new());
    }
    out.extend(node.other_content.iter().cloned());
    out.push(String::new());
    out.push(String::new());
}

/// Canonical heading line: hash marks, title, then tags.
fn title_line(node: &HeadingNode) -> String {
    let mut line = "#".repeat(node.level as usize);
    if !node.title_text.is_empty() {
        line.push(' ');
        line.push_str(&node.title_text);
    }
    if !node.tags.is_empty() {
        line.push(' ');
        let rendered: Vec<String> = node.tags.iter().map(|tag| render_tag(tag)).collect();
        line.push_str(&rendered.join(" "));
    }
    line
}

/// On-disk tag form: `#` plus the slash-separated path.
fn render_tag(tag: &str) -> String {
    format!("#{}", tag.replace(TAG_SEPARATOR, "/"))
}

/// Joins rendered lines into file content with a trailing newline.
pub fn join_lines(lines: &[String]) -> String {
    if lines.is_empty() {
        String::new()
    } else {
        let mut text = lines.join("\n");
        text.push('\n');
        text
    }
}
