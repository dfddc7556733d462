use notesync::{Token, classify, extract_headings, split_lines, tokenize};

const OUTLINE: &str = "\
intro paragraph

# top level

## non-leaf heading 1 #tag_a/tag_b #tag_c

### leaf under non-leaf

some content

## leaf heading 2

more content

# another top { key=value }
";

fn parsed(text: &str) -> Vec<notesync::HeadingNode> {
    let tokens = tokenize(text).unwrap();
    let mut nodes = extract_headings(&tokens);
    classify(&mut nodes, split_lines(text).len());
    nodes
}

#[test]
fn every_paired_heading_event_becomes_a_node() {
    let tokens = tokenize(OUTLINE).unwrap();
    let pairs = tokens
        .iter()
        .enumerate()
        .filter(|(index, token)| {
            matches!(token, Token::HeadingOpen { .. })
                && matches!(tokens.get(index + 1), Some(Token::Inline { .. }))
        })
        .count();
    assert_eq!(extract_headings(&tokens).len(), pairs);
    assert_eq!(pairs, 5);
}

#[test]
fn heading_open_without_inline_is_skipped() {
    let tokens = vec![
        Token::HeadingOpen {
            level: 1,
            start_line: 0,
            end_line: 1,
        },
        Token::Inline {
            text: "kept".to_string(),
        },
        Token::HeadingOpen {
            level: 2,
            start_line: 4,
            end_line: 5,
        },
    ];
    let nodes = extract_headings(&tokens);
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].title_text, "kept");
}

#[test]
fn titles_and_tags_are_extracted() {
    let nodes = parsed(OUTLINE);
    assert_eq!(nodes[1].title_text, "non-leaf heading 1");
    assert_eq!(nodes[1].tags, vec!["tag_a::tag_b", "tag_c"]);
    assert_eq!(nodes[4].title_text, "another top");
    assert!(nodes[4].tags.is_empty());
}

#[test]
fn leaf_marking_follows_the_nearest_next_heading() {
    let nodes = parsed(OUTLINE);
    let leaves: Vec<bool> = nodes.iter().map(|node| node.is_leaf).collect();
    // top (deeper follows), non-leaf 1 (deeper follows), leaf under it,
    // leaf heading 2, final top with nothing after.
    assert_eq!(leaves, vec![false, false, true, true, true]);
}

#[test]
fn body_spans_run_to_the_very_next_heading_at_any_depth() {
    let nodes = parsed(OUTLINE);
    for pair in nodes.windows(2) {
        assert_eq!(pair[0].body_end_line, pair[1].start_line);
        assert!(pair[0].start_line < pair[0].title_end_line);
        assert!(pair[0].title_end_line <= pair[0].body_end_line);
    }
    assert_eq!(
        nodes.last().unwrap().body_end_line,
        split_lines(OUTLINE).len()
    );
}

#[test]
fn duplicate_tags_are_preserved_in_order() {
    let nodes = parsed("# t #b #a #b\n");
    assert_eq!(nodes[0].tags, vec!["b", "a", "b"]);
}

#[test]
fn preamble_lines_belong_to_no_node() {
    let nodes = parsed(OUTLINE);
    assert_eq!(nodes[0].start_line, 2);
}
