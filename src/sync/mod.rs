//! Per-section sync engine and the whole-document pipeline.
//!
//! For every leaf node the engine decides one of three directions by
//! comparing the locally recorded revision with the store's current one:
//!
//! - **create** - no anchor yet; a fresh record is made and the node gains
//!   an anchor.
//! - **pull** - the store's revision is strictly newer than the recorded
//!   one; the store is authoritative and overwrites the node.
//! - **push** - anything else; local text overwrites the record.
//!
//! The revision comparison is the only concurrency mechanism there is. An
//! external edit landing between our fetch and our update goes undetected;
//! that window is a documented property of the protocol, not something the
//! engine tries to close.

use crate::doc::{
    self, Anchor, AnchorError, HeadingNode, ParseError, attach_anchor, classify,
    extract_headings, split_lines, tokenize,
};
use crate::render::{join_lines, render_document};
use crate::store::{NoteId, NoteStore, StoreError};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// A new record was created and its id written into the anchor.
    Created { id: NoteId },
    /// Local content was written to the store. `changed` is false when the
    /// store's revision did not move, meaning the write had no effect.
    Pushed { changed: bool },
    /// The store was newer; node content was overwritten from the record.
    Pulled,
}

/// What a sync would do for one leaf, without doing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedAction {
    pub title: String,
    pub action: Plan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plan {
    Create,
    Push,
    Pull,
    /// The anchor references an id the store does not know. A real sync
    /// aborts on this; status just reports it.
    Missing,
}

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Anchor(#[from] AnchorError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("referenced note {id} not found in the store")]
    NoteNotFound { id: NoteId },
}

/// Outcome of a full-document run.
#[derive(Debug)]
pub struct SyncReport {
    /// The re-rendered document text.
    pub output: String,
    /// One entry per processed leaf, in document order.
    pub outcomes: Vec<(String, SyncOutcome)>,
}

/// Runs the whole pipeline on `text`: parse, classify, split, sync every
/// leaf in document order, and re-render.
///
/// Parse-shape errors (multiple anchors, malformed anchor) abort before
/// the first store call. A store-consistency error aborts mid-run; store
/// writes already made for earlier nodes stay, and the caller must not
/// write the output text.
pub fn sync_text(text: &str, store: &mut dyn NoteStore) -> Result<SyncReport, SyncError> {
    let lines = split_lines(text);
    let mut nodes = parse_nodes(text, &lines)?;
    let outcomes = sync_document(&mut nodes, store)?;
    let output = join_lines(&render_document(&lines, &nodes));
    Ok(SyncReport { output, outcomes })
}

/// Parse, classify, and anchor-split; shared by sync and status.
pub fn parse_nodes(text: &str, lines: &[String]) -> Result<Vec<HeadingNode>, SyncError> {
    let tokens = tokenize(text)?;
    let mut nodes = extract_headings(&tokens);
    classify(&mut nodes, lines.len());
    for node in nodes.iter_mut().filter(|node| node.is_leaf) {
        attach_anchor(lines, node)?;
    }
    Ok(nodes)
}

/// Syncs every leaf node against the store, mutating nodes in place.
pub fn sync_document(
    nodes: &mut [HeadingNode],
    store: &mut dyn NoteStore,
) -> Result<Vec<(String, SyncOutcome)>, SyncError> {
    let mut outcomes = Vec::new();
    for node in nodes.iter_mut().filter(|node| node.is_leaf) {
        let outcome = sync_node(node, store)?;
        outcomes.push((node.title_text.clone(), outcome));
    }
    Ok(outcomes)
}

fn sync_node(node: &mut HeadingNode, store: &mut dyn NoteStore) -> Result<SyncOutcome, SyncError> {
    match node.anchor {
        None => {
            let (id, _) = store.create(&node.title_text, &node.body_text(), &node.tags)?;
            let revision = store.revision(id)?;
            node.anchor = Some(Anchor {
                id,
                revision: Some(revision),
            });
            info!(id = id.0, title = %node.title_text, "created note");
            Ok(SyncOutcome::Created { id })
        }
        Some(mut anchor) => {
            let record = match store.fetch(anchor.id) {
                Ok(record) => record,
                Err(StoreError::NotFound(id)) => {
                    return Err(SyncError::NoteNotFound { id });
                }
                Err(err) => return Err(err.into()),
            };

            let store_is_newer = anchor
                .revision
                .is_some_and(|local| record.revision > local);

            if store_is_newer {
                // The store is authoritative; no write happens.
                node.title_text = record.title;
                node.tags = record.tags;
                node.other_content = doc::split_body(&record.body);
                anchor.revision = Some(record.revision);
                node.anchor = Some(anchor);
                info!(id = anchor.id.0, revision = record.revision.0, "pulled note");
                Ok(SyncOutcome::Pulled)
            } else {
                store.update(anchor.id, &node.title_text, &node.body_text(), &node.tags)?;
                let after = store.revision(anchor.id)?;
                let changed = after != record.revision;
                if changed {
                    info!(id = anchor.id.0, revision = after.0, "pushed note");
                } else {
                    debug!(id = anchor.id.0, "push made no effective change");
                }
                anchor.revision = Some(after);
                node.anchor = Some(anchor);
                Ok(SyncOutcome::Pushed { changed })
            }
        }
    }
}

/// Read-only version of the per-leaf decision, for status reporting.
pub fn plan_document(
    nodes: &[HeadingNode],
    store: &dyn NoteStore,
) -> Result<Vec<PlannedAction>, SyncError> {
    let mut planned = Vec::new();
    for node in nodes.iter().filter(|node| node.is_leaf) {
        let action = match node.anchor {
            None => Plan::Create,
            Some(anchor) => match store.fetch(anchor.id) {
                Ok(record) => {
                    if anchor.revision.is_some_and(|local| record.revision > local) {
                        Plan::Pull
                    } else {
                        Plan::Push
                    }
                }
                Err(StoreError::NotFound(_)) => Plan::Missing,
                Err(err) => return Err(err.into()),
            },
        };
        planned.push(PlannedAction {
            title: node.title_text.clone(),
            action,
        });
    }
    Ok(planned)
}
