//! notesync: bidirectional sync between a markdown outline and a note store.
//!
//! Each leaf section of the outline corresponds to one external record.
//! A run parses the text into heading nodes, locates the embedded anchor
//! link in each leaf body, decides per section whether to create, push, or
//! pull, and re-renders the document:
//!
//! - **Heading model & parser** - [`doc`]
//! - **Anchor locating** - [`doc::anchor`]
//! - **Sync engine** - [`sync`]
//! - **Renderer** - [`render`]
//! - **Note store boundary** - [`store`]
//!
//! # Quick Start
//!
//! ```rust
//! use notesync::{MemoryStore, sync_text};
//!
//! let mut store = MemoryStore::new();
//! let report = sync_text("# Title #tag\n\nbody\n", &mut store).unwrap();
//! assert!(report.output.contains("[note]("));
//! ```

// Heading model, tokenizer adapter, parser, classifier, anchor locator
pub mod doc;

// Renderer
pub mod render;

// Note store boundary and backends
pub mod store;

// Per-section sync engine and document pipeline
pub mod sync;

// Re-export doc types
pub use doc::{
    Anchor, AnchorError, HeadingNode, ParseError, TAG_SEPARATOR, Token, attach_anchor,
    classify, extract_headings, split_lines, tokenize,
};

// Re-export render entry points
pub use render::{join_lines, render_document};

// Re-export store types
pub use store::{JsonStore, MemoryStore, NoteId, NoteRecord, NoteStore, Revision, StoreError};

// Re-export sync types
pub use sync::{
    Plan, PlannedAction, SyncError, SyncOutcome, SyncReport, parse_nodes, plan_document,
    sync_document, sync_text,
};
