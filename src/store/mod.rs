//! Note store boundary.
//!
//! The sync engine never talks to a concrete backend directly; it goes
//! through [`NoteStore`], which exposes the four operations the engine
//! needs: fetch, create, update, and revision re-fetch. Records cross the
//! boundary as the fixed-shape [`NoteRecord`], never as open-ended maps.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;

pub mod json;

pub use json::JsonStore;

/// Opaque numeric identifier a backend assigns to a record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NoteId(pub i64);

impl std::fmt::Display for NoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Monotonically non-decreasing modification stamp.
///
/// "Greater" means "more recently modified"; the total order on the inner
/// integer is the only comparison the sync engine performs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Revision(pub i64);

impl std::fmt::Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A record as seen at the store boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRecord {
    pub title: String,
    pub body: String,
    pub tags: Vec<String>,
    pub revision: Revision,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("note {0} not found")]
    NotFound(NoteId),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("store file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// The four operations the sync engine consumes.
///
/// Backends are synchronous request/response; the engine calls them one
/// node at a time in document order.
pub trait NoteStore {
    fn fetch(&self, id: NoteId) -> Result<NoteRecord, StoreError>;

    fn create(
        &mut self,
        title: &str,
        body: &str,
        tags: &[String],
    ) -> Result<(NoteId, Revision), StoreError>;

    fn update(
        &mut self,
        id: NoteId,
        title: &str,
        body: &str,
        tags: &[String],
    ) -> Result<(), StoreError>;

    fn revision(&self, id: NoteId) -> Result<Revision, StoreError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct StoredNote {
    title: String,
    body: String,
    tags: Vec<String>,
    revision: Revision,
}

/// Shared backing state for the in-memory and JSON-file stores.
///
/// Revisions come from a store-global counter that only advances when a
/// write actually changes record content, so an update that writes back
/// identical content leaves the record's revision untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct StoreState {
    next_id: i64,
    clock: i64,
    notes: BTreeMap<i64, StoredNote>,
}

impl Default for StoreState {
    fn default() -> Self {
        Self {
            next_id: 1,
            clock: 0,
            notes: BTreeMap::new(),
        }
    }
}

impl StoreState {
    fn fetch(&self, id: NoteId) -> Result<NoteRecord, StoreError> {
        let note = self.notes.get(&id.0).ok_or(StoreError::NotFound(id))?;
        Ok(NoteRecord {
            title: note.title.clone(),
            body: note.body.clone(),
            tags: note.tags.clone(),
            revision: note.revision,
        })
    }

    fn create(&mut self, title: &str, body: &str, tags: &[String]) -> (NoteId, Revision) {
        let id = NoteId(self.next_id);
        self.next_id += 1;
        self.clock += 1;
        let revision = Revision(self.clock);
        self.notes.insert(
            id.0,
            StoredNote {
                title: title.to_string(),
                body: body.to_string(),
                tags: tags.to_vec(),
                revision,
            },
        );
        (id, revision)
    }

    fn update(
        &mut self,
        id: NoteId,
        title: &str,
        body: &str,
        tags: &[String],
    ) -> Result<bool, StoreError> {
        let clock = self.clock;
        let note = self.notes.get_mut(&id.0).ok_or(StoreError::NotFound(id))?;
        if note.title == title && note.body == body && note.tags == tags {
            return Ok(false);
        }
        note.title = title.to_string();
        note.body = body.to_string();
        note.tags = tags.to_vec();
        note.revision = Revision(clock + 1);
        self.clock = clock + 1;
        Ok(true)
    }

    fn revision(&self, id: NoteId) -> Result<Revision, StoreError> {
        self.notes
            .get(&id.0)
            .map(|note| note.revision)
            .ok_or(StoreError::NotFound(id))
    }
}

/// In-memory backend, mainly for tests and examples.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: StoreState,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.state.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.notes.is_empty()
    }
}

impl NoteStore for MemoryStore {
    fn fetch(&self, id: NoteId) -> Result<NoteRecord, StoreError> {
        self.state.fetch(id)
    }

    fn create(
        &mut self,
        title: &str,
        body: &str,
        tags: &[String],
    ) -> Result<(NoteId, Revision), StoreError> {
        Ok(self.state.create(title, body, tags))
    }

    fn update(
        &mut self,
        id: NoteId,
        title: &str,
        body: &str,
        tags: &[String],
    ) -> Result<(), StoreError> {
        self.state.update(id, title, body, tags)?;
        Ok(())
    }

    fn revision(&self, id: NoteId) -> Result<Revision, StoreError> {
        self.state.revision(id)
    }
}
