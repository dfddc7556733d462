//! JSON-file-backed note store.
//!
//! One JSON document on disk holds the whole store: the id counter, the
//! revision clock, and every record. Each mutating call persists the state
//! by writing a temp file and renaming it over the old one, so a crash
//! mid-run never leaves a half-written store behind.

use super::{NoteId, NoteRecord, NoteStore, Revision, StoreError, StoreState};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    state: StoreState,
}

impl JsonStore {
    /// Opens the store at `path`, creating an empty one if the file does
    /// not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            serde_json::from_str(&fs::read_to_string(&path)?)?
        } else {
            StoreState::default()
        };
        Ok(Self { path, state })
    }

    fn persist(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_string_pretty(&self.state)?;
        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, payload)?;
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

impl NoteStore for JsonStore {
    fn fetch(&self, id: NoteId) -> Result<NoteRecord, StoreError> {
        self.state.fetch(id)
    }

    fn create(
        &mut self,
        title: &str,
        body: &str,
        tags: &[String],
    ) -> Result<(NoteId, Revision), StoreError> {
        let created = self.state.create(title, body, tags);
        self.persist()?;
        Ok(created)
    }

    fn update(
        &mut self,
        id: NoteId,
        title: &str,
        body: &str,
        tags: &[String],
    ) -> Result<(), StoreError> {
        let changed = self.state.update(id, title, body, tags)?;
        if changed {
            self.persist()?;
        }
        Ok(())
    }

    fn revision(&self, id: NoteId) -> Result<Revision, StoreError> {
        self.state.revision(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn reopen_sees_persisted_records() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.json");

        let id = {
            let mut store = JsonStore::open(&path).unwrap();
            let (id, _) = store
                .create("front", "back", &["tag_a".into()])
                .unwrap();
            id
        };

        let store = JsonStore::open(&path).unwrap();
        let record = store.fetch(id).unwrap();
        assert_eq!(record.title, "front");
        assert_eq!(record.body, "back");
        assert_eq!(record.tags, vec!["tag_a".to_string()]);
    }

    #[test]
    fn persist_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.json");
        let mut store = JsonStore::open(&path).unwrap();
        store.create("t", "", &[]).unwrap();

        assert!(path.exists());
        assert!(!dir.path().join("notes.tmp").exists());
    }

    #[test]
    fn ids_keep_advancing_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.json");

        let first = {
            let mut store = JsonStore::open(&path).unwrap();
            store.create("a", "", &[]).unwrap().0
        };
        let second = {
            let mut store = JsonStore::open(&path).unwrap();
            store.create("b", "", &[]).unwrap().0
        };
        assert!(second > first);
    }
}
