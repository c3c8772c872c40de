// Copyright 2025 the Sigil Authors
// SPDX-License-Identifier: Apache-2.0

//! Session snapshot persistence.
//!
//! One JSON blob under one fixed key. The projection that gets saved never
//! contains binary payloads (source document, signature raster, signed
//! result); those are memory-only for the lifetime of the process, a
//! deliberate size/confidentiality tradeoff. A missing or corrupt snapshot
//! is equivalent to "no prior session" and must never be fatal.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;

/// Fixed key / file stem the snapshot is stored under
pub const SNAPSHOT_KEY: &str = "pdf_signature_state";

/// Snapshot store failures. Logged by the session layer, never surfaced.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("snapshot io: {0}")]
    Io(#[from] io::Error),
}

/// A page-scoped key/value store holding the serialized session projection.
pub trait SnapshotStore {
    /// Load the stored snapshot, `None` when absent
    fn load(&self) -> Result<Option<String>, StoreError>;

    /// Replace the stored snapshot
    fn save(&mut self, snapshot: &str) -> Result<(), StoreError>;

    /// Remove the stored snapshot
    fn clear(&mut self) -> Result<(), StoreError>;
}

/// In-memory store; survives nothing past the process. Clones share the
/// same slot, the way every view of one page-scoped store sees the same
/// value. Used by tests and the demo binary.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    snapshot: Arc<Mutex<Option<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> MutexGuard<'_, Option<String>> {
        // A poisoned lock just means a test panicked mid-save; the stored
        // string is still usable.
        self.snapshot.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        Ok(self.slot().clone())
    }

    fn save(&mut self, snapshot: &str) -> Result<(), StoreError> {
        *self.slot() = Some(snapshot.to_owned());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        *self.slot() = None;
        Ok(())
    }
}

/// File-backed store: `<dir>/pdf_signature_state.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(format!("{SNAPSHOT_KEY}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for FileStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, snapshot: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, snapshot)?;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trip() {
        let mut store = MemoryStore::new();
        assert!(store.load().unwrap().is_none());

        store.save("{\"a\":1}").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("{\"a\":1}"));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn memory_store_clones_share_the_slot() {
        let mut store = MemoryStore::new();
        let view = store.clone();

        store.save("{}").unwrap();
        assert_eq!(view.load().unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn file_store_round_trip() {
        let dir = std::env::temp_dir().join("sigil-store-test");
        let _ = std::fs::remove_dir_all(&dir);

        let mut store = FileStore::new(&dir);
        assert!(store.load().unwrap().is_none());

        store.save("{\"page\":2}").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("{\"page\":2}"));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());

        // Clearing twice is fine
        store.clear().unwrap();
        let _ = std::fs::remove_dir_all(&dir);
    }
}
