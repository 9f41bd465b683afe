//! Snapshot persistence for the whole board.
//!
//! # Responsibility
//! - Serialize the full note mapping to one document under a fixed key.
//! - Load that document at startup, dropping notes that already expired.
//!
//! # Invariants
//! - `load` never fails; missing or corrupt documents yield an empty map.
//! - Expired notes are never resurrected by `load`.
//! - `save` is a full replacement, never incremental.

use super::blob_store::BlobStore;
use super::PersistResult;
use crate::model::note::NoteMap;
use log::{info, warn};

pub struct PersistenceAdapter<S: BlobStore> {
    storage: S,
    key: String,
}

impl<S: BlobStore> PersistenceAdapter<S> {
    pub fn new(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Reads the persisted board, keeping only notes still live at `now_ms`.
    pub fn load(&self, now_ms: i64) -> NoteMap {
        let raw = match self.storage.read(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                info!("event=board_load module=persist status=empty reason=missing");
                return NoteMap::new();
            }
            Err(err) => {
                warn!(
                    "event=board_load module=persist status=recovered reason=read_failed error={err}"
                );
                return NoteMap::new();
            }
        };

        let parsed: NoteMap = match serde_json::from_str(&raw) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(
                    "event=board_load module=persist status=recovered reason=parse_failed bytes={} error={err}",
                    raw.len()
                );
                return NoteMap::new();
            }
        };

        let total = parsed.len();
        let live: NoteMap = parsed
            .into_iter()
            .filter(|(_, note)| !note.is_expired_at(now_ms))
            .collect();
        info!(
            "event=board_load module=persist status=ok notes={} dropped_expired={}",
            live.len(),
            total - live.len()
        );
        live
    }

    /// Writes the full mapping, replacing any previous document.
    pub fn save(&self, notes: &NoteMap) -> PersistResult<()> {
        let document = serde_json::to_string(notes)?;
        self.storage.write(&self.key, &document)
    }
}

#[cfg(test)]
mod tests {
    use super::PersistenceAdapter;
    use crate::persist::MemoryBlobStore;

    #[test]
    fn corrupt_document_loads_as_empty() {
        let storage = MemoryBlobStore::with_entry("k", "{not json");
        let adapter = PersistenceAdapter::new(storage, "k");
        assert!(adapter.load(0).is_empty());
    }

    #[test]
    fn structurally_wrong_document_loads_as_empty() {
        let storage = MemoryBlobStore::with_entry("k", "[1, 2, 3]");
        let adapter = PersistenceAdapter::new(storage, "k");
        assert!(adapter.load(0).is_empty());
    }

    #[test]
    fn missing_document_loads_as_empty() {
        let adapter = PersistenceAdapter::new(MemoryBlobStore::new(), "k");
        assert!(adapter.load(0).is_empty());
    }
}
