//! Manual backup/restore envelope.
//!
//! The envelope wraps the live mapping with a format version and export time.
//! It is an exchange format only; the live document stays a bare mapping.

use super::{PersistError, PersistResult};
use crate::model::note::NoteMap;
use serde::{Deserialize, Serialize};

pub const BACKUP_FORMAT_VERSION: &str = "2.5";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupEnvelope {
    pub version: String,
    pub notes: NoteMap,
    /// Unix epoch milliseconds.
    pub exported_at: i64,
}

/// Renders `notes` as a pretty-printed backup document.
pub fn export_backup(notes: &NoteMap, now_ms: i64) -> PersistResult<String> {
    let envelope = BackupEnvelope {
        version: BACKUP_FORMAT_VERSION.to_string(),
        notes: notes.clone(),
        exported_at: now_ms,
    };
    Ok(serde_json::to_string_pretty(&envelope)?)
}

/// Extracts the notes of a backup document.
///
/// Older exports may lack `version`/`exportedAt`; only `notes` is required.
pub fn parse_backup(text: &str) -> PersistResult<NoteMap> {
    let value: serde_json::Value = serde_json::from_str(text)
        .map_err(|err| PersistError::InvalidBackup(format!("not JSON: {err}")))?;
    let notes = value
        .get("notes")
        .cloned()
        .ok_or_else(|| PersistError::InvalidBackup("missing `notes`".to_string()))?;
    serde_json::from_value(notes)
        .map_err(|err| PersistError::InvalidBackup(format!("malformed `notes`: {err}")))
}
