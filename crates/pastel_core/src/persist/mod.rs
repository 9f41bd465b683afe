//! Board persistence: blob storage, snapshot adapter and backup envelope.
//!
//! # Responsibility
//! - Save and load the full note mapping as one serialized document.
//! - Produce and parse the manual backup format.
//!
//! # Invariants
//! - Loading never fails; unusable data degrades to an empty board.
//! - Persistence only ever receives snapshots and never mutates the store.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod adapter;
pub mod backup;
pub mod blob_store;

pub use adapter::PersistenceAdapter;
pub use backup::{export_backup, parse_backup, BackupEnvelope, BACKUP_FORMAT_VERSION};
pub use blob_store::{BlobStore, MemoryBlobStore, SqliteBlobStore};

pub type PersistResult<T> = Result<T, PersistError>;

/// Persistence and backup failures.
#[derive(Debug)]
pub enum PersistError {
    /// Storage backend failure.
    Db(DbError),
    /// Document could not be encoded or decoded.
    Serde(serde_json::Error),
    /// Backup text is not a usable envelope.
    InvalidBackup(String),
    /// Storage refused the write (quota, read-only medium, ...).
    Unavailable(String),
}

impl Display for PersistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serde(err) => write!(f, "invalid board document: {err}"),
            Self::InvalidBackup(message) => write!(f, "invalid backup: {message}"),
            Self::Unavailable(message) => write!(f, "storage unavailable: {message}"),
        }
    }
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serde(err) => Some(err),
            Self::InvalidBackup(_) | Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for PersistError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for PersistError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for PersistError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde(value)
    }
}
