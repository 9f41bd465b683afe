//! Core engine for the Pastel sticky-note board.
//! This crate owns note lifecycle, persistence, expiry and drag invariants;
//! presentation layers only raise intents and render `render_list()`.

pub mod board;
pub mod clock;
pub mod config;
pub mod countdown;
pub mod db;
pub mod drag;
pub mod logging;
pub mod model;
pub mod persist;
pub mod store;
pub mod sweeper;

pub use board::{Board, StoreChange};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{BoardConfig, Viewport};
pub use countdown::TimeLeft;
pub use drag::{DragCommit, DragController, DragError, DragFrame, DragStart, PointerTarget};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::note::{Note, NoteId, NoteInput, NoteKind, NoteMap, NotePatch, Point};
pub use persist::{
    BlobStore, MemoryBlobStore, PersistError, PersistResult, PersistenceAdapter, SqliteBlobStore,
};
pub use store::note_store::NoteStore;
pub use sweeper::{ExpirySweeper, SweepOutcome};

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
