//! Domain model for sticky notes on the board canvas.
//!
//! # Responsibility
//! - Define the persisted `Note` record and the inputs that create/edit it.
//! - Keep the wire shape compatible with existing persisted documents.
//!
//! # Invariants
//! - Every note is identified by an opaque, immutable `NoteId`.
//! - Rich-text and sketch payloads are opaque to core.

pub mod note;
