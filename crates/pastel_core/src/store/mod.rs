//! In-memory note store.
//!
//! # Responsibility
//! - Own the live note collection as the single source of truth.
//! - Assign identity, creation time, stacking order and initial placement.
//!
//! # Invariants
//! - Mutations are visible to the next read; there is no caching layer.
//! - Topmost is always `max(z_order)` over live notes.

pub mod note_store;
