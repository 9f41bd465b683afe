//! Note store implementation.
//!
//! # Responsibility
//! - Provide create/replace, remove, raise and ordered listing of notes.
//! - Provide the batch operations used by sweep, drag commit and restore.
//!
//! # Invariants
//! - `id` is unique across live notes.
//! - Fresh notes and raised notes get `current_max_z() + 1`.
//! - `list()` is ascending by `z_order`, ties broken by id.
//! - Edits never change `id`, `created_at` or `kind`.

use crate::config::Viewport;
use crate::model::note::{Note, NoteId, NoteInput, NoteMap, Point};
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

/// Placement band for automatically positioned notes.
const PLACEMENT_MIN_X: f64 = 50.0;
const PLACEMENT_MIN_Y: f64 = 100.0;
/// Room reserved for the card and its chrome.
const PLACEMENT_RESERVE_X: f64 = 300.0;
const PLACEMENT_RESERVE_Y: f64 = 400.0;

/// Single owner of live notes.
pub struct NoteStore {
    notes: NoteMap,
    viewport: Viewport,
    rng: StdRng,
}

impl NoteStore {
    /// Creates an empty store placing new notes inside `viewport`.
    pub fn new(viewport: Viewport) -> Self {
        Self::with_rng(viewport, StdRng::from_os_rng())
    }

    /// Creates an empty store with deterministic placement.
    pub fn with_seed(viewport: Viewport, seed: u64) -> Self {
        Self::with_rng(viewport, StdRng::seed_from_u64(seed))
    }

    fn with_rng(viewport: Viewport, rng: StdRng) -> Self {
        Self {
            notes: NoteMap::new(),
            viewport,
            rng,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Updates the placement area, e.g. after a window resize.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Creates a note or replaces an existing one.
    ///
    /// # Contract
    /// - Without `id`: fresh UUID, `created_at = now_ms`,
    ///   `z_order = current_max_z() + 1`, supplied or random position.
    /// - With a known `id`: keeps `created_at` and `kind`; keeps `z_order` and
    ///   `position` unless supplied; overwrites every other field.
    /// - With an unknown `id`: created as fresh, keeping that id.
    /// - Input is stored as given. Payload/kind mismatches are only logged.
    pub fn upsert(&mut self, input: NoteInput, now_ms: i64) -> Note {
        let existing = input.id.as_ref().and_then(|id| self.notes.get(id)).cloned();

        let note = match existing {
            Some(existing) => {
                if existing.kind != input.kind {
                    warn!(
                        "event=note_upsert module=store status=ignored reason=kind_immutable note_id={} kind={} requested={}",
                        existing.id,
                        existing.kind.as_str(),
                        input.kind.as_str()
                    );
                }
                Note {
                    id: existing.id,
                    kind: existing.kind,
                    content: input.content,
                    sketch_image: input.sketch_image,
                    sketch_stroke_color: input.sketch_stroke_color,
                    background_style: input.background_style,
                    emoji: input.emoji,
                    created_at: existing.created_at,
                    expires_at: input.expires_at,
                    z_order: input.z_order.unwrap_or(existing.z_order),
                    position: input.position.unwrap_or(existing.position),
                }
            }
            None => {
                let id = input.id.unwrap_or_else(|| Uuid::new_v4().to_string());
                let z_order = self.next_z();
                let position = match input.position {
                    Some(position) => position,
                    None => self.random_position(),
                };
                Note {
                    id,
                    kind: input.kind,
                    content: input.content,
                    sketch_image: input.sketch_image,
                    sketch_stroke_color: input.sketch_stroke_color,
                    background_style: input.background_style,
                    emoji: input.emoji,
                    created_at: now_ms,
                    expires_at: input.expires_at,
                    z_order,
                    position,
                }
            }
        };

        if !note.payload_matches_kind() {
            warn!(
                "event=note_upsert module=store status=warn reason=payload_kind_mismatch note_id={} kind={}",
                note.id,
                note.kind.as_str()
            );
        }
        debug!(
            "event=note_upsert module=store status=ok note_id={} z_order={}",
            note.id, note.z_order
        );

        self.notes.insert(note.id.clone(), note.clone());
        note
    }

    /// Deletes a note. Returns `false` when it was already absent.
    pub fn remove(&mut self, id: &str) -> bool {
        self.notes.remove(id).is_some()
    }

    /// Moves a note to the top of the stack and returns its new `z_order`.
    pub fn raise(&mut self, id: &str) -> Option<i64> {
        if !self.notes.contains_key(id) {
            return None;
        }
        let next = self.next_z();
        let note = self.notes.get_mut(id)?;
        note.z_order = next;
        Some(next)
    }

    /// Returns live notes ordered bottom-to-top.
    pub fn list(&self) -> Vec<Note> {
        let mut notes: Vec<Note> = self.notes.values().cloned().collect();
        notes.sort_by(|a, b| a.z_order.cmp(&b.z_order).then_with(|| a.id.cmp(&b.id)));
        notes
    }

    /// Returns the highest `z_order`, or 0 for an empty store.
    pub fn current_max_z(&self) -> i64 {
        self.notes.values().map(|note| note.z_order).max().unwrap_or(0)
    }

    pub fn get(&self, id: &str) -> Option<&Note> {
        self.notes.get(id)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Copy of the full mapping for persistence.
    pub fn snapshot(&self) -> NoteMap {
        self.notes.clone()
    }

    /// Writes the final position and stacking order of a drag gesture.
    ///
    /// Returns `false` when the note no longer exists; nothing is recreated.
    pub fn commit_position(&mut self, id: &str, position: Point, z_order: i64) -> bool {
        match self.notes.get_mut(id) {
            Some(note) => {
                note.position = position;
                note.z_order = z_order;
                true
            }
            None => false,
        }
    }

    /// Removes every note expired at `now_ms` in one pass.
    pub fn remove_expired(&mut self, now_ms: i64) -> Vec<NoteId> {
        let expired: Vec<NoteId> = self
            .notes
            .values()
            .filter(|note| note.is_expired_at(now_ms))
            .map(|note| note.id.clone())
            .collect();
        for id in &expired {
            self.notes.remove(id);
        }
        expired
    }

    /// Merges restored notes; an incoming note replaces a live one with the same id.
    pub fn merge(&mut self, incoming: NoteMap) -> usize {
        let count = incoming.len();
        for (id, mut note) in incoming {
            // The map key is authoritative for identity.
            note.id = id.clone();
            self.notes.insert(id, note);
        }
        count
    }

    /// Replaces the whole collection, e.g. with the startup load result.
    pub fn replace_all(&mut self, notes: NoteMap) {
        self.notes = NoteMap::new();
        self.merge(notes);
    }

    /// Next topmost `z_order`.
    ///
    /// When the top rank is `i64::MAX`, ranks are first renumbered `1..=len`
    /// keeping the current stacking order.
    fn next_z(&mut self) -> i64 {
        if let Some(next) = self.current_max_z().checked_add(1) {
            return next;
        }

        let mut ranked: Vec<(i64, NoteId)> = self
            .notes
            .values()
            .map(|note| (note.z_order, note.id.clone()))
            .collect();
        ranked.sort();
        for (rank, (_, id)) in (1_i64..).zip(ranked.iter()) {
            if let Some(note) = self.notes.get_mut(id) {
                note.z_order = rank;
            }
        }
        warn!(
            "event=z_order_compact module=store status=ok notes={}",
            self.notes.len()
        );
        self.current_max_z() + 1
    }

    fn random_position(&mut self) -> Point {
        let span_x = (self.viewport.width - PLACEMENT_RESERVE_X).max(0.0);
        let span_y = (self.viewport.height - PLACEMENT_RESERVE_Y).max(0.0);
        Point::new(
            PLACEMENT_MIN_X + self.sample(span_x),
            PLACEMENT_MIN_Y + self.sample(span_y),
        )
    }

    fn sample(&mut self, span: f64) -> f64 {
        if span > 0.0 {
            self.rng.random_range(0.0..span)
        } else {
            0.0
        }
    }
}
