//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical note record stored on the board.
//! - Define create/edit inputs used by store and board intents.
//!
//! # Invariants
//! - `id` and `created_at` never change after creation.
//! - `kind` is preserved across edits.
//! - Exactly one of `content` / `sketch_image` is expected to be populated,
//!   consistent with `kind`. Core reports violations but does not correct them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::{Add, Sub};

/// Opaque note identifier.
pub type NoteId = String;

/// Full board state keyed by note id.
pub type NoteMap = BTreeMap<NoteId, Note>;

/// Background theme applied when the caller does not pick one.
pub const DEFAULT_BACKGROUND_STYLE: &str = "yellow";

/// Note payload category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteKind {
    /// Formatted rich-text markup in `content`.
    Text,
    /// Encoded raster image in `sketch_image`.
    Sketch,
}

impl NoteKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Sketch => "sketch",
        }
    }
}

/// Two-dimensional coordinate in canvas or client space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Canonical note record.
///
/// Serialized field names follow the persisted document written by earlier
/// releases (`type`, `sketchData`, `color`, `zIndex`, ...), so old blobs load
/// without migration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    #[serde(rename = "type")]
    pub kind: NoteKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(
        rename = "sketchData",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub sketch_image: Option<String>,
    #[serde(
        rename = "sketchColor",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub sketch_stroke_color: Option<String>,
    /// Theme tag, passed through untouched.
    #[serde(rename = "color", default = "default_background_style")]
    pub background_style: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds. `None` means the note never expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    #[serde(rename = "zIndex")]
    pub z_order: i64,
    pub position: Point,
}

impl Note {
    /// Returns whether the note has expired at `now_ms`.
    ///
    /// A note expires at the exact instant `now_ms == expires_at`.
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        matches!(self.expires_at, Some(expires_at) if expires_at <= now_ms)
    }

    /// Returns whether the populated payload agrees with `kind`.
    pub fn payload_matches_kind(&self) -> bool {
        match self.kind {
            NoteKind::Text => self.content.is_some() && self.sketch_image.is_none(),
            NoteKind::Sketch => self.sketch_image.is_some() && self.content.is_none(),
        }
    }
}

fn default_background_style() -> String {
    DEFAULT_BACKGROUND_STYLE.to_string()
}

/// Create/replace input for `NoteStore::upsert`.
///
/// `id: None` creates a fresh note. `z_order` and `position` are only applied
/// when supplied; identity and `created_at` are always owned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteInput {
    pub id: Option<NoteId>,
    pub kind: NoteKind,
    pub content: Option<String>,
    pub sketch_image: Option<String>,
    pub sketch_stroke_color: Option<String>,
    pub background_style: String,
    pub emoji: Option<String>,
    pub expires_at: Option<i64>,
    pub z_order: Option<i64>,
    pub position: Option<Point>,
}

impl NoteInput {
    /// Draft for a fresh text note.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::empty(NoteKind::Text)
        }
    }

    /// Draft for a fresh sketch note.
    pub fn sketch(image: impl Into<String>, stroke_color: Option<String>) -> Self {
        Self {
            sketch_image: Some(image.into()),
            sketch_stroke_color: stroke_color,
            ..Self::empty(NoteKind::Sketch)
        }
    }

    fn empty(kind: NoteKind) -> Self {
        Self {
            id: None,
            kind,
            content: None,
            sketch_image: None,
            sketch_stroke_color: None,
            background_style: default_background_style(),
            emoji: None,
            expires_at: None,
            z_order: None,
            position: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<NoteId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_expiry(mut self, expires_at: i64) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn with_position(mut self, position: Point) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_background_style(mut self, style: impl Into<String>) -> Self {
        self.background_style = style.into();
        self
    }

    pub fn with_emoji(mut self, emoji: impl Into<String>) -> Self {
        self.emoji = Some(emoji.into());
        self
    }
}

impl From<&Note> for NoteInput {
    /// Full-replacement input that reproduces `note` when upserted.
    fn from(note: &Note) -> Self {
        Self {
            id: Some(note.id.clone()),
            kind: note.kind,
            content: note.content.clone(),
            sketch_image: note.sketch_image.clone(),
            sketch_stroke_color: note.sketch_stroke_color.clone(),
            background_style: note.background_style.clone(),
            emoji: note.emoji.clone(),
            expires_at: note.expires_at,
            z_order: Some(note.z_order),
            position: Some(note.position),
        }
    }
}

/// Field-level edit applied by the edit intent.
///
/// `None` leaves a field untouched. Nullable fields use a nested option so a
/// patch can clear them (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotePatch {
    pub content: Option<Option<String>>,
    pub sketch_image: Option<Option<String>>,
    pub sketch_stroke_color: Option<Option<String>>,
    pub background_style: Option<String>,
    pub emoji: Option<Option<String>>,
    pub expires_at: Option<Option<i64>>,
    /// Raise the note to the top of the stack as part of the edit.
    pub raise: bool,
}

impl NotePatch {
    /// Builds the upsert input for `existing` with this patch applied.
    ///
    /// `z_order` and `position` are left unset so the store keeps them.
    pub fn apply_to(self, existing: &Note) -> NoteInput {
        NoteInput {
            id: Some(existing.id.clone()),
            kind: existing.kind,
            content: self.content.unwrap_or_else(|| existing.content.clone()),
            sketch_image: self
                .sketch_image
                .unwrap_or_else(|| existing.sketch_image.clone()),
            sketch_stroke_color: self
                .sketch_stroke_color
                .unwrap_or_else(|| existing.sketch_stroke_color.clone()),
            background_style: self
                .background_style
                .unwrap_or_else(|| existing.background_style.clone()),
            emoji: self.emoji.unwrap_or_else(|| existing.emoji.clone()),
            expires_at: self.expires_at.unwrap_or(existing.expires_at),
            z_order: None,
            position: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Note, NoteKind, NotePatch, Point};

    fn sample() -> Note {
        Note {
            id: "n1".to_string(),
            kind: NoteKind::Text,
            content: Some("<b>hi</b>".to_string()),
            sketch_image: None,
            sketch_stroke_color: None,
            background_style: "ocean".to_string(),
            emoji: Some("📌".to_string()),
            created_at: 1_000,
            expires_at: Some(5_000),
            z_order: 3,
            position: Point::new(10.0, 20.0),
        }
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let note = sample();
        assert!(!note.is_expired_at(4_999));
        assert!(note.is_expired_at(5_000));
    }

    #[test]
    fn permanent_note_never_expires() {
        let mut note = sample();
        note.expires_at = None;
        assert!(!note.is_expired_at(i64::MAX));
    }

    #[test]
    fn payload_mismatch_is_detected() {
        let mut note = sample();
        assert!(note.payload_matches_kind());
        note.kind = NoteKind::Sketch;
        assert!(!note.payload_matches_kind());
    }

    #[test]
    fn patch_clears_expiry_and_keeps_other_fields() {
        let note = sample();
        let input = NotePatch {
            expires_at: Some(None),
            ..NotePatch::default()
        }
        .apply_to(&note);

        assert_eq!(input.id.as_deref(), Some("n1"));
        assert_eq!(input.expires_at, None);
        assert_eq!(input.content, note.content);
        assert_eq!(input.background_style, "ocean");
        assert_eq!(input.z_order, None);
        assert_eq!(input.position, None);
    }

    #[test]
    fn point_arithmetic() {
        let diff = Point::new(5.0, 7.0) - Point::new(2.0, 3.0);
        assert_eq!(diff, Point::new(3.0, 4.0));
        assert_eq!(diff + Point::new(1.0, 1.0), Point::new(4.0, 5.0));
    }
}
