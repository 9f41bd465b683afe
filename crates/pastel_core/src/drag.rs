//! Pointer-driven drag gesture state machine.
//!
//! # Responsibility
//! - Turn one press/move*/release gesture into a single position commit.
//! - Keep intermediate positions out of the store and coalesce visual updates.
//!
//! # Invariants
//! - States are `Idle` and `Dragging`; at most one gesture is active.
//! - Live position is always `pointer - container_origin - grab_offset`,
//!   never accumulated from deltas.
//! - The store is written exactly twice per gesture: `raise` on start and
//!   `commit_position` on end.
//! - Ending a gesture is idempotent; a second end while idle does nothing.

use crate::model::note::{NoteId, Point};
use crate::store::note_store::NoteStore;
use log::{debug, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Element under the pointer when the gesture starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    /// The note's drag handle (header bar).
    Handle,
    /// An embedded control such as the edit or delete button.
    Control,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragError {
    /// A gesture is already in progress.
    GestureActive(NoteId),
    /// Pointer-down landed on an embedded control.
    NotOnHandle,
    /// Target note does not exist.
    NoteNotFound(NoteId),
}

impl Display for DragError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GestureActive(id) => write!(f, "drag already active for note {id}"),
            Self::NotOnHandle => write!(f, "pointer-down is not on a drag handle"),
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
        }
    }
}

impl Error for DragError {}

/// Gesture-scoped transient state. Discarded on commit.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub note_id: NoteId,
    /// Pointer-to-note-corner distance captured at gesture start.
    pub grab_offset: Point,
    pub container_origin: Point,
    /// Committed position when the gesture started.
    pub origin: Point,
    /// `z_order` assigned by the raise at gesture start.
    pub z_order: i64,
    pub live: Point,
    frame_pending: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DragState {
    Idle,
    Dragging(DragSession),
}

/// Returned by a successful gesture start.
#[derive(Debug, Clone, PartialEq)]
pub struct DragStart {
    pub note_id: NoteId,
    pub z_order: i64,
    pub origin: Point,
}

/// One coalesced visual update.
#[derive(Debug, Clone, PartialEq)]
pub struct DragFrame {
    pub note_id: NoteId,
    pub position: Point,
}

/// Outcome of a gesture end.
#[derive(Debug, Clone, PartialEq)]
pub struct DragCommit {
    pub note_id: NoteId,
    pub position: Point,
    pub z_order: i64,
    /// `false` when the note vanished during the gesture (deleted or expired).
    pub applied: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DragController {
    state: DragState,
}

impl Default for DragController {
    fn default() -> Self {
        Self::new()
    }
}

impl DragController {
    pub fn new() -> Self {
        Self {
            state: DragState::Idle,
        }
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    pub fn active_note(&self) -> Option<&str> {
        match &self.state {
            DragState::Dragging(session) => Some(session.note_id.as_str()),
            DragState::Idle => None,
        }
    }

    pub fn live_position(&self) -> Option<Point> {
        match &self.state {
            DragState::Dragging(session) => Some(session.live),
            DragState::Idle => None,
        }
    }

    /// Starts a gesture on `note_id` and raises the note to the top.
    ///
    /// `pointer` and `container_origin` share the host's client coordinate
    /// space; note positions are relative to `container_origin`.
    pub fn begin(
        &mut self,
        store: &mut NoteStore,
        note_id: &str,
        pointer: Point,
        container_origin: Point,
        target: PointerTarget,
    ) -> Result<DragStart, DragError> {
        if let DragState::Dragging(session) = &self.state {
            return Err(DragError::GestureActive(session.note_id.clone()));
        }
        if target != PointerTarget::Handle {
            return Err(DragError::NotOnHandle);
        }

        let origin = store
            .get(note_id)
            .map(|note| note.position)
            .ok_or_else(|| DragError::NoteNotFound(note_id.to_string()))?;
        let z_order = store
            .raise(note_id)
            .ok_or_else(|| DragError::NoteNotFound(note_id.to_string()))?;

        let grab_offset = pointer - container_origin - origin;
        self.state = DragState::Dragging(DragSession {
            note_id: note_id.to_string(),
            grab_offset,
            container_origin,
            origin,
            z_order,
            live: origin,
            frame_pending: false,
        });

        debug!("event=drag_start module=drag status=ok note_id={note_id} z_order={z_order}");
        Ok(DragStart {
            note_id: note_id.to_string(),
            z_order,
            origin,
        })
    }

    /// Tracks the pointer. Returns the new live position, or `None` when idle.
    pub fn move_to(&mut self, pointer: Point) -> Option<Point> {
        let DragState::Dragging(session) = &mut self.state else {
            return None;
        };
        let next = pointer - session.container_origin - session.grab_offset;
        if next != session.live {
            session.live = next;
            session.frame_pending = true;
        }
        Some(session.live)
    }

    /// Hands out at most one pending visual update; call once per display refresh.
    pub fn take_frame(&mut self) -> Option<DragFrame> {
        let DragState::Dragging(session) = &mut self.state else {
            return None;
        };
        if !session.frame_pending {
            return None;
        }
        session.frame_pending = false;
        Some(DragFrame {
            note_id: session.note_id.clone(),
            position: session.live,
        })
    }

    /// Ends the gesture (release or surface-leave) and commits to the store.
    pub fn end(&mut self, store: &mut NoteStore) -> Option<DragCommit> {
        let DragState::Dragging(session) = std::mem::replace(&mut self.state, DragState::Idle)
        else {
            return None;
        };

        let applied = store.commit_position(&session.note_id, session.live, session.z_order);
        info!(
            "event=drag_commit module=drag status={} note_id={} dx={} dy={}",
            if applied { "ok" } else { "skipped" },
            session.note_id,
            session.live.x - session.origin.x,
            session.live.y - session.origin.y
        );
        Some(DragCommit {
            note_id: session.note_id,
            position: session.live,
            z_order: session.z_order,
            applied,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{DragController, DragError, DragState, PointerTarget};
    use crate::config::Viewport;
    use crate::model::note::{NoteInput, Point};
    use crate::store::note_store::NoteStore;

    fn store_with_note() -> (NoteStore, String) {
        let mut store = NoteStore::with_seed(Viewport::default(), 3);
        let note = store.upsert(
            NoteInput::text("drag me").with_position(Point::new(100.0, 200.0)),
            0,
        );
        (store, note.id)
    }

    #[test]
    fn grab_offset_is_relative_to_note_corner() {
        let (mut store, id) = store_with_note();
        let mut drag = DragController::new();
        drag.begin(
            &mut store,
            &id,
            Point::new(130.0, 215.0),
            Point::new(0.0, 0.0),
            PointerTarget::Handle,
        )
        .unwrap();

        match drag.state() {
            DragState::Dragging(session) => {
                assert_eq!(session.grab_offset, Point::new(30.0, 15.0));
                assert_eq!(session.live, Point::new(100.0, 200.0));
            }
            DragState::Idle => panic!("expected dragging state"),
        }
    }

    #[test]
    fn moves_do_not_touch_store() {
        let (mut store, id) = store_with_note();
        let mut drag = DragController::new();
        drag.begin(
            &mut store,
            &id,
            Point::new(100.0, 200.0),
            Point::default(),
            PointerTarget::Handle,
        )
        .unwrap();

        drag.move_to(Point::new(500.0, 500.0));
        assert_eq!(store.get(&id).unwrap().position, Point::new(100.0, 200.0));
    }

    #[test]
    fn frames_are_coalesced() {
        let (mut store, id) = store_with_note();
        let mut drag = DragController::new();
        drag.begin(
            &mut store,
            &id,
            Point::new(100.0, 200.0),
            Point::default(),
            PointerTarget::Handle,
        )
        .unwrap();

        assert_eq!(drag.take_frame(), None);
        drag.move_to(Point::new(110.0, 200.0));
        drag.move_to(Point::new(120.0, 200.0));
        let frame = drag.take_frame().unwrap();
        assert_eq!(frame.position, Point::new(120.0, 200.0));
        assert_eq!(drag.take_frame(), None);
    }

    #[test]
    fn control_target_does_not_start_gesture() {
        let (mut store, id) = store_with_note();
        let before = store.get(&id).unwrap().z_order;
        let mut drag = DragController::new();
        let err = drag
            .begin(
                &mut store,
                &id,
                Point::default(),
                Point::default(),
                PointerTarget::Control,
            )
            .unwrap_err();
        assert_eq!(err, DragError::NotOnHandle);
        assert!(!drag.is_dragging());
        assert_eq!(store.get(&id).unwrap().z_order, before);
    }

    #[test]
    fn second_begin_is_rejected_while_dragging() {
        let (mut store, id) = store_with_note();
        let mut drag = DragController::new();
        drag.begin(
            &mut store,
            &id,
            Point::default(),
            Point::default(),
            PointerTarget::Handle,
        )
        .unwrap();
        let err = drag
            .begin(
                &mut store,
                &id,
                Point::default(),
                Point::default(),
                PointerTarget::Handle,
            )
            .unwrap_err();
        assert_eq!(err, DragError::GestureActive(id));
    }

    #[test]
    fn end_is_idempotent() {
        let (mut store, id) = store_with_note();
        let mut drag = DragController::new();
        drag.begin(
            &mut store,
            &id,
            Point::default(),
            Point::default(),
            PointerTarget::Handle,
        )
        .unwrap();
        assert!(drag.end(&mut store).is_some());
        assert!(drag.end(&mut store).is_none());
        assert!(drag.move_to(Point::new(1.0, 1.0)).is_none());
    }

    #[test]
    fn unknown_note_is_rejected() {
        let (mut store, _) = store_with_note();
        let mut drag = DragController::new();
        let err = drag
            .begin(
                &mut store,
                "missing",
                Point::default(),
                Point::default(),
                PointerTarget::Handle,
            )
            .unwrap_err();
        assert_eq!(err, DragError::NoteNotFound("missing".to_string()));
    }
}
