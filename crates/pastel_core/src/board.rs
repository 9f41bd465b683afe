//! Host-facing board facade.
//!
//! # Responsibility
//! - Expose the presentation contract: create/edit/delete intents, pointer
//!   events, timer ticks and the render list.
//! - Wire store mutations to write-through persistence and change listeners.
//!
//! # Invariants
//! - Every store mutation is persisted immediately, except while a drag is
//!   active; the drag end then performs exactly one save.
//! - A save failure never rolls back in-memory state and is not retried.
//! - Listeners run after the mutation is visible in the store.

use crate::clock::Clock;
use crate::config::{BoardConfig, Viewport};
use crate::countdown::TimeLeft;
use crate::drag::{DragCommit, DragController, DragError, DragFrame, DragStart, PointerTarget};
use crate::model::note::{Note, NoteId, NoteInput, NotePatch, Point};
use crate::persist::{export_backup, parse_backup, BlobStore, PersistResult, PersistenceAdapter};
use crate::store::note_store::NoteStore;
use crate::sweeper::{ExpirySweeper, SweepOutcome};
use log::{debug, info, warn};

/// Store-change notification delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreChange {
    Created(NoteId),
    Updated(NoteId),
    Removed(NoteId),
    Raised { note_id: NoteId, z_order: i64 },
    Moved(NoteId),
    Expired(Vec<NoteId>),
    Restored(usize),
}

type Listener = Box<dyn FnMut(&StoreChange) + Send>;

pub struct Board<S: BlobStore, C: Clock> {
    store: NoteStore,
    persistence: PersistenceAdapter<S>,
    sweeper: ExpirySweeper,
    drag: DragController,
    clock: C,
    listeners: Vec<Listener>,
    revision: u64,
    save_deferred: bool,
}

impl<S: BlobStore, C: Clock> Board<S, C> {
    /// Opens the board, loading every note that has not yet expired.
    pub fn open(storage: S, clock: C, config: &BoardConfig) -> Self {
        Self::with_store(storage, clock, config, NoteStore::new(config.viewport))
    }

    /// Like `open`, with deterministic placement of new notes.
    pub fn open_seeded(storage: S, clock: C, config: &BoardConfig, seed: u64) -> Self {
        Self::with_store(
            storage,
            clock,
            config,
            NoteStore::with_seed(config.viewport, seed),
        )
    }

    fn with_store(storage: S, clock: C, config: &BoardConfig, mut store: NoteStore) -> Self {
        let persistence = PersistenceAdapter::new(storage, config.storage_key.clone());
        store.replace_all(persistence.load(clock.now_ms()));
        info!(
            "event=board_open module=board status=ok notes={} key={}",
            store.len(),
            persistence.key()
        );

        Self {
            store,
            persistence,
            sweeper: ExpirySweeper::new(config.sweep_interval_ms),
            drag: DragController::new(),
            clock,
            listeners: Vec::new(),
            revision: 0,
            save_deferred: false,
        }
    }

    pub fn store(&self) -> &NoteStore {
        &self.store
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn persistence(&self) -> &PersistenceAdapter<S> {
        &self.persistence
    }

    /// Counter bumped on every store change, for hosts that poll.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether a save is waiting for the active drag to end.
    pub fn has_deferred_save(&self) -> bool {
        self.save_deferred
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&StoreChange) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Period the host timer should call `tick` at.
    pub fn tick_interval_ms(&self) -> i64 {
        self.sweeper.interval_ms()
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.store.set_viewport(viewport);
    }

    /// Creates a note from a draft. Any id on the draft is ignored.
    pub fn on_create_intent(&mut self, mut draft: NoteInput) -> Note {
        draft.id = None;
        let note = self.store.upsert(draft, self.clock.now_ms());
        info!(
            "event=note_create module=board status=ok note_id={} kind={}",
            note.id,
            note.kind.as_str()
        );
        self.notify(StoreChange::Created(note.id.clone()));
        self.persist();
        note
    }

    /// Applies `patch` to an existing note. Returns `None` when it is gone.
    pub fn on_edit_intent(&mut self, id: &str, patch: NotePatch) -> Option<Note> {
        let Some(existing) = self.store.get(id) else {
            debug!("event=note_edit module=board status=skipped reason=not_found note_id={id}");
            return None;
        };
        let raise = patch.raise;
        let input = patch.apply_to(existing);
        let mut note = self.store.upsert(input, self.clock.now_ms());
        if raise {
            if let Some(z_order) = self.store.raise(id) {
                note.z_order = z_order;
            }
        }

        info!("event=note_edit module=board status=ok note_id={id} raised={raise}");
        self.notify(StoreChange::Updated(note.id.clone()));
        self.persist();
        Some(note)
    }

    /// Deletes a note. Deleting an absent note is a no-op without a save.
    pub fn on_delete_intent(&mut self, id: &str) -> bool {
        if !self.store.remove(id) {
            debug!("event=note_delete module=board status=skipped reason=not_found note_id={id}");
            return false;
        }
        info!("event=note_delete module=board status=ok note_id={id}");
        self.notify(StoreChange::Removed(id.to_string()));
        self.persist();
        true
    }

    /// Raises a note without dragging it (click-to-front).
    pub fn on_bring_to_front(&mut self, id: &str) -> Option<i64> {
        let z_order = self.store.raise(id)?;
        self.notify(StoreChange::Raised {
            note_id: id.to_string(),
            z_order,
        });
        self.persist();
        Some(z_order)
    }

    /// Starts a drag gesture from a pointer-down on a note's handle.
    ///
    /// A handle press while a gesture is still active means the previous
    /// release was lost; that gesture is committed before the new one starts.
    pub fn on_drag_handle_pointer_down(
        &mut self,
        id: &str,
        pointer: Point,
        container_origin: Point,
        target: PointerTarget,
    ) -> Result<DragStart, DragError> {
        if target != PointerTarget::Handle {
            return Err(DragError::NotOnHandle);
        }
        if let Some(stale) = self.drag.active_note() {
            warn!(
                "event=drag_start module=board status=recovered reason=stale_gesture note_id={stale}"
            );
            self.finish_drag();
        }

        let start = self
            .drag
            .begin(&mut self.store, id, pointer, container_origin, target)?;
        self.notify(StoreChange::Raised {
            note_id: start.note_id.clone(),
            z_order: start.z_order,
        });
        self.persist();
        Ok(start)
    }

    /// Pointer moved; returns the live position while dragging.
    pub fn on_pointer_move(&mut self, pointer: Point) -> Option<Point> {
        self.drag.move_to(pointer)
    }

    /// At most one visual update per display refresh.
    pub fn next_frame(&mut self) -> Option<DragFrame> {
        self.drag.take_frame()
    }

    pub fn on_pointer_up(&mut self) -> Option<DragCommit> {
        self.finish_drag()
    }

    /// Pointer left the tracked surface; ends the gesture like a release.
    pub fn on_pointer_leave(&mut self) -> Option<DragCommit> {
        self.finish_drag()
    }

    /// Window lost focus; any active gesture is committed at its last position.
    pub fn on_focus_lost(&mut self) -> Option<DragCommit> {
        self.finish_drag()
    }

    /// Timer callback; sweeps on every call.
    pub fn tick(&mut self) -> SweepOutcome {
        let now_ms = self.clock.now_ms();
        let outcome = self.sweeper.sweep(&mut self.store, now_ms);
        if !outcome.is_empty() {
            self.notify(StoreChange::Expired(outcome.removed.clone()));
            self.persist();
        }
        outcome
    }

    /// Notes in bottom-to-top stacking order.
    pub fn render_list(&self) -> Vec<Note> {
        self.store.list()
    }

    /// Remaining lifetime of a live note; `None` once it left the store.
    pub fn time_left(&self, id: &str) -> Option<TimeLeft> {
        let note = self.store.get(id)?;
        Some(TimeLeft::compute(note.expires_at, self.clock.now_ms()))
    }

    pub fn export_backup(&self) -> PersistResult<String> {
        export_backup(&self.store.snapshot(), self.clock.now_ms())
    }

    /// Merges a backup into the board; same-id notes are replaced.
    pub fn import_backup(&mut self, text: &str) -> PersistResult<usize> {
        let notes = parse_backup(text)?;
        let count = self.store.merge(notes);
        info!("event=backup_import module=board status=ok notes={count}");
        self.notify(StoreChange::Restored(count));
        self.persist();
        Ok(count)
    }

    fn finish_drag(&mut self) -> Option<DragCommit> {
        let commit = self.drag.end(&mut self.store)?;
        if commit.applied {
            self.notify(StoreChange::Moved(commit.note_id.clone()));
        }
        self.save_deferred = false;
        self.save_now();
        Some(commit)
    }

    fn persist(&mut self) {
        if self.drag.is_dragging() {
            self.save_deferred = true;
            return;
        }
        self.save_now();
    }

    fn save_now(&mut self) {
        match self.persistence.save(&self.store.snapshot()) {
            Ok(()) => debug!(
                "event=board_save module=board status=ok notes={}",
                self.store.len()
            ),
            Err(err) => warn!(
                "event=board_save module=board status=error notes={} error={err}",
                self.store.len()
            ),
        }
    }

    fn notify(&mut self, change: StoreChange) {
        self.revision += 1;
        for listener in &mut self.listeners {
            listener(&change);
        }
    }
}
