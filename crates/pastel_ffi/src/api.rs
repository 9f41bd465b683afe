//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose board intents, pointer events and timer ticks to Dart via FRB.
//! - Own the single process-wide board instance.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every call runs against one board; calls are serialized by a mutex.
//! - The board is opened lazily from `PASTEL_*` environment configuration.

use log::warn;
use pastel_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    Board, BoardConfig, Note, NoteInput, NoteKind, NotePatch, Point, PointerTarget,
    SqliteBlobStore, SystemClock, Viewport,
};
use std::sync::{Mutex, PoisonError};

type FfiBoard = Board<SqliteBlobStore, SystemClock>;

static BOARD: Mutex<Option<FfiBoard>> = Mutex::new(None);

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Returns an empty string on success and an error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Draft submitted by the note editor.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteDraft {
    /// `text` or `sketch`.
    pub kind: String,
    pub content: Option<String>,
    pub sketch_image: Option<String>,
    pub sketch_stroke_color: Option<String>,
    pub background_style: String,
    pub emoji: Option<String>,
    /// Epoch milliseconds; `None` for a permanent note.
    pub expires_at: Option<i64>,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

/// Field edits; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteEdit {
    pub content: Option<String>,
    pub sketch_image: Option<String>,
    pub sketch_stroke_color: Option<String>,
    pub background_style: Option<String>,
    pub emoji: Option<String>,
    pub clear_emoji: bool,
    pub expires_at: Option<i64>,
    /// Makes the note permanent. Wins over `expires_at`.
    pub clear_expiry: bool,
    pub raise: bool,
}

/// Render model for one note card.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteView {
    pub id: String,
    pub kind: String,
    pub content: Option<String>,
    pub sketch_image: Option<String>,
    pub sketch_stroke_color: Option<String>,
    pub background_style: String,
    pub emoji: Option<String>,
    pub created_at: i64,
    pub expires_at: Option<i64>,
    pub z_order: i64,
    pub x: f64,
    pub y: f64,
}

/// Coalesced drag feedback for one display refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct DragFrameView {
    pub note_id: String,
    pub x: f64,
    pub y: f64,
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardActionResponse {
    pub ok: bool,
    pub note_id: Option<String>,
    pub message: String,
}

impl BoardActionResponse {
    fn success(message: impl Into<String>, note_id: Option<String>) -> Self {
        Self {
            ok: true,
            note_id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            note_id: None,
            message: message.into(),
        }
    }
}

/// Text payload envelope (backup export).
#[derive(Debug, Clone, PartialEq)]
pub struct BoardTextResponse {
    pub ok: bool,
    pub text: String,
    pub message: String,
}

/// Creates a note from an editor draft.
#[flutter_rust_bridge::frb(sync)]
pub fn board_create_note(draft: NoteDraft) -> BoardActionResponse {
    let input = match to_note_input(draft) {
        Ok(input) => input,
        Err(err) => return BoardActionResponse::failure(format!("board_create_note failed: {err}")),
    };
    match with_board(|board| board.on_create_intent(input)) {
        Ok(note) => BoardActionResponse::success("Note created.", Some(note.id)),
        Err(err) => BoardActionResponse::failure(format!("board_create_note failed: {err}")),
    }
}

/// Applies editor changes to an existing note.
#[flutter_rust_bridge::frb(sync)]
pub fn board_edit_note(note_id: String, edit: NoteEdit) -> BoardActionResponse {
    let patch = to_note_patch(edit);
    match with_board(|board| board.on_edit_intent(&note_id, patch)) {
        Ok(Some(note)) => BoardActionResponse::success("Note updated.", Some(note.id)),
        Ok(None) => BoardActionResponse::failure(format!("note not found: {note_id}")),
        Err(err) => BoardActionResponse::failure(format!("board_edit_note failed: {err}")),
    }
}

/// Deletes a note; deleting an absent note still succeeds.
#[flutter_rust_bridge::frb(sync)]
pub fn board_delete_note(note_id: String) -> BoardActionResponse {
    match with_board(|board| board.on_delete_intent(&note_id)) {
        Ok(true) => BoardActionResponse::success("Note deleted.", Some(note_id)),
        Ok(false) => BoardActionResponse::success("Note already gone.", None),
        Err(err) => BoardActionResponse::failure(format!("board_delete_note failed: {err}")),
    }
}

/// Pointer-down on a note. `on_handle` is false for embedded buttons.
#[flutter_rust_bridge::frb(sync)]
pub fn board_pointer_down(
    note_id: String,
    pointer_x: f64,
    pointer_y: f64,
    origin_x: f64,
    origin_y: f64,
    on_handle: bool,
) -> BoardActionResponse {
    let target = if on_handle {
        PointerTarget::Handle
    } else {
        PointerTarget::Control
    };
    let result = with_board(|board| {
        board.on_drag_handle_pointer_down(
            &note_id,
            Point::new(pointer_x, pointer_y),
            Point::new(origin_x, origin_y),
            target,
        )
    });
    match result {
        Ok(Ok(start)) => BoardActionResponse::success(
            format!("Drag started at z {}.", start.z_order),
            Some(start.note_id),
        ),
        Ok(Err(err)) => BoardActionResponse::failure(err.to_string()),
        Err(err) => BoardActionResponse::failure(format!("board_pointer_down failed: {err}")),
    }
}

/// Pointer moved. Returns whether a drag is active.
#[flutter_rust_bridge::frb(sync)]
pub fn board_pointer_move(x: f64, y: f64) -> bool {
    with_board(|board| board.on_pointer_move(Point::new(x, y)).is_some()).unwrap_or(false)
}

/// Pending drag frame, called from the display refresh callback.
#[flutter_rust_bridge::frb(sync)]
pub fn board_next_frame() -> Option<DragFrameView> {
    with_board(|board| board.next_frame())
        .ok()
        .flatten()
        .map(|frame| DragFrameView {
            note_id: frame.note_id,
            x: frame.position.x,
            y: frame.position.y,
        })
}

/// Pointer released.
#[flutter_rust_bridge::frb(sync)]
pub fn board_pointer_up() -> BoardActionResponse {
    finish_gesture("board_pointer_up", |board| board.on_pointer_up())
}

/// Pointer left the canvas.
#[flutter_rust_bridge::frb(sync)]
pub fn board_pointer_leave() -> BoardActionResponse {
    finish_gesture("board_pointer_leave", |board| board.on_pointer_leave())
}

/// Window lost focus.
#[flutter_rust_bridge::frb(sync)]
pub fn board_focus_lost() -> BoardActionResponse {
    finish_gesture("board_focus_lost", |board| board.on_focus_lost())
}

/// Click-to-front without dragging.
#[flutter_rust_bridge::frb(sync)]
pub fn board_bring_to_front(note_id: String) -> BoardActionResponse {
    match with_board(|board| board.on_bring_to_front(&note_id)) {
        Ok(Some(z_order)) => {
            BoardActionResponse::success(format!("Note raised to z {z_order}."), Some(note_id))
        }
        Ok(None) => BoardActionResponse::failure(format!("note not found: {note_id}")),
        Err(err) => BoardActionResponse::failure(format!("board_bring_to_front failed: {err}")),
    }
}

/// Window size used for automatic placement of new notes.
#[flutter_rust_bridge::frb(sync)]
pub fn board_set_viewport(width: f64, height: f64) -> BoardActionResponse {
    let Some(viewport) = Viewport::new(width, height) else {
        return BoardActionResponse::failure(format!(
            "invalid viewport {width}x{height}; expected finite positive sizes"
        ));
    };
    match with_board(|board| board.set_viewport(viewport)) {
        Ok(()) => BoardActionResponse::success("Viewport updated.", None),
        Err(err) => BoardActionResponse::failure(format!("board_set_viewport failed: {err}")),
    }
}

/// Period in milliseconds the host timer should call `board_tick` at.
#[flutter_rust_bridge::frb(sync)]
pub fn board_tick_interval_ms() -> i64 {
    with_board(|board| board.tick_interval_ms())
        .unwrap_or(pastel_core::config::DEFAULT_SWEEP_INTERVAL_MS)
}

/// Timer callback. Returns ids removed by the expiry sweep.
#[flutter_rust_bridge::frb(sync)]
pub fn board_tick() -> Vec<String> {
    with_board(|board| board.tick().removed).unwrap_or_default()
}

/// Notes in bottom-to-top stacking order.
#[flutter_rust_bridge::frb(sync)]
pub fn board_list() -> Vec<NoteView> {
    with_board(|board| board.render_list())
        .map(|notes| notes.into_iter().map(to_note_view).collect())
        .unwrap_or_default()
}

/// Countdown label for a note; `None` when it is no longer on the board.
#[flutter_rust_bridge::frb(sync)]
pub fn board_time_left(note_id: String) -> Option<String> {
    with_board(|board| board.time_left(&note_id))
        .ok()
        .flatten()
        .map(|left| left.to_string())
}

/// Backup document of the current board.
#[flutter_rust_bridge::frb(sync)]
pub fn board_export() -> BoardTextResponse {
    match with_board(|board| board.export_backup()) {
        Ok(Ok(text)) => BoardTextResponse {
            ok: true,
            text,
            message: "Backup ready.".to_string(),
        },
        Ok(Err(err)) => text_failure(format!("board_export failed: {err}")),
        Err(err) => text_failure(format!("board_export failed: {err}")),
    }
}

/// Merges a backup document into the board.
#[flutter_rust_bridge::frb(sync)]
pub fn board_import(text: String) -> BoardActionResponse {
    match with_board(|board| board.import_backup(&text)) {
        Ok(Ok(count)) => BoardActionResponse::success(format!("Imported {count} note(s)."), None),
        Ok(Err(err)) => BoardActionResponse::failure(format!("board_import failed: {err}")),
        Err(err) => BoardActionResponse::failure(format!("board_import failed: {err}")),
    }
}

fn finish_gesture(
    operation: &str,
    end: impl FnOnce(&mut FfiBoard) -> Option<pastel_core::DragCommit>,
) -> BoardActionResponse {
    match with_board(end) {
        Ok(Some(commit)) if commit.applied => {
            BoardActionResponse::success("Drag committed.", Some(commit.note_id))
        }
        Ok(Some(commit)) => BoardActionResponse::success(
            "Drag ended; note no longer exists.",
            Some(commit.note_id),
        ),
        Ok(None) => BoardActionResponse::success("No active drag.", None),
        Err(err) => BoardActionResponse::failure(format!("{operation} failed: {err}")),
    }
}

fn text_failure(message: String) -> BoardTextResponse {
    BoardTextResponse {
        ok: false,
        text: String::new(),
        message,
    }
}

fn with_board<T>(f: impl FnOnce(&mut FfiBoard) -> T) -> Result<T, String> {
    let mut guard = BOARD.lock().unwrap_or_else(PoisonError::into_inner);
    if guard.is_none() {
        let config = BoardConfig::from_env();
        let storage = SqliteBlobStore::open(&config.db_path).map_err(|err| {
            warn!(
                "event=board_open module=ffi status=error path={} error={err}",
                config.db_path.display()
            );
            format!("board storage open failed: {err}")
        })?;
        *guard = Some(Board::open(storage, SystemClock, &config));
    }
    match guard.as_mut() {
        Some(board) => Ok(f(board)),
        None => Err("board unavailable".to_string()),
    }
}

fn parse_kind(value: &str) -> Result<NoteKind, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "text" => Ok(NoteKind::Text),
        "sketch" => Ok(NoteKind::Sketch),
        other => Err(format!("unsupported note kind `{other}`; expected text|sketch")),
    }
}

fn to_note_input(draft: NoteDraft) -> Result<NoteInput, String> {
    let position = match (draft.x, draft.y) {
        (Some(x), Some(y)) => Some(Point::new(x, y)),
        _ => None,
    };
    Ok(NoteInput {
        id: None,
        kind: parse_kind(&draft.kind)?,
        content: draft.content,
        sketch_image: draft.sketch_image,
        sketch_stroke_color: draft.sketch_stroke_color,
        background_style: draft.background_style,
        emoji: draft.emoji,
        expires_at: draft.expires_at,
        z_order: None,
        position,
    })
}

fn to_note_patch(edit: NoteEdit) -> NotePatch {
    NotePatch {
        content: edit.content.map(Some),
        sketch_image: edit.sketch_image.map(Some),
        sketch_stroke_color: edit.sketch_stroke_color.map(Some),
        background_style: edit.background_style,
        emoji: if edit.clear_emoji {
            Some(None)
        } else {
            edit.emoji.map(Some)
        },
        expires_at: if edit.clear_expiry {
            Some(None)
        } else {
            edit.expires_at.map(Some)
        },
        raise: edit.raise,
    }
}

fn to_note_view(note: Note) -> NoteView {
    NoteView {
        id: note.id,
        kind: note.kind.as_str().to_string(),
        content: note.content,
        sketch_image: note.sketch_image,
        sketch_stroke_color: note.sketch_stroke_color,
        background_style: note.background_style,
        emoji: note.emoji,
        created_at: note.created_at,
        expires_at: note.expires_at,
        z_order: note.z_order,
        x: note.position.x,
        y: note.position.y,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        board_bring_to_front, board_create_note, board_delete_note, board_edit_note,
        board_export, board_focus_lost, board_list, board_next_frame, board_pointer_down,
        board_pointer_move, board_pointer_up, board_set_viewport, board_tick_interval_ms,
        board_time_left, core_version, init_logging, ping, to_note_patch, NoteDraft, NoteEdit,
    };
    use std::time::{SystemTime, UNIX_EPOCH};

    fn draft(content: &str) -> NoteDraft {
        NoteDraft {
            kind: "text".to_string(),
            content: Some(content.to_string()),
            sketch_image: None,
            sketch_stroke_color: None,
            background_style: "pink".to_string(),
            emoji: None,
            expires_at: None,
            x: Some(40.0),
            y: Some(80.0),
        }
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_relative_log_dir() {
        let error = init_logging("info".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn create_edit_delete_roundtrip() {
        let token = unique_token("ffi-note");
        let created = board_create_note(draft(&token));
        assert!(created.ok, "{}", created.message);
        let note_id = created.note_id.expect("create should return note_id");

        let listed = board_list();
        let view = listed
            .iter()
            .find(|view| view.id == note_id)
            .expect("created note should be listed");
        assert_eq!(view.content.as_deref(), Some(token.as_str()));
        assert_eq!((view.x, view.y), (40.0, 80.0));
        assert_eq!(board_time_left(note_id.clone()).as_deref(), Some("permanent"));

        let edited = board_edit_note(
            note_id.clone(),
            NoteEdit {
                emoji: Some("🚀".to_string()),
                ..NoteEdit::default()
            },
        );
        assert!(edited.ok, "{}", edited.message);
        assert!(board_export().text.contains(&note_id));

        assert!(board_delete_note(note_id.clone()).ok);
        assert!(board_list().iter().all(|view| view.id != note_id));
        assert_eq!(board_time_left(note_id), None);
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let mut bad = draft("x");
        bad.kind = "voice".to_string();
        let response = board_create_note(bad);
        assert!(!response.ok);
        assert!(response.message.contains("voice"));
    }

    #[test]
    fn drag_roundtrip_commits_position() {
        let created = board_create_note(draft(&unique_token("ffi-drag")));
        let note_id = created.note_id.expect("create should return note_id");

        let pressed = board_pointer_down(note_id.clone(), 50.0, 90.0, 0.0, 0.0, true);
        assert!(pressed.ok, "{}", pressed.message);
        assert!(board_pointer_move(150.0, 190.0));
        let frame = board_next_frame().expect("move should produce a frame");
        assert_eq!((frame.x, frame.y), (140.0, 180.0));

        let released = board_pointer_up();
        assert!(released.ok, "{}", released.message);
        let idle = board_focus_lost();
        assert!(idle.ok);
        assert_eq!(idle.note_id, None);
        let view = board_list()
            .into_iter()
            .find(|view| view.id == note_id)
            .expect("dragged note should be listed");
        assert_eq!((view.x, view.y), (140.0, 180.0));
    }

    #[test]
    fn control_press_is_rejected() {
        let created = board_create_note(draft(&unique_token("ffi-control")));
        let note_id = created.note_id.expect("create should return note_id");
        let response = board_pointer_down(note_id, 0.0, 0.0, 0.0, 0.0, false);
        assert!(!response.ok);
    }

    #[test]
    fn viewport_bounds_automatic_placement() {
        assert!(!board_set_viewport(f64::NAN, 500.0).ok);
        assert!(!board_set_viewport(400.0, 0.0).ok);
        let updated = board_set_viewport(400.0, 500.0);
        assert!(updated.ok, "{}", updated.message);

        let mut unplaced = draft(&unique_token("ffi-viewport"));
        unplaced.x = None;
        unplaced.y = None;
        let note_id = board_create_note(unplaced)
            .note_id
            .expect("create should return note_id");
        let view = board_list()
            .into_iter()
            .find(|view| view.id == note_id)
            .expect("created note should be listed");
        assert!(view.x >= 50.0 && view.x < 150.0, "x={}", view.x);
        assert!(view.y >= 100.0 && view.y < 200.0, "y={}", view.y);
    }

    #[test]
    fn bring_to_front_lifts_note_above_later_ones() {
        let note_id = board_create_note(draft(&unique_token("ffi-front")))
            .note_id
            .expect("create should return note_id");
        let cover_id = board_create_note(draft(&unique_token("ffi-cover")))
            .note_id
            .expect("create should return note_id");

        assert!(board_bring_to_front(note_id.clone()).ok);
        let z_of = |id: &str| {
            board_list()
                .into_iter()
                .find(|view| view.id == id)
                .map(|view| view.z_order)
                .expect("note should be listed")
        };
        assert!(z_of(&note_id) > z_of(&cover_id));
        assert!(!board_bring_to_front(unique_token("ffi-missing")).ok);
    }

    #[test]
    fn tick_interval_is_positive() {
        assert!(board_tick_interval_ms() >= 1);
    }

    #[test]
    fn clear_flags_win_over_values() {
        let patch = to_note_patch(NoteEdit {
            expires_at: Some(5),
            clear_expiry: true,
            emoji: Some("📌".to_string()),
            ..NoteEdit::default()
        });
        assert_eq!(patch.expires_at, Some(None));
        assert_eq!(patch.emoji, Some(Some("📌".to_string())));
    }
}
