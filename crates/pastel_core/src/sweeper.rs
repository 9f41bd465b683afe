//! Periodic expiry sweep.
//!
//! # Responsibility
//! - Carry the timer cadence the host should tick at.
//! - Remove every expired note in a single batch per sweep.
//!
//! # Invariants
//! - Notes without `expires_at` are never removed.
//! - One sweep yields at most one batch; callers persist once per non-empty batch.

use crate::model::note::NoteId;
use crate::store::note_store::NoteStore;
use log::info;

/// Result of one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    /// Ids removed by this sweep, in id order.
    pub removed: Vec<NoteId>,
}

impl SweepOutcome {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty()
    }
}

/// Always-armed sweeper driven by host timer ticks.
///
/// `interval_ms` is the cadence the host timer is expected to fire at; every
/// tick sweeps, so an expired note survives at most one interval.
#[derive(Debug, Clone)]
pub struct ExpirySweeper {
    interval_ms: i64,
    last_sweep_ms: Option<i64>,
}

impl ExpirySweeper {
    pub fn new(interval_ms: i64) -> Self {
        Self {
            interval_ms: interval_ms.max(1),
            last_sweep_ms: None,
        }
    }

    pub fn interval_ms(&self) -> i64 {
        self.interval_ms
    }

    /// Time of the most recent sweep, `None` before the first tick.
    pub fn last_sweep_ms(&self) -> Option<i64> {
        self.last_sweep_ms
    }

    /// Removes notes with `expires_at <= now_ms` from `store`.
    pub fn sweep(&mut self, store: &mut NoteStore, now_ms: i64) -> SweepOutcome {
        self.last_sweep_ms = Some(now_ms);
        let removed = store.remove_expired(now_ms);
        if !removed.is_empty() {
            info!(
                "event=expiry_sweep module=sweeper status=ok removed={} remaining={}",
                removed.len(),
                store.len()
            );
        }
        SweepOutcome { removed }
    }
}
