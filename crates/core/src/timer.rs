//! Countdown projection.
//!
//! The database never stores a ticking counter. The time left on a lock is
//! derived from its status, the remaining-seconds snapshot and `started_at`,
//! and clients recompute it every [`TICK_INTERVAL_SECS`] from the reading the
//! API hands back.

use serde::Serialize;

use crate::lock::{LockState, LockStatus};
use crate::types::Timestamp;

/// Cadence at which clients are expected to re-project a reading.
pub const TICK_INTERVAL_SECS: u64 = 1;

/// A projected view of a lock's timer at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimerReading {
    /// Seconds left, never negative.
    pub remaining_seconds: i64,
    /// Denominator used for the progress ratio.
    pub allocated_seconds: i64,
    /// Fraction of `allocated_seconds` already served, in `[0, 1]`.
    pub completed_fraction: f64,
    /// When the countdown reaches zero, for active locks only.
    pub ends_at: Option<Timestamp>,
    /// The instant this reading was taken.
    pub as_of: Timestamp,
}

/// Whole seconds between `started_at` and `now`, floored at zero.
pub fn elapsed_seconds(started_at: Timestamp, now: Timestamp) -> i64 {
    (now - started_at).num_seconds().max(0)
}

/// Seconds remaining on the lock at `now`.
pub fn remaining_at(state: &LockState, now: Timestamp) -> i64 {
    match state.status {
        LockStatus::Active => {
            let elapsed = elapsed_seconds(state.started_at, now);
            state.remaining_seconds.saturating_sub(elapsed).max(0)
        }
        LockStatus::Paused => state.remaining_seconds.max(0),
        LockStatus::Completed | LockStatus::Cancelled => 0,
    }
}

/// Project a lock's timer at `now`.
///
/// `allocated` is the larger of the initial duration and everything the lock
/// has had since its clock last started, so time added after creation does
/// not push the progress ratio past 1.
pub fn project(state: &LockState, now: Timestamp) -> TimerReading {
    let remaining = remaining_at(state, now);

    let (allocated, fraction) = match state.status {
        LockStatus::Completed => (state.initial_duration_seconds.max(0), 1.0),
        LockStatus::Cancelled => (state.initial_duration_seconds.max(0), 0.0),
        LockStatus::Active | LockStatus::Paused => {
            let elapsed = if state.status == LockStatus::Active {
                elapsed_seconds(state.started_at, now)
            } else {
                0
            };
            let allocated = state
                .initial_duration_seconds
                .max(remaining.saturating_add(elapsed));
            let fraction = if state.initial_duration_seconds <= 0 || allocated <= 0 {
                0.0
            } else {
                ((allocated - remaining) as f64 / allocated as f64).clamp(0.0, 1.0)
            };
            (allocated, fraction)
        }
    };

    let ends_at = match state.status {
        LockStatus::Active => Some(now + chrono::Duration::seconds(remaining)),
        _ => None,
    };

    TimerReading {
        remaining_seconds: remaining,
        allocated_seconds: allocated,
        completed_fraction: fraction,
        ends_at,
        as_of: now,
    }
}
