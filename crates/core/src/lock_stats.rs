//! Locked-time statistics derived from lock history.
//!
//! Locked time is never stored. It is rebuilt by replaying each lock's
//! history: `created`/`resumed` opens an interval, the next
//! `paused`/`completed`/`cancelled` closes it, and every interval is clipped
//! to the reporting window before being summed.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::lock::LockAction;
use crate::types::{DbId, Timestamp};

/// Trailing windows shown on the dashboard.
pub const SHORT_WINDOW_DAYS: i64 = 7;
pub const LONG_WINDOW_DAYS: i64 = 30;

/// Upper bound for caller-supplied window lengths.
pub const MAX_WINDOW_DAYS: i64 = 365;

/// The subset of a history row the replay needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryPoint {
    pub lock_id: DbId,
    pub action: LockAction,
    pub at: Timestamp,
}

/// A half-open reporting range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl Window {
    /// The `days` leading up to `now`.
    pub fn trailing(days: i64, now: Timestamp) -> Self {
        Self {
            start: now - chrono::Duration::days(days),
            end: now,
        }
    }
}

/// One stretch of time during which a lock's clock was running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockedInterval {
    pub lock_id: DbId,
    pub opened_at: Timestamp,
    /// `None` while the lock is still running.
    pub closed_at: Option<Timestamp>,
}

impl LockedInterval {
    /// Seconds of this interval that fall inside `window`, counting an open
    /// interval up to `now` at the latest.
    pub fn seconds_within(&self, window: &Window, now: Timestamp) -> i64 {
        let end = match self.closed_at {
            Some(closed) => closed.min(window.end),
            None => now.min(window.end),
        };
        let start = self.opened_at.max(window.start);
        (end - start).num_seconds().max(0)
    }
}

/// Rebuild running intervals from history rows in any order.
///
/// Rows are grouped per lock and sorted by timestamp. A second opening
/// action while an interval is already open is ignored, and a closing
/// action without an open interval is ignored.
pub fn replay_intervals(points: &[HistoryPoint]) -> Vec<LockedInterval> {
    let mut per_lock: BTreeMap<DbId, Vec<&HistoryPoint>> = BTreeMap::new();
    for point in points {
        per_lock.entry(point.lock_id).or_default().push(point);
    }

    let mut intervals = Vec::new();
    for (lock_id, mut rows) in per_lock {
        rows.sort_by_key(|p| p.at);
        let mut open: Option<Timestamp> = None;
        for row in rows {
            if row.action.opens_interval() {
                open.get_or_insert(row.at);
            } else if row.action.closes_interval() {
                if let Some(opened_at) = open.take() {
                    intervals.push(LockedInterval {
                        lock_id,
                        opened_at,
                        closed_at: Some(row.at),
                    });
                }
            }
        }
        if let Some(opened_at) = open {
            intervals.push(LockedInterval {
                lock_id,
                opened_at,
                closed_at: None,
            });
        }
    }
    intervals
}

/// Total seconds locked inside `window` across every lock in `points`.
pub fn total_locked_seconds(points: &[HistoryPoint], window: &Window, now: Timestamp) -> i64 {
    replay_intervals(points)
        .iter()
        .map(|interval| interval.seconds_within(window, now))
        .sum()
}

/// Dashboard figures for the two standard trailing windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LockedTimeSummary {
    pub last_7_days_seconds: i64,
    pub last_30_days_seconds: i64,
}

pub fn summarize(points: &[HistoryPoint], now: Timestamp) -> LockedTimeSummary {
    let intervals = replay_intervals(points);
    let sum = |window: Window| -> i64 {
        intervals
            .iter()
            .map(|i| i.seconds_within(&window, now))
            .sum()
    };
    LockedTimeSummary {
        last_7_days_seconds: sum(Window::trailing(SHORT_WINDOW_DAYS, now)),
        last_30_days_seconds: sum(Window::trailing(LONG_WINDOW_DAYS, now)),
    }
}

/// Render seconds as whole days and hours, e.g. `"2 d 5 h"`.
pub fn format_days_hours(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    format!("{days} d {hours} h")
}
