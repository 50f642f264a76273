//! Lock state machine.
//!
//! A lock persists a remaining-seconds snapshot that is only accurate as of
//! `started_at`. Every operation here is a pure function of the current
//! [`LockState`] and an explicit `now`; it returns the next state together
//! with the history action describing it, and the command layer writes both
//! in one transaction.
//!
//! ```text
//!            pause            complete / cancel
//!   active ---------> paused ------------------> completed | cancelled
//!     ^  <---------             (also from active)
//!     |     resume
//!   create            adjust_time: self-loop on active and paused
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::timer;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Longest lock that can be created (365 days).
pub const MAX_LOCK_DURATION_SECS: i64 = 365 * 86_400;

/// Maximum length of a lock name.
pub const MAX_LOCK_NAME_LENGTH: usize = 200;

/// Maximum length of a free-text history reason.
pub const MAX_REASON_LENGTH: usize = 1_000;

const SECS_PER_MINUTE: i64 = 60;
const SECS_PER_HOUR: i64 = 3_600;
const SECS_PER_DAY: i64 = 86_400;

// ---------------------------------------------------------------------------
// Status / action enums
// ---------------------------------------------------------------------------

/// Lifecycle status stored in `locks.status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockStatus {
    Active,
    Paused,
    Completed,
    Cancelled,
}

impl LockStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            LockStatus::Active => "active",
            LockStatus::Paused => "paused",
            LockStatus::Completed => "completed",
            LockStatus::Cancelled => "cancelled",
        }
    }

    /// Completed and cancelled locks accept no further mutation.
    pub fn is_terminal(self) -> bool {
        matches!(self, LockStatus::Completed | LockStatus::Cancelled)
    }
}

impl fmt::Display for LockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LockStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(LockStatus::Active),
            "paused" => Ok(LockStatus::Paused),
            "completed" => Ok(LockStatus::Completed),
            "cancelled" => Ok(LockStatus::Cancelled),
            other => Err(CoreError::Validation(format!(
                "Invalid lock status '{other}'"
            ))),
        }
    }
}

/// Action recorded in `lock_history.action`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockAction {
    Created,
    Paused,
    Resumed,
    TimeAdded,
    TimeRemoved,
    Completed,
    Cancelled,
}

impl LockAction {
    pub fn as_str(self) -> &'static str {
        match self {
            LockAction::Created => "created",
            LockAction::Paused => "paused",
            LockAction::Resumed => "resumed",
            LockAction::TimeAdded => "time_added",
            LockAction::TimeRemoved => "time_removed",
            LockAction::Completed => "completed",
            LockAction::Cancelled => "cancelled",
        }
    }

    /// Whether this action starts the lock clock running.
    pub fn opens_interval(self) -> bool {
        matches!(self, LockAction::Created | LockAction::Resumed)
    }

    /// Whether this action stops the lock clock.
    pub fn closes_interval(self) -> bool {
        matches!(
            self,
            LockAction::Paused | LockAction::Completed | LockAction::Cancelled
        )
    }
}

impl fmt::Display for LockAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LockAction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(LockAction::Created),
            "paused" => Ok(LockAction::Paused),
            "resumed" => Ok(LockAction::Resumed),
            "time_added" => Ok(LockAction::TimeAdded),
            "time_removed" => Ok(LockAction::TimeRemoved),
            "completed" => Ok(LockAction::Completed),
            "cancelled" => Ok(LockAction::Cancelled),
            other => Err(CoreError::Validation(format!(
                "Invalid lock history action '{other}'"
            ))),
        }
    }
}

/// Direction of a manual time adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeDirection {
    Add,
    Remove,
}

impl TimeDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeDirection::Add => "add",
            TimeDirection::Remove => "remove",
        }
    }
}

impl fmt::Display for TimeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Rejections produced by the lock state machine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LockError {
    #[error("Cannot {operation} a lock that is {from}")]
    InvalidTransition {
        from: LockStatus,
        operation: &'static str,
    },

    #[error("This lock does not allow the keyholder to {0} time")]
    CapabilityDenied(TimeDirection),

    #[error("Time change must be at least one minute")]
    ZeroDelta,
}

// ---------------------------------------------------------------------------
// Capabilities / deltas
// ---------------------------------------------------------------------------

/// The three per-lock flags set at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockCapabilities {
    pub allow_keyholder_add_time: bool,
    pub allow_keyholder_remove_time: bool,
    pub allow_sub_request_time: bool,
}

impl LockCapabilities {
    /// Whether a manual adjustment in `direction` is allowed.
    pub fn permits(&self, direction: TimeDirection) -> bool {
        match direction {
            TimeDirection::Add => self.allow_keyholder_add_time,
            TimeDirection::Remove => self.allow_keyholder_remove_time,
        }
    }
}

impl Default for LockCapabilities {
    fn default() -> Self {
        Self {
            allow_keyholder_add_time: true,
            allow_keyholder_remove_time: false,
            allow_sub_request_time: true,
        }
    }
}

/// A non-negative amount of time to add or remove, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeDelta(i64);

impl TimeDelta {
    /// Build a delta from the days/hours/minutes fields of the adjustment form.
    pub fn from_parts(days: i64, hours: i64, minutes: i64) -> Result<Self, CoreError> {
        if days < 0 || hours < 0 || minutes < 0 {
            return Err(CoreError::Validation(
                "Days, hours and minutes must not be negative".to_string(),
            ));
        }
        days.checked_mul(SECS_PER_DAY)
            .and_then(|d| hours.checked_mul(SECS_PER_HOUR).and_then(|h| d.checked_add(h)))
            .and_then(|dh| minutes.checked_mul(SECS_PER_MINUTE).and_then(|m| dh.checked_add(m)))
            .filter(|total| *total <= MAX_LOCK_DURATION_SECS)
            .map(Self)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Time change must not exceed {MAX_LOCK_DURATION_SECS} seconds"
                ))
            })
    }

    pub fn from_seconds(seconds: i64) -> Result<Self, CoreError> {
        if seconds < 0 {
            return Err(CoreError::Validation(
                "Time change must not be negative".to_string(),
            ));
        }
        if seconds > MAX_LOCK_DURATION_SECS {
            return Err(CoreError::Validation(format!(
                "Time change must not exceed {MAX_LOCK_DURATION_SECS} seconds"
            )));
        }
        Ok(Self(seconds))
    }

    pub fn seconds(self) -> i64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate the initial duration of a new lock.
pub fn validate_duration(duration_seconds: i64) -> Result<(), CoreError> {
    if duration_seconds <= 0 {
        return Err(CoreError::Validation(
            "Lock duration must be positive".to_string(),
        ));
    }
    if duration_seconds > MAX_LOCK_DURATION_SECS {
        return Err(CoreError::Validation(format!(
            "Lock duration must not exceed {MAX_LOCK_DURATION_SECS} seconds"
        )));
    }
    Ok(())
}

/// Validate a lock name: non-blank and within length limits.
pub fn validate_lock_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation(
            "Lock name must not be empty".to_string(),
        ));
    }
    if name.chars().count() > MAX_LOCK_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Lock name must be at most {MAX_LOCK_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate an optional free-text reason attached to a history entry.
pub fn validate_reason(reason: Option<&str>) -> Result<(), CoreError> {
    match reason {
        Some(r) if r.chars().count() > MAX_REASON_LENGTH => Err(CoreError::Validation(format!(
            "Reason must be at most {MAX_REASON_LENGTH} characters"
        ))),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// State + transitions
// ---------------------------------------------------------------------------

/// The persisted timing fields of a lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockState {
    pub status: LockStatus,
    pub initial_duration_seconds: i64,
    /// Snapshot valid as of `started_at` while active; exact while paused.
    pub remaining_seconds: i64,
    pub started_at: Timestamp,
    pub paused_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
}

/// Result of a successful operation: the state to persist and the history
/// entry describing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockTransition {
    pub state: LockState,
    pub action: LockAction,
    /// Signed seconds for time actions, 0 otherwise.
    pub time_change_seconds: i64,
}

impl LockState {
    /// State of a freshly created lock. The clock starts at `now`.
    pub fn create(duration_seconds: i64, now: Timestamp) -> Result<LockTransition, CoreError> {
        validate_duration(duration_seconds)?;
        Ok(LockTransition {
            state: LockState {
                status: LockStatus::Active,
                initial_duration_seconds: duration_seconds,
                remaining_seconds: duration_seconds,
                started_at: now,
                paused_at: None,
                completed_at: None,
            },
            action: LockAction::Created,
            time_change_seconds: 0,
        })
    }

    /// Remaining seconds at `now`. See [`timer::remaining_at`].
    pub fn remaining_at(&self, now: Timestamp) -> i64 {
        timer::remaining_at(self, now)
    }

    /// Freeze the clock, storing the current remaining time.
    pub fn pause(&self, now: Timestamp) -> Result<LockTransition, LockError> {
        self.require(LockStatus::Active, "pause")?;
        let mut next = self.clone();
        next.remaining_seconds = self.remaining_at(now);
        next.status = LockStatus::Paused;
        next.paused_at = Some(now);
        Ok(LockTransition {
            state: next,
            action: LockAction::Paused,
            time_change_seconds: 0,
        })
    }

    /// Restart the clock from the frozen snapshot.
    pub fn resume(&self, now: Timestamp) -> Result<LockTransition, LockError> {
        self.require(LockStatus::Paused, "resume")?;
        let mut next = self.clone();
        next.status = LockStatus::Active;
        next.started_at = now;
        next.paused_at = None;
        Ok(LockTransition {
            state: next,
            action: LockAction::Resumed,
            time_change_seconds: 0,
        })
    }

    /// Manual adjustment by the keyholder, gated by the lock's capability flags.
    pub fn adjust_time(
        &self,
        direction: TimeDirection,
        delta: TimeDelta,
        capabilities: &LockCapabilities,
        now: Timestamp,
    ) -> Result<LockTransition, LockError> {
        if delta.is_zero() {
            return Err(LockError::ZeroDelta);
        }
        self.require_open("adjust time on")?;
        if !capabilities.permits(direction) {
            return Err(LockError::CapabilityDenied(direction));
        }
        let change = match direction {
            TimeDirection::Add => delta.seconds(),
            TimeDirection::Remove => -delta.seconds(),
        };
        self.apply_time_change(change, now)
    }

    /// Shift the remaining time by a signed number of seconds.
    ///
    /// Decreases clamp at zero. An active lock is re-snapshotted at `now`
    /// first so the change applies to the time actually left, not to the
    /// stale value stored at `started_at`. The recorded change is the
    /// requested one, even when clamping absorbed part of it.
    pub fn apply_time_change(
        &self,
        change_seconds: i64,
        now: Timestamp,
    ) -> Result<LockTransition, LockError> {
        if change_seconds == 0 {
            return Err(LockError::ZeroDelta);
        }
        self.require_open("adjust time on")?;

        let mut next = self.clone();
        let base = match self.status {
            LockStatus::Active => {
                next.started_at = now;
                self.remaining_at(now)
            }
            _ => self.remaining_seconds,
        };
        next.remaining_seconds = base.saturating_add(change_seconds).max(0);

        let action = if change_seconds > 0 {
            LockAction::TimeAdded
        } else {
            LockAction::TimeRemoved
        };
        Ok(LockTransition {
            state: next,
            action,
            time_change_seconds: change_seconds,
        })
    }

    /// Finish the lock. Terminal.
    pub fn complete(&self, now: Timestamp) -> Result<LockTransition, LockError> {
        self.finish(LockStatus::Completed, LockAction::Completed, "complete", now)
    }

    /// Abandon the lock. Terminal.
    pub fn cancel(&self, now: Timestamp) -> Result<LockTransition, LockError> {
        self.finish(LockStatus::Cancelled, LockAction::Cancelled, "cancel", now)
    }

    fn finish(
        &self,
        status: LockStatus,
        action: LockAction,
        operation: &'static str,
        now: Timestamp,
    ) -> Result<LockTransition, LockError> {
        self.require_open(operation)?;
        let mut next = self.clone();
        next.status = status;
        next.remaining_seconds = 0;
        next.completed_at = Some(now);
        Ok(LockTransition {
            state: next,
            action,
            time_change_seconds: 0,
        })
    }

    fn require(&self, expected: LockStatus, operation: &'static str) -> Result<(), LockError> {
        if self.status == expected {
            Ok(())
        } else {
            Err(LockError::InvalidTransition {
                from: self.status,
                operation,
            })
        }
    }

    fn require_open(&self, operation: &'static str) -> Result<(), LockError> {
        if self.status.is_terminal() {
            Err(LockError::InvalidTransition {
                from: self.status,
                operation,
            })
        } else {
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
