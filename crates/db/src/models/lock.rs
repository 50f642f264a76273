//! Lock models and DTOs.

use keyholder_core::error::CoreError;
use keyholder_core::lock::{LockCapabilities, LockState, TimeDirection};
use keyholder_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `locks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Lock {
    pub id: DbId,
    pub relationship_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub initial_duration_seconds: i64,
    pub remaining_seconds: i64,
    pub started_at: Timestamp,
    pub paused_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub allow_keyholder_add_time: bool,
    pub allow_keyholder_remove_time: bool,
    pub allow_sub_request_time: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Lock {
    /// The timing fields as a domain value. Fails only if the stored status
    /// is not one the state machine knows.
    pub fn to_state(&self) -> Result<LockState, CoreError> {
        Ok(LockState {
            status: self.status.parse()?,
            initial_duration_seconds: self.initial_duration_seconds,
            remaining_seconds: self.remaining_seconds,
            started_at: self.started_at,
            paused_at: self.paused_at,
            completed_at: self.completed_at,
        })
    }

    pub fn capabilities(&self) -> LockCapabilities {
        LockCapabilities {
            allow_keyholder_add_time: self.allow_keyholder_add_time,
            allow_keyholder_remove_time: self.allow_keyholder_remove_time,
            allow_sub_request_time: self.allow_sub_request_time,
        }
    }
}

/// DTO for creating a lock. The duration is entered as days, hours and
/// minutes; capability flags fall back to [`LockCapabilities::default`].
#[derive(Debug, Deserialize)]
pub struct CreateLock {
    pub relationship_id: DbId,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub days: i64,
    #[serde(default)]
    pub hours: i64,
    #[serde(default)]
    pub minutes: i64,
    pub allow_keyholder_add_time: Option<bool>,
    pub allow_keyholder_remove_time: Option<bool>,
    pub allow_sub_request_time: Option<bool>,
}

impl CreateLock {
    pub fn capabilities(&self) -> LockCapabilities {
        let defaults = LockCapabilities::default();
        LockCapabilities {
            allow_keyholder_add_time: self
                .allow_keyholder_add_time
                .unwrap_or(defaults.allow_keyholder_add_time),
            allow_keyholder_remove_time: self
                .allow_keyholder_remove_time
                .unwrap_or(defaults.allow_keyholder_remove_time),
            allow_sub_request_time: self
                .allow_sub_request_time
                .unwrap_or(defaults.allow_sub_request_time),
        }
    }
}

/// DTO for a manual time adjustment.
#[derive(Debug, Deserialize)]
pub struct AdjustLockTime {
    pub direction: TimeDirection,
    #[serde(default)]
    pub days: i64,
    #[serde(default)]
    pub hours: i64,
    #[serde(default)]
    pub minutes: i64,
    pub reason: Option<String>,
}

/// Optional body for pause, resume, complete and cancel.
#[derive(Debug, Default, Deserialize)]
pub struct LockCommandBody {
    pub reason: Option<String>,
}
