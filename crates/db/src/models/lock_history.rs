//! Lock history models.
//!
//! History rows are append-only; there is no update DTO.

use keyholder_core::error::CoreError;
use keyholder_core::lock::LockAction;
use keyholder_core::lock_stats::HistoryPoint;
use keyholder_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `lock_history` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LockHistoryEntry {
    pub id: DbId,
    pub lock_id: DbId,
    pub action: String,
    pub performed_by: Option<DbId>,
    pub time_change_seconds: i64,
    pub reason: Option<String>,
    pub created_at: Timestamp,
}

/// History row joined with the display name of whoever performed it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LockHistoryWithPerformer {
    pub id: DbId,
    pub lock_id: DbId,
    pub action: String,
    pub performed_by: Option<DbId>,
    pub performer_name: Option<String>,
    pub time_change_seconds: i64,
    pub reason: Option<String>,
    pub created_at: Timestamp,
}

/// History row as shown in the admin audit log: with the lock's name, its
/// relationship and the performer's display name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AuditEntry {
    pub id: DbId,
    pub lock_id: DbId,
    pub lock_name: String,
    pub relationship_id: DbId,
    pub action: String,
    pub performed_by: Option<DbId>,
    pub performer_name: Option<String>,
    pub time_change_seconds: i64,
    pub reason: Option<String>,
    pub created_at: Timestamp,
}

/// Insert parameters for a history row.
#[derive(Debug, Clone, Copy)]
pub struct NewHistoryEntry<'a> {
    pub lock_id: DbId,
    pub action: LockAction,
    pub performed_by: Option<DbId>,
    pub time_change_seconds: i64,
    pub reason: Option<&'a str>,
}

/// The columns the locked-time replay reads.
#[derive(Debug, Clone, FromRow)]
pub struct HistoryPointRow {
    pub lock_id: DbId,
    pub action: String,
    pub created_at: Timestamp,
}

impl HistoryPointRow {
    pub fn to_point(&self) -> Result<HistoryPoint, CoreError> {
        Ok(HistoryPoint {
            lock_id: self.lock_id,
            action: self.action.parse()?,
            at: self.created_at,
        })
    }
}
