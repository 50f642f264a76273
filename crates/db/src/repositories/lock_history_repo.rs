//! Repository for the append-only `lock_history` table.
//!
//! No update or delete methods exist here, and the table rejects updates
//! with a trigger.

use keyholder_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::lock_history::{
    AuditEntry, HistoryPointRow, LockHistoryEntry, LockHistoryWithPerformer, NewHistoryEntry,
};

/// Column list for `lock_history` queries.
const COLUMNS: &str =
    "id, lock_id, action, performed_by, time_change_seconds, reason, created_at";

/// Provides append and read access to lock history.
pub struct LockHistoryRepo;

impl LockHistoryRepo {
    /// Append a history row stamped with `at`.
    pub async fn insert(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        entry: &NewHistoryEntry<'_>,
        at: Timestamp,
    ) -> Result<LockHistoryEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO lock_history \
                (lock_id, action, performed_by, time_change_seconds, reason, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LockHistoryEntry>(&query)
            .bind(entry.lock_id)
            .bind(entry.action.as_str())
            .bind(entry.performed_by)
            .bind(entry.time_change_seconds)
            .bind(entry.reason)
            .bind(at)
            .fetch_one(&mut **tx)
            .await
    }

    /// A lock's history, newest first, with performer names.
    pub async fn list_for_lock(
        pool: &PgPool,
        lock_id: DbId,
    ) -> Result<Vec<LockHistoryWithPerformer>, sqlx::Error> {
        sqlx::query_as::<_, LockHistoryWithPerformer>(
            "SELECT h.id, h.lock_id, h.action, h.performed_by, u.display_name AS performer_name, \
                    h.time_change_seconds, h.reason, h.created_at \
             FROM lock_history h \
             LEFT JOIN users u ON u.id = h.performed_by \
             WHERE h.lock_id = $1 \
             ORDER BY h.created_at DESC, h.id DESC",
        )
        .bind(lock_id)
        .fetch_all(pool)
        .await
    }

    /// History across every lock, newest first, optionally filtered by action.
    pub async fn list_recent(
        pool: &PgPool,
        action: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AuditEntry>, sqlx::Error> {
        sqlx::query_as::<_, AuditEntry>(
            "SELECT h.id, h.lock_id, l.name AS lock_name, l.relationship_id, h.action, \
                    h.performed_by, u.display_name AS performer_name, \
                    h.time_change_seconds, h.reason, h.created_at \
             FROM lock_history h \
             JOIN locks l ON l.id = h.lock_id \
             LEFT JOIN users u ON u.id = h.performed_by \
             WHERE ($1::TEXT IS NULL OR h.action = $1) \
             ORDER BY h.created_at DESC, h.id DESC \
             LIMIT $2 OFFSET $3",
        )
        .bind(action)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// History points for the given locks up to `until`.
    ///
    /// Rows before a reporting window are included so intervals that opened
    /// earlier are still credited for their in-window part.
    pub async fn points_for_locks(
        pool: &PgPool,
        lock_ids: &[DbId],
        until: Timestamp,
    ) -> Result<Vec<HistoryPointRow>, sqlx::Error> {
        sqlx::query_as::<_, HistoryPointRow>(
            "SELECT lock_id, action, created_at \
             FROM lock_history \
             WHERE lock_id = ANY($1) AND created_at <= $2 \
             ORDER BY lock_id, created_at, id",
        )
        .bind(lock_ids)
        .bind(until)
        .fetch_all(pool)
        .await
    }
}
