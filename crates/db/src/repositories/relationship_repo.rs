//! Repository for the `relationships` table.

use keyholder_core::relationship::RelationshipStatus;
use keyholder_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::relationship::{Relationship, RelationshipSummary};

/// Column list for `relationships` queries.
const COLUMNS: &str = "id, keyholder_id, sub_id, initiated_by, status, \
    started_at, ended_at, created_at, updated_at";

/// Relationship rows joined with both participants' display names.
const SUMMARY_SELECT: &str = "SELECT r.id, r.keyholder_id, k.display_name AS keyholder_name, \
            r.sub_id, s.display_name AS sub_name, r.initiated_by, r.status, \
            r.started_at, r.ended_at, r.created_at \
     FROM relationships r \
     JOIN users k ON k.id = r.keyholder_id \
     JOIN users s ON s.id = r.sub_id";

/// Provides operations for keyholder/sub relationships.
pub struct RelationshipRepo;

impl RelationshipRepo {
    /// Insert a pending relationship.
    ///
    /// Fails with the `uq_relationships_open_pair` unique violation when the
    /// pair already has a relationship that has not ended.
    pub async fn create(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        keyholder_id: DbId,
        sub_id: DbId,
        initiated_by: DbId,
    ) -> Result<Relationship, sqlx::Error> {
        let query = format!(
            "INSERT INTO relationships (keyholder_id, sub_id, initiated_by) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Relationship>(&query)
            .bind(keyholder_id)
            .bind(sub_id)
            .bind(initiated_by)
            .fetch_one(&mut **tx)
            .await
    }

    /// Find a relationship by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Relationship>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM relationships WHERE id = $1");
        sqlx::query_as::<_, Relationship>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Load a relationship inside a transaction, taking a row lock.
    pub async fn find_for_update(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<Option<Relationship>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM relationships WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Relationship>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Load a relationship inside a transaction with a shared row lock, so it
    /// cannot change status while a lock or task command depends on it.
    pub async fn find_for_share(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<Option<Relationship>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM relationships WHERE id = $1 FOR SHARE");
        sqlx::query_as::<_, Relationship>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Set a new status, stamping `started_at` on activation and `ended_at`
    /// on ending.
    pub async fn update_status(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
        status: RelationshipStatus,
        now: Timestamp,
    ) -> Result<Relationship, sqlx::Error> {
        let query = format!(
            "UPDATE relationships SET \
                status = $2, \
                started_at = CASE WHEN $2 = 'active' THEN COALESCE(started_at, $3) ELSE started_at END, \
                ended_at = CASE WHEN $2 = 'ended' THEN $3 ELSE ended_at END, \
                updated_at = $3 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Relationship>(&query)
            .bind(id)
            .bind(status.as_str())
            .bind(now)
            .fetch_one(&mut **tx)
            .await
    }

    /// Every relationship the user takes part in, with both display names.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<RelationshipSummary>, sqlx::Error> {
        let query = format!(
            "{SUMMARY_SELECT} \
             WHERE r.keyholder_id = $1 OR r.sub_id = $1 \
             ORDER BY r.created_at DESC, r.id DESC"
        );
        sqlx::query_as::<_, RelationshipSummary>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Every relationship on the platform, newest first, optionally filtered
    /// by status.
    pub async fn list_all(
        pool: &PgPool,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<RelationshipSummary>, sqlx::Error> {
        let query = format!(
            "{SUMMARY_SELECT} \
             WHERE ($1::TEXT IS NULL OR r.status = $1) \
             ORDER BY r.created_at DESC, r.id DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, RelationshipSummary>(&query)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// IDs of the user's relationships that are currently active.
    pub async fn active_ids_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT id FROM relationships \
             WHERE (keyholder_id = $1 OR sub_id = $1) AND status = 'active' \
             ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
