//! Repository for the `locks` table.

use keyholder_core::lock::{LockCapabilities, LockState};
use keyholder_core::types::DbId;
use sqlx::PgPool;

use crate::models::lock::Lock;

/// Column list for `locks` queries.
const COLUMNS: &str = "id, relationship_id, name, description, status, \
    initial_duration_seconds, remaining_seconds, started_at, paused_at, completed_at, \
    allow_keyholder_add_time, allow_keyholder_remove_time, allow_sub_request_time, \
    created_at, updated_at";

/// Provides persistence for locks. Timing fields are only ever written from a
/// [`LockState`] produced by the core state machine.
pub struct LockRepo;

impl LockRepo {
    /// Insert a new lock with its initial state.
    pub async fn insert(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        relationship_id: DbId,
        name: &str,
        description: Option<&str>,
        state: &LockState,
        capabilities: &LockCapabilities,
    ) -> Result<Lock, sqlx::Error> {
        let query = format!(
            "INSERT INTO locks \
                (relationship_id, name, description, status, initial_duration_seconds, \
                 remaining_seconds, started_at, paused_at, completed_at, \
                 allow_keyholder_add_time, allow_keyholder_remove_time, allow_sub_request_time, \
                 created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $7, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Lock>(&query)
            .bind(relationship_id)
            .bind(name)
            .bind(description)
            .bind(state.status.as_str())
            .bind(state.initial_duration_seconds)
            .bind(state.remaining_seconds)
            .bind(state.started_at)
            .bind(state.paused_at)
            .bind(state.completed_at)
            .bind(capabilities.allow_keyholder_add_time)
            .bind(capabilities.allow_keyholder_remove_time)
            .bind(capabilities.allow_sub_request_time)
            .fetch_one(&mut **tx)
            .await
    }

    /// Find a lock by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Lock>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM locks WHERE id = $1");
        sqlx::query_as::<_, Lock>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Load a lock inside a transaction, holding its row lock until commit so
    /// concurrent commands on the same lock run one after another.
    pub async fn find_for_update(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<Option<Lock>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM locks WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Lock>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Load a lock inside a transaction, keeping it from changing status
    /// until commit while still allowing other readers.
    pub async fn find_for_share(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<Option<Lock>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM locks WHERE id = $1 FOR SHARE");
        sqlx::query_as::<_, Lock>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Persist the state produced by a transition.
    pub async fn update_state(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
        state: &LockState,
    ) -> Result<Lock, sqlx::Error> {
        let query = format!(
            "UPDATE locks SET \
                status = $2, \
                remaining_seconds = $3, \
                started_at = $4, \
                paused_at = $5, \
                completed_at = $6, \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Lock>(&query)
            .bind(id)
            .bind(state.status.as_str())
            .bind(state.remaining_seconds)
            .bind(state.started_at)
            .bind(state.paused_at)
            .bind(state.completed_at)
            .fetch_one(&mut **tx)
            .await
    }

    /// Locks belonging to a relationship, newest first.
    pub async fn list_for_relationship(
        pool: &PgPool,
        relationship_id: DbId,
    ) -> Result<Vec<Lock>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM locks \
             WHERE relationship_id = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Lock>(&query)
            .bind(relationship_id)
            .fetch_all(pool)
            .await
    }

    /// All locks on the platform, optionally filtered by status.
    pub async fn list_all(
        pool: &PgPool,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Lock>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM locks \
             WHERE ($1::TEXT IS NULL OR status = $1) \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Lock>(&query)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// IDs of every lock under the given relationships.
    pub async fn ids_for_relationships(
        pool: &PgPool,
        relationship_ids: &[DbId],
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT id FROM locks WHERE relationship_id = ANY($1) ORDER BY id")
            .bind(relationship_ids)
            .fetch_all(pool)
            .await
    }
}
