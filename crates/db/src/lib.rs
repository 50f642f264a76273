//! PostgreSQL persistence for locks, history, tasks, relationships and
//! notifications.

use serde::Serialize;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

pub mod models;
pub mod repositories;

pub type DbPool = sqlx::PgPool;

static MIGRATOR: Migrator = sqlx::migrate!("../../db/migrations");

/// Name of the trigger that keeps `lock_history` append-only.
const HISTORY_GUARD_TRIGGER: &str = "trg_lock_history_no_update";

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply the embedded migrations in `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

/// How the live schema compares with the migrations built into this binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SchemaStatus {
    /// Newest successfully applied migration, if any.
    pub applied_version: Option<i64>,
    /// Newest migration embedded in this build.
    pub expected_version: Option<i64>,
    /// Whether the append-only guard on `lock_history` is installed.
    pub history_guarded: bool,
}

impl SchemaStatus {
    pub fn is_current(&self) -> bool {
        self.applied_version == self.expected_version && self.history_guarded
    }
}

/// Inspect applied migrations and the history guard trigger.
pub async fn schema_status(pool: &DbPool) -> Result<SchemaStatus, sqlx::Error> {
    let expected_version = MIGRATOR.iter().map(|m| m.version).max();

    let has_ledger: bool =
        sqlx::query_scalar("SELECT to_regclass('public._sqlx_migrations') IS NOT NULL")
            .fetch_one(pool)
            .await?;
    let applied_version: Option<i64> = if has_ledger {
        sqlx::query_scalar("SELECT MAX(version) FROM _sqlx_migrations WHERE success")
            .fetch_one(pool)
            .await?
    } else {
        None
    };

    let history_guarded: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM pg_trigger WHERE tgname = $1 AND NOT tgisinternal)",
    )
    .bind(HISTORY_GUARD_TRIGGER)
    .fetch_one(pool)
    .await?;

    Ok(SchemaStatus {
        applied_version,
        expected_version,
        history_guarded,
    })
}
