//! Platform-wide counts for the admin dashboard.

use sqlx::PgPool;

use crate::models::stats::PlatformStats;

/// Provides aggregate queries across all tables.
pub struct StatsRepo;

impl StatsRepo {
    pub async fn platform(pool: &PgPool) -> Result<PlatformStats, sqlx::Error> {
        sqlx::query_as::<_, PlatformStats>(
            "SELECT \
                (SELECT COUNT(*) FROM users) AS total_users, \
                (SELECT COUNT(*) FROM users WHERE status = 'active') AS active_users, \
                (SELECT COUNT(*) FROM relationships) AS total_relationships, \
                (SELECT COUNT(*) FROM relationships WHERE status = 'active') AS active_relationships, \
                (SELECT COUNT(*) FROM locks) AS total_locks, \
                (SELECT COUNT(*) FROM locks WHERE status = 'active') AS active_locks, \
                (SELECT COUNT(*) FROM tasks) AS total_tasks, \
                (SELECT COUNT(*) FROM tasks WHERE status = 'pending') AS pending_tasks, \
                (SELECT COUNT(*) FROM notifications) AS total_notifications",
        )
        .fetch_one(pool)
        .await
    }
}
