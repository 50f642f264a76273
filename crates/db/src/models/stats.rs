//! Aggregate counts for dashboards.

use serde::Serialize;
use sqlx::FromRow;

/// Platform-wide counts shown on the admin dashboard.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PlatformStats {
    pub total_users: i64,
    pub active_users: i64,
    pub total_relationships: i64,
    pub active_relationships: i64,
    pub total_locks: i64,
    pub active_locks: i64,
    pub total_tasks: i64,
    pub pending_tasks: i64,
    pub total_notifications: i64,
}
