//! Dashboard statistics for the authenticated user.

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use keyholder_core::lock_stats::{self, LockedTimeSummary, Window};
use keyholder_db::models::task::TaskStatusCount;
use keyholder_db::repositories::{LockHistoryRepo, LockRepo, RelationshipRepo, TaskRepo};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /stats/dashboard`.
#[derive(Debug, Deserialize)]
pub struct DashboardParams {
    /// Extra trailing window in days, clamped to `1..=MAX_STATS_WINDOW_DAYS`.
    pub days: Option<i64>,
}

/// Locked time inside a caller-chosen trailing window.
#[derive(Debug, Serialize)]
pub struct CustomWindow {
    pub days: i64,
    pub seconds: i64,
    pub display: String,
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub active_relationships: usize,
    pub locked_time: LockedTimeSummary,
    pub last_7_days_display: String,
    pub last_30_days_display: String,
    pub custom_window: Option<CustomWindow>,
    pub task_counts: Vec<TaskStatusCount>,
}

/// GET /api/v1/stats/dashboard?days=
///
/// Locked time is replayed from history over the caller's active
/// relationships; nothing is cached.
pub async fn dashboard(
    RequireAuth(auth): RequireAuth,
    State(state): State<AppState>,
    Query(params): Query<DashboardParams>,
) -> AppResult<Json<DataResponse<DashboardStats>>> {
    let now = Utc::now();
    let relationship_ids = RelationshipRepo::active_ids_for_user(&state.pool, auth.user_id).await?;
    let lock_ids = LockRepo::ids_for_relationships(&state.pool, &relationship_ids).await?;
    let points = LockHistoryRepo::points_for_locks(&state.pool, &lock_ids, now)
        .await?
        .iter()
        .map(|row| row.to_point())
        .collect::<Result<Vec<_>, _>>()?;

    let locked_time = lock_stats::summarize(&points, now);
    let custom_window = params.days.map(|days| {
        let days = state.config.limits.stats_window_days(days);
        let seconds =
            lock_stats::total_locked_seconds(&points, &Window::trailing(days, now), now);
        CustomWindow {
            days,
            seconds,
            display: lock_stats::format_days_hours(seconds),
        }
    });
    let task_counts = TaskRepo::counts_by_status(&state.pool, &relationship_ids).await?;

    Ok(Json(DataResponse {
        data: DashboardStats {
            active_relationships: relationship_ids.len(),
            last_7_days_display: lock_stats::format_days_hours(locked_time.last_7_days_seconds),
            last_30_days_display: lock_stats::format_days_hours(locked_time.last_30_days_seconds),
            locked_time,
            custom_window,
            task_counts,
        },
    }))
}
