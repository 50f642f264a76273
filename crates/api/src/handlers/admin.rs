//! Admin-only oversight handlers.
//!
//! Every handler takes [`RequireAdmin`], so non-admin callers get 403 before
//! any query runs.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use keyholder_core::lock::{LockAction, LockStatus};
use keyholder_core::pagination::clamp_offset;
use keyholder_core::relationship::RelationshipStatus;
use keyholder_core::roles::validate_user_status;
use keyholder_core::types::DbId;
use keyholder_db::models::lock_history::AuditEntry;
use keyholder_db::models::relationship::RelationshipSummary;
use keyholder_db::models::stats::PlatformStats;
use keyholder_db::models::user::{UpdateUserStatus, User};
use keyholder_db::repositories::{
    LockHistoryRepo, LockRepo, RelationshipRepo, StatsRepo, UserRepo,
};
use serde::Deserialize;

use super::lock::LockView;
use crate::access;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /admin/locks` and `GET /admin/relationships`.
#[derive(Debug, Deserialize)]
pub struct AdminStatusParams {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Query parameters for `GET /admin/audit`.
#[derive(Debug, Deserialize)]
pub struct AuditParams {
    pub action: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/v1/admin/stats
pub async fn platform_stats(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<PlatformStats>>> {
    let stats = StatsRepo::platform(&state.pool).await?;
    Ok(Json(DataResponse { data: stats }))
}

/// GET /api/v1/admin/users
pub async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<User>>>> {
    let limit = state.config.limits.admin_page.clamp(params.limit);
    let offset = clamp_offset(params.offset);
    let users = UserRepo::list(&state.pool, limit, offset).await?;
    Ok(Json(DataResponse { data: users }))
}

/// PUT /api/v1/admin/users/{id}/status
pub async fn update_user_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUserStatus>,
) -> AppResult<Json<DataResponse<User>>> {
    validate_user_status(&input.status)?;
    if id == admin.user_id {
        return Err(AppError::BadRequest(
            "Admins cannot change their own account status".to_string(),
        ));
    }
    let user = UserRepo::update_status(&state.pool, id, &input.status)
        .await?
        .ok_or_else(|| access::not_found("User", id))?;

    tracing::info!(
        user_id = id,
        status = %user.status,
        admin_id = admin.user_id,
        "User status changed",
    );

    Ok(Json(DataResponse { data: user }))
}

/// GET /api/v1/admin/relationships?status=&limit=&offset=
pub async fn list_relationships(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<AdminStatusParams>,
) -> AppResult<Json<DataResponse<Vec<RelationshipSummary>>>> {
    let status = params
        .status
        .as_deref()
        .map(str::parse::<RelationshipStatus>)
        .transpose()?;
    let limit = state.config.limits.admin_page.clamp(params.limit);
    let offset = clamp_offset(params.offset);

    let relationships = RelationshipRepo::list_all(
        &state.pool,
        status.map(RelationshipStatus::as_str),
        limit,
        offset,
    )
    .await?;
    Ok(Json(DataResponse {
        data: relationships,
    }))
}

/// GET /api/v1/admin/locks?status=&limit=&offset=
pub async fn list_locks(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<AdminStatusParams>,
) -> AppResult<Json<DataResponse<Vec<LockView>>>> {
    let status = params
        .status
        .as_deref()
        .map(str::parse::<LockStatus>)
        .transpose()?;
    let limit = state.config.limits.admin_page.clamp(params.limit);
    let offset = clamp_offset(params.offset);

    let locks = LockRepo::list_all(&state.pool, status.map(LockStatus::as_str), limit, offset)
        .await?;
    Ok(Json(DataResponse {
        data: LockView::all(locks, Utc::now())?,
    }))
}

/// GET /api/v1/admin/audit?action=&limit=&offset=
///
/// Lock history across the whole platform, newest first.
pub async fn audit_log(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<AuditParams>,
) -> AppResult<Json<DataResponse<Vec<AuditEntry>>>> {
    let action = params
        .action
        .as_deref()
        .map(str::parse::<LockAction>)
        .transpose()?;
    let limit = state.config.limits.admin_page.clamp(params.limit);
    let offset = clamp_offset(params.offset);

    let entries =
        LockHistoryRepo::list_recent(&state.pool, action.map(LockAction::as_str), limit, offset)
            .await?;
    Ok(Json(DataResponse { data: entries }))
}
