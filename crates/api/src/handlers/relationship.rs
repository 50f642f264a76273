//! Handlers for the `/relationships` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use keyholder_core::relationship::RelationshipAction;
use keyholder_core::types::DbId;
use keyholder_db::models::relationship::{InviteRelationship, Relationship, RelationshipSummary};
use keyholder_db::repositories::RelationshipRepo;

use crate::access;
use crate::commands::relationship as commands;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

type RelationshipResult = AppResult<Json<DataResponse<Relationship>>>;

/// POST /api/v1/relationships
pub async fn invite(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<InviteRelationship>,
) -> AppResult<(StatusCode, Json<DataResponse<Relationship>>)> {
    let rel = commands::invite(&state.pool, &auth, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: rel })))
}

/// GET /api/v1/relationships
pub async fn list_relationships(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<RelationshipSummary>>>> {
    let rels = RelationshipRepo::list_for_user(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: rels }))
}

/// GET /api/v1/relationships/{id}
pub async fn get_relationship(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> RelationshipResult {
    let rel = access::visible_relationship(&state.pool, id, &auth).await?;
    Ok(Json(DataResponse { data: rel }))
}

/// POST /api/v1/relationships/{id}/accept
pub async fn accept(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> RelationshipResult {
    apply(&state, &auth, id, RelationshipAction::Accept).await
}

/// POST /api/v1/relationships/{id}/reject
pub async fn reject(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> RelationshipResult {
    apply(&state, &auth, id, RelationshipAction::Reject).await
}

/// POST /api/v1/relationships/{id}/pause
pub async fn pause(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> RelationshipResult {
    apply(&state, &auth, id, RelationshipAction::Pause).await
}

/// POST /api/v1/relationships/{id}/resume
pub async fn resume(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> RelationshipResult {
    apply(&state, &auth, id, RelationshipAction::Resume).await
}

/// POST /api/v1/relationships/{id}/end
pub async fn end(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> RelationshipResult {
    apply(&state, &auth, id, RelationshipAction::End).await
}

async fn apply(
    state: &AppState,
    auth: &AuthUser,
    id: DbId,
    action: RelationshipAction,
) -> RelationshipResult {
    let rel = commands::transition(&state.pool, auth, id, action, Utc::now()).await?;
    Ok(Json(DataResponse { data: rel }))
}
