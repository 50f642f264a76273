//! Handlers for the `/tasks` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use keyholder_core::task::TaskStatus;
use keyholder_core::types::DbId;
use keyholder_db::models::task::{CreateTask, ReviewTask, SubmitTask, Task, TaskListParams};
use keyholder_db::repositories::TaskRepo;

use crate::access;
use crate::commands::task::{self as commands, ReviewOutcome, SubmitOutcome};
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/tasks
pub async fn create_task(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateTask>,
) -> AppResult<(StatusCode, Json<DataResponse<Task>>)> {
    let task = commands::create_task(&state.pool, &auth, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: task })))
}

/// GET /api/v1/tasks?relationship_id=&status=
pub async fn list_tasks(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<TaskListParams>,
) -> AppResult<Json<DataResponse<Vec<Task>>>> {
    let status = params
        .status
        .as_deref()
        .map(str::parse::<TaskStatus>)
        .transpose()?;
    let rel = access::visible_relationship(&state.pool, params.relationship_id, &auth).await?;
    let tasks = TaskRepo::list_for_relationship(&state.pool, rel.id, status).await?;
    Ok(Json(DataResponse { data: tasks }))
}

/// GET /api/v1/tasks/{id}
pub async fn get_task(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Task>>> {
    let task = TaskRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| access::not_found("Task", id))?;
    access::visible_relationship(&state.pool, task.relationship_id, &auth).await?;
    Ok(Json(DataResponse { data: task }))
}

/// POST /api/v1/tasks/{id}/submit
pub async fn submit_task(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SubmitTask>,
) -> AppResult<Json<DataResponse<SubmitOutcome>>> {
    let outcome = commands::submit_task(&state.pool, &auth, id, &input, Utc::now()).await?;
    Ok(Json(DataResponse { data: outcome }))
}

/// POST /api/v1/tasks/{id}/review
pub async fn review_task(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ReviewTask>,
) -> AppResult<Json<DataResponse<ReviewOutcome>>> {
    let outcome = commands::review_task(&state.pool, &auth, id, &input, Utc::now()).await?;
    Ok(Json(DataResponse { data: outcome }))
}
