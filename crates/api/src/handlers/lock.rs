//! Handlers for the `/locks` resource.
//!
//! Every lock returned carries a projected [`TimerReading`] so clients can
//! render the countdown and re-project it locally once per tick.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use keyholder_core::error::CoreError;
use keyholder_core::lock::TimeDelta;
use keyholder_core::timer::{self, TimerReading};
use keyholder_core::types::{DbId, Timestamp};
use keyholder_db::models::lock::{AdjustLockTime, CreateLock, Lock, LockCommandBody};
use keyholder_db::models::lock_history::{LockHistoryEntry, LockHistoryWithPerformer};
use keyholder_db::repositories::{LockHistoryRepo, LockRepo};
use serde::Serialize;

use crate::access;
use crate::commands::lock::{self as commands, LockOutcome};
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::RelationshipParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// A lock row with its timer projected at request time.
#[derive(Debug, Serialize)]
pub struct LockView {
    #[serde(flatten)]
    pub lock: Lock,
    pub timer: TimerReading,
}

impl LockView {
    pub fn at(lock: Lock, now: Timestamp) -> Result<Self, CoreError> {
        let timer = timer::project(&lock.to_state()?, now);
        Ok(Self { lock, timer })
    }

    pub fn all(locks: Vec<Lock>, now: Timestamp) -> Result<Vec<Self>, CoreError> {
        locks.into_iter().map(|l| Self::at(l, now)).collect()
    }
}

/// Response body of every lock command.
#[derive(Debug, Serialize)]
pub struct LockCommandResponse {
    pub lock: LockView,
    pub history: LockHistoryEntry,
}

impl LockCommandResponse {
    fn from_outcome(outcome: LockOutcome, now: Timestamp) -> Result<Self, CoreError> {
        Ok(Self {
            lock: LockView::at(outcome.lock, now)?,
            history: outcome.history,
        })
    }
}

type CommandResult = AppResult<Json<DataResponse<LockCommandResponse>>>;

/// POST /api/v1/locks
pub async fn create_lock(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateLock>,
) -> AppResult<(StatusCode, Json<DataResponse<LockCommandResponse>>)> {
    let duration = TimeDelta::from_parts(input.days, input.hours, input.minutes)?;
    state.config.limits.ensure_lock_duration(duration.seconds())?;
    let now = Utc::now();
    let outcome = commands::create_lock(&state.pool, &auth, &input, now).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: LockCommandResponse::from_outcome(outcome, now)?,
        }),
    ))
}

/// GET /api/v1/locks?relationship_id=
pub async fn list_locks(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<RelationshipParams>,
) -> AppResult<Json<DataResponse<Vec<LockView>>>> {
    let rel = access::visible_relationship(&state.pool, params.relationship_id, &auth).await?;
    let locks = LockRepo::list_for_relationship(&state.pool, rel.id).await?;
    Ok(Json(DataResponse {
        data: LockView::all(locks, Utc::now())?,
    }))
}

/// GET /api/v1/locks/{id}
pub async fn get_lock(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<LockView>>> {
    let lock = LockRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| access::not_found("Lock", id))?;
    access::visible_relationship(&state.pool, lock.relationship_id, &auth).await?;
    Ok(Json(DataResponse {
        data: LockView::at(lock, Utc::now())?,
    }))
}

/// GET /api/v1/locks/{id}/history
pub async fn get_history(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<LockHistoryWithPerformer>>>> {
    let lock = LockRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| access::not_found("Lock", id))?;
    access::visible_relationship(&state.pool, lock.relationship_id, &auth).await?;
    let history = LockHistoryRepo::list_for_lock(&state.pool, id).await?;
    Ok(Json(DataResponse { data: history }))
}

/// POST /api/v1/locks/{id}/pause
pub async fn pause_lock(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    body: Option<Json<LockCommandBody>>,
) -> CommandResult {
    let now = Utc::now();
    let outcome = commands::pause_lock(&state.pool, &auth, id, reason(&body), now).await?;
    respond(outcome, now)
}

/// POST /api/v1/locks/{id}/resume
pub async fn resume_lock(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    body: Option<Json<LockCommandBody>>,
) -> CommandResult {
    let now = Utc::now();
    let outcome = commands::resume_lock(&state.pool, &auth, id, reason(&body), now).await?;
    respond(outcome, now)
}

/// POST /api/v1/locks/{id}/time
pub async fn adjust_time(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<AdjustLockTime>,
) -> CommandResult {
    let now = Utc::now();
    let outcome = commands::adjust_lock_time(&state.pool, &auth, id, &input, now).await?;
    respond(outcome, now)
}

/// POST /api/v1/locks/{id}/complete
pub async fn complete_lock(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    body: Option<Json<LockCommandBody>>,
) -> CommandResult {
    let now = Utc::now();
    let outcome = commands::complete_lock(&state.pool, &auth, id, reason(&body), now).await?;
    respond(outcome, now)
}

/// POST /api/v1/locks/{id}/cancel
pub async fn cancel_lock(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    body: Option<Json<LockCommandBody>>,
) -> CommandResult {
    let now = Utc::now();
    let outcome = commands::cancel_lock(&state.pool, &auth, id, reason(&body), now).await?;
    respond(outcome, now)
}

/// The optional reason of a state command. The body itself may be omitted.
fn reason(body: &Option<Json<LockCommandBody>>) -> Option<&str> {
    body.as_ref().and_then(|Json(b)| b.reason.as_deref())
}

fn respond(outcome: LockOutcome, now: Timestamp) -> CommandResult {
    Ok(Json(DataResponse {
        data: LockCommandResponse::from_outcome(outcome, now)?,
    }))
}
