//! Route definitions for the `/tasks` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::task;
use crate::state::AppState;

/// Routes mounted at `/tasks`.
///
/// ```text
/// GET    /              -> list_tasks
/// POST   /              -> create_task
/// GET    /{id}          -> get_task
/// POST   /{id}/submit   -> submit_task
/// POST   /{id}/review   -> review_task
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(task::list_tasks).post(task::create_task))
        .route("/{id}", get(task::get_task))
        .route("/{id}/submit", post(task::submit_task))
        .route("/{id}/review", post(task::review_task))
}
