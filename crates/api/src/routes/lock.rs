//! Route definitions for the `/locks` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::lock;
use crate::state::AppState;

/// Routes mounted at `/locks`.
///
/// ```text
/// GET    /                -> list_locks
/// POST   /                -> create_lock
/// GET    /{id}            -> get_lock
/// GET    /{id}/history    -> get_history
/// POST   /{id}/pause      -> pause_lock
/// POST   /{id}/resume     -> resume_lock
/// POST   /{id}/time       -> adjust_time
/// POST   /{id}/complete   -> complete_lock
/// POST   /{id}/cancel     -> cancel_lock
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(lock::list_locks).post(lock::create_lock))
        .route("/{id}", get(lock::get_lock))
        .route("/{id}/history", get(lock::get_history))
        .route("/{id}/pause", post(lock::pause_lock))
        .route("/{id}/resume", post(lock::resume_lock))
        .route("/{id}/time", post(lock::adjust_time))
        .route("/{id}/complete", post(lock::complete_lock))
        .route("/{id}/cancel", post(lock::cancel_lock))
}
