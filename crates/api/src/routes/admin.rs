//! Route definitions for admin oversight.
//!
//! Every handler requires the `admin` role via `RequireAdmin`.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// GET    /stats                -> platform_stats
/// GET    /users                -> list_users
/// PUT    /users/{id}/status    -> update_user_status
/// GET    /relationships        -> list_relationships
/// GET    /locks                -> list_locks
/// GET    /audit                -> audit_log
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(admin::platform_stats))
        .route("/users", get(admin::list_users))
        .route("/users/{id}/status", put(admin::update_user_status))
        .route("/relationships", get(admin::list_relationships))
        .route("/locks", get(admin::list_locks))
        .route("/audit", get(admin::audit_log))
}
