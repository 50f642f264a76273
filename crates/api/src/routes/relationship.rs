//! Route definitions for the `/relationships` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::relationship;
use crate::state::AppState;

/// Routes mounted at `/relationships`.
///
/// ```text
/// GET    /               -> list_relationships
/// POST   /               -> invite
/// GET    /{id}           -> get_relationship
/// POST   /{id}/accept    -> accept
/// POST   /{id}/reject    -> reject
/// POST   /{id}/pause     -> pause
/// POST   /{id}/resume    -> resume
/// POST   /{id}/end       -> end
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(relationship::list_relationships).post(relationship::invite),
        )
        .route("/{id}", get(relationship::get_relationship))
        .route("/{id}/accept", post(relationship::accept))
        .route("/{id}/reject", post(relationship::reject))
        .route("/{id}/pause", post(relationship::pause))
        .route("/{id}/resume", post(relationship::resume))
        .route("/{id}/end", post(relationship::end))
}
