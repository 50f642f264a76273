//! Route definitions for the `/users` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::user;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// GET    /me         -> get_me
/// PUT    /me         -> update_me
/// GET    /search     -> search_users (?q=&role=&limit=)
/// GET    /{id}       -> get_profile
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(user::get_me).put(user::update_me))
        .route("/search", get(user::search_users))
        .route("/{id}", get(user::get_profile))
}
