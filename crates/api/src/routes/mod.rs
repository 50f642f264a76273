pub mod admin;
pub mod health;
pub mod lock;
pub mod notification;
pub mod relationship;
pub mod stats;
pub mod task;
pub mod user;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /users/me                               own profile (GET, PUT)
/// /users/search                           partner search (?q=&role=)
/// /users/{id}                             public profile
///
/// /relationships                          invite, list
/// /relationships/{id}                     get
/// /relationships/{id}/accept              accept invitation (POST)
/// /relationships/{id}/reject              reject invitation (POST)
/// /relationships/{id}/pause               pause (POST)
/// /relationships/{id}/resume              resume (POST)
/// /relationships/{id}/end                 end (POST)
///
/// /locks                                  create, list (?relationship_id=)
/// /locks/{id}                             get with timer reading
/// /locks/{id}/history                     history, newest first
/// /locks/{id}/pause                       pause (POST)
/// /locks/{id}/resume                      resume (POST)
/// /locks/{id}/time                        add or remove time (POST)
/// /locks/{id}/complete                    complete (POST)
/// /locks/{id}/cancel                      cancel (POST)
///
/// /tasks                                  create, list (?relationship_id=&status=)
/// /tasks/{id}                             get
/// /tasks/{id}/submit                      submit proof or quiz answer (POST)
/// /tasks/{id}/review                      approve or reject (POST)
///
/// /notifications                          list
/// /notifications/read-all                 mark all read (POST)
/// /notifications/unread-count             unread count
/// /notifications/{id}                     delete
/// /notifications/{id}/read                mark read (POST)
///
/// /stats/dashboard                        locked time and task counts
///
/// /admin/stats                            platform counts (admin only)
/// /admin/users                            list users
/// /admin/users/{id}/status                change account status (PUT)
/// /admin/relationships                    list all relationships (?status=)
/// /admin/locks                            list all locks (?status=)
/// /admin/audit                            lock history across all locks (?action=)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/users", user::router())
        .nest("/relationships", relationship::router())
        .nest("/locks", lock::router())
        .nest("/tasks", task::router())
        .nest("/notifications", notification::router())
        .nest("/stats", stats::router())
        // Admin oversight; handlers reject non-admins.
        .nest("/admin", admin::router())
}
