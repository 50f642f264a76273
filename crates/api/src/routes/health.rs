//! Liveness and schema readiness.
//!
//! Besides reachability, the service depends on every migration being
//! applied and on `lock_history` rejecting updates; a database missing
//! either reports `degraded`. `server_time` lets clients correct their clock
//! before projecting lock timers locally.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use chrono::Utc;
use keyholder_core::types::Timestamp;
use keyholder_db::SchemaStatus;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok` when the database is reachable and the schema is current.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Absent when the database could not be inspected.
    pub schema: Option<SchemaStatus>,
    pub server_time: Timestamp,
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = keyholder_db::health_check(&state.pool).await.is_ok();
    let schema = if db_healthy {
        match keyholder_db::schema_status(&state.pool).await {
            Ok(schema) => Some(schema),
            Err(e) => {
                tracing::warn!(error = %e, "Schema inspection failed");
                None
            }
        }
    } else {
        None
    };

    let ready = schema.is_some_and(|s| s.is_current());
    if db_healthy && !ready {
        tracing::warn!(schema = ?schema, "Database schema is behind this build");
    }

    Json(HealthResponse {
        status: if ready { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        schema,
        server_time: Utc::now(),
    })
}

/// Mounted at the root, outside `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
