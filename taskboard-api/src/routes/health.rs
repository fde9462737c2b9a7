/// Health check endpoint

use crate::app::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use taskboard_shared::db::pool;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status: "healthy" or "degraded"
    pub status: String,

    /// Whether the database is reachable
    pub database: bool,

    /// Crate version
    pub version: String,
}

/// GET /health
///
/// Reports process liveness and database reachability. Returns 200 when
/// healthy, 503 when the database is unreachable.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = pool::health_check(&state.db).await.is_ok();

    let (status_code, status) = if database {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status_code,
        Json(HealthResponse {
            status: status.to_string(),
            database,
            version: taskboard_shared::VERSION.to_string(),
        }),
    )
}
