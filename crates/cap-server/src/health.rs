//! Health endpoints

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use sqlx::PgPool;

/// State for health checks
pub struct HealthState {
    /// Present when the server runs against Postgres; absent in the
    /// in-memory fallback.
    pub db: Option<PgPool>,
}

/// GET /health and /health/live
pub async fn liveness() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// GET /health/ready
pub async fn readiness(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    match &state.db {
        Some(pool) => match sqlx::query("SELECT 1").execute(pool).await {
            Ok(_) => (
                StatusCode::OK,
                Json(serde_json::json!({ "status": "ok", "database": "ok" })),
            ),
            Err(err) => {
                tracing::warn!(error = %err, "readiness check failed");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(serde_json::json!({ "status": "degraded", "database": "unreachable" })),
                )
            }
        },
        None => (
            StatusCode::OK,
            Json(serde_json::json!({ "status": "ok", "database": "in-memory" })),
        ),
    }
}
