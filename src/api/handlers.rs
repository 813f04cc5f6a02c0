//! HTTP request handler module.

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};

use crate::api::state::AppState;

/// Health check response.
#[derive(serde::Serialize, serde::Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Liveness probe handler.
///
/// Returns OK while the process is running.
///
/// # Route
///
/// `GET /health`
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness check response.
#[derive(serde::Serialize, serde::Deserialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub storage: String,
    pub last_post_at: Option<DateTime<Utc>>,
}

/// Readiness probe handler.
///
/// Checks storage connectivity and reports when the last entry was posted.
///
/// # Route
///
/// `GET /ready`
pub async fn readiness_handler(
    State(state): State<AppState>,
) -> Result<Json<ReadinessResponse>, (StatusCode, Json<ReadinessResponse>)> {
    let storage_ok = match state.store.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check: storage unavailable");
            false
        }
    };

    let last_post_at = if storage_ok {
        state.store.last_post_time().await.ok().flatten()
    } else {
        None
    };

    let response = ReadinessResponse {
        status: if storage_ok { "ok" } else { "degraded" }.to_string(),
        storage: if storage_ok {
            "connected"
        } else {
            "disconnected"
        }
        .to_string(),
        last_post_at,
    };

    if storage_ok {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}
