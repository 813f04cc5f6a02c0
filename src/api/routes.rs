//! 라우트 설정 모듈.

use axum::{routing::get, Router};

use crate::api::handlers::{health_handler, readiness_handler};
use crate::api::state::AppState;

/// Creates the health server routes.
///
/// # Routes
///
/// - `GET /health` - Liveness probe
/// - `GET /ready` - Readiness probe
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/ready", get(readiness_handler))
        .with_state(state)
}
