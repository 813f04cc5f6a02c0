//! API module.
//!
//! Health and readiness probes for the running bot.

pub mod handlers;
pub mod routes;
pub mod state;

pub use handlers::{HealthResponse, ReadinessResponse};
pub use routes::create_routes;
pub use state::AppState;
