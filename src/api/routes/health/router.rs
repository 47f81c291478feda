//! Router for the health check

use axum::{Router, extract::State, response::Json, routing::get};

use super::public;
use crate::api::public::ApiError;
use crate::api::state::SharedState;

const ENDPOINTS: [&str; 4] = [
    "/health",
    "/api/chat",
    "/api/chat/reset",
    "/api/chat/history",
];

async fn health_check(
    State(state): State<SharedState>,
) -> Result<Json<public::HealthResponse>, ApiError> {
    let agent = state
        .read()
        .map_err(|_| anyhow::anyhow!("Unable to read shared state"))?
        .agent();

    Ok(Json(public::HealthResponse {
        status: String::from("healthy"),
        service: String::from("AI Calendar Booking Agent"),
        version: env!("CARGO_PKG_VERSION").to_string(),
        agent_available: agent.is_some(),
        model: agent.map(|a| a.model().to_string()),
        endpoints: ENDPOINTS.iter().map(|e| e.to_string()).collect(),
    }))
}

/// Create the health router, mounted at the root
pub fn router() -> Router<SharedState> {
    Router::new().route("/health", get(health_check))
}
