//! Router for the chat API

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use axum_extra::extract::Query;

use super::public;
use crate::ai::chat::{BookingAgent, DEFAULT_SESSION};
use crate::api::public::{ApiError, error_response};
use crate::api::state::SharedState;

// Every new session ID allocates memory that lives until shutdown
const MAX_SESSION_ID_LEN: usize = 128;

fn session_or_default(session_id: Option<&str>) -> &str {
    session_id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .unwrap_or(DEFAULT_SESSION)
}

// The lock is std so the agent is cloned out before any await
fn agent(state: &SharedState) -> Result<Option<Arc<BookingAgent>>, ApiError> {
    let state = state
        .read()
        .map_err(|_| anyhow::anyhow!("Unable to read shared state"))?;
    Ok(state.agent())
}

fn agent_unavailable() -> Response {
    error_response(StatusCode::SERVICE_UNAVAILABLE, "AI agent is not available")
}

/// Send a message to the booking agent and get its reply
async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<public::ChatRequest>,
) -> Result<Response, ApiError> {
    let Some(agent) = agent(&state)? else {
        return Ok(agent_unavailable());
    };
    let message = payload.message.trim();
    if message.is_empty() {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            "Message must not be empty",
        ));
    }

    let session_id = session_or_default(payload.session_id.as_deref());
    if session_id.len() > MAX_SESSION_ID_LEN {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            &format!("Session ID must be at most {} bytes", MAX_SESSION_ID_LEN),
        ));
    }
    let reply = agent.chat(session_id, message).await;

    Ok(Json(public::ChatResponse::success(&reply)).into_response())
}

/// Clear the conversation history of a session
async fn reset_handler(
    State(state): State<SharedState>,
    payload: Option<Json<public::ResetRequest>>,
) -> Result<Response, ApiError> {
    let Some(agent) = agent(&state)? else {
        return Ok(agent_unavailable());
    };
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    agent
        .reset(session_or_default(payload.session_id.as_deref()))
        .await;

    Ok(Json(public::ResetResponse {
        status: String::from("success"),
        message: String::from("Conversation history cleared"),
    })
    .into_response())
}

/// Summarize the recent turns of a session
async fn history_handler(
    State(state): State<SharedState>,
    Query(params): Query<public::HistoryQuery>,
) -> Result<Response, ApiError> {
    let Some(agent) = agent(&state)? else {
        return Ok(agent_unavailable());
    };
    let summary = agent
        .history_summary(session_or_default(params.session_id.as_deref()))
        .await;

    Ok(Json(public::HistoryResponse { summary }).into_response())
}

/// Create the chat router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", post(chat_handler))
        .route("/reset", post(reset_handler))
        .route("/history", get(history_handler))
}
