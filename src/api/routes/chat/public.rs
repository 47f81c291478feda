//! Public types for the chat API
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ChatResponse {
    pub response: String,
    pub status: String,
}

impl ChatResponse {
    pub fn success(response: &str) -> Self {
        Self {
            response: response.to_string(),
            status: String::from("success"),
        }
    }
}

#[derive(Deserialize, Default)]
pub struct ResetRequest {
    pub session_id: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ResetResponse {
    pub status: String,
    pub message: String,
}

#[derive(Deserialize)]
pub struct HistoryQuery {
    pub session_id: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct HistoryResponse {
    pub summary: String,
}
