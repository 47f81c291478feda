//! Public types for the health check
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub agent_available: bool,
    pub model: Option<String>,
    pub endpoints: Vec<String>,
}
