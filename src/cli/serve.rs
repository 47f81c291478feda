use anyhow::Result;

use super::build_agent;
use crate::api::{self, AppState};
use crate::core::AppConfig;

pub async fn run(host: &str, port: &str) -> Result<()> {
    let config = AppConfig::default();

    // The server still comes up without an agent so /health can report it
    let agent = match build_agent(&config).await {
        Ok(agent) => Some(agent),
        Err(e) => {
            tracing::error!("Booking agent is not available: {:?}", e);
            None
        }
    };

    api::serve(host, port, AppState::new(agent, config)).await
}
