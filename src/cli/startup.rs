//! Wiring shared by the server and the terminal chat: connect to the
//! language model and the calendar, then assemble the agent.

use std::sync::Arc;

use anyhow::{Error, Result};

use crate::ai::chat::BookingAgent;
use crate::ai::tools::calendar_tools;
use crate::core::AppConfig;
use crate::google::oauth::{Credentials, TokenSource};
use crate::google::{GoogleCalendar, SharedCalendar};
use crate::openai::LanguageModel;

pub async fn connect_calendar(config: &AppConfig) -> Result<SharedCalendar, Error> {
    let credentials = Credentials::from_config(config)?;
    let tokens = TokenSource::new(&config.google_token_url, credentials);
    let calendar =
        GoogleCalendar::connect(&config.gcal_api_url, tokens, config.calendar_id.clone()).await;
    Ok(Arc::new(calendar))
}

/// Fails when no configured model is available or there are no Google
/// credentials.
pub async fn build_agent(config: &AppConfig) -> Result<BookingAgent, Error> {
    let model = LanguageModel::connect(
        &config.openai_api_hostname,
        &config.openai_api_key,
        &config.model_candidates(),
    )
    .await?;
    let calendar = connect_calendar(config).await?;

    BookingAgent::builder(model)
        .tools(calendar_tools(calendar))
        .system_message(&config.system_message)
        .max_iterations(config.max_iterations)
        .build()
}
