//! Handle to a chat completion model on an OpenAI compatible API.
//!
//! `LanguageModel::connect` is meant to be called once at startup. It
//! walks the configured model identifiers in order and keeps the first
//! one the API reports as available so a bad model name shows up at
//! boot instead of on the first chat.

use std::time::Duration;

use anyhow::Error;
use serde_json::Value;
use thiserror::Error;

use super::{BoxedToolCall, Message, ToolChoice, completion};

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("no model identifiers were configured")]
    NoCandidates,
    #[error("no models available (tried {tried:?}): {last_error}")]
    Unavailable {
        tried: Vec<String>,
        last_error: String,
    },
}

#[derive(Clone, Debug)]
pub struct LanguageModel {
    api_hostname: String,
    api_key: String,
    model: String,
}

impl LanguageModel {
    /// Use `model` without checking that it exists.
    pub fn new(api_hostname: &str, api_key: &str, model: &str) -> Self {
        Self {
            api_hostname: api_hostname.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    /// Try each candidate in order and keep the first available one.
    pub async fn connect(
        api_hostname: &str,
        api_key: &str,
        candidates: &[String],
    ) -> Result<Self, ModelError> {
        let mut last_error = None;

        for (i, model) in candidates.iter().enumerate() {
            match probe(api_hostname, api_key, model).await {
                Ok(()) => {
                    if i == 0 {
                        tracing::info!("Using model {}", model);
                    } else {
                        tracing::warn!("Falling back to model {}", model);
                    }
                    return Ok(Self::new(api_hostname, api_key, model));
                }
                Err(e) => {
                    tracing::warn!("Model {} unavailable: {}", model, e);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) => Err(ModelError::Unavailable {
                tried: candidates.to_vec(),
                last_error: e.to_string(),
            }),
            None => Err(ModelError::NoCandidates),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn complete(
        &self,
        messages: &[Message],
        tools: &[BoxedToolCall],
        tool_choice: ToolChoice,
    ) -> Result<Value, Error> {
        completion(
            messages,
            tools,
            tool_choice,
            &self.api_hostname,
            &self.api_key,
            &self.model,
        )
        .await
    }
}

async fn probe(api_hostname: &str, api_key: &str, model: &str) -> Result<(), Error> {
    let url = format!(
        "{}/v1/models/{}",
        api_hostname.trim_end_matches("/"),
        urlencoding::encode(model)
    );
    reqwest::Client::new()
        .get(url)
        .bearer_auth(api_key)
        .timeout(Duration::from_secs(30))
        .send()
        .await?
        .error_for_status()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates() -> Vec<String> {
        vec![String::from("primary-model"), String::from("fallback-model")]
    }

    #[tokio::test]
    async fn test_connect_uses_primary() {
        let mut server = mockito::Server::new_async().await;
        let _primary = server
            .mock("GET", "/v1/models/primary-model")
            .with_status(200)
            .with_body(r#"{"id":"primary-model","object":"model"}"#)
            .create();

        let model = LanguageModel::connect(&server.url(), "test-key", &candidates())
            .await
            .unwrap();
        assert_eq!(model.model(), "primary-model");
    }

    #[tokio::test]
    async fn test_connect_falls_back() {
        let mut server = mockito::Server::new_async().await;
        let _primary = server
            .mock("GET", "/v1/models/primary-model")
            .with_status(404)
            .create();
        let _fallback = server
            .mock("GET", "/v1/models/fallback-model")
            .with_status(200)
            .with_body(r#"{"id":"fallback-model","object":"model"}"#)
            .create();

        let model = LanguageModel::connect(&server.url(), "test-key", &candidates())
            .await
            .unwrap();
        assert_eq!(model.model(), "fallback-model");
    }

    #[tokio::test]
    async fn test_connect_fails_when_all_unavailable() {
        let mut server = mockito::Server::new_async().await;
        let _primary = server
            .mock("GET", "/v1/models/primary-model")
            .with_status(404)
            .create();
        let _fallback = server
            .mock("GET", "/v1/models/fallback-model")
            .with_status(404)
            .create();

        let err = LanguageModel::connect(&server.url(), "test-key", &candidates())
            .await
            .unwrap_err();
        match err {
            ModelError::Unavailable { tried, .. } => assert_eq!(tried.len(), 2),
            other => panic!("Expected Unavailable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_connect_without_candidates() {
        let err = LanguageModel::connect("http://127.0.0.1:9", "test-key", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::NoCandidates));
    }
}
