//! Access tokens for the Google Calendar API. Either a fixed access
//! token or a refresh token that is exchanged at the token endpoint
//! and cached until shortly before it expires.

use std::time::{Duration, Instant};

use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;

use super::CalendarError;
use crate::core::AppConfig;

// Refresh this long before Google says the token expires
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
pub struct OAuthToken {
    pub access_token: String,
    pub expires_in: Option<u64>,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
    pub token_type: Option<String>,
}

#[derive(Clone, Debug)]
pub enum Credentials {
    AccessToken(String),
    RefreshToken {
        client_id: String,
        client_secret: String,
        refresh_token: String,
    },
}

impl Credentials {
    pub fn from_config(config: &AppConfig) -> Result<Self, CalendarError> {
        if let (Some(client_id), Some(client_secret), Some(refresh_token)) = (
            &config.google_client_id,
            &config.google_client_secret,
            &config.google_refresh_token,
        ) {
            return Ok(Credentials::RefreshToken {
                client_id: client_id.clone(),
                client_secret: client_secret.clone(),
                refresh_token: refresh_token.clone(),
            });
        }
        if let Some(token) = &config.google_access_token {
            return Ok(Credentials::AccessToken(token.clone()));
        }
        Err(CalendarError::Auth(String::from(
            "Set BOOKING_GOOGLE_ACCESS_TOKEN or BOOKING_GOOGLE_CLIENT_ID, \
             BOOKING_GOOGLE_CLIENT_SECRET and BOOKING_GOOGLE_REFRESH_TOKEN",
        )))
    }
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

pub struct TokenSource {
    client: Client,
    token_url: String,
    credentials: Credentials,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenSource {
    pub fn new(token_url: &str, credentials: Credentials) -> Self {
        Self {
            client: Client::new(),
            token_url: token_url.to_string(),
            credentials,
            cached: Mutex::new(None),
        }
    }

    pub fn from_access_token(access_token: &str) -> Self {
        Self::new("", Credentials::AccessToken(access_token.to_string()))
    }

    pub async fn access_token(&self) -> Result<String, CalendarError> {
        let (client_id, client_secret, refresh_token) = match &self.credentials {
            Credentials::AccessToken(token) => return Ok(token.clone()),
            Credentials::RefreshToken {
                client_id,
                client_secret,
                refresh_token,
            } => (client_id, client_secret, refresh_token),
        };

        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref()
            && token.expires_at > Instant::now()
        {
            return Ok(token.access_token.clone());
        }

        let oauth = refresh_access_token(
            &self.client,
            &self.token_url,
            client_id,
            client_secret,
            refresh_token,
        )
        .await?;
        let lifetime = Duration::from_secs(oauth.expires_in.unwrap_or(3600));
        let expires_at = Instant::now() + lifetime.saturating_sub(EXPIRY_MARGIN);
        tracing::debug!("Refreshed Google access token, valid for {:?}", lifetime);

        *cached = Some(CachedToken {
            access_token: oauth.access_token.clone(),
            expires_at,
        });
        Ok(oauth.access_token)
    }
}

/// Exchange a refresh token for a new access token.
pub async fn refresh_access_token(
    client: &Client,
    token_url: &str,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> Result<OAuthToken, CalendarError> {
    let params = [
        ("client_id", client_id),
        ("client_secret", client_secret),
        ("refresh_token", refresh_token),
        ("grant_type", "refresh_token"),
    ];
    let res = client.post(token_url).form(&params).send().await?;
    let status = res.status();
    let text = res.text().await.unwrap_or_default();
    if !status.is_success() {
        return Err(CalendarError::Auth(format!(
            "Token refresh failed: {} ({})",
            status, text
        )));
    }
    let token: OAuthToken = serde_json::from_str(&text)?;
    Ok(token)
}
