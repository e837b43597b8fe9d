//! Token refresh against the API
//!
//! Exchanges a refresh token for a new access token at
//! `POST /core/auth/refresh/`. The server may rotate the refresh token; when it
//! does not, the old one stays valid and is kept.

use super::types::{RefreshFailure, TokenPair};
use crate::error::ErrorBody;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

pub const REFRESH_PATH: &str = "/core/auth/refresh/";

/// Exchanges a refresh token for a new token pair
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, RefreshFailure>;
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: String,
    #[serde(default)]
    refresh: Option<String>,
}

/// Refresher that calls the API's refresh endpoint
#[derive(Debug, Clone)]
pub struct HttpTokenRefresher {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTokenRefresher {
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
        }
    }
}

#[async_trait]
impl TokenRefresher for HttpTokenRefresher {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, RefreshFailure> {
        refresh_tokens(&self.http, &self.base_url, refresh_token).await
    }
}

/// Exchange `refresh_token` for a new pair
///
/// Sent without an Authorization header; the refresh token is the credential.
pub async fn refresh_tokens(
    http: &reqwest::Client,
    base_url: &str,
    refresh_token: &str,
) -> Result<TokenPair, RefreshFailure> {
    debug!("Refreshing access token");

    let endpoint = format!("{}{}", base_url.trim_end_matches('/'), REFRESH_PATH);
    let response = http
        .post(&endpoint)
        .json(&serde_json::json!({ "refresh": refresh_token }))
        .send()
        .await
        .map_err(|e| RefreshFailure::Transport(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = ErrorBody::parse(&response.text().await.unwrap_or_default());
        return Err(RefreshFailure::Rejected {
            status: status.as_u16(),
            message: body
                .message()
                .unwrap_or_else(|| format!("Token refresh failed with status {status}")),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| RefreshFailure::Transport(e.to_string()))?;
    let parsed: RefreshResponse = serde_json::from_slice(&bytes)
        .map_err(|e| RefreshFailure::InvalidResponse(e.to_string()))?;

    info!("Token refresh completed successfully");

    Ok(TokenPair {
        access: parsed.access,
        // Keep the old refresh token when the server does not rotate it
        refresh: parsed.refresh.unwrap_or_else(|| refresh_token.to_string()),
    })
}
