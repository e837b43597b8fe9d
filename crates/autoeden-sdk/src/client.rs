//! HTTP client for the Auto Eden API
//!
//! Every request carries `Authorization: Bearer <access>` when a token is
//! stored. A request rejected because its token expired is recovered once:
//! the [`SessionManager`] refreshes the token (one refresh for any number of
//! concurrent failures) and the request is replayed. A replay that fails is
//! returned as is.
//!
//! # Usage Examples
//!
//! ```rust,no_run
//! use autoeden_sdk::ClientBuilder;
//!
//! # async fn example() -> autoeden_sdk::Result<()> {
//! // Tokens kept in memory for the lifetime of the client
//! let client = ClientBuilder::default()
//!     .base_url("http://127.0.0.1:8000")
//!     .with_tokens("access_token", Some("refresh_token".into()))
//!     .build()?;
//!
//! // Or persist them under the platform data directory
//! let client = ClientBuilder::default()
//!     .base_url("http://127.0.0.1:8000")
//!     .file_auth()
//!     .build()?;
//!
//! let listings = client.vehicles().marketplace(&Default::default()).await?;
//! # Ok(())
//! # }
//! ```

use crate::{
    auth::{
        AuthState, AuthStore, FileAuthStore, HttpTokenRefresher, MemoryAuthStore,
        SessionExpiredHandler, SessionManager, TokenRefresher, DEFAULT_REDIRECT_DELAY,
    },
    config::{ClientConfig, DEFAULT_API_URL, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS},
    error::{ApiError, ErrorBody, Result},
    request::{is_token_failure, ApiRequest, Attempt, RequestBody},
};
use bytes::Bytes;
use reqwest::{header, Response};
use serde::{de::DeserializeOwned, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// HTTP client for interacting with the Auto Eden API
#[derive(Debug)]
pub struct AutoEdenClient {
    http_client: reqwest::Client,
    base_url: String,
    session: Arc<SessionManager>,
}

impl AutoEdenClient {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    /// Register a handler that runs when the session can no longer be renewed
    pub fn on_session_expired(&self, handler: Arc<dyn SessionExpiredHandler>) {
        self.session.subscribe(handler);
    }

    /// Send a request, recovering once from an expired token
    pub async fn execute(&self, request: ApiRequest) -> Result<Response> {
        let token = self.session.access_token().await?;
        let response = self.send(&request, token.as_deref()).await?;
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = ErrorBody::parse(&response.text().await.unwrap_or_default());

        let recoverable = request.attempt() == Attempt::Initial
            && !request.is_auth_endpoint()
            && is_token_failure(status, &body);
        if !recoverable {
            return Err(ApiError::from_response(status, body));
        }

        debug!(path = %request.path, %status, "Access token rejected, recovering session");
        let access = self
            .session
            .recover(token.as_deref())
            .await
            .map_err(ApiError::SessionExpired)?;

        let replay = request.replay();
        let response = self.send(&replay, Some(&access)).await?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Self::error_from(response).await)
        }
    }

    /// Execute and decode a JSON body
    pub async fn json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let response = self.execute(request).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Execute and decode a JSON body, treating an empty body as `T::default()`
    pub async fn json_or_default<T: DeserializeOwned + Default>(&self, request: ApiRequest) -> Result<T> {
        let response = self.execute(request).await?;
        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(T::default());
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Execute and return the raw body (PDF downloads)
    pub async fn bytes(&self, request: ApiRequest) -> Result<Bytes> {
        let response = self.execute(request).await?;
        Ok(response.bytes().await?)
    }

    /// Execute and discard the body
    pub async fn empty(&self, request: ApiRequest) -> Result<()> {
        self.execute(request).await?;
        Ok(())
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.json(ApiRequest::get(path)).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        self.json(ApiRequest::post(path).json(body)?).await
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        self.json(ApiRequest::put(path).json(body)?).await
    }

    pub async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        self.json(ApiRequest::patch(path).json(body)?).await
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        self.empty(ApiRequest::delete(path)).await
    }

    async fn send(&self, request: &ApiRequest, token: Option<&str>) -> Result<Response> {
        let url = format!("{}{}", self.base_url, request.path);
        debug!(attempt = ?request.attempt(), "{} {}", request.method, url);

        let mut builder = self.http_client.request(request.method.clone(), &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        builder = match &request.body {
            Some(RequestBody::Json(value)) => builder.json(value),
            Some(RequestBody::Multipart(payload)) => builder.multipart(payload.to_form()?),
            None => builder,
        };

        builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout
            } else {
                ApiError::HttpClient(e)
            }
        })
    }

    async fn error_from(response: Response) -> ApiError {
        let status = response.status();
        let body = ErrorBody::parse(&response.text().await.unwrap_or_default());
        ApiError::from_response(status, body)
    }
}

enum AuthSource {
    Memory(Option<AuthState>),
    File(Option<PathBuf>),
    Custom(Arc<dyn AuthStore>),
}

impl Default for AuthSource {
    fn default() -> Self {
        AuthSource::Memory(None)
    }
}

/// Builder for constructing an [`AutoEdenClient`]
#[derive(Default)]
pub struct ClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    redirect_delay: Option<Duration>,
    auth: AuthSource,
    refresher: Option<Arc<dyn TokenRefresher>>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a resolved configuration
    pub fn from_config(config: &ClientConfig) -> Self {
        let builder = Self::default()
            .base_url(&config.api.base_url)
            .timeout(config.api.timeout())
            .connect_timeout(config.api.connect_timeout())
            .redirect_delay(config.session.redirect_delay());
        match &config.session.auth_file {
            Some(path) => builder.file_auth_at(path.clone()),
            None => builder,
        }
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Delay between the session-expired notice and `on_redirect_home`
    pub fn redirect_delay(mut self, delay: Duration) -> Self {
        self.redirect_delay = Some(delay);
        self
    }

    /// Keep auth state in memory, starting logged out
    pub fn memory_auth(mut self) -> Self {
        self.auth = AuthSource::Memory(None);
        self
    }

    /// Keep auth state in memory, starting with the given tokens
    pub fn with_tokens(mut self, access: impl Into<String>, refresh: Option<String>) -> Self {
        self.auth = AuthSource::Memory(Some(AuthState::new(access, refresh, None)));
        self
    }

    /// Persist auth state under the platform data directory
    pub fn file_auth(mut self) -> Self {
        self.auth = AuthSource::File(None);
        self
    }

    pub fn file_auth_at(mut self, path: impl Into<PathBuf>) -> Self {
        self.auth = AuthSource::File(Some(path.into()));
        self
    }

    pub fn auth_store(mut self, store: Arc<dyn AuthStore>) -> Self {
        self.auth = AuthSource::Custom(store);
        self
    }

    /// Replace the HTTP refresher (tests, alternative auth backends)
    pub fn refresher(mut self, refresher: Arc<dyn TokenRefresher>) -> Self {
        self.refresher = Some(refresher);
        self
    }

    pub fn build(self) -> Result<AutoEdenClient> {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        url::Url::parse(&base_url).map_err(|e| ApiError::InvalidRequest {
            message: format!("invalid base URL '{base_url}': {e}"),
        })?;

        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(self.timeout.unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)))
            .connect_timeout(
                self.connect_timeout
                    .unwrap_or(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS)),
            )
            .build()
            .map_err(ApiError::HttpClient)?;

        let store: Arc<dyn AuthStore> = match self.auth {
            AuthSource::Memory(Some(state)) => Arc::new(MemoryAuthStore::with_state(state)),
            AuthSource::Memory(None) => Arc::new(MemoryAuthStore::new()),
            AuthSource::File(Some(path)) => Arc::new(FileAuthStore::new(path)),
            AuthSource::File(None) => Arc::new(FileAuthStore::default_location()?),
            AuthSource::Custom(store) => store,
        };

        let refresher = self
            .refresher
            .unwrap_or_else(|| Arc::new(HttpTokenRefresher::new(http_client.clone(), &base_url)));

        let session = SessionManager::new(
            store,
            refresher,
            self.redirect_delay.unwrap_or(DEFAULT_REDIRECT_DELAY),
        );

        Ok(AutoEdenClient {
            http_client,
            base_url,
            session,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_bearer_attached_when_token_stored() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/core/vehicles/"))
            .and(header("Authorization", "Bearer test-token"))
            .and(header("Accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = ClientBuilder::default()
            .base_url(mock_server.uri())
            .with_tokens("test-token", Some("refresh-token".into()))
            .build()
            .unwrap();

        let vehicles: Vec<serde_json::Value> = client.get("/core/vehicles/").await.unwrap();
        assert!(vehicles.is_empty());
    }

    #[tokio::test]
    async fn test_anonymous_request_without_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/core/marketplace/"))
            .and(query_param("make", "Toyota"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&mock_server)
            .await;

        let client = ClientBuilder::default()
            .base_url(mock_server.uri())
            .build()
            .unwrap();

        let response = client
            .execute(ApiRequest::get("/core/marketplace/").param("make", "Toyota"))
            .await
            .unwrap();
        let requests = mock_server.received_requests().await.unwrap();
        assert!(response.status().is_success());
        assert!(requests[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn test_error_body_is_mapped() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/core/bids/"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "amount": ["Bid must be higher than the current highest bid"]
            })))
            .mount(&mock_server)
            .await;

        let client = ClientBuilder::default()
            .base_url(mock_server.uri())
            .with_tokens("test-token", None)
            .build()
            .unwrap();

        let err = client
            .post::<_, serde_json::Value>("/core/bids/", &json!({"amount": "1"}))
            .await
            .unwrap_err();
        assert_eq!(
            err.user_message(),
            "amount: Bid must be higher than the current highest bid"
        );
    }

    #[test]
    fn test_builder_rejects_invalid_base_url() {
        let result = ClientBuilder::default().base_url("not a url").build();
        assert!(matches!(result.unwrap_err(), ApiError::InvalidRequest { .. }));
    }

    #[test]
    fn test_builder_trims_trailing_slash() {
        let client = ClientBuilder::default()
            .base_url("http://127.0.0.1:8000/")
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:8000");
    }

    #[test]
    fn test_builder_from_config() {
        let mut config = ClientConfig::default();
        config.api.base_url = "https://api.example.com".into();
        let client = ClientBuilder::from_config(&config).build().unwrap();
        assert_eq!(client.base_url(), "https://api.example.com");
    }
}
