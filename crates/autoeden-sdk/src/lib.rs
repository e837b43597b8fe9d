//! # Auto Eden SDK
//!
//! Typed client for the Auto Eden car marketplace API.
//!
//! Every request carries the stored access token. When the API rejects that
//! token, the client refreshes it once, shared across all concurrent callers,
//! and replays the request. If the refresh fails the stored session is
//! cleared and subscribers are told the session expired.
//!
//! ```no_run
//! use autoeden_sdk::ClientBuilder;
//!
//! # async fn run() -> autoeden_sdk::Result<()> {
//! let client = ClientBuilder::new()
//!     .base_url("https://api.autoeden.co.zw")
//!     .file_auth()
//!     .build()?;
//!
//! client.auth().login("rudo@example.com", "hunter22").await?;
//! for vehicle in client.vehicles().mine().await? {
//!     println!("{} {} ({})", vehicle.make, vehicle.model, vehicle.status.as_str());
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod request;
pub mod state;
pub mod types;

pub use auth::{
    AuthState, AuthStore, FileAuthStore, MemoryAuthStore, RefreshFailure, SessionExpiredHandler,
    SessionExpiredNotice, SessionManager, SESSION_EXPIRED_MESSAGE,
};
pub use client::{AutoEdenClient, ClientBuilder};
pub use config::ClientConfig;
pub use error::{ApiError, ErrorBody, Result, ResultExt};
pub use request::{ApiRequest, MultipartPayload};
pub use state::{AppState, Store};
