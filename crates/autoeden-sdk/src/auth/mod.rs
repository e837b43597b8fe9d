//! Authentication for the Auto Eden SDK
//!
//! - Persisted auth record (`AuthState`) behind the `AuthStore` trait
//! - Token refresh against `/core/auth/refresh/`
//! - Single-flight refresh coordination and session expiry (`SessionManager`)

pub mod refresh;
pub mod session;
pub mod store;
pub mod types;

pub use refresh::{refresh_tokens, HttpTokenRefresher, TokenRefresher};
pub use session::{
    SessionExpiredHandler, SessionExpiredNotice, SessionManager, DEFAULT_REDIRECT_DELAY,
    SESSION_EXPIRED_MESSAGE,
};
pub use store::{AuthStore, FileAuthStore, MemoryAuthStore};
pub use types::{AuthState, RefreshFailure, TokenPair};
