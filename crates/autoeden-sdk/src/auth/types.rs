//! Authentication-related types
//!
//! The persisted auth record, the token pair returned by a refresh, and the
//! reasons a refresh can fail.

use crate::types::User;
use etcetera::{choose_base_strategy, BaseStrategy};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Persisted authentication record
///
/// Stored as `{"access": ..., "refresh": ..., "user": {...}}`. Absence of the
/// record means the user is logged out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthState {
    #[serde(default)]
    pub access: Option<String>,
    #[serde(default)]
    pub refresh: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

impl AuthState {
    pub fn new(access: impl Into<String>, refresh: Option<String>, user: Option<User>) -> Self {
        Self {
            access: Some(access.into()),
            refresh,
            user,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.access.is_some()
    }
}

/// Token pair produced by a successful refresh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Why a refresh attempt failed
///
/// Every request waiting on the same refresh receives a clone of this value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshFailure {
    #[error("no refresh token available")]
    MissingRefreshToken,

    #[error("refresh rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("refresh request failed: {0}")]
    Transport(String),

    #[error("invalid refresh response: {0}")]
    InvalidResponse(String),

    #[error("auth storage error: {0}")]
    Storage(String),

    #[error("refresh was aborted")]
    Aborted,
}

/// Platform data directory for persisted auth (e.g. `~/.local/share/autoeden`)
pub fn data_dir() -> std::io::Result<PathBuf> {
    let strategy = choose_base_strategy().map_err(|e| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Failed to determine base directories: {e}"),
        )
    })?;
    Ok(strategy.data_dir().join("autoeden"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_auth_state_reads_partial_record() {
        let state: AuthState = serde_json::from_value(json!({"access": "a1"})).unwrap();
        assert_eq!(state.access.as_deref(), Some("a1"));
        assert!(state.refresh.is_none());
        assert!(state.user.is_none());
        assert!(state.is_authenticated());
        assert!(!AuthState::default().is_authenticated());
    }

    #[test]
    fn test_failure_messages() {
        let failure = RefreshFailure::Rejected {
            status: 401,
            message: "Token is blacklisted".into(),
        };
        assert_eq!(
            failure.to_string(),
            "refresh rejected with status 401: Token is blacklisted"
        );
    }
}
