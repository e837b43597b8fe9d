//! Error types for the Auto Eden CLI

use autoeden_sdk::ApiError;
use color_eyre::eyre::Report;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration file issues
    #[error("Configuration error: {0}")]
    Config(#[from] autoeden_common::ConfigurationError),

    #[error("{}", .0.user_message())]
    Api(#[from] ApiError),

    /// The server refused the request; `0` is already worded for the user
    #[error("{0}")]
    Rejected(String),

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error(transparent)]
    Internal(#[from] Report),
}

impl CliError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(Report::msg(message.into()))
    }

    /// The API said the session is gone
    pub fn is_session_expired(&self) -> bool {
        matches!(self, CliError::Api(ApiError::SessionExpired(_)))
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;
    use autoeden_sdk::RefreshFailure;

    #[test]
    fn test_api_errors_show_the_user_message() {
        let err = CliError::from(ApiError::SessionExpired(RefreshFailure::MissingRefreshToken));
        assert!(err.is_session_expired());
        assert_eq!(err.to_string(), autoeden_sdk::SESSION_EXPIRED_MESSAGE);

        let err = CliError::from(ApiError::validation("amount", "Bid must be positive"));
        assert_eq!(err.to_string(), "Invalid amount: Bid must be positive");
    }
}
