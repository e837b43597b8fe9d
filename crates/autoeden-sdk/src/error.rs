//! Error types for the Auto Eden SDK

use crate::auth::RefreshFailure;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for SDK operations
pub type Result<T> = std::result::Result<T, ApiError>;

/// Error body returned by the API
///
/// The server answers with `{"detail": "..."}`, `{"message": "..."}` or a map
/// of field names to message lists (`{"price": ["required"]}`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorBody(pub serde_json::Value);

impl ErrorBody {
    pub fn parse(text: &str) -> Self {
        match serde_json::from_str::<serde_json::Value>(text) {
            Ok(value) => Self(value),
            Err(_) if text.trim().is_empty() => Self(serde_json::Value::Null),
            Err(_) => Self(serde_json::Value::String(text.to_string())),
        }
    }

    pub fn detail(&self) -> Option<&str> {
        self.0.get("detail").and_then(|v| v.as_str())
    }

    /// Field-specific messages, flattened to `(field, message)` pairs
    pub fn field_errors(&self) -> Vec<(String, String)> {
        let Some(map) = self.0.as_object() else {
            return Vec::new();
        };
        map.iter()
            .filter(|(key, _)| key.as_str() != "detail" && key.as_str() != "message")
            .filter_map(|(key, value)| {
                let message = match value {
                    serde_json::Value::String(s) => s.clone(),
                    serde_json::Value::Array(items) => items
                        .iter()
                        .filter_map(|i| i.as_str())
                        .collect::<Vec<_>>()
                        .join(", "),
                    _ => return None,
                };
                (!message.is_empty()).then(|| (key.clone(), message))
            })
            .collect()
    }

    /// First available of `detail`, `message`, a field message, or a bare string body
    pub fn message(&self) -> Option<String> {
        if let Some(detail) = self.detail() {
            return Some(detail.to_string());
        }
        if let Some(message) = self.0.get("message").and_then(|v| v.as_str()) {
            return Some(message.to_string());
        }
        if let Some((field, message)) = self.field_errors().into_iter().next() {
            return Some(format!("{field}: {message}"));
        }
        self.0.as_str().map(str::to_string)
    }
}

/// SDK error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Rejected before any request was sent
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// Credentials missing or not accepted
    #[error("Authentication failed: {message}")]
    Authentication { message: String, body: ErrorBody },

    /// Authenticated but not permitted
    #[error("Access forbidden: {message}")]
    Authorization { message: String, body: ErrorBody },

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String, body: ErrorBody },

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Service unavailable")]
    ServiceUnavailable,

    #[error("Request timeout")]
    Timeout,

    /// Token refresh failed or was impossible; local auth state has been cleared
    #[error("Session expired: {0}")]
    SessionExpired(RefreshFailure),

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Auth storage error: {message}")]
    Storage { message: String },

    #[error("Invalid response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Server error ({status}): {message}")]
    Internal { status: u16, message: String },
}

impl ApiError {
    /// Map a non-success response into a typed error
    pub fn from_response(status: StatusCode, body: ErrorBody) -> Self {
        let message = body.message();
        match status {
            StatusCode::UNAUTHORIZED => ApiError::Authentication {
                message: message.unwrap_or_else(|| "Authentication failed".into()),
                body,
            },
            StatusCode::FORBIDDEN => ApiError::Authorization {
                message: message.unwrap_or_else(|| "Access forbidden".into()),
                body,
            },
            StatusCode::NOT_FOUND => ApiError::NotFound {
                resource: message.unwrap_or_else(|| "Resource not found".into()),
            },
            StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
                ApiError::BadRequest {
                    message: message.unwrap_or_else(|| "Bad request".into()),
                    body,
                }
            }
            StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimitExceeded,
            StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => {
                ApiError::ServiceUnavailable
            }
            StatusCode::GATEWAY_TIMEOUT | StatusCode::REQUEST_TIMEOUT => ApiError::Timeout,
            _ => ApiError::Internal {
                status: status.as_u16(),
                message: message.unwrap_or_else(|| format!("Request failed with status {status}")),
            },
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Body the API sent with the failure, when there was one
    pub fn body(&self) -> Option<&ErrorBody> {
        match self {
            ApiError::Authentication { body, .. }
            | ApiError::Authorization { body, .. }
            | ApiError::BadRequest { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Error payload suitable for storing in client state
    pub fn to_body(&self) -> ErrorBody {
        match self.body() {
            Some(body) if !body.0.is_null() => body.clone(),
            _ => ErrorBody(serde_json::json!({ "detail": self.to_string() })),
        }
    }

    /// Message to show a user
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Authentication { message, .. }
            | ApiError::Authorization { message, .. }
            | ApiError::BadRequest { message, .. } => message.clone(),
            ApiError::NotFound { resource } => resource.clone(),
            ApiError::SessionExpired(_) => crate::auth::SESSION_EXPIRED_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }

    /// The feature or resource does not exist on this server
    pub fn is_absent(&self) -> bool {
        matches!(self, ApiError::NotFound { .. } | ApiError::ServiceUnavailable)
    }

    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ApiError::Validation { .. }
                | ApiError::Authentication { .. }
                | ApiError::Authorization { .. }
                | ApiError::NotFound { .. }
                | ApiError::BadRequest { .. }
                | ApiError::RateLimitExceeded
                | ApiError::InvalidRequest { .. }
        )
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::HttpClient(_) => "AUTOEDEN_HTTP_CLIENT",
            ApiError::Validation { .. } => "AUTOEDEN_VALIDATION",
            ApiError::Authentication { .. } => "AUTOEDEN_AUTH",
            ApiError::Authorization { .. } => "AUTOEDEN_FORBIDDEN",
            ApiError::NotFound { .. } => "AUTOEDEN_NOT_FOUND",
            ApiError::BadRequest { .. } => "AUTOEDEN_BAD_REQUEST",
            ApiError::RateLimitExceeded => "AUTOEDEN_RATE_LIMIT",
            ApiError::ServiceUnavailable => "AUTOEDEN_UNAVAILABLE",
            ApiError::Timeout => "AUTOEDEN_TIMEOUT",
            ApiError::SessionExpired(_) => "AUTOEDEN_SESSION_EXPIRED",
            ApiError::InvalidRequest { .. } => "AUTOEDEN_INVALID_REQUEST",
            ApiError::Storage { .. } => "AUTOEDEN_STORAGE",
            ApiError::Decode(_) => "AUTOEDEN_DECODE",
            ApiError::Internal { .. } => "AUTOEDEN_INTERNAL",
        }
    }
}

/// Treat a missing resource as an expected absence
pub trait ResultExt<T> {
    /// `NotFound` becomes `Ok(None)`; every other error is kept
    fn optional(self) -> Result<Option<T>>;
}

impl<T> ResultExt<T> for Result<T> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(ApiError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_prefers_detail() {
        let body = ErrorBody(json!({"detail": "Invalid credentials", "email": ["bad"]}));
        assert_eq!(body.message().as_deref(), Some("Invalid credentials"));
    }

    #[test]
    fn test_message_falls_back_to_field_errors() {
        let body = ErrorBody(json!({"price": ["Price is required for marketplace listings"]}));
        assert_eq!(
            body.message().as_deref(),
            Some("price: Price is required for marketplace listings")
        );
    }

    #[test]
    fn test_parse_non_json_body() {
        assert_eq!(ErrorBody::parse("").0, serde_json::Value::Null);
        assert_eq!(
            ErrorBody::parse("<html>oops</html>").message().as_deref(),
            Some("<html>oops</html>")
        );
    }

    #[test]
    fn test_status_mapping() {
        let forbidden = ApiError::from_response(
            StatusCode::FORBIDDEN,
            ErrorBody(json!({"detail": "You do not have permission"})),
        );
        assert!(matches!(forbidden, ApiError::Authorization { .. }));
        assert_eq!(forbidden.user_message(), "You do not have permission");

        let missing = ApiError::from_response(StatusCode::NOT_FOUND, ErrorBody::default());
        assert!(missing.is_absent());

        let unavailable = ApiError::from_response(StatusCode::SERVICE_UNAVAILABLE, ErrorBody::default());
        assert!(unavailable.is_absent());

        let internal = ApiError::from_response(StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::default());
        assert!(matches!(internal, ApiError::Internal { status: 500, .. }));
        assert!(!internal.is_client_error());
    }

    #[test]
    fn test_optional_only_swallows_not_found() {
        let missing: Result<u8> = Err(ApiError::NotFound {
            resource: "x".into(),
        });
        assert_eq!(missing.optional().unwrap(), None);

        let broken: Result<u8> = Err(ApiError::ServiceUnavailable);
        assert!(broken.optional().is_err());
    }

    #[test]
    fn test_to_body_wraps_transport_errors() {
        let body = ApiError::RateLimitExceeded.to_body();
        assert_eq!(body.detail(), Some("Rate limit exceeded"));
    }
}
