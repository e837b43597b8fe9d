//! Request descriptions
//!
//! An [`ApiRequest`] is a value, not a `reqwest::RequestBuilder`, so the
//! client can rebuild and resend it after a token refresh. It records whether
//! it is the first attempt or the single permitted replay.

use crate::error::{ApiError, ErrorBody, Result};
use reqwest::{Method, StatusCode};
use serde::Serialize;

/// Paths that never trigger a refresh, even on 401
pub const AUTH_ENDPOINTS: [&str; 3] = ["/auth/login", "/auth/register", "/auth/refresh"];

/// Fragments of a 403 `detail` that mean the token itself was rejected
const TOKEN_HINTS: [&str; 4] = ["token", "credential", "authentication", "not valid"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    Initial,
    /// Sent once after a successful refresh; never refreshed again
    Replay,
}

#[derive(Debug, Clone)]
pub struct FilePart {
    pub field: String,
    pub filename: String,
    pub content_type: String,
    pub bytes: bytes::Bytes,
}

/// Multipart form kept as plain data so it can be sent more than once
#[derive(Debug, Clone, Default)]
pub struct MultipartPayload {
    pub fields: Vec<(String, String)>,
    pub files: Vec<FilePart>,
}

impl MultipartPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.fields.push((name.into(), value.to_string()));
        self
    }

    pub fn file(mut self, part: FilePart) -> Self {
        self.files.push(part);
        self
    }

    pub fn to_form(&self) -> Result<reqwest::multipart::Form> {
        let mut form = reqwest::multipart::Form::new();
        for (name, value) in &self.fields {
            form = form.text(name.clone(), value.clone());
        }
        for file in &self.files {
            let part = reqwest::multipart::Part::bytes(file.bytes.to_vec())
                .file_name(file.filename.clone())
                .mime_str(&file.content_type)?;
            form = form.part(file.field.clone(), part);
        }
        Ok(form)
    }
}

#[derive(Debug, Clone)]
pub enum RequestBody {
    Json(serde_json::Value),
    Multipart(MultipartPayload),
}

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<RequestBody>,
    attempt: Attempt,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            attempt: Attempt::Initial,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        self.body = Some(RequestBody::Json(serde_json::to_value(body)?));
        Ok(self)
    }

    pub fn multipart(mut self, payload: MultipartPayload) -> Self {
        self.body = Some(RequestBody::Multipart(payload));
        self
    }

    pub fn query<Q: Serialize + ?Sized>(mut self, params: &Q) -> Result<Self> {
        self.query.extend(query_pairs(params)?);
        Ok(self)
    }

    pub fn param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((name.into(), value.to_string()));
        self
    }

    pub fn attempt(&self) -> Attempt {
        self.attempt
    }

    /// The same request marked as the post-refresh replay
    pub fn replay(&self) -> Self {
        Self {
            attempt: Attempt::Replay,
            ..self.clone()
        }
    }

    pub fn is_auth_endpoint(&self) -> bool {
        AUTH_ENDPOINTS.iter().any(|p| self.path.contains(p))
    }
}

/// Whether a failure means the access token itself was rejected
///
/// Any 401 qualifies. A 403 qualifies only when its `detail` talks about the
/// token or credentials; other 403s are permission denials.
pub fn is_token_failure(status: StatusCode, body: &ErrorBody) -> bool {
    match status {
        StatusCode::UNAUTHORIZED => true,
        StatusCode::FORBIDDEN => body
            .detail()
            .map(|detail| {
                let detail = detail.to_lowercase();
                TOKEN_HINTS.iter().any(|hint| detail.contains(hint))
            })
            .unwrap_or(false),
        _ => false,
    }
}

/// Flatten a serializable struct into query pairs, skipping `None` fields
pub fn query_pairs<Q: Serialize + ?Sized>(params: &Q) -> Result<Vec<(String, String)>> {
    let value = serde_json::to_value(params)?;
    let serde_json::Value::Object(map) = value else {
        return Err(ApiError::InvalidRequest {
            message: "query parameters must serialize to an object".into(),
        });
    };

    Ok(map
        .into_iter()
        .filter_map(|(key, value)| match value {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some((key, s)),
            other => Some((key, other.to_string())),
        })
        .collect())
}
