//! Client error types

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// The service answered with a non-success status. `message` is the
    /// body's `error` field; `payload` is the whole decoded body (`{}` when it
    /// was not JSON).
    #[error("{message}")]
    Api {
        status: StatusCode,
        message: String,
        payload: Value,
    },

    /// HTTP request failed or the success body did not decode
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Base URL could not be combined with a request path
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status(),
            ClientError::InvalidUrl(_) => None,
        }
    }

    /// The `code` field of the error body, when the service sent one.
    pub fn code(&self) -> Option<&str> {
        match self {
            ClientError::Api { payload, .. } => payload.get("code").and_then(Value::as_str),
            ClientError::Http(_) | ClientError::InvalidUrl(_) => None,
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
