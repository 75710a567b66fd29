use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::{Deserialize, Serialize};
use strum::AsRefStr;
use thiserror::Error;
use utoipa::ToSchema;

use crate::store::StoreError;

/// Stable `code` values carried in error bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    StoreError,
    EmptyInsert,
    NotFound,
    ValidationFailed,
    InvalidBody,
    Unauthorized,
    RateLimited,
    Internal,
}

/// Every error response: `{ "error": "...", "code": "..." }`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    #[schema(example = "Employee 42 not found")]
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "NOT_FOUND", nullable = true)]
    pub code: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>, code: ErrorCode) -> Self {
        Self {
            error: error.into(),
            code: Some(code.as_ref().to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{field} must be a string")]
    Validation { field: &'static str },

    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("{0}")]
    InvalidBody(String),

    /// A path segment that does not name a record, e.g. a non-numeric id.
    #[error("No such record: {0}")]
    InvalidPath(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    fn body(&self) -> ErrorBody {
        match self {
            AppError::Store(StoreError::NotFound(_)) => {
                ErrorBody::new(self.to_string(), ErrorCode::NotFound)
            }
            AppError::Store(StoreError::EmptyInsert) => {
                ErrorBody::new(self.to_string(), ErrorCode::EmptyInsert)
            }
            AppError::Store(store_err) => ErrorBody {
                error: store_err.to_string(),
                code: Some(
                    store_err
                        .db_code()
                        .unwrap_or_else(|| ErrorCode::StoreError.as_ref().to_string()),
                ),
            },
            AppError::Validation { .. } | AppError::MissingField { .. } => {
                ErrorBody::new(self.to_string(), ErrorCode::ValidationFailed)
            }
            AppError::InvalidBody(_) => ErrorBody::new(self.to_string(), ErrorCode::InvalidBody),
            AppError::InvalidPath(_) => ErrorBody::new(self.to_string(), ErrorCode::NotFound),
            AppError::Unauthorized(_) => {
                ErrorBody::new(self.to_string(), ErrorCode::Unauthorized)
            }
            AppError::Internal(_) => ErrorBody::new(self.to_string(), ErrorCode::Internal),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation { .. } | AppError::MissingField { .. } => StatusCode::BAD_REQUEST,
            AppError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidPath(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self.body())
    }
}
