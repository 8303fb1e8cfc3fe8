//! # ApiError
//!
//! Maps `DomainError` onto HTTP statuses with a `{"error": "..."}` body.
//! Messages are safe for clients; internal causes only reach the log.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use domains::DomainError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("{0}")]
    Conflict(String),

    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotAuthenticated => ApiError::Unauthorized,
            DomainError::NotFound(entity, _) => ApiError::NotFound(entity),
            DomainError::Validation(msg) => ApiError::BadRequest(msg),
            DomainError::Forbidden(_) => ApiError::Forbidden,
            DomainError::Conflict(msg) => ApiError::Conflict(msg),
            DomainError::Internal(msg) => {
                error!(error = %msg, "request failed");
                ApiError::Internal
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Rejection for mutating routes, shaped like a failed action:
/// `{"success": false, "error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRejection(pub ApiError);

impl IntoResponse for ActionRejection {
    fn into_response(self) -> Response {
        (self.0.status(), Json(json!({ "success": false, "error": self.0.to_string() }))).into_response()
    }
}
