//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;
use validator::ValidationErrors;

use crate::db::repository::RepositoryError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Malformed path, query or body
    BadRequest(String),
    /// Body parsed but failed field validation
    InvalidBody(ValidationErrors),
    /// Error from the service layer
    Repository(RepositoryError),
}

impl AppError {
    /// Status code and client-facing body. Infrastructure errors collapse to a
    /// generic 500 so driver detail never reaches the client.
    fn status_and_body(&self) -> (StatusCode, ApiError) {
        match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg)),
            AppError::InvalidBody(errors) => (
                StatusCode::BAD_REQUEST,
                ApiError::new("VALIDATION_FAILED", "request body failed validation")
                    .with_details(errors.to_string()),
            ),
            AppError::Repository(e) => match e {
                RepositoryError::NotFound { message, .. } => {
                    (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", message))
                }
                RepositoryError::ValidationError { message, .. } => (
                    StatusCode::BAD_REQUEST,
                    ApiError::new("VALIDATION_FAILED", message),
                ),
                RepositoryError::ConflictError { message, .. } => {
                    (StatusCode::CONFLICT, ApiError::new("CONFLICT", message))
                }
                RepositoryError::TimeoutError { .. } => (
                    StatusCode::REQUEST_TIMEOUT,
                    ApiError::new("TIMEOUT", "request timed out"),
                ),
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::new("INTERNAL_ERROR", "internal server error"),
                ),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        if status.is_server_error() {
            if let AppError::Repository(e) = &self {
                error!(error = %e, "request failed");
            }
        }
        (status, Json(body)).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Repository(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_table() {
        let cases = [
            (RepositoryError::not_found("x"), StatusCode::NOT_FOUND),
            (RepositoryError::validation("x"), StatusCode::BAD_REQUEST),
            (RepositoryError::conflict("x"), StatusCode::CONFLICT),
            (RepositoryError::timeout("x"), StatusCode::REQUEST_TIMEOUT),
            (RepositoryError::connection("x"), StatusCode::INTERNAL_SERVER_ERROR),
            (RepositoryError::query("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            let (status, _) = AppError::from(err).status_and_body();
            assert_eq!(status, expected);
        }
    }

    #[test]
    fn test_internal_detail_not_exposed() {
        let err = AppError::from(RepositoryError::query("Table 'article.article' doesn't exist"));
        let (_, body) = err.status_and_body();
        assert_eq!(body.message, "internal server error");
        assert!(body.details.is_none());
    }
}
