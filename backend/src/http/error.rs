//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::repository::{ErrorContext, RepositoryError};

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
    /// Resource not found
    NotFound(String),
    /// Invalid request (validation error)
    BadRequest(String),
    /// Write rejected by a uniqueness constraint
    Conflict(String),
    /// Internal server error
    Internal(String),
    /// Repository error
    Repository(RepositoryError),
}

fn context_details(context: &ErrorContext) -> Option<String> {
    let has_content = context.operation.is_some()
        || context.entity.is_some()
        || context.entity_id.is_some()
        || context.details.is_some();
    has_content.then(|| context.to_string())
}

fn repository_response(err: RepositoryError) -> (StatusCode, ApiError) {
    let details = context_details(err.context());
    let (status, code, message) = match err {
        RepositoryError::NotFound { message, .. } => (StatusCode::NOT_FOUND, "NOT_FOUND", message),
        RepositoryError::ValidationError { message, .. } => {
            (StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
        }
        RepositoryError::Conflict { message, .. } => (StatusCode::CONFLICT, "CONFLICT", message),
        other => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "REPOSITORY_ERROR",
            other.to_string(),
        ),
    };

    let mut error = ApiError::new(code, message);
    if let Some(details) = details {
        error = error.with_details(details);
    }
    (status, error)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg)),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg))
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, ApiError::new("CONFLICT", msg)),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("INTERNAL_ERROR", msg),
            ),
            AppError::Repository(e) => {
                if !matches!(
                    e,
                    RepositoryError::NotFound { .. }
                        | RepositoryError::ValidationError { .. }
                        | RepositoryError::Conflict { .. }
                ) {
                    tracing::error!("Repository failure: {}", e);
                }
                repository_response(e)
            }
        };

        (status, Json(error)).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Repository(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}
