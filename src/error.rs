//! Error types for the mdr server.

use crate::session::SessionError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use mdr_search::SearchError;
use serde::{Deserialize, Serialize};

/// Top-level error type for the HTTP layer and process bootstrap.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Search aggregation error. Only query validation reaches clients.
    #[error(transparent)]
    Search(#[from] SearchError),

    /// Missing, malformed, forged or expired session credential.
    #[error("unauthorized: {0}")]
    Unauthorized(#[from] SessionError),

    /// Malformed request body or parameters.
    #[error("invalid request: {0}")]
    BadRequest(String),

    /// Feedback could not be handed to its sink.
    #[error("feedback delivery failed: {0}")]
    Feedback(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ServerError>;

/// JSON error body returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable machine-readable error kind.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

impl ServerError {
    /// HTTP status and stable error kind for this error.
    pub fn status_and_kind(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Search(err) if err.is_validation() => {
                (StatusCode::BAD_REQUEST, "validation_error")
            }
            Self::Search(_) => (StatusCode::INTERNAL_SERVER_ERROR, "search_error"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            Self::Feedback(_) => (StatusCode::INTERNAL_SERVER_ERROR, "feedback_error"),
            Self::Config(_) | Self::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, kind) = self.status_and_kind();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }

        let body = ErrorResponse {
            error: kind.to_owned(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
