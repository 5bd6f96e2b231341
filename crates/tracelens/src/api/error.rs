use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

use tracelens_sessions::{IngestError, StoreError};

/// Errors surfaced by the HTTP handlers, rendered as JSON bodies.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid dbg payload")]
    InvalidPayload(#[from] IngestError),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Entry {index} not found in session {id}")]
    EntryNotFound { id: String, index: usize },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            ApiError::SessionNotFound(_) | ApiError::EntryNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Store(StoreError::DuplicateId(_)) => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::InvalidPayload(err) => json!({
                "error": self.to_string(),
                "details": {
                    "message": err.to_string(),
                    "issues": err.issues(),
                },
            }),
            _ => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
