//! JSON error responses: `{"error": "<message>"}`.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{error, warn};
use voxlingo_engine::PipelineError;

const REDACTED: &str = "Internal server error";

/// Error returned by handlers, rendered as a status code plus JSON body.
#[derive(Debug, thiserror::Error)]
#[error("{status}: {message}")]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Map a pipeline failure. Client errors are always shown verbatim;
    /// other messages are replaced unless `expose_details` is set.
    pub fn from_pipeline(err: &PipelineError, expose_details: bool) -> Self {
        if err.is_client_error() {
            warn!(kind = err.error_kind(), error = %err, "rejected translation request");
            return Self::new(StatusCode::BAD_REQUEST, err.to_string());
        }
        error!(kind = err.error_kind(), error = %err, "translation request failed");
        let message = match err {
            PipelineError::EmptyTranscription => err.to_string(),
            _ if expose_details => err.to_string(),
            _ => REDACTED.to_string(),
        };
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        warn!(error = %err, "malformed upload");
        Self::new(err.status(), err.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.message }));
        (self.status, body).into_response()
    }
}
