use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::services::ProducerError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }

    pub fn with_status(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

pub fn producer_error_response(error: ProducerError) -> Response {
    match error {
        ProducerError::Validation(message) => {
            ErrorResponse::new(message).with_status(StatusCode::BAD_REQUEST)
        }
        ProducerError::Forbidden => ErrorResponse::new("Conversation not found or access denied")
            .with_status(StatusCode::FORBIDDEN),
        e @ (ProducerError::Repository(_) | ProducerError::Queue(_)) => {
            tracing::error!(error = %e, "Chat submission failed");
            ErrorResponse::new("Internal server error").with_status(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
