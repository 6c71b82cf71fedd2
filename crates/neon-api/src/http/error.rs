//! Application error type mapping to HTTP status codes and the error envelope.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use neon_core::engine::EngineError;
use neon_types::error::RepositoryError;

#[derive(Debug)]
pub enum AppError {
    Engine(EngineError),
    Repository(RepositoryError),
    /// A path or query parameter referenced something that does not exist.
    NotFound(String),
    Validation(String),
    Internal(String),
}

impl From<EngineError> for AppError {
    fn from(e: EngineError) -> Self {
        AppError::Engine(e)
    }
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        AppError::Repository(e)
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String, Option<serde_json::Value>) {
        match self {
            AppError::Engine(EngineError::EmptyUtterance) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "Utterance must not be empty".to_string(),
                None,
            ),
            AppError::Engine(EngineError::ConversationNotFound(id)) => (
                StatusCode::NOT_FOUND,
                "CONVERSATION_NOT_FOUND",
                format!("Conversation {id} not found"),
                None,
            ),
            AppError::Engine(EngineError::Busy(id)) => (
                StatusCode::CONFLICT,
                "CONVERSATION_BUSY",
                format!("Conversation {id} is still answering the previous message"),
                None,
            ),
            AppError::Engine(EngineError::Generation {
                user_turn_id,
                source,
            }) => (
                StatusCode::BAD_GATEWAY,
                "GENERATION_FAILED",
                source.to_string(),
                Some(json!({ "user_turn_id": user_turn_id, "recoverable": true })),
            ),
            AppError::Engine(EngineError::Repository(e)) | AppError::Repository(e) => {
                repository_parts(e)
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone(), None)
            }
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                msg.clone(),
                None,
            ),
        }
    }
}

fn repository_parts(
    e: &RepositoryError,
) -> (StatusCode, &'static str, String, Option<serde_json::Value>) {
    match e {
        RepositoryError::NotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
            None,
        ),
        RepositoryError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone(), None),
        other => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "STORAGE_ERROR",
            other.to_string(),
            None,
        ),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = self.parts();

        if status.is_server_error() {
            tracing::error!(code, %message, "Request failed");
        } else {
            tracing::debug!(code, %message, "Request rejected");
        }

        let mut error = json!({ "code": code, "message": message });
        if let Some(details) = details {
            error["details"] = details;
        }
        let body = json!({
            "meta": {
                "timestamp": chrono::Utc::now().to_rfc3339(),
            },
            "errors": [error],
        });

        (status, Json(body)).into_response()
    }
}
