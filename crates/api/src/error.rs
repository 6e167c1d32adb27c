use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use groundwork_core::CoreError;
use groundwork_queue::QueueError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps the domain and queue errors and implements [`IntoResponse`] to
/// produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `groundwork_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A submission or query error from the job queue.
    #[error(transparent)]
    Queue(#[from] QueueError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Authentication failure.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => match core {
                CoreError::ConfigNotFound(name) => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("Configuration \"{name}\" not found"),
                ),
                CoreError::InvalidWorkspaceName | CoreError::UnknownAction(_) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", core.to_string())
                }
                other => {
                    tracing::error!(error = %other, "Internal domain error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            AppError::Queue(queue) => match queue {
                QueueError::AlreadyQueued { .. } => {
                    (StatusCode::CONFLICT, "ALREADY_QUEUED", queue.to_string())
                }
                QueueError::UnknownJob(id) => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("Job with id {id} not found"),
                ),
                QueueError::NoWorkers => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "NO_WORKERS",
                    queue.to_string(),
                ),
                QueueError::InvalidStateFilter(_) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", queue.to_string())
                }
                QueueError::Database(e) => {
                    tracing::error!(error = %e, "Database error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            AppError::Database(err) => {
                tracing::error!(error = %err, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }

            AppError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
