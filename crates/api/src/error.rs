use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use herald_core::error::CoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce `{"error": ..., "code": ...}` JSON.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Another dispatch run holds the run lock.
    #[error("A dispatch run is already in progress")]
    RunInProgress,

    #[error("Not Found")]
    NotFound,

    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::Core(core) => classify_core_error(core),
            AppError::Database(err) => classify_core_error(herald_db::classify_error(err)),
            AppError::RunInProgress => (
                StatusCode::CONFLICT,
                "RUN_IN_PROGRESS",
                "A dispatch run is already in progress".to_string(),
            ),
            AppError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND", "Not Found".to_string()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Map a domain error onto a status, error code and client-safe message.
fn classify_core_error(err: CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::StoreUnavailable(msg) => {
            tracing::error!(error = %msg, "Record store unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "STORE_UNAVAILABLE",
                "The record store is unavailable".to_string(),
            )
        }
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
        err @ (CoreError::TransitionConflict { .. } | CoreError::InvalidTransition { .. }) => {
            (StatusCode::CONFLICT, "CONFLICT", err.to_string())
        }
        CoreError::TransportError(msg) => {
            tracing::warn!(error = %msg, "Gateway transport error");
            (
                StatusCode::BAD_GATEWAY,
                "GATEWAY_ERROR",
                "The messaging gateway could not be reached".to_string(),
            )
        }
        CoreError::QueryError(msg) => {
            tracing::error!(error = %msg, "Store query failed");
            internal()
        }
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            internal()
        }
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}
