use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use candidates_core::error::CoreError;
use candidates_core::table::ImportError;
use candidates_core::xlsx::XlsxExportError;
use candidates_store::StoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors, [`StoreError`] for backend faults
/// that reach a caller, and adds HTTP-specific variants. Implements
/// [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `candidates_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A backend error from `candidates_store`.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// An uploaded CSV or workbook document could not be read.
    #[error(transparent)]
    Import(#[from] ImportError),

    /// An export workbook could not be produced.
    #[error(transparent)]
    Export(#[from] XlsxExportError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
            },

            // --- Backend errors ---
            AppError::Store(err) => classify_store_error(err),

            AppError::Import(err) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.to_string()),
            AppError::Export(err) => {
                tracing::error!(error = %err, "Workbook export failed");
                internal()
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
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

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Classify a backend error into an HTTP status, error code, and message.
///
/// - Remote sheet failures (transport, non-2xx, malformed rows, token
///   exchange) map to 502.
/// - Missing spreadsheet credentials map to 400.
/// - Everything else maps to 500 with a sanitized message.
fn classify_store_error(err: &StoreError) -> (StatusCode, &'static str, String) {
    match err {
        StoreError::Request(_)
        | StoreError::Api { .. }
        | StoreError::Sheet(_)
        | StoreError::Token(_) => {
            tracing::error!(error = %err, "Spreadsheet upstream error");
            (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", err.to_string())
        }
        StoreError::NotConfigured => (StatusCode::BAD_REQUEST, "NOT_CONFIGURED", err.to_string()),
        other => {
            tracing::error!(error = %other, "Storage error");
            internal()
        }
    }
}
