//! HTTP error response conversion
//!
//! **Preferred handler pattern:** Return `Result<impl IntoResponse, HttpAppError>`.
//! Use `AppError` (or types that implement `Into<HttpAppError>`) for errors so
//! they render consistently (status, body, logging).
//!
//! Client errors (4xx) always serialize as `{"error": "<message>"}`; the
//! message is part of the API contract. Server errors may additionally carry
//! a `details` field outside production.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use medcap_core::{AppError, ErrorMetadata, LogLevel};
use medcap_processing::ValidationError;
use medcap_storage::StorageError;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    /// Diagnostic detail, only present for server errors outside production.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }
}

/// Wrapper type for AppError to implement IntoResponse
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for AppError (external type from medcap-core)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

// The three validation failures map to fixed client messages; API consumers
// match on these strings.
impl From<ValidationError> for HttpAppError {
    fn from(err: ValidationError) -> Self {
        let message = match err {
            ValidationError::MissingFile => "No file uploaded",
            ValidationError::EmptyFilename => "No selected file",
            ValidationError::DisallowedExtension { .. } => "Invalid file type",
        };
        HttpAppError(AppError::InvalidInput(message.to_string()))
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        let app_error = match err {
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            StorageError::NotFound(key) => AppError::NotFound(format!("File not found: {}", key)),
            StorageError::AlreadyExists(key) => {
                AppError::InvalidInput(format!("A file named {} already exists", key))
            }
            other => AppError::Storage(other.to_string()),
        };
        HttpAppError(app_error)
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        // 4xx bodies are contractual and stay bare; 5xx may carry diagnostics
        // in non-production environments.
        let details = if status.is_server_error() && !is_production_env() {
            Some(app_error.detailed_message())
        } else {
            None
        };

        let body = Json(ErrorResponse {
            error: app_error.client_message(),
            details,
        });

        (status, body).into_response()
    }
}
