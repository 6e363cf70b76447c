use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors raised by the résumé store and its backends.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Unsupported file type: {0}. Only PDF and DOCX files are accepted")]
    UnsupportedFileType(String),

    #[error("File is {size} bytes, the limit is {limit} bytes")]
    FileTooLarge { size: usize, limit: usize },

    #[error("An upload is already in progress")]
    UploadInProgress,

    #[error("Storage operation failed: {0}")]
    Storage(String),

    #[error("Record operation failed: {0}")]
    Record(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl StoreError {
    pub(crate) fn session_closed() -> Self {
        StoreError::Configuration("resume store must be used within an active session".to_string())
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Record(e.to_string())
    }
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Session closed")]
    SessionClosed,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::AuthenticationRequired => AppError::Unauthorized,
            StoreError::UnsupportedFileType(_) => AppError::UnsupportedMediaType(e.to_string()),
            StoreError::FileTooLarge { .. } => AppError::PayloadTooLarge(e.to_string()),
            StoreError::UploadInProgress => AppError::Conflict(e.to_string()),
            StoreError::Storage(msg) => AppError::Storage(msg),
            StoreError::Record(msg) => AppError::Database(msg),
            StoreError::Configuration(_) => AppError::SessionClosed,
        }
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnsupportedMediaType(msg) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UNSUPPORTED_FILE_TYPE",
                msg.clone(),
            ),
            AppError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "FILE_TOO_LARGE", msg.clone())
            }
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication required".to_string(),
            ),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::SessionClosed => (
                StatusCode::CONFLICT,
                "SESSION_CLOSED",
                "The session was closed while the request was in flight".to_string(),
            ),
            AppError::Storage(msg) => {
                tracing::error!("Storage error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            AppError::Database(msg) => {
                tracing::error!("Database error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_http_statuses() {
        let cases = [
            (StoreError::AuthenticationRequired, StatusCode::UNAUTHORIZED),
            (
                StoreError::UnsupportedFileType("exe".to_string()),
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ),
            (
                StoreError::FileTooLarge { size: 10, limit: 5 },
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
            (StoreError::UploadInProgress, StatusCode::CONFLICT),
            (StoreError::session_closed(), StatusCode::CONFLICT),
            (
                StoreError::Storage("bucket gone".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                StoreError::Record("pool timed out".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            let (status, _, _) = AppError::from(err).parts();
            assert_eq!(status, expected);
        }
    }

    #[test]
    fn test_backend_details_are_not_leaked_to_clients() {
        let (_, code, message) = AppError::from(StoreError::Storage("secret key".to_string())).parts();
        assert_eq!(code, "STORAGE_ERROR");
        assert!(!message.contains("secret"));
    }

    #[test]
    fn test_file_too_large_message_names_limit() {
        let err = StoreError::FileTooLarge {
            size: 6_000_000,
            limit: 5_242_880,
        };
        assert!(err.to_string().contains("5242880"));
    }
}
