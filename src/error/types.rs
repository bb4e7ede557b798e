use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

pub type AppResult<T> = Result<T, AppError>;

/// Transport-level request failures. Per-file extraction and validation
/// outcomes are not errors at this level; they are recorded in the intake
/// response so the caller can retry individual files.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Rate limit exceeded: maximum concurrent requests reached")]
    RateLimitExceeded,

    #[error("No files found. Submit files using the 'documents' form field")]
    MissingFiles,

    #[error("Missing or invalid content type")]
    InvalidContentType,

    #[error("Malformed request: {message}")]
    BadRequest { message: String },

    #[error("Request timeout")]
    Timeout,

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl AppError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidApiKey => "INVALID_API_KEY",
            AppError::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            AppError::MissingFiles => "FILE_NOT_PROVIDED",
            AppError::InvalidContentType => "INVALID_CONTENT_TYPE",
            AppError::BadRequest { .. } => "BAD_REQUEST",
            AppError::Timeout => "REQUEST_TIMEOUT",
            AppError::ConfigError { .. } => "CONFIG_ERROR",
            AppError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidApiKey => StatusCode::UNAUTHORIZED,
            AppError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            AppError::MissingFiles => StatusCode::BAD_REQUEST,
            AppError::InvalidContentType => StatusCode::BAD_REQUEST,
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Timeout => StatusCode::REQUEST_TIMEOUT,
            AppError::ConfigError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.to_string();
        let request_id = Uuid::new_v4().to_string();
        let timestamp = chrono::Utc::now().to_rfc3339();

        // Structured logging with context
        tracing::error!(
            error_code = error_code,
            status_code = %status,
            request_id = %request_id,
            error_message = %message,
            "API error occurred"
        );

        let body = Json(json!({
            "success": false,
            "error": {
                "code": error_code,
                "message": message,
                "request_id": request_id,
                "timestamp": timestamp
            },
            "data": null
        }));

        (status, body).into_response()
    }
}

// Convert common errors to AppError
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal {
            message: format!("IO error: {}", err),
        }
    }
}

impl From<tokio::time::error::Elapsed> for AppError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        AppError::Timeout
    }
}

// Helper methods for creating specific errors
impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        AppError::ConfigError {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::Internal {
            message: message.into(),
        }
    }
}
