//! Typed error handling for the spendscan service
//!
//! Every failure is converted into an [`AppError`] at the component boundary
//! that produced it and rendered as a `{ code, message }` JSON body; nothing
//! propagates as an unhandled fault to the top of the call stack.
//!
//! # Error Categories
//!
//! - `Input`: the caller supplied a bad or missing argument (400)
//! - `Unauthorized`: no valid session; the client shows a login prompt (401)
//! - `NotFound`: an owner-scoped resource does not exist (404)
//! - `Configuration`: the service itself is misconfigured, e.g. the
//!   extraction credential is absent (500, generic client message)
//! - `Extraction`: the vision model gateway failed or returned text the
//!   normalizer could not use (502)
//! - `Storage`: a backend read or write failed (500)

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;

/// The main error type for spendscan operations
#[derive(Debug)]
pub enum AppError {
    /// The caller supplied invalid input (missing document, bad period, ...)
    Input { message: String },

    /// No authenticated user could be resolved for the request
    Unauthorized { message: String },

    /// A resource was not found for the calling owner
    NotFound { resource: &'static str, id: String },

    /// The service is misconfigured; details go to the log, not the client
    Configuration { message: String },

    /// The extraction pipeline failed (gateway error or unusable reply)
    Extraction { message: String },

    /// A storage backend operation failed
    Storage { message: String },
}

impl AppError {
    pub fn input(message: impl Into<String>) -> Self {
        AppError::Input {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        AppError::Unauthorized {
            message: message.into(),
        }
    }

    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        AppError::NotFound {
            resource,
            id: id.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        AppError::Configuration {
            message: message.into(),
        }
    }

    pub fn extraction(message: impl Into<String>) -> Self {
        AppError::Extraction {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        AppError::Storage {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Input { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Extraction { .. } => StatusCode::BAD_GATEWAY,
            AppError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the machine-readable error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Input { .. } => "INVALID_INPUT",
            AppError::Unauthorized { .. } => "AUTH_REQUIRED",
            AppError::NotFound { .. } => "NOT_FOUND",
            AppError::Configuration { .. } => "CONFIG_ERROR",
            AppError::Extraction { .. } => "EXTRACTION_FAILED",
            AppError::Storage { .. } => "STORAGE_ERROR",
        }
    }

    /// Convert to the wire-level error response.
    ///
    /// Configuration problems are reported to the client with a generic
    /// message; the specific cause only appears in the log.
    pub fn to_response(&self) -> ErrorResponse {
        let message = match self {
            AppError::Configuration { .. } => "service is not configured correctly".to_string(),
            other => other.to_string(),
        };
        ErrorResponse {
            code: self.error_code().to_string(),
            message,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Input { message } => write!(f, "{}", message),
            AppError::Unauthorized { message } => write!(f, "{}", message),
            AppError::NotFound { resource, id } => {
                write!(f, "{} '{}' not found", resource, id)
            }
            AppError::Configuration { message } => write!(f, "configuration error: {}", message),
            AppError::Extraction { message } => write!(f, "extraction failed: {}", message),
            AppError::Storage { message } => write!(f, "storage error: {}", message),
        }
    }
}

impl std::error::Error for AppError {}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Configuration { message } => {
                tracing::error!(cause = %message, "configuration error");
            }
            AppError::Storage { message } => {
                tracing::error!(cause = %message, "storage error");
            }
            _ => {}
        }
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Storage {
            message: err.to_string(),
        }
    }
}

/// A specialized Result type for spendscan operations
pub type AppResult<T> = Result<T, AppError>;
