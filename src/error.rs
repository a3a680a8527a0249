//! Error types for Vertex Relay
//!
//! This module defines custom error types used throughout the application.
//! Upstream non-success responses are not errors here: they are relayed to
//! the caller verbatim by the proxy module.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::project::ResolutionError;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid or missing API Key")]
    Unauthorized,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error("Proxy error: {0}")]
    Proxy(String),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Collapse any failure into the generic 500 used by the frontend endpoint
    pub fn into_proxy_error(self) -> AppError {
        match self {
            AppError::Proxy(_) => self,
            other => AppError::Proxy(other.to_string()),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

/// Error details
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", self.to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Resolution(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "PROJECT_RESOLUTION_FAILED",
                self.to_string(),
            ),
            AppError::Proxy(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "PROXY_ERROR",
                self.to_string(),
            ),
            AppError::HttpError(_) => (
                StatusCode::BAD_GATEWAY,
                "UPSTREAM_ERROR",
                "Upstream service error".to_string(),
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Internal server error".to_string(),
            ),
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;
