//! Error types for wizz-lists
//!
//! Two layers:
//! - [`UpstreamError`]: a structured source or model call failed. List
//!   endpoints absorb it through the fallback chain.
//! - [`ApiError`]: what an HTTP handler returns. Only endpoints without a
//!   fallback surface upstream failures (as 502).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use wizz_common::text::truncate;

/// Longest diagnostic string returned to callers for 5xx responses
pub const MAX_DIAGNOSTIC_CHARS: usize = 300;

/// Upstream (structured source / generative model) errors
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Transport failure or timeout
    #[error("Network error: {0}")]
    Network(String),

    /// Provider answered with a non-2xx status
    #[error("Upstream status {0}: {1}")]
    Status(u16, String),

    /// Response could not be decoded (including JSON still invalid after repair)
    #[error("Parse error: {0}")]
    Parse(String),

    /// No credential or client configured for this provider
    #[error("Not configured: {0}")]
    NotConfigured(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            UpstreamError::Parse(err.to_string())
        } else {
            UpstreamError::Network(err.to_string())
        }
    }
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Wrong HTTP method for this route (405)
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    /// Upstream provider failure on an endpoint with no fallback (502)
    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::MethodNotAllowed(msg) => {
                (StatusCode::METHOD_NOT_ALLOWED, "METHOD_NOT_ALLOWED", msg)
            }
            ApiError::Upstream(ref err) => (
                StatusCode::BAD_GATEWAY,
                "UPSTREAM_ERROR",
                truncate(&err.to_string(), MAX_DIAGNOSTIC_CHARS),
            ),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                truncate(&msg, MAX_DIAGNOSTIC_CHARS),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
