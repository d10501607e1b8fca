//! API Error Types
//!
//! Defines error types for the API layer and implements conversion
//! to HTTP responses with appropriate status codes.
//!
//! Event ingestion never produces these: malformed producer payloads are
//! defaulted instead. They cover authentication, unknown routes and the
//! editor endpoints that validate their input.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request validation failed
    #[error("{0}")]
    Validation(String),

    /// Request body exceeds the configured limit
    #[error("{0}")]
    PayloadTooLarge(String),

    /// Producer credentials rejected
    #[error("{0}")]
    Unauthorized(String),

    /// No route matches the request
    #[error("Route {method} {path} not found")]
    NotFound { method: String, path: String },

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error response body
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorBody,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_endpoints: Option<&'static [&'static str]>,
}

/// Error details
#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// Endpoints listed in 404 responses
pub const AVAILABLE_ENDPOINTS: &[&str] = &[
    "GET /ping",
    "GET /health/live",
    "GET /state/:overlayType",
    "POST /tikhub/authenticate",
    "POST /event/gift",
    "POST /event/follow",
    "POST /event/like",
    "POST /event/chat",
    "POST /event/share",
    "POST /event/subscribe",
    "POST /broadcast-event",
    "POST /api/chat-event",
    "GET|POST /api/goal-settings",
    "GET|POST /api/actions",
    "WS /<overlay-path>",
];

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
        };

        let request_id = uuid::Uuid::new_v4().to_string();

        if status.is_server_error() {
            tracing::error!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "API error occurred"
            );
        } else {
            tracing::warn!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "Request rejected"
            );
        }

        let available_endpoints = match &self {
            ApiError::NotFound { .. } => Some(AVAILABLE_ENDPOINTS),
            _ => None,
        };

        let body = ErrorResponse {
            success: false,
            error: ErrorBody {
                code: code.to_string(),
                message: self.to_string(),
            },
            request_id,
            available_endpoints,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (ApiError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (
                ApiError::PayloadTooLarge("x".into()),
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
            (ApiError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (
                ApiError::NotFound {
                    method: "GET".into(),
                    path: "/nope".into(),
                },
                StatusCode::NOT_FOUND,
            ),
            (ApiError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn test_not_found_message() {
        let error = ApiError::NotFound {
            method: "GET".into(),
            path: "/nope".into(),
        };
        assert_eq!(error.to_string(), "Route GET /nope not found");
    }
}
