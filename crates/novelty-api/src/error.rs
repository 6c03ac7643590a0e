//! API error types and JSON error response formatting.
//!
//! ApiError provides a consistent JSON error response format across all
//! endpoints, mapping internal errors to appropriate HTTP status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use novelty_core::error::NoveltyError;

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code (e.g., "bad_request", "not_found").
    pub error: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional structured details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// API error type that maps to HTTP status codes and JSON responses.
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request - invalid input or an unextractable document.
    BadRequest(String),
    /// 404 Not Found - resource does not exist.
    NotFound(String),
    /// 500 Internal Server Error - embedding or store failure.
    Internal(String),
    /// 503 Service Unavailable - component not ready.
    ServiceUnavailable(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
            ApiError::ServiceUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", msg)
            }
        };

        let body = ErrorBody {
            error: error_code.to_string(),
            message,
            details: None,
        };

        (status, Json(body)).into_response()
    }
}

impl From<NoveltyError> for ApiError {
    fn from(err: NoveltyError) -> Self {
        match &err {
            // Caller-side failures keep the stage-tagged message and a 400.
            NoveltyError::Validation { .. } | NoveltyError::Extraction(_) => {
                ApiError::BadRequest(err.to_string())
            }
            // Provider and store failures are server-side.
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_bad_request() {
        let api_err: ApiError = NoveltyError::validation("text", "too short").into();
        assert!(matches!(api_err, ApiError::BadRequest(_)));
    }

    #[test]
    fn test_extraction_maps_to_bad_request() {
        let api_err: ApiError = NoveltyError::Extraction("empty document".to_string()).into();
        assert!(matches!(api_err, ApiError::BadRequest(_)));
    }

    #[test]
    fn test_embedding_maps_to_internal() {
        let api_err: ApiError = NoveltyError::Embedding("model unavailable".to_string()).into();
        assert!(matches!(api_err, ApiError::Internal(_)));
    }

    #[test]
    fn test_store_maps_to_internal() {
        let api_err: ApiError = NoveltyError::Store("connection lost".to_string()).into();
        assert!(matches!(api_err, ApiError::Internal(_)));
    }

    #[test]
    fn test_message_keeps_stage_tag() {
        let api_err: ApiError = NoveltyError::Embedding("model unavailable".to_string()).into();
        match api_err {
            ApiError::Internal(msg) => assert!(msg.starts_with("Embedding error:")),
            _ => panic!("expected Internal"),
        }
    }
}
