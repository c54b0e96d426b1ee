// Error types for the gemini-relay service
// Author: kelexine (https://github.com/kelexine)

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Message returned to clients when no API key is configured. Deliberately
/// says nothing about where the key should come from.
pub const MISSING_KEY_MESSAGE: &str = "Server Configuration Error: API Key missing.";

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Gemini API key is not configured")]
    MissingApiKey,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// Upstream answered with a non-2xx status. `body` is its raw text.
    #[error("Gemini API error: HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Config parsing error: {0}")]
    ConfigParsing(#[from] config::ConfigError),
}

impl RelayError {
    /// Label used for the `outcome` dimension of the request counter.
    pub fn outcome(&self) -> &'static str {
        match self {
            RelayError::MethodNotAllowed => "method_not_allowed",
            RelayError::MissingApiKey => "config_error",
            RelayError::InvalidRequest(_) => "invalid_request",
            RelayError::PayloadTooLarge(_) => "payload_too_large",
            RelayError::Upstream { .. } => "upstream_error",
            RelayError::Transport(_) => "transport_error",
            RelayError::Config(_) | RelayError::ConfigParsing(_) => "internal_error",
        }
    }

    /// Message exposed under `message` for 500s, without any secret in it.
    fn public_message(&self) -> String {
        crate::utils::logging::sanitize(&self.to_string())
    }
}

// Convert RelayError to HTTP responses for Axum
impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            RelayError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                json!({ "error": "Method not allowed" }),
            ),
            RelayError::MissingApiKey => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": MISSING_KEY_MESSAGE }),
            ),
            RelayError::InvalidRequest(details) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Invalid request", "details": details }),
            ),
            RelayError::PayloadTooLarge(details) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                json!({ "error": "Payload too large", "details": details }),
            ),
            RelayError::Upstream { status, body } => (
                // Upstream status is relayed as-is
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                json!({
                    "error": "Gemini API Error",
                    "status": status,
                    "details": body,
                }),
            ),
            other => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": "Internal Server Error",
                    "message": other.public_message(),
                }),
            ),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
