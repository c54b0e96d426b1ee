// HTTP request handlers
// Author: kelexine (https://github.com/kelexine)

use super::routes::AppState;
use crate::error::RelayError;
use crate::models::relay::ChatRequest;
use crate::translation::translate_request;
use axum::{
    extract::{rejection::BytesRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, error, info, warn};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub checks: HashMap<String, HealthCheck>,
    pub timestamp: String,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheck {
    pub status: String,
    pub message: String,
}

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let mut checks = HashMap::new();
    let mut overall_status = HealthStatus::Healthy;

    // Check the API key is present, without saying anything about it
    let key_check = if state.config.gemini.api_key.is_some() {
        HealthCheck {
            status: "ok".to_string(),
            message: "API key configured".to_string(),
        }
    } else {
        overall_status = HealthStatus::Degraded;
        HealthCheck {
            status: "error".to_string(),
            message: "API key missing; chat requests will fail".to_string(),
        }
    };
    checks.insert("configuration".to_string(), key_check);

    let upstream_check = HealthCheck {
        status: "ok".to_string(),
        message: format!("API base: {}", state.gemini_client.base_url()),
    };
    checks.insert("upstream".to_string(), upstream_check);

    Json(HealthResponse {
        status: overall_status,
        checks,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Handler for the chat relay endpoint.
///
/// Takes the raw body so that the key check runs before any parsing. Body
/// rejections (over `server.max_body_bytes`, broken streams) are taken as a
/// value so they come back as JSON errors like everything else.
pub async fn chat_handler(
    State(state): State<AppState>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Result<Response, RelayError> {
    let result = relay_chat(&state, body).await;

    crate::metrics::record_outcome(match &result {
        Ok(_) => "success",
        Err(e) => e.outcome(),
    });

    let upstream_body = result?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        upstream_body,
    )
        .into_response())
}

async fn relay_chat(
    state: &AppState,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Result<Bytes, RelayError> {
    // 1. Fail fast without a key: nothing is parsed or sent
    let api_key = state.config.gemini.api_key.as_ref().ok_or_else(|| {
        error!(
            "Gemini API key missing: set {} or gemini.api_key",
            crate::config::API_KEY_ENV
        );
        RelayError::MissingApiKey
    })?;

    // 2. Read the whole body, then validate it against the request schema
    let body = body.map_err(|rejection| {
        warn!("Rejecting chat request body: {}", rejection.body_text());
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            RelayError::PayloadTooLarge(rejection.body_text())
        } else {
            RelayError::InvalidRequest(rejection.body_text())
        }
    })?;

    let req = ChatRequest::from_slice(&body).map_err(|e| {
        warn!("Rejecting chat request: {}", e);
        debug!(
            "Raw body (first 500 chars): {}",
            String::from_utf8_lossy(&body).chars().take(500).collect::<String>()
        );
        e
    })?;

    info!(
        "Relaying chat request: model={}, turns={}, search={}",
        req.model_name,
        req.turns(),
        req.use_search
    );

    // 3. Translate and make the single upstream call
    let gemini_req = translate_request(&req);
    let upstream_body = state
        .gemini_client
        .generate_content(api_key, &req.model_name, &gemini_req)
        .await?;

    debug!("Relaying {} byte Gemini response", upstream_body.len());
    Ok(upstream_body)
}

/// Any verb other than POST (and OPTIONS, answered by the CORS layer).
pub async fn method_not_allowed_handler() -> RelayError {
    crate::metrics::record_outcome(RelayError::MethodNotAllowed.outcome());
    RelayError::MethodNotAllowed
}

/// Prometheus scrape endpoint
pub async fn metrics_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        crate::metrics::gather_metrics(),
    )
}
