// Gemini API client
// Author: kelexine (https://github.com/kelexine)

use crate::config::{ApiKey, GeminiConfig};
use crate::error::{RelayError, Result};
use crate::models::gemini::GenerateContentRequest;
use crate::utils::logging::sanitize;
use bytes::Bytes;
use reqwest::Client;
use serde::de::IgnoredAny;
use std::error::Error as _;
use std::time::{Duration, Instant};
use tracing::{debug, error};

/// Client for the public Gemini `generateContent` API.
///
/// Each call is exactly one HTTP request: there is no retry, and the
/// response body is handed back untouched so the relay can pass it on.
pub struct GeminiClient {
    http_client: Client,
    api_base_url: String,
}

impl GeminiClient {
    /// Create a client with a pooled HTTP connection and bounded timeouts.
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Some(Duration::from_secs(60)))
            .tcp_nodelay(true)
            .use_rustls_tls()
            .build()
            .map_err(|e| RelayError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        debug!("Created HTTP client for {}", config.api_base_url);

        Ok(Self {
            http_client,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Get the API base_url
    pub fn base_url(&self) -> &str {
        &self.api_base_url
    }

    /// Endpoint for one model, without the key.
    pub fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.api_base_url, model)
    }

    /// Call Gemini `generateContent` once and return its JSON body verbatim,
    /// byte for byte. The body is checked to be JSON but not otherwise
    /// interpreted.
    ///
    /// Non-2xx answers become [`RelayError::Upstream`] carrying the upstream
    /// status and raw body text. Network failures, timeouts and unparseable
    /// bodies all become [`RelayError::Transport`].
    pub async fn generate_content(
        &self,
        api_key: &ApiKey,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<Bytes> {
        let url = self.endpoint(model);
        debug!("Calling generateContent API: {}", url);

        let start = Instant::now();
        let sent = self
            .http_client
            .post(&url)
            .query(&[("key", api_key.expose())])
            .json(request)
            .send()
            .await;

        let response = match sent {
            Ok(response) => response,
            Err(e) => {
                crate::metrics::record_gemini_call(model, None, start.elapsed().as_secs_f64());
                let message = describe_transport_error(e);
                error!("Gemini API request failed: {}", message);
                return Err(RelayError::Transport(message));
            }
        };

        let status = response.status();
        let body = response.bytes().await;
        crate::metrics::record_gemini_call(
            model,
            Some(status.as_u16()),
            start.elapsed().as_secs_f64(),
        );

        let body = body.map_err(|e| {
            let message = describe_transport_error(e);
            error!("Failed to read Gemini response body: {}", message);
            RelayError::Transport(format!("Failed to read response body: {}", message))
        })?;

        if !status.is_success() {
            let text = String::from_utf8_lossy(&body).into_owned();
            error!(
                "Gemini API error: HTTP {} - Response body: {}",
                status,
                sanitize(&text)
            );
            return Err(RelayError::Upstream {
                status: status.as_u16(),
                body: text,
            });
        }

        debug!(
            "Raw Gemini response (first 500 chars): {}",
            String::from_utf8_lossy(&body).chars().take(500).collect::<String>()
        );

        serde_json::from_slice::<IgnoredAny>(&body).map_err(|e| {
            error!("Failed to parse Gemini response: {}", e);
            RelayError::Transport(format!("Response parsing error: {}", e))
        })?;

        Ok(body)
    }
}

/// Flatten a reqwest error and its whole `source()` chain into one line.
///
/// The top-level text alone is just "error sending request"; the cause
/// (refused connection, DNS failure, timeout) lives further down. The URL
/// carries the key, so it is stripped and the result sanitized.
fn describe_transport_error(e: reqwest::Error) -> String {
    let e = e.without_url();
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        // hyper repeats the inner message in its own Display
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    sanitize(&message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::gemini::{Content, Part, Role, SystemInstruction};
    use serde_json::json;

    fn client_for(base: &str) -> GeminiClient {
        let config = GeminiConfig {
            api_base_url: base.to_string(),
            timeout_seconds: 5,
            ..GeminiConfig::default()
        };
        GeminiClient::new(&config).unwrap()
    }

    fn sample_request() -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content::text(Role::User, "hi")],
            system_instruction: SystemInstruction {
                parts: vec![Part {
                    text: "sys".to_string(),
                }],
            },
            tools: None,
        }
    }

    #[test]
    fn test_endpoint_shape() {
        let client = client_for("https://generativelanguage.googleapis.com/v1beta/");
        assert_eq!(
            client.endpoint("gemini-2.5-flash"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[tokio::test]
    async fn test_success_body_is_verbatim() {
        let mut server = mockito::Server::new_async().await;
        let upstream = json!({ "candidates": [{ "content": { "parts": [{ "text": "yo" }] } }] });
        let mock = server
            .mock("POST", "/models/gemini-2.5-flash:generateContent")
            .match_query(mockito::Matcher::UrlEncoded("key".into(), "k-123".into()))
            .match_body(mockito::Matcher::PartialJson(json!({
                "contents": [{ "role": "user", "parts": [{ "text": "hi" }] }]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(upstream.to_string())
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server.url());
        let body = client
            .generate_content(&ApiKey::new("k-123"), "gemini-2.5-flash", &sample_request())
            .await
            .unwrap();

        assert_eq!(body, Bytes::from(upstream.to_string()));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_success_body_ignores_declared_charset() {
        let mut server = mockito::Server::new_async().await;
        // UTF-8 bytes under a Latin-1 label: decoding by charset would mangle them
        let upstream = "{ \"text\" :\"café ☕\" }";
        let _mock = server
            .mock("POST", "/models/m:generateContent")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json; charset=iso-8859-1")
            .with_body(upstream)
            .create_async()
            .await;

        let client = client_for(&server.url());
        let body = client
            .generate_content(&ApiKey::new("k"), "m", &sample_request())
            .await
            .unwrap();

        assert_eq!(body.as_ref(), upstream.as_bytes());
    }

    #[tokio::test]
    async fn test_upstream_error_keeps_status_and_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/models/m:generateContent")
            .match_query(mockito::Matcher::Any)
            .with_status(429)
            .with_body("quota exceeded")
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server.url());
        let err = client
            .generate_content(&ApiKey::new("k"), "m", &sample_request())
            .await
            .unwrap_err();

        match err {
            RelayError::Upstream { status, body } => {
                assert_eq!(status, 429);
                assert_eq!(body, "quota exceeded");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_invalid_json_is_transport_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/models/m:generateContent")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let client = client_for(&server.url());
        let err = client
            .generate_content(&ApiKey::new("k"), "m", &sample_request())
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::Transport(_)));
    }

    #[tokio::test]
    async fn test_connection_failure_hides_key() {
        // Nothing listens on port 9 (discard) in the test environment
        let client = client_for("http://127.0.0.1:9");
        let err = client
            .generate_content(&ApiKey::new("super-secret"), "m", &sample_request())
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::Transport(_)));
        let message = err.to_string();
        assert!(!message.contains("super-secret"));
        // The underlying cause survives, not just "error sending request"
        let lower = message.to_lowercase();
        assert!(
            lower.contains("refused") || lower.contains("connect"),
            "missing cause: {}",
            message
        );
    }
}
