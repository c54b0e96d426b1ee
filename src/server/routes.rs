// HTTP routes configuration
// Author: kelexine (https://github.com/kelexine)

use super::handlers::{chat_handler, health_handler, method_not_allowed_handler, metrics_handler};
use super::middleware::{cors_middleware, request_id_layers, CorsHeaders};
use crate::config::AppConfig;
use crate::error::Result;
use crate::gemini::GeminiClient;
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, MethodRouter},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub gemini_client: Arc<GeminiClient>,
}

pub fn create_router(config: AppConfig, gemini_client: GeminiClient) -> Result<Router> {
    let cors = Arc::new(CorsHeaders::from_config(&config.cors)?);
    let max_body_bytes = config.server.max_body_bytes;

    let state = AppState {
        config,
        gemini_client: Arc::new(gemini_client),
    };

    let (set_request_id, propagate_request_id) = request_id_layers();

    let app = Router::new()
        .route("/chat", chat_route())
        // Path of the original serverless deployment
        .route("/api/chat", chat_route())
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        // Replaces axum's 2 MB default; the chat handler turns overruns into JSON 413s
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(set_request_id)
                .layer(TraceLayer::new_for_http())
                .layer(propagate_request_id)
                .layer(middleware::from_fn_with_state(cors, cors_middleware)),
        )
        .with_state(state);

    Ok(app)
}

fn chat_route() -> MethodRouter<AppState> {
    post(chat_handler).fallback(method_not_allowed_handler)
}
