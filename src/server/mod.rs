//! Axum-based HTTP server implementation for the gemini-relay service.
//!
//! This module is responsible for setting up the HTTP server, configuring
//! routes, and handling incoming chat requests from browser clients. Each
//! chat request is relayed as one call to the Google Gemini API.
//!
//! # Components
//!
//! - `handlers`: The chat relay, health and metrics endpoints.
//! - `middleware`: Static CORS headers with preflight handling, and request ID tracking.
//! - `routes`: The main router configuration that ties everything together.
//!
//! Author: kelexine (<https://github.com/kelexine>)

mod handlers;
mod middleware;
mod routes;

pub use handlers::{HealthCheck, HealthResponse, HealthStatus};
pub use middleware::{ALLOW_HEADERS, ALLOW_METHODS};
pub use routes::{create_router, AppState};
