// gemini-relay - Key-hiding, CORS-normalizing relay for the Gemini API
// Author: kelexine (https://github.com/kelexine)

use anyhow::Result;
use clap::Parser;
use gemini_relay::cli::Args;
use gemini_relay::config::AppConfig;
use gemini_relay::gemini::GeminiClient;
use gemini_relay::server::create_router;
use gemini_relay::utils::logging;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Phase 1: Load configuration
    let mut config = match &args.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    args.apply(&mut config);

    // Phase 2: Initialize logging
    logging::init(&config.logging)?;
    info!("Starting gemini-relay v{}", env!("CARGO_PKG_VERSION"));

    if config.gemini.api_key.is_none() {
        warn!("No Gemini API key configured; chat requests will be answered with 500");
    }

    // Phase 3: Build upstream client
    let gemini_client = GeminiClient::new(&config.gemini)?;
    info!("Relaying to {}", gemini_client.base_url());

    // Phase 4: Build and start HTTP server
    let app = create_router(config.clone(), gemini_client)?;
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Phase 5: Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
