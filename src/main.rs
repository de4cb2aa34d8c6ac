use anyhow::Context;
use outfit_curator::{config::Config, gemini::GeminiClient, routes::{router, spawn_sweeper, AppState}};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Init tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let config = Config::from_env().context("invalid configuration")?;
    tracing::info!("Using API key: {}", config.api_key_hint());
    if config.api_key.is_none() {
        tracing::warn!("⚠️ GEMINI_API_KEY is not set; every curation request will fail until it is configured");
    }
    tracing::info!(model = %config.model, base_url = %config.base_url, "Gemini stylist configured");

    let gemini = GeminiClient::new(&config).context("failed to build HTTP client")?;
    let state = AppState::new(Arc::new(gemini));
    spawn_sweeper(state.sessions.clone(), config.session_ttl);
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(%addr, "Starting server");
    let listener = tokio::net::TcpListener::bind(addr).await.with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    tracing::info!("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
