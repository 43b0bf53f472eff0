use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use juris_client::ReqwestFetcher;
use juris_core::{SearchConfig, SearchService};
use juris_server::routes;
use juris_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("juris=info".parse()?))
        .with_target(false)
        .init();

    let config = SearchConfig::from_env()?;
    let port = std::env::var("JURIS_SERVER_PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{port}");

    let registry = config.registry().context("Failed to build source registry")?;
    let fetcher = ReqwestFetcher::from_config(&config).context("Failed to create HTTP client")?;
    tracing::info!(sources = registry.len(), user_agent = %config.user_agent, "Registry loaded");

    let state = Arc::new(AppState {
        search: SearchService::new(fetcher, Arc::new(registry)),
    });

    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    tracing::info!("Starting server on {addr}");
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install CTRL+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
