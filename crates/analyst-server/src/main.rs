//! Market Analyst HTTP Server
//!
//! Axum server exposing a single analysis endpoint plus a health probe,
//! and serving the static front-end.

mod config;
mod handlers;
mod routes;
mod state;

use std::sync::Arc;

use analyst_core::LlmProvider;
use analyst_runtime::GeminiProvider;
use market_analyzer::{CoinGeckoClient, MarketAnalyzer, PriceFeed};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppConfig;
use crate::routes::create_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment first so RUST_LOG from .env applies
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    // AI provider
    let provider = Arc::new(GeminiProvider::from_config(config.gemini.clone())?);
    match provider.health_check().await {
        Ok(true) => tracing::info!("✓ Gemini reachable (model: {})", config.gemini.model),
        Ok(false) | Err(_) => {
            tracing::warn!("⚠ Gemini not reachable - analyses will fail");
            tracing::warn!("  Check GEMINI_API_KEY and GEMINI_MODEL in .env");
        }
    }

    // Price feed
    let feed = Arc::new(CoinGeckoClient::new(config.coingecko.clone())?);
    if feed.health_check().await {
        tracing::info!("✓ CoinGecko reachable ({})", config.coingecko.currency);
    } else {
        tracing::warn!("⚠ CoinGecko not reachable - prices will be reported as unavailable");
    }

    let analyzer = MarketAnalyzer::with_defaults(feed, provider);
    let app = create_router(AppState::new(analyzer), &config.server);

    let addr = &config.server.bind_addr;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 market analyst running on http://{}", addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /                - Front-end ({})", config.server.static_dir);
    tracing::info!("  GET  /health          - Health check");
    tracing::info!("  POST /analyze_market  - Run a market analysis");
    tracing::info!("Request body limit: {} bytes", config.server.max_body_bytes);
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
