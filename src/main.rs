//! Wallet Scout API Server
//!
//! REST API for wallet eligibility analysis
//!
//! Usage:
//!   cargo run --bin wallet_scout
//!
//! Environment:
//!   EXPLORER_API_KEY   - Etherscan-compatible API key (or ETHERSCAN_API_KEY)
//!   EXPLORER_BASE_URL  - Explorer endpoint (default: https://api.etherscan.io/api)
//!   WALLET_SCOUT_PORT  - Server port (default: 8080, PORT takes precedence)
//!   WALLET_SCOUT_HOST  - Server host (default: 0.0.0.0)
//!   RUST_LOG           - Log filter (default: info)

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use wallet_scout::api::{create_router, AppState};
use wallet_scout::models::config::ServerConfig;
use wallet_scout::utils::constants::{APP_NAME, APP_VERSION};
use wallet_scout::{AnalyzerConfig, ExplorerClient, ExplorerConfig, WalletAnalyzer};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    info!("🔎 {} v{}", APP_NAME, APP_VERSION);

    let analyzer_config = AnalyzerConfig::from_env();
    let explorer = ExplorerClient::new(ExplorerConfig::from_env())?;
    let analyzer = Arc::new(WalletAnalyzer::new(explorer, analyzer_config.clone()));

    // Background sweep for cache and rate-limit windows
    let maintenance = analyzer.spawn_maintenance(analyzer_config.maintenance_interval);
    info!("🧹 Background maintenance task started");

    let state = Arc::new(AppState::new(analyzer.clone()));
    let app = create_router(state);

    let server = ServerConfig::from_env();
    let addr: SocketAddr = format!("{}:{}", server.host, server.port).parse()?;

    info!("🚀 Wallet Scout API starting on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /v1/analyze/:address - Wallet eligibility analysis");
    info!("  POST /v1/analyze          - Same, with {{\"address\": \"0x...\"}}");
    info!("  GET  /v1/stats            - Cache and analysis statistics");
    info!("  GET  /v1/health           - Health check");

    let listener = TcpListener::bind(addr).await?;

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("🛑 Shutdown signal received, cleaning up...");
    maintenance.abort();

    let stats = analyzer.telemetry().get_stats();
    info!("   Total analyzed: {}", stats.total_analyzed);
    info!("   Served from cache: {}", stats.total_cached);
    info!("👋 Wallet Scout API shutdown complete");

    Ok(())
}
