//! Protocol Scanner API Server
//!
//! Usage:
//!   cargo run --bin scanner_api
//!
//! Environment:
//!   SCANNER_PORT - Server port (default: 8080, `PORT` wins when set)
//!   SCANNER_HOST - Server host (default: 0.0.0.0)
//!   RUST_LOG     - Log filter (default: info)
//!   plus every `SCANNER_*` / collector variable read by `ScannerConfig`

use protocol_scanner::api::{create_router, start_cleanup_task, AppState};
use protocol_scanner::{Collectors, ScanTelemetry, Scanner, ScannerConfig};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = ScannerConfig::from_env()?;
    let collectors = Collectors::from_config(&config)?;
    let scanner = Scanner::new(collectors, &config);

    let telemetry = Arc::new(ScanTelemetry::new());
    let telemetry_for_shutdown = telemetry.clone();
    let state = Arc::new(AppState::new(scanner, &config, telemetry));

    start_cleanup_task();

    let app = create_router(state);

    let host = std::env::var("SCANNER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .or_else(|_| std::env::var("SCANNER_PORT"))
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("🚀 Protocol Scanner API starting on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /v1/scan     - Scan a protocol by name or contract address");
    info!("  GET  /v1/stats    - Scan statistics");
    info!("  GET  /v1/health   - Health check");

    let listener = TcpListener::bind(addr).await?;

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    let stats = telemetry_for_shutdown.snapshot();
    info!("🛑 Shutdown signal received");
    info!(
        "   Scans: {} completed, {} failed, {} timed out",
        stats.completed, stats.failed, stats.timed_out
    );
    info!("   Final stats (csv): {}", stats.to_csv_row().trim_end());

    Ok(())
}
