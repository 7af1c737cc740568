//! Operator Console (vigil-ui) - Main entry point
//!
//! Presents the state of the VIGIL content-moderation pipeline to an
//! operator: background analysis jobs and their per-source danger
//! assessments, kept fresh by polling the analysis backend.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};

use vigil_ui::backend::BackendClient;
use vigil_ui::config::{Args, ConsoleConfig};
use vigil_ui::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vigil_ui=debug,tower_http=info".into()),
        )
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting VIGIL Operator Console (vigil-ui) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();
    let config = ConsoleConfig::resolve(&args)?;
    info!(
        backend = %config.backend_url,
        poll_interval_ms = config.poll_interval_ms,
        "Configuration resolved"
    );

    let backend = Arc::new(
        BackendClient::new(&config.backend_url).context("Failed to create backend client")?,
    );

    // Probe the backend once at startup. Unreachable is not fatal: polls
    // self-heal once the backend comes up.
    match backend.health().await {
        Ok(()) => info!("✓ Analysis backend reachable"),
        Err(e) => warn!(error = %e, "Analysis backend not reachable yet; continuing"),
    }

    let state = AppState::new(backend);
    Arc::clone(&state.monitor).start(Duration::from_millis(config.poll_interval_ms));

    let app = build_router(state.clone());

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("vigil-ui listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Tear down the polling timer; any in-flight poll completion is a no-op
    state.monitor.stop();

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
