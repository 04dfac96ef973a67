//! # Tribunal Server
//!
//! Standalone binary serving the callback endpoints and consuming the local
//! hearing-update queue.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin tribunal-server
//!
//! # Specific environment and bind address
//! TRIBUNAL_ENV=production TRIBUNAL__WEB__BIND_ADDRESS=0.0.0.0:4000 cargo run --bin tribunal-server
//! ```

use anyhow::Context;
use tokio::signal;
use tracing::{error, info};

use tribunal_core::bootstrap::TribunalSystem;
use tribunal_core::config::ConfigManager;
use tribunal_core::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_manager = ConfigManager::load().context("failed to load configuration")?;
    logging::init_logging(config_manager.config().logging.json_file);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config_manager.environment(),
        build_mode = if cfg!(debug_assertions) { "debug" } else { "release" },
        "Starting tribunal server"
    );

    let bind_address = config_manager.config().web.bind_address.clone();
    let system = TribunalSystem::bootstrap(config_manager).context("failed to bootstrap")?;
    let ingestor = system.start_ingestor();

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {bind_address}"))?;
    info!(address = %bind_address, "Callback API listening");

    axum::serve(listener, system.router())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("HTTP server stopped, draining hearing ingestor");
    if let Err(e) = ingestor.shutdown().await {
        error!(error = %e, "Hearing ingestor did not stop cleanly");
    }

    info!("Tribunal server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
