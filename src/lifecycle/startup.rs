//! Startup orchestration.
//!
//! # Responsibilities
//! - Announce the build version
//! - Start the metrics exporter when enabled
//! - Build the probe server and bind its listener
//! - Serve until SIGINT/SIGTERM
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Configuration arrives already validated

use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{render_config, ProbeConfig};
use crate::http::server::{HttpServer, ServerError};
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid metrics address {0:?}")]
    MetricsAddress(String),

    #[error("failed to start metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error(transparent)]
    Server(#[from] ServerError),

    #[error("failed to listen on {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Run the prober until a shutdown signal arrives.
pub async fn run(config: ProbeConfig) -> Result<(), StartupError> {
    tracing::info!(
        version = VERSION,
        bind_address = %config.listener.bind_address,
        endpoints = ?config.node.ws_endpoints,
        block_threshold_secs = config.block.threshold_secs,
        node_metrics = ?config.node_metrics.endpoint,
        "node-liveness-probe v{} starting",
        VERSION
    );

    match render_config(&config) {
        Ok(rendered) => tracing::debug!(config = %rendered, "Effective configuration"),
        Err(e) => tracing::warn!(error = %e, "Cannot render effective configuration"),
    }

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| StartupError::MetricsAddress(config.observability.metrics_address.clone()))?;
        metrics::init_metrics(addr)?;
    }

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    serve(config, shutdown).await
}

/// Bind the listener and serve until `shutdown` fires.
pub async fn serve(config: ProbeConfig, shutdown: Shutdown) -> Result<(), StartupError> {
    let address = config.listener.bind_address.clone();
    let server = HttpServer::new(config)?;

    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address, source })?;
    tracing::info!(address = ?listener.local_addr().ok(), "Listening for probe requests");

    server
        .run(listener, shutdown.subscribe())
        .await
        .map_err(StartupError::Serve)?;

    tracing::info!("Shutdown complete");
    Ok(())
}
