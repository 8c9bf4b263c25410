//! node-liveness-probe
//!
//! A sidecar that turns Kubernetes HTTP probes into JSON-RPC health checks
//! against a Substrate node.
//!
//! # Architecture Overview
//!
//! ```text
//!   kubelet                ┌───────────────────────────────────────────┐
//!   GET /healthz ──────────┼─▶ http ──▶ health::Orchestrator          │
//!   GET /healthz_block     │               │  per endpoint, in order │
//!   GET /readiness         │               ▼                         │
//!                          │            rpc::Session ──── WebSocket ─┼──▶ node(s)
//!   200 / 503 / 500 ◀──────┼── http ◀── Outcome                      │
//!                          │                                         │
//!                          │  config · observability · lifecycle     │
//!                          └─────────────────────────────────────────┘
//! ```

use clap::Parser;

use node_liveness_probe::config::Cli;
use node_liveness_probe::lifecycle::startup;
use node_liveness_probe::observability::logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.load()?;

    logging::init_logging(&config.observability.log_level);

    if let Err(e) = startup::run(config).await {
        tracing::error!(error = %e, "Fatal error");
        return Err(e.into());
    }
    Ok(())
}
