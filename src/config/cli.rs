//! Command-line flags.
//!
//! Flags override values from the optional `--config` file; the merged
//! result is validated once.

use clap::Parser;
use std::path::PathBuf;

use crate::config::loader::{read_config, ConfigError};
use crate::config::schema::ProbeConfig;
use crate::config::validation::validate_config;

#[derive(Debug, Parser)]
#[command(name = "node-liveness-probe")]
#[command(version, about = "Liveness and readiness probes for a Substrate node's WebSocket RPC", long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Listen address for the health endpoints
    #[arg(long, value_name = "ADDR")]
    pub listen: Option<String>,

    /// Node WebSocket endpoint; repeat to probe a relay chain and parachain sequentially
    #[arg(long = "ws-endpoint", value_name = "URL")]
    pub ws_endpoints: Vec<String>,

    /// /healthz_block fails if the latest block is older than this
    #[arg(long = "block-threshold-seconds", value_name = "SECS")]
    pub block_threshold_secs: Option<u64>,

    /// Node Prometheus endpoint checked after /healthz_block passes
    #[arg(long, value_name = "URL")]
    pub node_metrics_endpoint: Option<String>,

    /// Maximum age of the finalized height reported by the node metrics
    #[arg(long = "node-metrics-threshold-seconds", value_name = "SECS")]
    pub node_metrics_threshold_secs: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Expose the prober's own Prometheus metrics on this address
    #[arg(long, value_name = "ADDR")]
    pub metrics_address: Option<String>,
}

impl Cli {
    /// Build the effective configuration: file (or defaults), then flags.
    pub fn load(&self) -> Result<ProbeConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => ProbeConfig::default(),
        };
        self.apply(&mut config);
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }

    fn apply(&self, config: &mut ProbeConfig) {
        if let Some(listen) = &self.listen {
            config.listener.bind_address = listen.clone();
        }
        if !self.ws_endpoints.is_empty() {
            config.node.ws_endpoints = self.ws_endpoints.clone();
        }
        if let Some(secs) = self.block_threshold_secs {
            config.block.threshold_secs = secs;
        }
        if let Some(endpoint) = &self.node_metrics_endpoint {
            config.node_metrics.endpoint = Some(endpoint.clone());
        }
        if let Some(secs) = self.node_metrics_threshold_secs {
            config.node_metrics.finalized_threshold_secs = secs;
        }
        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        }
        if let Some(addr) = &self.metrics_address {
            config.observability.metrics_enabled = true;
            config.observability.metrics_address = addr.clone();
        }
    }
}
