//! Configuration schema definitions.
//!
//! All sections have defaults, so an empty file (or no file at all) yields
//! a prober for a local node on `ws://127.0.0.1:9944`.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::rpc::session::{Endpoint, EndpointError};

/// Root configuration for the prober.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProbeConfig {
    /// HTTP listener for the health endpoints.
    pub listener: ListenerConfig,

    /// Node endpoints to probe.
    pub node: NodeConfig,

    /// `/healthz_block` staleness settings.
    pub block: BlockCheckConfig,

    /// Optional Prometheus scrape of the node itself.
    pub node_metrics: NodeMetricsConfig,

    /// Logging and metrics export.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:49944").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:49944".to_string(),
        }
    }
}

/// Node endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NodeConfig {
    /// WebSocket endpoints, probed in order. List a relay chain node and
    /// its parachain collator to check both as one unit.
    pub ws_endpoints: Vec<String>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            ws_endpoints: vec!["ws://127.0.0.1:9944".to_string()],
        }
    }
}

impl NodeConfig {
    /// Parse the configured endpoints in order.
    pub fn endpoints(&self) -> Result<Vec<Endpoint>, EndpointError> {
        self.ws_endpoints.iter().map(|e| e.parse()).collect()
    }
}

/// Block progress check configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BlockCheckConfig {
    /// `/healthz_block` fails when the best or finalized block has not
    /// changed for longer than this many seconds.
    pub threshold_secs: u64,
}

impl Default for BlockCheckConfig {
    fn default() -> Self {
        Self {
            threshold_secs: 300,
        }
    }
}

impl BlockCheckConfig {
    pub fn threshold(&self) -> Duration {
        Duration::from_secs(self.threshold_secs)
    }
}

/// Node Prometheus endpoint check, run after `/healthz_block` passes.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NodeMetricsConfig {
    /// Node metrics URL (e.g., "http://127.0.0.1:9615/metrics"). Disabled when unset.
    pub endpoint: Option<String>,

    /// Maximum age of the finalized height reported by the node.
    pub finalized_threshold_secs: u64,
}

impl Default for NodeMetricsConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            finalized_threshold_secs: 300,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the prober's own Prometheus endpoint.
    pub metrics_enabled: bool,

    /// Prometheus endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ProbeConfig::default();
        assert_eq!(config.listener.bind_address, "0.0.0.0:49944");
        assert_eq!(config.node.ws_endpoints, vec!["ws://127.0.0.1:9944"]);
        assert_eq!(config.block.threshold(), Duration::from_secs(300));
        assert!(config.node_metrics.endpoint.is_none());
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: ProbeConfig = toml::from_str(
            r#"
            [node]
            ws_endpoints = ["ws://relay:9944", "ws://para:9945"]

            [block]
            threshold_secs = 120
            "#,
        )
        .unwrap();

        assert_eq!(config.node.endpoints().unwrap().len(), 2);
        assert_eq!(config.block.threshold_secs, 120);
        assert_eq!(config.listener.bind_address, "0.0.0.0:49944");
        assert_eq!(config.observability.log_level, "info");
    }
}
