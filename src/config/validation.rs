//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, endpoint URLs and thresholds
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProbeConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::ProbeConfig;
use crate::rpc::session::Endpoint;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a socket address")]
    BindAddress(String),

    #[error("node.ws_endpoints must list at least one endpoint")]
    NoEndpoints,

    #[error("node.ws_endpoints: {0}")]
    Endpoint(String),

    #[error("block.threshold_secs must be greater than zero")]
    BlockThreshold,

    #[error("node_metrics.endpoint {0:?} must be an http or https URL")]
    NodeMetricsEndpoint(String),

    #[error("node_metrics.finalized_threshold_secs must be greater than zero")]
    NodeMetricsThreshold,

    #[error("observability.log_level {0:?} is not one of trace, debug, info, warn, error")]
    LogLevel(String),

    #[error("observability.metrics_address {0:?} is not a socket address")]
    MetricsAddress(String),
}

pub fn validate_config(config: &ProbeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.node.ws_endpoints.is_empty() {
        errors.push(ValidationError::NoEndpoints);
    }
    for endpoint in &config.node.ws_endpoints {
        if let Err(e) = endpoint.parse::<Endpoint>() {
            errors.push(ValidationError::Endpoint(e.to_string()));
        }
    }

    if config.block.threshold_secs == 0 {
        errors.push(ValidationError::BlockThreshold);
    }

    if let Some(endpoint) = &config.node_metrics.endpoint {
        let is_http = Url::parse(endpoint)
            .map(|url| matches!(url.scheme(), "http" | "https"))
            .unwrap_or(false);
        if !is_http {
            errors.push(ValidationError::NodeMetricsEndpoint(endpoint.clone()));
        }
        if config.node_metrics.finalized_threshold_secs == 0 {
            errors.push(ValidationError::NodeMetricsThreshold);
        }
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::LogLevel(config.observability.log_level.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
