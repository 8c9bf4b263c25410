//! Probe failure taxonomy and its mapping to HTTP status codes.

use axum::http::StatusCode;
use std::time::Duration;
use thiserror::Error;

use crate::health::node_metrics::NodeMetricsError;
use crate::health::tracker::Slot;
use crate::rpc::{ProtocolError, RpcError, TransportError};

/// Why a node is not fit for traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NotReady {
    #[error("node is syncing")]
    Syncing,

    #[error("node has no peers")]
    NoPeers,
}

/// Errors that fail a probe.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The prober has nothing to probe.
    #[error("no node endpoints configured")]
    NoEndpoints,

    /// The session could not be opened; no RPC was attempted.
    #[error("dial {endpoint}: {source}")]
    Dial {
        endpoint: String,
        #[source]
        source: TransportError,
    },

    /// An RPC exchange failed at the transport or protocol level.
    #[error(transparent)]
    Rpc(#[from] RpcError),

    /// A tracked block has not changed for longer than the threshold.
    #[error(
        "the {slot} block #{number} last changed {elapsed:.2?} ago (threshold {threshold:?})"
    )]
    Stale {
        slot: Slot,
        number: i64,
        elapsed: Duration,
        threshold: Duration,
    },

    #[error("node is not ready: {0}")]
    NotReady(#[from] NotReady),

    #[error("node metrics: {0}")]
    NodeMetrics(#[from] NodeMetricsError),
}

impl From<ProtocolError> for ProbeError {
    fn from(e: ProtocolError) -> Self {
        ProbeError::Rpc(RpcError::Protocol(e))
    }
}

impl ProbeError {
    /// HTTP status reported for this failure.
    ///
    /// Configuration problems are 500; anything the node did or failed to
    /// do, including being unreachable, is 503.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProbeError::NoEndpoints => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}
