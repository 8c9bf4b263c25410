//! JSON-RPC wire types and error definitions.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Failures of the WebSocket transport itself.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Handshake did not complete within the allowed time.
    #[error("handshake timed out after {0:?}")]
    HandshakeTimeout(Duration),

    /// Underlying WebSocket or socket error.
    #[error("websocket: {0}")]
    WebSocket(#[from] tungstenite::Error),

    /// Read or write did not complete before the session deadline.
    #[error("i/o deadline exceeded")]
    DeadlineExceeded,

    /// Peer closed the connection before replying.
    #[error("connection closed by peer")]
    Closed,

    /// A reply frame was not valid UTF-8 text.
    #[error("non-text frame of {0} bytes")]
    NonText(usize),
}

/// The node answered, but not with something usable.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The method ran on the node and returned an RPC error object.
    #[error("RPC {method} error {code}: {message}")]
    Rpc {
        method: &'static str,
        code: i64,
        message: String,
    },

    /// The request could not be serialized.
    #[error("RPC {method}: cannot encode request: {source}")]
    Encode {
        method: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The reply was not a JSON-RPC envelope or the result had the wrong shape.
    #[error("RPC {method}: malformed response: {source}")]
    Decode {
        method: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The reply carried neither a result nor an error.
    #[error("RPC {method}: empty result")]
    EmptyResult { method: &'static str },

    /// The reply was for a different request.
    #[error("RPC {method}: response id {actual} does not match request id {expected}")]
    IdMismatch {
        method: &'static str,
        expected: u64,
        actual: Value,
    },

    /// A block number could not be parsed into a signed 64-bit integer.
    #[error("invalid block number {0}")]
    BlockNumber(Value),
}

/// Error returned by a single RPC exchange.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Outgoing JSON-RPC 2.0 request.
#[derive(Debug, Serialize)]
pub struct RequestEnvelope<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: &'a [Value],
}

/// Incoming JSON-RPC 2.0 response, result left undecoded.
#[derive(Debug, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<ErrorObject>,
}

/// JSON-RPC error object.
#[derive(Debug, Deserialize)]
pub struct ErrorObject {
    pub code: i64,
    pub message: String,
}

/// Result of `system_health`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SystemHealth {
    pub is_syncing: bool,
    pub peers: u64,
    #[serde(default)]
    pub should_have_peers: bool,
}

/// Result of `chain_getBlock`, reduced to what the probes read.
#[derive(Debug, Clone, Deserialize)]
pub struct SignedBlock {
    pub block: BlockBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlockBody {
    pub header: Header,
}

/// Block header; the number stays raw until the tracker parses it.
#[derive(Debug, Clone, Deserialize)]
pub struct Header {
    pub number: Value,
}
