//! Node RPC subsystem.
//!
//! # Data Flow
//! ```text
//! Endpoint (ws:// or wss:// URL)
//!     → session.rs (WebSocket dial, handshake timeout, I/O deadline)
//!     → exchange.rs (encode call, write one frame, read one reply, decode)
//!     → types.rs (JSON-RPC envelope, typed results, error taxonomy)
//! ```
//!
//! # Design Decisions
//! - One session per endpoint per probe; sessions are never pooled
//! - Transport failures and RPC-level failures stay distinct types
//! - No retries at this layer

pub mod exchange;
pub mod methods;
pub mod session;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use exchange::{RpcCall, RpcExchange};
pub use session::{Connector, Endpoint, Session, WsConnector};
pub use types::{ProtocolError, RpcError, TransportError};
