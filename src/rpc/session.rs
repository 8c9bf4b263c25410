//! WebSocket transport sessions.
//!
//! # Responsibilities
//! - Dial one node endpoint with a handshake timeout
//! - Bound every read and write by an absolute deadline
//! - Release the socket on close (idempotent) or drop
//!
//! # Design Decisions
//! - The deadline is absolute and set by the caller once per HTTP request,
//!   so every endpoint probed in that request draws from the same budget
//! - Control frames (ping/pong) are skipped while waiting for a reply
//! - `Connector` and `Session` are traits so the probe engine can run over
//!   in-memory sessions in tests

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::time::{timeout, timeout_at, Instant};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use url::Url;

use crate::rpc::types::TransportError;

/// Upper bound on the close handshake so a dead peer cannot hold a response.
const CLOSE_TIMEOUT: Duration = Duration::from_millis(250);

/// A node WebSocket endpoint (`ws://` or `wss://`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint(Url);

/// Error parsing an endpoint URL.
#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("invalid endpoint URL {input:?}: {source}")]
    Parse {
        input: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported endpoint scheme {0:?}, expected ws or wss")]
    Scheme(String),
}

impl Endpoint {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl FromStr for Endpoint {
    type Err = EndpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let url = Url::parse(s).map_err(|source| EndpointError::Parse {
            input: s.to_string(),
            source,
        })?;
        match url.scheme() {
            "ws" | "wss" => Ok(Self(url)),
            other => Err(EndpointError::Scheme(other.to_string())),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// An open, single-use connection to one node.
#[async_trait]
pub trait Session: Send {
    /// Set the absolute deadline for all subsequent reads and writes.
    fn set_deadline(&mut self, deadline: Instant);

    /// Write one text message.
    async fn send_text(&mut self, text: String) -> Result<(), TransportError>;

    /// Read the next data message as text.
    async fn recv_text(&mut self) -> Result<String, TransportError>;

    /// Close the connection. Safe to call more than once.
    async fn close(&mut self);
}

/// Opens sessions to endpoints.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn open(
        &self,
        endpoint: &Endpoint,
        handshake_timeout: Duration,
    ) -> Result<Box<dyn Session>, TransportError>;
}

/// Dials real WebSocket connections with tokio-tungstenite.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

#[async_trait]
impl Connector for WsConnector {
    async fn open(
        &self,
        endpoint: &Endpoint,
        handshake_timeout: Duration,
    ) -> Result<Box<dyn Session>, TransportError> {
        tracing::debug!(
            endpoint = %endpoint,
            handshake_timeout = ?handshake_timeout,
            "Dialing node"
        );

        let (stream, _response) = timeout(handshake_timeout, connect_async(endpoint.as_str()))
            .await
            .map_err(|_| TransportError::HandshakeTimeout(handshake_timeout))??;

        Ok(Box::new(WsSession::new(stream)))
    }
}

/// A session over a tokio-tungstenite stream.
pub struct WsSession {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    deadline: Option<Instant>,
    closed: bool,
}

impl WsSession {
    pub fn new(stream: WebSocketStream<MaybeTlsStream<TcpStream>>) -> Self {
        Self {
            stream,
            deadline: None,
            closed: false,
        }
    }
}

async fn within<F, T>(deadline: Option<Instant>, fut: F) -> Result<T, TransportError>
where
    F: Future<Output = T>,
{
    match deadline {
        Some(deadline) => timeout_at(deadline, fut)
            .await
            .map_err(|_| TransportError::DeadlineExceeded),
        None => Ok(fut.await),
    }
}

#[async_trait]
impl Session for WsSession {
    fn set_deadline(&mut self, deadline: Instant) {
        self.deadline = Some(deadline);
    }

    async fn send_text(&mut self, text: String) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        within(self.deadline, self.stream.send(Message::text(text))).await??;
        Ok(())
    }

    async fn recv_text(&mut self) -> Result<String, TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        let deadline = self.deadline;
        loop {
            match within(deadline, self.stream.next()).await? {
                None | Some(Ok(Message::Close(_))) => return Err(TransportError::Closed),
                Some(Err(e)) => return Err(e.into()),
                Some(Ok(Message::Text(text))) => return Ok(text.as_str().to_owned()),
                Some(Ok(Message::Binary(data))) => {
                    return String::from_utf8(data.to_vec())
                        .map_err(|_| TransportError::NonText(data.len()));
                }
                // ping, pong, raw frames
                Some(Ok(_)) => continue,
            }
        }
    }

    async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Ok(Err(e)) = timeout(CLOSE_TIMEOUT, self.stream.close(None)).await {
            tracing::trace!(error = %e, "Close handshake failed");
        }
    }
}
