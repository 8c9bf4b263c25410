//! Shared utilities for integration tests.

#![allow(dead_code)]

use futures_util::{SinkExt, StreamExt};
use node_liveness_probe::config::ProbeConfig;
use node_liveness_probe::http::HttpServer;
use node_liveness_probe::lifecycle::Shutdown;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_tungstenite::{accept_async, tungstenite::Message};

pub type Reply = Result<Value, (i64, String)>;

/// A mock Substrate node speaking JSON-RPC over WebSocket.
pub struct MockNode {
    pub addr: SocketAddr,
    connections: Arc<AtomicUsize>,
}

impl MockNode {
    pub fn url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// WebSocket connections accepted so far.
    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

/// Start a node that answers each call with `handler(method, params)`.
pub async fn start_mock_node<F>(handler: F) -> MockNode
where
    F: Fn(&str, &[Value]) -> Reply + Send + Sync + 'static,
{
    start_node(Some(Arc::new(handler))).await
}

/// Start a node that completes the handshake and never answers.
pub async fn start_silent_node() -> MockNode {
    start_node(None).await
}

type Handler = Arc<dyn Fn(&str, &[Value]) -> Reply + Send + Sync>;

async fn start_node(handler: Option<Handler>) -> MockNode {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let connections = Arc::new(AtomicUsize::new(0));
    let counter = connections.clone();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            let handler = handler.clone();
            tokio::spawn(async move {
                let Ok(mut ws) = accept_async(stream).await else {
                    return;
                };
                while let Some(Ok(message)) = ws.next().await {
                    let text = match message {
                        Message::Text(text) => text,
                        Message::Close(_) => break,
                        _ => continue,
                    };
                    let Some(handler) = &handler else {
                        continue;
                    };
                    let reply = answer(handler, text.as_str());
                    if ws.send(Message::Text(reply.into())).await.is_err() {
                        break;
                    }
                }
            });
        }
    });

    MockNode { addr, connections }
}

fn answer(handler: &Handler, request: &str) -> String {
    let request: Value = serde_json::from_str(request).unwrap();
    let method = request["method"].as_str().unwrap_or_default();
    let params = request["params"].as_array().cloned().unwrap_or_default();

    let reply = match handler(method, &params) {
        Ok(result) => json!({"jsonrpc": "2.0", "id": request["id"], "result": result}),
        Err((code, message)) => json!({
            "jsonrpc": "2.0",
            "id": request["id"],
            "error": {"code": code, "message": message},
        }),
    };
    reply.to_string()
}

/// A synced, peered node at the given heights.
pub fn healthy_node(best: i64, finalized: i64) -> impl Fn(&str, &[Value]) -> Reply + Send + Sync {
    node_with_health(false, 5, best, finalized)
}

pub fn node_with_health(
    is_syncing: bool,
    peers: u64,
    best: i64,
    finalized: i64,
) -> impl Fn(&str, &[Value]) -> Reply + Send + Sync {
    move |method: &str, params: &[Value]| match method {
        "system_health" => Ok(json!({
            "isSyncing": is_syncing,
            "peers": peers,
            "shouldHavePeers": true,
        })),
        "system_chain" => Ok(json!("Rococo Local Testnet")),
        "system_properties" => Ok(json!({"ss58Format": 42, "tokenSymbol": "ROC"})),
        "chain_getBlockHash" => Ok(json!("0xaa")),
        "chain_getFinalizedHead" => Ok(json!("0xff")),
        "chain_getBlock" => {
            let number = if params.first() == Some(&json!("0xff")) {
                finalized
            } else {
                best
            };
            Ok(json!({"block": {"header": {"number": format!("0x{:x}", number)}}}))
        }
        other => Err((-32601, format!("Method not found: {}", other))),
    }
}

/// A local address nothing listens on.
pub fn closed_port() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

/// Run the prober against `endpoints` and return its address.
pub async fn start_prober(endpoints: Vec<String>, tweak: impl FnOnce(&mut ProbeConfig)) -> (SocketAddr, Shutdown) {
    let mut config = ProbeConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.node.ws_endpoints = endpoints;
    tweak(&mut config);

    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config).unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Serve `body` with `status` at `/metrics`, like a node's Prometheus endpoint.
pub async fn start_metrics_endpoint(status: u16, body: &'static str) -> String {
    use axum::{http::StatusCode, routing::get, Router};

    let status = StatusCode::from_u16(status).unwrap();
    let app = Router::new().route("/metrics", get(move || async move { (status, body) }));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{}/metrics", addr)
}
