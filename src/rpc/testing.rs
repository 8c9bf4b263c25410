//! In-memory sessions and connectors for unit tests.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

use crate::rpc::session::{Connector, Endpoint, Session};
use crate::rpc::types::TransportError;

/// What a scripted node answers: a result, or an RPC error `(code, message)`.
pub(crate) type Reply = Result<Value, (i64, String)>;

type Handler = Arc<dyn Fn(&str, &[Value]) -> Reply + Send + Sync>;

/// A session whose replies are computed by a closure over `(method, params)`.
///
/// Each reply takes `latency` to arrive and reads honour the deadline, so
/// paused-clock tests can exhaust a request budget.
pub(crate) struct ScriptedSession {
    handler: Handler,
    latency: Duration,
    deadline: Option<Instant>,
    pending: VecDeque<String>,
    requests: Vec<(u64, String)>,
    read_failure: Option<Box<dyn Fn() -> TransportError + Send>>,
    deadlines: Arc<Mutex<Vec<Instant>>>,
    closes: Arc<AtomicUsize>,
}

impl ScriptedSession {
    pub(crate) fn new<F>(handler: F) -> Self
    where
        F: Fn(&str, &[Value]) -> Reply + Send + Sync + 'static,
    {
        Self {
            handler: Arc::new(handler),
            latency: Duration::ZERO,
            deadline: None,
            pending: VecDeque::new(),
            requests: Vec::new(),
            read_failure: None,
            deadlines: Arc::default(),
            closes: Arc::default(),
        }
    }

    /// Make every read fail with the produced error.
    pub(crate) fn fail_reads_with<F>(&mut self, f: F)
    where
        F: Fn() -> TransportError + Send + 'static,
    {
        self.read_failure = Some(Box::new(f));
    }

    pub(crate) fn methods(&self) -> Vec<String> {
        self.requests.iter().map(|(_, m)| m.clone()).collect()
    }

    pub(crate) fn ids(&self) -> Vec<u64> {
        self.requests.iter().map(|(id, _)| *id).collect()
    }
}

#[async_trait]
impl Session for ScriptedSession {
    fn set_deadline(&mut self, deadline: Instant) {
        self.deadline = Some(deadline);
        self.deadlines.lock().unwrap().push(deadline);
    }

    async fn send_text(&mut self, text: String) -> Result<(), TransportError> {
        let request: Value = serde_json::from_str(&text).expect("request is JSON");
        let id = request["id"].as_u64().expect("request has numeric id");
        let method = request["method"].as_str().expect("request has method").to_string();
        let params = request["params"].as_array().cloned().unwrap_or_default();

        let reply = match (self.handler)(&method, &params) {
            Ok(result) => json!({"jsonrpc": "2.0", "id": id, "result": result}),
            Err((code, message)) => {
                json!({"jsonrpc": "2.0", "id": id, "error": {"code": code, "message": message}})
            }
        };
        self.requests.push((id, method));
        self.pending.push_back(reply.to_string());
        Ok(())
    }

    async fn recv_text(&mut self) -> Result<String, TransportError> {
        if let Some(fail) = &self.read_failure {
            return Err(fail());
        }
        if !self.latency.is_zero() {
            let ready_at = Instant::now() + self.latency;
            match self.deadline {
                Some(deadline) if deadline < ready_at => {
                    tokio::time::sleep_until(deadline).await;
                    return Err(TransportError::DeadlineExceeded);
                }
                _ => tokio::time::sleep_until(ready_at).await,
            }
        }
        self.pending.pop_front().ok_or(TransportError::Closed)
    }

    async fn close(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// A connector over a fixed table of scripted nodes.
///
/// Endpoints not in the table fail to dial.
#[derive(Default)]
pub(crate) struct ScriptedConnector {
    nodes: HashMap<String, (Handler, Duration)>,
    dials: Mutex<Vec<String>>,
    handshake_timeouts: Mutex<Vec<Duration>>,
    deadlines: Arc<Mutex<Vec<Instant>>>,
    closes: Arc<AtomicUsize>,
}

impl ScriptedConnector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn node<F>(self, endpoint: &str, handler: F) -> Self
    where
        F: Fn(&str, &[Value]) -> Reply + Send + Sync + 'static,
    {
        self.slow_node(endpoint, Duration::ZERO, handler)
    }

    /// A node whose every reply takes `latency`.
    pub(crate) fn slow_node<F>(mut self, endpoint: &str, latency: Duration, handler: F) -> Self
    where
        F: Fn(&str, &[Value]) -> Reply + Send + Sync + 'static,
    {
        let key = endpoint
            .parse::<Endpoint>()
            .expect("scripted endpoint is a ws URL")
            .to_string();
        self.nodes.insert(key, (Arc::new(handler), latency));
        self
    }

    /// Handshake timeout passed to each dial, in order.
    pub(crate) fn handshake_timeouts(&self) -> Vec<Duration> {
        self.handshake_timeouts.lock().unwrap().clone()
    }

    /// Deadline set on each opened session, in order.
    pub(crate) fn deadlines(&self) -> Vec<Instant> {
        self.deadlines.lock().unwrap().clone()
    }

    /// Endpoints dialed so far, in order, including failed dials.
    pub(crate) fn dials(&self) -> Vec<String> {
        self.dials.lock().unwrap().clone()
    }

    pub(crate) fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn open(
        &self,
        endpoint: &Endpoint,
        handshake_timeout: Duration,
    ) -> Result<Box<dyn Session>, TransportError> {
        self.dials.lock().unwrap().push(endpoint.to_string());
        self.handshake_timeouts.lock().unwrap().push(handshake_timeout);
        let (handler, latency) = self
            .nodes
            .get(endpoint.as_str())
            .ok_or(TransportError::Closed)?;
        Ok(Box::new(ScriptedSession {
            handler: handler.clone(),
            latency: *latency,
            deadline: None,
            pending: VecDeque::new(),
            requests: Vec::new(),
            read_failure: None,
            deadlines: self.deadlines.clone(),
            closes: self.closes.clone(),
        }))
    }
}

/// A node that answers every liveness call and reports the given heights.
pub(crate) fn healthy_node(
    best: i64,
    finalized: i64,
) -> impl Fn(&str, &[Value]) -> Reply + Send + Sync + 'static {
    move |method: &str, params: &[Value]| match method {
        "system_health" => Ok(json!({"isSyncing": false, "peers": 3, "shouldHavePeers": true})),
        "system_chain" => Ok(json!("Development")),
        "system_properties" => Ok(json!({"ss58Format": 42, "tokenDecimals": 12})),
        "chain_getBlockHash" => Ok(json!("0x01")),
        "chain_getFinalizedHead" => Ok(json!("0xf1")),
        "chain_getBlock" => {
            let number = if params.first() == Some(&json!("0xf1")) {
                finalized
            } else {
                best
            };
            Ok(json!({"block": {"header": {"number": format!("0x{:x}", number)}, "extrinsics": []}}))
        }
        other => Err((-32601, format!("Method not found: {}", other))),
    }
}
