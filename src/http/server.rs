//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the three probe routes
//! - Wire up middleware (request ID, tracing, no-store caching header)
//! - Map each route to a probe strategy and run it through the orchestrator
//! - Serve until the shutdown signal fires

use axum::{
    extract::{RawQuery, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::Response,
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use url::Url;

use crate::config::ProbeConfig;
use crate::health::{
    BlockTracker, LivenessBlockProbe, LivenessProbe, NodeMetricsProbe, Orchestrator, Outcome,
    Probe, ReadinessProbe,
};
use crate::http::request::{MakeRequestUuidV4, ProbeQuery, X_REQUEST_ID};
use crate::http::response::{self, NO_STORE};
use crate::observability::metrics;
use crate::rpc::session::EndpointError;
use crate::rpc::{Connector, WsConnector};

pub const HEALTHZ: &str = "/healthz";
pub const HEALTHZ_BLOCK: &str = "/healthz_block";
pub const READINESS: &str = "/readiness";

/// Errors building the server from configuration.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Endpoint(#[from] EndpointError),

    #[error("invalid node metrics endpoint {input:?}: {source}")]
    NodeMetricsEndpoint {
        input: String,
        #[source]
        source: url::ParseError,
    },
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub liveness: Arc<LivenessProbe>,
    pub liveness_block: Arc<LivenessBlockProbe>,
    pub readiness: Arc<ReadinessProbe>,
    pub node_metrics: Option<Arc<NodeMetricsProbe>>,
}

impl AppState {
    /// Build the probe strategies for `config`, dialing through `connector`.
    pub fn from_config(
        config: &ProbeConfig,
        connector: Arc<dyn Connector>,
    ) -> Result<Self, ServerError> {
        let endpoints = config.node.endpoints()?;

        let node_metrics = match &config.node_metrics.endpoint {
            Some(input) => {
                let url = Url::parse(input).map_err(|source| ServerError::NodeMetricsEndpoint {
                    input: input.clone(),
                    source,
                })?;
                let threshold = Duration::from_secs(config.node_metrics.finalized_threshold_secs);
                Some(Arc::new(NodeMetricsProbe::new(url, threshold)))
            }
            None => None,
        };

        Ok(Self {
            orchestrator: Arc::new(Orchestrator::new(endpoints, connector)),
            liveness: Arc::new(LivenessProbe::new()),
            liveness_block: Arc::new(LivenessBlockProbe::new(
                Arc::new(BlockTracker::new()),
                config.block.threshold(),
            )),
            readiness: Arc::new(ReadinessProbe::new()),
            node_metrics,
        })
    }
}

/// HTTP server exposing the health probes.
pub struct HttpServer {
    router: Router,
    config: ProbeConfig,
}

impl HttpServer {
    /// Create a server that dials nodes over WebSocket.
    pub fn new(config: ProbeConfig) -> Result<Self, ServerError> {
        let state = AppState::from_config(&config, Arc::new(WsConnector))?;
        Ok(Self::with_state(config, state))
    }

    pub fn with_state(config: ProbeConfig, state: AppState) -> Self {
        Self {
            router: Self::build_router(state),
            config,
        }
    }

    /// Build the Axum router with all middleware layers.
    pub fn build_router(state: AppState) -> Router {
        Router::new()
            .route(HEALTHZ, get(healthz))
            .route(HEALTHZ_BLOCK, get(healthz_block))
            .route(READINESS, get(readiness))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(SetResponseHeaderLayer::overriding(
                        header::CACHE_CONTROL,
                        HeaderValue::from_static(NO_STORE),
                    )),
            )
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            endpoints = ?self.config.node.ws_endpoints,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn healthz(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Response {
    let query = ProbeQuery::from_raw(query.as_deref());
    serve_probe(HEALTHZ, state.liveness.as_ref(), &state, &query, &headers, None).await
}

async fn healthz_block(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Response {
    let query = ProbeQuery::from_raw(query.as_deref());
    serve_probe(
        HEALTHZ_BLOCK,
        state.liveness_block.as_ref(),
        &state,
        &query,
        &headers,
        state.node_metrics.as_deref(),
    )
    .await
}

async fn readiness(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Response {
    let query = ProbeQuery::from_raw(query.as_deref());
    serve_probe(READINESS, state.readiness.as_ref(), &state, &query, &headers, None).await
}

/// Shared handler body: parse the timeout, run the probe, render the status.
async fn serve_probe(
    route: &'static str,
    probe: &dyn Probe,
    state: &AppState,
    query: &ProbeQuery,
    headers: &HeaderMap,
    node_metrics: Option<&NodeMetricsProbe>,
) -> Response {
    let started = Instant::now();
    let request_id = headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    tracing::debug!(
        request_id = %request_id,
        route,
        probe = probe.name(),
        user_agent,
        "Received probe request"
    );

    let status = match query.timeout() {
        Err(e) => {
            tracing::error!(request_id = %request_id, route, error = %e, "Rejected probe request");
            e.status_code()
        }
        Ok(timeout) => {
            let mut outcome = state.orchestrator.run(probe, timeout).await;
            if let (true, Some(node_metrics)) = (outcome.is_healthy(), node_metrics) {
                outcome = Outcome::from(node_metrics.check(timeout).await);
            }
            log_failure(request_id, route, &outcome);
            outcome.status()
        }
    };

    tracing::info!(
        request_id = %request_id,
        route,
        status = status.as_u16(),
        elapsed = ?started.elapsed(),
        "Probe {} returning {}",
        route,
        status.as_u16()
    );
    metrics::record_probe(route, status.as_u16(), started);
    response::render(status)
}

fn log_failure(request_id: &str, route: &'static str, outcome: &Outcome) {
    let Some(e) = outcome.error() else {
        return;
    };
    if outcome.status() == StatusCode::SERVICE_UNAVAILABLE {
        tracing::warn!(request_id = %request_id, route, error = %e, "Probe failed");
    } else {
        tracing::error!(request_id = %request_id, route, error = %e, "Probe failed");
    }
}
