//! HTTP server setup and drain.
//!
//! # Responsibilities
//! - Create the Axum router with the operational endpoints
//! - Wire up middleware (request ID, tracing, timeout, panic isolation)
//! - Serve on an already-bound listener
//! - On shutdown: stop accepting, drain in-flight requests, give up after
//!   the drain timeout

use std::any::Any;
use std::future::IntoFuture;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, oneshot};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{BackendEndpoint, ServiceConfig};
use crate::health;
use crate::http::inflight::{track_request, InFlightTracker};
use crate::http::request::{request_id, UuidRequestId, X_REQUEST_ID};
use crate::lifecycle::shutdown::{wait_for_shutdown, ShutdownReason};
use crate::lifecycle::{Lifecycle, LifecycleError, ProcessState};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<BackendEndpoint>,
    pub lifecycle: Lifecycle,
    pub inflight: InFlightTracker,
    pub metrics: Option<PrometheusHandle>,
}

/// Server error.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("server stopped without a shutdown request")]
    UnexpectedExit,

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

/// How the drain phase ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Every in-flight request finished.
    Completed,
    /// The drain timeout elapsed with requests still running.
    TimedOut { abandoned: u64 },
}

/// HTTP server for the service.
pub struct HttpServer {
    config: ServiceConfig,
    state: AppState,
    extra_routes: Router<AppState>,
}

impl HttpServer {
    pub fn new(
        config: ServiceConfig,
        backend: BackendEndpoint,
        lifecycle: Lifecycle,
        metrics: Option<PrometheusHandle>,
    ) -> Self {
        let state = AppState {
            backend: Arc::new(backend),
            lifecycle,
            inflight: InFlightTracker::new(),
            metrics,
        };

        Self {
            config,
            state,
            extra_routes: Router::new(),
        }
    }

    /// Add routes served alongside the operational endpoints.
    pub fn merge(mut self, routes: Router<AppState>) -> Self {
        self.extra_routes = self.extra_routes.merge(routes);
        self
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Build the Axum router with all middleware layers.
    pub fn router(&self) -> Router {
        build_router(&self.config, self.state.clone(), self.extra_routes.clone())
    }

    /// Serve on `listener` until a shutdown trigger arrives, then drain.
    ///
    /// The caller owns the `Starting → Ready` transition; this moves the
    /// process to `Draining` once the trigger fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<ShutdownReason>,
    ) -> Result<DrainOutcome, ServerError> {
        let addr = listener.local_addr()?;
        let drain_timeout = self.config.timeouts.drain_timeout();
        let lifecycle = self.state.lifecycle.clone();
        let inflight = self.state.inflight.clone();
        let app = self.router();

        tracing::info!(address = %addr, "HTTP server starting");

        let (drain_tx, drain_rx) = oneshot::channel::<()>();
        let serve = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = drain_rx.await;
            })
            .into_future();
        tokio::pin!(serve);

        let reason = tokio::select! {
            result = &mut serve => {
                result?;
                return Err(ServerError::UnexpectedExit);
            }
            reason = wait_for_shutdown(&mut shutdown) => reason,
        };

        lifecycle.transition(ProcessState::Draining)?;
        tracing::info!(
            %reason,
            in_flight = inflight.count(),
            drain_timeout_secs = drain_timeout.as_secs(),
            "Draining connections"
        );
        let _ = drain_tx.send(());

        match tokio::time::timeout(drain_timeout, serve).await {
            Ok(result) => {
                result?;
                tracing::info!("HTTP server stopped");
                Ok(DrainOutcome::Completed)
            }
            Err(_) => {
                let abandoned = inflight.count();
                tracing::warn!(
                    abandoned,
                    drain_timeout_secs = drain_timeout.as_secs(),
                    "Drain timeout elapsed, abandoning in-flight requests"
                );
                Ok(DrainOutcome::TimedOut { abandoned })
            }
        }
    }
}

#[allow(deprecated)]
fn build_router(config: &ServiceConfig, state: AppState, extra: Router<AppState>) -> Router {
    let mut routes = Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready));
    if state.metrics.is_some() {
        routes = routes.route("/metrics", get(render_metrics));
    }

    routes
        .merge(extra)
        .route_layer(middleware::from_fn_with_state(state.clone(), track_request))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId))
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = request_id(request).unwrap_or("-"),
                    )
                }))
                .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
                .layer(TimeoutLayer::new(config.timeouts.request_timeout()))
                .layer(CatchPanicLayer::custom(panic_response)),
        )
}

async fn render_metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// A panicking handler fails only its own request.
fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = %detail, "Request handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": "internal server error" })),
    )
        .into_response()
}
