//! Startup orchestration.
//!
//! # Responsibilities
//! - Read the backend credentials
//! - Install the metrics recorder
//! - Bind the listener
//! - Hand over to the HTTP server and record the outcome in the state machine
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal and moves the process to `Failed`
//! - No internal retry; restarting is the supervisor's job
//! - The process is `Ready` only once the listener is bound and serving

use std::net::SocketAddr;

use axum::Router;
use metrics_exporter_prometheus::BuildError;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::config::{bind_address, read_backend_endpoint, ConfigError, ServiceConfig};
use crate::health::SUPERVISOR_PROBE;
use crate::http::{AppState, DrainOutcome, HttpServer, ServerError};
use crate::lifecycle::shutdown::{Shutdown, ShutdownReason};
use crate::lifecycle::signals::{self, TerminationSignals};
use crate::lifecycle::state::{Lifecycle, LifecycleError, ProcessState};
use crate::net::{self, ListenerError};
use crate::observability::metrics;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("failed to install metrics recorder: {0}")]
    Metrics(#[from] BuildError),

    #[error("failed to install signal handlers: {0}")]
    Signals(#[source] std::io::Error),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Server(#[from] ServerError),
}

/// A bound, not yet serving, service.
pub struct Service {
    lifecycle: Lifecycle,
    listener: TcpListener,
    server: HttpServer,
}

impl Service {
    /// Read credentials and bind `address`.
    ///
    /// On error the lifecycle ends in `Failed` and nothing is listening.
    pub async fn launch<F>(
        config: ServiceConfig,
        address: SocketAddr,
        lookup: F,
    ) -> Result<Self, StartupError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lifecycle = Lifecycle::new();
        lifecycle.transition(ProcessState::Starting)?;

        match Self::prepare(config, address, lookup, lifecycle.clone()).await {
            Ok(service) => Ok(service),
            Err(e) => {
                if let Err(t) = lifecycle.transition(ProcessState::Failed) {
                    tracing::warn!(error = %t, "Could not record startup failure");
                }
                Err(e)
            }
        }
    }

    async fn prepare<F>(
        config: ServiceConfig,
        address: SocketAddr,
        lookup: F,
        lifecycle: Lifecycle,
    ) -> Result<Self, StartupError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = read_backend_endpoint(lookup)?;
        tracing::info!(backend_configured = true, "Backend endpoint configured");

        let metrics_handle = if config.observability.metrics_enabled {
            Some(metrics::install_recorder()?)
        } else {
            None
        };

        let listener = net::bind(address).await?;
        let server = HttpServer::new(config, backend, lifecycle.clone(), metrics_handle);

        Ok(Self {
            lifecycle,
            listener,
            server,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    pub fn state(&self) -> &AppState {
        self.server.state()
    }

    /// Add routes served alongside the operational endpoints.
    pub fn merge(mut self, routes: Router<AppState>) -> Self {
        self.server = self.server.merge(routes);
        self
    }

    /// Serve until `shutdown` fires, then drain and stop.
    pub async fn run(
        self,
        shutdown: broadcast::Receiver<ShutdownReason>,
    ) -> Result<DrainOutcome, StartupError> {
        let Self {
            lifecycle,
            listener,
            server,
        } = self;

        if let Some(handle) = server.state().metrics.clone() {
            metrics::spawn_upkeep(handle, shutdown.resubscribe());
        }

        lifecycle.transition(ProcessState::Ready)?;

        match server.run(listener, shutdown).await {
            Ok(outcome) => {
                lifecycle.transition(ProcessState::Stopped)?;
                Ok(outcome)
            }
            Err(e) => {
                if lifecycle.state() == ProcessState::Ready {
                    lifecycle.transition(ProcessState::Crashed)?;
                }
                Err(e.into())
            }
        }
    }
}

/// Launch on the fixed service address and serve until SIGTERM/SIGINT.
pub async fn run_until_signalled<F>(
    config: ServiceConfig,
    lookup: F,
) -> Result<DrainOutcome, StartupError>
where
    F: Fn(&str) -> Option<String>,
{
    tracing::info!(
        probe_interval_secs = SUPERVISOR_PROBE.interval.as_secs(),
        probe_timeout_secs = SUPERVISOR_PROBE.timeout.as_secs(),
        probe_retries = SUPERVISOR_PROBE.retries,
        start_period_secs = SUPERVISOR_PROBE.start_period.as_secs(),
        unhealthy_after_secs = SUPERVISOR_PROBE.worst_case_detection().as_secs(),
        drain_timeout_secs = config.timeouts.drain_secs,
        "Starting service"
    );

    let service = Service::launch(config, bind_address(), lookup).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let termination = TerminationSignals::install().map_err(StartupError::Signals)?;
    signals::forward_to(termination, shutdown);

    service.run(server_shutdown).await
}
