//! OS signal handling.
//!
//! Handlers are installed eagerly so a failure surfaces as a startup error
//! instead of a process that can never be stopped cleanly.

use tokio::task::JoinHandle;

use crate::lifecycle::shutdown::{Shutdown, ShutdownReason};

/// Installed SIGINT/SIGTERM handlers.
pub struct TerminationSignals {
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
}

impl TerminationSignals {
    #[cfg(unix)]
    pub fn install() -> std::io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    #[cfg(not(unix))]
    pub fn install() -> std::io::Result<Self> {
        Ok(Self {})
    }

    /// Wait for the next termination signal.
    #[cfg(unix)]
    pub async fn recv(&mut self) -> ShutdownReason {
        tokio::select! {
            _ = self.interrupt.recv() => ShutdownReason::Interrupt,
            _ = self.terminate.recv() => ShutdownReason::Terminate,
        }
    }

    #[cfg(not(unix))]
    pub async fn recv(&mut self) -> ShutdownReason {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Ctrl+C handler failed; waiting indefinitely");
            std::future::pending::<()>().await;
        }
        ShutdownReason::Interrupt
    }
}

/// Forward the first termination signal to the shutdown coordinator.
pub fn forward_to(mut signals: TerminationSignals, shutdown: Shutdown) -> JoinHandle<()> {
    tokio::spawn(async move {
        let reason = signals.recv().await;
        tracing::info!(signal = %reason, "Termination signal received, initiating graceful shutdown");
        shutdown.trigger(reason);
    })
}
