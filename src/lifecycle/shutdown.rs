//! Shutdown coordination.

use std::fmt;

use tokio::sync::broadcast;

/// Why shutdown was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// SIGINT / Ctrl+C.
    Interrupt,
    /// SIGTERM from the supervisor.
    Terminate,
    /// Requested in-process (tests, embedding).
    Requested,
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownReason::Interrupt => f.write_str("SIGINT"),
            ShutdownReason::Terminate => f.write_str("SIGTERM"),
            ShutdownReason::Requested => f.write_str("requested"),
        }
    }
}

/// Coordinator for graceful shutdown.
///
/// Long-running tasks subscribe before the trigger fires; a receiver created
/// afterwards will not see it.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<ShutdownReason>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ShutdownReason> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self, reason: ShutdownReason) {
        let delivered = self.tx.send(reason).unwrap_or(0);
        tracing::debug!(%reason, subscribers = delivered, "Shutdown triggered");
    }

    /// Number of tasks still listening.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for a shutdown trigger. A dropped coordinator counts as a request.
pub async fn wait_for_shutdown(rx: &mut broadcast::Receiver<ShutdownReason>) -> ShutdownReason {
    match rx.recv().await {
        Ok(reason) => reason,
        Err(broadcast::error::RecvError::Lagged(_)) | Err(broadcast::error::RecvError::Closed) => {
            ShutdownReason::Requested
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_reason() {
        let shutdown = Shutdown::new();
        let mut a = shutdown.subscribe();
        let mut b = shutdown.subscribe();
        assert_eq!(shutdown.receiver_count(), 2);

        shutdown.trigger(ShutdownReason::Terminate);
        assert_eq!(wait_for_shutdown(&mut a).await, ShutdownReason::Terminate);
        assert_eq!(wait_for_shutdown(&mut b).await, ShutdownReason::Terminate);
    }

    #[tokio::test]
    async fn dropped_coordinator_requests_shutdown() {
        let shutdown = Shutdown::new();
        let mut rx = shutdown.subscribe();
        drop(shutdown);
        assert_eq!(wait_for_shutdown(&mut rx).await, ShutdownReason::Requested);
    }

    #[test]
    fn trigger_without_subscribers_is_harmless() {
        Shutdown::new().trigger(ShutdownReason::Requested);
    }
}
