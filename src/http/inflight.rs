//! In-flight request tracking.
//!
//! # Responsibilities
//! - Count requests currently inside a handler
//! - Report that count during drain and as a gauge
//! - Record per-route request metrics
//!
//! The count is a single atomic; requests never contend on a lock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};

use crate::http::server::AppState;
use crate::observability::metrics;

/// Tracks requests currently being handled.
#[derive(Debug, Clone, Default)]
pub struct InFlightTracker {
    active: Arc<AtomicU64>,
}

impl InFlightTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new request. The returned guard decrements on drop, including
    /// when the handler panics.
    pub fn track(&self) -> InFlightGuard {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        metrics::set_in_flight(now);
        InFlightGuard {
            active: Arc::clone(&self.active),
        }
    }

    pub fn count(&self) -> u64 {
        self.active.load(Ordering::SeqCst)
    }
}

/// Guard held for the lifetime of one request.
#[derive(Debug)]
pub struct InFlightGuard {
    active: Arc<AtomicU64>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let now = self.active.fetch_sub(1, Ordering::SeqCst) - 1;
        metrics::set_in_flight(now);
    }
}

/// Route middleware: tracks the request and records its outcome.
pub async fn track_request(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let _guard = state.inflight.track();
    let start = Instant::now();
    let method = request.method().clone();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());

    let response = next.run(request).await;

    metrics::record_request(method.as_str(), &route, response.status().as_u16(), start);
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracker_counts() {
        let tracker = InFlightTracker::new();
        assert_eq!(tracker.count(), 0);

        let a = tracker.track();
        let b = tracker.clone().track();
        assert_eq!(tracker.count(), 2);

        drop(a);
        assert_eq!(tracker.count(), 1);
        drop(b);
        assert_eq!(tracker.count(), 0);
    }

    #[test]
    fn guard_released_on_panic() {
        let tracker = InFlightTracker::new();
        let inner = tracker.clone();

        let result = std::panic::catch_unwind(move || {
            let _guard = inner.track();
            panic!("handler blew up");
        });

        assert!(result.is_err());
        assert_eq!(tracker.count(), 0);
    }
}
