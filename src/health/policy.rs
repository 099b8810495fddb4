//! The supervisor's probe policy.
//!
//! These values belong to the orchestrator, not to this process. They are
//! recorded here so startup can log them and validation can keep the drain
//! window inside a single probe interval.

use std::time::Duration;

/// How the supervisor probes `GET /health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbePolicy {
    /// Time between probes.
    pub interval: Duration,
    /// Per-probe timeout.
    pub timeout: Duration,
    /// Consecutive failures before the process is marked unhealthy.
    pub retries: u32,
    /// Grace period after start during which failures do not count.
    pub start_period: Duration,
}

impl ProbePolicy {
    /// Earliest point after start at which the supervisor can declare the
    /// process unhealthy if the probe never succeeds.
    pub fn worst_case_detection(&self) -> Duration {
        self.start_period + self.interval * self.retries
    }
}

/// Policy declared for the service in its deployment descriptor.
pub const SUPERVISOR_PROBE: ProbePolicy = ProbePolicy {
    interval: Duration::from_secs(30),
    timeout: Duration::from_secs(10),
    retries: 3,
    start_period: Duration::from_secs(40),
};
