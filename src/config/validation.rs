//! Configuration validation.
//!
//! Serde handles syntax; this module checks meaning. Every problem is
//! reported at once rather than stopping at the first one.

use crate::config::schema::ServiceConfig;
use crate::health::policy::SUPERVISOR_PROBE;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("environment variable {0} is missing or empty")]
    MissingEnv(&'static str),

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error(
        "timeouts.drain_secs ({drain}s) must not exceed the health-check interval ({interval}s)"
    )]
    DrainExceedsProbeInterval { drain: u64, interval: u64 },
}

/// Validate the service tunables.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("request_secs"));
    }
    if config.timeouts.drain_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("drain_secs"));
    }

    let interval = SUPERVISOR_PROBE.interval.as_secs();
    if config.timeouts.drain_secs > interval {
        errors.push(ValidationError::DrainExceedsProbeInterval {
            drain: config.timeouts.drain_secs,
            interval,
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Whitespace-only values count as missing.
pub fn require_present(name: &'static str, value: Option<&str>) -> Result<(), ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(()),
        _ => Err(ValidationError::MissingEnv(name)),
    }
}
