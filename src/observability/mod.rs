//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured tracing events, pretty or JSON)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (collected by the container runtime)
//!     → GET /metrics (Prometheus scrape, same port as the service)
//! ```
//!
//! # Design Decisions
//! - The request ID is attached to every request span
//! - Route labels come from the matched route, never the raw URI
//! - The backend key is never logged

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, resolve_filter, LoggingError};
