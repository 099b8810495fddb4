//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (assign x-request-id)
//!     → inflight.rs (count in-flight, record metrics)
//!     → health handlers (/health, /ready) or /metrics
//!     → response (x-request-id echoed)
//! ```

pub mod inflight;
pub mod request;
pub mod server;

pub use inflight::InFlightTracker;
pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::{AppState, DrainOutcome, HttpServer, ServerError};
