//! Health reporting subsystem.
//!
//! # Data Flow
//! ```text
//! Supervisor probe (every 30s, 10s timeout)
//!     → GET /health → liveness.rs (stateless, always 200 while serving)
//!
//! Load balancer / operator
//!     → GET /ready → readiness.rs (reads lifecycle state)
//! ```
//!
//! # Design Decisions
//! - Liveness never probes the backend; backend trouble must not trigger restarts
//! - Readiness is a separate signal so drain can be observed without failing liveness
//! - policy.rs mirrors the supervisor's settings; the process never enforces them

pub mod liveness;
pub mod policy;
pub mod readiness;

pub use liveness::health;
pub use policy::{ProbePolicy, SUPERVISOR_PROBE};
pub use readiness::ready;
