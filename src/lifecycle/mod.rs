//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Read credentials → Install metrics → Bind listener → Ready
//!
//! Shutdown (shutdown.rs):
//!     Trigger → Stop accepting → Drain (bounded) → Stopped
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → shutdown trigger
//!
//! State (state.rs):
//!     Stopped → Starting → Ready → Draining → Stopped
//!     Starting → Failed, Ready → Crashed
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, listener last
//! - Shutdown has a timeout: the drain never hangs indefinitely
//! - Exit status follows the final state; restarts belong to the supervisor

pub mod shutdown;
pub mod signals;
pub mod startup;
pub mod state;

pub use shutdown::{Shutdown, ShutdownReason};
pub use startup::{run_until_signalled, Service, StartupError};
pub use state::{Lifecycle, LifecycleError, ProcessState};
