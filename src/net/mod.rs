//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! config::bind_address() (0.0.0.0:8010)
//!     → listener.rs (bind; failure is fatal)
//!     → TcpListener handed to the HTTP server
//! ```

pub mod listener;

pub use listener::{bind, ListenerError};
