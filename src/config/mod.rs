//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! optional TOML file (--config / SED_AGGREGATOR_CONFIG)
//!     → loader.rs (parse, apply SED_AGGREGATOR_* overrides)
//!     → validation.rs (semantic checks, all errors at once)
//!     → ServiceConfig (immutable)
//!
//! SUPABASE_URL / SUPABASE_KEY
//!     → loader.rs (presence check)
//!     → BackendEndpoint (immutable, shared via Arc with handlers)
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup; there is no reload
//! - Missing credentials are fatal (fail fast before binding)
//! - The listen port is a constant, not a setting

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{
    env_lookup, load_config, read_backend_endpoint, ConfigError, CONFIG_PATH_VAR,
};
pub use schema::{
    bind_address, BackendEndpoint, LogFormat, ObservabilityConfig, ServiceConfig, TimeoutConfig,
    LISTEN_PORT,
};
pub use validation::ValidationError;
