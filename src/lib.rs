//! api-sed-aggregator: operational shell of the SED aggregation API.

pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod upload;

pub use config::{BackendEndpoint, ServiceConfig};
pub use http::HttpServer;
pub use lifecycle::{Lifecycle, ProcessState, Service, Shutdown};
