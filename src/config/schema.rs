//! Configuration schema definitions.
//!
//! Tunables deserialize from an optional TOML file. The listen address and
//! the backend credentials are deliberately absent from the file: the port is
//! fixed by the deployment contract and the credentials come from the
//! environment.

use std::fmt;
use std::net::{Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Port the service is published on.
pub const LISTEN_PORT: u16 = 8010;

/// Address the service binds to: all interfaces, fixed port.
pub fn bind_address() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, LISTEN_PORT))
}

/// Environment variable holding the backend location.
pub const BACKEND_URL_VAR: &str = "SUPABASE_URL";

/// Environment variable holding the backend credential.
pub const BACKEND_KEY_VAR: &str = "SUPABASE_KEY";

/// Root configuration for the service tunables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Timeout configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Per-request timeout in seconds.
    pub request_secs: u64,

    /// Upper bound on the graceful drain after a termination signal, in seconds.
    pub drain_secs: u64,
}

impl TimeoutConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_secs(self.drain_secs)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            // Matches the supervisor's per-probe timeout.
            request_secs: 10,
            // Below Docker's default 10s stop grace period.
            drain_secs: 8,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default log filter, used when neither the CLI nor `RUST_LOG` set one.
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Install the Prometheus recorder and serve `/metrics`.
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "api_sed_aggregator=info,tower_http=info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: true,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output for local development.
    #[default]
    Pretty,
    /// One JSON object per line, for log aggregation.
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log format {0:?} (expected \"pretty\" or \"json\")")]
pub struct ParseLogFormatError(String);

impl FromStr for LogFormat {
    type Err = ParseLogFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(ParseLogFormatError(s.to_string())),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Pretty => f.write_str("pretty"),
            LogFormat::Json => f.write_str("json"),
        }
    }
}

/// Location and credential of the external data backend.
///
/// Built once at startup and shared read-only with every handler. Neither
/// field is ever logged; `Debug` redacts both.
#[derive(Clone, PartialEq, Eq)]
pub struct BackendEndpoint {
    url: String,
    key: String,
}

impl BackendEndpoint {
    pub fn new(url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            key: key.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Debug for BackendEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendEndpoint")
            .field("url", &"<redacted>")
            .field("key", &"<redacted>")
            .finish()
    }
}
