//! Configuration loading from disk and the environment.
//!
//! Order of precedence for tunables: environment overrides, then the TOML
//! file, then built-in defaults. Backend credentials only ever come from the
//! environment.

use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::config::schema::{BackendEndpoint, ServiceConfig, BACKEND_KEY_VAR, BACKEND_URL_VAR};
use crate::config::validation::{require_present, validate_config, ValidationError};

/// Optional path to a TOML file with tunables.
pub const CONFIG_PATH_VAR: &str = "SED_AGGREGATOR_CONFIG";
pub const DRAIN_TIMEOUT_VAR: &str = "SED_AGGREGATOR_DRAIN_TIMEOUT_SECS";
pub const REQUEST_TIMEOUT_VAR: &str = "SED_AGGREGATOR_REQUEST_TIMEOUT_SECS";
pub const LOG_FORMAT_VAR: &str = "SED_AGGREGATOR_LOG_FORMAT";
pub const METRICS_VAR: &str = "SED_AGGREGATOR_METRICS";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value {value:?} for {name}: {reason}")]
    Override {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Reads a variable from the process environment.
pub fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Load tunables from `path` (if any), apply environment overrides and validate.
pub fn load_config<F>(path: Option<&Path>, lookup: F) -> Result<ServiceConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => parse_file(path)?,
        None => ServiceConfig::default(),
    };

    apply_overrides(&mut config, &lookup)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Read the backend location and credential. Both are required.
pub fn read_backend_endpoint<F>(lookup: F) -> Result<BackendEndpoint, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let url = lookup(BACKEND_URL_VAR);
    let key = lookup(BACKEND_KEY_VAR);

    let errors: Vec<ValidationError> = [
        require_present(BACKEND_URL_VAR, url.as_deref()),
        require_present(BACKEND_KEY_VAR, key.as_deref()),
    ]
    .into_iter()
    .filter_map(Result::err)
    .collect();

    match (url, key) {
        (Some(url), Some(key)) if errors.is_empty() => {
            Ok(BackendEndpoint::new(url.trim(), key.trim()))
        }
        _ => Err(ConfigError::Validation(errors)),
    }
}

fn parse_file(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn apply_overrides<F>(config: &mut ServiceConfig, lookup: &F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(secs) = parse_override(DRAIN_TIMEOUT_VAR, lookup)? {
        config.timeouts.drain_secs = secs;
    }
    if let Some(secs) = parse_override(REQUEST_TIMEOUT_VAR, lookup)? {
        config.timeouts.request_secs = secs;
    }
    if let Some(format) = parse_override(LOG_FORMAT_VAR, lookup)? {
        config.observability.log_format = format;
    }
    if let Some(enabled) = parse_override(METRICS_VAR, lookup)? {
        config.observability.metrics_enabled = enabled;
    }
    Ok(())
}

fn parse_override<T, F>(name: &'static str, lookup: &F) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    trimmed
        .parse()
        .map(Some)
        .map_err(|e: T::Err| ConfigError::Override {
            name,
            value: raw.clone(),
            reason: e.to_string(),
        })
}
