//! Structured logging.
//!
//! Filter priority: command line, then `RUST_LOG`, then the configured
//! default. Output is either the pretty fmt layer or one JSON object per line.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogFormat;

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("failed to install global subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Pick the active filter directive.
pub fn resolve_filter(cli: Option<String>, env: Option<String>, configured: &str) -> String {
    cli.filter(|f| !f.trim().is_empty())
        .or_else(|| env.filter(|f| !f.trim().is_empty()))
        .unwrap_or_else(|| configured.to_string())
}

/// Install the global tracing subscriber.
pub fn init_logging(filter: &str, format: LogFormat) -> Result<(), LoggingError> {
    let filter = EnvFilter::try_new(filter)?;
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init()?,
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .try_init()?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_wins() {
        let filter = resolve_filter(
            Some("debug".into()),
            Some("warn".into()),
            "info",
        );
        assert_eq!(filter, "debug");
    }

    #[test]
    fn env_beats_config() {
        assert_eq!(resolve_filter(None, Some("warn".into()), "info"), "warn");
    }

    #[test]
    fn blank_values_fall_through() {
        assert_eq!(
            resolve_filter(Some(" ".into()), Some(String::new()), "info"),
            "info"
        );
    }

    #[test]
    fn bad_filter_is_reported() {
        let err = init_logging("api_sed_aggregator=loud", LogFormat::Pretty).unwrap_err();
        assert!(matches!(err, LoggingError::Filter(_)));
    }
}
