//! api-sed-aggregator
//!
//! Long-running service process for the SED aggregation API.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌───────────────────────────────────────────────┐
//!                     │              api-sed-aggregator               │
//!                     │                                               │
//!   Supervisor probe  │  ┌──────────┐    ┌──────────┐    ┌─────────┐  │
//!   ──────────────────┼─▶│   net    │───▶│   http   │───▶│ health  │  │
//!   GET /health       │  │ :8010    │    │  server  │    │ handlers│  │
//!                     │  └──────────┘    └──────────┘    └─────────┘  │
//!                     │                                               │
//!   SIGTERM/SIGINT    │  ┌─────────────────────────────────────────┐  │
//!   ──────────────────┼─▶│ lifecycle: startup / state / drain      │  │
//!                     │  └─────────────────────────────────────────┘  │
//!                     │  ┌──────────┐    ┌─────────────────────────┐  │
//!   SUPABASE_URL/KEY ─┼─▶│  config  │    │ observability: logs,    │  │
//!                     │  └──────────┘    │ metrics                 │  │
//!                     │                  └─────────────────────────┘  │
//!                     └───────────────────────────────────────────────┘
//! ```
//!
//! Exit status: 0 after a signal-requested stop, 1 on any fatal error.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use api_sed_aggregator::config::{self, LogFormat};
use api_sed_aggregator::http::DrainOutcome;
use api_sed_aggregator::lifecycle::run_until_signalled;
use api_sed_aggregator::observability::{init_logging, resolve_filter};

/// SED aggregation API service.
#[derive(Parser, Debug)]
#[command(name = "api-sed-aggregator", version, about)]
struct Args {
    /// Path to an optional TOML file with service tunables
    #[arg(short, long, env = config::CONFIG_PATH_VAR)]
    config: Option<PathBuf>,

    /// Log filter (e.g. "api_sed_aggregator=debug,tower_http=info")
    #[arg(short, long)]
    log_level: Option<String>,

    /// Log output format: pretty or json
    #[arg(long)]
    log_format: Option<LogFormat>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let service_config = match config::load_config(args.config.as_deref(), config::env_lookup) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("api-sed-aggregator: {e}");
            return ExitCode::FAILURE;
        }
    };

    let filter = resolve_filter(
        args.log_level,
        std::env::var("RUST_LOG").ok(),
        &service_config.observability.log_level,
    );
    let format = args
        .log_format
        .unwrap_or(service_config.observability.log_format);
    if let Err(e) = init_logging(&filter, format) {
        eprintln!("api-sed-aggregator: {e}");
        return ExitCode::FAILURE;
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = ?args.config,
        "api-sed-aggregator starting"
    );

    match run_until_signalled(service_config, config::env_lookup).await {
        Ok(DrainOutcome::Completed) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Ok(DrainOutcome::TimedOut { abandoned }) => {
            tracing::warn!(abandoned, "Shutdown complete after drain timeout");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Fatal error, exiting");
            ExitCode::FAILURE
        }
    }
}
