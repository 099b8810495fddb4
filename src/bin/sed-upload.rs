use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use url::Url;

use api_sed_aggregator::config::LogFormat;
use api_sed_aggregator::observability::{init_logging, resolve_filter};
use api_sed_aggregator::upload::{is_valid_date, SummaryUploader, UploadTarget, DEFAULT_UPLOAD_URL};

#[derive(Parser)]
#[command(name = "sed-upload")]
#[command(about = "Upload SED summary files to the analysis API", long_about = None)]
struct Cli {
    /// Upload only this device (requires --date)
    #[arg(long, requires = "date")]
    device_id: Option<String>,

    /// Upload only this day, YYYY-MM-DD (requires --device-id)
    #[arg(long, requires = "device_id", value_parser = parse_date)]
    date: Option<String>,

    /// Upload endpoint
    #[arg(long, default_value = DEFAULT_UPLOAD_URL)]
    upload_url: Url,

    /// Directory holding <device_id>/<date>/sed-summary/result.json
    #[arg(long, default_value = "./data/data_accounts")]
    base_dir: PathBuf,

    /// Skip TLS certificate verification
    #[arg(long)]
    insecure: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

const DEFAULT_FILTER: &str = "api_sed_aggregator=info,sed_upload=info";
const VERBOSE_FILTER: &str = "api_sed_aggregator=debug,sed_upload=debug";

/// `-v` takes precedence over `RUST_LOG`.
fn verbose_filter(verbose: bool) -> Option<String> {
    verbose.then(|| VERBOSE_FILTER.to_string())
}

fn parse_date(value: &str) -> Result<String, String> {
    if is_valid_date(value) {
        Ok(value.to_string())
    } else {
        Err(format!("{value:?} is not a YYYY-MM-DD date"))
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = resolve_filter(
        verbose_filter(cli.verbose),
        std::env::var("RUST_LOG").ok(),
        DEFAULT_FILTER,
    );
    if let Err(e) = init_logging(&filter, LogFormat::Pretty) {
        eprintln!("sed-upload: {e}");
        return ExitCode::FAILURE;
    }

    let target = match (cli.device_id, cli.date) {
        (Some(device_id), Some(date)) => UploadTarget::One { device_id, date },
        _ => UploadTarget::All,
    };

    let uploader = match SummaryUploader::new(cli.upload_url, cli.base_dir, !cli.insecure) {
        Ok(u) => u,
        Err(e) => {
            eprintln!("sed-upload: {e}");
            return ExitCode::FAILURE;
        }
    };

    let report = match uploader.run(&target).await {
        Ok(report) => report,
        Err(e) => {
            eprintln!("sed-upload: {e}");
            return ExitCode::FAILURE;
        }
    };

    println!("\n{report}");
    if report.is_empty() {
        println!("\nNothing to upload");
        ExitCode::SUCCESS
    } else if report.failed == 0 {
        println!("\nUpload complete");
        ExitCode::SUCCESS
    } else {
        println!("\nSome uploads failed");
        ExitCode::FAILURE
    }
}
