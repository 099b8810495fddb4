//! Multipart upload of summary files.

use std::path::PathBuf;
use std::time::Duration;

use futures_util::stream::{self, StreamExt};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use url::Url;

use crate::upload::discovery::{self, SummaryFile, SUMMARY_FILE};
use crate::upload::report::UploadReport;

pub const DEFAULT_UPLOAD_URL: &str = "https://api.hey-watch.me/upload/analysis/sed-summary";
pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Uploads running at once during a batch.
pub const MAX_CONCURRENT_UPLOADS: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("failed to scan {}: {source}", base_dir.display())]
    Discovery {
        base_dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("upload rejected with HTTP {status}: {body}")]
    Rejected { status: StatusCode, body: String },
}

/// Which summaries a run should upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadTarget {
    All,
    One { device_id: String, date: String },
}

pub struct SummaryUploader {
    client: reqwest::Client,
    upload_url: Url,
    base_dir: PathBuf,
}

impl SummaryUploader {
    pub fn new(upload_url: Url, base_dir: PathBuf, verify_tls: bool) -> Result<Self, UploadError> {
        let client = reqwest::Client::builder()
            .timeout(UPLOAD_TIMEOUT)
            .danger_accept_invalid_certs(!verify_tls)
            .build()
            .map_err(UploadError::Client)?;

        Ok(Self {
            client,
            upload_url,
            base_dir,
        })
    }

    /// POST one summary file.
    pub async fn upload_file(&self, file: &SummaryFile) -> Result<(), UploadError> {
        let content = tokio::fs::read_to_string(&file.path)
            .await
            .map_err(|source| UploadError::Read {
                path: file.path.clone(),
                source,
            })?;

        let form = Form::new()
            .part(
                "file",
                Part::text(content)
                    .file_name(SUMMARY_FILE)
                    .mime_str("application/json")?,
            )
            .text("device_id", file.device_id.clone())
            .text("date", file.date.clone());

        let response = self
            .client
            .post(self.upload_url.clone())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::OK {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(UploadError::Rejected { status, body })
    }

    async fn upload_logged(&self, file: &SummaryFile) -> bool {
        tracing::info!(device_id = %file.device_id, date = %file.date, "Upload started");
        match self.upload_file(file).await {
            Ok(()) => {
                tracing::info!(device_id = %file.device_id, date = %file.date, "Upload succeeded");
                true
            }
            Err(e) => {
                tracing::error!(
                    device_id = %file.device_id,
                    date = %file.date,
                    error = %e,
                    "Upload failed"
                );
                false
            }
        }
    }

    /// Upload every summary under the base directory.
    ///
    /// Individual failures are counted, never propagated.
    pub async fn upload_all(&self) -> Result<UploadReport, UploadError> {
        let files =
            discovery::find_all(&self.base_dir).map_err(|source| UploadError::Discovery {
                base_dir: self.base_dir.clone(),
                source,
            })?;

        if files.is_empty() {
            tracing::warn!("No summary files to upload");
            return Ok(UploadReport::default());
        }

        let report: UploadReport = stream::iter(files.iter())
            .map(|file| self.upload_logged(file))
            .buffer_unordered(MAX_CONCURRENT_UPLOADS)
            .collect::<Vec<bool>>()
            .await
            .into_iter()
            .collect();

        Ok(report)
    }

    /// Upload the summary for one device and day.
    pub async fn upload_one(&self, device_id: &str, date: &str) -> UploadReport {
        let mut report = UploadReport::default();
        match discovery::find_one(&self.base_dir, device_id, date) {
            Some(file) => report.record(self.upload_logged(&file).await),
            None => {
                tracing::error!(%device_id, %date, "No summary file to upload");
                report.record(false);
            }
        }
        report
    }

    pub async fn run(&self, target: &UploadTarget) -> Result<UploadReport, UploadError> {
        tracing::info!(url = %self.upload_url, base_dir = %self.base_dir.display(), "Summary upload starting");
        match target {
            UploadTarget::All => self.upload_all().await,
            UploadTarget::One { device_id, date } => Ok(self.upload_one(device_id, date).await),
        }
    }
}
