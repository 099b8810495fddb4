//! SED summary upload client.
//!
//! # Data Flow
//! ```text
//! <base>/<device>/<YYYY-MM-DD>/sed-summary/result.json
//!     → discovery.rs (walk and filter)
//!     → uploader.rs (multipart POST, bounded concurrency, 60s timeout)
//!     → report.rs (success / failed / total)
//! ```
//!
//! # Design Decisions
//! - One failed file never aborts the batch
//! - Runs as the separate `sed-upload` binary; the service never calls it

pub mod discovery;
pub mod report;
pub mod uploader;

pub use discovery::{find_all, find_one, is_valid_date, SummaryFile};
pub use report::UploadReport;
pub use uploader::{SummaryUploader, UploadError, UploadTarget, DEFAULT_UPLOAD_URL};
