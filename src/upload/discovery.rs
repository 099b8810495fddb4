//! Summary file discovery.
//!
//! Layout: `<base>/<device_id>/<YYYY-MM-DD>/sed-summary/result.json`.
//! Entries that are not directories, and date directories whose name is not
//! a calendar date, are skipped.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

pub const SUMMARY_DIR: &str = "sed-summary";
pub const SUMMARY_FILE: &str = "result.json";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One summary file on disk.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SummaryFile {
    pub device_id: String,
    pub date: String,
    pub path: PathBuf,
}

pub fn is_valid_date(date: &str) -> bool {
    NaiveDate::parse_from_str(date, DATE_FORMAT).is_ok()
}

pub fn summary_path(base_dir: &Path, device_id: &str, date: &str) -> PathBuf {
    base_dir
        .join(device_id)
        .join(date)
        .join(SUMMARY_DIR)
        .join(SUMMARY_FILE)
}

/// Every summary file under `base_dir`, sorted by device then date.
///
/// A missing base directory yields an empty list.
pub fn find_all(base_dir: &Path) -> io::Result<Vec<SummaryFile>> {
    let mut found = Vec::new();

    if !base_dir.is_dir() {
        tracing::warn!(base_dir = %base_dir.display(), "Base directory does not exist");
        return Ok(found);
    }

    for device in fs::read_dir(base_dir)? {
        let device = device?;
        if !device.file_type()?.is_dir() {
            continue;
        }
        let device_id = device.file_name().to_string_lossy().into_owned();

        for day in fs::read_dir(device.path())? {
            let day = day?;
            if !day.file_type()?.is_dir() {
                continue;
            }
            let date = day.file_name().to_string_lossy().into_owned();
            if !is_valid_date(&date) {
                continue;
            }

            let path = day.path().join(SUMMARY_DIR).join(SUMMARY_FILE);
            if path.is_file() {
                tracing::debug!(%device_id, %date, path = %path.display(), "Found summary");
                found.push(SummaryFile {
                    device_id: device_id.clone(),
                    date,
                    path,
                });
            }
        }
    }

    found.sort();
    tracing::info!(count = found.len(), "Summary files discovered");
    Ok(found)
}

/// The summary for one device and day, if it exists.
pub fn find_one(base_dir: &Path, device_id: &str, date: &str) -> Option<SummaryFile> {
    let path = summary_path(base_dir, device_id, date);
    if path.is_file() {
        Some(SummaryFile {
            device_id: device_id.to_string(),
            date: date.to_string(),
            path,
        })
    } else {
        tracing::warn!(path = %path.display(), "Summary file does not exist");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_summary(base: &Path, device: &str, date: &str) -> PathBuf {
        let path = summary_path(base, device, date);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, r#"{"summary":[]}"#).unwrap();
        path
    }

    #[test]
    fn date_validation() {
        assert!(is_valid_date("2025-07-01"));
        assert!(!is_valid_date("2025-13-01"));
        assert!(!is_valid_date("2025-02-30"));
        assert!(!is_valid_date("notes"));
    }

    #[test]
    fn finds_summaries_and_skips_noise() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path();

        write_summary(base, "device-b", "2025-07-02");
        write_summary(base, "device-a", "2025-07-01");
        write_summary(base, "device-a", "backup");
        fs::create_dir_all(base.join("device-a").join("2025-07-03")).unwrap();
        fs::write(base.join("README.txt"), "not a device").unwrap();
        fs::write(base.join("device-a").join("2025-07-04"), "not a dir").unwrap();

        let found = find_all(base).unwrap();
        let keys: Vec<_> = found
            .iter()
            .map(|f| (f.device_id.as_str(), f.date.as_str()))
            .collect();
        assert_eq!(keys, vec![("device-a", "2025-07-01"), ("device-b", "2025-07-02")]);
    }

    #[test]
    fn missing_base_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let found = find_all(&dir.path().join("absent")).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn find_one_requires_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_summary(dir.path(), "dev", "2025-01-15");

        let hit = find_one(dir.path(), "dev", "2025-01-15").unwrap();
        assert_eq!(hit.path, path);
        assert!(find_one(dir.path(), "dev", "2025-01-16").is_none());
    }
}
