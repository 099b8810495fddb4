//! Upload outcome accounting.

use std::fmt;

/// Counts for one uploader run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadReport {
    pub success: usize,
    pub failed: usize,
    pub total: usize,
}

impl UploadReport {
    pub fn record(&mut self, succeeded: bool) {
        self.total += 1;
        if succeeded {
            self.success += 1;
        } else {
            self.failed += 1;
        }
    }

    /// Percentage of successful uploads, `None` when nothing was attempted.
    pub fn success_rate(&self) -> Option<f64> {
        (self.total > 0).then(|| self.success as f64 / self.total as f64 * 100.0)
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

impl FromIterator<bool> for UploadReport {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let mut report = UploadReport::default();
        for outcome in iter {
            report.record(outcome);
        }
        report
    }
}

impl fmt::Display for UploadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Upload results")?;
        writeln!(f, "  succeeded: {} file(s)", self.success)?;
        writeln!(f, "  failed:    {} file(s)", self.failed)?;
        write!(f, "  total:     {} file(s)", self.total)?;
        if let Some(rate) = self.success_rate() {
            write!(f, "\n  success rate: {:.1}%", rate)?;
        }
        Ok(())
    }
}
