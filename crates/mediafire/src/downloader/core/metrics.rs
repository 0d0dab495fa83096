//! Counters and summaries for batch downloads

use std::sync::atomic::{AtomicU64, Ordering};

use crate::downloader::core::{DownloadOutcome, DownloadStatus};

/// Performance metrics for downloads
///
/// Atomic counters so concurrent workers can record without locking.
#[derive(Debug, Default)]
pub struct DownloadMetrics {
    pub files_started: AtomicU64,
    pub files_succeeded: AtomicU64,
    pub link_failures: AtomicU64,
    pub transfer_failures: AtomicU64,
    pub total_bytes: AtomicU64,
    pub retries_attempted: AtomicU64,
}

impl DownloadMetrics {
    pub fn record_started(&self) {
        self.files_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_retry(&self) {
        self.retries_attempted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the terminal outcome of one file
    pub fn record_outcome(&self, outcome: &DownloadOutcome) {
        self.total_bytes.fetch_add(outcome.bytes_written, Ordering::Relaxed);
        let counter = match outcome.status {
            DownloadStatus::Succeeded => &self.files_succeeded,
            DownloadStatus::LinkResolutionFailed => &self.link_failures,
            DownloadStatus::TransferFailed => &self.transfer_failures,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of current metrics
    pub fn snapshot(&self) -> DownloadMetricsSnapshot {
        DownloadMetricsSnapshot {
            files_started: self.files_started.load(Ordering::Relaxed),
            files_succeeded: self.files_succeeded.load(Ordering::Relaxed),
            link_failures: self.link_failures.load(Ordering::Relaxed),
            transfer_failures: self.transfer_failures.load(Ordering::Relaxed),
            total_bytes: self.total_bytes.load(Ordering::Relaxed),
            retries_attempted: self.retries_attempted.load(Ordering::Relaxed),
        }
    }
}

/// Immutable snapshot of download metrics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadMetricsSnapshot {
    pub files_started: u64,
    pub files_succeeded: u64,
    pub link_failures: u64,
    pub transfer_failures: u64,
    pub total_bytes: u64,
    pub retries_attempted: u64,
}

impl DownloadMetricsSnapshot {
    /// Success rate between 0.0 and 1.0
    pub fn success_rate(&self) -> f64 {
        if self.files_started == 0 {
            0.0
        } else {
            self.files_succeeded as f64 / self.files_started as f64
        }
    }
}

/// One failed file in a [`BatchSummary`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedFile {
    pub filename: String,
    pub status: DownloadStatus,
    pub detail: Option<String>,
}

/// Per-file status summary reported after a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub total_bytes: u64,
    pub failures: Vec<FailedFile>,
}

impl BatchSummary {
    pub fn from_outcomes(outcomes: &[DownloadOutcome]) -> Self {
        let mut summary = BatchSummary {
            total: outcomes.len(),
            ..Default::default()
        };
        for outcome in outcomes {
            summary.total_bytes += outcome.bytes_written;
            if outcome.is_success() {
                summary.succeeded += 1;
            } else {
                summary.failures.push(FailedFile {
                    filename: outcome.filename.clone(),
                    status: outcome.status,
                    detail: outcome.error.clone(),
                });
            }
        }
        summary.failures.sort_by(|a, b| a.filename.cmp(&b.filename));
        summary
    }

    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}
