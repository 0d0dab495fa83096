//! Core types used throughout the downloader system
//!
//! This module contains the fundamental types that all other modules depend on.
//! By organizing these in a core module, we make the dependency relationships clear.

pub mod error;
pub mod files;
pub mod http;
pub mod metrics;
pub mod progress;

// Re-export main types for convenience
pub use error::{DownloadError, FileOperation, Result};
pub use http::HttpClient;
pub use metrics::{BatchSummary, DownloadMetrics, DownloadMetricsSnapshot, FailedFile};
pub use progress::{
    ConsoleProgressReporter, IntoProgressCallback, NullProgressReporter, ProgressCallback,
    ProgressEvent, ProgressReporter,
};

/// Metadata for one remote file
///
/// Built by the metadata client from the listing response and never
/// changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Used verbatim as the local file name
    pub filename: String,
    /// Intermediate page that carries the direct link
    pub landing_url: String,
    /// Per-file token that picks the right anchor on the landing page
    pub quickkey: String,
    /// Declared size; advisory, only used for progress display
    pub size_bytes: u64,
}

/// A folder's display name plus its files in API response order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderListing {
    pub name: String,
    pub files: Vec<FileEntry>,
}

impl FolderListing {
    pub fn new<S: Into<String>>(name: S, files: Vec<FileEntry>) -> Self {
        Self { name: name.into(), files }
    }

    pub fn total_declared_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.size_bytes).sum()
    }
}

/// Terminal status of one file's download attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DownloadStatus {
    Succeeded,
    LinkResolutionFailed,
    TransferFailed,
}

impl std::fmt::Display for DownloadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DownloadStatus::Succeeded => write!(f, "succeeded"),
            DownloadStatus::LinkResolutionFailed => write!(f, "link not found"),
            DownloadStatus::TransferFailed => write!(f, "transfer failed"),
        }
    }
}

/// Result record for one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    pub filename: String,
    pub status: DownloadStatus,
    pub bytes_written: u64,
    pub error: Option<String>,
}

impl DownloadOutcome {
    pub fn succeeded<S: Into<String>>(filename: S, bytes_written: u64) -> Self {
        Self {
            filename: filename.into(),
            status: DownloadStatus::Succeeded,
            bytes_written,
            error: None,
        }
    }

    /// Classify a per-file error into its outcome
    pub fn failed<S: Into<String>>(filename: S, error: &DownloadError) -> Self {
        let (status, bytes_written) = match error {
            DownloadError::LinkNotFound { .. } => (DownloadStatus::LinkResolutionFailed, 0),
            DownloadError::TransferFailed { bytes_written, .. } => {
                (DownloadStatus::TransferFailed, *bytes_written)
            }
            _ => (DownloadStatus::TransferFailed, 0),
        };
        Self {
            filename: filename.into(),
            status,
            bytes_written,
            error: Some(error.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == DownloadStatus::Succeeded
    }
}
