//! Downloader module
//!
//! This module contains all the download functionality including
//! folder reference parsing, the metadata client, link resolution,
//! transfer backends and batch operations.

pub mod api;
pub mod backends;
pub mod batch;
pub mod config;
pub mod core;
pub mod link;
pub mod r#lib;
pub mod reference;

// Re-export main types for convenience
pub use r#lib::{FolderDownloader, FolderReport};
pub use api::MediafireApi;
pub use backends::{FileDownloader, HttpDownloader};
pub use config::{DownloadConfig, DownloadConfigBuilder, LinkFallback, MAX_CONCURRENCY};
pub use self::core::{
    BatchSummary, ConsoleProgressReporter, DownloadError, DownloadMetrics, DownloadMetricsSnapshot,
    DownloadOutcome, DownloadStatus, FailedFile, FileEntry, FileOperation, FolderListing,
    HttpClient, IntoProgressCallback, NullProgressReporter, ProgressCallback, ProgressEvent,
    ProgressReporter, Result,
};
pub use link::{extract_direct_link, LinkResolver, EXTRACTION_POLICY};
pub use reference::FolderRef;
