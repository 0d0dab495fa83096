//! MediaFire folder downloader
//!
//! Resolves a public MediaFire folder URL into its file listing and
//! downloads every file with bounded concurrency, streaming each transfer
//! to disk and recording one outcome per file.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use mediafire::{
//!     ConsoleProgressReporter, DownloadConfig, FolderDownloader, IntoProgressCallback,
//! };
//! use std::path::Path;
//!
//! # async fn example() -> mediafire::Result<()> {
//! let config = DownloadConfig {
//!     concurrency: 3,
//!     ..DownloadConfig::default()
//! };
//! let downloader = FolderDownloader::new(config)?;
//!
//! let progress = ConsoleProgressReporter::new(false).into_callback();
//! let report = downloader
//!     .download_folder(
//!         "https://www.mediafire.com/folder/abc123/Photos",
//!         Path::new("."),
//!         Some(progress),
//!     )
//!     .await?;
//!
//! let summary = report.summary();
//! println!("{}/{} files downloaded", summary.succeeded, summary.total);
//! for failure in &summary.failures {
//!     println!("{}: {}", failure.filename, failure.status);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Failure model
//!
//! A malformed URL, a missing folder or an unreachable metadata API fails
//! the whole call. Once the listing is known, a file whose link cannot be
//! resolved or whose transfer breaks only gets a failed
//! [`DownloadOutcome`]; every other file still downloads.

pub mod downloader;

// Re-export commonly used types for convenience
pub use downloader::{
    BatchSummary, ConsoleProgressReporter, DownloadConfig, DownloadConfigBuilder, DownloadError,
    DownloadOutcome, DownloadStatus, FileDownloader, FileEntry, FolderDownloader, FolderListing,
    FolderRef, FolderReport, IntoProgressCallback, LinkFallback, NullProgressReporter,
    ProgressCallback, ProgressEvent, ProgressReporter, Result,
};
