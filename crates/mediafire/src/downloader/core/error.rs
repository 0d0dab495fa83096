//! Error types for folder resolution and file transfers

use std::path::PathBuf;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors produced while resolving, listing or downloading a folder
///
/// `InvalidReference`, `FolderNotFound` and `MetadataUnavailable` abort a
/// run before any file is touched. `LinkNotFound` and `TransferFailed` are
/// recorded against a single file and never stop the batch.
#[derive(Error, Debug)]
pub enum DownloadError {
    /// The folder URL carries no usable folder key
    #[error("Invalid folder reference '{url}': {reason}")]
    InvalidReference {
        url: String,
        reason: String,
    },

    /// The host reports no folder for this key
    #[error("Folder '{folder_key}' not found (deleted, private or mistyped)")]
    FolderNotFound {
        folder_key: String,
    },

    /// A metadata call failed at the transport level or returned garbage
    #[error("Folder metadata unavailable from '{url}': {reason}")]
    MetadataUnavailable {
        url: String,
        reason: String,
        #[source]
        source: Option<BoxError>,
    },

    /// No direct link could be derived from the landing page
    #[error("No download link found for '{filename}' on '{landing_url}': {reason}")]
    LinkNotFound {
        filename: String,
        landing_url: String,
        reason: String,
        #[source]
        source: Option<BoxError>,
    },

    /// The streamed transfer did not complete
    #[error("Transfer of '{filename}' from '{url}' failed: {reason}")]
    TransferFailed {
        filename: String,
        url: String,
        reason: String,
        /// Bytes already on disk when the transfer stopped
        bytes_written: u64,
        #[source]
        source: Option<BoxError>,
    },

    /// Local file system errors with file context
    #[error("File operation failed: {operation} '{}'", path.display())]
    FileSystem {
        path: PathBuf,
        operation: FileOperation,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Invalid configuration: {message}")]
    Configuration {
        message: String,
        field: Option<String>,
        suggestion: Option<String>,
    },
}

/// Types of file operations for error context
#[derive(Debug, Clone, PartialEq)]
pub enum FileOperation {
    Create,
    CreateDir,
}

impl std::fmt::Display for FileOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileOperation::Create => write!(f, "creating"),
            FileOperation::CreateDir => write!(f, "creating directory"),
        }
    }
}

pub type Result<T> = std::result::Result<T, DownloadError>;

impl DownloadError {
    /// Whether this error ends the whole run rather than a single file
    pub fn is_fatal(&self) -> bool {
        match self {
            DownloadError::InvalidReference { .. } => true,
            DownloadError::FolderNotFound { .. } => true,
            DownloadError::MetadataUnavailable { .. } => true,
            DownloadError::Configuration { .. } => true,
            DownloadError::FileSystem { operation, .. } => *operation == FileOperation::CreateDir,
            DownloadError::LinkNotFound { .. } => false,
            DownloadError::TransferFailed { .. } => false,
        }
    }

    /// Check if a per-file error is worth an explicit retry
    pub fn is_recoverable(&self) -> bool {
        match self {
            DownloadError::TransferFailed { source: Some(err), .. }
            | DownloadError::LinkNotFound { source: Some(err), .. } => {
                if err.is::<tokio::time::error::Elapsed>() {
                    return true;
                }
                match err.downcast_ref::<reqwest::Error>() {
                    // Only retry on network-related errors, not client errors (4xx)
                    Some(e) => e.status().map_or(true, |status| {
                        status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS
                    }),
                    None => false,
                }
            }
            _ => false,
        }
    }

    /// Get error category for logging and summaries
    pub fn category(&self) -> &'static str {
        match self {
            DownloadError::InvalidReference { .. } => "invalid_reference",
            DownloadError::FolderNotFound { .. } => "folder_not_found",
            DownloadError::MetadataUnavailable { .. } => "metadata_unavailable",
            DownloadError::LinkNotFound { .. } => "link_not_found",
            DownloadError::TransferFailed { .. } => "transfer_failed",
            DownloadError::FileSystem { .. } => "file_system",
            DownloadError::Configuration { .. } => "configuration",
        }
    }

    /// Get user-friendly suggestion for resolving the error
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            DownloadError::InvalidReference { .. } => {
                Some("Pass a folder URL such as https://www.mediafire.com/folder/<key>/<name>")
            }
            DownloadError::FolderNotFound { .. } => {
                Some("Check that the folder still exists and is shared publicly")
            }
            DownloadError::MetadataUnavailable { .. } => {
                Some("Check your internet connection or try again later")
            }
            DownloadError::LinkNotFound { .. } => {
                Some("The landing page layout may have changed; try --fallback always")
            }
            DownloadError::Configuration { suggestion, .. } => suggestion.as_deref(),
            _ => None,
        }
    }
}
