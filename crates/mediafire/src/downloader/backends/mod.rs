//! Transfer backends
//!
//! The batch orchestrator only sees the [`FileDownloader`] trait, so a
//! backend can be swapped or wrapped (for instance to observe how many
//! transfers run at once).

pub mod http;

pub use http::HttpDownloader;

use async_trait::async_trait;
use std::path::Path;

use crate::downloader::core::{ProgressCallback, Result};

/// Trait for different download implementations
#[async_trait]
pub trait FileDownloader: Send + Sync {
    /// Stream one direct URL to `dest_path`, returning the bytes written
    async fn download_helper(
        &self,
        url: &str,
        dest_path: &Path,
        declared_size: u64,
        progress_callback: Option<ProgressCallback>,
    ) -> Result<u64>;
}
