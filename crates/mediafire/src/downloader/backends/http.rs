//! HTTP transfer backend

use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, info_span, Instrument};

use crate::downloader::backends::FileDownloader;
use crate::downloader::core::{HttpClient, ProgressCallback, Result};

/// HTTP-based file downloader
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    client: HttpClient,
}

impl HttpDownloader {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FileDownloader for HttpDownloader {
    async fn download_helper(
        &self,
        url: &str,
        dest_path: &Path,
        declared_size: u64,
        progress_callback: Option<ProgressCallback>,
    ) -> Result<u64> {
        async move {
            let size = self
                .client
                .download_to_file(url, dest_path, declared_size, progress_callback)
                .await?;
            debug!("Transfer completed: {} bytes to {}", size, dest_path.display());
            Ok(size)
        }
        .instrument(info_span!("http_download", url = %url))
        .await
    }
}
