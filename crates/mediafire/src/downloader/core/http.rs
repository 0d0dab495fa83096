//! HTTP utilities
//!
//! One reqwest client, built once from [`DownloadConfig`], shared by the
//! metadata client, the link resolver and the transfer backend. Also holds
//! the streaming transfer loop.

use futures::StreamExt;
use reqwest::{Client, RequestBuilder};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::time::{error::Elapsed, timeout};
use tracing::debug;

use super::files::create_truncated;
use crate::downloader::config::DownloadConfig;
use crate::downloader::core::{DownloadError, ProgressCallback, ProgressEvent, Result};

/// Shared HTTP client with integrated download functionality
///
/// Cloning is cheap; clones share the connection pool and the
/// immutable configuration.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    config: Arc<DownloadConfig>,
}

impl HttpClient {
    /// Create a new HTTP client from download configuration
    pub fn from_config(config: &DownloadConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.connect_timeout)
            .cookie_store(true)
            .build()
            .map_err(|e| DownloadError::Configuration {
                message: format!("failed to create HTTP client: {}", e),
                field: None,
                suggestion: None,
            })?;

        Ok(Self {
            client,
            config: Arc::new(config.clone()),
        })
    }

    pub fn config(&self) -> &DownloadConfig {
        &self.config
    }

    /// GET with the per-request timeout applied
    pub fn get(&self, url: &str) -> RequestBuilder {
        self.client.get(url).timeout(self.config.timeout)
    }

    /// POST with the per-request timeout applied
    pub fn post(&self, url: &str) -> RequestBuilder {
        self.client.post(url).timeout(self.config.timeout)
    }

    /// Stream `url` into `dest_path`, writing fixed-size chunks
    ///
    /// The transfer has no overall deadline: it fails only when the
    /// response headers or the next body bytes take longer than the
    /// size-dependent idle timeout.
    ///
    /// The file is created (or truncated) before the first chunk and
    /// flushed and closed once whichever way the transfer ends. A partial
    /// file is left in place on failure. `declared_size` only feeds
    /// progress events; receiving more or fewer bytes is not an error.
    pub async fn download_to_file(
        &self,
        url: &str,
        dest_path: &Path,
        declared_size: u64,
        progress_callback: Option<ProgressCallback>,
    ) -> Result<u64> {
        let filename = dest_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| dest_path.display().to_string());
        let chunk_size = self.config.chunk_size.max(1);
        let idle = self.config.get_timeout_for_size(declared_size);

        debug!(
            "Stream downloading: {} to {} (idle timeout {:?})",
            url,
            dest_path.display(),
            idle
        );

        let response = timeout(idle, self.client.get(url).send())
            .await
            .map_err(|e| stalled(&filename, url, 0, idle, e))?
            .map_err(|e| transfer_failed(&filename, url, 0, e))?;
        let response = response
            .error_for_status()
            .map_err(|e| transfer_failed(&filename, url, 0, e))?;

        let total_size = if declared_size > 0 {
            Some(declared_size)
        } else {
            response.content_length()
        };

        if let Some(ref callback) = progress_callback {
            callback(ProgressEvent::DownloadStarted {
                filename: filename.clone(),
                total_size,
            });
        }

        let mut file = create_truncated(dest_path).await?;
        let mut written: u64 = 0;
        let start_time = Instant::now();

        let copied: Result<()> = async {
            let mut stream = response.bytes_stream();
            let mut pending: Vec<u8> = Vec::with_capacity(chunk_size);

            loop {
                let so_far = written;
                let next = timeout(idle, stream.next())
                    .await
                    .map_err(|e| stalled(&filename, url, so_far, idle, e))?;
                let finished = next.is_none();
                if let Some(item) = next {
                    let bytes = item.map_err(|e| transfer_failed(&filename, url, so_far, e))?;
                    pending.extend_from_slice(&bytes);
                }

                while pending.len() >= chunk_size || (finished && !pending.is_empty()) {
                    let take = pending.len().min(chunk_size);
                    if let Err(e) = file.write_all(&pending[..take]).await {
                        return Err(DownloadError::TransferFailed {
                            filename: filename.clone(),
                            url: url.to_string(),
                            reason: format!("writing {} failed: {}", dest_path.display(), e),
                            bytes_written: written,
                            source: Some(Box::new(e)),
                        });
                    }
                    pending.drain(..take);
                    written += take as u64;

                    if let Some(ref callback) = progress_callback {
                        let elapsed = start_time.elapsed().as_secs_f64();
                        let speed = if elapsed > 0.0 { written as f64 / elapsed } else { 0.0 };
                        callback(ProgressEvent::DownloadProgress {
                            filename: filename.clone(),
                            downloaded: written,
                            total: total_size,
                            speed_bps: speed,
                        });
                    }
                }

                if finished {
                    return Ok(());
                }
            }
        }
        .await;

        let flushed = file.flush().await;
        drop(file);

        copied?;
        if let Err(e) = flushed {
            return Err(DownloadError::TransferFailed {
                filename: filename.clone(),
                url: url.to_string(),
                reason: format!("flushing {} failed: {}", dest_path.display(), e),
                bytes_written: written,
                source: Some(Box::new(e)),
            });
        }

        if let Some(ref callback) = progress_callback {
            callback(ProgressEvent::DownloadComplete {
                filename: filename.clone(),
                final_size: written,
            });
        }

        debug!("Stream download completed: {} bytes", written);
        Ok(written)
    }
}

fn transfer_failed(
    filename: &str,
    url: &str,
    bytes_written: u64,
    error: reqwest::Error,
) -> DownloadError {
    let reason = if error.is_timeout() {
        "request timed out".to_string()
    } else if let Some(status) = error.status() {
        format!("server answered {}", status)
    } else {
        format!("connection error: {}", error)
    };

    DownloadError::TransferFailed {
        filename: filename.to_string(),
        url: url.to_string(),
        reason,
        bytes_written,
        source: Some(Box::new(error)),
    }
}

fn stalled(
    filename: &str,
    url: &str,
    bytes_written: u64,
    idle: Duration,
    elapsed: Elapsed,
) -> DownloadError {
    DownloadError::TransferFailed {
        filename: filename.to_string(),
        url: url.to_string(),
        reason: format!("request timed out after {:?} without data", idle),
        bytes_written,
        source: Some(Box::new(elapsed)),
    }
}
