//! Batch download of a folder listing
//!
//! Each file is one unit of work: resolve the direct link, then stream the
//! transfer. Units run through `buffer_unordered`, so at most
//! `concurrency` are in flight and the next file starts as soon as one
//! finishes. A failed unit only produces a failed outcome; it never
//! cancels its siblings.

use futures::stream::{self, StreamExt};
use std::path::Path;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::downloader::{
    backends::FileDownloader,
    config::{DownloadConfig, MAX_CONCURRENCY},
    core::{
        files::{destination_path, ensure_dir},
        DownloadError, DownloadMetrics, DownloadOutcome, DownloadStatus, FileEntry, FolderListing,
        ProgressCallback, ProgressEvent, Result,
    },
    link::LinkResolver,
};

/// Download every file of `listing` into `destination_dir`
///
/// The directory is created if missing. Outcomes come back in completion
/// order, one per listed file.
#[allow(clippy::too_many_arguments)]
pub async fn download_batch(
    resolver: &LinkResolver,
    downloader: &dyn FileDownloader,
    config: &DownloadConfig,
    metrics: &DownloadMetrics,
    listing: &FolderListing,
    destination_dir: &Path,
    concurrency: usize,
    progress_callback: Option<ProgressCallback>,
) -> Result<Vec<DownloadOutcome>> {
    if concurrency == 0 || concurrency > MAX_CONCURRENCY {
        return Err(DownloadError::Configuration {
            message: format!(
                "concurrency must be between 1 and {}, got {}",
                MAX_CONCURRENCY, concurrency
            ),
            field: Some("concurrency".to_string()),
            suggestion: None,
        });
    }

    ensure_dir(destination_dir).await?;

    debug!(
        "Starting batch download of {} files into {} with concurrency={}",
        listing.files.len(),
        destination_dir.display(),
        concurrency
    );

    let outcomes: Vec<DownloadOutcome> = stream::iter(listing.files.iter())
        .map(|entry| {
            let progress_cb = progress_callback.clone();
            async move {
                download_entry(
                    resolver,
                    downloader,
                    config,
                    metrics,
                    entry,
                    destination_dir,
                    progress_cb,
                )
                .instrument(info_span!("file", filename = %entry.filename))
                    .await
            }
        })
        .buffer_unordered(concurrency)
        .collect()
        .await;

    let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
    info!(
        "Batch finished: {}/{} files succeeded in '{}'",
        succeeded,
        outcomes.len(),
        listing.name
    );
    Ok(outcomes)
}

/// One unit of work: link resolution then transfer, with optional retry
async fn download_entry(
    resolver: &LinkResolver,
    downloader: &dyn FileDownloader,
    config: &DownloadConfig,
    metrics: &DownloadMetrics,
    entry: &FileEntry,
    destination_dir: &Path,
    progress_callback: Option<ProgressCallback>,
) -> DownloadOutcome {
    metrics.record_started();

    let Some(dest_path) = destination_path(destination_dir, &entry.filename) else {
        warn!("Refusing unsafe file name '{}'", entry.filename);
        let outcome = DownloadOutcome {
            filename: entry.filename.clone(),
            status: DownloadStatus::TransferFailed,
            bytes_written: 0,
            error: Some(format!("unsafe file name '{}'", entry.filename)),
        };
        report_error(&progress_callback, &outcome);
        metrics.record_outcome(&outcome);
        return outcome;
    };

    let max_retries = config.max_retries;
    let mut attempt = 0;
    let result = loop {
        if attempt > 0 {
            metrics.record_retry();
            if let Some(ref callback) = progress_callback {
                callback(ProgressEvent::RetryAttempt {
                    filename: entry.filename.clone(),
                    attempt,
                    max_attempts: max_retries,
                });
            }
            let delay = config.get_retry_delay(attempt - 1);
            debug!("Retry attempt {} for '{}' after {:?}", attempt, entry.filename, delay);
            tokio::time::sleep(delay).await;
        }

        let attempt_result =
            attempt_once(resolver, downloader, entry, &dest_path, progress_callback.clone()).await;
        match attempt_result {
            Ok(size) => break Ok(size),
            Err(e) if attempt < max_retries && e.is_recoverable() => {
                debug!("Recoverable failure for '{}': {}", entry.filename, e);
                attempt += 1;
            }
            Err(e) => break Err(e),
        }
    };

    let outcome = match result {
        Ok(size) => DownloadOutcome::succeeded(&entry.filename, size),
        Err(e) => {
            warn!("'{}' failed ({}): {}", entry.filename, e.category(), e);
            let outcome = DownloadOutcome::failed(&entry.filename, &e);
            report_error(&progress_callback, &outcome);
            outcome
        }
    };

    metrics.record_outcome(&outcome);
    outcome
}

async fn attempt_once(
    resolver: &LinkResolver,
    downloader: &dyn FileDownloader,
    entry: &FileEntry,
    dest_path: &Path,
    progress_callback: Option<ProgressCallback>,
) -> Result<u64> {
    let url = resolver.resolve(entry).await?;
    downloader
        .download_helper(&url, dest_path, entry.size_bytes, progress_callback)
        .await
}

fn report_error(progress_callback: &Option<ProgressCallback>, outcome: &DownloadOutcome) {
    if let Some(callback) = progress_callback {
        callback(ProgressEvent::Error {
            filename: outcome.filename.clone(),
            error: outcome.error.clone().unwrap_or_else(|| outcome.status.to_string()),
        });
    }
}
