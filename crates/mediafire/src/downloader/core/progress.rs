//! Progress tracking and reporting for file transfers

use std::sync::Arc;

/// Progress callback for download operations
pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Events emitted while a folder's files are transferred
///
/// Events for different files interleave freely; events for one file
/// arrive in transfer order.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    DownloadStarted {
        filename: String,
        total_size: Option<u64>,
    },
    /// Emitted after every chunk written to disk
    DownloadProgress {
        filename: String,
        downloaded: u64,
        total: Option<u64>,
        speed_bps: f64,
    },
    DownloadComplete {
        filename: String,
        final_size: u64,
    },
    RetryAttempt {
        filename: String,
        attempt: usize,
        max_attempts: usize,
    },
    Error {
        filename: String,
        error: String,
    },
}

impl ProgressEvent {
    pub fn filename(&self) -> &str {
        match self {
            ProgressEvent::DownloadStarted { filename, .. }
            | ProgressEvent::DownloadProgress { filename, .. }
            | ProgressEvent::DownloadComplete { filename, .. }
            | ProgressEvent::RetryAttempt { filename, .. }
            | ProgressEvent::Error { filename, .. } => filename,
        }
    }
}

/// Trait for progress reporting with more granular control
pub trait ProgressReporter: Send + Sync {
    fn on_download_started(&self, _filename: &str, _total_size: Option<u64>) {}
    fn on_download_progress(
        &self,
        _filename: &str,
        _downloaded: u64,
        _total: Option<u64>,
        _speed_bps: f64,
    ) {
    }
    fn on_download_complete(&self, _filename: &str, _final_size: u64) {}
    fn on_retry_attempt(&self, _filename: &str, _attempt: usize, _max_attempts: usize) {}
    fn on_error(&self, _filename: &str, _error: &str) {}
}

/// Extension trait to convert ProgressReporter to ProgressCallback
pub trait IntoProgressCallback {
    fn into_callback(self) -> ProgressCallback;
}

impl<T: ProgressReporter + 'static> IntoProgressCallback for T {
    fn into_callback(self) -> ProgressCallback {
        Arc::new(move |event| match event {
            ProgressEvent::DownloadStarted { filename, total_size } => {
                self.on_download_started(&filename, total_size);
            }
            ProgressEvent::DownloadProgress { filename, downloaded, total, speed_bps } => {
                self.on_download_progress(&filename, downloaded, total, speed_bps);
            }
            ProgressEvent::DownloadComplete { filename, final_size } => {
                self.on_download_complete(&filename, final_size);
            }
            ProgressEvent::RetryAttempt { filename, attempt, max_attempts } => {
                self.on_retry_attempt(&filename, attempt, max_attempts);
            }
            ProgressEvent::Error { filename, error } => {
                self.on_error(&filename, &error);
            }
        })
    }
}

/// Simple console progress reporter implementation
#[derive(Debug, Default)]
pub struct ConsoleProgressReporter {
    pub verbose: bool,
}

impl ConsoleProgressReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ProgressReporter for ConsoleProgressReporter {
    fn on_download_started(&self, filename: &str, total_size: Option<u64>) {
        match total_size {
            Some(size) => println!("⬇ {} ({} bytes)", filename, size),
            None => println!("⬇ {}", filename),
        }
    }

    fn on_download_progress(
        &self,
        filename: &str,
        downloaded: u64,
        total: Option<u64>,
        speed_bps: f64,
    ) {
        if self.verbose {
            let speed_mb = speed_bps / 1_000_000.0;
            match total {
                Some(total) if total > 0 => {
                    let percent = (downloaded as f64 / total as f64) * 100.0;
                    println!("  {}: {:.1}% ({}/{} bytes, {:.1} MB/s)",
                        filename, percent, downloaded, total, speed_mb);
                }
                _ => {
                    println!("  {}: {} bytes ({:.1} MB/s)", filename, downloaded, speed_mb);
                }
            }
        }
    }

    fn on_download_complete(&self, filename: &str, final_size: u64) {
        println!("✔ {} ({} bytes)", filename, final_size);
    }

    fn on_retry_attempt(&self, filename: &str, attempt: usize, max_attempts: usize) {
        println!("↻ Retry {}/{} for {}", attempt, max_attempts, filename);
    }

    fn on_error(&self, filename: &str, error: &str) {
        eprintln!("✘ {}: {}", filename, error);
    }
}

/// Null progress reporter that does nothing
#[derive(Debug, Default)]
pub struct NullProgressReporter;

impl ProgressReporter for NullProgressReporter {}
