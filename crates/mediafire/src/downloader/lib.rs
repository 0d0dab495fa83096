//! Main entry point for the folder downloader
//!
//! The call chain flows as follows:
//!
//! User Code
//! ↓
//! FolderDownloader (this file)
//! ↓
//! FolderRef::resolve (reference.rs) → MediafireApi (api/)
//! ↓
//! batch::download_batch (batch/mod.rs)
//! ↓
//! LinkResolver (link.rs) → FileDownloader (backends/)
//! ↓
//! Core types (core/*)

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::downloader::{
    api::MediafireApi,
    backends::{FileDownloader, HttpDownloader},
    batch,
    config::DownloadConfig,
    core::{
        files::safe_component, BatchSummary, DownloadMetrics, DownloadOutcome, FolderListing,
        HttpClient, ProgressCallback, Result,
    },
    link::LinkResolver,
    reference::FolderRef,
};

/// Everything a finished folder run produced
#[derive(Debug, Clone)]
pub struct FolderReport {
    pub folder: FolderRef,
    pub listing: FolderListing,
    pub destination: PathBuf,
    pub outcomes: Vec<DownloadOutcome>,
}

impl FolderReport {
    pub fn summary(&self) -> BatchSummary {
        BatchSummary::from_outcomes(&self.outcomes)
    }
}

/// Resolves a shared folder and downloads all of its files
///
/// Holds one HTTP client for the metadata calls, the landing pages and the
/// transfers, configured once from [`DownloadConfig`].
pub struct FolderDownloader {
    config: DownloadConfig,
    api: MediafireApi,
    resolver: LinkResolver,
    downloader: Arc<dyn FileDownloader>,
    metrics: Arc<DownloadMetrics>,
}

impl FolderDownloader {
    /// Create a downloader with the default HTTP transfer backend
    pub fn new(config: DownloadConfig) -> Result<Self> {
        config.validate()?;
        let http = HttpClient::from_config(&config)?;
        let downloader: Arc<dyn FileDownloader> = Arc::new(HttpDownloader::new(http.clone()));
        Ok(Self::assemble(config, http, downloader))
    }

    /// Create a downloader with a custom transfer backend
    pub fn with_downloader(
        config: DownloadConfig,
        downloader: Arc<dyn FileDownloader>,
    ) -> Result<Self> {
        config.validate()?;
        let http = HttpClient::from_config(&config)?;
        Ok(Self::assemble(config, http, downloader))
    }

    fn assemble(
        config: DownloadConfig,
        http: HttpClient,
        downloader: Arc<dyn FileDownloader>,
    ) -> Self {
        Self {
            api: MediafireApi::new(http.clone()),
            resolver: LinkResolver::new(http),
            downloader,
            metrics: Arc::new(DownloadMetrics::default()),
            config,
        }
    }

    pub fn config(&self) -> &DownloadConfig {
        &self.config
    }

    /// Get access to built-in metrics
    pub fn metrics(&self) -> &DownloadMetrics {
        &self.metrics
    }

    pub fn resolve_reference(&self, folder_url: &str) -> Result<FolderRef> {
        FolderRef::resolve(folder_url)
    }

    pub async fn fetch_listing(&self, folder: &FolderRef) -> Result<FolderListing> {
        self.api.fetch_listing(folder).await
    }

    /// Directory under `root` named after the folder
    ///
    /// Falls back to the folder key when the display name cannot be used
    /// as a single directory name.
    pub fn folder_directory(
        &self,
        root: &Path,
        folder: &FolderRef,
        listing: &FolderListing,
    ) -> PathBuf {
        match safe_component(&listing.name) {
            Some(name) => root.join(name),
            None => {
                warn!(
                    "Folder name '{}' is not usable as a directory, using '{}'",
                    listing.name, folder
                );
                root.join(folder.as_str())
            }
        }
    }

    /// Download every file of an already fetched listing into `destination_dir`
    pub async fn download_listing(
        &self,
        listing: &FolderListing,
        destination_dir: &Path,
        progress_callback: Option<ProgressCallback>,
    ) -> Result<Vec<DownloadOutcome>> {
        batch::download_batch(
            &self.resolver,
            self.downloader.as_ref(),
            &self.config,
            &self.metrics,
            listing,
            destination_dir,
            self.config.concurrency,
            progress_callback,
        )
        .await
    }

    /// Resolve, list and download a folder URL into `root/<folder name>`
    pub async fn download_folder(
        &self,
        folder_url: &str,
        root: &Path,
        progress_callback: Option<ProgressCallback>,
    ) -> Result<FolderReport> {
        let folder = self.resolve_reference(folder_url)?;
        let listing = self.fetch_listing(&folder).await?;
        let destination = self.folder_directory(root, &folder, &listing);

        info!(
            "Downloading {} files ({} bytes declared) into {}",
            listing.files.len(),
            listing.total_declared_bytes(),
            destination.display()
        );

        let outcomes = self.download_listing(&listing, &destination, progress_callback).await?;

        Ok(FolderReport {
            folder,
            listing,
            destination,
            outcomes,
        })
    }
}
