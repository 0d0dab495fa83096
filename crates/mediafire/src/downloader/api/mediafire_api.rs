//! MediaFire folder metadata client
//!
//! Talks to two endpoints under the configured API base:
//! - `folder/get_content.php` (GET): the folder's files, paged by `chunk`
//! - `folder/get_info.php` (POST form): the folder's display name
//!
//! Both calls run concurrently. A successful info response without a
//! folder name, or a 4xx carrying the API's error envelope, means the
//! folder is missing. Any other non-2xx answer (5xx, 429) leaves the
//! folder's existence unknown and is reported as unavailable.

use reqwest::StatusCode;
use serde::{Deserialize, Deserializer};
use tracing::{debug, info, warn};

use crate::downloader::core::{DownloadError, FileEntry, FolderListing, HttpClient, Result};
use crate::downloader::reference::FolderRef;

const GET_CONTENT_PATH: &str = "folder/get_content.php";
const GET_INFO_PATH: &str = "folder/get_info.php";
const API_VERSION: &str = "1.5";

/// Safety bound on listing pages fetched for a single folder
pub const MAX_CHUNKS: u32 = 1000;

#[derive(Debug, Deserialize)]
struct ContentEnvelope {
    #[serde(default)]
    response: Option<ContentResponse>,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(default)]
    folder_content: Option<FolderContent>,
}

#[derive(Debug, Deserialize)]
struct FolderContent {
    #[serde(default)]
    files: Vec<RawFile>,
    #[serde(default)]
    more_chunks: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawFile {
    filename: Option<String>,
    quickkey: Option<String>,
    #[serde(default, deserialize_with = "deserialize_size")]
    size: u64,
    links: Option<RawLinks>,
}

#[derive(Debug, Deserialize)]
struct RawLinks {
    normal_download: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InfoEnvelope {
    #[serde(default)]
    response: Option<InfoResponse>,
}

#[derive(Debug, Deserialize)]
struct InfoResponse {
    #[serde(default)]
    folder_info: Option<FolderInfo>,
}

#[derive(Debug, Deserialize)]
struct FolderInfo {
    name: Option<String>,
}

/// The host sends sizes as decimal strings; accept numbers too
#[derive(Deserialize)]
#[serde(untagged)]
enum SizeField {
    Number(u64),
    Text(String),
}

fn deserialize_size<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<SizeField>::deserialize(deserializer)? {
        Some(SizeField::Number(n)) => n,
        Some(SizeField::Text(s)) => s.trim().parse().unwrap_or(0),
        None => 0,
    })
}

impl RawFile {
    fn into_entry(self) -> Option<FileEntry> {
        Some(FileEntry {
            filename: self.filename.filter(|f| !f.is_empty())?,
            landing_url: self
                .links
                .and_then(|l| l.normal_download)
                .filter(|u| !u.is_empty())?,
            quickkey: self.quickkey.filter(|q| !q.is_empty())?,
            size_bytes: self.size,
        })
    }
}

/// Metadata client for public MediaFire folders
#[derive(Debug, Clone)]
pub struct MediafireApi {
    http: HttpClient,
    base_url: String,
}

impl MediafireApi {
    pub fn new(http: HttpClient) -> Self {
        let base_url = http.config().api_base_url.trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Fetch the folder name and its file list
    pub async fn fetch_listing(&self, folder: &FolderRef) -> Result<FolderListing> {
        let (name, files) =
            tokio::join!(self.fetch_folder_name(folder), self.fetch_files(folder));
        let name = name?;
        let files = files?;

        info!("Folder '{}' ({}) lists {} files", name, folder, files.len());
        Ok(FolderListing::new(name, files))
    }

    /// Folder display name from the info endpoint
    pub async fn fetch_folder_name(&self, folder: &FolderRef) -> Result<String> {
        let url = self.endpoint(GET_INFO_PATH);
        let form = [
            ("folder_key", folder.as_str()),
            ("recursive", "yes"),
            ("response_format", "json"),
        ];

        debug!("Requesting folder info for {}", folder);
        let response = self
            .http
            .post(&url)
            .form(&form)
            .send()
            .await
            .map_err(|e| unavailable(&url, "request failed", e))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| unavailable(&url, "reading body failed", e))?;

        let envelope: InfoEnvelope = match serde_json::from_slice(&body) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => return Err(malformed(&url, e)),
            Err(_) => return Err(unavailable_status(&url, status)),
        };

        // A 4xx carrying the API's error envelope is the host rejecting the key
        let rejected_key = status.is_client_error()
            && status != StatusCode::TOO_MANY_REQUESTS
            && envelope.response.is_some();
        if !status.is_success() && !rejected_key {
            return Err(unavailable_status(&url, status));
        }

        envelope
            .response
            .and_then(|r| r.folder_info)
            .and_then(|info| info.name)
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| DownloadError::FolderNotFound {
                folder_key: folder.to_string(),
            })
    }

    /// All files of the folder, following `more_chunks` paging
    pub async fn fetch_files(&self, folder: &FolderRef) -> Result<Vec<FileEntry>> {
        let url = self.endpoint(GET_CONTENT_PATH);
        let mut entries = Vec::new();

        for chunk in 1..=MAX_CHUNKS {
            let chunk_param = chunk.to_string();
            let query = [
                ("content_type", "files"),
                ("filter", "all"),
                ("order_by", "name"),
                ("order_direction", "asc"),
                ("recursive", "yes"),
                ("chunk", chunk_param.as_str()),
                ("version", API_VERSION),
                ("folder_key", folder.as_str()),
                ("response_format", "json"),
            ];

            debug!("Requesting folder content chunk {} for {}", chunk, folder);
            let response = self
                .http
                .get(&url)
                .query(&query)
                .send()
                .await
                .map_err(|e| unavailable(&url, "request failed", e))?;
            let status = response.status();
            if !status.is_success() {
                return Err(unavailable_status(&url, status));
            }
            let body = response
                .bytes()
                .await
                .map_err(|e| unavailable(&url, "reading body failed", e))?;
            let envelope: ContentEnvelope =
                serde_json::from_slice(&body).map_err(|e| malformed(&url, e))?;

            let Some(content) = envelope.response.and_then(|r| r.folder_content) else {
                debug!("No folder_content in chunk {}, treating as end of listing", chunk);
                break;
            };

            for raw in content.files {
                let label = raw.filename.clone().unwrap_or_else(|| "<unnamed>".to_string());
                match raw.into_entry() {
                    Some(entry) => entries.push(entry),
                    None => warn!("Skipping listing entry '{}' with missing metadata", label),
                }
            }

            if content.more_chunks.as_deref() != Some("yes") {
                break;
            }
        }

        Ok(entries)
    }
}

fn unavailable(url: &str, what: &str, error: reqwest::Error) -> DownloadError {
    let reason = if error.is_timeout() {
        format!("{}: timed out", what)
    } else {
        format!("{}: {}", what, error)
    };
    DownloadError::MetadataUnavailable {
        url: url.to_string(),
        reason,
        source: Some(Box::new(error)),
    }
}

fn malformed(url: &str, error: serde_json::Error) -> DownloadError {
    DownloadError::MetadataUnavailable {
        url: url.to_string(),
        reason: format!("malformed body: {}", error),
        source: Some(Box::new(error)),
    }
}

fn unavailable_status(url: &str, status: StatusCode) -> DownloadError {
    DownloadError::MetadataUnavailable {
        url: url.to_string(),
        reason: format!("server answered {}", status),
        source: None,
    }
}
