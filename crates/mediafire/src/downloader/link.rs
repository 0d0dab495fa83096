//! Direct link resolution
//!
//! The metadata API only gives a landing page per file. The direct,
//! time-limited link is scraped from that page's markup, which the host
//! may change at any time, so all matching lives in
//! [`extract_direct_link`].
//!
//! Extraction policy `anchor-v1`:
//! - candidates are `href` values starting with `http://` or `https://`,
//!   in document order, with `&amp;` decoded;
//! - a candidate equal to the landing URL is skipped;
//! - the first candidate whose host starts with `download`, or whose path
//!   contains `/<quickkey>/`, wins.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::downloader::config::LinkFallback;
use crate::downloader::core::{DownloadError, FileEntry, HttpClient, Result};

/// Version label of the extraction rules above
pub const EXTRACTION_POLICY: &str = "anchor-v1";

static HREF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)href\s*=\s*["'](https?://[^"'\s<>]+)["']"#).expect("href pattern is valid")
});

/// Pick the direct download link out of a landing page body
pub fn extract_direct_link(body: &str, quickkey: &str, landing_url: &str) -> Option<String> {
    let key_segment = format!("/{}/", quickkey);

    HREF.captures_iter(body)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().replace("&amp;", "&"))
        .filter(|candidate| candidate != landing_url)
        .find(|candidate| {
            let Ok(parsed) = url::Url::parse(candidate) else {
                return false;
            };
            let download_host = parsed
                .host_str()
                .is_some_and(|host| host.to_ascii_lowercase().starts_with("download"));
            let keyed_path = !quickkey.is_empty() && parsed.path().contains(&key_segment);
            download_host || keyed_path
        })
}

/// Resolves a file's landing page to its direct download URL
#[derive(Debug, Clone)]
pub struct LinkResolver {
    http: HttpClient,
    fallback: LinkFallback,
}

impl LinkResolver {
    pub fn new(http: HttpClient) -> Self {
        let fallback = http.config().link_fallback;
        Self { http, fallback }
    }

    pub fn with_fallback(mut self, fallback: LinkFallback) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn fallback(&self) -> LinkFallback {
        self.fallback
    }

    /// Fetch the landing page and extract the direct URL
    pub async fn resolve(&self, entry: &FileEntry) -> Result<String> {
        let landing_url = entry.landing_url.as_str();
        let not_found = |reason: String, source: Option<reqwest::Error>| {
            DownloadError::LinkNotFound {
                filename: entry.filename.clone(),
                landing_url: landing_url.to_string(),
                reason,
                source: source.map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
            }
        };

        debug!("Fetching landing page {} ({})", landing_url, EXTRACTION_POLICY);
        let response = self
            .http
            .get(landing_url)
            .send()
            .await
            .map_err(|e| not_found(describe("landing page request failed", &e), Some(e)))?;
        let response = response
            .error_for_status()
            .map_err(|e| not_found(describe("landing page request failed", &e), Some(e)))?;
        let body = response
            .bytes()
            .await
            .map_err(|e| not_found(describe("landing page request failed", &e), Some(e)))?;

        let text = match std::str::from_utf8(&body) {
            Ok(text) => text,
            Err(_) => {
                return match self.fallback {
                    LinkFallback::UnparsableOnly | LinkFallback::Always => {
                        warn!(
                            "Landing page for '{}' is not text, using the landing URL directly",
                            entry.filename
                        );
                        Ok(landing_url.to_string())
                    }
                    LinkFallback::Never => {
                        Err(not_found("landing page is not text".to_string(), None))
                    }
                };
            }
        };

        if let Some(link) = extract_direct_link(text, &entry.quickkey, landing_url) {
            debug!("Resolved direct link for '{}': {}", entry.filename, link);
            return Ok(link);
        }

        match self.fallback {
            LinkFallback::Always => {
                warn!(
                    "No download anchor for '{}', using the landing URL directly",
                    entry.filename
                );
                Ok(landing_url.to_string())
            }
            LinkFallback::Never | LinkFallback::UnparsableOnly => Err(not_found(
                format!("no matching anchor ({})", EXTRACTION_POLICY),
                None,
            )),
        }
    }
}

fn describe(what: &str, error: &reqwest::Error) -> String {
    if error.is_timeout() {
        format!("{}: timed out", what)
    } else if let Some(status) = error.status() {
        format!("{}: server answered {}", what, status)
    } else {
        format!("{}: {}", what, error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LANDING: &str = "https://www.mediafire.com/file/qk123/a.txt/file";

    #[test]
    fn picks_download_subdomain_anchor() {
        let body = r#"
            <a href="https://www.mediafire.com/upgrade">Upgrade</a>
            <a class="input popsok" aria-label="Download file"
               href="https://download1234.mediafire.com/abcdef/qk123/a.txt">Download</a>
        "#;
        assert_eq!(
            extract_direct_link(body, "qk123", LANDING).as_deref(),
            Some("https://download1234.mediafire.com/abcdef/qk123/a.txt")
        );
    }

    #[test]
    fn picks_quickkey_anchor_on_any_host() {
        let body = r#"<a href="http://127.0.0.1:8080/dl/qk123/a.txt">go</a>"#;
        assert_eq!(
            extract_direct_link(body, "qk123", LANDING).as_deref(),
            Some("http://127.0.0.1:8080/dl/qk123/a.txt")
        );
    }

    #[test]
    fn first_match_in_document_order_wins() {
        let body = r#"
            <a href='https://download1.mediafire.com/x/qk123/first.txt'>1</a>
            <a href="https://download2.mediafire.com/y/qk123/second.txt">2</a>
        "#;
        assert_eq!(
            extract_direct_link(body, "qk123", LANDING).as_deref(),
            Some("https://download1.mediafire.com/x/qk123/first.txt")
        );
    }

    #[test]
    fn ignores_other_files_and_relative_links() {
        let body = r#"
            <a href="/file/qk123/a.txt">relative</a>
            <a href="https://www.mediafire.com/file/otherkey/b.txt/file">other</a>
            <a href="ftp://download.example.com/qk123/a.txt">ftp</a>
        "#;
        assert_eq!(extract_direct_link(body, "qk123", LANDING), None);
    }

    #[test]
    fn skips_self_link_and_decodes_entities() {
        let body = format!(
            r#"<a href="{LANDING}">self</a><a href="https://download9.mediafire.com/a/qk123/a.txt?x=1&amp;y=2">dl</a>"#
        );
        assert_eq!(
            extract_direct_link(&body, "qk123", LANDING).as_deref(),
            Some("https://download9.mediafire.com/a/qk123/a.txt?x=1&y=2")
        );
    }

    #[test]
    fn quickkey_must_be_a_whole_segment() {
        let body = r#"<a href="http://cdn.example.com/qk1234/a.txt">near miss</a>"#;
        assert_eq!(extract_direct_link(body, "qk123", LANDING), None);
    }
}
