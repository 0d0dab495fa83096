//! Configuration types for the folder downloader

use std::time::Duration;

use crate::downloader::core::{DownloadError, Result};

/// Public MediaFire API root
pub const DEFAULT_API_BASE_URL: &str = "https://www.mediafire.com/api/1.5";

/// Desktop browser identity; the host rejects default client identifiers
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/127.0.0.0 Safari/537.36";

/// Bytes written per chunk by the transfer loop
pub const DEFAULT_CHUNK_SIZE: usize = 512 * 1024;

/// Upper bound for simultaneous file transfers
pub const MAX_CONCURRENCY: usize = 5;

/// What the link resolver does when no direct link can be extracted
/// from a landing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkFallback {
    /// Fail with `LinkNotFound` whenever extraction fails.
    Never,
    /// Use the landing URL only when the page body is not text at all.
    #[default]
    UnparsableOnly,
    /// Use the landing URL whenever no anchor matches.
    Always,
}

impl LinkFallback {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkFallback::Never => "never",
            LinkFallback::UnparsableOnly => "unparsable",
            LinkFallback::Always => "always",
        }
    }
}

impl std::str::FromStr for LinkFallback {
    type Err = DownloadError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "never" => Ok(LinkFallback::Never),
            "unparsable" | "unparsable-only" => Ok(LinkFallback::UnparsableOnly),
            "always" => Ok(LinkFallback::Always),
            other => Err(DownloadError::Configuration {
                message: format!("unknown link fallback policy '{}'", other),
                field: Some("link_fallback".to_string()),
                suggestion: Some("use one of: never, unparsable, always".to_string()),
            }),
        }
    }
}

/// Configuration for folder resolution and file transfers
///
/// Built once and shared read-only by the metadata client, the link
/// resolver and the transfer backend.
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    pub api_base_url: String,
    pub user_agent: String,
    /// Timeout for metadata calls and landing page fetches; also the
    /// longest a transfer may go without receiving data
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Stall timeout for transfers of large files
    pub large_file_timeout: Duration,
    /// Declared size (bytes) from which the large file timeout applies
    pub large_file_threshold: u64,
    pub chunk_size: usize,
    /// Number of files transferred at the same time
    pub concurrency: usize,
    pub link_fallback: LinkFallback,
    /// Extra attempts for a file after a recoverable failure (0 disables retry)
    pub max_retries: usize,
    /// Initial delay between retries (doubles each retry)
    pub retry_delay: Duration,
    /// Maximum retry delay cap
    pub max_retry_delay: Duration,
}

impl DownloadConfig {
    /// Stall timeout for a transfer, based on the declared file size
    pub fn get_timeout_for_size(&self, declared_size: u64) -> Duration {
        if declared_size >= self.large_file_threshold {
            self.large_file_timeout
        } else {
            self.timeout
        }
    }

    /// Calculate retry delay for the given attempt using exponential backoff
    pub fn get_retry_delay(&self, attempt: usize) -> Duration {
        let factor = 2_u64.saturating_pow(attempt.min(16) as u32);
        let delay = (self.retry_delay.as_millis() as u64).saturating_mul(factor);
        Duration::from_millis(delay.min(self.max_retry_delay.as_millis() as u64))
    }

    /// Reject settings the downloader cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 || self.concurrency > MAX_CONCURRENCY {
            return Err(DownloadError::Configuration {
                message: format!(
                    "concurrency must be between 1 and {}, got {}",
                    MAX_CONCURRENCY, self.concurrency
                ),
                field: Some("concurrency".to_string()),
                suggestion: Some(format!("pick a value in 1..={}", MAX_CONCURRENCY)),
            });
        }
        if self.chunk_size == 0 {
            return Err(DownloadError::Configuration {
                message: "chunk size must be positive".to_string(),
                field: Some("chunk_size".to_string()),
                suggestion: None,
            });
        }
        if self.user_agent.trim().is_empty() {
            return Err(DownloadError::Configuration {
                message: "user agent must not be empty".to_string(),
                field: Some("user_agent".to_string()),
                suggestion: Some("leave the default browser user agent in place".to_string()),
            });
        }
        if let Err(e) = url::Url::parse(&self.api_base_url) {
            return Err(DownloadError::Configuration {
                message: format!("invalid API base URL '{}': {}", self.api_base_url, e),
                field: Some("api_base_url".to_string()),
                suggestion: Some("use an absolute http(s) URL".to_string()),
            });
        }
        Ok(())
    }

    /// Defaults overlaid with `MEDIAFIRE_*` environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(base) = std::env::var("MEDIAFIRE_API_BASE") {
            config.api_base_url = base;
        }
        if let Ok(agent) = std::env::var("MEDIAFIRE_USER_AGENT") {
            config.user_agent = agent;
        }
        if let Some(secs) = env_number::<u64>("MEDIAFIRE_TIMEOUT_SECS")? {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(concurrency) = env_number::<usize>("MEDIAFIRE_CONCURRENCY")? {
            config.concurrency = concurrency;
        }
        if let Some(retries) = env_number::<usize>("MEDIAFIRE_MAX_RETRIES")? {
            config.max_retries = retries;
        }

        Ok(config)
    }
}

fn env_number<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| DownloadError::Configuration {
            message: format!("{} is not a valid number: '{}'", name, raw),
            field: Some(name.to_string()),
            suggestion: Some("unset the variable or give it a positive integer".to_string()),
        }),
        Err(_) => Ok(None),
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            large_file_timeout: Duration::from_secs(600), // 10 minutes for large files
            large_file_threshold: 100_000_000, // 100MB
            chunk_size: DEFAULT_CHUNK_SIZE,
            concurrency: 2,
            link_fallback: LinkFallback::default(),
            max_retries: 0,
            retry_delay: Duration::from_millis(1000),
            max_retry_delay: Duration::from_secs(30),
        }
    }
}

/// Fluent builder for [`DownloadConfig`]
#[derive(Debug, Clone, Default)]
pub struct DownloadConfigBuilder {
    config: DownloadConfig,
}

impl DownloadConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn api_base_url<S: Into<String>>(mut self, url: S) -> Self {
        self.config.api_base_url = url.into();
        self
    }

    pub fn user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    pub fn large_file_timeout(mut self, timeout: Duration) -> Self {
        self.config.large_file_timeout = timeout;
        self
    }

    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.config.chunk_size = chunk_size;
        self
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.config.concurrency = concurrency;
        self
    }

    pub fn link_fallback(mut self, policy: LinkFallback) -> Self {
        self.config.link_fallback = policy;
        self
    }

    pub fn max_retries(mut self, retries: usize) -> Self {
        self.config.max_retries = retries;
        self
    }

    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.config.retry_delay = delay;
        self
    }

    /// Retry transient failures a few times with short backoff
    pub fn reliable(mut self) -> Self {
        self.config.max_retries = 3;
        self.config.retry_delay = Duration::from_millis(500);
        self
    }

    pub fn build(self) -> DownloadConfig {
        self.config
    }
}
