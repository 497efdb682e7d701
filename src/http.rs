//! HTTP client for post pages and image bodies

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::retry::RetryPolicy;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Connection timeout")]
    Timeout,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Too many redirects")]
    TooManyRedirects,

    #[error("Empty response body")]
    EmptyBody,
}

pub type Result<T> = std::result::Result<T, DownloadError>;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
    pub retry: RetryPolicy,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            user_agent: concat!("krsite-dl/", env!("CARGO_PKG_VERSION")).to_string(),
            retry: RetryPolicy::default(),
        }
    }
}

/// Single-attempt byte source. The download director layers retry on top.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Bytes>;
}

/// reqwest-backed client shared by extractors and the download director
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpConfig,
}

impl HttpClient {
    pub fn new(config: HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| DownloadError::RequestFailed(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// Fetch a post page as text, retrying per the configured policy
    pub async fn fetch_page(&self, url: &str) -> Result<String> {
        let bytes = self
            .config
            .retry
            .run(url, |_| self.fetch_once(url))
            .await
            .map_err(|(e, _)| e)?;

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Download once (no retry)
    pub async fn fetch_once(&self, url: &str) -> Result<Bytes> {
        debug!(url, "Starting request");

        let response = self.client.get(url).send().await.map_err(map_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                DownloadError::Timeout
            } else {
                DownloadError::RequestFailed(format!("Failed to read body: {}", e))
            }
        })?;

        debug!(url, size = bytes.len(), "Request completed");

        Ok(bytes)
    }
}

#[async_trait]
impl Fetcher for HttpClient {
    async fn fetch(&self, url: &str) -> Result<Bytes> {
        self.fetch_once(url).await
    }
}

fn map_reqwest(e: reqwest::Error) -> DownloadError {
    if e.is_timeout() {
        DownloadError::Timeout
    } else if e.is_redirect() {
        DownloadError::TooManyRedirects
    } else if e.is_builder() {
        DownloadError::InvalidUrl(e.to_string())
    } else {
        DownloadError::RequestFailed(e.to_string())
    }
}
