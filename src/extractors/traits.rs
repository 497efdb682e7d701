use async_trait::async_trait;
use thiserror::Error;

use super::types::ExtractionRecord;
use crate::http::{DownloadError, HttpClient};

/// Extractor errors. Both variants fail a single post, never the batch.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Expected markup is missing, usually because the site layout changed
    #[error("site structure changed: {0}")]
    SiteStructure(String),
    #[error("page fetch failed: {0}")]
    Network(#[from] DownloadError),
}

/// Turns a post URL into image URLs plus metadata.
///
/// Implementations fetch through the shared [`HttpClient`] and parse
/// synchronously; parsed documents must not be held across an await.
#[async_trait]
pub trait SiteExtractor: Send + Sync {
    async fn extract(
        &self,
        url: &str,
        http: &HttpClient,
    ) -> Result<ExtractionRecord, ExtractError>;
}
