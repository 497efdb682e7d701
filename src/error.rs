use std::path::PathBuf;
use thiserror::Error;

use crate::director::DirectorError;
use crate::extractors::{ExtractError, RouterError};
use crate::http::DownloadError;
use crate::normalize::ParseError;

/// Post-level failures. Each one skips the post it happened in; the batch
/// carries on with the next line.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("usage: {0}")]
    Usage(String),

    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("bad post metadata: {0}")]
    Parse(#[from] ParseError),

    #[error("site structure changed: {0}")]
    SiteStructure(String),

    #[error("network error: {0}")]
    Network(#[from] DownloadError),

    #[error(transparent)]
    Director(#[from] DirectorError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Usage(_) | PipelineError::FileNotFound(_) => "usage",
            PipelineError::Parse(_) => "parse",
            PipelineError::SiteStructure(_) => "site-structure",
            PipelineError::Network(_) => "network",
            PipelineError::Director(_) | PipelineError::Io(_) => "io",
        }
    }
}

impl From<ExtractError> for PipelineError {
    fn from(value: ExtractError) -> Self {
        match value {
            ExtractError::SiteStructure(msg) => PipelineError::SiteStructure(msg),
            ExtractError::Network(e) => PipelineError::Network(e),
        }
    }
}

impl From<RouterError> for PipelineError {
    fn from(value: RouterError) -> Self {
        PipelineError::Usage(value.to_string())
    }
}
