//! Batch Driver
//!
//! Feeds inputs to the [`Pipeline`] one post at a time. A failing line is
//! logged and recorded, and the batch moves on to the next one.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::director::AcquisitionReport;
use crate::error::PipelineError;
use crate::pipeline::Pipeline;

/// Line prefixes that mark a batch-file comment
const COMMENT_PREFIXES: [char; 3] = ['#', ';', ']'];

/// One thing the user asked for on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Url(String),
    /// File of post URLs
    PostList(PathBuf),
    /// File of direct image URLs
    ImageList(PathBuf),
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Input::Url(url) => write!(f, "{url}"),
            Input::PostList(path) | Input::ImageList(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug)]
pub struct PostFailure {
    pub input: String,
    pub error: PipelineError,
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failures: Vec<PostFailure>,
    pub totals: AcquisitionReport,
}

impl BatchSummary {
    pub fn record(&mut self, input: &str, result: Result<AcquisitionReport, PipelineError>) {
        match result {
            Ok(report) => {
                self.succeeded += 1;
                self.totals.absorb(&report);
            }
            Err(err) => {
                error!(input, kind = err.kind(), error = %err, "Post failed");
                self.failures.push(PostFailure {
                    input: input.to_string(),
                    error: err,
                });
            }
        }
    }

    pub fn merge(&mut self, other: BatchSummary) {
        self.succeeded += other.succeeded;
        self.totals.absorb(&other.totals);
        self.failures.extend(other.failures);
    }

    /// No failed post and no failed image
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.totals.failed == 0
    }

    /// Human-readable closing report
    pub fn render(&self) -> String {
        let mut out = format!(
            "{} post(s) done: {} downloaded, {} already present, {} failed image(s)",
            self.succeeded,
            self.totals.downloaded,
            self.totals.skipped_existing,
            self.totals.failed
        );
        for url in &self.totals.failed_urls {
            out.push_str(&format!("\n  image failed: {url}"));
        }
        if !self.failures.is_empty() {
            out.push_str(&format!("\n{} input(s) failed:", self.failures.len()));
            for failure in &self.failures {
                out.push_str(&format!(
                    "\n  [{}] {}: {}",
                    failure.error.kind(),
                    failure.input,
                    failure.error
                ));
            }
        }
        out
    }
}

/// Keeps non-blank, non-comment lines, trimmed. Lines are trimmed before
/// the comment check, so indented comments are skipped too.
pub fn parse_batch_lines(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with(&COMMENT_PREFIXES[..]))
        .map(str::to_string)
        .collect()
}

pub async fn read_batch_file(path: &Path) -> Result<Vec<String>, PipelineError> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => Ok(parse_batch_lines(&contents)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(PipelineError::FileNotFound(path.to_path_buf()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Processes post URLs strictly in order
pub async fn run_urls(pipeline: &Pipeline, urls: &[String]) -> BatchSummary {
    let mut summary = BatchSummary::default();
    for (n, url) in urls.iter().enumerate() {
        info!(line = n + 1, total = urls.len(), url = %url, "Processing");
        let result = pipeline.process_url(url).await;
        summary.record(url, result);
    }
    summary
}

pub async fn run_batch_file(
    pipeline: &Pipeline,
    path: &Path,
) -> Result<BatchSummary, PipelineError> {
    let urls = read_batch_file(path).await?;
    if urls.is_empty() {
        warn!(file = %path.display(), "Batch file has no URLs");
    }
    Ok(run_urls(pipeline, &urls).await)
}

pub async fn run_direct_file(
    pipeline: &Pipeline,
    path: &Path,
) -> Result<BatchSummary, PipelineError> {
    let urls = read_batch_file(path).await?;
    let mut summary = BatchSummary::default();
    let label = path.display().to_string();
    summary.record(&label, pipeline.process_direct(&urls).await);
    Ok(summary)
}

/// Runs every input in order. A missing file is reported and the remaining
/// inputs still run.
pub async fn run_inputs(
    pipeline: &Pipeline,
    inputs: &[Input],
) -> Result<BatchSummary, PipelineError> {
    if inputs.is_empty() {
        return Err(PipelineError::Usage("no URL or batch file given".to_string()));
    }

    let mut summary = BatchSummary::default();
    for input in inputs {
        let result = match input {
            Input::Url(url) => {
                summary.record(url, pipeline.process_url(url).await);
                continue;
            }
            Input::PostList(path) => run_batch_file(pipeline, path).await,
            Input::ImageList(path) => run_direct_file(pipeline, path).await,
        };

        match result {
            Ok(part) => summary.merge(part),
            Err(err) => summary.record(&input.to_string(), Err(err)),
        }
    }
    Ok(summary)
}
