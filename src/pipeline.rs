//! One post, end to end: route, extract, normalize, download.

use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::director::{AcquisitionReport, DownloadDirector, GroupingMode};
use crate::error::PipelineError;
use crate::extractors::SiteRouter;
use crate::http::HttpClient;
use crate::normalize::canonicalize;
use crate::observability::Metrics;
use crate::sanitize::NamingMode;

/// Where results go
#[derive(Debug, Clone)]
pub struct OutputSettings {
    pub destination: PathBuf,
    pub grouping: GroupingMode,
    pub naming: NamingMode,
}

impl From<&Config> for OutputSettings {
    fn from(config: &Config) -> Self {
        Self {
            destination: config.download.destination.clone(),
            grouping: config.download.grouping,
            naming: config.naming.mode(),
        }
    }
}

pub struct Pipeline {
    router: SiteRouter,
    http: HttpClient,
    director: DownloadDirector,
    output: OutputSettings,
    metrics: Arc<Metrics>,
}

impl Pipeline {
    pub fn new(
        router: SiteRouter,
        http: HttpClient,
        director: DownloadDirector,
        output: OutputSettings,
    ) -> Self {
        Self {
            router,
            http,
            director,
            output,
            metrics: Arc::new(Metrics::new()),
        }
    }

    /// Builds the default router, a shared HTTP client and a director from
    /// a loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self, PipelineError> {
        let http = HttpClient::new(config.http.http_config())?;
        let director = DownloadDirector::new(Arc::new(http.clone()), config.director_config());
        Ok(Self::new(
            SiteRouter::with_defaults(),
            http,
            director,
            OutputSettings::from(config),
        ))
    }

    pub fn output(&self) -> &OutputSettings {
        &self.output
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Processes one post URL. Image-level failures are counted in the
    /// report; anything that prevents the post from being planned is an
    /// error for this post only.
    pub async fn process_url(&self, url: &str) -> Result<AcquisitionReport, PipelineError> {
        let result = self.process_url_inner(url).await;
        match &result {
            Ok(report) => self.metrics.post_processed(report),
            Err(_) => self.metrics.post_failed(),
        }
        result
    }

    async fn process_url_inner(&self, url: &str) -> Result<AcquisitionReport, PipelineError> {
        let route = self.router.route(url)?;
        let record = route.extract(url.trim(), &self.http).await?;
        info!(
            site = route.label(),
            url = url.trim(),
            images = record.image_urls.len(),
            "Found images"
        );

        let canonical = canonicalize(record, self.output.naming, route.utc_offset())?;
        let report = self
            .director
            .acquire(&canonical, &self.output.destination, self.output.grouping)
            .await?;

        info!(
            site = route.label(),
            downloaded = report.downloaded,
            skipped = report.skipped_existing,
            failed = report.failed,
            directory = %report.directory.display(),
            "Post done"
        );
        Ok(report)
    }

    /// Downloads bare image URLs, bypassing extraction
    pub async fn process_direct(
        &self,
        urls: &[String],
    ) -> Result<AcquisitionReport, PipelineError> {
        let result = self
            .director
            .acquire_direct(urls, &self.output.destination)
            .await
            .map_err(PipelineError::from);
        match &result {
            Ok(report) => self.metrics.post_processed(report),
            Err(_) => self.metrics.post_failed(),
        }
        result
    }
}
