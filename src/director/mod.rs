//! Download Director
//!
//! Turns a [`CanonicalRecord`] into files on disk: builds the post directory,
//! plans one destination per unique image URL, skips images that are already
//! complete, and fetches the rest with bounded concurrency and retry. A failed
//! image is recorded in the report and never stops the others.

mod plan;
mod report;
pub mod writer;

pub use plan::{
    DEFAULT_EXTENSION, DownloadPlan, GroupingMode, PlannedImage, dedup_urls, extension_of,
    post_directory,
};
pub use report::AcquisitionReport;

use bytes::Bytes;
use futures::stream::{self, StreamExt};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::http::{DownloadError, Fetcher};
use crate::normalize::CanonicalRecord;
use crate::retry::RetryPolicy;
use crate::sanitize::NamingMode;

#[derive(Debug, Error)]
pub enum DirectorError {
    #[error("cannot create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Director settings
#[derive(Debug, Clone)]
pub struct DirectorConfig {
    /// Image fetches in flight per post
    pub workers: usize,
    pub retry: RetryPolicy,
    pub naming: NamingMode,
}

impl Default for DirectorConfig {
    fn default() -> Self {
        Self {
            workers: 6,
            retry: RetryPolicy::default(),
            naming: NamingMode::Strict,
        }
    }
}

enum Outcome {
    Downloaded,
    Failed(String),
}

pub struct DownloadDirector {
    fetcher: Arc<dyn Fetcher>,
    config: DirectorConfig,
}

impl DownloadDirector {
    pub fn new(fetcher: Arc<dyn Fetcher>, config: DirectorConfig) -> Self {
        Self { fetcher, config }
    }

    pub fn config(&self) -> &DirectorConfig {
        &self.config
    }

    /// Downloads every unique image of `record` under `root`.
    ///
    /// Re-running on the same record is safe: complete files are skipped
    /// without a network call, and the directory is only created once an
    /// image actually has to be fetched.
    pub async fn acquire(
        &self,
        record: &CanonicalRecord,
        root: &Path,
        grouping: GroupingMode,
    ) -> Result<AcquisitionReport, DirectorError> {
        let plan = DownloadPlan::for_record(record, root, grouping, self.config.naming);
        self.execute(plan).await
    }

    /// Downloads bare image URLs straight into `root`, keeping their names.
    pub async fn acquire_direct(
        &self,
        urls: &[String],
        root: &Path,
    ) -> Result<AcquisitionReport, DirectorError> {
        let plan = DownloadPlan::for_direct(urls, root, self.config.naming);
        self.execute(plan).await
    }

    async fn execute(&self, plan: DownloadPlan) -> Result<AcquisitionReport, DirectorError> {
        let mut report = AcquisitionReport {
            directory: plan.directory.clone(),
            planned: plan.len(),
            ..Default::default()
        };

        if plan.is_empty() {
            debug!(directory = %plan.directory.display(), "Nothing to download");
            return Ok(report);
        }

        let mut pending = Vec::with_capacity(plan.len());
        for image in plan.images {
            if is_complete(&image.destination).await {
                debug!(path = %image.destination.display(), "Already present, skipping");
                report.skipped_existing += 1;
            } else {
                pending.push(image);
            }
        }

        if pending.is_empty() {
            info!(
                directory = %plan.directory.display(),
                skipped = report.skipped_existing,
                "All images already present"
            );
            return Ok(report);
        }

        tokio::fs::create_dir_all(&plan.directory)
            .await
            .map_err(|source| DirectorError::CreateDir {
                path: plan.directory.clone(),
                source,
            })?;

        let workers = self.config.workers.max(1);
        let mut outcomes: Vec<(usize, Outcome)> = stream::iter(pending)
            .map(|image| async move {
                let index = image.index;
                (index, self.fetch_one(image).await)
            })
            .buffer_unordered(workers)
            .collect()
            .await;
        outcomes.sort_by_key(|(index, _)| *index);

        for (_, outcome) in outcomes {
            match outcome {
                Outcome::Downloaded => report.downloaded += 1,
                Outcome::Failed(url) => {
                    report.failed += 1;
                    report.failed_urls.push(url);
                }
            }
        }

        info!(
            directory = %report.directory.display(),
            planned = report.planned,
            downloaded = report.downloaded,
            skipped = report.skipped_existing,
            failed = report.failed,
            "Post finished"
        );

        Ok(report)
    }

    async fn fetch_one(&self, image: PlannedImage) -> Outcome {
        let url = image.source_url.as_str();

        let fetched = self
            .config
            .retry
            .run(url, |_| {
                let fetcher = Arc::clone(&self.fetcher);
                let url = url.to_string();
                async move { fetch_non_empty(fetcher.as_ref(), &url).await }
            })
            .await;

        let bytes = match fetched {
            Ok(bytes) => bytes,
            Err((e, attempts)) => {
                warn!(url, attempts, error = %e, "Image failed");
                return Outcome::Failed(image.source_url);
            }
        };

        let size = bytes.len();
        match writer::write_atomic(image.destination.clone(), bytes).await {
            Ok(()) => {
                debug!(url, size, path = %image.destination.display(), "Saved");
                Outcome::Downloaded
            }
            Err(e) => {
                warn!(url, path = %image.destination.display(), error = %e, "Write failed");
                Outcome::Failed(image.source_url)
            }
        }
    }
}

async fn fetch_non_empty(fetcher: &dyn Fetcher, url: &str) -> Result<Bytes, DownloadError> {
    let bytes = fetcher.fetch(url).await?;
    if bytes.is_empty() {
        return Err(DownloadError::EmptyBody);
    }
    Ok(bytes)
}

async fn is_complete(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_file() && meta.len() > 0)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// In-memory fetcher: serves bodies by URL, errors for anything unknown.
    #[derive(Default)]
    struct FakeFetcher {
        bodies: HashMap<String, &'static str>,
        calls: AtomicUsize,
        seen: Mutex<Vec<String>>,
    }

    impl FakeFetcher {
        fn serving(urls: &[(&str, &'static str)]) -> Self {
            Self {
                bodies: urls.iter().map(|(u, b)| (u.to_string(), *b)).collect(),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl Fetcher for FakeFetcher {
        async fn fetch(&self, url: &str) -> crate::http::Result<Bytes> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(url.to_string());
            match self.bodies.get(url) {
                Some(body) => Ok(Bytes::from_static(body.as_bytes())),
                None => Err(DownloadError::Status {
                    status: 404,
                    url: url.to_string(),
                }),
            }
        }
    }

    /// Answers every URL at once except `hang_on`, which never completes.
    struct StallingFetcher {
        hang_on: &'static str,
    }

    #[async_trait]
    impl Fetcher for StallingFetcher {
        async fn fetch(&self, url: &str) -> crate::http::Result<Bytes> {
            if url == self.hang_on {
                std::future::pending::<()>().await;
            }
            Ok(Bytes::from_static(b"complete body"))
        }
    }

    fn record(urls: &[&str]) -> CanonicalRecord {
        CanonicalRecord {
            title_sanitized: "Cover Story".into(),
            timestamp: NaiveDate::from_ymd_opt(2024, 3, 5)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            date_code: "240305".into(),
            image_urls: urls.iter().map(|s| s.to_string()).collect(),
            series_name: None,
            location_tag: Some("KR".into()),
            folder_label: Some("W Korea".into()),
        }
    }

    fn director(fetcher: Arc<dyn Fetcher>) -> DownloadDirector {
        DownloadDirector::new(
            fetcher,
            DirectorConfig {
                workers: 4,
                retry: RetryPolicy::immediate(3),
                naming: NamingMode::Strict,
            },
        )
    }

    #[tokio::test]
    async fn test_downloads_unique_images_in_order() {
        let root = tempfile::tempdir().unwrap();
        let fetcher = Arc::new(FakeFetcher::serving(&[
            ("https://cdn/a.jpg", "aaa"),
            ("https://cdn/b.png", "bbbb"),
        ]));
        let rec = record(&["https://cdn/a.jpg", "https://cdn/b.png", "https://cdn/a.jpg"]);

        let report = director(fetcher.clone())
            .acquire(&rec, root.path(), GroupingMode::ByRegion)
            .await
            .unwrap();

        assert_eq!(report.planned, 2);
        assert_eq!(report.downloaded, 2);
        assert_eq!(report.failed, 0);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);

        let dir = root.path().join("KR/W Korea/240305 Cover Story");
        assert_eq!(report.directory, dir);
        assert_eq!(std::fs::read(dir.join("240305_Cover Story_001.jpg")).unwrap(), b"aaa");
        assert_eq!(std::fs::read(dir.join("240305_Cover Story_002.png")).unwrap(), b"bbbb");
    }

    #[tokio::test]
    async fn test_rerun_skips_without_network() {
        let root = tempfile::tempdir().unwrap();
        let rec = record(&["https://cdn/a.jpg", "https://cdn/b.jpg"]);
        let first = Arc::new(FakeFetcher::serving(&[
            ("https://cdn/a.jpg", "a"),
            ("https://cdn/b.jpg", "b"),
        ]));
        director(first)
            .acquire(&rec, root.path(), GroupingMode::Flat)
            .await
            .unwrap();

        let second = Arc::new(FakeFetcher::default());
        let report = director(second.clone())
            .acquire(&rec, root.path(), GroupingMode::Flat)
            .await
            .unwrap();

        assert_eq!(report.downloaded, 0);
        assert_eq!(report.skipped_existing, report.planned);
        assert_eq!(report.planned, 2);
        assert_eq!(second.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_one_failure_does_not_stop_others() {
        let root = tempfile::tempdir().unwrap();
        let fetcher = Arc::new(FakeFetcher::serving(&[
            ("https://cdn/ok1.jpg", "1"),
            ("https://cdn/ok2.jpg", "2"),
        ]));
        let rec = record(&["https://cdn/ok1.jpg", "https://cdn/broken.jpg", "https://cdn/ok2.jpg"]);

        let report = director(fetcher.clone())
            .acquire(&rec, root.path(), GroupingMode::Flat)
            .await
            .unwrap();

        assert_eq!(report.failed, 1);
        assert_eq!(report.downloaded, 2);
        assert_eq!(report.failed_urls, vec!["https://cdn/broken.jpg"]);

        let broken_calls = fetcher
            .seen
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.as_str() == "https://cdn/broken.jpg")
            .count();
        assert_eq!(broken_calls, 3);
        assert!(!report.directory.join("240305_Cover Story_002.jpg").exists());
    }

    #[tokio::test]
    async fn test_empty_body_counts_as_failure() {
        let root = tempfile::tempdir().unwrap();
        let fetcher = Arc::new(FakeFetcher::serving(&[("https://cdn/empty.jpg", "")]));
        let rec = record(&["https://cdn/empty.jpg"]);

        let report = director(fetcher)
            .acquire(&rec, root.path(), GroupingMode::Flat)
            .await
            .unwrap();

        assert_eq!(report.failed, 1);
        assert!(!report.directory.join("240305_Cover Story_001.jpg").exists());
    }

    #[tokio::test]
    async fn test_zero_length_existing_file_is_refetched() {
        let root = tempfile::tempdir().unwrap();
        let rec = record(&["https://cdn/a.jpg"]);
        let dir = root.path().join("240305 Cover Story");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("240305_Cover Story_001.jpg"), b"").unwrap();

        let fetcher = Arc::new(FakeFetcher::serving(&[("https://cdn/a.jpg", "full")]));
        let report = director(fetcher)
            .acquire(&rec, root.path(), GroupingMode::Flat)
            .await
            .unwrap();

        assert_eq!(report.downloaded, 1);
        assert_eq!(report.skipped_existing, 0);
        assert_eq!(std::fs::read(dir.join("240305_Cover Story_001.jpg")).unwrap(), b"full");
    }

    #[tokio::test]
    async fn test_empty_record_creates_nothing() {
        let root = tempfile::tempdir().unwrap();
        let report = director(Arc::new(FakeFetcher::default()))
            .acquire(&record(&[]), root.path(), GroupingMode::ByRegion)
            .await
            .unwrap();

        assert_eq!(report, AcquisitionReport {
            directory: root.path().join("KR/W Korea/240305 Cover Story"),
            ..Default::default()
        });
        assert!(!root.path().join("KR").exists());
    }

    #[tokio::test]
    async fn test_existing_directory_and_unrelated_files_untouched() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("240305 Cover Story");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("notes.txt"), b"keep me").unwrap();

        let fetcher = Arc::new(FakeFetcher::serving(&[("https://cdn/a.jpg", "a")]));
        director(fetcher)
            .acquire(&record(&["https://cdn/a.jpg"]), root.path(), GroupingMode::Flat)
            .await
            .unwrap();

        assert_eq!(std::fs::read(dir.join("notes.txt")).unwrap(), b"keep me");
    }

    #[tokio::test]
    async fn test_interrupted_run_leaves_no_partial_files() {
        let root = tempfile::tempdir().unwrap();
        let rec = record(&["https://cdn/a.jpg", "https://cdn/b.jpg"]);
        let d = director(Arc::new(StallingFetcher {
            hang_on: "https://cdn/b.jpg",
        }));
        let dir = root.path().join("240305 Cover Story");
        let finished = dir.join("240305_Cover Story_001.jpg");

        // Drive the run until the first image is on disk, then drop it
        let mut run = Box::pin(d.acquire(&rec, root.path(), GroupingMode::Flat));
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while !finished.exists() {
            assert!(tokio::time::Instant::now() < deadline, "first image never written");
            tokio::select! {
                _ = &mut run => panic!("run should stall on the second image"),
                _ = tokio::time::sleep(Duration::from_millis(10)) => {}
            }
        }
        drop(run);

        assert_eq!(std::fs::read(&finished).unwrap(), b"complete body");
        for entry in std::fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            let name = path.file_name().unwrap().to_string_lossy().into_owned();
            assert!(!name.ends_with(writer::TEMP_SUFFIX), "leftover {name}");
            assert!(std::fs::metadata(&path).unwrap().len() > 0, "empty {name}");
        }
        assert!(!dir.join("240305_Cover Story_002.jpg").exists());
    }

    #[tokio::test]
    async fn test_direct_mode() {
        let root = tempfile::tempdir().unwrap();
        let fetcher = Arc::new(FakeFetcher::serving(&[("https://cdn/x/IMG_01.JPG", "x")]));
        let report = director(fetcher)
            .acquire_direct(&["https://cdn/x/IMG_01.JPG".to_string()], root.path())
            .await
            .unwrap();

        assert_eq!(report.downloaded, 1);
        assert!(root.path().join("IMG_01.jpg").exists());
    }
}
