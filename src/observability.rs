//! Run counters and tracing setup

use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::EnvFilter;

use crate::director::AcquisitionReport;

/// Counters for one run, shared across every post of a batch
#[derive(Debug, Default)]
pub struct Metrics {
    posts_processed: AtomicU64,
    posts_failed: AtomicU64,
    images_downloaded: AtomicU64,
    images_skipped: AtomicU64,
    images_failed: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post_processed(&self, report: &AcquisitionReport) {
        self.posts_processed.fetch_add(1, Ordering::Relaxed);
        self.images_downloaded
            .fetch_add(report.downloaded as u64, Ordering::Relaxed);
        self.images_skipped
            .fetch_add(report.skipped_existing as u64, Ordering::Relaxed);
        self.images_failed
            .fetch_add(report.failed as u64, Ordering::Relaxed);
        tracing::debug!(counter = "posts_processed", "Metric incremented");
    }

    pub fn post_failed(&self) {
        self.posts_failed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "posts_failed", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            posts_processed: self.posts_processed.load(Ordering::Relaxed),
            posts_failed: self.posts_failed.load(Ordering::Relaxed),
            images_downloaded: self.images_downloaded.load(Ordering::Relaxed),
            images_skipped: self.images_skipped.load(Ordering::Relaxed),
            images_failed: self.images_failed.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub posts_processed: u64,
    pub posts_failed: u64,
    pub images_downloaded: u64,
    pub images_skipped: u64,
    pub images_failed: u64,
}

/// Installs the global fmt subscriber. `RUST_LOG` wins over `verbose`.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
