use std::path::PathBuf;

/// Per-post outcome of [`DownloadDirector::acquire`](super::DownloadDirector::acquire).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcquisitionReport {
    pub directory: PathBuf,
    pub planned: usize,
    pub skipped_existing: usize,
    pub downloaded: usize,
    pub failed: usize,
    /// In plan order
    pub failed_urls: Vec<String>,
}

impl AcquisitionReport {
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }

    /// Adds another report's counters into this one (batch totals)
    pub fn absorb(&mut self, other: &AcquisitionReport) {
        self.planned += other.planned;
        self.skipped_existing += other.skipped_existing;
        self.downloaded += other.downloaded;
        self.failed += other.failed;
        self.failed_urls.extend(other.failed_urls.iter().cloned());
    }
}
