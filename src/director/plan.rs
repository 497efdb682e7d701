use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use percent_encoding::percent_decode_str;
use url::Url;

use crate::normalize::CanonicalRecord;
use crate::sanitize::{NamingMode, sanitize_filename};

/// Used when the URL path carries no usable suffix.
pub const DEFAULT_EXTENSION: &str = "jpg";

/// Which optional record fields shape the directory tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GroupingMode {
    /// `root/[location]/[folder]/post/[series]`
    #[default]
    ByRegion,
    /// `root/post/[series]`, region and site label ignored
    Flat,
}

/// One image to fetch. `index` starts at 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedImage {
    pub index: usize,
    pub source_url: String,
    pub destination: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadPlan {
    pub directory: PathBuf,
    pub images: Vec<PlannedImage>,
}

impl DownloadPlan {
    /// Deduplicates the record's URLs and names each unique image
    /// `{date_code}_{title}_{index:03}.{ext}`.
    pub fn for_record(
        record: &CanonicalRecord,
        root: &Path,
        grouping: GroupingMode,
        mode: NamingMode,
    ) -> Self {
        let directory = post_directory(record, root, grouping, mode);

        let images = dedup_urls(&record.image_urls)
            .into_iter()
            .enumerate()
            .map(|(i, url)| {
                let index = i + 1;
                let name = format!(
                    "{}_{}_{:03}.{}",
                    record.date_code,
                    record.title_sanitized,
                    index,
                    extension_of(url)
                );
                PlannedImage {
                    index,
                    source_url: url.to_string(),
                    destination: directory.join(name),
                }
            })
            .collect();

        Self { directory, images }
    }

    /// Plan for bare image URLs: each keeps its own file name, numbered
    /// only when two URLs would land on the same name.
    pub fn for_direct(urls: &[String], root: &Path, mode: NamingMode) -> Self {
        let mut taken = HashSet::new();

        let images = dedup_urls(urls)
            .into_iter()
            .enumerate()
            .map(|(i, url)| {
                let index = i + 1;
                let ext = extension_of(url);
                let stem = sanitize_filename(&file_stem_of(url), mode);
                let (base, mut name) = if stem.is_empty() {
                    ("image".to_string(), format!("image_{index:03}.{ext}"))
                } else {
                    let name = format!("{stem}.{ext}");
                    (stem, name)
                };
                // Numbered fallbacks may themselves clash with a literal name
                let mut suffix = index;
                while !taken.insert(name.clone()) {
                    name = format!("{base}_{suffix:03}.{ext}");
                    suffix += 1;
                }
                PlannedImage {
                    index,
                    source_url: url.to_string(),
                    destination: root.join(name),
                }
            })
            .collect();

        Self {
            directory: root.to_path_buf(),
            images,
        }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// `root / [location] / [folder] / "{date_code} {title}" / [series]`
pub fn post_directory(
    record: &CanonicalRecord,
    root: &Path,
    grouping: GroupingMode,
    mode: NamingMode,
) -> PathBuf {
    let mut dir = root.to_path_buf();

    if grouping == GroupingMode::ByRegion {
        for segment in [&record.location_tag, &record.folder_label]
            .into_iter()
            .flatten()
        {
            push_segment(&mut dir, segment, mode);
        }
    }

    let post = format!("{} {}", record.date_code, record.title_sanitized);
    push_segment(&mut dir, &post, mode);

    if let Some(series) = &record.series_name {
        push_segment(&mut dir, series, mode);
    }

    dir
}

fn push_segment(dir: &mut PathBuf, segment: &str, mode: NamingMode) {
    let clean = sanitize_filename(segment, mode);
    if !clean.is_empty() && clean != "." && clean != ".." {
        dir.push(clean);
    }
}

/// Exact string equality, first occurrence kept.
pub fn dedup_urls(urls: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    urls.iter()
        .map(String::as_str)
        .filter(|url| seen.insert(*url))
        .collect()
}

/// Lower-cased suffix of the URL path, ignoring query and fragment.
pub fn extension_of(url: &str) -> String {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    };

    let file = path.rsplit('/').next().unwrap_or_default();
    file.rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| {
            (1..=5).contains(&ext.len()) && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

/// Decoded last path segment without its suffix
fn file_stem_of(url: &str) -> String {
    let path = Url::parse(url)
        .map(|parsed| parsed.path().to_string())
        .unwrap_or_else(|_| url.to_string());
    let raw = path.rsplit('/').next().unwrap_or_default();
    let file = percent_decode_str(raw).decode_utf8_lossy();
    match file.rsplit_once('.') {
        Some((stem, _)) => stem.to_string(),
        None => file.to_string(),
    }
}
