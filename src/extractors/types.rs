/// Raw output of a site extractor, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionRecord {
    /// Absolute image URLs in page order. May contain duplicates.
    pub image_urls: Vec<String>,
    pub title: String,
    pub timestamp_raw: String,
    /// chrono pattern `timestamp_raw` is written in
    pub timestamp_format: String,
    pub series_name: Option<String>,
    /// Region tag such as `KR`, stamped by the router when unset
    pub location_tag: Option<String>,
    /// Site name used as a subdirectory, stamped by the router when unset
    pub folder_label: Option<String>,
}

impl ExtractionRecord {
    pub fn new(
        image_urls: Vec<String>,
        title: impl Into<String>,
        timestamp_raw: impl Into<String>,
        timestamp_format: impl Into<String>,
    ) -> Self {
        Self {
            image_urls,
            title: title.into(),
            timestamp_raw: timestamp_raw.into(),
            timestamp_format: timestamp_format.into(),
            series_name: None,
            location_tag: None,
            folder_label: None,
        }
    }

    pub fn with_series(mut self, series: impl Into<String>) -> Self {
        self.series_name = Some(series.into());
        self
    }
}
