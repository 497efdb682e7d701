use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use scraper::Html;
use url::Url;

use super::html::{absolutize, meta_property, select_first, selector, text_of};
use super::traits::{ExtractError, SiteExtractor};
use super::types::ExtractionRecord;
use crate::http::HttpClient;
use crate::normalize::REFERENCE_OFFSET;

const PUBLISHED_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";
const FETCHED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Fallback for unregistered sites: every `<img>` on the page.
///
/// Title comes from `og:title`, then `<title>`, then the host name. Pages
/// without `article:published_time` are dated by fetch time in reference
/// civil time.
#[derive(Debug, Clone, Default)]
pub struct GenericExtractor;

impl GenericExtractor {
    pub fn parse(
        &self,
        html: &str,
        url: &str,
        fetched_at: DateTime<FixedOffset>,
    ) -> Result<ExtractionRecord, ExtractError> {
        let doc = Html::parse_document(html);

        let title = match meta_property(&doc, "og:title") {
            Some(title) => title,
            None => select_first(&doc, "title")?
                .map(text_of)
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| host_of(url)),
        };

        let img = selector("img")?;
        let images = doc
            .select(&img)
            .filter_map(|el| {
                let attrs = el.value();
                attrs.attr("src").or_else(|| attrs.attr("data-src"))
            })
            .filter_map(|src| absolutize(url, src))
            .collect();

        let published = meta_property(&doc, "article:published_time")
            .filter(|raw| DateTime::parse_from_str(raw, PUBLISHED_FORMAT).is_ok());

        let record = match published {
            Some(raw) => ExtractionRecord::new(images, title, raw, PUBLISHED_FORMAT),
            None => ExtractionRecord::new(
                images,
                title,
                fetched_at.format(FETCHED_FORMAT).to_string(),
                FETCHED_FORMAT,
            ),
        };
        Ok(record)
    }
}

#[async_trait]
impl SiteExtractor for GenericExtractor {
    async fn extract(
        &self,
        url: &str,
        http: &HttpClient,
    ) -> Result<ExtractionRecord, ExtractError> {
        let page = http.fetch_page(url).await?;
        let now = Utc::now().with_timezone(&REFERENCE_OFFSET);
        self.parse(&page, url, now)
    }
}

fn host_of(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| "untitled".to_string())
}
