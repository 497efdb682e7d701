use async_trait::async_trait;
use scraper::Html;

use super::html::{absolutize, select_first, selector, text_of};
use super::traits::{ExtractError, SiteExtractor};
use super::types::ExtractionRecord;
use crate::http::HttpClient;

const ORIGIN: &str = "https://k-odyssey.com";
const TIMESTAMP_FORMAT: &str = "%Y%m%d %H:%M:%S";

/// K-odyssey photo galleries. Thumbnails in the slider carry a `_thum`
/// marker that the full-size copy lacks.
#[derive(Debug, Clone, Default)]
pub struct KodysseyExtractor;

impl KodysseyExtractor {
    pub fn parse(&self, html: &str) -> Result<ExtractionRecord, ExtractError> {
        let doc = Html::parse_document(html);

        let title = select_first(&doc, "div.viewTitle h1")?
            .map(text_of)
            .ok_or_else(|| ExtractError::SiteStructure("missing div.viewTitle h1".into()))?;

        let date = select_first(&doc, "div.dd")?
            .map(text_of)
            .ok_or_else(|| ExtractError::SiteStructure("missing div.dd".into()))?;

        let panels = select_first(&doc, "div.sliderkit-panels")?
            .ok_or_else(|| ExtractError::SiteStructure("missing div.sliderkit-panels".into()))?;

        let img = selector("img[src]")?;
        let images = panels
            .select(&img)
            .filter_map(|el| el.value().attr("src"))
            .filter_map(|src| absolutize(ORIGIN, &src.replace("_thum", "")))
            .collect();

        Ok(ExtractionRecord::new(
            images,
            title,
            clean_date(&date),
            TIMESTAMP_FORMAT,
        ))
    }
}

#[async_trait]
impl SiteExtractor for KodysseyExtractor {
    async fn extract(
        &self,
        url: &str,
        http: &HttpClient,
    ) -> Result<ExtractionRecord, ExtractError> {
        let page = http.fetch_page(url).await?;
        self.parse(&page)
    }
}

/// `등록 2023-05-04 12:34:56` -> `20230504 12:34:56`
///
/// Hangul labels, separators and whitespace are dropped, then the date and
/// clock parts are split again at the eighth digit.
fn clean_date(raw: &str) -> String {
    let compact: String = raw
        .chars()
        .filter(|&c| !is_hangul(c) && c != '/' && c != '-' && !c.is_whitespace())
        .collect();

    match compact.char_indices().nth(8) {
        Some((i, _)) => format!("{} {}", &compact[..i], &compact[i..]),
        None => compact,
    }
}

fn is_hangul(c: char) -> bool {
    ('\u{3131}'..='\u{D7A3}').contains(&c)
}
