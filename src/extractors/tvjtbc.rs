use async_trait::async_trait;
use scraper::Html;

use super::html::{absolutize, select_first, selector, text_of};
use super::traits::{ExtractError, SiteExtractor};
use super::types::ExtractionRecord;
use crate::http::HttpClient;

const TIMESTAMP_FORMAT: &str = "%Y%m%d %p %I:%M:%S";

/// JTBC programme news. The posted time is the third `span` of the info
/// line, written with a 12-hour clock.
#[derive(Debug, Clone, Default)]
pub struct TvJtbcExtractor;

impl TvJtbcExtractor {
    pub fn parse(&self, html: &str, url: &str) -> Result<ExtractionRecord, ExtractError> {
        let doc = Html::parse_document(html);

        // The site's own class name is misspelled
        let title = select_first(&doc, "h3.veiw_tit")?
            .map(text_of)
            .ok_or_else(|| ExtractError::SiteStructure("missing h3.veiw_tit".into()))?;

        let info = select_first(&doc, "div.view_info_txt")?
            .ok_or_else(|| ExtractError::SiteStructure("missing div.view_info_txt".into()))?;
        let span = selector("span")?;
        let date = info
            .select(&span)
            .nth(2)
            .map(text_of)
            .ok_or_else(|| ExtractError::SiteStructure("missing posted time span".into()))?;

        let content = select_first(&doc, "div.view_cont_txt")?
            .ok_or_else(|| ExtractError::SiteStructure("missing div.view_cont_txt".into()))?;
        let img = selector("img[src]")?;
        let images = content
            .select(&img)
            .filter_map(|el| el.value().attr("src"))
            .filter_map(|src| absolutize(url, src))
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
impl SiteExtractor for TvJtbcExtractor {
    async fn extract(
        &self,
        url: &str,
        http: &HttpClient,
    ) -> Result<ExtractionRecord, ExtractError> {
        let page = http.fetch_page(url).await?;
        self.parse(&page, url)
    }
}

/// `2019-05-21 오후 05:30:12` -> `20190521 PM 05:30:12`
fn clean_date(raw: &str) -> String {
    raw.replace('-', "")
        .replace("오전", "AM")
        .replace("오후", "PM")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
