//! Recipe shared by the Korean fashion-magazine sites.
//!
//! These publish Open Graph metadata (`og:title`, `article:published_time`)
//! and keep the article body in a single container. They differ in the
//! container class, which attribute holds the lazy-loaded image, whether a
//! header image hides in an inline style and how the CDN names resized
//! copies.

use async_trait::async_trait;
use scraper::Html;

use super::html::{absolutize, require_meta, select_first, selector, style_url};
use super::traits::{ExtractError, SiteExtractor};
use super::types::ExtractionRecord;
use crate::http::HttpClient;

/// How image URLs are rewritten before they are recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageRewrite {
    Keep,
    /// `photo-1024x683.jpg` -> `photo.jpg` (WordPress resized copies)
    StripSizeSuffix,
}

#[derive(Debug, Clone)]
pub struct MagazineRecipe {
    pub content_selector: &'static str,
    /// Attributes tried in order on each `<img>`
    pub image_attrs: &'static [&'static str],
    /// Element whose inline `style` may carry a header image
    pub header_selector: Option<&'static str>,
    pub timestamp_format: &'static str,
    pub rewrite: ImageRewrite,
}

impl MagazineRecipe {
    pub fn esquire_korea() -> Self {
        Self {
            content_selector: "div.atc_content",
            image_attrs: &["src"],
            header_selector: Some("div.article_head"),
            timestamp_format: "%Y-%m-%dT%H:%M:%S",
            rewrite: ImageRewrite::Keep,
        }
    }

    pub fn harpers_bazaar_korea() -> Self {
        Self {
            image_attrs: &["lazy", "src"],
            ..Self::esquire_korea()
        }
    }

    pub fn w_korea() -> Self {
        Self {
            content_selector: "div.post-content",
            image_attrs: &["src"],
            header_selector: None,
            timestamp_format: "%Y-%m-%dT%H:%M:%S%:z",
            rewrite: ImageRewrite::StripSizeSuffix,
        }
    }

    pub fn parse(&self, html: &str, url: &str) -> Result<ExtractionRecord, ExtractError> {
        let doc = Html::parse_document(html);

        let title = require_meta(&doc, "og:title")?;
        let published = require_meta(&doc, "article:published_time")?;

        let content = select_first(&doc, self.content_selector)?.ok_or_else(|| {
            ExtractError::SiteStructure(format!("missing {}", self.content_selector))
        })?;

        let img = selector("img")?;
        let mut images: Vec<String> = content
            .select(&img)
            .filter_map(|el| {
                self.image_attrs
                    .iter()
                    .find_map(|attr| el.value().attr(attr))
            })
            .filter_map(|src| absolutize(url, src))
            .map(|src| self.apply_rewrite(src))
            .collect();

        if let Some(css) = self.header_selector {
            let header_image = select_first(&doc, css)?
                .and_then(|el| el.value().attr("style"))
                .and_then(style_url)
                .and_then(|src| absolutize(url, &src));
            images.extend(header_image);
        }

        Ok(ExtractionRecord::new(
            images,
            title,
            published,
            self.timestamp_format,
        ))
    }

    fn apply_rewrite(&self, src: String) -> String {
        match self.rewrite {
            ImageRewrite::Keep => src,
            ImageRewrite::StripSizeSuffix => strip_size_suffix(&src),
        }
    }
}

#[async_trait]
impl SiteExtractor for MagazineRecipe {
    async fn extract(
        &self,
        url: &str,
        http: &HttpClient,
    ) -> Result<ExtractionRecord, ExtractError> {
        let page = http.fetch_page(url).await?;
        self.parse(&page, url)
    }
}

fn strip_size_suffix(src: &str) -> String {
    let (dir, file) = match src.rfind('/') {
        Some(i) => src.split_at(i + 1),
        None => ("", src),
    };
    let Some((stem, ext)) = file.rsplit_once('.') else {
        return src.to_string();
    };
    let Some((base, size)) = stem.rsplit_once('-') else {
        return src.to_string();
    };
    let is_size = size
        .split_once('x')
        .is_some_and(|(w, h)| {
            !w.is_empty()
                && !h.is_empty()
                && w.bytes().all(|b| b.is_ascii_digit())
                && h.bytes().all(|b| b.is_ascii_digit())
        });

    if is_size {
        format!("{dir}{base}.{ext}")
    } else {
        src.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ESQUIRE_PAGE: &str = r#"
<html><head>
<meta property="og:title" content=" 봄의 얼굴 ">
<meta property="article:published_time" content="2024-03-05T10:20:30">
</head><body>
<div class="article_head" style="background-image: url(&quot;/upload/head.jpg&quot;)"></div>
<div class="atc_content">
  <img src="https://cdn.esquirekorea.co.kr/a.jpg">
  <img src="/upload/b.jpg">
  <img alt="no source">
</div>
</body></html>"#;

    #[test]
    fn test_esquire_parse() {
        let record = MagazineRecipe::esquire_korea()
            .parse(ESQUIRE_PAGE, "https://www.esquirekorea.co.kr/article/1")
            .unwrap();

        assert_eq!(record.title, "봄의 얼굴");
        assert_eq!(record.timestamp_raw, "2024-03-05T10:20:30");
        assert_eq!(
            record.image_urls,
            vec![
                "https://cdn.esquirekorea.co.kr/a.jpg",
                "https://www.esquirekorea.co.kr/upload/b.jpg",
                "https://www.esquirekorea.co.kr/upload/head.jpg",
            ]
        );
    }

    #[test]
    fn test_harpers_prefers_lazy_attribute() {
        let page = r#"
<html><head>
<meta property="og:title" content="Cover">
<meta property="article:published_time" content="2024-01-01T00:00:00">
</head><body>
<div class="article_head"></div>
<div class="atc_content">
  <img lazy="https://cdn/real.jpg" src="https://cdn/placeholder.gif">
  <img src="https://cdn/plain.jpg">
</div></body></html>"#;

        let record = MagazineRecipe::harpers_bazaar_korea()
            .parse(page, "https://www.harpersbazaar.co.kr/x")
            .unwrap();
        assert_eq!(
            record.image_urls,
            vec!["https://cdn/real.jpg", "https://cdn/plain.jpg"]
        );
    }

    #[test]
    fn test_w_korea_strips_sizes() {
        let page = r#"
<html><head>
<meta property="og:title" content="W">
<meta property="article:published_time" content="2024-01-01T15:00:00+00:00">
</head><body>
<div class="post-content">
  <img src="https://www.wkorea.com/wp-content/uploads/2024/01/look-1024x683.jpg">
  <img src="https://www.wkorea.com/wp-content/uploads/2024/01/look-768x512.jpg">
  <img src="https://www.wkorea.com/wp-content/uploads/2024/01/k-pop.png">
</div></body></html>"#;

        let record = MagazineRecipe::w_korea()
            .parse(page, "https://www.wkorea.com/2024/01/01/look/")
            .unwrap();
        assert_eq!(
            record.image_urls,
            vec![
                "https://www.wkorea.com/wp-content/uploads/2024/01/look.jpg",
                "https://www.wkorea.com/wp-content/uploads/2024/01/look.jpg",
                "https://www.wkorea.com/wp-content/uploads/2024/01/k-pop.png",
            ]
        );
        assert_eq!(record.timestamp_format, "%Y-%m-%dT%H:%M:%S%:z");
    }

    #[test]
    fn test_missing_content_is_structure_error() {
        let page = r#"<html><head>
<meta property="og:title" content="T">
<meta property="article:published_time" content="2024-01-01T00:00:00">
</head><body></body></html>"#;

        let err = MagazineRecipe::esquire_korea()
            .parse(page, "https://www.esquirekorea.co.kr/a")
            .unwrap_err();
        assert!(matches!(err, ExtractError::SiteStructure(_)));
    }

    #[test]
    fn test_missing_title_is_structure_error() {
        let err = MagazineRecipe::esquire_korea()
            .parse("<html></html>", "https://www.esquirekorea.co.kr/a")
            .unwrap_err();
        assert!(matches!(err, ExtractError::SiteStructure(_)));
    }
}
