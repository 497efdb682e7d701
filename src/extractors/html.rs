//! Small DOM helpers shared by the built-in extractors.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::traits::ExtractError;

pub(crate) fn selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css)
        .map_err(|e| ExtractError::SiteStructure(format!("bad selector {css:?}: {e}")))
}

pub(crate) fn select_first<'a>(
    doc: &'a Html,
    css: &str,
) -> Result<Option<ElementRef<'a>>, ExtractError> {
    let sel = selector(css)?;
    Ok(doc.select(&sel).next())
}

/// Content of `<meta property="...">`, trimmed.
pub(crate) fn meta_property(doc: &Html, property: &str) -> Option<String> {
    let sel = Selector::parse(&format!(r#"meta[property="{property}"]"#)).ok()?;
    doc.select(&sel)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub(crate) fn require_meta(doc: &Html, property: &str) -> Result<String, ExtractError> {
    meta_property(doc, property)
        .ok_or_else(|| ExtractError::SiteStructure(format!("missing meta {property}")))
}

pub(crate) fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Resolves `src` against the page URL. `data:` URIs and blanks yield `None`.
pub(crate) fn absolutize(base: &str, src: &str) -> Option<String> {
    let src = src.trim();
    if src.is_empty() || src.starts_with("data:") {
        return None;
    }
    match Url::parse(src) {
        Ok(url) => Some(url.to_string()),
        Err(_) => Url::parse(base)
            .and_then(|base| base.join(src))
            .ok()
            .map(|url| url.to_string()),
    }
}

/// Pulls the target out of a `background-image: url("...")` style value.
pub(crate) fn style_url(style: &str) -> Option<String> {
    let start = style.find("url(")? + 4;
    let rest = &style[start..];
    let end = rest.find(')')?;
    let url = rest[..end].trim().trim_matches(|c| c == '"' || c == '\'');
    (!url.is_empty()).then(|| url.to_string())
}
