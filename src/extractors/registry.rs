use chrono::FixedOffset;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use super::generic::GenericExtractor;
use super::kodyssey::KodysseyExtractor;
use super::magazine::MagazineRecipe;
use super::tvjtbc::TvJtbcExtractor;
use super::traits::{ExtractError, SiteExtractor};
use super::types::ExtractionRecord;
use crate::http::HttpClient;

const KST: FixedOffset = match FixedOffset::east_opt(9 * 3600) {
    Some(offset) => offset,
    None => panic!("invalid KST offset"),
};
const SGT: FixedOffset = match FixedOffset::east_opt(8 * 3600) {
    Some(offset) => offset,
    None => panic!("invalid SGT offset"),
};

/// Region a site publishes from. Its tag becomes the top-level directory in
/// grouped layouts and its offset the civil time post dates are shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Kr,
    Jp,
    Sg,
}

impl Region {
    pub fn tag(&self) -> &'static str {
        match self {
            Region::Kr => "KR",
            Region::Jp => "JP",
            Region::Sg => "SG",
        }
    }

    pub fn utc_offset(&self) -> FixedOffset {
        match self {
            Region::Kr | Region::Jp => KST,
            Region::Sg => SGT,
        }
    }
}

/// One row of the routing table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteEntry {
    /// Matched as a plain substring of the input URL
    pub domain: String,
    /// Human readable site name, used as the folder label
    pub label: String,
    pub region: Region,
    /// Records nest under region and label folders. Single-site sources
    /// registered flat leave both unset.
    pub grouped: bool,
}

#[derive(Debug, Error)]
pub enum RouterError {
    #[error("no URL provided")]
    EmptyUrl,
}

/// Result of routing: the matched site (if any) and its extractor.
#[derive(Clone)]
pub struct Route {
    pub site: Option<SiteEntry>,
    extractor: Arc<dyn SiteExtractor>,
}

impl Route {
    pub fn label(&self) -> &str {
        self.site.as_ref().map_or("Generic", |s| s.label.as_str())
    }

    pub fn is_generic(&self) -> bool {
        self.site.is_none()
    }

    /// Civil time offset for this site's timestamps. `None` for generic
    /// routes, which use the normalizer default.
    pub fn utc_offset(&self) -> Option<FixedOffset> {
        self.site.as_ref().map(|s| s.region.utc_offset())
    }

    /// Runs the extractor and, for grouped sites, stamps region/label onto
    /// the record where the extractor left them unset.
    pub async fn extract(
        &self,
        url: &str,
        http: &HttpClient,
    ) -> Result<ExtractionRecord, ExtractError> {
        let mut record = self.extractor.extract(url, http).await?;

        if let Some(site) = self.site.as_ref().filter(|s| s.grouped) {
            record
                .location_tag
                .get_or_insert_with(|| site.region.tag().to_string());
            record
                .folder_label
                .get_or_insert_with(|| site.label.clone());
        }

        Ok(record)
    }
}

struct RegisteredSite {
    entry: SiteEntry,
    extractor: Arc<dyn SiteExtractor>,
}

/// Ordered routing table grouped by region.
///
/// Groups are scanned in the order their region was first registered, sites
/// within a group in registration order, and the first substring match wins.
/// A specific domain must therefore be registered before a broader one that
/// would also match.
#[derive(Clone)]
pub struct SiteRouter {
    groups: Vec<(Region, Vec<Arc<RegisteredSite>>)>,
    fallback: Arc<dyn SiteExtractor>,
}

impl SiteRouter {
    /// Empty table that routes everything to the generic extractor
    pub fn new() -> Self {
        Self {
            groups: Vec::new(),
            fallback: Arc::new(GenericExtractor),
        }
    }

    pub fn register(
        &mut self,
        region: Region,
        domain: impl Into<String>,
        label: impl Into<String>,
        extractor: Arc<dyn SiteExtractor>,
    ) {
        let entry = SiteEntry {
            domain: domain.into(),
            label: label.into(),
            region,
            grouped: true,
        };
        self.push(entry, extractor);
    }

    /// Like [`register`](Self::register), but the site's posts go straight
    /// under the destination root.
    pub fn register_flat(
        &mut self,
        region: Region,
        domain: impl Into<String>,
        label: impl Into<String>,
        extractor: Arc<dyn SiteExtractor>,
    ) {
        let entry = SiteEntry {
            domain: domain.into(),
            label: label.into(),
            region,
            grouped: false,
        };
        self.push(entry, extractor);
    }

    fn push(&mut self, entry: SiteEntry, extractor: Arc<dyn SiteExtractor>) {
        let region = entry.region;
        let site = Arc::new(RegisteredSite { entry, extractor });

        match self.groups.iter_mut().find(|(r, _)| *r == region) {
            Some((_, sites)) => sites.push(site),
            None => self.groups.push((region, vec![site])),
        }
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn SiteExtractor>) -> Self {
        self.fallback = fallback;
        self
    }

    /// Table entries in match order
    pub fn entries(&self) -> impl Iterator<Item = &SiteEntry> {
        self.groups
            .iter()
            .flat_map(|(_, sites)| sites.iter().map(|s| &s.entry))
    }

    pub fn route(&self, url: &str) -> Result<Route, RouterError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(RouterError::EmptyUrl);
        }

        let matched = self
            .groups
            .iter()
            .flat_map(|(_, sites)| sites.iter())
            .find(|site| url.contains(site.entry.domain.as_str()));

        let route = match matched {
            Some(site) => Route {
                site: Some(site.entry.clone()),
                extractor: Arc::clone(&site.extractor),
            },
            None => Route {
                site: None,
                extractor: Arc::clone(&self.fallback),
            },
        };

        info!(site = route.label(), url, "Matched site");
        Ok(route)
    }

    /// Create default router with built-in extractors
    pub fn with_defaults() -> Self {
        let mut router = Self::new();

        router.register_flat(
            Region::Kr,
            "k-odyssey.com",
            "K-odyssey",
            Arc::new(KodysseyExtractor),
        );
        router.register_flat(
            Region::Kr,
            "tv.jtbc.co.kr",
            "JTBC",
            Arc::new(TvJtbcExtractor),
        );
        router.register(
            Region::Kr,
            "esquirekorea.co.kr",
            "Esquire Korea",
            Arc::new(MagazineRecipe::esquire_korea()),
        );
        router.register(
            Region::Kr,
            "harpersbazaar.co.kr",
            "Harper's Bazaar Korea",
            Arc::new(MagazineRecipe::harpers_bazaar_korea()),
        );
        router.register(
            Region::Kr,
            "wkorea.com",
            "W Korea",
            Arc::new(MagazineRecipe::w_korea()),
        );

        router
    }
}

impl Default for SiteRouter {
    fn default() -> Self {
        Self::with_defaults()
    }
}
