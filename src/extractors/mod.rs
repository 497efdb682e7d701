//! Site extractors and the router that picks one per URL.
//!
//! ## Key Components
//!
//! - [`SiteExtractor`] - capability every site recipe implements
//! - [`SiteRouter`] - ordered, region-grouped table; first substring match wins
//! - [`GenericExtractor`] - `<img>` scraping fallback for unknown sites
//! - [`ExtractionRecord`] - raw, per-post output of an extractor
//!
//! ## Example
//!
//! ```rust,ignore
//! use krsite_dl::extractors::SiteRouter;
//!
//! let router = SiteRouter::with_defaults();
//! let route = router.route("https://www.wkorea.com/2024/01/01/look/")?;
//! let record = route.extract(url, &http).await?;
//! ```

mod generic;
mod html;
mod kodyssey;
mod magazine;
pub mod paging;
mod registry;
mod traits;
mod tvjtbc;
pub(crate) mod types;

pub use generic::GenericExtractor;
pub use kodyssey::KodysseyExtractor;
pub use magazine::{ImageRewrite, MagazineRecipe};
pub use paging::{PagingState, Pager};
pub use registry::{Region, Route, RouterError, SiteEntry, SiteRouter};
pub use traits::{ExtractError, SiteExtractor};
pub use tvjtbc::TvJtbcExtractor;
pub use types::ExtractionRecord;
