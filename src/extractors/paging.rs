//! Paging contract for listing pages that grow behind a "load more" control.
//!
//! The browser-driven extractor owns the actual clicking; this module only
//! drives it. Running out of items is reported by `has_more() == false`,
//! never by an error, so errors always mean something went wrong.

use async_trait::async_trait;
use std::collections::HashSet;
use tracing::debug;

use super::traits::ExtractError;

/// Capability exposed by a paginated listing.
#[async_trait]
pub trait Pager: Send {
    /// Whether a "load more" control is still present and enabled
    async fn has_more(&mut self) -> Result<bool, ExtractError>;

    /// Reveal the next page of items
    async fn expand(&mut self) -> Result<(), ExtractError>;

    /// Links currently visible in the listing
    async fn collect_links(&mut self) -> Result<Vec<String>, ExtractError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagingState {
    Listing,
    Expanding,
    Done,
}

/// Expands the listing until exhausted (or `max_expansions` is hit), then
/// returns its links deduplicated in first-seen order.
pub async fn collect_all<P>(
    pager: &mut P,
    max_expansions: usize,
) -> Result<Vec<String>, ExtractError>
where
    P: Pager + ?Sized,
{
    let mut state = PagingState::Listing;
    let mut expansions = 0;

    while state != PagingState::Done {
        state = match state {
            PagingState::Listing => {
                if expansions < max_expansions && pager.has_more().await? {
                    PagingState::Expanding
                } else {
                    PagingState::Done
                }
            }
            PagingState::Expanding => {
                pager.expand().await?;
                expansions += 1;
                PagingState::Listing
            }
            PagingState::Done => PagingState::Done,
        };
    }

    debug!(expansions, "Listing exhausted");

    let mut seen = HashSet::new();
    let links = pager
        .collect_links()
        .await?
        .into_iter()
        .filter(|link| seen.insert(link.clone()))
        .collect();

    Ok(links)
}
