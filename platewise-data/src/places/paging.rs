//! Transport seam and the paging/enrichment loop shared by the HTTP client
//! and tests.

use std::time::Duration;

use async_trait::async_trait;
use platewise_core::{PlaceId, PlaceSearchError, Restaurant, SearchQuery};

use super::wire::{DetailsResponse, NearbyResponse};

/// A decoded response together with the request URL, key redacted.
#[derive(Debug, Clone)]
pub struct Fetched<T> {
    /// Request URL with the API key redacted, used in error reports.
    pub url: String,
    /// Decoded body.
    pub body: T,
}

/// Issues the two place-service requests.
///
/// Implementations report transport and decoding failures; service statuses
/// are checked by [`collect_candidates`].
#[async_trait(?Send)]
pub trait PlacesTransport {
    /// Fetch one page of a nearby search, following `page_token` when given.
    async fn nearby(
        &self,
        query: &SearchQuery,
        page_token: Option<&str>,
    ) -> Result<Fetched<NearbyResponse>, PlaceSearchError>;

    /// Fetch the detail fields of one place.
    async fn details(
        &self,
        place_id: &PlaceId,
    ) -> Result<Fetched<DetailsResponse>, PlaceSearchError>;
}

/// Bounds on the paging loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    /// Maximum number of pages fetched before giving up.
    pub max_pages: usize,
    /// Wait before following a continuation token.
    pub token_delay: Duration,
}

/// Run a nearby search over every page and enrich each candidate with its
/// details.
///
/// Results keep the service's order, page by page. The first failure aborts
/// the search and discards everything collected so far.
///
/// # Errors
/// Returns [`PlaceSearchError::PageLimitExceeded`] when the service still
/// offers a continuation token after `limits.max_pages` pages, plus any
/// transport or service error.
pub async fn collect_candidates<T>(
    transport: &T,
    query: &SearchQuery,
    limits: PageLimits,
) -> Result<Vec<Restaurant>, PlaceSearchError>
where
    T: PlacesTransport + ?Sized,
{
    let mut restaurants = Vec::new();
    let mut token: Option<String> = None;
    let mut pages = 0_usize;
    loop {
        if token.is_some() && !limits.token_delay.is_zero() {
            tokio::time::sleep(limits.token_delay).await;
        }
        let fetched = transport.nearby(query, token.as_deref()).await?;
        pages = pages.saturating_add(1);
        let (page, next) = fetched.body.into_page(&fetched.url)?;
        log::debug!(
            "page {pages} of nearby search {} returned {} candidates",
            fetched.url,
            page.len()
        );
        restaurants.extend(page);
        match next {
            Some(_) if pages >= limits.max_pages => {
                log::warn!("nearby search still paging after {pages} pages");
                return Err(PlaceSearchError::PageLimitExceeded {
                    max_pages: limits.max_pages,
                });
            }
            Some(next_token) => token = Some(next_token),
            None => break,
        }
    }

    for restaurant in &mut restaurants {
        let fetched = transport.details(&restaurant.place_id).await?;
        if let Some(details) = fetched.body.into_details(&fetched.url)? {
            details.merge_into(restaurant);
        }
    }
    Ok(restaurants)
}
