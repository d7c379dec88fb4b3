//! Place search over the Google Places web service.
//!
//! [`HttpPlaceSearch`] implements [`platewise_core::PlaceSearch`]. A search
//! runs the nearby-search endpoint page by page, following continuation
//! tokens up to a configured bound, then fetches the detail fields of every
//! candidate. The paging loop lives behind the [`PlacesTransport`] seam so it
//! can be exercised without a network.

mod client;
mod paging;
#[doc(hidden)]
pub mod test_support;
pub mod wire;

pub use client::{
    DEFAULT_BASE_URL, DEFAULT_USER_AGENT, HttpPlaceSearch, HttpPlaceSearchConfig,
    PlaceSearchBuildError,
};
pub use paging::{Fetched, PageLimits, PlacesTransport, collect_candidates};
