//! Look up restaurant candidates around a location.
//!
//! The [`PlaceSearch`] trait abstracts the third-party place-search service.
//! Implementations return fully enriched candidates: every page of the
//! nearby search is collected and each result carries its detail fields.
//! Any failure aborts the whole search.

mod error;
mod provider;

pub use error::PlaceSearchError;
pub use provider::{PlaceSearch, SearchQuery};
