use rand::distributions::WeightedError;
use thiserror::Error;

use crate::{PlaceSearchError, StoreError};

/// Errors raised while selecting a restaurant.
#[derive(Debug, Error)]
pub enum SelectionError {
    /// No candidate survived the search and filter stages.
    #[error("no restaurant matches the criteria")]
    NoCandidates,
    /// The place search failed; partial results were discarded.
    #[error("cannot reach external search service")]
    SearchUnavailable(#[source] PlaceSearchError),
    /// A store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The weight vector could not be sampled.
    #[error("invalid candidate weights: {0}")]
    Weights(#[from] WeightedError),
}

impl From<PlaceSearchError> for SelectionError {
    fn from(value: PlaceSearchError) -> Self {
        Self::SearchUnavailable(value)
    }
}
