use std::error::Error as StdError;

use thiserror::Error;

use crate::{PlaceId, UserId};

/// Errors raised by the store traits.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The referenced user is not registered.
    #[error("user {user} is not registered")]
    UnknownUser {
        /// Missing user.
        user: UserId,
    },
    /// The referenced restaurant is not known to the store.
    #[error("restaurant {place_id} is not known")]
    UnknownRestaurant {
        /// Missing restaurant.
        place_id: PlaceId,
    },
    /// The user already rated this restaurant.
    #[error("{user} has already rated restaurant {place_id}")]
    DuplicateRating {
        /// Author of the existing rating.
        user: UserId,
        /// Rated restaurant.
        place_id: PlaceId,
    },
    /// A user with this address is already registered.
    #[error("user {user} is already registered")]
    DuplicateUser {
        /// Existing user.
        user: UserId,
    },
    /// The storage backend failed.
    #[error("store operation `{operation}` failed: {source}")]
    Backend {
        /// Short name of the failed operation.
        operation: &'static str,
        /// Underlying backend error.
        #[source]
        source: Box<dyn StdError + Send + Sync + 'static>,
    },
}

impl StoreError {
    /// Wrap a backend error with the name of the failed operation.
    #[must_use]
    pub fn backend<E>(operation: &'static str, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Backend {
            operation,
            source: Box::new(source),
        }
    }
}
