//! A user's rating of a restaurant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{PlaceId, Stars, UserId};

/// A stored rating. At most one exists per `(user, place_id)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    /// Author of the rating.
    pub user: UserId,
    /// Rated restaurant.
    pub place_id: PlaceId,
    /// Star rating.
    pub rating: Stars,
    /// Free-text comment; empty when none was given.
    pub comment: String,
    /// Time the rating was first created.
    pub created_at: DateTime<Utc>,
}

/// Input for creating a rating; the store assigns the timestamp.
///
/// # Examples
/// ```
/// use platewise_core::{NewRating, PlaceId, Stars, UserId};
///
/// let rating = NewRating::new(UserId::new("ada@example.com")?, PlaceId::new("abc")?)
///     .with_rating(Stars::MAX)
///     .with_comment("great pasta");
/// assert_eq!(rating.rating, Stars::MAX);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRating {
    /// Author of the rating.
    pub user: UserId,
    /// Rated restaurant.
    pub place_id: PlaceId,
    /// Star rating.
    pub rating: Stars,
    /// Free-text comment.
    pub comment: String,
}

impl NewRating {
    /// A rating of [`Stars::ZERO`] with an empty comment, as recorded for a
    /// first visit.
    #[must_use]
    pub const fn new(user: UserId, place_id: PlaceId) -> Self {
        Self {
            user,
            place_id,
            rating: Stars::ZERO,
            comment: String::new(),
        }
    }

    /// Set the star rating.
    #[must_use]
    pub const fn with_rating(mut self, rating: Stars) -> Self {
        self.rating = rating;
        self
    }

    /// Set the comment.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }
}

/// Replacement values for an existing rating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingUpdate {
    /// New star rating.
    pub rating: Stars,
    /// New comment.
    pub comment: String,
}

impl RatingUpdate {
    /// Build an update from its parts.
    #[must_use]
    pub fn new(rating: Stars, comment: impl Into<String>) -> Self {
        Self {
            rating,
            comment: comment.into(),
        }
    }
}
