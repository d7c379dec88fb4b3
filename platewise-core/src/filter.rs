//! Caller-supplied selection criteria.

use std::{fmt, str::FromStr};

use geo::Coord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::search::SearchQuery;

/// Search radius applied when the caller does not supply one.
pub const DEFAULT_RADIUS_M: u32 = 5_000;

/// Free-text cuisine keyword passed to the place search, such as `"pizza"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cuisine(String);

impl Cuisine {
    /// Borrow the keyword.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Cuisine {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(FilterError::EmptyCuisine);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl TryFrom<String> for Cuisine {
    type Error = FilterError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Cuisine> for String {
    fn from(value: Cuisine) -> Self {
        value.0
    }
}

impl fmt::Display for Cuisine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors raised while building [`FilterCriteria`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    /// The cuisine keyword was blank.
    #[error("cuisine keyword must not be empty")]
    EmptyCuisine,
    /// The search radius was zero.
    #[error("search radius must be positive")]
    ZeroRadius,
    /// The minimum rating was outside `0.0..=5.0` or not a number.
    #[error("minimum rating {value} is outside 0.0..=5.0")]
    MinRatingOutOfRange {
        /// Rejected threshold.
        value: f32,
    },
    /// The origin had a non-finite or out-of-range coordinate.
    #[error("origin ({lat}, {lng}) is not a valid WGS84 position")]
    InvalidOrigin {
        /// Latitude supplied.
        lat: f64,
        /// Longitude supplied.
        lng: f64,
    },
}

/// Criteria for one selection: what to search for, where, and how good the
/// candidates must be.
///
/// # Examples
///
/// ```
/// use geo::Coord;
/// use platewise_core::{FilterCriteria, DEFAULT_RADIUS_M};
///
/// # fn main() -> Result<(), platewise_core::FilterError> {
/// let criteria = FilterCriteria::new("pizza".parse()?, Coord { x: 13.4, y: 52.5 })?
///     .with_min_rating(4.0)?;
/// assert_eq!(criteria.radius_m(), DEFAULT_RADIUS_M);
/// assert_eq!(criteria.min_rating(), 4.0);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterCriteria {
    cuisine: Cuisine,
    origin: Coord<f64>,
    radius_m: u32,
    min_rating: f32,
}

impl FilterCriteria {
    /// Criteria with the default radius and no rating threshold.
    ///
    /// # Errors
    /// Returns [`FilterError::InvalidOrigin`] when `origin` is not a finite
    /// WGS84 position.
    pub fn new(cuisine: Cuisine, origin: Coord<f64>) -> Result<Self, FilterError> {
        let valid = origin.x.is_finite()
            && origin.y.is_finite()
            && (-180.0..=180.0).contains(&origin.x)
            && (-90.0..=90.0).contains(&origin.y);
        if !valid {
            return Err(FilterError::InvalidOrigin {
                lat: origin.y,
                lng: origin.x,
            });
        }
        Ok(Self {
            cuisine,
            origin,
            radius_m: DEFAULT_RADIUS_M,
            min_rating: 0.0,
        })
    }

    /// Replace the search radius.
    ///
    /// # Errors
    /// Returns [`FilterError::ZeroRadius`] for a zero radius.
    pub fn with_radius(mut self, radius_m: u32) -> Result<Self, FilterError> {
        if radius_m == 0 {
            return Err(FilterError::ZeroRadius);
        }
        self.radius_m = radius_m;
        Ok(self)
    }

    /// Replace the minimum external rating.
    ///
    /// # Errors
    /// Returns [`FilterError::MinRatingOutOfRange`] unless
    /// `0.0 <= min_rating <= 5.0`.
    pub fn with_min_rating(mut self, min_rating: f32) -> Result<Self, FilterError> {
        if !(0.0..=5.0).contains(&min_rating) {
            return Err(FilterError::MinRatingOutOfRange { value: min_rating });
        }
        self.min_rating = min_rating;
        Ok(self)
    }

    /// Cuisine keyword.
    #[must_use]
    pub const fn cuisine(&self) -> &Cuisine {
        &self.cuisine
    }

    /// Search centre.
    #[must_use]
    pub const fn origin(&self) -> Coord<f64> {
        self.origin
    }

    /// Search radius in metres.
    #[must_use]
    pub const fn radius_m(&self) -> u32 {
        self.radius_m
    }

    /// Minimum external rating a candidate must reach.
    #[must_use]
    pub const fn min_rating(&self) -> f32 {
        self.min_rating
    }

    /// The place-search request implied by these criteria.
    #[must_use]
    pub fn search_query(&self) -> SearchQuery {
        SearchQuery {
            cuisine: self.cuisine.clone(),
            origin: self.origin,
            radius_m: self.radius_m,
        }
    }
}
