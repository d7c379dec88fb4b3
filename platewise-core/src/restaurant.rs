//! Restaurant candidates returned by a place search.

use std::fmt;

use geo::Coord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque place identifier issued by the place-search service.
///
/// # Examples
/// ```
/// use platewise_core::PlaceId;
///
/// let id = PlaceId::new("ChIJN1t_tDeuEmsRUsoyG83frY4")?;
/// assert_eq!(id.as_str(), "ChIJN1t_tDeuEmsRUsoyG83frY4");
/// # Ok::<(), platewise_core::PlaceIdError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlaceId(String);

/// Errors returned by [`PlaceId::new`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaceIdError {
    /// The identifier was empty or whitespace.
    #[error("place id must not be empty")]
    Empty,
}

impl PlaceId {
    /// Validate and wrap a place identifier.
    ///
    /// # Errors
    /// Returns [`PlaceIdError::Empty`] for blank input.
    pub fn new(raw: impl Into<String>) -> Result<Self, PlaceIdError> {
        let owned = raw.into();
        let trimmed = owned.trim();
        if trimmed.is_empty() {
            return Err(PlaceIdError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PlaceId {
    type Error = PlaceIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PlaceId> for String {
    fn from(value: PlaceId) -> Self {
        value.0
    }
}

impl fmt::Display for PlaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A user's own rating on a `0..=5` scale.
///
/// # Examples
/// ```
/// use platewise_core::Stars;
///
/// let stars = Stars::new(4)?;
/// assert_eq!(stars.get(), 4);
/// assert!(Stars::new(6).is_err());
/// # Ok::<(), platewise_core::StarsError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Stars(u8);

/// Errors returned by [`Stars::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StarsError {
    /// The value exceeded [`Stars::MAX`].
    #[error("rating {value} is outside 0..=5")]
    OutOfRange {
        /// Rejected value.
        value: u8,
    },
}

impl Stars {
    /// Lowest rating; also used for visits that have not been rated yet.
    pub const ZERO: Self = Self(0);
    /// Highest rating.
    pub const MAX: Self = Self(5);

    /// Validate a rating value.
    ///
    /// # Errors
    /// Returns [`StarsError::OutOfRange`] when `value > 5`.
    pub const fn new(value: u8) -> Result<Self, StarsError> {
        if value > Self::MAX.0 {
            return Err(StarsError::OutOfRange { value });
        }
        Ok(Self(value))
    }

    /// Return the raw value.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Stars {
    type Error = StarsError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Stars> for u8 {
    fn from(value: Stars) -> Self {
        value.0
    }
}

impl fmt::Display for Stars {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A restaurant returned by the place search, before or after rating
/// enrichment.
///
/// Coordinates are WGS84 with `x = longitude` and `y = latitude`. Only
/// `own_rating` changes after a search returns; the remaining fields are
/// filled in by the search client.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use platewise_core::{PlaceId, Restaurant};
///
/// let place = PlaceId::new("abc")?;
/// let restaurant = Restaurant::new(place, "Trattoria", Coord { x: 13.4, y: 52.5 })
///     .with_external_rating(4.5);
/// assert_eq!(restaurant.external_rating, Some(4.5));
/// assert!(restaurant.own_rating.is_none());
/// # Ok::<(), platewise_core::PlaceIdError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    /// Identifier issued by the place-search service.
    pub place_id: PlaceId,
    /// Display name.
    pub name: String,
    /// Geographic position.
    pub location: Coord<f64>,
    /// Popularity score supplied by the place-search service (`0.0..=5.0`).
    #[serde(default)]
    pub external_rating: Option<f32>,
    /// Street address; the formatted address once details are merged in.
    #[serde(default)]
    pub address: Option<String>,
    /// Restaurant homepage.
    #[serde(default)]
    pub website: Option<String>,
    /// International phone number.
    #[serde(default)]
    pub phone_number: Option<String>,
    /// Link to the restaurant on the provider's map.
    #[serde(default)]
    pub maps_url: Option<String>,
    /// The requesting user's own rating, attached during enrichment.
    #[serde(default)]
    pub own_rating: Option<Stars>,
}

impl Restaurant {
    /// Construct a candidate with no ratings or detail fields.
    #[must_use]
    pub fn new(place_id: PlaceId, name: impl Into<String>, location: Coord<f64>) -> Self {
        Self {
            place_id,
            name: name.into(),
            location,
            external_rating: None,
            address: None,
            website: None,
            phone_number: None,
            maps_url: None,
            own_rating: None,
        }
    }

    /// Set the external rating while returning `self` for chaining.
    #[must_use]
    pub const fn with_external_rating(mut self, rating: f32) -> Self {
        self.external_rating = Some(rating);
        self
    }

    /// Set the own rating while returning `self` for chaining.
    #[must_use]
    pub const fn with_own_rating(mut self, rating: Stars) -> Self {
        self.own_rating = Some(rating);
        self
    }

    /// Set the address while returning `self` for chaining.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// External rating with absent, negative or non-finite values read as
    /// zero.
    ///
    /// # Examples
    /// ```
    /// use geo::Coord;
    /// use platewise_core::{PlaceId, Restaurant};
    ///
    /// let place = PlaceId::new("abc")?;
    /// let restaurant = Restaurant::new(place, "Imbiss", Coord { x: 0.0, y: 0.0 });
    /// assert_eq!(restaurant.external_rating_or_zero(), 0.0);
    /// # Ok::<(), platewise_core::PlaceIdError>(())
    /// ```
    #[must_use]
    pub fn external_rating_or_zero(&self) -> f32 {
        match self.external_rating {
            Some(value) if value.is_finite() && value > 0.0 => value,
            _ => 0.0,
        }
    }
}
