//! Google Places JSON response types for the nearby-search and place-details
//! endpoints.
//!
//! See: <https://developers.google.com/maps/documentation/places/web-service/search-nearby>

use geo::Coord;
use serde::Deserialize;

use platewise_core::{PlaceId, PlaceSearchError, Restaurant};

/// Service statuses that count as success. `ZERO_RESULTS` is an empty page,
/// not an error.
const SUCCESS_STATUSES: [&str; 2] = ["OK", "ZERO_RESULTS"];

/// Check a service status, turning anything but success into
/// [`PlaceSearchError::Service`].
fn check_status(
    status: &str,
    error_message: Option<&str>,
    url: &str,
) -> Result<(), PlaceSearchError> {
    if SUCCESS_STATUSES.contains(&status) {
        return Ok(());
    }
    Err(PlaceSearchError::Service {
        url: url.to_owned(),
        status: status.to_owned(),
        message: error_message.unwrap_or_default().to_owned(),
    })
}

/// One page of a nearby search.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NearbyResponse {
    /// Service status, for example `"OK"` or `"REQUEST_DENIED"`.
    pub status: String,
    /// Candidates on this page.
    #[serde(default)]
    pub results: Vec<NearbyResult>,
    /// Continuation token for the next page, absent on the last page.
    pub next_page_token: Option<String>,
    /// Error detail accompanying a failure status.
    pub error_message: Option<String>,
}

impl NearbyResponse {
    /// Validate the status and return the page's candidates with the
    /// continuation token, if any.
    ///
    /// # Errors
    /// Returns [`PlaceSearchError::Service`] for a failure status and
    /// [`PlaceSearchError::Parse`] for a result without a place id.
    pub fn into_page(
        self,
        url: &str,
    ) -> Result<(Vec<Restaurant>, Option<String>), PlaceSearchError> {
        check_status(&self.status, self.error_message.as_deref(), url)?;
        let restaurants = self
            .results
            .into_iter()
            .map(|result| result.into_restaurant(url))
            .collect::<Result<Vec<_>, _>>()?;
        let token = self.next_page_token.filter(|token| !token.trim().is_empty());
        Ok((restaurants, token))
    }
}

/// A candidate as listed by the nearby search.
#[derive(Debug, Clone, Deserialize)]
pub struct NearbyResult {
    /// Place identifier.
    pub place_id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Position of the place.
    pub geometry: Geometry,
    /// Popularity rating, `1.0..=5.0`, absent for unrated places.
    pub rating: Option<f32>,
    /// Short address.
    pub vicinity: Option<String>,
}

impl NearbyResult {
    fn into_restaurant(self, url: &str) -> Result<Restaurant, PlaceSearchError> {
        let place_id = PlaceId::new(self.place_id).map_err(|err| PlaceSearchError::Parse {
            url: url.to_owned(),
            message: err.to_string(),
        })?;
        let location = Coord {
            x: self.geometry.location.lng,
            y: self.geometry.location.lat,
        };
        let mut restaurant = Restaurant::new(place_id, self.name, location);
        restaurant.external_rating = self.rating;
        restaurant.address = self.vicinity;
        Ok(restaurant)
    }
}

/// Geometry wrapper around the place position.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Geometry {
    /// Position of the place.
    pub location: LatLng,
}

/// Latitude/longitude pair as sent by the service.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLng {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

/// Response of a place-details lookup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetailsResponse {
    /// Service status.
    pub status: String,
    /// Requested detail fields.
    pub result: Option<PlaceDetails>,
    /// Error detail accompanying a failure status.
    pub error_message: Option<String>,
}

impl DetailsResponse {
    /// Validate the status and return the details, if the service sent any.
    ///
    /// # Errors
    /// Returns [`PlaceSearchError::Service`] for a failure status.
    pub fn into_details(self, url: &str) -> Result<Option<PlaceDetails>, PlaceSearchError> {
        check_status(&self.status, self.error_message.as_deref(), url)?;
        Ok(self.result)
    }
}

/// Detail fields merged into a candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PlaceDetails {
    /// Restaurant homepage.
    pub website: Option<String>,
    /// Map link.
    pub url: Option<String>,
    /// International phone number.
    pub international_phone_number: Option<String>,
    /// Full formatted address.
    pub formatted_address: Option<String>,
}

impl PlaceDetails {
    /// Copy the detail fields onto `restaurant`. The formatted address
    /// replaces the short address; absent fields leave existing values alone.
    pub fn merge_into(self, restaurant: &mut Restaurant) {
        if self.website.is_some() {
            restaurant.website = self.website;
        }
        if self.url.is_some() {
            restaurant.maps_url = self.url;
        }
        if self.international_phone_number.is_some() {
            restaurant.phone_number = self.international_phone_number;
        }
        if self.formatted_address.is_some() {
            restaurant.address = self.formatted_address;
        }
    }
}
