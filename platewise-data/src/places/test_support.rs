//! Scripted transport for exercising the paging loop offline.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use platewise_core::{PlaceId, PlaceSearchError, SearchQuery};

use super::paging::{Fetched, PlacesTransport};
use super::wire::{DetailsResponse, NearbyResponse};

const NEARBY_URL: &str = "https://places.test/nearbysearch/json?key=REDACTED";
const DETAILS_URL: &str = "https://places.test/details/json?key=REDACTED";

/// Transport answering from queued pages and a details table.
///
/// Each `nearby` call pops the next queued page; an exhausted queue answers
/// with a `ZERO_RESULTS` page. Unknown place ids answer with an `OK` status
/// and no details.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    pages: RefCell<VecDeque<Result<NearbyResponse, PlaceSearchError>>>,
    details: HashMap<String, Result<DetailsResponse, PlaceSearchError>>,
    tokens: RefCell<Vec<Option<String>>>,
    detail_calls: RefCell<Vec<PlaceId>>,
}

impl ScriptedTransport {
    /// Queue a nearby-search page.
    #[must_use]
    pub fn with_page(mut self, page: NearbyResponse) -> Self {
        self.pages.get_mut().push_back(Ok(page));
        self
    }

    /// Queue a transport failure in place of a page.
    #[must_use]
    pub fn with_page_error(mut self, error: PlaceSearchError) -> Self {
        self.pages.get_mut().push_back(Err(error));
        self
    }

    /// Answer details lookups for `place_id` with `details`.
    #[must_use]
    pub fn with_details(mut self, place_id: &str, details: DetailsResponse) -> Self {
        self.details.insert(place_id.to_owned(), Ok(details));
        self
    }

    /// Answer details lookups for `place_id` with `error`.
    #[must_use]
    pub fn with_details_error(mut self, place_id: &str, error: PlaceSearchError) -> Self {
        self.details.insert(place_id.to_owned(), Err(error));
        self
    }

    /// Page tokens passed to each `nearby` call, in order.
    pub fn tokens(&self) -> Vec<Option<String>> {
        self.tokens.borrow().clone()
    }

    /// Place ids passed to each `details` call, in order.
    pub fn detail_calls(&self) -> Vec<PlaceId> {
        self.detail_calls.borrow().clone()
    }
}

#[async_trait(?Send)]
impl PlacesTransport for ScriptedTransport {
    async fn nearby(
        &self,
        _query: &SearchQuery,
        page_token: Option<&str>,
    ) -> Result<Fetched<NearbyResponse>, PlaceSearchError> {
        self.tokens.borrow_mut().push(page_token.map(str::to_owned));
        let next = self.pages.borrow_mut().pop_front();
        let body = match next {
            Some(page) => page?,
            None => NearbyResponse {
                status: "ZERO_RESULTS".to_owned(),
                ..NearbyResponse::default()
            },
        };
        Ok(Fetched {
            url: NEARBY_URL.to_owned(),
            body,
        })
    }

    async fn details(
        &self,
        place_id: &PlaceId,
    ) -> Result<Fetched<DetailsResponse>, PlaceSearchError> {
        self.detail_calls.borrow_mut().push(place_id.clone());
        let body = match self.details.get(place_id.as_str()) {
            Some(answer) => answer.clone()?,
            None => DetailsResponse {
                status: "OK".to_owned(),
                ..DetailsResponse::default()
            },
        };
        Ok(Fetched {
            url: DETAILS_URL.to_owned(),
            body,
        })
    }
}

/// Build a nearby-search page from `(place_id, rating)` pairs.
pub fn page(entries: &[(&str, Option<f32>)], next_page_token: Option<&str>) -> NearbyResponse {
    use super::wire::{Geometry, LatLng, NearbyResult};

    NearbyResponse {
        status: "OK".to_owned(),
        results: entries
            .iter()
            .map(|(place_id, rating)| NearbyResult {
                place_id: (*place_id).to_owned(),
                name: format!("Restaurant {place_id}"),
                geometry: Geometry {
                    location: LatLng { lat: 52.5, lng: 13.4 },
                },
                rating: *rating,
                vicinity: None,
            })
            .collect(),
        next_page_token: next_page_token.map(str::to_owned),
        error_message: None,
    }
}

/// Build a successful details response carrying a phone number and address.
pub fn details(phone: &str, address: &str) -> DetailsResponse {
    use super::wire::PlaceDetails;

    DetailsResponse {
        status: "OK".to_owned(),
        result: Some(PlaceDetails {
            international_phone_number: Some(phone.to_owned()),
            formatted_address: Some(address.to_owned()),
            ..PlaceDetails::default()
        }),
        error_message: None,
    }
}
