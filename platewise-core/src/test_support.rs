//! In-memory store and stub place search used by unit and behaviour tests.
#![expect(
    clippy::expect_used,
    reason = "fixture builders take literals and fail loudly on invalid ones"
)]

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;
use geo::Coord;

use crate::{
    NewRating, NewUser, PlaceId, PlaceSearch, PlaceSearchError, Rating, RatingStore, RatingUpdate,
    Restaurant, RestaurantStore, SearchQuery, StoreError, User, UserId, UserStore,
};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    restaurants: BTreeSet<PlaceId>,
    ratings: Vec<Rating>,
}

impl Tables {
    fn check_refs(&self, user: &UserId, place_id: &PlaceId) -> Result<(), StoreError> {
        if !self.users.contains_key(user) {
            return Err(StoreError::UnknownUser { user: user.clone() });
        }
        if !self.restaurants.contains(place_id) {
            return Err(StoreError::UnknownRestaurant {
                place_id: place_id.clone(),
            });
        }
        Ok(())
    }

    fn position(&self, user: &UserId, place_id: &PlaceId) -> Option<usize> {
        self.ratings
            .iter()
            .position(|r| &r.user == user && &r.place_id == place_id)
    }
}

/// Store implementing every store trait over in-memory tables.
///
/// Ratings are kept in insertion order, which doubles as creation order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RefCell<Tables>,
}

impl MemoryStore {
    /// Create a store with `users` registered and `places` known.
    #[must_use]
    pub fn with_fixtures<U, P>(users: U, places: P) -> Self
    where
        U: IntoIterator<Item = UserId>,
        P: IntoIterator<Item = PlaceId>,
    {
        let store = Self::default();
        {
            let mut tables = store.tables.borrow_mut();
            let now = Utc::now();
            for id in users {
                tables.users.insert(
                    id.clone(),
                    User {
                        id,
                        display_name: None,
                        created_at: now,
                    },
                );
            }
            tables.restaurants.extend(places);
        }
        store
    }
}

impl UserStore for MemoryStore {
    fn find_user(&self, user: &UserId) -> Result<Option<User>, StoreError> {
        Ok(self.tables.borrow().users.get(user).cloned())
    }

    fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.tables.borrow_mut();
        if tables.users.contains_key(&user.id) {
            return Err(StoreError::DuplicateUser { user: user.id });
        }
        let created = User {
            id: user.id,
            display_name: user.display_name,
            created_at: Utc::now(),
        };
        tables.users.insert(created.id.clone(), created.clone());
        Ok(created)
    }
}

impl RestaurantStore for MemoryStore {
    fn contains_restaurant(&self, place_id: &PlaceId) -> Result<bool, StoreError> {
        Ok(self.tables.borrow().restaurants.contains(place_id))
    }

    fn insert_restaurant(&self, place_id: &PlaceId) -> Result<bool, StoreError> {
        Ok(self.tables.borrow_mut().restaurants.insert(place_id.clone()))
    }
}

impl RatingStore for MemoryStore {
    fn find_rating(
        &self,
        user: &UserId,
        place_id: &PlaceId,
    ) -> Result<Option<Rating>, StoreError> {
        let tables = self.tables.borrow();
        Ok(tables
            .position(user, place_id)
            .and_then(|index| tables.ratings.get(index))
            .cloned())
    }

    fn create_rating(&self, rating: NewRating) -> Result<Rating, StoreError> {
        let mut tables = self.tables.borrow_mut();
        tables.check_refs(&rating.user, &rating.place_id)?;
        if tables.position(&rating.user, &rating.place_id).is_some() {
            return Err(StoreError::DuplicateRating {
                user: rating.user,
                place_id: rating.place_id,
            });
        }
        let stored = Rating {
            user: rating.user,
            place_id: rating.place_id,
            rating: rating.rating,
            comment: rating.comment,
            created_at: Utc::now(),
        };
        tables.ratings.push(stored.clone());
        Ok(stored)
    }

    fn update_rating(
        &self,
        user: &UserId,
        place_id: &PlaceId,
        update: RatingUpdate,
    ) -> Result<Option<Rating>, StoreError> {
        let mut tables = self.tables.borrow_mut();
        tables.check_refs(user, place_id)?;
        let Some(index) = tables.position(user, place_id) else {
            return Ok(None);
        };
        Ok(tables.ratings.get_mut(index).map(|existing| {
            existing.rating = update.rating;
            existing.comment = update.comment;
            existing.clone()
        }))
    }

    fn delete_rating(&self, user: &UserId, place_id: &PlaceId) -> Result<usize, StoreError> {
        let mut tables = self.tables.borrow_mut();
        let before = tables.ratings.len();
        tables
            .ratings
            .retain(|r| !(&r.user == user && &r.place_id == place_id));
        Ok(before.saturating_sub(tables.ratings.len()))
    }

    fn ratings_for_user(&self, user: &UserId) -> Result<Option<Vec<Rating>>, StoreError> {
        let tables = self.tables.borrow();
        if !tables.users.contains_key(user) {
            return Ok(None);
        }
        Ok(Some(
            tables
                .ratings
                .iter()
                .filter(|r| &r.user == user)
                .cloned()
                .collect(),
        ))
    }
}

/// `PlaceSearch` returning a fixed result list or a fixed error.
#[derive(Debug, Clone)]
pub struct StubPlaceSearch {
    response: Result<Vec<Restaurant>, PlaceSearchError>,
    calls: RefCell<Vec<SearchQuery>>,
}

impl StubPlaceSearch {
    /// Answer every query with `results`.
    #[must_use]
    pub const fn with_results(results: Vec<Restaurant>) -> Self {
        Self {
            response: Ok(results),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Fail every query with `error`.
    #[must_use]
    pub const fn with_error(error: PlaceSearchError) -> Self {
        Self {
            response: Err(error),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Queries received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<SearchQuery> {
        self.calls.borrow().clone()
    }
}

impl PlaceSearch for StubPlaceSearch {
    fn search(&self, query: &SearchQuery) -> Result<Vec<Restaurant>, PlaceSearchError> {
        self.calls.borrow_mut().push(query.clone());
        self.response.clone()
    }
}

/// Candidate whose place id and name are both `name`, located at the origin.
///
/// # Panics
/// Panics when `name` is blank.
#[must_use]
pub fn restaurant(name: &str, external_rating: Option<f32>) -> Restaurant {
    let place_id = PlaceId::new(name).expect("fixture place id must not be blank");
    let mut candidate = Restaurant::new(place_id, name, Coord { x: 0.0, y: 0.0 });
    candidate.external_rating = external_rating;
    candidate
}

/// Parse a fixture e-mail address.
///
/// # Panics
/// Panics when `email` is not an e-mail address.
#[must_use]
pub fn user_id(email: &str) -> UserId {
    UserId::new(email).expect("fixture e-mail must contain @")
}
