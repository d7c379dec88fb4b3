//! Facade crate for Platewise, a weighted random restaurant picker.
//!
//! This crate re-exports the core domain types and, behind the `data`
//! feature, the HTTP place search and SQLite store adapters.

#![forbid(unsafe_code)]

pub use platewise_core::{
    AuthError, Cuisine, FilterCriteria, FilterError, NewRating, NewUser, PlaceId, PlaceSearch,
    PlaceSearchError, Rating, RatingStore, RatingUpdate, Restaurant, RestaurantStore,
    SearchQuery, Selection, SelectionError, SelectionPipeline, SessionKeys, Stars, StoreError,
    User, UserId, UserStore, VisitOutcome,
};

#[cfg(feature = "data")]
pub use platewise_data::{
    HttpPlaceSearch, HttpPlaceSearchConfig, PlaceSearchBuildError, SqliteStore, SqliteStoreError,
};
