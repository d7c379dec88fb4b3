//! Adapters behind the `platewise-core` seams.
//!
//! - [`places`]: place search over the Google Places web service.
//! - [`store`]: SQLite persistence for users, restaurants and ratings.
//!
//! Domain rules stay in `platewise-core`; this crate only moves data across
//! the network and into the database.
#![forbid(unsafe_code)]

pub mod places;
pub mod store;

pub use places::{HttpPlaceSearch, HttpPlaceSearchConfig, PlaceSearchBuildError};
pub use store::{SqliteStore, SqliteStoreError};
