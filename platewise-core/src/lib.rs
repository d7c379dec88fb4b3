//! Core domain for Platewise, a weighted random restaurant picker.
//!
//! The crate holds the validated domain types ([`Restaurant`], [`Rating`],
//! [`FilterCriteria`]), the traits behind which the place search and the
//! relational store sit ([`PlaceSearch`], [`RatingStore`],
//! [`RestaurantStore`], [`UserStore`]), the selection pipeline and bearer
//! token sessions. Concrete adapters live in `platewise-data`.

#![forbid(unsafe_code)]

mod filter;
mod rating;
mod restaurant;
pub mod search;
pub mod selection;
pub mod session;
pub mod store;
mod user;

#[doc(hidden)]
pub mod test_support;

pub use filter::{Cuisine, DEFAULT_RADIUS_M, FilterCriteria, FilterError};
pub use rating::{NewRating, Rating, RatingUpdate};
pub use restaurant::{PlaceId, PlaceIdError, Restaurant, Stars, StarsError};
pub use search::{PlaceSearch, PlaceSearchError, SearchQuery};
pub use selection::{
    Selection, SelectionError, SelectionPipeline, VisitOutcome, apply_filter, attach_own_ratings,
    draw, record_visit, weight,
};
pub use session::{
    AuthError, Claims, DEFAULT_TOKEN_TTL_MINUTES, SessionError, SessionKeys, authenticate, issue,
    issue_at, resolve_user,
};
pub use store::{RatingStore, RestaurantStore, StoreError, UserStore};
pub use user::{NewUser, User, UserId, UserIdError};
