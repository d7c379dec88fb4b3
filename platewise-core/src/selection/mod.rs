//! Pick one restaurant from a search.
//!
//! The stages run in a fixed order:
//!
//! 1. [`apply_filter`] drops candidates below the minimum external rating.
//! 2. [`attach_own_ratings`] sets each candidate's `own_rating` from the
//!    requester's stored ratings.
//! 3. [`weight`] scores each candidate as `own * 4 + external * 2`.
//! 4. [`draw`] picks one index with probability proportional to its weight.
//! 5. [`record_visit`] stores a zero-star rating on the user's first visit.
//!
//! [`SelectionPipeline`] runs all of them against a [`crate::PlaceSearch`]
//! and a store.

mod draw;
mod error;
mod pipeline;

pub use draw::{apply_filter, attach_own_ratings, draw, weight};
pub use error::SelectionError;
pub use pipeline::{Selection, SelectionPipeline, VisitOutcome, record_visit};
