//! End-to-end selection and visit bookkeeping.

use rand::Rng;
use serde::Serialize;

use crate::{
    FilterCriteria, NewRating, PlaceSearch, Rating, RatingStore, Restaurant, RestaurantStore,
    StoreError, UserId, UserStore,
};

use super::{
    draw::{apply_filter, attach_own_ratings, draw, weight},
    error::SelectionError,
};

/// What [`record_visit`] did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "rating", rename_all = "snake_case")]
pub enum VisitOutcome {
    /// First visit: a zero-star rating was created.
    Recorded(Rating),
    /// The user had rated the restaurant before; nothing changed.
    AlreadyRated,
}

/// Record that `user` visited `restaurant`.
///
/// On a first visit the restaurant is registered if the store does not know
/// it yet and a rating of [`crate::Stars::ZERO`] with an empty comment is
/// created. Visiting an already rated restaurant changes nothing.
///
/// The user is checked before anything is written, so a rejected visit
/// leaves the store untouched.
///
/// # Errors
/// Returns [`StoreError::UnknownUser`] when `user` is not registered, or any
/// backend failure.
pub fn record_visit<S>(
    store: &S,
    user: &UserId,
    restaurant: &Restaurant,
) -> Result<VisitOutcome, StoreError>
where
    S: RatingStore + RestaurantStore + UserStore + ?Sized,
{
    let place_id = &restaurant.place_id;
    if store.find_user(user)?.is_none() {
        return Err(StoreError::UnknownUser { user: user.clone() });
    }
    if store.find_rating(user, place_id)?.is_some() {
        return Ok(VisitOutcome::AlreadyRated);
    }
    if store.insert_restaurant(place_id)? {
        log::debug!("registered restaurant {place_id}");
    }
    let rating = store.create_rating(NewRating::new(user.clone(), place_id.clone()))?;
    log::info!("recorded first visit of {user} at {place_id}");
    Ok(VisitOutcome::Recorded(rating))
}

/// The outcome of one selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    /// The chosen restaurant, enriched with the user's own rating as it was
    /// before the visit was recorded.
    pub restaurant: Restaurant,
    /// Weight the restaurant was drawn with.
    pub weight: f64,
    /// Number of candidates that took part in the draw.
    pub candidates: usize,
    /// Bookkeeping performed for the visit.
    pub visit: VisitOutcome,
}

/// Runs search, filter, enrichment, draw and bookkeeping for one request.
///
/// # Examples
///
/// ```
/// use geo::Coord;
/// use platewise_core::{
///     FilterCriteria, NewUser, SelectionPipeline, UserId, UserStore, VisitOutcome,
///     test_support::{MemoryStore, StubPlaceSearch, restaurant},
/// };
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let search = StubPlaceSearch::with_results(vec![restaurant("a", Some(4.5))]);
/// let store = MemoryStore::default();
/// let user = UserId::new("ada@example.com")?;
/// store.insert_user(NewUser::new(user.clone()))?;
///
/// let criteria = FilterCriteria::new("pizza".parse()?, Coord { x: 13.4, y: 52.5 })?;
/// let pipeline = SelectionPipeline::new(&search, &store);
/// let selection = pipeline.select(&user, &criteria, &mut ChaCha8Rng::seed_from_u64(1))?;
/// assert_eq!(selection.restaurant.name, "a");
/// assert!(matches!(selection.visit, VisitOutcome::Recorded(_)));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SelectionPipeline<'a, P: ?Sized, S: ?Sized> {
    search: &'a P,
    store: &'a S,
}

impl<'a, P, S> SelectionPipeline<'a, P, S>
where
    P: PlaceSearch + ?Sized,
    S: RatingStore + RestaurantStore + UserStore + ?Sized,
{
    /// Bind a place search and a store for one request.
    #[must_use]
    pub const fn new(search: &'a P, store: &'a S) -> Self {
        Self { search, store }
    }

    /// Search, filter and enrich without drawing.
    ///
    /// # Errors
    /// Returns [`SelectionError::SearchUnavailable`] when the search fails and
    /// [`SelectionError::Store`] when rating lookups fail.
    pub fn candidates(
        &self,
        user: &UserId,
        criteria: &FilterCriteria,
    ) -> Result<Vec<Restaurant>, SelectionError> {
        let query = criteria.search_query();
        let found = self.search.search(&query).map_err(|err| {
            log::warn!("place search for {} failed: {err}", query.cuisine);
            SelectionError::SearchUnavailable(err)
        })?;
        let mut kept = apply_filter(&found, criteria);
        log::debug!(
            "{} of {} candidates reach rating {}",
            kept.len(),
            found.len(),
            criteria.min_rating()
        );
        attach_own_ratings(self.store, user, &mut kept)?;
        Ok(kept)
    }

    /// Choose a restaurant for `user` and record the visit.
    ///
    /// # Errors
    /// Returns [`SelectionError::NoCandidates`] when nothing matches, plus
    /// the errors of [`Self::candidates`] and [`record_visit`].
    pub fn select<R>(
        &self,
        user: &UserId,
        criteria: &FilterCriteria,
        rng: &mut R,
    ) -> Result<Selection, SelectionError>
    where
        R: Rng + ?Sized,
    {
        let candidates = self.candidates(user, criteria)?;
        let total = candidates.len();
        let index = draw(&candidates, rng)?;
        let restaurant = candidates
            .into_iter()
            .nth(index)
            .ok_or(SelectionError::NoCandidates)?;
        let chosen_weight = weight(&restaurant);
        log::info!(
            "selected {} ({}) from {total} candidates with weight {chosen_weight}",
            restaurant.name,
            restaurant.place_id
        );
        let visit = record_visit(self.store, user, &restaurant)?;
        Ok(Selection {
            restaurant,
            weight: chosen_weight,
            candidates: total,
            visit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MemoryStore, StubPlaceSearch, restaurant};
    use crate::{NewUser, PlaceId, PlaceSearchError, Stars};
    use geo::Coord;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rstest::{fixture, rstest};

    #[fixture]
    fn user() -> UserId {
        UserId::new("ada@example.com").expect("user")
    }

    #[fixture]
    fn store(user: UserId) -> MemoryStore {
        let store = MemoryStore::default();
        store.insert_user(NewUser::new(user)).expect("user");
        store
    }

    fn criteria(min_rating: f32) -> FilterCriteria {
        FilterCriteria::new("pizza".parse().expect("cuisine"), Coord { x: 0.0, y: 0.0 })
            .expect("criteria")
            .with_min_rating(min_rating)
            .expect("threshold")
    }

    #[rstest]
    fn first_visit_records_restaurant_and_rating(store: MemoryStore, user: UserId) {
        let chosen = restaurant("a", Some(4.0));
        let outcome = record_visit(&store, &user, &chosen).expect("record");
        let VisitOutcome::Recorded(rating) = outcome else {
            panic!("expected a recorded visit");
        };
        assert_eq!(rating.rating, Stars::ZERO);
        assert!(rating.comment.is_empty());
        assert!(store.contains_restaurant(&chosen.place_id).expect("lookup"));
    }

    #[rstest]
    fn second_visit_is_a_no_op(store: MemoryStore, user: UserId) {
        let chosen = restaurant("a", Some(4.0));
        record_visit(&store, &user, &chosen).expect("first");
        let outcome = record_visit(&store, &user, &chosen).expect("second");
        assert_eq!(outcome, VisitOutcome::AlreadyRated);
        let ratings = store
            .ratings_for_user(&user)
            .expect("list")
            .expect("known user");
        assert_eq!(ratings.len(), 1);
    }

    #[rstest]
    fn search_failure_maps_to_unavailable(store: MemoryStore, user: UserId) {
        let search = StubPlaceSearch::with_error(PlaceSearchError::Network {
            url: "https://example.test".into(),
            message: "refused".into(),
        });
        let pipeline = SelectionPipeline::new(&search, &store);
        let err = pipeline
            .select(&user, &criteria(0.0), &mut ChaCha8Rng::seed_from_u64(1))
            .expect_err("search failure");
        assert!(matches!(err, SelectionError::SearchUnavailable(_)));
        assert_eq!(err.to_string(), "cannot reach external search service");
    }

    #[rstest]
    fn nothing_above_threshold_is_no_candidates(store: MemoryStore, user: UserId) {
        let search = StubPlaceSearch::with_results(vec![restaurant("a", Some(2.0))]);
        let pipeline = SelectionPipeline::new(&search, &store);
        let err = pipeline
            .select(&user, &criteria(3.0), &mut ChaCha8Rng::seed_from_u64(1))
            .expect_err("no candidates");
        assert!(matches!(err, SelectionError::NoCandidates));
    }

    #[rstest]
    fn unknown_user_surfaces_store_error() {
        let store = MemoryStore::default();
        let stranger = UserId::new("eve@example.com").expect("user");
        let search = StubPlaceSearch::with_results(vec![restaurant("a", Some(5.0))]);
        let pipeline = SelectionPipeline::new(&search, &store);
        let err = pipeline
            .select(&stranger, &criteria(0.0), &mut ChaCha8Rng::seed_from_u64(1))
            .expect_err("unknown user");
        assert!(matches!(
            err,
            SelectionError::Store(StoreError::UnknownUser { .. })
        ));
        let place_id = PlaceId::new("a").expect("place id");
        assert!(!store.contains_restaurant(&place_id).expect("lookup"));
    }

    #[rstest]
    fn rejected_visit_leaves_store_untouched() {
        let store = MemoryStore::default();
        let stranger = UserId::new("eve@example.com").expect("user");
        let chosen = restaurant("b", Some(3.0));
        let err = record_visit(&store, &stranger, &chosen).expect_err("unknown user");
        assert!(matches!(err, StoreError::UnknownUser { .. }));
        assert!(!store.contains_restaurant(&chosen.place_id).expect("lookup"));
    }

    #[rstest]
    fn seeded_selection_is_reproducible(user: UserId) {
        let results: Vec<_> = (1_u8..=5)
            .map(|i| restaurant(&format!("r{i}"), Some(f32::from(i))))
            .collect();
        let search = StubPlaceSearch::with_results(results);
        let pick = || {
            let store = MemoryStore::default();
            store.insert_user(NewUser::new(user.clone())).expect("user");
            SelectionPipeline::new(&search, &store)
                .select(&user, &criteria(0.0), &mut ChaCha8Rng::seed_from_u64(99))
                .expect("selection")
                .restaurant
                .place_id
        };
        assert_eq!(pick(), pick());
    }
}
