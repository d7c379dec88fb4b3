//! Filter, enrichment, weighting and the weighted draw.

use rand::{
    Rng,
    distributions::{Distribution, WeightedError, WeightedIndex},
};

use crate::{RatingStore, Restaurant, StoreError, UserId, filter::FilterCriteria};

use super::error::SelectionError;

const OWN_RATING_FACTOR: f64 = 4.0;
const EXTERNAL_RATING_FACTOR: f64 = 2.0;

/// Keep the candidates whose external rating reaches the criteria's
/// threshold, preserving order.
///
/// A missing external rating counts as zero, so unrated candidates only pass
/// a zero threshold. The input is left untouched.
///
/// # Examples
///
/// ```
/// use geo::Coord;
/// use platewise_core::{FilterCriteria, apply_filter, test_support::restaurant};
///
/// # fn main() -> Result<(), platewise_core::FilterError> {
/// let criteria = FilterCriteria::new("pizza".parse()?, Coord { x: 0.0, y: 0.0 })?
///     .with_min_rating(4.0)?;
/// let candidates = vec![
///     restaurant("a", Some(5.0)),
///     restaurant("b", Some(3.0)),
///     restaurant("c", Some(4.0)),
/// ];
/// let kept: Vec<_> = apply_filter(&candidates, &criteria)
///     .into_iter()
///     .map(|r| r.name)
///     .collect();
/// assert_eq!(kept, ["a", "c"]);
/// assert_eq!(candidates.len(), 3);
/// # Ok(())
/// # }
/// ```
#[must_use]
pub fn apply_filter(candidates: &[Restaurant], criteria: &FilterCriteria) -> Vec<Restaurant> {
    let threshold = criteria.min_rating();
    candidates
        .iter()
        .filter(|candidate| candidate.external_rating_or_zero() >= threshold)
        .cloned()
        .collect()
}

/// Set each candidate's `own_rating` to `user`'s stored rating, clearing it
/// where the user has none. Running it twice gives the same result.
///
/// # Errors
/// Propagates the first store failure; candidates before it are already
/// updated.
pub fn attach_own_ratings<S>(
    store: &S,
    user: &UserId,
    candidates: &mut [Restaurant],
) -> Result<(), StoreError>
where
    S: RatingStore + ?Sized,
{
    for candidate in candidates.iter_mut() {
        candidate.own_rating = store
            .find_rating(user, &candidate.place_id)?
            .map(|stored| stored.rating);
    }
    Ok(())
}

/// Selection weight of a candidate: `own * 4 + external * 2`.
///
/// Missing ratings count as zero, as do negative or non-finite external
/// ratings. A zero weight is valid.
///
/// # Examples
///
/// ```
/// use platewise_core::{Stars, test_support::restaurant, weight};
///
/// assert_eq!(weight(&restaurant("a", Some(5.0))), 10.0);
/// let rated = restaurant("b", Some(3.0)).with_own_rating(Stars::new(2)?);
/// assert_eq!(weight(&rated), 14.0);
/// # Ok::<(), platewise_core::StarsError>(())
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "the weight is a linear blend of the two ratings"
)]
pub fn weight(candidate: &Restaurant) -> f64 {
    let own = candidate.own_rating.map_or(0.0, |stars| f64::from(stars.get()));
    let external = f64::from(candidate.external_rating_or_zero());
    own * OWN_RATING_FACTOR + external * EXTERNAL_RATING_FACTOR
}

/// Draw the index of one candidate with probability proportional to its
/// [`weight`].
///
/// When every weight is zero each candidate is equally likely.
///
/// # Errors
/// Returns [`SelectionError::NoCandidates`] for an empty slice.
pub fn draw<R>(candidates: &[Restaurant], rng: &mut R) -> Result<usize, SelectionError>
where
    R: Rng + ?Sized,
{
    if candidates.is_empty() {
        return Err(SelectionError::NoCandidates);
    }
    let weights: Vec<f64> = candidates.iter().map(weight).collect();
    match WeightedIndex::new(&weights) {
        Ok(distribution) => Ok(distribution.sample(rng)),
        Err(WeightedError::AllWeightsZero) => {
            log::debug!(
                "all {} candidates weigh zero; drawing uniformly",
                candidates.len()
            );
            Ok(rng.gen_range(0..candidates.len()))
        }
        Err(err) => Err(SelectionError::Weights(err)),
    }
}
