//! Property-based tests for the selection stages.
//!
//! # Invariants tested
//!
//! - **Threshold:** every filtered candidate reaches the minimum rating, and
//!   candidates without an external rating only survive a zero threshold.
//! - **Order:** filtering keeps the relative order of the survivors.
//! - **Monotonic weight:** raising either rating never lowers the weight.
//! - **Draw range:** a draw always returns an index into the candidates and
//!   never picks a zero-weight candidate while a positive one exists.

use geo::Coord;
use platewise_core::test_support::restaurant;
use platewise_core::{FilterCriteria, Restaurant, Stars, apply_filter, draw, weight};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn criteria(min_rating: f32) -> FilterCriteria {
    FilterCriteria::new("pizza".parse().expect("cuisine"), Coord { x: 0.0, y: 0.0 })
        .expect("criteria")
        .with_min_rating(min_rating)
        .expect("threshold")
}

fn candidate_strategy() -> impl Strategy<Value = Option<f32>> {
    prop_oneof![Just(None), (0.0_f32..=5.0_f32).prop_map(Some)]
}

fn candidates_from(ratings: &[Option<f32>]) -> Vec<Restaurant> {
    ratings
        .iter()
        .enumerate()
        .map(|(index, rating)| restaurant(&format!("r{index}"), *rating))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: survivors reach the threshold; unrated survivors imply a
    /// zero threshold.
    #[test]
    fn filtered_candidates_reach_threshold(
        ratings in prop::collection::vec(candidate_strategy(), 0..20),
        min_rating in 0.0_f32..=5.0_f32,
    ) {
        let candidates = candidates_from(&ratings);
        let kept = apply_filter(&candidates, &criteria(min_rating));
        for survivor in &kept {
            match survivor.external_rating {
                Some(value) => prop_assert!(value >= min_rating),
                None => prop_assert!(min_rating <= 0.0),
            }
        }
    }

    /// Property: filtering preserves the relative order of candidates.
    #[test]
    fn filter_preserves_order(
        ratings in prop::collection::vec(candidate_strategy(), 0..20),
        min_rating in 0.0_f32..=5.0_f32,
    ) {
        let candidates = candidates_from(&ratings);
        let kept = apply_filter(&candidates, &criteria(min_rating));
        let positions: Vec<usize> = kept
            .iter()
            .filter_map(|r| candidates.iter().position(|c| c.place_id == r.place_id))
            .collect();
        prop_assert!(positions.windows(2).all(|pair| pair.first() < pair.get(1)));
    }

    /// Property: weight is monotonic in both ratings.
    #[test]
    fn weight_is_monotonic(
        own in 0_u8..=5,
        own_step in 0_u8..=5,
        external in 0.0_f32..=5.0_f32,
        external_step in 0.0_f32..=5.0_f32,
    ) {
        let higher_own = own.saturating_add(own_step).min(5);
        let higher_external = external.max(external_step);
        let low = restaurant("a", Some(external))
            .with_own_rating(Stars::new(own).expect("stars"));
        let high = restaurant("a", Some(higher_external))
            .with_own_rating(Stars::new(higher_own).expect("stars"));
        prop_assert!(weight(&high) >= weight(&low));
    }

    /// Property: a draw indexes into the slice and skips zero weights when a
    /// positive weight exists.
    #[test]
    fn draw_returns_positive_weight_index(
        ratings in prop::collection::vec(candidate_strategy(), 1..20),
        seed in any::<u64>(),
    ) {
        let candidates = candidates_from(&ratings);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let index = draw(&candidates, &mut rng).expect("non-empty draw");
        let chosen = candidates.get(index);
        prop_assert!(chosen.is_some());
        let any_positive = candidates.iter().any(|c| weight(c) > 0.0);
        if any_positive {
            prop_assert!(chosen.is_some_and(|c| weight(c) > 0.0));
        }
    }
}
