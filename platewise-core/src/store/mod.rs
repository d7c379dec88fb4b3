//! Persistence traits for users, restaurants and ratings.
//!
//! Three narrow traits cover the relational store: [`UserStore`] for
//! registered users, [`RestaurantStore`] for the set of known place ids and
//! [`RatingStore`] for one rating per `(user, restaurant)` pair. A backend
//! usually implements all three on one type so that a request works against a
//! single connection.
//!
//! Referential integrity is checked explicitly before mutating: creating or
//! updating a rating for an unknown user or restaurant is rejected with a
//! distinct [`StoreError`] variant rather than a generic backend failure.
//! "Not found" on update and delete is part of the return type.

mod error;

pub use error::StoreError;

use crate::{NewRating, NewUser, PlaceId, Rating, RatingUpdate, User, UserId};

/// Read and write access to registered users.
pub trait UserStore {
    /// Return the user registered under `user`, if any.
    ///
    /// # Errors
    /// Returns [`StoreError::Backend`] when the backend fails.
    fn find_user(&self, user: &UserId) -> Result<Option<User>, StoreError>;

    /// Register a new user; the store assigns `created_at`.
    ///
    /// # Errors
    /// Returns [`StoreError::DuplicateUser`] when the address is already
    /// registered.
    fn insert_user(&self, user: NewUser) -> Result<User, StoreError>;
}

/// Access to the set of restaurants referenced by ratings.
pub trait RestaurantStore {
    /// Report whether `place_id` is known.
    ///
    /// # Errors
    /// Returns [`StoreError::Backend`] when the backend fails.
    fn contains_restaurant(&self, place_id: &PlaceId) -> Result<bool, StoreError>;

    /// Record `place_id`. Inserting a known restaurant is a no-op.
    ///
    /// Returns `true` when a new row was added.
    ///
    /// # Errors
    /// Returns [`StoreError::Backend`] when the backend fails.
    fn insert_restaurant(&self, place_id: &PlaceId) -> Result<bool, StoreError>;
}

/// Create, read, update and delete ratings.
///
/// # Examples
///
/// ```
/// use platewise_core::{NewRating, NewUser, PlaceId, RatingStore, RestaurantStore, UserStore, UserId};
/// use platewise_core::test_support::MemoryStore;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::default();
/// let user = UserId::new("ada@example.com")?;
/// let place = PlaceId::new("abc")?;
/// store.insert_user(NewUser::new(user.clone()))?;
/// store.insert_restaurant(&place)?;
///
/// store.create_rating(NewRating::new(user.clone(), place.clone()))?;
/// assert!(store.find_rating(&user, &place)?.is_some());
/// assert_eq!(store.delete_rating(&user, &place)?, 1);
/// assert_eq!(store.delete_rating(&user, &place)?, 0);
/// # Ok(())
/// # }
/// ```
pub trait RatingStore {
    /// Return the rating `user` gave `place_id`, if any.
    ///
    /// # Errors
    /// Returns [`StoreError::Backend`] when the backend fails.
    fn find_rating(&self, user: &UserId, place_id: &PlaceId)
    -> Result<Option<Rating>, StoreError>;

    /// Persist a new rating; the store assigns `created_at`.
    ///
    /// # Errors
    /// Returns [`StoreError::UnknownUser`] or [`StoreError::UnknownRestaurant`]
    /// when a referenced entity is missing, and
    /// [`StoreError::DuplicateRating`] when the pair is already rated.
    fn create_rating(&self, rating: NewRating) -> Result<Rating, StoreError>;

    /// Replace the rating and comment of an existing rating.
    ///
    /// Returns `None` without changing anything when the pair has no rating.
    ///
    /// # Errors
    /// Returns [`StoreError::UnknownUser`] or [`StoreError::UnknownRestaurant`]
    /// when a referenced entity is missing.
    fn update_rating(
        &self,
        user: &UserId,
        place_id: &PlaceId,
        update: RatingUpdate,
    ) -> Result<Option<Rating>, StoreError>;

    /// Remove the pair's rating and return the number of removed rows.
    ///
    /// # Errors
    /// Returns [`StoreError::Backend`] when the backend fails.
    fn delete_rating(&self, user: &UserId, place_id: &PlaceId) -> Result<usize, StoreError>;

    /// All ratings by `user`, oldest first, or `None` when the user is not
    /// registered.
    ///
    /// # Errors
    /// Returns [`StoreError::Backend`] when the backend fails.
    fn ratings_for_user(&self, user: &UserId) -> Result<Option<Vec<Rating>>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Stars;
    use crate::test_support::MemoryStore;
    use rstest::{fixture, rstest};

    struct Seeded {
        store: MemoryStore,
        user: UserId,
        place: PlaceId,
    }

    #[fixture]
    fn seeded() -> Seeded {
        let store = MemoryStore::default();
        let user = UserId::new("ada@example.com").expect("valid user");
        let place = PlaceId::new("abc").expect("valid place");
        store
            .insert_user(NewUser::new(user.clone()))
            .expect("insert user");
        store.insert_restaurant(&place).expect("insert restaurant");
        Seeded { store, user, place }
    }

    #[rstest]
    fn create_rejects_unknown_user(seeded: Seeded) {
        let stranger = UserId::new("eve@example.com").expect("valid user");
        let err = seeded
            .store
            .create_rating(NewRating::new(stranger.clone(), seeded.place))
            .expect_err("unknown user");
        assert!(matches!(err, StoreError::UnknownUser { user } if user == stranger));
    }

    #[rstest]
    fn create_rejects_unknown_restaurant(seeded: Seeded) {
        let other = PlaceId::new("zzz").expect("valid place");
        let err = seeded
            .store
            .create_rating(NewRating::new(seeded.user, other))
            .expect_err("unknown restaurant");
        assert!(matches!(err, StoreError::UnknownRestaurant { .. }));
    }

    #[rstest]
    fn duplicate_rating_keeps_single_entry(seeded: Seeded) {
        let rating = NewRating::new(seeded.user.clone(), seeded.place.clone());
        seeded
            .store
            .create_rating(rating.clone())
            .expect("first create");
        let err = seeded.store.create_rating(rating).expect_err("duplicate");
        assert!(matches!(err, StoreError::DuplicateRating { .. }));
        let all = seeded
            .store
            .ratings_for_user(&seeded.user)
            .expect("list")
            .expect("known user");
        assert_eq!(all.len(), 1);
    }

    #[rstest]
    fn update_missing_rating_is_none(seeded: Seeded) {
        let update = RatingUpdate::new(Stars::MAX, "changed");
        let result = seeded
            .store
            .update_rating(&seeded.user, &seeded.place, update)
            .expect("update");
        assert!(result.is_none());
    }

    #[rstest]
    fn update_replaces_rating_and_comment(seeded: Seeded) {
        seeded
            .store
            .create_rating(NewRating::new(seeded.user.clone(), seeded.place.clone()))
            .expect("create");
        let update = RatingUpdate::new(Stars::MAX, "changed");
        let updated = seeded
            .store
            .update_rating(&seeded.user, &seeded.place, update)
            .expect("update")
            .expect("existing rating");
        assert_eq!(updated.rating, Stars::MAX);
        assert_eq!(updated.comment, "changed");
    }

    #[rstest]
    fn unknown_user_has_no_rating_list(seeded: Seeded) {
        let stranger = UserId::new("eve@example.com").expect("valid user");
        assert!(
            seeded
                .store
                .ratings_for_user(&stranger)
                .expect("list")
                .is_none()
        );
    }

    #[rstest]
    fn insert_restaurant_is_idempotent(seeded: Seeded) {
        assert!(
            !seeded
                .store
                .insert_restaurant(&seeded.place)
                .expect("insert")
        );
    }
}
