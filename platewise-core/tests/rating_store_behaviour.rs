//! Behavioural tests for the rating store contract using `MemoryStore`.

use std::cell::RefCell;

use platewise_core::test_support::{MemoryStore, user_id};
use platewise_core::{NewRating, PlaceId, RatingStore, StoreError};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

const USER: &str = "ada@example.com";
const PLACE: &str = "ChIJ-trattoria";

fn place() -> PlaceId {
    PlaceId::new(PLACE).expect("place")
}

#[fixture]
fn store() -> RefCell<MemoryStore> {
    RefCell::new(MemoryStore::default())
}

#[fixture]
fn failure() -> RefCell<Option<StoreError>> {
    RefCell::new(None)
}

#[fixture]
fn removed() -> RefCell<Option<usize>> {
    RefCell::new(None)
}

#[given("a registered user and a known restaurant")]
fn given_seeded(#[from(store)] store: &RefCell<MemoryStore>) {
    *store.borrow_mut() = MemoryStore::with_fixtures([user_id(USER)], [place()]);
}

#[when("the user rates the restaurant twice")]
fn when_rate_twice(
    #[from(store)] store: &RefCell<MemoryStore>,
    #[from(failure)] failure: &RefCell<Option<StoreError>>,
) {
    let guard = store.borrow();
    let rating = NewRating::new(user_id(USER), place());
    guard.create_rating(rating.clone()).expect("first rating");
    *failure.borrow_mut() = guard.create_rating(rating).err();
}

#[when("the user deletes a rating that does not exist")]
fn when_delete_missing(
    #[from(store)] store: &RefCell<MemoryStore>,
    #[from(removed)] removed: &RefCell<Option<usize>>,
) {
    let count = store
        .borrow()
        .delete_rating(&user_id(USER), &place())
        .expect("delete");
    *removed.borrow_mut() = Some(count);
}

#[when("the user rates a restaurant the store does not know")]
fn when_rate_unknown(
    #[from(store)] store: &RefCell<MemoryStore>,
    #[from(failure)] failure: &RefCell<Option<StoreError>>,
) {
    let unknown = PlaceId::new("ChIJ-elsewhere").expect("place");
    *failure.borrow_mut() = store
        .borrow()
        .create_rating(NewRating::new(user_id(USER), unknown))
        .err();
}

#[then("the second rating is rejected as a duplicate")]
fn then_duplicate(#[from(failure)] failure: &RefCell<Option<StoreError>>) {
    assert!(matches!(
        failure.borrow().as_ref(),
        Some(StoreError::DuplicateRating { .. })
    ));
}

#[then("exactly one rating is stored")]
fn then_single(#[from(store)] store: &RefCell<MemoryStore>) {
    let ratings = store
        .borrow()
        .ratings_for_user(&user_id(USER))
        .expect("list")
        .expect("known user");
    assert_eq!(ratings.len(), 1);
}

#[then("zero ratings are removed")]
fn then_zero(#[from(removed)] removed: &RefCell<Option<usize>>) {
    assert_eq!(*removed.borrow(), Some(0));
}

#[then("the rating is rejected because the restaurant is unknown")]
fn then_unknown(#[from(failure)] failure: &RefCell<Option<StoreError>>) {
    assert!(matches!(
        failure.borrow().as_ref(),
        Some(StoreError::UnknownRestaurant { .. })
    ));
}

#[scenario(path = "tests/features/rating_store.feature", index = 0)]
fn duplicate_rating(store: RefCell<MemoryStore>, failure: RefCell<Option<StoreError>>) {
    let _ = (store, failure);
}

#[scenario(path = "tests/features/rating_store.feature", index = 1)]
fn delete_missing(store: RefCell<MemoryStore>, removed: RefCell<Option<usize>>) {
    let _ = (store, removed);
}

#[scenario(path = "tests/features/rating_store.feature", index = 2)]
fn unknown_restaurant(store: RefCell<MemoryStore>, failure: RefCell<Option<StoreError>>) {
    let _ = (store, failure);
}
