use super::*;
use camino::Utf8PathBuf;
use platewise_core::{
    NewRating, NewUser, PlaceId, RatingStore, RatingUpdate, RestaurantStore, Stars, StoreError,
    UserId, UserStore,
};
use rstest::{fixture, rstest};
use rusqlite::Connection;
use tempfile::TempDir;

fn user() -> UserId {
    UserId::new("ada@example.com").expect("user id")
}

fn place(raw: &str) -> PlaceId {
    PlaceId::new(raw).expect("place id")
}

#[fixture]
fn store() -> SqliteStore {
    let store = SqliteStore::open_in_memory().expect("open store");
    store.insert_user(NewUser::new(user())).expect("seed user");
    store.insert_restaurant(&place("p1")).expect("seed place");
    store
}

#[rstest]
fn create_then_find(store: SqliteStore) {
    let created = store
        .create_rating(
            NewRating::new(user(), place("p1"))
                .with_rating(Stars::new(4).expect("stars"))
                .with_comment("crispy"),
        )
        .expect("create");
    let found = store
        .find_rating(&user(), &place("p1"))
        .expect("find")
        .expect("rating present");
    assert_eq!(found, created);
}

#[rstest]
fn duplicate_rating_is_rejected(store: SqliteStore) {
    store
        .create_rating(NewRating::new(user(), place("p1")))
        .expect("first create");
    let err = store
        .create_rating(NewRating::new(user(), place("p1")).with_rating(Stars::MAX))
        .expect_err("second create");
    assert!(matches!(err, StoreError::DuplicateRating { .. }));
    let ratings = store
        .ratings_for_user(&user())
        .expect("list")
        .expect("known user");
    assert_eq!(ratings.len(), 1);
    assert_eq!(ratings.first().map(|r| r.rating), Some(Stars::ZERO));
}

#[rstest]
fn create_rejects_unknown_references(store: SqliteStore) {
    let stranger = UserId::new("eve@example.com").expect("user id");
    let err = store
        .create_rating(NewRating::new(stranger, place("p1")))
        .expect_err("unknown user");
    assert!(matches!(err, StoreError::UnknownUser { .. }));
    let err = store
        .create_rating(NewRating::new(user(), place("nowhere")))
        .expect_err("unknown restaurant");
    assert!(matches!(err, StoreError::UnknownRestaurant { .. }));
}

#[rstest]
fn update_and_delete(store: SqliteStore) {
    assert_eq!(
        store
            .update_rating(&user(), &place("p1"), RatingUpdate::new(Stars::MAX, "x"))
            .expect("update missing"),
        None
    );
    store
        .create_rating(NewRating::new(user(), place("p1")))
        .expect("create");
    let updated = store
        .update_rating(&user(), &place("p1"), RatingUpdate::new(Stars::MAX, "best in town"))
        .expect("update")
        .expect("row updated");
    assert_eq!(updated.rating, Stars::MAX);
    assert_eq!(updated.comment, "best in town");
    assert_eq!(store.delete_rating(&user(), &place("p1")).expect("delete"), 1);
    assert_eq!(store.delete_rating(&user(), &place("p1")).expect("delete again"), 0);
}

#[rstest]
fn duplicate_user_is_rejected(store: SqliteStore) {
    let err = store
        .insert_user(NewUser::new(user()))
        .expect_err("duplicate user");
    assert!(matches!(err, StoreError::DuplicateUser { .. }));
}

#[rstest]
fn restaurant_insert_is_idempotent(store: SqliteStore) {
    assert!(!store.insert_restaurant(&place("p1")).expect("insert"));
    assert!(store.insert_restaurant(&place("p2")).expect("insert"));
    assert!(store.contains_restaurant(&place("p2")).expect("contains"));
}

#[rstest]
fn ratings_listed_in_creation_order(store: SqliteStore) {
    for raw in ["p3", "p2"] {
        store.insert_restaurant(&place(raw)).expect("seed place");
    }
    for raw in ["p3", "p1", "p2"] {
        store
            .create_rating(NewRating::new(user(), place(raw)))
            .expect("create");
    }
    let listed: Vec<String> = store
        .ratings_for_user(&user())
        .expect("list")
        .expect("known user")
        .into_iter()
        .map(|r| r.place_id.to_string())
        .collect();
    assert_eq!(listed, ["p3", "p1", "p2"]);
    let stranger = UserId::new("eve@example.com").expect("user id");
    assert!(store.ratings_for_user(&stranger).expect("list").is_none());
}

#[rstest]
fn open_creates_parent_and_reopens() {
    let temp = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf-8 path");
    let path = root.join("state/platewise.db");
    {
        let store = SqliteStore::open(&path).expect("create database");
        store.insert_user(NewUser::new(user())).expect("insert user");
    }
    let reopened = SqliteStore::open(&path).expect("reopen database");
    assert!(reopened.find_user(&user()).expect("find").is_some());
}

#[rstest]
fn mismatched_schema_version_is_rejected() {
    let mut connection = Connection::open_in_memory().expect("open");
    initialise_schema(&mut connection).expect("schema");
    connection
        .execute("UPDATE platewise_schema_version SET version = 99", [])
        .expect("tamper version");
    let err = initialise_schema(&mut connection).expect_err("version mismatch");
    assert!(matches!(
        err,
        SchemaError::VersionMismatch {
            expected: SCHEMA_VERSION,
            found: 99
        }
    ));
}

#[rstest]
fn deleting_restaurant_cascades_to_ratings() {
    let mut connection = Connection::open_in_memory().expect("open");
    initialise_schema(&mut connection).expect("schema");
    connection
        .execute_batch(
            "INSERT INTO users (email, created_at) VALUES ('ada@example.com', '2024-01-01 00:00:00+00:00');
             INSERT INTO restaurants (place_id) VALUES ('p1');
             INSERT INTO ratings (user_email, place_id, rating, created_at)
                 VALUES ('ada@example.com', 'p1', 3, '2024-01-01 00:00:00+00:00');
             DELETE FROM restaurants WHERE place_id = 'p1';",
        )
        .expect("seed and delete");
    let remaining: i64 = connection
        .query_row("SELECT COUNT(*) FROM ratings", [], |row| row.get(0))
        .expect("count");
    assert_eq!(remaining, 0);
}
