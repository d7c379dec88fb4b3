use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, Error as SqliteError, ErrorCode, OptionalExtension, Row, params};
use thiserror::Error;

use platewise_core::{
    NewRating, NewUser, PlaceId, Rating, RatingStore, RatingUpdate, RestaurantStore, Stars,
    StoreError, User, UserId, UserStore,
};

use super::schema::{SchemaError, initialise_schema};

const RATING_COLUMNS: &str = "user_email, place_id, rating, comment, created_at";

/// Store backed by a single SQLite connection.
///
/// The connection is opened by [`SqliteStore::open`] and closed when the
/// store is dropped, so one store instance scopes one unit of work.
#[derive(Debug)]
pub struct SqliteStore {
    connection: Connection,
}

/// Errors raised while opening a [`SqliteStore`].
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// The directory holding the database could not be prepared.
    #[error("failed to prepare database directory for {path}")]
    Directory {
        /// Database path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// SQLite refused to open the database.
    #[error("failed to open SQLite database at {path}")]
    Open {
        /// Database path.
        path: Utf8PathBuf,
        /// Underlying SQLite error.
        #[source]
        source: SqliteError,
    },
    /// The schema could not be applied.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl SqliteStore {
    /// Open the database at `path`, creating parent directories and the
    /// schema as needed.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError`] when the directory cannot be created, the
    /// database cannot be opened, or its schema version is unexpected.
    pub fn open(path: &Utf8Path) -> Result<Self, SqliteStoreError> {
        let existed = platewise_fs::prepare_database_path(path).map_err(|source| {
            SqliteStoreError::Directory {
                path: path.to_path_buf(),
                source,
            }
        })?;
        let connection = Connection::open(path.as_std_path()).map_err(|source| {
            SqliteStoreError::Open {
                path: path.to_path_buf(),
                source,
            }
        })?;
        log::debug!(
            "opened {} database at {path}",
            if existed { "existing" } else { "new" }
        );
        Self::from_connection(connection)
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError`] when SQLite cannot allocate the database.
    pub fn open_in_memory() -> Result<Self, SqliteStoreError> {
        let connection =
            Connection::open_in_memory().map_err(|source| SqliteStoreError::Open {
                path: Utf8PathBuf::from(":memory:"),
                source,
            })?;
        Self::from_connection(connection)
    }

    fn from_connection(mut connection: Connection) -> Result<Self, SqliteStoreError> {
        initialise_schema(&mut connection)?;
        Ok(Self { connection })
    }

    fn user_exists(&self, user: &UserId) -> Result<bool, StoreError> {
        exists(
            &self.connection,
            "SELECT 1 FROM users WHERE email = ?1",
            user.as_str(),
        )
        .map_err(|err| StoreError::backend("look up user", err))
    }

    fn check_refs(&self, user: &UserId, place_id: &PlaceId) -> Result<(), StoreError> {
        if !self.user_exists(user)? {
            return Err(StoreError::UnknownUser { user: user.clone() });
        }
        if !self.contains_restaurant(place_id)? {
            return Err(StoreError::UnknownRestaurant {
                place_id: place_id.clone(),
            });
        }
        Ok(())
    }
}

fn exists(connection: &Connection, sql: &str, key: &str) -> Result<bool, SqliteError> {
    connection
        .query_row(sql, [key], |_| Ok(()))
        .optional()
        .map(|found| found.is_some())
}

fn is_primary_key_violation(error: &SqliteError) -> bool {
    matches!(
        error,
        SqliteError::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation
                && failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

/// Convert a validation failure into a column conversion error.
fn column<T, E>(index: usize, value: Result<T, E>) -> rusqlite::Result<T>
where
    E: std::error::Error + Send + Sync + 'static,
{
    value.map_err(|err| SqliteError::FromSqlConversionFailure(index, Type::Text, Box::new(err)))
}

fn rating_from_row(row: &Row<'_>) -> rusqlite::Result<Rating> {
    let user: String = row.get(0)?;
    let place_id: String = row.get(1)?;
    let stars: u8 = row.get(2)?;
    let created_at: DateTime<Utc> = row.get(4)?;
    Ok(Rating {
        user: column(0, UserId::new(user))?,
        place_id: column(1, PlaceId::new(place_id))?,
        rating: column(2, Stars::new(stars))?,
        comment: row.get(3)?,
        created_at,
    })
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    let email: String = row.get(0)?;
    Ok(User {
        id: column(0, UserId::new(email))?,
        display_name: row.get(1)?,
        created_at: row.get(2)?,
    })
}

impl UserStore for SqliteStore {
    fn find_user(&self, user: &UserId) -> Result<Option<User>, StoreError> {
        self.connection
            .query_row(
                "SELECT email, display_name, created_at FROM users WHERE email = ?1",
                [user.as_str()],
                user_from_row,
            )
            .optional()
            .map_err(|err| StoreError::backend("find user", err))
    }

    fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let created = User {
            id: user.id,
            display_name: user.display_name,
            created_at: Utc::now(),
        };
        self.connection
            .execute(
                "INSERT INTO users (email, display_name, created_at) VALUES (?1, ?2, ?3)",
                params![
                    created.id.as_str(),
                    created.display_name.as_deref(),
                    created.created_at
                ],
            )
            .map_err(|err| {
                if is_primary_key_violation(&err) {
                    StoreError::DuplicateUser {
                        user: created.id.clone(),
                    }
                } else {
                    StoreError::backend("insert user", err)
                }
            })?;
        log::info!("registered user {}", created.id);
        Ok(created)
    }
}

impl RestaurantStore for SqliteStore {
    fn contains_restaurant(&self, place_id: &PlaceId) -> Result<bool, StoreError> {
        exists(
            &self.connection,
            "SELECT 1 FROM restaurants WHERE place_id = ?1",
            place_id.as_str(),
        )
        .map_err(|err| StoreError::backend("look up restaurant", err))
    }

    fn insert_restaurant(&self, place_id: &PlaceId) -> Result<bool, StoreError> {
        self.connection
            .execute(
                "INSERT OR IGNORE INTO restaurants (place_id) VALUES (?1)",
                [place_id.as_str()],
            )
            .map(|changed| changed > 0)
            .map_err(|err| StoreError::backend("insert restaurant", err))
    }
}

impl RatingStore for SqliteStore {
    fn find_rating(&self, user: &UserId, place_id: &PlaceId) -> Result<Option<Rating>, StoreError> {
        self.connection
            .query_row(
                &format!(
                    "SELECT {RATING_COLUMNS} FROM ratings WHERE user_email = ?1 AND place_id = ?2"
                ),
                [user.as_str(), place_id.as_str()],
                rating_from_row,
            )
            .optional()
            .map_err(|err| StoreError::backend("find rating", err))
    }

    fn create_rating(&self, rating: NewRating) -> Result<Rating, StoreError> {
        let transaction = self
            .connection
            .unchecked_transaction()
            .map_err(|err| StoreError::backend("begin create rating", err))?;
        self.check_refs(&rating.user, &rating.place_id)?;
        let duplicate = || StoreError::DuplicateRating {
            user: rating.user.clone(),
            place_id: rating.place_id.clone(),
        };
        if self.find_rating(&rating.user, &rating.place_id)?.is_some() {
            return Err(duplicate());
        }
        let created_at = Utc::now();
        transaction
            .execute(
                "INSERT INTO ratings (user_email, place_id, rating, comment, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    rating.user.as_str(),
                    rating.place_id.as_str(),
                    rating.rating.get(),
                    rating.comment.as_str(),
                    created_at
                ],
            )
            .map_err(|err| {
                if is_primary_key_violation(&err) {
                    duplicate()
                } else {
                    StoreError::backend("insert rating", err)
                }
            })?;
        transaction
            .commit()
            .map_err(|err| StoreError::backend("commit create rating", err))?;
        log::debug!(
            "{} rated {} with {} stars",
            rating.user,
            rating.place_id,
            rating.rating
        );
        Ok(Rating {
            user: rating.user,
            place_id: rating.place_id,
            rating: rating.rating,
            comment: rating.comment,
            created_at,
        })
    }

    fn update_rating(
        &self,
        user: &UserId,
        place_id: &PlaceId,
        update: RatingUpdate,
    ) -> Result<Option<Rating>, StoreError> {
        let transaction = self
            .connection
            .unchecked_transaction()
            .map_err(|err| StoreError::backend("begin update rating", err))?;
        self.check_refs(user, place_id)?;
        let changed = transaction
            .execute(
                "UPDATE ratings SET rating = ?3, comment = ?4
                 WHERE user_email = ?1 AND place_id = ?2",
                params![
                    user.as_str(),
                    place_id.as_str(),
                    update.rating.get(),
                    update.comment
                ],
            )
            .map_err(|err| StoreError::backend("update rating", err))?;
        if changed == 0 {
            return Ok(None);
        }
        let updated = self.find_rating(user, place_id)?;
        transaction
            .commit()
            .map_err(|err| StoreError::backend("commit update rating", err))?;
        Ok(updated)
    }

    fn delete_rating(&self, user: &UserId, place_id: &PlaceId) -> Result<usize, StoreError> {
        self.connection
            .execute(
                "DELETE FROM ratings WHERE user_email = ?1 AND place_id = ?2",
                [user.as_str(), place_id.as_str()],
            )
            .map_err(|err| StoreError::backend("delete rating", err))
    }

    fn ratings_for_user(&self, user: &UserId) -> Result<Option<Vec<Rating>>, StoreError> {
        if !self.user_exists(user)? {
            return Ok(None);
        }
        let mut statement = self
            .connection
            .prepare_cached(&format!(
                "SELECT {RATING_COLUMNS} FROM ratings WHERE user_email = ?1
                 ORDER BY created_at, rowid"
            ))
            .map_err(|err| StoreError::backend("prepare list ratings", err))?;
        let rows = statement
            .query_map([user.as_str()], rating_from_row)
            .map_err(|err| StoreError::backend("list ratings", err))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map(Some)
            .map_err(|err| StoreError::backend("read rating row", err))
    }
}
