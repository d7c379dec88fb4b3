use rusqlite::{Connection, Error as SqliteError, OptionalExtension, Transaction};
use thiserror::Error;

/// Version recorded in `platewise_schema_version` by this build.
pub const SCHEMA_VERSION: i64 = 1;

/// Create the users, restaurants and ratings tables inside `connection`.
///
/// Foreign keys are enabled first so rating rows follow their user and
/// restaurant on delete. An existing database must already carry
/// [`SCHEMA_VERSION`]; any other recorded version is rejected.
///
/// # Examples
/// ```
/// use rusqlite::Connection;
/// use platewise_data::store::initialise_schema;
///
/// let mut conn = Connection::open_in_memory().expect("in-memory database");
/// initialise_schema(&mut conn).expect("create schema");
/// initialise_schema(&mut conn).expect("schema is idempotent");
/// let version: i64 = conn
///     .query_row("SELECT version FROM platewise_schema_version", [], |row| row.get(0))
///     .expect("read version");
/// assert_eq!(version, 1);
/// ```
pub fn initialise_schema(connection: &mut Connection) -> Result<(), SchemaError> {
    connection
        .pragma_update(None, "foreign_keys", true)
        .map_err(|source| SchemaError::ForeignKeys { source })?;

    let transaction = connection
        .transaction()
        .map_err(|source| SchemaError::Migration {
            step: "begin schema transaction",
            source,
        })?;

    create_tables(&transaction)?;
    ensure_schema_version(&transaction)?;

    transaction
        .commit()
        .map_err(|source| SchemaError::Migration {
            step: "commit schema transaction",
            source,
        })
}

fn create_tables(transaction: &Transaction<'_>) -> Result<(), SchemaError> {
    run_migration_step(
        transaction,
        "create users",
        "CREATE TABLE IF NOT EXISTS users (
            email TEXT PRIMARY KEY CHECK (length(trim(email)) > 0),
            display_name TEXT,
            created_at TEXT NOT NULL
        ) WITHOUT ROWID",
    )?;
    run_migration_step(
        transaction,
        "create restaurants",
        "CREATE TABLE IF NOT EXISTS restaurants (
            place_id TEXT PRIMARY KEY CHECK (length(trim(place_id)) > 0)
        ) WITHOUT ROWID",
    )?;
    run_migration_step(
        transaction,
        "create ratings",
        "CREATE TABLE IF NOT EXISTS ratings (
            user_email TEXT NOT NULL,
            place_id TEXT NOT NULL,
            rating INTEGER NOT NULL CHECK (rating BETWEEN 0 AND 5),
            comment TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL,
            PRIMARY KEY (user_email, place_id),
            FOREIGN KEY (user_email) REFERENCES users(email) ON DELETE CASCADE,
            FOREIGN KEY (place_id) REFERENCES restaurants(place_id) ON DELETE CASCADE
        )",
    )?;
    run_migration_step(
        transaction,
        "index ratings by restaurant",
        "CREATE INDEX IF NOT EXISTS idx_ratings_place ON ratings(place_id)",
    )
}

fn ensure_schema_version(transaction: &Transaction<'_>) -> Result<(), SchemaError> {
    run_migration_step(
        transaction,
        "create schema version table",
        "CREATE TABLE IF NOT EXISTS platewise_schema_version (
            version INTEGER PRIMARY KEY CHECK (version > 0),
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
        ) WITHOUT ROWID",
    )?;

    let existing: Option<i64> = transaction
        .query_row(
            "SELECT version FROM platewise_schema_version LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()
        .map_err(|source| SchemaError::Migration {
            step: "read schema version",
            source,
        })?;

    match existing {
        Some(found) if found == SCHEMA_VERSION => Ok(()),
        Some(found) => Err(SchemaError::VersionMismatch {
            expected: SCHEMA_VERSION,
            found,
        }),
        None => transaction
            .execute(
                "INSERT INTO platewise_schema_version (version) VALUES (?1)",
                [SCHEMA_VERSION],
            )
            .map(|_| ())
            .map_err(|source| SchemaError::Migration {
                step: "record schema version",
                source,
            }),
    }
}

fn run_migration_step(
    transaction: &Transaction<'_>,
    step: &'static str,
    sql: &str,
) -> Result<(), SchemaError> {
    transaction
        .execute(sql, [])
        .map(|_| ())
        .map_err(|source| SchemaError::Migration { step, source })
}

/// Errors raised when initialising the store schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// `PRAGMA foreign_keys` could not be set.
    #[error("failed to enable SQLite foreign keys")]
    ForeignKeys {
        /// Underlying SQLite error.
        #[source]
        source: SqliteError,
    },
    /// A schema statement failed.
    #[error("failed to execute migration step '{step}'")]
    Migration {
        /// Name of the failed step.
        step: &'static str,
        /// Underlying SQLite error.
        #[source]
        source: SqliteError,
    },
    /// The database was created by a different schema version.
    #[error("expected schema version {expected} but found {found}; migrate the database first")]
    VersionMismatch {
        /// Version this build understands.
        expected: i64,
        /// Version recorded in the database.
        found: i64,
    },
}
