//! SQLite persistence for users, restaurants and ratings.
//!
//! [`SqliteStore`] implements the store traits from `platewise-core`.
//! [`initialise_schema`] runs whenever a store is opened.
#![forbid(unsafe_code)]

mod schema;
mod sqlite;

pub use schema::{SCHEMA_VERSION, SchemaError, initialise_schema};
pub use sqlite::{SqliteStore, SqliteStoreError};

#[cfg(test)]
mod tests;
