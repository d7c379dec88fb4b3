//! Error types emitted by the Platewise CLI.
//!
//! Keep this error type reasonably small, as every command helper returns
//! `Result<_, CliError>`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use platewise_core::{
    AuthError, FilterError, PlaceId, PlaceIdError, SelectionError, SessionError, StarsError,
    StoreError, UserIdError,
};
use platewise_data::{PlaceSearchBuildError, SqliteStoreError};
use thiserror::Error;

/// Errors emitted by the Platewise CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// The log directory could not be prepared.
    #[error("failed to prepare log directory {path:?}: {source}")]
    LogDirectory {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// An e-mail address failed validation.
    #[error("invalid e-mail address: {0}")]
    InvalidEmail(#[from] UserIdError),
    /// A place id failed validation.
    #[error("invalid place id: {0}")]
    InvalidPlaceId(#[from] PlaceIdError),
    /// A star rating was out of range.
    #[error("invalid rating: {0}")]
    InvalidRating(#[from] StarsError),
    /// Search criteria failed validation.
    #[error("invalid search criteria: {0}")]
    InvalidCriteria(#[from] FilterError),
    /// The session secret or token lifetime was rejected.
    #[error("failed to issue token: {0}")]
    Session(#[from] SessionError),
    /// The bearer token did not identify a registered user.
    #[error("not authenticated: {0}")]
    Auth(#[from] AuthError),
    /// Opening the SQLite database failed.
    #[error(transparent)]
    OpenStore(#[from] SqliteStoreError),
    /// A store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Constructing the place search client failed.
    #[error("failed to build place search client for {base_url:?}: {source}")]
    BuildPlaceSearch {
        base_url: String,
        #[source]
        source: PlaceSearchBuildError,
    },
    /// No restaurant could be selected.
    #[error(transparent)]
    Selection(#[from] SelectionError),
    /// `rerate` named a restaurant the caller never rated.
    #[error("no rating for restaurant {place_id}; use `rate` first")]
    NoRating { place_id: PlaceId },
    /// Serializing command output failed.
    #[error("failed to serialize output: {0}")]
    SerializeOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
