//! `rate`, `rerate`, `unrate` and `ratings` commands.

use std::io::Write;

use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use platewise_core::{
    NewRating, PlaceId, RatingStore, RatingUpdate, RestaurantStore, Stars, StoreError, UserId,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    ARG_COMMENT, ARG_PLACE_ID, ARG_RATING, CliError, ENV_RATE_PLACE_ID, ENV_RATE_RATING,
    ENV_RERATE_PLACE_ID, ENV_RERATE_RATING, ENV_UNRATE_PLACE_ID, GlobalArgs, write_json,
};

/// CLI arguments for the `rate` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(name = "rate", about = "Rate a restaurant from 0 to 5 stars")]
#[ortho_config(prefix = "PLATEWISE")]
pub(crate) struct RateArgs {
    /// Place id as printed by `select`.
    #[arg(long = ARG_PLACE_ID, value_name = "id")]
    #[serde(default)]
    pub(crate) place_id: Option<String>,
    /// Star rating, 0 to 5.
    #[arg(long = ARG_RATING, value_name = "stars")]
    #[serde(default)]
    pub(crate) rating: Option<u8>,
    /// Free-text comment.
    #[arg(long = ARG_COMMENT, value_name = "text")]
    #[serde(default)]
    pub(crate) comment: Option<String>,
}

/// CLI arguments for the `rerate` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(name = "rerate", about = "Replace an existing rating")]
#[ortho_config(prefix = "PLATEWISE")]
pub(crate) struct RerateArgs {
    /// Place id of the rated restaurant.
    #[arg(long = ARG_PLACE_ID, value_name = "id")]
    #[serde(default)]
    pub(crate) place_id: Option<String>,
    /// New star rating, 0 to 5.
    #[arg(long = ARG_RATING, value_name = "stars")]
    #[serde(default)]
    pub(crate) rating: Option<u8>,
    /// New comment; an absent comment clears the old one.
    #[arg(long = ARG_COMMENT, value_name = "text")]
    #[serde(default)]
    pub(crate) comment: Option<String>,
}

/// Resolved `rate`/`rerate` configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RateConfig {
    pub(crate) place_id: PlaceId,
    pub(crate) rating: Stars,
    pub(crate) comment: String,
}

impl RateConfig {
    fn into_new_rating(self, user: UserId) -> NewRating {
        NewRating::new(user, self.place_id)
            .with_rating(self.rating)
            .with_comment(self.comment)
    }
}

impl RateConfig {
    fn resolve(
        place_id: Option<String>,
        rating: Option<u8>,
        comment: Option<String>,
        env: (&'static str, &'static str),
    ) -> Result<Self, CliError> {
        let (place_id_env, rating_env) = env;
        let raw_place_id = place_id.ok_or(CliError::MissingArgument {
            field: ARG_PLACE_ID,
            env: place_id_env,
        })?;
        let stars = rating.ok_or(CliError::MissingArgument {
            field: ARG_RATING,
            env: rating_env,
        })?;
        Ok(Self {
            place_id: PlaceId::new(raw_place_id)?,
            rating: Stars::new(stars)?,
            comment: comment.unwrap_or_default(),
        })
    }
}

impl TryFrom<RateArgs> for RateConfig {
    type Error = CliError;

    fn try_from(args: RateArgs) -> Result<Self, Self::Error> {
        Self::resolve(
            args.place_id,
            args.rating,
            args.comment,
            (ENV_RATE_PLACE_ID, ENV_RATE_RATING),
        )
    }
}

impl TryFrom<RerateArgs> for RateConfig {
    type Error = CliError;

    fn try_from(args: RerateArgs) -> Result<Self, Self::Error> {
        Self::resolve(
            args.place_id,
            args.rating,
            args.comment,
            (ENV_RERATE_PLACE_ID, ENV_RERATE_RATING),
        )
    }
}

/// CLI arguments for the `unrate` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(name = "unrate", about = "Delete a rating")]
#[ortho_config(prefix = "PLATEWISE")]
pub(crate) struct UnrateArgs {
    /// Place id of the rated restaurant.
    #[arg(long = ARG_PLACE_ID, value_name = "id")]
    #[serde(default)]
    pub(crate) place_id: Option<String>,
}

impl TryFrom<UnrateArgs> for PlaceId {
    type Error = CliError;

    fn try_from(args: UnrateArgs) -> Result<Self, Self::Error> {
        let raw = args.place_id.ok_or(CliError::MissingArgument {
            field: ARG_PLACE_ID,
            env: ENV_UNRATE_PLACE_ID,
        })?;
        Ok(Self::new(raw)?)
    }
}

pub(crate) fn run_rate(
    args: RateArgs,
    globals: &GlobalArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let config = RateConfig::try_from(merged)?;
    let store = globals.open_store()?;
    let user = globals.authenticate(&store)?;
    if store.insert_restaurant(&config.place_id)? {
        tracing::debug!(place_id = %config.place_id, "registered restaurant");
    }
    let rating = store.create_rating(config.into_new_rating(user.id))?;
    write_json(writer, &rating)
}

/// Replace the caller's rating of a restaurant.
///
/// A restaurant the store has never seen cannot carry a rating either, so
/// both cases report [`CliError::NoRating`].
pub(crate) fn run_rerate(
    args: RerateArgs,
    globals: &GlobalArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let config = RateConfig::try_from(merged)?;
    let store = globals.open_store()?;
    let user = globals.authenticate(&store)?;
    let update = RatingUpdate::new(config.rating, config.comment);
    match store.update_rating(&user.id, &config.place_id, update) {
        Ok(Some(updated)) => write_json(writer, &updated),
        Ok(None) | Err(StoreError::UnknownRestaurant { .. }) => Err(CliError::NoRating {
            place_id: config.place_id,
        }),
        Err(err) => Err(err.into()),
    }
}

pub(crate) fn run_unrate(
    args: UnrateArgs,
    globals: &GlobalArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let place_id = PlaceId::try_from(merged)?;
    let store = globals.open_store()?;
    let user = globals.authenticate(&store)?;
    let removed = store.delete_rating(&user.id, &place_id)?;
    if removed == 0 {
        tracing::warn!(%place_id, "no rating to delete");
    }
    write_json(writer, &json!({ "removed": removed }))
}

pub(crate) fn run_list(globals: &GlobalArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let store = globals.open_store()?;
    let user = globals.authenticate(&store)?;
    let ratings = store.ratings_for_user(&user.id)?.unwrap_or_default();
    write_json(writer, &ratings)
}
