//! `select` command implementation.

use std::io::Write;

use clap::Parser;
use geo::Coord;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use platewise_core::{Cuisine, FilterCriteria, PlaceSearch, SelectionPipeline};
use platewise_data::places::{DEFAULT_BASE_URL, HttpPlaceSearch, HttpPlaceSearchConfig};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::{
    ARG_CUISINE, ARG_LAT, ARG_LNG, ARG_MIN_RATING, ARG_PLACES_API_KEY, ARG_RADIUS, ARG_SEED,
    CliError, ENV_PLACES_API_KEY, ENV_SELECT_CUISINE, ENV_SELECT_LAT, ENV_SELECT_LNG, GlobalArgs,
    write_json,
};

/// CLI arguments for the `select` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "select",
    about = "Pick a nearby restaurant",
    long_about = "Search open restaurants matching a cuisine keyword around \
                  a position, drop those below the minimum rating, and draw \
                  one at random. Restaurants you rated highly and popular \
                  restaurants are more likely to win. The first visit to a \
                  restaurant is recorded as a zero-star rating."
)]
#[ortho_config(prefix = "PLATEWISE")]
pub(crate) struct SelectArgs {
    /// Cuisine keyword, for example "ramen".
    #[arg(long = ARG_CUISINE, value_name = "keyword")]
    #[serde(default)]
    pub(crate) cuisine: Option<String>,
    /// Latitude of the search origin in degrees.
    #[arg(long = ARG_LAT, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) lat: Option<f64>,
    /// Longitude of the search origin in degrees.
    #[arg(long = ARG_LNG, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) lng: Option<f64>,
    /// Search radius in metres.
    #[arg(long = ARG_RADIUS, value_name = "metres")]
    #[serde(default)]
    pub(crate) radius: Option<u32>,
    /// Minimum popularity rating, 0 to 5.
    #[arg(long = ARG_MIN_RATING, value_name = "stars")]
    #[serde(default)]
    pub(crate) min_rating: Option<f32>,
    /// Seed for a reproducible draw.
    #[arg(long = ARG_SEED, value_name = "seed")]
    #[serde(default)]
    pub(crate) seed: Option<u64>,
}

/// Resolved `select` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SelectConfig {
    pub(crate) criteria: FilterCriteria,
    pub(crate) seed: Option<u64>,
}

impl TryFrom<SelectArgs> for SelectConfig {
    type Error = CliError;

    fn try_from(args: SelectArgs) -> Result<Self, Self::Error> {
        let cuisine: Cuisine = args
            .cuisine
            .ok_or(CliError::MissingArgument {
                field: ARG_CUISINE,
                env: ENV_SELECT_CUISINE,
            })?
            .parse()?;
        let lat = args.lat.ok_or(CliError::MissingArgument {
            field: ARG_LAT,
            env: ENV_SELECT_LAT,
        })?;
        let lng = args.lng.ok_or(CliError::MissingArgument {
            field: ARG_LNG,
            env: ENV_SELECT_LNG,
        })?;
        let mut criteria = FilterCriteria::new(cuisine, Coord { x: lng, y: lat })?;
        if let Some(radius) = args.radius {
            criteria = criteria.with_radius(radius)?;
        }
        if let Some(min_rating) = args.min_rating {
            criteria = criteria.with_min_rating(min_rating)?;
        }
        Ok(Self {
            criteria,
            seed: args.seed,
        })
    }
}

/// Builds the place search used by one `select` invocation.
pub(crate) trait SearchBuilder {
    fn build(&self, globals: &GlobalArgs) -> Result<Box<dyn PlaceSearch>, CliError>;
}

pub(crate) struct DefaultSearchBuilder;

impl SearchBuilder for DefaultSearchBuilder {
    fn build(&self, globals: &GlobalArgs) -> Result<Box<dyn PlaceSearch>, CliError> {
        let api_key = globals
            .places_api_key
            .clone()
            .ok_or(CliError::MissingArgument {
                field: ARG_PLACES_API_KEY,
                env: ENV_PLACES_API_KEY,
            })?;
        let base_url = globals
            .places_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        let config = HttpPlaceSearchConfig::new(api_key).with_base_url(base_url.clone());
        let search = HttpPlaceSearch::with_config(config)
            .map_err(|source| CliError::BuildPlaceSearch { base_url, source })?;
        Ok(Box::new(search))
    }
}

pub(crate) fn run_select(
    args: SelectArgs,
    globals: &GlobalArgs,
    builder: &dyn SearchBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let config = SelectConfig::try_from(merged)?;
    let store = globals.open_store()?;
    let user = globals.authenticate(&store)?;
    let search = builder.build(globals)?;

    let seed = config.seed.unwrap_or_else(rand::random);
    tracing::debug!(seed, "drawing with seed");
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let pipeline = SelectionPipeline::new(search.as_ref(), &store);
    let selection = pipeline.select(&user.id, &config.criteria, &mut rng)?;
    write_json(writer, &selection)
}
