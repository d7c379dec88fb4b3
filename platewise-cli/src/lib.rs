//! Command-line interface for Platewise.
//!
//! Each subcommand opens the SQLite database, does one unit of work and
//! prints its result as JSON on stdout. Commands acting for a user read the
//! bearer token from `--token` or `PLATEWISE_TOKEN`.
#![forbid(unsafe_code)]

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Parser, Subcommand};
use platewise_core::{SessionKeys, User, resolve_user};
use platewise_data::SqliteStore;
use serde::Serialize;

mod error;
mod logging;
mod ratings;
mod select;
mod users;

pub use error::CliError;

use ratings::{RateArgs, RerateArgs, UnrateArgs};
use select::{DefaultSearchBuilder, SearchBuilder, SelectArgs};
use users::{RegisterArgs, TokenArgs};

const ARG_DATABASE: &str = "database";
const ARG_SESSION_SECRET: &str = "session-secret";
const ARG_TOKEN: &str = "token";
const ARG_PLACES_API_KEY: &str = "places-api-key";
const ARG_PLACES_BASE_URL: &str = "places-base-url";
const ARG_LOG_DIR: &str = "log-dir";
const ENV_DATABASE: &str = "PLATEWISE_DATABASE";
const ENV_SESSION_SECRET: &str = "PLATEWISE_SESSION_SECRET";
const ENV_TOKEN: &str = "PLATEWISE_TOKEN";
const ENV_PLACES_API_KEY: &str = "PLATEWISE_PLACES_API_KEY";
const ENV_PLACES_BASE_URL: &str = "PLATEWISE_PLACES_BASE_URL";
const ENV_LOG_DIR: &str = "PLATEWISE_LOG_DIR";

const ARG_EMAIL: &str = "email";
const ARG_NAME: &str = "name";
const ARG_TTL_MINUTES: &str = "ttl-minutes";
const ARG_CUISINE: &str = "cuisine";
const ARG_LAT: &str = "lat";
const ARG_LNG: &str = "lng";
const ARG_RADIUS: &str = "radius";
const ARG_MIN_RATING: &str = "min-rating";
const ARG_SEED: &str = "seed";
const ARG_PLACE_ID: &str = "place-id";
const ARG_RATING: &str = "rating";
const ARG_COMMENT: &str = "comment";
const ENV_REGISTER_EMAIL: &str = "PLATEWISE_CMDS_REGISTER_EMAIL";
const ENV_TOKEN_EMAIL: &str = "PLATEWISE_CMDS_TOKEN_EMAIL";
const ENV_SELECT_CUISINE: &str = "PLATEWISE_CMDS_SELECT_CUISINE";
const ENV_SELECT_LAT: &str = "PLATEWISE_CMDS_SELECT_LAT";
const ENV_SELECT_LNG: &str = "PLATEWISE_CMDS_SELECT_LNG";
const ENV_RATE_PLACE_ID: &str = "PLATEWISE_CMDS_RATE_PLACE_ID";
const ENV_RATE_RATING: &str = "PLATEWISE_CMDS_RATE_RATING";
const ENV_RERATE_PLACE_ID: &str = "PLATEWISE_CMDS_RERATE_PLACE_ID";
const ENV_RERATE_RATING: &str = "PLATEWISE_CMDS_RERATE_RATING";
const ENV_UNRATE_PLACE_ID: &str = "PLATEWISE_CMDS_UNRATE_PLACE_ID";

const DEFAULT_DATABASE: &str = "platewise.db";

/// Run the Platewise CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let _guard = logging::init(cli.globals.log_dir.as_deref())?;
    let mut stdout = std::io::stdout().lock();
    run_with(cli, &DefaultSearchBuilder, &mut stdout)
}

fn run_with(cli: Cli, search: &dyn SearchBuilder, writer: &mut dyn Write) -> Result<(), CliError> {
    let globals = cli.globals;
    match cli.command {
        Command::Register(args) => users::run_register(args, &globals, writer),
        Command::Token(args) => users::run_token(args, &globals, writer),
        Command::Select(args) => select::run_select(args, &globals, search, writer),
        Command::Rate(args) => ratings::run_rate(args, &globals, writer),
        Command::Rerate(args) => ratings::run_rerate(args, &globals, writer),
        Command::Unrate(args) => ratings::run_unrate(args, &globals, writer),
        Command::Ratings => ratings::run_list(&globals, writer),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "platewise",
    about = "Pick a restaurant at random, weighted by ratings",
    version
)]
struct Cli {
    #[command(flatten)]
    globals: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Register a user by e-mail address.
    Register(RegisterArgs),
    /// Issue a bearer token for a registered user.
    Token(TokenArgs),
    /// Search nearby restaurants, pick one and record the visit.
    Select(SelectArgs),
    /// Rate a restaurant.
    Rate(RateArgs),
    /// Replace an existing rating.
    Rerate(RerateArgs),
    /// Delete a rating.
    Unrate(UnrateArgs),
    /// List the caller's ratings.
    Ratings,
}

/// Settings shared by every subcommand.
#[derive(Debug, Clone, Default, Args)]
struct GlobalArgs {
    /// Path to the SQLite database.
    #[arg(long = ARG_DATABASE, env = ENV_DATABASE, value_name = "path", global = true)]
    database: Option<Utf8PathBuf>,
    /// Secret used to sign and verify bearer tokens.
    #[arg(
        long = ARG_SESSION_SECRET,
        env = ENV_SESSION_SECRET,
        value_name = "secret",
        hide_env_values = true,
        global = true
    )]
    session_secret: Option<String>,
    /// Bearer token, as printed by `platewise token`.
    #[arg(
        long = ARG_TOKEN,
        env = ENV_TOKEN,
        value_name = "token",
        hide_env_values = true,
        global = true
    )]
    token: Option<String>,
    /// API key for the place-search service.
    #[arg(
        long = ARG_PLACES_API_KEY,
        env = ENV_PLACES_API_KEY,
        value_name = "key",
        hide_env_values = true,
        global = true
    )]
    places_api_key: Option<String>,
    /// Endpoint root of the place-search service.
    #[arg(long = ARG_PLACES_BASE_URL, env = ENV_PLACES_BASE_URL, value_name = "url", global = true)]
    places_base_url: Option<String>,
    /// Write logs to a daily-rotated file in this directory.
    #[arg(long = ARG_LOG_DIR, env = ENV_LOG_DIR, value_name = "dir", global = true)]
    log_dir: Option<Utf8PathBuf>,
}

impl GlobalArgs {
    fn database(&self) -> &Utf8Path {
        self.database
            .as_deref()
            .unwrap_or_else(|| Utf8Path::new(DEFAULT_DATABASE))
    }

    fn open_store(&self) -> Result<SqliteStore, CliError> {
        Ok(SqliteStore::open(self.database())?)
    }

    fn session_keys(&self) -> Result<SessionKeys, CliError> {
        let secret = self
            .session_secret
            .as_deref()
            .ok_or(CliError::MissingArgument {
                field: ARG_SESSION_SECRET,
                env: ENV_SESSION_SECRET,
            })?;
        Ok(SessionKeys::new(secret)?)
    }

    /// Resolve the bearer token to a registered user.
    fn authenticate(&self, store: &SqliteStore) -> Result<User, CliError> {
        let keys = self.session_keys()?;
        Ok(resolve_user(store, &keys, self.token.as_deref())?)
    }
}

fn write_json<T: Serialize + ?Sized>(writer: &mut dyn Write, value: &T) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerializeOutput)?;
    writeln!(writer, "{payload}").map_err(CliError::WriteOutput)
}

#[cfg(test)]
mod tests;
