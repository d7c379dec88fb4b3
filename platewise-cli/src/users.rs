//! `register` and `token` commands.

use std::io::Write;

use chrono::TimeDelta;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use platewise_core::{DEFAULT_TOKEN_TTL_MINUTES, NewUser, StoreError, UserId, UserStore, issue};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_EMAIL, ARG_NAME, ARG_TTL_MINUTES, CliError, ENV_REGISTER_EMAIL, ENV_TOKEN_EMAIL,
    GlobalArgs, write_json,
};

/// CLI arguments for the `register` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(name = "register", about = "Register a user by e-mail address")]
#[ortho_config(prefix = "PLATEWISE")]
pub(crate) struct RegisterArgs {
    /// E-mail address identifying the user.
    #[arg(long = ARG_EMAIL, value_name = "address")]
    #[serde(default)]
    pub(crate) email: Option<String>,
    /// Optional display name.
    #[arg(long = ARG_NAME, value_name = "name")]
    #[serde(default)]
    pub(crate) name: Option<String>,
}

impl TryFrom<RegisterArgs> for NewUser {
    type Error = CliError;

    fn try_from(args: RegisterArgs) -> Result<Self, Self::Error> {
        let email = args.email.ok_or(CliError::MissingArgument {
            field: ARG_EMAIL,
            env: ENV_REGISTER_EMAIL,
        })?;
        let user = Self::new(UserId::new(email)?);
        Ok(match args.name {
            Some(name) => user.with_display_name(name),
            None => user,
        })
    }
}

/// CLI arguments for the `token` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "token",
    about = "Issue a bearer token for a registered user",
    long_about = "Issue a bearer token for a registered user. The output is \
                  the complete value to pass as --token or PLATEWISE_TOKEN."
)]
#[ortho_config(prefix = "PLATEWISE")]
pub(crate) struct TokenArgs {
    /// E-mail address of a registered user.
    #[arg(long = ARG_EMAIL, value_name = "address")]
    #[serde(default)]
    pub(crate) email: Option<String>,
    /// Token lifetime in minutes.
    #[arg(long = ARG_TTL_MINUTES, value_name = "minutes")]
    #[serde(default)]
    pub(crate) ttl_minutes: Option<u32>,
}

/// Resolved `token` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TokenConfig {
    pub(crate) user: UserId,
    pub(crate) ttl: TimeDelta,
}

impl TryFrom<TokenArgs> for TokenConfig {
    type Error = CliError;

    fn try_from(args: TokenArgs) -> Result<Self, Self::Error> {
        let email = args.email.ok_or(CliError::MissingArgument {
            field: ARG_EMAIL,
            env: ENV_TOKEN_EMAIL,
        })?;
        let ttl = args
            .ttl_minutes
            .map_or(TimeDelta::minutes(DEFAULT_TOKEN_TTL_MINUTES), |minutes| {
                TimeDelta::minutes(i64::from(minutes))
            });
        Ok(Self {
            user: UserId::new(email)?,
            ttl,
        })
    }
}

pub(crate) fn run_register(
    args: RegisterArgs,
    globals: &GlobalArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let new_user = NewUser::try_from(merged)?;
    let store = globals.open_store()?;
    let user = store.insert_user(new_user)?;
    tracing::info!(user = %user.id, "registered user");
    write_json(writer, &user)
}

pub(crate) fn run_token(
    args: TokenArgs,
    globals: &GlobalArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let config = TokenConfig::try_from(merged)?;
    let keys = globals.session_keys()?;
    let store = globals.open_store()?;
    if store.find_user(&config.user)?.is_none() {
        return Err(StoreError::UnknownUser { user: config.user }.into());
    }
    let token = issue(&keys, &config.user, config.ttl)?;
    tracing::debug!(user = %config.user, ttl_minutes = config.ttl.num_minutes(), "issued token");
    writeln!(writer, "Bearer {token}").map_err(CliError::WriteOutput)
}
