//! Focused unit tests covering argument conversion and command wiring.

use super::helpers::TestEnv;
use super::*;
use crate::ratings::{RateArgs, RateConfig, RerateArgs};
use crate::select::{SelectArgs, SelectConfig};
use crate::users::{TokenArgs, TokenConfig};
use chrono::TimeDelta;
use geo::Coord;
use platewise_core::{DEFAULT_RADIUS_M, DEFAULT_TOKEN_TTL_MINUTES, FilterError, StoreError};
use rstest::rstest;

fn select_args() -> SelectArgs {
    SelectArgs {
        cuisine: Some("ramen".to_owned()),
        lat: Some(52.5),
        lng: Some(13.4),
        ..SelectArgs::default()
    }
}

#[rstest]
#[case::cuisine(SelectArgs { cuisine: None, ..select_args() }, ARG_CUISINE, ENV_SELECT_CUISINE)]
#[case::lat(SelectArgs { lat: None, ..select_args() }, ARG_LAT, ENV_SELECT_LAT)]
#[case::lng(SelectArgs { lng: None, ..select_args() }, ARG_LNG, ENV_SELECT_LNG)]
fn converting_select_without_required_fields_errors(
    #[case] args: SelectArgs,
    #[case] field: &'static str,
    #[case] env_var: &'static str,
) {
    let err = SelectConfig::try_from(args).expect_err("missing field should error");
    match err {
        CliError::MissingArgument {
            field: missing,
            env,
        } => {
            assert_eq!(missing, field);
            assert_eq!(env, env_var);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn select_config_applies_defaults() {
    let config = SelectConfig::try_from(select_args()).expect("config should build");
    assert_eq!(config.criteria.radius_m(), DEFAULT_RADIUS_M);
    assert_eq!(config.criteria.min_rating(), 0.0);
    assert_eq!(config.criteria.origin(), Coord { x: 13.4, y: 52.5 });
    assert_eq!(config.seed, None);
}

#[rstest]
fn select_config_applies_overrides() {
    let args = SelectArgs {
        radius: Some(1_500),
        min_rating: Some(4.0),
        seed: Some(7),
        ..select_args()
    };
    let config = SelectConfig::try_from(args).expect("config should build");
    assert_eq!(config.criteria.radius_m(), 1_500);
    assert_eq!(config.criteria.min_rating(), 4.0);
    assert_eq!(config.seed, Some(7));
}

#[rstest]
#[case::latitude(SelectArgs { lat: Some(91.0), ..select_args() })]
#[case::radius(SelectArgs { radius: Some(0), ..select_args() })]
#[case::threshold(SelectArgs { min_rating: Some(5.5), ..select_args() })]
#[case::cuisine(SelectArgs { cuisine: Some("  ".to_owned()), ..select_args() })]
fn select_config_rejects_invalid_criteria(#[case] args: SelectArgs) {
    let err = SelectConfig::try_from(args).expect_err("criteria should be rejected");
    assert!(
        matches!(err, CliError::InvalidCriteria(_)),
        "unexpected error {err:?}"
    );
}

#[rstest]
fn rate_config_rejects_six_stars() {
    let args = RateArgs {
        place_id: Some("ChIJ-ramen".to_owned()),
        rating: Some(6),
        comment: None,
    };
    let err = RateConfig::try_from(args).expect_err("six stars should be rejected");
    assert!(matches!(err, CliError::InvalidRating(_)));
}

#[rstest]
fn rate_config_defaults_to_empty_comment() {
    let args = RateArgs {
        place_id: Some("ChIJ-ramen".to_owned()),
        rating: Some(3),
        comment: None,
    };
    let config = RateConfig::try_from(args).expect("config should build");
    assert_eq!(config.rating.get(), 3);
    assert!(config.comment.is_empty());
}

#[rstest]
#[case::rate(
    RateConfig::try_from(RateArgs { place_id: Some("ChIJ-ramen".to_owned()), ..RateArgs::default() }),
    ENV_RATE_RATING
)]
#[case::rerate(
    RateConfig::try_from(RerateArgs { place_id: Some("ChIJ-ramen".to_owned()), ..RerateArgs::default() }),
    ENV_RERATE_RATING
)]
fn missing_rating_names_the_command_env_var(
    #[case] result: Result<RateConfig, CliError>,
    #[case] env_var: &'static str,
) {
    match result.expect_err("rating is required") {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_RATING);
            assert_eq!(env, env_var);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
#[case(None, DEFAULT_TOKEN_TTL_MINUTES)]
#[case(Some(60), 60)]
fn token_config_lifetime(#[case] ttl_minutes: Option<u32>, #[case] expected: i64) {
    let args = TokenArgs {
        email: Some("ada@example.com".to_owned()),
        ttl_minutes,
    };
    let config = TokenConfig::try_from(args).expect("config should build");
    assert_eq!(config.ttl, TimeDelta::minutes(expected));
}

#[rstest]
fn negative_coordinates_parse() {
    let cli = Cli::try_parse_from([
        "platewise", "select", "--cuisine", "sushi", "--lat", "-33.87", "--lng", "-151.21",
    ])
    .expect("negative coordinates should parse");
    match cli.command {
        Command::Select(args) => {
            assert_eq!(args.lat, Some(-33.87));
            assert_eq!(args.lng, Some(-151.21));
        }
        other => panic!("expected select, found {other:?}"),
    }
}

#[rstest]
fn database_defaults_to_working_directory() {
    let globals = GlobalArgs::default();
    assert_eq!(globals.database(), Utf8Path::new(DEFAULT_DATABASE));
}

#[rstest]
fn token_requires_session_secret() {
    let globals = GlobalArgs::default();
    let err = globals.session_keys().expect_err("secret is required");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_SESSION_SECRET);
            assert_eq!(env, ENV_SESSION_SECRET);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn token_for_unregistered_user_is_rejected() {
    let env = TestEnv::new();
    let err = env
        .run(&["token", "--email", "nobody@example.com"])
        .expect_err("unregistered user");
    assert!(matches!(err, CliError::Store(StoreError::UnknownUser { .. })));
}

#[rstest]
fn registering_twice_is_rejected() {
    let env = TestEnv::new();
    env.run(&["register", "--email", "ada@example.com", "--name", "Ada"])
        .expect("first registration");
    let user = env.json();
    assert_eq!(user["id"], "ada@example.com");
    assert_eq!(user["display_name"], "Ada");
    let err = env
        .run(&["register", "--email", "ada@example.com"])
        .expect_err("second registration");
    assert!(matches!(err, CliError::Store(StoreError::DuplicateUser { .. })));
}

#[rstest]
fn rerating_unrated_restaurant_reports_missing_rating() {
    let env = TestEnv::new();
    let token = env.register("ada@example.com");
    let err = env
        .run(&[
            "--token", &token, "rerate", "--place-id", "ChIJ-ramen", "--rating", "4",
        ])
        .expect_err("nothing to update");
    assert!(matches!(err, CliError::NoRating { .. }));
}

#[rstest]
fn rerating_restaurant_rated_by_someone_else_reports_missing_rating() {
    let env = TestEnv::new();
    let bob = env.register("bob@example.com");
    env.run(&[
        "--token", &bob, "rate", "--place-id", "ChIJ-ramen", "--rating", "5",
    ])
    .expect("bob rates");
    let ada = env.register("ada@example.com");
    let err = env
        .run(&[
            "--token", &ada, "rerate", "--place-id", "ChIJ-ramen", "--rating", "4",
        ])
        .expect_err("ada has no rating to update");
    match err {
        CliError::NoRating { place_id } => assert_eq!(place_id.as_str(), "ChIJ-ramen"),
        other => panic!("expected NoRating, found {other:?}"),
    }
}

#[rstest]
fn ratings_require_a_token() {
    let env = TestEnv::new();
    env.register("ada@example.com");
    let err = env
        .run(&["--token", "Bearer not-a-jwt", "ratings"])
        .expect_err("bad token");
    assert!(matches!(err, CliError::Auth(_)));
}

#[rstest]
fn invalid_origin_is_reported_before_searching() {
    let env = TestEnv::new();
    let token = env.register("ada@example.com");
    let err = env
        .run(&[
            "--token", &token, "select", "--cuisine", "pizza", "--lat", "120", "--lng", "0",
        ])
        .expect_err("latitude out of range");
    assert!(matches!(
        err,
        CliError::InvalidCriteria(FilterError::InvalidOrigin { .. })
    ));
}

#[rstest]
fn installing_logging_twice_keeps_the_first_subscriber() {
    let first = crate::logging::init(None).expect("first install");
    let second = crate::logging::init(None).expect("second install is tolerated");
    assert!(first.is_none());
    assert!(second.is_none());
}
