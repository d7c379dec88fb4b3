//! Test helpers for running CLI commands against a temporary database.

use super::*;
use platewise_core::test_support::StubPlaceSearch;
use platewise_core::{PlaceSearch, PlaceSearchError, Restaurant};
use std::cell::RefCell;
use tempfile::TempDir;

pub(super) const SECRET: &str = "test-session-secret";

/// Place search handed to `select`, answering with fixed results or a
/// fixed error.
#[derive(Debug, Clone)]
pub(super) enum StubSearch {
    Results(Vec<Restaurant>),
    Failure(PlaceSearchError),
}

impl SearchBuilder for StubSearch {
    fn build(&self, _globals: &GlobalArgs) -> Result<Box<dyn PlaceSearch>, CliError> {
        Ok(match self.clone() {
            Self::Results(results) => Box::new(StubPlaceSearch::with_results(results)),
            Self::Failure(error) => Box::new(StubPlaceSearch::with_error(error)),
        })
    }
}

/// A temporary database plus the output of the last command.
pub(super) struct TestEnv {
    _dir: TempDir,
    database: Utf8PathBuf,
    pub(super) search: RefCell<StubSearch>,
    pub(super) stdout: RefCell<String>,
}

impl TestEnv {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self {
            _dir: dir,
            database: root.join("platewise.db"),
            search: RefCell::new(StubSearch::Results(Vec::new())),
            stdout: RefCell::new(String::new()),
        }
    }

    /// Run `platewise <args>` against the temporary database.
    pub(super) fn run(&self, args: &[&str]) -> Result<(), CliError> {
        let mut argv = vec![
            "platewise".to_owned(),
            format!("--{ARG_DATABASE}"),
            self.database.as_str().to_owned(),
            format!("--{ARG_SESSION_SECRET}"),
            SECRET.to_owned(),
        ];
        argv.extend(args.iter().map(|arg| (*arg).to_owned()));
        let cli = Cli::try_parse_from(argv)?;
        let mut output = Vec::new();
        let result = run_with(cli, &*self.search.borrow(), &mut output);
        *self.stdout.borrow_mut() = String::from_utf8(output).expect("utf-8 output");
        result
    }

    /// Register `email` and return its bearer token.
    pub(super) fn register(&self, email: &str) -> String {
        self.run(&["register", "--email", email])
            .expect("register should succeed");
        self.run(&["token", "--email", email])
            .expect("token should succeed");
        self.stdout.borrow().trim().to_owned()
    }

    pub(super) fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout.borrow()).expect("command should print JSON")
    }
}
