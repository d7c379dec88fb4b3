//! Tracing subscriber setup.
//!
//! Records from the `log` facade used by the library crates are forwarded
//! into the same subscriber.

use camino::Utf8Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::CliError;

const LOG_FILE_PREFIX: &str = "platewise.log";
const DEFAULT_FILTER: &str = "info";

/// Install the global subscriber.
///
/// Output goes to stderr unless `log_dir` is given, in which case it is
/// written to a daily-rotated `platewise.log` inside that directory. The
/// returned guard flushes the file writer when dropped and must be held for
/// the lifetime of the command. `RUST_LOG` overrides the default `info`
/// filter.
pub(crate) fn init(log_dir: Option<&Utf8Path>) -> Result<Option<WorkerGuard>, CliError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let Some(dir) = log_dir else {
        if let Err(err) = builder.with_writer(std::io::stderr).try_init() {
            report_existing_subscriber(&*err);
        }
        return Ok(None);
    };

    platewise_fs::ensure_dir(dir).map_err(|source| CliError::LogDirectory {
        path: dir.to_path_buf(),
        source,
    })?;
    let appender = tracing_appender::rolling::daily(dir.as_std_path(), LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    if let Err(err) = builder.with_ansi(false).with_writer(writer).try_init() {
        report_existing_subscriber(&*err);
    }
    Ok(Some(guard))
}

/// A subscriber installed earlier (for example by a test harness) stays in
/// place; the failed install is reported through it.
fn report_existing_subscriber(err: &dyn std::error::Error) {
    tracing::debug!(error = %err, "tracing subscriber already installed");
}
