//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use platewise_cli::CliError;

fn main() {
    match platewise_cli::run() {
        Ok(()) => {}
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("platewise: {err}");
            std::process::exit(1);
        }
    }
}
