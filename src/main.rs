//! cppcheck_junit binary entry point.
//! Resolves settings, runs the conversion, and maps the outcome to an exit code.

use clap::Parser;
use cppcheck_junit::app::{self, FAILURE_EXIT_CODE};
use cppcheck_junit::cli::Cli;
use cppcheck_junit::config;
use cppcheck_junit::env::Env;
use cppcheck_junit::utils::error_prefix;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "CPPCHECK_JUNIT_LOG";

fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("{} {}", error_prefix(), msg);
    std::process::exit(FAILURE_EXIT_CODE);
}

fn main() {
    let cli = Cli::parse();

    let env = Env::system().unwrap_or_else(|e| fail(e));
    let eff = config::resolve_effective(cli.config.as_deref(), cli.bitbucket, cli.error_exitcode)
        .unwrap_or_else(|e| fail(e));
    init_logging(&eff.log);
    debug!(?eff, "effective settings");

    match app::run(
        &cli.input_file,
        &cli.output_file,
        eff.shape,
        eff.error_exitcode,
        &env,
    ) {
        Ok(outcome) => {
            debug!(?outcome, "done");
            std::process::exit(outcome.exit_code());
        }
        Err(e) => fail(e),
    }
}
