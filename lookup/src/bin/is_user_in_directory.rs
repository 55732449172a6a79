//! Report whether an email address belongs to a directory user.
//!
//! Exit codes: 0 found, 1 not found, 255 invalid arguments, 253 any other
//! failure. Diagnostics are logged as JSON to stderr; stdout carries only the
//! one-line result.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use clap::error::ErrorKind;
use directory_lookup::cli::{
    CliArgs, ERROR_MESSAGE, EXIT_INTERNAL_ERROR, EXIT_INVALID_ARGUMENTS, LookupError,
    LookupOutcome, Report, report, run_lookup,
};
use directory_lookup::config::FetchSettings;
use mockable::DefaultClock;
use tokio::runtime::Builder;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> ExitCode {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .with_writer(io::stderr)
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let exit_code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => EXIT_INVALID_ARGUMENTS,
            };
            if let Err(print_err) = err.print() {
                drop(print_err);
            }
            return ExitCode::from(exit_code);
        }
    };

    let runtime = match Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(err) => {
            error!(error = %err, "failed to create Tokio runtime");
            write_line(ERROR_MESSAGE);
            return ExitCode::from(EXIT_INTERNAL_ERROR);
        }
    };

    let Report { exit_code, message } = runtime.block_on(async {
        let result = lookup(&args).await;
        report(&args.email, &result)
    });
    write_line(&message);
    ExitCode::from(exit_code)
}

async fn lookup(args: &CliArgs) -> Result<LookupOutcome, LookupError> {
    let settings = FetchSettings::from_env()?;
    let cancellation = CancellationToken::new();
    let trigger = cancellation.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received; cancelling lookup");
            trigger.cancel();
        }
    });
    run_lookup(args, &settings, Arc::new(DefaultClock), cancellation).await
}

fn write_line(message: &str) {
    if let Err(err) = writeln!(io::stdout().lock(), "{message}") {
        drop(err);
    }
}
