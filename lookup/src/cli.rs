//! Command-line surface of `is-user-in-directory`.
//!
//! Parsing, wiring and reporting live here so the binary stays a thin shell
//! and the exit-code mapping can be tested without spawning a process.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use mockable::Clock;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::{ConfigError, CredentialSettings, FetchSettings, default_credentials_path};
use crate::domain::ports::{DirectoryFetchError, TokenIssuer, TokenIssuerError};
use crate::domain::{DirectoryFetcher, UserRecord};
use crate::outbound::directory::{DirectoryHttpSource, DirectorySessionError};
use crate::outbound::signing::{AppStoreJwtIssuer, KeyMaterialError, read_private_key};

/// Exit code when the user exists.
pub const EXIT_FOUND: u8 = 0;
/// Exit code when the directory holds no matching user.
pub const EXIT_NOT_FOUND: u8 = 1;
/// Exit code for unparseable arguments (`-1` as a byte).
pub const EXIT_INVALID_ARGUMENTS: u8 = 255;
/// Exit code for any other failure (`-3` as a byte).
pub const EXIT_INTERNAL_ERROR: u8 = 253;

/// Line printed for any failure; details go to the log only.
pub const ERROR_MESSAGE: &str = "Error!";

/// `is-user-in-directory` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "is-user-in-directory",
    about = "Check whether an email address belongs to a directory user and list their roles",
    version
)]
pub struct CliArgs {
    /// Email address to look up.
    #[arg(value_name = "email")]
    pub email: String,
    /// Credentials file. Defaults to `IsUserInDirectory.json` beside the
    /// executable.
    #[arg(long = "config", value_name = "path")]
    pub config: Option<PathBuf>,
}

/// Result of a completed lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// The directory holds a matching user.
    Found(UserRecord),
    /// Every page was read and nobody matched.
    NotFound,
}

/// Any failure between reading configuration and finishing the fetch.
#[derive(Debug, Error)]
pub enum LookupError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The signing key could not be read.
    #[error(transparent)]
    KeyMaterial(#[from] KeyMaterialError),
    /// The bearer token could not be minted.
    #[error(transparent)]
    Token(#[from] TokenIssuerError),
    /// The HTTP session could not be built.
    #[error(transparent)]
    Session(#[from] DirectorySessionError),
    /// The directory fetch failed.
    #[error(transparent)]
    Fetch(#[from] DirectoryFetchError),
}

/// Exit code and stdout line for one finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Process exit code.
    pub exit_code: u8,
    /// Line written to stdout.
    pub message: String,
}

/// `Found user: <email>, <first> <last> [<Role>, ...]`.
///
/// The email is echoed as queried; roles use their member names.
///
/// # Examples
/// ```
/// use directory_lookup::cli::found_message;
/// use directory_lookup::domain::{Role, UserRecord};
///
/// let user = UserRecord::new("b@x.com", "B", "Y", vec![Role::Admin, Role::AppManager]);
/// assert_eq!(found_message("B@x.com", &user), "Found user: B@x.com, B Y [Admin, AppManager]");
/// ```
#[must_use]
pub fn found_message(email: &str, user: &UserRecord) -> String {
    let roles = user
        .roles()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Found user: {email}, {} {} [{roles}]",
        user.first_name(),
        user.last_name()
    )
}

/// `User: <email> not found`.
#[must_use]
pub fn not_found_message(email: &str) -> String {
    format!("User: {email} not found")
}

/// Map a finished lookup to its exit code and stdout line.
#[must_use]
pub fn report(email: &str, result: &Result<LookupOutcome, LookupError>) -> Report {
    match result {
        Ok(LookupOutcome::Found(user)) => Report {
            exit_code: EXIT_FOUND,
            message: found_message(email, user),
        },
        Ok(LookupOutcome::NotFound) => Report {
            exit_code: EXIT_NOT_FOUND,
            message: not_found_message(email),
        },
        Err(err) => {
            error!(error = %err, "lookup failed");
            Report {
                exit_code: EXIT_INTERNAL_ERROR,
                message: ERROR_MESSAGE.to_owned(),
            }
        }
    }
}

/// Run `fetcher` to completion and match `email` against the result.
///
/// # Errors
///
/// Returns [`LookupError::Fetch`] when the fetch fails.
pub async fn lookup_user(
    fetcher: DirectoryFetcher,
    email: &str,
) -> Result<LookupOutcome, LookupError> {
    let outcome = match fetcher.find_user(email).await? {
        Some(user) => LookupOutcome::Found(user),
        None => LookupOutcome::NotFound,
    };
    info!(found = matches!(outcome, LookupOutcome::Found(_)), "lookup complete");
    Ok(outcome)
}

/// Load credentials, mint a token, open a session and run one lookup.
///
/// # Errors
///
/// Returns [`LookupError`] for the first failing step.
pub async fn run_lookup(
    args: &CliArgs,
    settings: &FetchSettings,
    clock: Arc<dyn Clock>,
    cancellation: CancellationToken,
) -> Result<LookupOutcome, LookupError> {
    let credentials_path = args.config.clone().map_or_else(default_credentials_path, Ok)?;
    let credentials = CredentialSettings::load(&credentials_path)?;
    let private_key = read_private_key(&credentials.private_key_file)?;
    let issuer = AppStoreJwtIssuer::new(
        credentials.key_id,
        credentials.issuer_id,
        &private_key,
        clock,
    )?;
    let token = issuer.issue()?;

    let source = DirectoryHttpSource::new(&token, settings.timeout())?;
    let fetcher = DirectoryFetcher::new(Arc::new(source), settings.base_url()?)
        .with_limits(settings.limits())
        .with_cancellation(cancellation);
    lookup_user(fetcher, &args.email).await
}
