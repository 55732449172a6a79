//! Lookup configuration: the JSON credentials file and environment-layered
//! fetch settings loaded via OrthoConfig.

use std::path::{Path, PathBuf};
use std::time::Duration;

use cap_std::{ambient_authority, fs::Dir};
use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::domain::{DEFAULT_MAX_PAGES, DEFAULT_PAGE_LIMIT, FetchLimits};
use crate::outbound::directory::DEFAULT_REQUEST_TIMEOUT;

/// File name looked up next to the executable when no path is given.
pub const DEFAULT_CREDENTIALS_FILE: &str = "IsUserInDirectory.json";

/// Directory API root used when `DIRECTORY_LOOKUP_BASE_URL` is unset.
pub const DEFAULT_BASE_URL: &str = "https://api.appstoreconnect.apple.com/";

/// Errors raised while loading configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The credentials file could not be read.
    #[error("failed to read credentials file '{path}': {message}")]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// Description of the I/O error.
        message: String,
    },
    /// The credentials file is not valid JSON or lacks a key.
    #[error("failed to parse credentials file '{path}': {message}")]
    Parse {
        /// Path that was parsed.
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },
    /// A credential value is empty or whitespace.
    #[error("credential '{field}' must not be blank")]
    Blank {
        /// JSON key of the blank value.
        field: &'static str,
    },
    /// Environment overrides could not be loaded.
    #[error("failed to load fetch settings: {message}")]
    Settings {
        /// Loader diagnostic.
        message: String,
    },
    /// `DIRECTORY_LOOKUP_BASE_URL` is not an absolute URL.
    #[error("invalid base URL '{value}': {message}")]
    BaseUrl {
        /// Rejected value.
        value: String,
        /// Parser diagnostic.
        message: String,
    },
    /// The executable's location could not be resolved.
    #[error("failed to locate the executable: {message}")]
    ExecutablePath {
        /// Description of the failure.
        message: String,
    },
}

/// Signing credentials for the directory API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CredentialSettings {
    /// Path to the PKCS#8 PEM private key.
    #[serde(rename = "PrivateKeyFile", alias = "private_key_file")]
    pub private_key_file: PathBuf,
    /// Identifier of the signing key, sent as the JWT `kid`.
    #[serde(rename = "KeyID", alias = "key_id")]
    pub key_id: String,
    /// Issuer identifier, sent as the JWT `iss`.
    #[serde(rename = "IssuerID", alias = "issuer_id")]
    pub issuer_id: String,
}

impl CredentialSettings {
    /// Parse credentials from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for invalid JSON or missing keys and
    /// [`ConfigError::Blank`] for blank values.
    ///
    /// # Examples
    /// ```
    /// use std::path::Path;
    /// use directory_lookup::config::CredentialSettings;
    ///
    /// let json = r#"{"PrivateKeyFile":"key.p8","KeyID":"K","IssuerID":"I"}"#;
    /// let settings = CredentialSettings::from_json(json, Path::new("c.json")).unwrap();
    /// assert_eq!(settings.key_id, "K");
    /// ```
    pub fn from_json(json: &str, origin: &Path) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(json).map_err(|error| ConfigError::Parse {
            path: origin.to_path_buf(),
            message: error.to_string(),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read and parse the credentials file at `path`.
    ///
    /// A relative `PrivateKeyFile` is resolved against the credentials
    /// file's directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let read_error = |message: String| ConfigError::Read {
            path: path.to_path_buf(),
            message,
        };
        let parent = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let file_name = path
            .file_name()
            .ok_or_else(|| read_error("path does not name a file".to_owned()))?;
        let directory = Dir::open_ambient_dir(parent, ambient_authority())
            .map_err(|error| read_error(error.to_string()))?;
        let json = directory
            .read_to_string(Path::new(file_name))
            .map_err(|error| read_error(error.to_string()))?;

        let mut settings = Self::from_json(&json, path)?;
        if settings.private_key_file.is_relative() {
            settings.private_key_file = parent.join(&settings.private_key_file);
        }
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.private_key_file.as_os_str().is_empty() {
            return Err(ConfigError::Blank {
                field: "PrivateKeyFile",
            });
        }
        if self.key_id.trim().is_empty() {
            return Err(ConfigError::Blank { field: "KeyID" });
        }
        if self.issuer_id.trim().is_empty() {
            return Err(ConfigError::Blank { field: "IssuerID" });
        }
        Ok(())
    }
}

/// Default credentials path: [`DEFAULT_CREDENTIALS_FILE`] beside the
/// running executable.
///
/// # Errors
///
/// Returns [`ConfigError::ExecutablePath`] when the executable path is
/// unavailable.
pub fn default_credentials_path() -> Result<PathBuf, ConfigError> {
    let executable = std::env::current_exe().map_err(|error| ConfigError::ExecutablePath {
        message: error.to_string(),
    })?;
    let directory = executable.parent().unwrap_or_else(|| Path::new("."));
    Ok(directory.join(DEFAULT_CREDENTIALS_FILE))
}

/// Transport tuning layered from `DIRECTORY_LOOKUP_*` environment variables.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "DIRECTORY_LOOKUP")]
pub struct FetchSettings {
    /// Directory API root.
    pub base_url: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Page cap before the cursor chain is declared runaway.
    pub max_pages: Option<usize>,
}

impl FetchSettings {
    /// Load settings from the environment only.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Settings`] when a variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load_from_iter([std::ffi::OsString::from("is-user-in-directory")]).map_err(
            |error| ConfigError::Settings {
                message: error.to_string(),
            },
        )
    }

    /// Configured API root, or [`DEFAULT_BASE_URL`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::BaseUrl`] when the value is not a URL.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let raw = self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        let mut url = Url::parse(raw).map_err(|error| ConfigError::BaseUrl {
            value: raw.to_owned(),
            message: error.to_string(),
        })?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    /// Per-request timeout, or [`DEFAULT_REQUEST_TIMEOUT`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout_secs
            .filter(|secs| *secs > 0)
            .map_or(DEFAULT_REQUEST_TIMEOUT, Duration::from_secs)
    }

    /// Pagination bounds, defaulting the cap to [`DEFAULT_MAX_PAGES`].
    #[must_use]
    pub fn limits(&self) -> FetchLimits {
        FetchLimits {
            page_limit: DEFAULT_PAGE_LIMIT,
            max_pages: self
                .max_pages
                .filter(|pages| *pages > 0)
                .unwrap_or(DEFAULT_MAX_PAGES),
        }
    }
}
