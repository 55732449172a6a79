//! Reqwest-backed directory page source.
//!
//! This adapter is the authenticated session for one lookup: it owns a
//! client with the bearer token installed as a sensitive default header,
//! maps transport failures and HTTP statuses onto `DirectoryFetchError`, and
//! returns raw bodies for the domain decoder.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::debug;
use url::Url;
use zeroize::Zeroizing;

use crate::domain::BearerToken;
use crate::domain::ports::{DirectoryFetchError, DirectoryPageSource};

/// Per-request timeout applied when none is configured.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_USER_AGENT: &str = "directory-lookup/0.1";

/// Errors raised while building the session.
#[derive(Debug, Error)]
pub enum DirectorySessionError {
    /// The token contains bytes that cannot appear in an HTTP header.
    #[error("bearer token is not a valid header value")]
    InvalidToken,
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Authenticated page source for one fetch.
///
/// Connections are opened lazily on the first request and pooled for the
/// remaining pages; dropping the source releases them.
pub struct DirectoryHttpSource {
    client: Client,
}

impl DirectoryHttpSource {
    /// Build a session presenting `token` on every request.
    /// ```rust,ignore
    /// let token = BearerToken::new(issued)?;
    /// let source = DirectoryHttpSource::new(&token, DEFAULT_REQUEST_TIMEOUT)?;
    /// ```
    /// # Errors
    ///
    /// Returns [`DirectorySessionError`] when the token is not header-safe or
    /// the client cannot be constructed.
    pub fn new(token: &BearerToken, timeout: Duration) -> Result<Self, DirectorySessionError> {
        let client = Client::builder()
            .default_headers(default_headers(token)?)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

fn default_headers(token: &BearerToken) -> Result<HeaderMap, DirectorySessionError> {
    let credential = Zeroizing::new(format!("Bearer {}", token.expose()));
    let mut authorization = HeaderValue::from_str(credential.as_str())
        .map_err(|_| DirectorySessionError::InvalidToken)?;
    authorization.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, authorization);
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
    Ok(headers)
}

#[async_trait]
impl DirectoryPageSource for DirectoryHttpSource {
    async fn fetch_page(&self, url: &Url) -> Result<Vec<u8>, DirectoryFetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let read = response.bytes().await;
        if !status.is_success() {
            // The status decides the error; an unreadable body only loses the preview.
            let detail = read.as_ref().map_or(&[][..], |bytes| bytes.as_ref());
            debug!(url = %url, status = status.as_u16(), "directory error response");
            return Err(map_status_error(status, detail));
        }
        let body = read.map_err(map_transport_error)?;
        debug!(url = %url, status = status.as_u16(), bytes = body.len(), "directory response");
        Ok(body.to_vec())
    }
}

fn map_transport_error(error: reqwest::Error) -> DirectoryFetchError {
    let is_timeout = error.is_timeout();
    // The URL is logged separately; keep it out of the error text.
    let message = error.without_url().to_string();
    if is_timeout {
        DirectoryFetchError::timeout(message)
    } else {
        DirectoryFetchError::network(message)
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> DirectoryFetchError {
    let detail = body_preview(body);
    match status {
        _ if status.is_server_error() => DirectoryFetchError::server_error(status.as_u16(), detail),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            DirectoryFetchError::unauthorized(status.as_u16())
        }
        StatusCode::REQUEST_TIMEOUT => DirectoryFetchError::timeout(format!(
            "status {}: {detail}",
            status.as_u16()
        )),
        _ => DirectoryFetchError::unexpected_status(status.as_u16(), detail),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
