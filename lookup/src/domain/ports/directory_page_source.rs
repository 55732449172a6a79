//! Driven port for fetching raw listing pages from the directory API.
//!
//! The domain owns the error contract so the fetch loop can apply one
//! all-or-nothing policy regardless of transport.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use url::Url;

use super::define_port_error;
use crate::domain::page_decoder::PageDecodeError;

define_port_error! {
    /// Errors that abort a directory fetch. None of them yield partial results.
    pub enum DirectoryFetchError {
        /// The server answered with a 5xx status.
        ServerError { status: u16, detail: String } =>
            "directory server error (status {status}): {detail}",
        /// The server rejected the bearer token.
        Unauthorized { status: u16 } =>
            "directory rejected credentials (status {status})",
        /// Any other non-success status.
        UnexpectedStatus { status: u16, detail: String } =>
            "directory returned unexpected status {status}: {detail}",
        /// Connection, DNS or protocol failure before a response arrived.
        Network { message: String } =>
            "directory transport failed: {message}",
        /// The request exceeded its timeout.
        Timeout { message: String } =>
            "directory request timed out: {message}",
        /// The caller cancelled the fetch.
        Cancelled => "directory fetch cancelled",
        /// A page body could not be decoded.
        Decode { source: PageDecodeError } =>
            "directory page decode failed: {source}",
        /// The cursor chain did not terminate within the configured bounds.
        PaginationLimitExceeded { pages: usize, records: usize } =>
            "pagination did not terminate after {pages} pages and {records} records",
        /// The configured endpoint could not produce a listing URL.
        InvalidEndpoint { message: String } =>
            "directory endpoint invalid: {message}",
    }
}

impl DirectoryFetchError {
    /// Whether this error came from a 5xx response.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ServerError { .. })
    }
}

/// Port returning the raw body of one listing page.
///
/// Implementations authenticate every request and surface non-success
/// statuses as errors; they never retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DirectoryPageSource: Send + Sync {
    /// Fetch the page at `url`, which is either the first listing URL or a
    /// server-issued cursor used verbatim.
    async fn fetch_page(&self, url: &Url) -> Result<Vec<u8>, DirectoryFetchError>;
}

/// In-memory page source keyed by exact URL.
///
/// Unknown URLs answer `UnexpectedStatus` 404. Every requested URL is
/// recorded so callers can assert on the request sequence.
///
/// # Examples
/// ```
/// use directory_lookup::domain::ports::{DirectoryPageSource, FixtureDirectoryPageSource};
/// use url::Url;
///
/// # tokio_test_block(async {
/// let url = Url::parse("https://directory.test/v1/users?limit=100").unwrap();
/// let source = FixtureDirectoryPageSource::default().with_page(&url, br#"{"data":[]}"#.to_vec());
/// assert_eq!(source.fetch_page(&url).await.unwrap(), br#"{"data":[]}"#.to_vec());
/// assert_eq!(source.requested_urls(), vec![url]);
/// # });
/// # fn tokio_test_block(f: impl std::future::Future<Output = ()>) {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f);
/// # }
/// ```
#[derive(Debug, Default)]
pub struct FixtureDirectoryPageSource {
    pages: BTreeMap<String, Result<Vec<u8>, DirectoryFetchError>>,
    requested: Mutex<Vec<Url>>,
}

impl FixtureDirectoryPageSource {
    /// Serve `body` for `url`.
    #[must_use]
    pub fn with_page(mut self, url: &Url, body: impl Into<Vec<u8>>) -> Self {
        self.pages.insert(url.as_str().to_owned(), Ok(body.into()));
        self
    }

    /// Fail requests for `url` with `error`.
    #[must_use]
    pub fn with_error(mut self, url: &Url, error: DirectoryFetchError) -> Self {
        self.pages.insert(url.as_str().to_owned(), Err(error));
        self
    }

    /// URLs requested so far, in request order.
    #[must_use]
    pub fn requested_urls(&self) -> Vec<Url> {
        self.requested
            .lock()
            .map(|requested| requested.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl DirectoryPageSource for FixtureDirectoryPageSource {
    async fn fetch_page(&self, url: &Url) -> Result<Vec<u8>, DirectoryFetchError> {
        if let Ok(mut requested) = self.requested.lock() {
            requested.push(url.clone());
        }
        self.pages.get(url.as_str()).cloned().unwrap_or_else(|| {
            Err(DirectoryFetchError::unexpected_status(
                404_u16,
                format!("no fixture page for {url}"),
            ))
        })
    }
}
