//! Pagination engine that accumulates the full directory user set.
//!
//! A fetcher is single-use: [`DirectoryFetcher::fetch_all_users`] consumes it,
//! walks the cursor chain from the first listing page until a page carries no
//! cursor, and returns every record in encounter order. Any error aborts the
//! walk and discards what was accumulated, so callers see either the whole
//! set or nothing.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use super::page::DirectoryPage;
use super::page_decoder::decode_page;
use super::ports::{DirectoryFetchError, DirectoryPageSource};
use super::user::{UserRecord, find_user_by_email};

/// Page size requested on the first listing call.
pub const DEFAULT_PAGE_LIMIT: u32 = 100;

/// Upper bound on pages followed before the chain is declared runaway.
pub const DEFAULT_MAX_PAGES: usize = 1_000;

const USERS_PATH: &str = "v1/users";

/// Bounds applied to one fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchLimits {
    /// `limit` query parameter of the first request.
    pub page_limit: u32,
    /// Maximum number of pages requested before failing.
    pub max_pages: usize,
}

impl Default for FetchLimits {
    fn default() -> Self {
        Self {
            page_limit: DEFAULT_PAGE_LIMIT,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

/// Build the first listing URL: `<base>/v1/users?limit=<page_limit>`.
///
/// Any query already present on `base` is replaced.
///
/// # Errors
///
/// Returns [`url::ParseError`] when `base` cannot be joined with the path.
///
/// # Examples
/// ```
/// use directory_lookup::domain::users_endpoint;
/// use url::Url;
///
/// let base = Url::parse("https://directory.test").unwrap();
/// let url = users_endpoint(&base, 100).unwrap();
/// assert_eq!(url.as_str(), "https://directory.test/v1/users?limit=100");
/// ```
pub fn users_endpoint(base: &Url, page_limit: u32) -> Result<Url, url::ParseError> {
    let mut url = base.join(USERS_PATH)?;
    url.query_pairs_mut()
        .clear()
        .append_pair("limit", &page_limit.to_string());
    Ok(url)
}

/// Single-use fetcher over one authenticated page source.
pub struct DirectoryFetcher {
    source: Arc<dyn DirectoryPageSource>,
    base_url: Url,
    limits: FetchLimits,
    cancellation: Option<CancellationToken>,
}

impl DirectoryFetcher {
    /// Create a fetcher reading from `source`, rooted at `base_url`.
    #[must_use]
    pub fn new(source: Arc<dyn DirectoryPageSource>, base_url: Url) -> Self {
        Self {
            source,
            base_url,
            limits: FetchLimits::default(),
            cancellation: None,
        }
    }

    /// Replace the default page size and page cap.
    #[must_use]
    pub fn with_limits(mut self, limits: FetchLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Abort the in-flight request with [`DirectoryFetchError::Cancelled`]
    /// once `token` is cancelled.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Fetch every page and return all users in page-then-record order.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryFetchError`] on the first failing request, the
    /// first undecodable page, cancellation, or a cursor chain that exceeds
    /// [`FetchLimits::max_pages`] or the server's declared total. No partial
    /// result is returned in any of these cases.
    pub async fn fetch_all_users(self) -> Result<Vec<UserRecord>, DirectoryFetchError> {
        let first = users_endpoint(&self.base_url, self.limits.page_limit)
            .map_err(|error| DirectoryFetchError::invalid_endpoint(error.to_string()))?;

        let mut users = Vec::new();
        let mut pages = 0_usize;
        let mut next = Some(first);

        while let Some(url) = next.take() {
            if pages >= self.limits.max_pages {
                warn!(pages, records = users.len(), "pagination cap reached");
                return Err(DirectoryFetchError::pagination_limit_exceeded(
                    pages,
                    users.len(),
                ));
            }

            let body = self.request(&url).await?;
            let page = decode_page(&body).map_err(DirectoryFetchError::decode)?;
            pages += 1;
            debug!(
                page = pages,
                url = %url,
                records = page.records.len(),
                has_next = page.has_next(),
                "decoded directory page"
            );

            let DirectoryPage {
                records,
                next_cursor,
                total_count,
                page_limit,
            } = page;
            users.extend(records);
            self.check_declared_total(total_count, page_limit, pages, users.len())?;

            if let Some(cursor) = next_cursor {
                if cursor == url {
                    warn!(url = %url, "directory returned a cursor to the page just read");
                    return Err(DirectoryFetchError::pagination_limit_exceeded(
                        pages,
                        users.len(),
                    ));
                }
                next = Some(cursor);
            }
        }

        info!(pages, records = users.len(), "directory fetch complete");
        Ok(users)
    }

    /// Fetch every page, then return the first user whose name matches
    /// `email` ignoring case. `Ok(None)` means the fetch succeeded and no
    /// user matched.
    ///
    /// # Errors
    ///
    /// Propagates any [`DirectoryFetchError`] from
    /// [`fetch_all_users`](Self::fetch_all_users).
    pub async fn find_user(self, email: &str) -> Result<Option<UserRecord>, DirectoryFetchError> {
        let users = self.fetch_all_users().await?;
        Ok(find_user_by_email(&users, email).cloned())
    }

    async fn request(&self, url: &Url) -> Result<Vec<u8>, DirectoryFetchError> {
        match &self.cancellation {
            Some(token) => {
                tokio::select! {
                    biased;
                    () = token.cancelled() => Err(DirectoryFetchError::cancelled()),
                    result = self.source.fetch_page(url) => result,
                }
            }
            None => self.source.fetch_page(url).await,
        }
    }

    fn check_declared_total(
        &self,
        total_count: Option<u64>,
        page_limit: Option<u64>,
        pages: usize,
        records: usize,
    ) -> Result<(), DirectoryFetchError> {
        let Some(total) = total_count else {
            return Ok(());
        };
        // One page of slack covers users added while the walk is in progress.
        let slack = page_limit.unwrap_or_else(|| u64::from(self.limits.page_limit));
        let accumulated = u64::try_from(records).unwrap_or(u64::MAX);
        if accumulated > total.saturating_add(slack) {
            warn!(pages, records, total, "accumulated more users than the directory declared");
            return Err(DirectoryFetchError::pagination_limit_exceeded(pages, records));
        }
        Ok(())
    }
}
