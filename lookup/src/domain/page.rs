//! One decoded page of the directory user listing.

use url::Url;

use super::user::UserRecord;

/// Decoded listing page.
///
/// Pages are transient: the fetch loop merges `records` into its accumulator
/// and follows `next_cursor`, then drops the page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DirectoryPage {
    /// Users on this page, in response order.
    pub records: Vec<UserRecord>,
    /// Absolute URL of the next page, used verbatim when present.
    pub next_cursor: Option<Url>,
    /// Total number of users the server reports for the whole listing.
    pub total_count: Option<u64>,
    /// Page size the server applied.
    pub page_limit: Option<u64>,
}

impl DirectoryPage {
    /// Whether another page follows this one.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.next_cursor.is_some()
    }
}
