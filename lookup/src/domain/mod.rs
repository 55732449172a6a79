//! Directory domain: records, closed enumerations, ports and the fetch loop.
//!
//! Public surface:
//! - `Role`, `RecordType`: closed wire enumerations with strict decoding.
//! - `UserRecord`, `find_user_by_email`: accumulated users and the match.
//! - `decode_page`: one listing page into a `DirectoryPage`.
//! - `DirectoryFetcher`: the pagination engine.
//! - `BearerToken`: redacting credential wrapper.

pub mod directory_fetcher;
pub mod page;
pub mod page_decoder;
pub mod ports;
pub mod role;
pub mod token;
pub mod user;

pub use self::directory_fetcher::{
    DEFAULT_MAX_PAGES, DEFAULT_PAGE_LIMIT, DirectoryFetcher, FetchLimits, users_endpoint,
};
pub use self::page::DirectoryPage;
pub use self::page_decoder::{PageDecodeError, decode_page};
pub use self::role::{EnumKind, RecordType, Role, UnknownEnumValue};
pub use self::token::{BearerToken, EmptyBearerToken};
pub use self::user::{UserRecord, find_user_by_email};
