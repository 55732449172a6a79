//! Directory API outbound adapters.
//!
//! This module provides a thin HTTP implementation of the
//! `DirectoryPageSource` port.

mod http_source;

pub use http_source::{DEFAULT_REQUEST_TIMEOUT, DirectoryHttpSource, DirectorySessionError};
