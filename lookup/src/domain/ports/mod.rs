//! Domain ports for the directory boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod directory_page_source;
mod token_issuer;

#[cfg(test)]
pub use directory_page_source::MockDirectoryPageSource;
pub use directory_page_source::{
    DirectoryFetchError, DirectoryPageSource, FixtureDirectoryPageSource,
};
pub use token_issuer::{TokenIssuer, TokenIssuerError};
