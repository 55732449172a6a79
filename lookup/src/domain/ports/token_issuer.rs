//! Driven port for minting the directory bearer token.

use super::define_port_error;
use crate::domain::BearerToken;

define_port_error! {
    /// Errors surfaced while minting a bearer token.
    pub enum TokenIssuerError {
        /// Signing key material could not be decoded.
        InvalidKey { message: String } =>
            "signing key invalid: {message}",
        /// The signer rejected the key or claims.
        Signing { message: String } =>
            "token signing failed: {message}",
    }
}

/// Port producing a bearer token for one lookup session.
pub trait TokenIssuer: Send + Sync {
    /// Mint a fresh token.
    ///
    /// # Errors
    ///
    /// Returns [`TokenIssuerError`] when the key or signer fails.
    fn issue(&self) -> Result<BearerToken, TokenIssuerError>;
}
