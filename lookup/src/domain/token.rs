//! Bearer credential presented to the directory API.
//!
//! The token is a capability: whoever holds it can list the directory. The
//! type therefore has no `Display`, redacts itself in `Debug`, and wipes its
//! buffer on drop.

use std::fmt;

use zeroize::Zeroizing;

/// Error returned when a bearer token is blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("bearer token must not be empty")]
pub struct EmptyBearerToken;

/// Opaque, non-empty bearer token.
///
/// # Examples
/// ```
/// use directory_lookup::domain::BearerToken;
///
/// let token = BearerToken::new("eyJhbGciOiJFUzI1NiJ9.e30.sig").unwrap();
/// assert_eq!(format!("{token:?}"), "BearerToken(<redacted>)");
/// assert!(BearerToken::new("  ").is_err());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(Zeroizing<String>);

impl BearerToken {
    /// Wrap a token string issued by a [`TokenIssuer`](super::ports::TokenIssuer).
    ///
    /// # Errors
    ///
    /// Returns [`EmptyBearerToken`] when `token` is empty or only whitespace.
    pub fn new(token: impl Into<String>) -> Result<Self, EmptyBearerToken> {
        let token = Zeroizing::new(token.into());
        if token.trim().is_empty() {
            return Err(EmptyBearerToken);
        }
        Ok(Self(token))
    }

    /// Raw token text, for building the `Authorization` header only.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}
