//! ES256 JWT issuer for the directory API.
//!
//! Tokens carry the key identifier in the header and `iss`, `iat`, `exp` and
//! `aud` claims. The clock is injected so tests can pin `iat`.

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::TimeDelta;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use mockable::Clock;
use serde::Serialize;
use tracing::debug;
use zeroize::Zeroizing;

use crate::domain::BearerToken;
use crate::domain::ports::{TokenIssuer, TokenIssuerError};

/// Audience the directory API expects.
pub const DIRECTORY_AUDIENCE: &str = "appstoreconnect-v1";

/// Validity window of an issued token, in seconds.
pub const TOKEN_LIFETIME_SECS: i64 = 20 * 60;

#[derive(Debug, Serialize)]
struct DirectoryClaims<'a> {
    iss: &'a str,
    iat: i64,
    exp: i64,
    aud: &'a str,
}

/// Signs short-lived directory tokens with a PKCS#8 P-256 key.
pub struct AppStoreJwtIssuer {
    key_id: String,
    issuer_id: String,
    key: EncodingKey,
    clock: Arc<dyn Clock>,
}

impl AppStoreJwtIssuer {
    /// Build an issuer from the base64 payload of a PKCS#8 PEM key.
    ///
    /// `private_key` is the output of
    /// [`strip_pem_armour`](super::strip_pem_armour).
    ///
    /// # Errors
    ///
    /// Returns [`TokenIssuerError::InvalidKey`] when the payload is not valid
    /// base64.
    pub fn new(
        key_id: impl Into<String>,
        issuer_id: impl Into<String>,
        private_key: &str,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, TokenIssuerError> {
        let der = Zeroizing::new(
            STANDARD
                .decode(private_key.trim())
                .map_err(|error| TokenIssuerError::invalid_key(error.to_string()))?,
        );
        if der.is_empty() {
            return Err(TokenIssuerError::invalid_key("key payload is empty"));
        }
        Ok(Self {
            key_id: key_id.into(),
            issuer_id: issuer_id.into(),
            key: EncodingKey::from_ec_der(&der),
            clock,
        })
    }
}

impl TokenIssuer for AppStoreJwtIssuer {
    fn issue(&self) -> Result<BearerToken, TokenIssuerError> {
        let issued_at = self.clock.utc();
        let claims = DirectoryClaims {
            iss: &self.issuer_id,
            iat: issued_at.timestamp(),
            exp: (issued_at + TimeDelta::seconds(TOKEN_LIFETIME_SECS)).timestamp(),
            aud: DIRECTORY_AUDIENCE,
        };
        let mut header = Header::new(Algorithm::ES256);
        header.kid = Some(self.key_id.clone());

        let token = Zeroizing::new(
            encode(&header, &claims, &self.key)
                .map_err(|error| TokenIssuerError::signing(error.to_string()))?,
        );
        debug!(key_id = %self.key_id, expires_at = claims.exp, "issued directory token");
        BearerToken::new(token.as_str())
            .map_err(|error| TokenIssuerError::signing(error.to_string()))
    }
}

#[cfg(test)]
mod tests {
    //! Signature and claim checks against a fixture P-256 key pair.

    use chrono::{DateTime, Local, TimeZone, Utc};
    use jsonwebtoken::{DecodingKey, Validation, decode, decode_header};
    use rstest::{fixture, rstest};
    use serde::Deserialize;

    use super::*;
    use crate::outbound::signing::strip_pem_armour;

    const PRIVATE_PEM: &str = include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/fixtures/signing/test_es256_private.pem"
    ));
    const PUBLIC_PEM: &str = include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/fixtures/signing/test_es256_public.pem"
    ));

    struct FixtureClock {
        utc_now: DateTime<Utc>,
    }

    impl Clock for FixtureClock {
        fn local(&self) -> DateTime<Local> {
            self.utc_now.with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            self.utc_now
        }
    }

    #[derive(Debug, Deserialize)]
    struct DecodedClaims {
        iss: String,
        iat: i64,
        exp: i64,
        aud: String,
    }

    fn fixture_timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 24, 10, 30, 0)
            .single()
            .expect("valid fixture timestamp")
    }

    #[fixture]
    fn issuer() -> AppStoreJwtIssuer {
        AppStoreJwtIssuer::new(
            "ABC123DEFG",
            "57246542-96fe-1a63-e053-0824d011072a",
            &strip_pem_armour(PRIVATE_PEM),
            Arc::new(FixtureClock {
                utc_now: fixture_timestamp(),
            }),
        )
        .expect("fixture key decodes")
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::ES256);
        validation.set_audience(&[DIRECTORY_AUDIENCE]);
        validation.validate_exp = false;
        validation
    }

    #[rstest]
    fn issued_token_verifies_with_the_public_key(issuer: AppStoreJwtIssuer) {
        let token = issuer.issue().expect("token issues");
        let key = DecodingKey::from_ec_pem(PUBLIC_PEM.as_bytes()).expect("public key parses");

        let decoded =
            decode::<DecodedClaims>(token.expose(), &key, &validation()).expect("token verifies");

        let issued_at = fixture_timestamp().timestamp();
        assert_eq!(decoded.claims.iss, "57246542-96fe-1a63-e053-0824d011072a");
        assert_eq!(decoded.claims.aud, DIRECTORY_AUDIENCE);
        assert_eq!(decoded.claims.iat, issued_at);
        assert_eq!(decoded.claims.exp, issued_at + TOKEN_LIFETIME_SECS);
    }

    #[rstest]
    fn header_names_the_key(issuer: AppStoreJwtIssuer) {
        let token = issuer.issue().expect("token issues");
        let header = decode_header(token.expose()).expect("header decodes");

        assert_eq!(header.alg, Algorithm::ES256);
        assert_eq!(header.kid.as_deref(), Some("ABC123DEFG"));
    }

    #[rstest]
    #[case::not_base64("not base64 !!")]
    #[case::empty("")]
    fn undecodable_key_is_rejected(#[case] payload: &str) {
        let result = AppStoreJwtIssuer::new(
            "ABC123DEFG",
            "issuer",
            payload,
            Arc::new(FixtureClock {
                utc_now: fixture_timestamp(),
            }),
        );
        assert!(matches!(result, Err(TokenIssuerError::InvalidKey { .. })));
    }

    #[test]
    fn key_that_is_not_an_ec_key_fails_at_signing() {
        let issuer = AppStoreJwtIssuer::new(
            "ABC123DEFG",
            "issuer",
            &STANDARD.encode(b"definitely not a key"),
            Arc::new(FixtureClock {
                utc_now: fixture_timestamp(),
            }),
        )
        .expect("payload is valid base64");

        assert!(matches!(issuer.issue(), Err(TokenIssuerError::Signing { .. })));
    }
}
