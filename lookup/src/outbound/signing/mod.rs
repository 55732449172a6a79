//! Signing adapter: key material loading and the ES256 token issuer.

mod jwt_issuer;
mod key_material;

pub use jwt_issuer::{AppStoreJwtIssuer, DIRECTORY_AUDIENCE, TOKEN_LIFETIME_SECS};
pub use key_material::{KeyMaterialError, read_private_key, strip_pem_armour};
