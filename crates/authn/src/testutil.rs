//! Shared test utilities for API-key authentication testing.
//!
//! This module provides helpers for minting well-formed current- and
//! legacy-format tokens and the stored secret material that matches them.
//! It is feature-gated behind `testutil` to prevent leaking into
//! production builds — the authentication core itself never mints keys.
//!
//! # Usage
//!
//! In integration tests, enable the feature in `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! stratus-common-authn = { path = "../authn", features = ["testutil"] }
//! ```

use argon2::{
    Argon2, PasswordHasher,
    password_hash::{
        SaltString,
        rand_core::{OsRng, RngCore},
    },
};
use base64::{Engine, engine::general_purpose::STANDARD};
use sha2::{Digest, Sha256};

use stratus_common_storage::OrgId;

use crate::{client::Request, keygen::checksum_of, token::BASIC_PREFIX};

/// A freshly minted current-format key: the token a client would present
/// and the lookup hash the store would keep.
pub struct MintedKey {
    /// Full token, e.g. `stak_<secret>_<checksum>`.
    pub token: String,
    /// Hex SHA-256 lookup hash of the token.
    pub hash: String,
}

/// Mints a current-format token for the given service discriminator.
///
/// `service` is appended to the generation prefix to form the leading
/// section, e.g. `"ak"` yields `stak_...` tokens. Each call generates a
/// fresh random secret.
#[must_use]
pub fn mint_current_key(service: &str) -> MintedKey {
    let mut secret_bytes = [0u8; 16];
    OsRng.fill_bytes(&mut secret_bytes);
    let secret = hex::encode(secret_bytes);

    let token = format!("st{service}_{secret}_{}", checksum_of(&secret));
    let hash = hex::encode(Sha256::digest(token.as_bytes()));
    MintedKey { token, hash }
}

/// Encodes a legacy-format token for the given name, organization, and
/// secret.
#[must_use]
pub fn mint_legacy_token(name: &str, org_id: OrgId, secret: &str) -> String {
    STANDARD.encode(
        serde_json::json!({ "k": secret, "n": name, "id": i64::from(org_id) }).to_string(),
    )
}

/// Hashes a legacy secret into the PHC string a stored record carries.
///
/// # Panics
///
/// Panics if Argon2 hashing fails, which cannot happen with default
/// parameters; acceptable in test code.
#[must_use]
#[allow(clippy::expect_used)]
pub fn hash_legacy_secret(secret: &str) -> String {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .expect("argon2 hashing with default params cannot fail")
        .to_string()
}

/// Minimal [`Request`] implementation for tests.
pub struct TestRequest {
    authorization: Option<String>,
}

impl TestRequest {
    /// A request with no authorization header.
    #[must_use]
    pub fn anonymous() -> Self {
        Self { authorization: None }
    }

    /// A request with the given raw authorization header value.
    #[must_use]
    pub fn with_header(header: impl Into<String>) -> Self {
        Self { authorization: Some(header.into()) }
    }

    /// A request carrying `token` under the bearer scheme.
    #[must_use]
    pub fn bearer(token: &str) -> Self {
        Self::with_header(format!("Bearer {token}"))
    }

    /// A request carrying basic-auth credentials.
    #[must_use]
    pub fn basic(username: &str, password: &str) -> Self {
        Self::with_header(format!(
            "{BASIC_PREFIX}{}",
            STANDARD.encode(format!("{username}:{password}"))
        ))
    }
}

impl Request for TestRequest {
    fn authorization(&self) -> Option<&str> {
        self.authorization.as_deref()
    }
}
