//! API-key token formats: classification, decoding, and verification.
//!
//! Two key generations are in circulation:
//!
//! - **Current format**: `st??_<secret>_<checksum>` — three `_`-separated
//!   sections. The first begins with the fixed prefix [`STRATUS_PREFIX`]
//!   (the remainder of the section discriminates the minting service), the
//!   second is the random secret, the third an 8-hex-char truncated
//!   SHA-256 checksum of the secret. Lookup is by a one-way hash derived
//!   from the full token.
//! - **Legacy format**: standard base64 of a JSON payload
//!   `{"k": secret, "n": key name, "id": org id}`. The secret cannot be
//!   used as a lookup key; the record is fetched by `(org, name)` and the
//!   secret verified against the stored Argon2 hash.
//!
//! Classification is a pure string-prefix test — anything starting with
//! [`STRATUS_PREFIX`] is decoded as current format, everything else falls
//! back to the legacy decoder. No I/O happens in this module.

use argon2::{Argon2, PasswordHash, PasswordVerifier, password_hash};
use base64::{Engine, engine::general_purpose::STANDARD};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;
use zeroize::Zeroizing;

use stratus_common_storage::OrgId;

/// Structural prefix marking a current-format token.
pub const STRATUS_PREFIX: &str = "st";

/// Number of checksum bytes carried in a current-format token.
const CHECKSUM_BYTES: usize = 4;

/// Length of the hex-encoded checksum section.
const CHECKSUM_LEN: usize = 2 * CHECKSUM_BYTES;

/// Errors from token decoding and secret verification.
///
/// These never reach callers directly — the authenticator masks them into
/// its uniform invalid-credential error — but the distinction is kept for
/// logging.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyDecodeError {
    /// The token's structure does not parse.
    #[error("malformed key: {0}")]
    Malformed(&'static str),

    /// The token parsed but its checksum does not match the secret.
    #[error("key checksum mismatch")]
    ChecksumMismatch,

    /// The stored secret material is not a valid PHC hash string.
    #[error("stored secret is not a valid password hash")]
    MalformedStoredSecret,
}

/// A decoded credential, tagged by generation.
///
/// Exists only transiently during a single authentication call; never
/// persisted. This is the single dispatch point between the two formats —
/// downstream code matches once and never branches on generation again.
#[derive(Debug)]
pub enum DecodedKey {
    /// Current-format key, resolved by lookup hash.
    Current(PrefixedKey),
    /// Legacy-format key, resolved by name lookup plus verification.
    Legacy(LegacyKey),
}

/// Decoded current-format key.
#[derive(Debug)]
pub struct PrefixedKey {
    /// Leading section, e.g. `stak`; begins with [`STRATUS_PREFIX`].
    prefix: String,
    /// The random secret. Scrubbed from memory on drop.
    secret: Zeroizing<String>,
    /// Hex checksum section, already verified against the secret.
    checksum: String,
}

impl PrefixedKey {
    /// Derives the deterministic lookup hash for this key.
    ///
    /// Hex SHA-256 over the canonical token string. One-way and
    /// collision-resistant: the store keeps only this value, so a stored
    /// record never reveals the secret.
    #[must_use]
    pub fn hash(&self) -> String {
        let token =
            Zeroizing::new(format!("{}_{}_{}", self.prefix, self.secret.as_str(), self.checksum));
        hex::encode(Sha256::digest(token.as_bytes()))
    }
}

/// Decoded legacy-format key.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LegacyKey {
    /// The presented secret. Scrubbed from memory on drop.
    #[serde(rename = "k")]
    pub secret: Zeroizing<String>,

    /// Key name the record is looked up by.
    #[serde(rename = "n")]
    pub name: String,

    /// Organization the key belongs to.
    #[serde(rename = "id")]
    pub org_id: OrgId,
}

/// Classifies and decodes a token into a [`DecodedKey`].
///
/// # Errors
///
/// Returns a [`KeyDecodeError`] if the token's structure does not parse
/// under the format its prefix selects.
pub fn decode(token: &str) -> Result<DecodedKey, KeyDecodeError> {
    if token.starts_with(STRATUS_PREFIX) {
        decode_current(token).map(DecodedKey::Current)
    } else {
        decode_legacy(token).map(DecodedKey::Legacy)
    }
}

fn decode_current(token: &str) -> Result<PrefixedKey, KeyDecodeError> {
    let sections: Vec<&str> = token.split('_').collect();
    let [prefix, secret, checksum] = sections.as_slice() else {
        return Err(KeyDecodeError::Malformed("expected three sections"));
    };

    if !prefix.starts_with(STRATUS_PREFIX) {
        return Err(KeyDecodeError::Malformed("missing generation prefix"));
    }
    if secret.is_empty() {
        return Err(KeyDecodeError::Malformed("empty secret"));
    }
    if checksum.len() != CHECKSUM_LEN {
        return Err(KeyDecodeError::Malformed("wrong checksum length"));
    }

    let expected = checksum_of(secret);
    if !bool::from(expected.as_bytes().ct_eq(checksum.as_bytes())) {
        return Err(KeyDecodeError::ChecksumMismatch);
    }

    Ok(PrefixedKey {
        prefix: (*prefix).to_owned(),
        secret: Zeroizing::new((*secret).to_owned()),
        checksum: (*checksum).to_owned(),
    })
}

fn decode_legacy(token: &str) -> Result<LegacyKey, KeyDecodeError> {
    let payload = STANDARD
        .decode(token)
        .map_err(|_| KeyDecodeError::Malformed("invalid base64 payload"))?;
    serde_json::from_slice(&payload).map_err(|_| KeyDecodeError::Malformed("invalid key payload"))
}

/// Hex-encoded truncated SHA-256 checksum of a secret.
pub(crate) fn checksum_of(secret: &str) -> String {
    hex::encode(&Sha256::digest(secret.as_bytes())[..CHECKSUM_BYTES])
}

/// Verifies a decoded legacy secret against the stored PHC hash.
///
/// Returns `Ok(false)` on a clean mismatch. A stored value that is not a
/// valid PHC string is an error — the record can never verify, and the
/// caller masks it the same way as a mismatch.
///
/// # Errors
///
/// Returns [`KeyDecodeError::MalformedStoredSecret`] if `stored` does not
/// parse as a PHC hash string.
pub fn verify_legacy(key: &LegacyKey, stored: &str) -> Result<bool, KeyDecodeError> {
    let parsed =
        PasswordHash::new(stored).map_err(|_| KeyDecodeError::MalformedStoredSecret)?;

    match Argon2::default().verify_password(key.secret.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(_) => Err(KeyDecodeError::MalformedStoredSecret),
    }
}
