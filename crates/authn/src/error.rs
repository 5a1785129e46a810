//! Authentication error types.
//!
//! This module defines the errors the API-key authenticator can return.
//! Every variant except [`AuthError::Storage`] is an unauthorized-class
//! outcome — a statement about the presented credential. `Storage` wraps
//! collaborator faults, which say nothing about credential validity and
//! are propagated unchanged.
//!
//! # Cause Masking
//!
//! Decode failures, lookup misses, and legacy verification failures are
//! all collapsed into [`AuthError::InvalidApiKey`]. The internal cause is
//! retained on the variant for structured logging, but the display and
//! public message are fixed, so a caller (or an attacker timing error
//! responses) cannot tell which sub-case occurred.

use thiserror::Error;

use stratus_common_storage::StorageError;

use crate::keygen::KeyDecodeError;

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Errors returned by API-key authentication.
///
/// # Non-exhaustive
///
/// This enum is marked `#[non_exhaustive]` — new variants may be added in
/// future minor releases without a semver-breaking change. Downstream match
/// expressions must include a wildcard arm (`_ =>`).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    /// The presented credential could not be matched to a stored key.
    ///
    /// Covers malformed tokens, lookup misses, and failed legacy
    /// verification alike. The `cause` field records which, for logs only;
    /// it never appears in the display or public message.
    #[error("invalid API key")]
    InvalidApiKey {
        /// Internal-only failure cause, retained for logging.
        cause: InvalidKeyCause,
    },

    /// The key's expiry timestamp is at or before the current time.
    #[error("API key has expired")]
    ApiKeyExpired,

    /// The key has been revoked.
    #[error("API key is revoked")]
    ApiKeyRevoked,

    /// The key delegates to a service account that has been disabled.
    #[error("service account is disabled")]
    ServiceAccountDisabled,

    /// A storage or account-service collaborator failed.
    ///
    /// Wraps the original [`StorageError`] to preserve the full error
    /// source chain. Not an unauthorized outcome.
    #[error("key storage error: {0}")]
    Storage(#[source] StorageError),
}

/// Internal cause behind an [`AuthError::InvalidApiKey`].
///
/// Logged at the rejection site, never shown to callers.
#[derive(Debug)]
pub enum InvalidKeyCause {
    /// The token did not decode as either key format.
    Decode(KeyDecodeError),
    /// No stored record matched the decoded credential.
    NotFound,
    /// A legacy record was found but the presented secret did not verify.
    VerificationFailed,
}

impl std::fmt::Display for InvalidKeyCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Decode(err) => write!(f, "decode failed: {err}"),
            Self::NotFound => write!(f, "no matching key record"),
            Self::VerificationFailed => write!(f, "secret verification failed"),
        }
    }
}

impl AuthError {
    /// Creates an [`AuthError::InvalidApiKey`] with the given internal cause.
    #[must_use]
    pub fn invalid_api_key(cause: InvalidKeyCause) -> Self {
        Self::InvalidApiKey { cause }
    }

    /// Fixed, user-facing message for this error.
    ///
    /// Unauthorized-class variants map to a constant string independent of
    /// the internal cause; infrastructure faults map to a generic message
    /// that leaks nothing about the backend.
    #[must_use]
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::InvalidApiKey { .. } => "Invalid API key",
            Self::ApiKeyExpired => "Expired API key",
            Self::ApiKeyRevoked => "Revoked API key",
            Self::ServiceAccountDisabled => "Disabled service account",
            Self::Storage(_) => "Internal server error",
        }
    }

    /// Returns `true` for unauthorized-class outcomes (statements about the
    /// credential), `false` for infrastructure faults.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        !matches!(self, Self::Storage(_))
    }
}

impl From<KeyDecodeError> for AuthError {
    fn from(err: KeyDecodeError) -> Self {
        Self::InvalidApiKey { cause: InvalidKeyCause::Decode(err) }
    }
}

impl From<StorageError> for AuthError {
    fn from(err: StorageError) -> Self {
        Self::Storage(err)
    }
}
