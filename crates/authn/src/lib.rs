//! # Stratus Common Authentication
//!
//! API-key authentication core shared by Stratus services.
//!
//! This crate provides:
//! - **Token extraction**: bearer and sentinel basic-auth header parsing
//! - **Key decoding**: current (prefixed, hash-lookup) and legacy
//!   (name-lookup plus verification) formats
//! - **Lifecycle enforcement**: expiry and revocation policy
//! - **Identity resolution**: raw-key principals and service-account
//!   delegation
//!
//! ## Pipeline
//!
//! ```text
//! request ──► extract ──► decode ──► resolve ──► lifecycle ──► identity
//!                                       │
//!                                       └──► last-used update (detached)
//! ```
//!
//! ## Failure Masking
//!
//! A token that fails to decode, matches no record, or fails legacy
//! verification always yields the same [`AuthError::InvalidApiKey`] with a
//! fixed message — the sub-case is logged but never exposed, so error
//! responses cannot be used as an oracle.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use stratus_common_authn::{ApiKeyAuthenticator, Client, Request};
//! use stratus_common_storage::auth::{MemoryApiKeyStore, MemoryServiceAccountStore};
//!
//! # async fn example(request: &dyn Request) -> Result<(), Box<dyn std::error::Error>> {
//! let authenticator = ApiKeyAuthenticator::new(
//!     Arc::new(MemoryApiKeyStore::new()),
//!     Arc::new(MemoryServiceAccountStore::new()),
//! );
//!
//! // The dispatcher probes cheaply before running the full flow.
//! if authenticator.is_eligible(request) {
//!     let identity = authenticator.authenticate(request).await?;
//!     println!("authenticated as {}", identity.id);
//! }
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// The API-key authentication client.
pub mod api_key;
/// Dispatcher-facing client traits.
pub mod client;
/// Authentication error types.
pub mod error;
/// Resolved caller identity types.
pub mod identity;
/// Token format decoding and verification.
pub mod keygen;
/// Test helpers for minting keys (feature-gated).
#[cfg(any(test, feature = "testutil"))]
pub mod testutil;
/// Credential extraction from requests.
pub mod token;

// Re-export key types for convenience
pub use api_key::{ApiKeyAuthenticator, CLIENT_API_KEY};
pub use client::{Client, ClientParams, Request};
pub use error::{AuthError, InvalidKeyCause, Result};
pub use identity::{Identity, Namespace, NamespacedId};
pub use keygen::{DecodedKey, KeyDecodeError, STRATUS_PREFIX};
pub use token::token_from_request;
