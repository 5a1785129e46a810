//! Shared storage types for Stratus services.
//!
//! This crate provides the storage error taxonomy, the common ID newtypes,
//! and the authentication store traits shared by Stratus services. The
//! request path consumes the traits; backends implement them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Service Layer                            │
//! │            (API handlers, authn dispatcher)                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │                 stratus-common-storage                      │
//! │        ApiKeyStore · ServiceAccountStore traits             │
//! ├──────────────────────┬──────────────────────────────────────┤
//! │  MemoryApiKeyStore   │         database-backed stores       │
//! │      (testing)       │            (production)              │
//! └──────────────────────┴──────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```
//! use stratus_common_storage::{ApiKeyId, OrgId, OrgRole};
//! use stratus_common_storage::auth::{ApiKeyRecord, ApiKeyStore, MemoryApiKeyStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MemoryApiKeyStore::new();
//!
//!     store.insert(
//!         ApiKeyRecord::builder()
//!             .id(ApiKeyId::from(1))
//!             .org_id(OrgId::from(1))
//!             .name("ops".to_owned())
//!             .role(OrgRole::Admin)
//!             .key("stored-hash".to_owned())
//!             .build(),
//!     );
//!
//!     let record = store.get_by_hash("stored-hash").await?;
//!     assert!(record.is_some());
//!     Ok(())
//! }
//! ```
//!
//! # Implementing a Backend
//!
//! To implement a new store backend:
//!
//! 1. Implement [`auth::ApiKeyStore`] (and [`auth::ServiceAccountStore`] if
//!    the backend also fronts the account service)
//! 2. Map backend-specific errors to [`StorageError`]
//!
//! See the in-memory stores in [`auth`] for reference implementations.

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Authentication record types and store traits.
pub mod auth;
/// Storage error types.
pub mod error;
/// Common ID and role types.
pub mod types;

pub use error::{BoxError, StorageError, StorageResult};
pub use types::{AccountId, ApiKeyId, OrgId, OrgRole};
