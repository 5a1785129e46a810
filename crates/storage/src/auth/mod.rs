//! Authentication record types and storage traits.
//!
//! This module contains the shared type definitions and storage traits for
//! API-key authentication. The types are used by both the control plane
//! (which writes key records) and the request path (which reads and
//! validates them).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐       ┌─────────────┐       ┌──────────────┐
//! │ Control API │       │  key store  │       │ authn crate  │
//! │             │──────►│  (source    │◄──────│              │
//! │ mints keys  │       │  of truth)  │       │ reads keys   │
//! └─────────────┘       └─────────────┘       └──────────────┘
//! ```
//!
//! # Storage Traits
//!
//! [`ApiKeyStore`] covers key lookup (by hash or by name) and the
//! best-effort last-used update; [`ServiceAccountStore`] resolves delegated
//! identities. Use [`MemoryApiKeyStore`] and [`MemoryServiceAccountStore`]
//! for testing.
//!
//! # Examples
//!
//! ```no_run
//! use stratus_common_storage::{ApiKeyId, OrgId, OrgRole};
//! use stratus_common_storage::auth::{ApiKeyRecord, ApiKeyStore, MemoryApiKeyStore};
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let store = MemoryApiKeyStore::new();
//!
//! let record = ApiKeyRecord::builder()
//!     .id(ApiKeyId::from(1))
//!     .org_id(OrgId::from(100))
//!     .name("ci-deploy".to_owned())
//!     .role(OrgRole::Editor)
//!     .key("2f7a...".to_owned())
//!     .build();
//!
//! store.insert(record);
//!
//! let retrieved = store.get_by_hash("2f7a...").await.unwrap();
//! assert!(retrieved.is_some());
//! # });
//! ```

mod account;
mod api_key;
mod store;

pub use account::ServiceAccountIdentity;
pub use api_key::ApiKeyRecord;
pub use store::{
    ApiKeyStore, MemoryApiKeyStore, MemoryServiceAccountStore, ServiceAccountStore,
};
