//! Storage traits for API-key and service-account lookup.
//!
//! This module provides the [`ApiKeyStore`] and [`ServiceAccountStore`]
//! traits that abstract the persistence behind API-key authentication.
//! Implementations can use different backends (the platform database in
//! production, in-memory stores for testing).
//!
//! # Lookup Strategies
//!
//! ```text
//! current-format token ──► hash ──► get_by_hash ──────► record
//! legacy-format token ──► (org, name) ──► get_by_name ─► record + verify
//! ```
//!
//! # Usage
//!
//! ```no_run
//! // Demonstrates the trait interface; requires a concrete store implementation.
//! use stratus_common_storage::{StorageResult, auth::{ApiKeyRecord, ApiKeyStore}};
//!
//! async fn find_key<S: ApiKeyStore>(
//!     store: &S,
//!     hash: &str,
//! ) -> StorageResult<Option<ApiKeyRecord>> {
//!     store.get_by_hash(hash).await
//! }
//! ```

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::{
    auth::{ApiKeyRecord, ServiceAccountIdentity},
    error::{StorageError, StorageResult},
    types::{AccountId, ApiKeyId, OrgId},
};

/// Persistence layer for stored API keys.
///
/// Abstracts key storage so production and testing can share the same
/// interface. All lookups are point reads; there is no enumeration
/// surface here.
///
/// # Error Handling
///
/// Lookup misses are `Ok(None)`, not errors — the caller decides what a
/// miss means. Only genuine backend faults surface as [`StorageError`].
#[async_trait]
pub trait ApiKeyStore: Send + Sync {
    /// Retrieves a key record by its stored lookup hash.
    ///
    /// Used for current-format tokens, whose secret deterministically
    /// derives the hash.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(record))` if a key with this hash exists
    /// - `Ok(None)` if no key matches
    /// - `Err(...)` on storage errors
    async fn get_by_hash(&self, hash: &str) -> StorageResult<Option<ApiKeyRecord>>;

    /// Retrieves a key record by `(organization, key name)`.
    ///
    /// Used for legacy-format tokens, whose secret cannot be used as a
    /// lookup key; the caller must verify the presented secret against the
    /// returned record separately.
    async fn get_by_name(&self, org_id: OrgId, name: &str) -> StorageResult<Option<ApiKeyRecord>>;

    /// Updates the key's last-used timestamp to now.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if no record with this ID exists,
    /// or another [`StorageError`] on backend faults.
    async fn update_last_used(&self, id: ApiKeyId) -> StorageResult<()>;
}

/// Account service surface needed by authentication.
///
/// Resolves the full identity of a service account an API key delegates
/// to. The returned identity includes the disabled flag and the account's
/// own org/role data; the caller must not substitute the key record's.
#[async_trait]
pub trait ServiceAccountStore: Send + Sync {
    /// Fetches the identity of `account_id` as seen within `org_id`.
    ///
    /// # Errors
    ///
    /// A missing account is a [`StorageError::NotFound`] — unlike key
    /// lookups there is no `Option` here, because a dangling delegation
    /// link is a data integrity fault, not a statement about the
    /// credential.
    async fn get_identity(
        &self,
        account_id: AccountId,
        org_id: OrgId,
    ) -> StorageResult<ServiceAccountIdentity>;
}

/// In-memory [`ApiKeyStore`] implementation.
///
/// Intended for testing and development; records live in a
/// [`parking_lot::RwLock`]-guarded map and are lost when the process
/// exits.
///
/// # Cloning
///
/// Cheaply cloneable via [`Arc`]; all clones share the same records.
///
/// # Example
///
/// ```
/// use stratus_common_storage::{ApiKeyId, OrgId, OrgRole};
/// use stratus_common_storage::auth::{ApiKeyRecord, ApiKeyStore, MemoryApiKeyStore};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryApiKeyStore::new();
///     let record = ApiKeyRecord::builder()
///         .id(ApiKeyId::from(1))
///         .org_id(OrgId::from(1))
///         .name("ops".to_owned())
///         .role(OrgRole::Admin)
///         .key("abc123".to_owned())
///         .build();
///
///     store.insert(record);
///     let found = store.get_by_hash("abc123").await?;
///     assert!(found.is_some());
///     Ok(())
/// }
/// ```
#[derive(Debug, Default, Clone)]
pub struct MemoryApiKeyStore {
    records: Arc<RwLock<HashMap<ApiKeyId, ApiKeyRecord>>>,
}

impl MemoryApiKeyStore {
    /// Creates a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record, replacing any existing record with the same ID.
    pub fn insert(&self, record: ApiKeyRecord) {
        self.records.write().insert(record.id, record);
    }

    /// Returns a snapshot of the record with the given ID, if present.
    #[must_use]
    pub fn get(&self, id: ApiKeyId) -> Option<ApiKeyRecord> {
        self.records.read().get(&id).cloned()
    }
}

#[async_trait]
impl ApiKeyStore for MemoryApiKeyStore {
    #[tracing::instrument(skip(self))]
    async fn get_by_hash(&self, hash: &str) -> StorageResult<Option<ApiKeyRecord>> {
        let records = self.records.read();
        Ok(records.values().find(|record| record.key == hash).cloned())
    }

    #[tracing::instrument(skip(self))]
    async fn get_by_name(&self, org_id: OrgId, name: &str) -> StorageResult<Option<ApiKeyRecord>> {
        let records = self.records.read();
        Ok(records
            .values()
            .find(|record| record.org_id == org_id && record.name == name)
            .cloned())
    }

    #[tracing::instrument(skip(self))]
    async fn update_last_used(&self, id: ApiKeyId) -> StorageResult<()> {
        let mut records = self.records.write();
        let record = records
            .get_mut(&id)
            .ok_or_else(|| StorageError::not_found(format!("api-keys/{id}")))?;
        record.last_used_at = Some(Utc::now());
        Ok(())
    }
}

/// In-memory [`ServiceAccountStore`] implementation for testing.
///
/// Accounts are keyed by `(account_id, org_id)`, matching the lookup the
/// authenticator performs for delegated keys.
#[derive(Debug, Default, Clone)]
pub struct MemoryServiceAccountStore {
    accounts: Arc<RwLock<HashMap<(AccountId, OrgId), ServiceAccountIdentity>>>,
}

impl MemoryServiceAccountStore {
    /// Creates a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an account identity, replacing any existing entry for the
    /// same `(account, org)` pair.
    pub fn insert(&self, account: ServiceAccountIdentity) {
        self.accounts.write().insert((account.account_id, account.org_id), account);
    }
}

#[async_trait]
impl ServiceAccountStore for MemoryServiceAccountStore {
    #[tracing::instrument(skip(self))]
    async fn get_identity(
        &self,
        account_id: AccountId,
        org_id: OrgId,
    ) -> StorageResult<ServiceAccountIdentity> {
        let accounts = self.accounts.read();
        accounts
            .get(&(account_id, org_id))
            .cloned()
            .ok_or_else(|| StorageError::not_found(format!("service-accounts/{account_id}")))
    }
}
