//! End-to-end tests for the API-key authentication flow.
//!
//! These tests exercise the full pipeline — extraction, decoding,
//! resolution, lifecycle checks, identity resolution — against in-memory
//! stores, including the failure-masking and recorder-isolation
//! properties.
#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use std::{collections::HashMap, sync::Arc, time::Duration};

use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::Utc;
use sha2::{Digest, Sha256};
use stratus_common_authn::{ApiKeyAuthenticator, AuthError, Client, Request, token_from_request};
use stratus_common_storage::{
    AccountId, ApiKeyId, OrgId, OrgRole, StorageError, StorageResult,
    auth::{
        ApiKeyRecord, ApiKeyStore, MemoryApiKeyStore, MemoryServiceAccountStore,
        ServiceAccountIdentity,
    },
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct TestRequest {
    authorization: Option<String>,
}

impl Request for TestRequest {
    fn authorization(&self) -> Option<&str> {
        self.authorization.as_deref()
    }
}

fn bearer(token: &str) -> TestRequest {
    TestRequest { authorization: Some(format!("Bearer {token}")) }
}

fn basic(username: &str, password: &str) -> TestRequest {
    let encoded = STANDARD.encode(format!("{username}:{password}"));
    TestRequest { authorization: Some(format!("Basic {encoded}")) }
}

fn header(value: &str) -> TestRequest {
    TestRequest { authorization: Some(value.to_owned()) }
}

fn anonymous() -> TestRequest {
    TestRequest { authorization: None }
}

/// Mint a current-format token and the lookup hash its record stores.
fn mint_current_key() -> (String, String) {
    let secret = "4e07408562bedb8b60ce05c1decfe3ad";
    let checksum = hex::encode(&Sha256::digest(secret.as_bytes())[..4]);
    let token = format!("stak_{secret}_{checksum}");
    let hash = hex::encode(Sha256::digest(token.as_bytes()));
    (token, hash)
}

fn mint_legacy_token(name: &str, org_id: i64, secret: &str) -> String {
    STANDARD.encode(serde_json::json!({ "k": secret, "n": name, "id": org_id }).to_string())
}

fn hash_legacy_secret(secret: &str) -> String {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .expect("argon2 hashing failed")
        .to_string()
}

fn record(id: i64, org: i64, key: &str) -> ApiKeyRecord {
    ApiKeyRecord::builder()
        .id(ApiKeyId::from(id))
        .org_id(OrgId::from(org))
        .name(format!("key-{id}"))
        .role(OrgRole::Editor)
        .key(key.to_owned())
        .build()
}

fn authenticator(
    keys: &MemoryApiKeyStore,
    accounts: &MemoryServiceAccountStore,
) -> ApiKeyAuthenticator {
    ApiKeyAuthenticator::new(Arc::new(keys.clone()), Arc::new(accounts.clone()))
}

/// Wait until the record's last-used timestamp appears, or time out.
async fn wait_for_last_used(store: &MemoryApiKeyStore, id: ApiKeyId) -> bool {
    for _ in 0..100 {
        if store.get(id).expect("record should exist").last_used_at.is_some() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    false
}

// ---------------------------------------------------------------------------
// Eligibility
// ---------------------------------------------------------------------------

#[tokio::test]
async fn eligibility_agrees_with_extractor() {
    let auth = authenticator(&MemoryApiKeyStore::new(), &MemoryServiceAccountStore::new());

    let requests = [
        anonymous(),
        bearer("stak_x_y"),
        basic("api_key", "some-token"),
        basic("alice", "some-token"),
        header("Digest whatever"),
        header("Bearer "),
    ];

    for request in &requests {
        assert_eq!(
            auth.is_eligible(request),
            token_from_request(request).is_some(),
            "probe and extractor must never disagree"
        );
    }
}

#[tokio::test]
async fn ineligible_requests() {
    let auth = authenticator(&MemoryApiKeyStore::new(), &MemoryServiceAccountStore::new());

    assert!(!auth.is_eligible(&anonymous()));
    assert!(!auth.is_eligible(&header("Negotiate abc")));
    assert!(!auth.is_eligible(&basic("not_the_sentinel", "token")));
    assert!(auth.is_eligible(&bearer("anything-nonempty")));
    assert!(auth.is_eligible(&basic("api_key", "token")));
}

// ---------------------------------------------------------------------------
// Current-format resolution
// ---------------------------------------------------------------------------

#[tokio::test]
async fn current_key_resolves_to_raw_key_identity() {
    let keys = MemoryApiKeyStore::new();
    let (token, hash) = mint_current_key();
    keys.insert(record(1, 10, &hash));

    let auth = authenticator(&keys, &MemoryServiceAccountStore::new());
    let identity = auth.authenticate(&bearer(&token)).await.expect("should authenticate");

    assert_eq!(identity.id.to_string(), "api-key:1");
    assert_eq!(identity.org_id, OrgId::from(10));
    assert_eq!(identity.org_roles, HashMap::from([(OrgId::from(10), OrgRole::Editor)]));
}

#[tokio::test]
async fn current_key_works_through_basic_auth_sentinel() {
    let keys = MemoryApiKeyStore::new();
    let (token, hash) = mint_current_key();
    keys.insert(record(1, 10, &hash));

    let auth = authenticator(&keys, &MemoryServiceAccountStore::new());
    let identity =
        auth.authenticate(&basic("api_key", &token)).await.expect("should authenticate");
    assert_eq!(identity.id.to_string(), "api-key:1");
}

#[tokio::test]
async fn unknown_hash_and_undecodable_token_are_indistinguishable() {
    let keys = MemoryApiKeyStore::new();
    let auth = authenticator(&keys, &MemoryServiceAccountStore::new());

    // Well-formed token matching no record.
    let (token, _) = mint_current_key();
    let miss = auth.authenticate(&bearer(&token)).await.expect_err("should be rejected");

    // Token that does not even decode.
    let garbage = auth
        .authenticate(&bearer("stak_not_a_real_token"))
        .await
        .expect_err("should be rejected");

    assert!(matches!(miss, AuthError::InvalidApiKey { .. }));
    assert!(matches!(garbage, AuthError::InvalidApiKey { .. }));
    assert_eq!(miss.to_string(), garbage.to_string());
    assert_eq!(miss.public_message(), garbage.public_message());
}

// ---------------------------------------------------------------------------
// Legacy-format resolution
// ---------------------------------------------------------------------------

#[tokio::test]
async fn legacy_key_resolves_after_verification() {
    let keys = MemoryApiKeyStore::new();
    let stored = hash_legacy_secret("legacy-secret");
    let mut legacy = record(3, 20, &stored);
    legacy.name = "reporting".to_owned();
    keys.insert(legacy);

    let token = mint_legacy_token("reporting", 20, "legacy-secret");
    let auth = authenticator(&keys, &MemoryServiceAccountStore::new());

    let identity = auth.authenticate(&bearer(&token)).await.expect("should authenticate");
    assert_eq!(identity.id.to_string(), "api-key:3");
    assert_eq!(identity.org_id, OrgId::from(20));
}

#[tokio::test]
async fn legacy_key_with_wrong_secret_is_invalid() {
    let keys = MemoryApiKeyStore::new();
    let stored = hash_legacy_secret("legacy-secret");
    let mut legacy = record(3, 20, &stored);
    legacy.name = "reporting".to_owned();
    keys.insert(legacy);

    let token = mint_legacy_token("reporting", 20, "wrong-secret");
    let auth = authenticator(&keys, &MemoryServiceAccountStore::new());

    let err = auth.authenticate(&bearer(&token)).await.expect_err("should be rejected");
    assert!(matches!(err, AuthError::InvalidApiKey { .. }));
}

#[tokio::test]
async fn legacy_key_with_unknown_name_is_invalid() {
    let auth = authenticator(&MemoryApiKeyStore::new(), &MemoryServiceAccountStore::new());
    let token = mint_legacy_token("no-such-key", 20, "whatever");

    let err = auth.authenticate(&bearer(&token)).await.expect_err("should be rejected");
    assert!(matches!(err, AuthError::InvalidApiKey { .. }));
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn expired_key_is_rejected_even_if_also_revoked() {
    let keys = MemoryApiKeyStore::new();
    let (token, hash) = mint_current_key();
    let mut rec = record(1, 10, &hash);
    rec.expires = Some(Utc::now().timestamp() - 60);
    rec.is_revoked = Some(true);
    keys.insert(rec);

    let auth = authenticator(&keys, &MemoryServiceAccountStore::new());
    let err = auth.authenticate(&bearer(&token)).await.expect_err("should be rejected");

    // Expiry is checked first; revocation never gets a say.
    assert!(matches!(err, AuthError::ApiKeyExpired));
    assert_eq!(err.public_message(), "Expired API key");
}

#[tokio::test]
async fn revoked_key_without_expiry_is_rejected() {
    let keys = MemoryApiKeyStore::new();
    let (token, hash) = mint_current_key();
    let mut rec = record(1, 10, &hash);
    rec.is_revoked = Some(true);
    keys.insert(rec);

    let auth = authenticator(&keys, &MemoryServiceAccountStore::new());
    let err = auth.authenticate(&bearer(&token)).await.expect_err("should be rejected");
    assert!(matches!(err, AuthError::ApiKeyRevoked));
}

#[tokio::test]
async fn future_expiry_is_accepted() {
    let keys = MemoryApiKeyStore::new();
    let (token, hash) = mint_current_key();
    let mut rec = record(1, 10, &hash);
    rec.expires = Some(Utc::now().timestamp() + 3600);
    keys.insert(rec);

    let auth = authenticator(&keys, &MemoryServiceAccountStore::new());
    assert!(auth.authenticate(&bearer(&token)).await.is_ok());
}

// ---------------------------------------------------------------------------
// Delegation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delegated_key_resolves_to_service_account_identity() {
    let keys = MemoryApiKeyStore::new();
    let accounts = MemoryServiceAccountStore::new();

    let (token, hash) = mint_current_key();
    let mut rec = record(1, 10, &hash);
    rec.service_account_id = Some(AccountId::from(9));
    keys.insert(rec);

    accounts.insert(
        ServiceAccountIdentity::builder()
            .account_id(AccountId::from(9))
            .org_id(OrgId::from(10))
            .name("sa-terraform".to_owned())
            .org_roles(HashMap::from([
                (OrgId::from(10), OrgRole::Admin),
                (OrgId::from(11), OrgRole::Viewer),
            ]))
            .build(),
    );

    let auth = authenticator(&keys, &accounts);
    let identity = auth.authenticate(&bearer(&token)).await.expect("should authenticate");

    // The account's own org/role data wins, not the key record's.
    assert_eq!(identity.id.to_string(), "service-account:9");
    assert_eq!(identity.org_roles.get(&OrgId::from(10)), Some(&OrgRole::Admin));
    assert_eq!(identity.org_roles.len(), 2);
}

#[tokio::test]
async fn disabled_service_account_is_rejected() {
    let keys = MemoryApiKeyStore::new();
    let accounts = MemoryServiceAccountStore::new();

    let (token, hash) = mint_current_key();
    let mut rec = record(1, 10, &hash);
    rec.service_account_id = Some(AccountId::from(9));
    keys.insert(rec);

    accounts.insert(
        ServiceAccountIdentity::builder()
            .account_id(AccountId::from(9))
            .org_id(OrgId::from(10))
            .name("sa-old".to_owned())
            .is_disabled(true)
            .org_roles(HashMap::from([(OrgId::from(10), OrgRole::Admin)]))
            .build(),
    );

    let auth = authenticator(&keys, &accounts);
    let err = auth.authenticate(&bearer(&token)).await.expect_err("should be rejected");
    assert!(matches!(err, AuthError::ServiceAccountDisabled));
}

#[tokio::test]
async fn non_positive_delegation_link_means_raw_key_identity() {
    let keys = MemoryApiKeyStore::new();
    let (token, hash) = mint_current_key();
    let mut rec = record(1, 10, &hash);
    rec.service_account_id = Some(AccountId::from(0));
    keys.insert(rec);

    // No account registered; a delegation attempt would fail loudly.
    let auth = authenticator(&keys, &MemoryServiceAccountStore::new());
    let identity = auth.authenticate(&bearer(&token)).await.expect("should authenticate");
    assert_eq!(identity.id.to_string(), "api-key:1");
}

#[tokio::test]
async fn missing_service_account_propagates_storage_error() {
    let keys = MemoryApiKeyStore::new();
    let (token, hash) = mint_current_key();
    let mut rec = record(1, 10, &hash);
    rec.service_account_id = Some(AccountId::from(9));
    keys.insert(rec);

    let auth = authenticator(&keys, &MemoryServiceAccountStore::new());
    let err = auth.authenticate(&bearer(&token)).await.expect_err("should fail");

    assert!(matches!(err, AuthError::Storage(_)));
    assert!(!err.is_unauthorized());
}

// ---------------------------------------------------------------------------
// Infrastructure faults
// ---------------------------------------------------------------------------

/// Store whose lookups fail with a connection error.
struct UnreachableStore;

#[async_trait]
impl ApiKeyStore for UnreachableStore {
    async fn get_by_hash(&self, _hash: &str) -> StorageResult<Option<ApiKeyRecord>> {
        Err(StorageError::connection("backend unreachable"))
    }

    async fn get_by_name(
        &self,
        _org_id: OrgId,
        _name: &str,
    ) -> StorageResult<Option<ApiKeyRecord>> {
        Err(StorageError::connection("backend unreachable"))
    }

    async fn update_last_used(&self, _id: ApiKeyId) -> StorageResult<()> {
        Err(StorageError::connection("backend unreachable"))
    }
}

#[tokio::test]
async fn store_fault_is_not_masked_as_invalid_key() {
    let auth = ApiKeyAuthenticator::new(
        Arc::new(UnreachableStore),
        Arc::new(MemoryServiceAccountStore::new()),
    );

    let (token, _) = mint_current_key();
    let err = auth.authenticate(&bearer(&token)).await.expect_err("should fail");

    assert!(matches!(err, AuthError::Storage(_)));
    assert!(!err.is_unauthorized());
    assert_eq!(err.public_message(), "Internal server error");
}

// ---------------------------------------------------------------------------
// Usage recorder
// ---------------------------------------------------------------------------

#[tokio::test]
async fn last_used_is_recorded_asynchronously() {
    let keys = MemoryApiKeyStore::new();
    let (token, hash) = mint_current_key();
    keys.insert(record(1, 10, &hash));

    let auth = authenticator(&keys, &MemoryServiceAccountStore::new());
    auth.authenticate(&bearer(&token)).await.expect("should authenticate");

    assert!(
        wait_for_last_used(&keys, ApiKeyId::from(1)).await,
        "last-used timestamp was never recorded"
    );
}

#[tokio::test]
async fn last_used_is_recorded_even_for_expired_key() {
    let keys = MemoryApiKeyStore::new();
    let (token, hash) = mint_current_key();
    let mut rec = record(1, 10, &hash);
    rec.expires = Some(Utc::now().timestamp() - 60);
    keys.insert(rec);

    let auth = authenticator(&keys, &MemoryServiceAccountStore::new());
    let err = auth.authenticate(&bearer(&token)).await.expect_err("should be rejected");
    assert!(matches!(err, AuthError::ApiKeyExpired));

    // The recorder raced the lifecycle rejection and still lands.
    assert!(wait_for_last_used(&keys, ApiKeyId::from(1)).await);
}

/// Store whose usage updates fail; lookups delegate to an inner store.
struct UpdateFailsStore {
    inner: MemoryApiKeyStore,
}

#[async_trait]
impl ApiKeyStore for UpdateFailsStore {
    async fn get_by_hash(&self, hash: &str) -> StorageResult<Option<ApiKeyRecord>> {
        self.inner.get_by_hash(hash).await
    }

    async fn get_by_name(&self, org_id: OrgId, name: &str) -> StorageResult<Option<ApiKeyRecord>> {
        self.inner.get_by_name(org_id, name).await
    }

    async fn update_last_used(&self, _id: ApiKeyId) -> StorageResult<()> {
        Err(StorageError::timeout())
    }
}

#[tokio::test]
async fn failing_usage_update_never_affects_the_result() {
    let inner = MemoryApiKeyStore::new();
    let (token, hash) = mint_current_key();
    inner.insert(record(1, 10, &hash));

    let auth = ApiKeyAuthenticator::new(
        Arc::new(UpdateFailsStore { inner }),
        Arc::new(MemoryServiceAccountStore::new()),
    );

    let identity = auth.authenticate(&bearer(&token)).await.expect("should authenticate");
    assert_eq!(identity.id.to_string(), "api-key:1");
}

/// Store whose usage updates panic outright.
struct UpdatePanicsStore {
    inner: MemoryApiKeyStore,
}

#[async_trait]
impl ApiKeyStore for UpdatePanicsStore {
    async fn get_by_hash(&self, hash: &str) -> StorageResult<Option<ApiKeyRecord>> {
        self.inner.get_by_hash(hash).await
    }

    async fn get_by_name(&self, org_id: OrgId, name: &str) -> StorageResult<Option<ApiKeyRecord>> {
        self.inner.get_by_name(org_id, name).await
    }

    async fn update_last_used(&self, _id: ApiKeyId) -> StorageResult<()> {
        panic!("simulated fault in usage recorder");
    }
}

#[tokio::test]
async fn panicking_usage_update_is_contained() {
    let inner = MemoryApiKeyStore::new();
    let (token, hash) = mint_current_key();
    inner.insert(record(1, 10, &hash));

    let auth = ApiKeyAuthenticator::new(
        Arc::new(UpdatePanicsStore { inner }),
        Arc::new(MemoryServiceAccountStore::new()),
    );

    let identity = auth.authenticate(&bearer(&token)).await.expect("should authenticate");
    assert_eq!(identity.id.to_string(), "api-key:1");

    // Give the detached task time to panic; the test process must survive
    // and further authentications must still work.
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(auth.authenticate(&bearer(&token)).await.is_ok());
}

// ---------------------------------------------------------------------------
// Client surface
// ---------------------------------------------------------------------------

#[tokio::test]
async fn client_name_and_params() {
    let auth = authenticator(&MemoryApiKeyStore::new(), &MemoryServiceAccountStore::new());
    assert_eq!(auth.name(), "auth.client.api-key");
    assert_eq!(auth.params(), stratus_common_authn::ClientParams::default());
}
