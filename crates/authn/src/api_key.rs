//! The API-key authentication client.
//!
//! Ties the pipeline together: token extraction, format decoding, key
//! resolution, lifecycle validation, and identity resolution, with a
//! detached best-effort usage recorder on the side.
//!
//! ```text
//! request ──► token ──► decode ──► resolve record ──┬──► lifecycle ──► identity
//!                                                   │
//!                                                   └──► update last-used
//!                                                        (detached, logged only)
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use stratus_common_storage::{
    ApiKeyId,
    auth::{ApiKeyRecord, ApiKeyStore, ServiceAccountStore},
};

use crate::{
    client::{Client, ClientParams, Request},
    error::{AuthError, InvalidKeyCause, Result},
    identity::Identity,
    keygen::{self, DecodedKey},
    token::token_from_request,
};

/// Client name reported to the dispatcher.
pub const CLIENT_API_KEY: &str = "auth.client.api-key";

/// Authenticates requests carrying an API key.
///
/// Owns nothing but handles to its two collaborators; no state is shared
/// between invocations, so a single instance serves any number of
/// concurrent requests.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use stratus_common_authn::{ApiKeyAuthenticator, Client, Request};
/// use stratus_common_storage::auth::{MemoryApiKeyStore, MemoryServiceAccountStore};
///
/// # async fn example(request: &dyn Request) -> Result<(), Box<dyn std::error::Error>> {
/// let authenticator = ApiKeyAuthenticator::new(
///     Arc::new(MemoryApiKeyStore::new()),
///     Arc::new(MemoryServiceAccountStore::new()),
/// );
///
/// if authenticator.is_eligible(request) {
///     let identity = authenticator.authenticate(request).await?;
///     println!("authenticated as {}", identity.id);
/// }
/// # Ok(())
/// # }
/// ```
pub struct ApiKeyAuthenticator {
    api_keys: Arc<dyn ApiKeyStore>,
    service_accounts: Arc<dyn ServiceAccountStore>,
}

impl ApiKeyAuthenticator {
    /// Creates an authenticator over the given stores.
    #[must_use]
    pub fn new(
        api_keys: Arc<dyn ApiKeyStore>,
        service_accounts: Arc<dyn ServiceAccountStore>,
    ) -> Self {
        Self { api_keys, service_accounts }
    }

    /// Resolves a raw token to its stored record.
    ///
    /// Strategy is selected once, by the decoded generation tag: current
    /// format derives the lookup hash and fetches by it; legacy format
    /// fetches by `(org, name)` and then verifies the presented secret.
    /// Decode failures, lookup misses, and verification failures all
    /// surface as the same invalid-credential error.
    async fn resolve_record(&self, token: &str) -> Result<ApiKeyRecord> {
        match keygen::decode(token)? {
            DecodedKey::Current(key) => {
                let hash = key.hash();
                self.api_keys.get_by_hash(&hash).await?.ok_or_else(|| {
                    tracing::debug!(cause = %InvalidKeyCause::NotFound, "rejecting API key");
                    AuthError::invalid_api_key(InvalidKeyCause::NotFound)
                })
            },
            DecodedKey::Legacy(key) => {
                // Lookup precedes verification here: the legacy secret
                // cannot serve as a lookup key, so a miss manifests the
                // same as a verification failure.
                let Some(record) = self.api_keys.get_by_name(key.org_id, &key.name).await? else {
                    tracing::debug!(cause = %InvalidKeyCause::NotFound, "rejecting API key");
                    return Err(AuthError::invalid_api_key(InvalidKeyCause::NotFound));
                };

                if keygen::verify_legacy(&key, &record.key)? {
                    Ok(record)
                } else {
                    tracing::debug!(
                        cause = %InvalidKeyCause::VerificationFailed,
                        "rejecting API key"
                    );
                    Err(AuthError::invalid_api_key(InvalidKeyCause::VerificationFailed))
                }
            },
        }
    }

    /// Dispatches the detached last-used update for a resolved record.
    ///
    /// Fire-and-forget: the request never waits on this, its outcome never
    /// affects the authentication result, and any failure — including a
    /// panic inside the store call — is caught and logged, never allowed
    /// to take down the serving process.
    fn record_usage(&self, id: ApiKeyId) {
        let store = Arc::clone(&self.api_keys);
        let task = tokio::spawn(async move { store.update_last_used(id).await });

        // Supervise from a second detached task so a panic in the store
        // call is observed and logged.
        tokio::spawn(async move {
            match task.await {
                Ok(Ok(())) => {},
                Ok(Err(error)) => {
                    tracing::warn!(%id, %error, "failed to update API key last-used timestamp");
                },
                Err(join_error) if join_error.is_panic() => {
                    tracing::error!(%id, "API key usage recorder panicked");
                },
                Err(_) => {},
            }
        });
    }
}

#[async_trait]
impl Client for ApiKeyAuthenticator {
    fn name(&self) -> &'static str {
        CLIENT_API_KEY
    }

    async fn authenticate(&self, request: &dyn Request) -> Result<Identity> {
        let token = token_from_request(request).unwrap_or_default();
        let record = self.resolve_record(&token).await?;

        // Dispatched before the lifecycle checks complete, so an expired
        // or revoked key's last-used time is still recorded.
        self.record_usage(record.id);

        if let Some(expires) = record.expires {
            if expires <= Utc::now().timestamp() {
                return Err(AuthError::ApiKeyExpired);
            }
        }

        if record.is_revoked.unwrap_or(false) {
            return Err(AuthError::ApiKeyRevoked);
        }

        // Without a delegation link the key is its own principal.
        let Some(account_id) = record.service_account_id.filter(|id| id.0 > 0) else {
            return Ok(Identity::from_api_key(&record));
        };

        let account = self.service_accounts.get_identity(account_id, record.org_id).await?;
        if account.is_disabled {
            return Err(AuthError::ServiceAccountDisabled);
        }

        Ok(Identity::from_service_account(&account))
    }

    fn is_eligible(&self, request: &dyn Request) -> bool {
        token_from_request(request).is_some()
    }

    fn params(&self) -> ClientParams {
        ClientParams::default()
    }
}
