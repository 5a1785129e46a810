//! Stored API-key record type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{AccountId, ApiKeyId, OrgId, OrgRole};

/// A stored API key as persisted by the key store.
///
/// The record holds everything the authenticator needs to validate a
/// presented credential and resolve it to a principal: the stored secret
/// material, lifecycle state, and an optional delegation link to a service
/// account.
///
/// # Secret Material
///
/// The `key` field never contains the plaintext secret. For current-format
/// keys it is the hex SHA-256 lookup hash of the full token; for legacy
/// keys it is a PHC-format Argon2 hash the presented secret is verified
/// against.
///
/// # Delegation
///
/// A record with `service_account_id` set (and positive) does not itself
/// carry authorization — identity resolution is delegated to that account.
/// A record without one is itself the principal.
///
/// # Example
///
/// ```
/// use stratus_common_storage::{ApiKeyId, OrgId, OrgRole, auth::ApiKeyRecord};
///
/// let record = ApiKeyRecord::builder()
///     .id(ApiKeyId::from(1))
///     .org_id(OrgId::from(10))
///     .name("ci-deploy".to_owned())
///     .role(OrgRole::Editor)
///     .key("d2c1...".to_owned())
///     .build();
///
/// assert!(record.expires.is_none());
/// assert!(record.service_account_id.is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, bon::Builder)]
#[serde(deny_unknown_fields)]
pub struct ApiKeyRecord {
    /// Record identifier; also the principal ID for non-delegated keys.
    #[builder(into)]
    pub id: ApiKeyId,

    /// Organization that owns this key.
    #[builder(into)]
    pub org_id: OrgId,

    /// Human-readable key name, unique per organization.
    ///
    /// Legacy-format tokens carry this name and are looked up by
    /// `(org_id, name)` rather than by hash.
    pub name: String,

    /// Role granted to callers presenting this key.
    pub role: OrgRole,

    /// Stored secret material (lookup hash or legacy PHC hash).
    pub key: String,

    /// Expiry as Unix seconds; `None` means the key never expires.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<i64>,

    /// Revocation flag; `None` is treated the same as `Some(false)`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_revoked: Option<bool>,

    /// Delegated service account, if any.
    ///
    /// Non-positive values are treated as no delegation; legacy rows
    /// created before delegation existed carry `0` here.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_account_id: Option<AccountId>,

    /// When the key last authenticated a request, if ever.
    ///
    /// Updated best-effort by the authenticator's usage recorder; may lag
    /// or be missing entirely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<DateTime<Utc>>,
}
