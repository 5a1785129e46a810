//! Resolved caller identity types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use stratus_common_storage::{
    OrgId, OrgRole,
    auth::{ApiKeyRecord, ServiceAccountIdentity},
};

/// Identity namespace, distinguishing what kind of principal an ID names.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Namespace {
    /// A raw API key acting as its own principal.
    ApiKey,
    /// A service account an API key delegated to.
    ServiceAccount,
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiKey => write!(f, "api-key"),
            Self::ServiceAccount => write!(f, "service-account"),
        }
    }
}

/// A principal identifier qualified by its [`Namespace`].
///
/// Renders as `namespace:id`, e.g. `api-key:42` or `service-account:7`,
/// which is the form audit logs and downstream services see.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamespacedId {
    namespace: Namespace,
    id: i64,
}

impl NamespacedId {
    /// Creates a namespaced identifier.
    #[must_use]
    pub fn new(namespace: Namespace, id: impl Into<i64>) -> Self {
        Self { namespace, id: id.into() }
    }

    /// The identifier's namespace.
    #[must_use]
    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    /// The raw identifier within the namespace.
    #[must_use]
    pub fn id(&self) -> i64 {
        self.id
    }
}

impl std::fmt::Display for NamespacedId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.namespace, self.id)
    }
}

/// The caller identity a successful authentication resolves to.
///
/// Produced fresh per request and never cached by this crate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    /// Namespaced principal identifier.
    pub id: NamespacedId,

    /// Organization the request is acting within.
    pub org_id: OrgId,

    /// Roles held by the principal, keyed by organization.
    ///
    /// For a raw API key this is always the single entry
    /// `{org_id: key role}`; a delegated service account may carry more.
    pub org_roles: HashMap<OrgId, OrgRole>,
}

impl Identity {
    /// Builds the identity of a non-delegated API key: the record itself
    /// is the principal, with its single org/role grant.
    #[must_use]
    pub fn from_api_key(record: &ApiKeyRecord) -> Self {
        Self {
            id: NamespacedId::new(Namespace::ApiKey, record.id),
            org_id: record.org_id,
            org_roles: HashMap::from([(record.org_id, record.role)]),
        }
    }

    /// Builds the identity of a delegated service account.
    ///
    /// The account's own org/role data is authoritative; nothing from the
    /// key record is carried over.
    #[must_use]
    pub fn from_service_account(account: &ServiceAccountIdentity) -> Self {
        Self {
            id: NamespacedId::new(Namespace::ServiceAccount, account.account_id),
            org_id: account.org_id,
            org_roles: account.org_roles.clone(),
        }
    }
}
