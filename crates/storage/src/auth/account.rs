//! Service account identity as exposed by the account service.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{AccountId, OrgId, OrgRole};

/// Resolved identity of a service account.
///
/// This is the account service's view of an account, fetched when an API
/// key delegates its identity. Unlike a raw key — which carries exactly one
/// role in exactly one organization — an account may hold roles in several
/// organizations, and its own role resolution is authoritative.
///
/// # Example
///
/// ```
/// use stratus_common_storage::{AccountId, OrgId, OrgRole, auth::ServiceAccountIdentity};
///
/// let account = ServiceAccountIdentity::builder()
///     .account_id(AccountId::from(9))
///     .org_id(OrgId::from(3))
///     .name("sa-terraform".to_owned())
///     .org_roles([(OrgId::from(3), OrgRole::Admin)].into())
///     .build();
///
/// assert!(!account.is_disabled);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, bon::Builder)]
#[serde(deny_unknown_fields)]
pub struct ServiceAccountIdentity {
    /// The account's identifier.
    #[builder(into)]
    pub account_id: AccountId,

    /// Organization the account was resolved in.
    #[builder(into)]
    pub org_id: OrgId,

    /// Display name of the account.
    pub name: String,

    /// Whether the account has been disabled.
    ///
    /// Disabled accounts still resolve — the flag is checked by the
    /// authenticator, which rejects the credential with a dedicated error
    /// rather than a lookup miss.
    #[builder(default)]
    pub is_disabled: bool,

    /// Roles held by the account, keyed by organization.
    #[builder(default)]
    pub org_roles: HashMap<OrgId, OrgRole>,
}
