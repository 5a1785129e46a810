//! Common identifier and role types shared across Stratus services.
//!
//! This module defines the ID newtypes used by the authentication stores
//! and the organization role attached to API keys.

/// Macro to define a newtype wrapper around `i64` with standard trait
/// implementations.
///
/// Each generated type:
/// - Is a transparent wrapper around `i64` (zero runtime cost)
/// - Derives `Copy`, `Clone`, `Debug`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Derives `Serialize` and `Deserialize` (transparent)
/// - Implements `From<i64>` and `Into<i64>` for SDK interop
/// - Implements `Display` that outputs the inner value
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord,
            serde::Serialize, serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Organization ID scoping keys, accounts, and role grants.
    ///
    /// Every API key and service account belongs to exactly one
    /// organization; lookups and role maps are keyed by this type.
    ///
    /// This type wraps a raw `i64` (Snowflake ID) to prevent accidental
    /// misuse — passing an `AccountId` where an `OrgId` is expected is a
    /// compile-time error.
    ///
    /// # Examples
    ///
    /// ```
    /// use stratus_common_storage::OrgId;
    ///
    /// let org = OrgId::from(42);
    /// assert_eq!(i64::from(org), 42);
    /// assert_eq!(org.to_string(), "42");
    /// ```
    OrgId
);

define_id!(
    /// Stored API-key record ID.
    ///
    /// Identifies a single [`ApiKeyRecord`](crate::auth::ApiKeyRecord) and
    /// doubles as the principal identifier for keys that are not delegated
    /// to a service account.
    ///
    /// # Examples
    ///
    /// ```
    /// use stratus_common_storage::ApiKeyId;
    ///
    /// let id = ApiKeyId::from(7);
    /// assert_eq!(i64::from(id), 7);
    /// ```
    ApiKeyId
);

define_id!(
    /// Service account ID (Snowflake ID).
    ///
    /// An API key may delegate its identity to a service account; the
    /// delegated account is fetched by this ID together with the key's
    /// [`OrgId`].
    ///
    /// # Examples
    ///
    /// ```
    /// use stratus_common_storage::AccountId;
    ///
    /// let account = AccountId::from(1001);
    /// assert_eq!(account.to_string(), "1001");
    /// ```
    AccountId
);

/// Role granted within an organization.
///
/// Roles form a strict hierarchy: `Admin` implies `Editor` implies
/// `Viewer`. The storage layer only records the grant; enforcement is the
/// caller's concern.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub enum OrgRole {
    /// Read-only access.
    Viewer,
    /// Read and write access to organization resources.
    Editor,
    /// Full administrative access, including membership management.
    Admin,
}

impl std::fmt::Display for OrgRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Viewer => write!(f, "Viewer"),
            Self::Editor => write!(f, "Editor"),
            Self::Admin => write!(f, "Admin"),
        }
    }
}
