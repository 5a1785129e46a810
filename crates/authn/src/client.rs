//! Dispatcher-facing authentication client traits.
//!
//! The outer authentication dispatcher owns a list of clients and, per
//! request, asks each whether it applies ([`Client::is_eligible`]) before
//! running the full flow ([`Client::authenticate`]). This module defines
//! that contract plus the minimal read-only request view clients consume.

use async_trait::async_trait;

use crate::{error::Result, identity::Identity};

/// Read-only view of an incoming request's authorization materials.
///
/// Implement this for whatever request type the serving layer uses; the
/// authenticator only ever reads the authorization header through it.
pub trait Request: Send + Sync {
    /// The raw `Authorization` header value, if the request carries one.
    fn authorization(&self) -> Option<&str>;
}

/// An authentication client the dispatcher can route requests to.
#[async_trait]
pub trait Client: Send + Sync {
    /// Stable client name, used in dispatcher logs.
    fn name(&self) -> &'static str;

    /// Runs the full authentication flow for this request.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`](crate::AuthError): an unauthorized-class
    /// outcome for credential problems, or a wrapped storage fault.
    async fn authenticate(&self, request: &dyn Request) -> Result<Identity>;

    /// Cheap, side-effect-free probe: should this client even attempt the
    /// full flow for this request?
    ///
    /// Must not decode, look anything up, or otherwise do fallible work.
    fn is_eligible(&self, request: &dyn Request) -> bool;

    /// Dispatcher behavior hints for this client.
    fn params(&self) -> ClientParams;
}

/// Per-client dispatcher configuration.
///
/// The API-key client requires no special dispatcher behavior, so its
/// params are the empty default. The struct is `#[non_exhaustive]` so
/// hints can be added for other clients without breaking this one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct ClientParams {}
