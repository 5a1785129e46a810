//! Credential extraction from request authorization materials.
//!
//! API keys are only supported through HTTP-style requests; the only place
//! a token is looked for is the authorization header. Two schemes carry a
//! key:
//!
//! - `Bearer <token>` — the token is taken verbatim after the prefix
//! - `Basic <base64(user:password)>` — accepted only when the decoded
//!   username equals the fixed sentinel [`BASIC_SENTINEL_USER`], in which
//!   case the password field is the token
//!
//! Anything else — another scheme, malformed base64, a missing colon, an
//! empty token — yields no token rather than an error.

use base64::{Engine, engine::general_purpose::STANDARD};

use crate::client::Request;

/// Authorization header prefix for bearer credentials.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Authorization header prefix for basic-auth credentials.
pub const BASIC_PREFIX: &str = "Basic ";

/// Basic-auth username marking the password field as an API key.
pub const BASIC_SENTINEL_USER: &str = "api_key";

/// Extracts the raw API-key token from a request, if one is present.
///
/// Returns `Some` iff the authorization header yields a non-empty token
/// under one of the supported schemes. This is the single source of truth
/// for eligibility: [`Client::is_eligible`](crate::client::Client::is_eligible)
/// is defined as `token_from_request(..).is_some()` and the two can never
/// disagree.
#[must_use]
pub fn token_from_request(request: &dyn Request) -> Option<String> {
    let header = request.authorization()?;

    if let Some(token) = header.strip_prefix(BEARER_PREFIX) {
        return Some(token.to_owned()).filter(|t| !t.is_empty());
    }

    if header.starts_with(BASIC_PREFIX) {
        if let Some((username, password)) = decode_basic_auth(header) {
            if username == BASIC_SENTINEL_USER && !password.is_empty() {
                return Some(password);
            }
        }
    }

    None
}

/// Decodes a `Basic ` authorization header into `(username, password)`.
///
/// Malformed headers decode to `None`; they are indistinguishable from an
/// absent credential by design.
fn decode_basic_auth(header: &str) -> Option<(String, String)> {
    let encoded = header.strip_prefix(BASIC_PREFIX)?;
    let decoded = STANDARD.decode(encoded).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_owned(), password.to_owned()))
}
