//! Bearer-token extraction and gate helpers shared by protected handlers.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use axum::response::Response;
use std::net::IpAddr;

use super::error_response;
use super::state::AuthState;
use crate::auth::AdminAccount;

/// Pull a bearer token out of the Authorization header.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Extract a client IP from common proxy headers.
pub(crate) fn extract_client_ip(headers: &HeaderMap) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());
    if forwarded.is_some() {
        return forwarded.map(str::to_string);
    }
    headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Typed source address for allow-list checks; unparsable values count as
/// unknown, which a non-empty allow-list rejects.
pub(crate) fn source_address(headers: &HeaderMap) -> Option<IpAddr> {
    extract_client_ip(headers).and_then(|ip| ip.parse().ok())
}

/// Gate entry for admin-only operations.
pub(crate) async fn require_authorized(
    headers: &HeaderMap,
    state: &AuthState,
) -> Result<AdminAccount, Response> {
    let Some(token) = bearer_token(headers) else {
        return Err(error_response(&crate::auth::AuthError::InvalidSession));
    };
    state
        .gate()
        .authorize(&token, source_address(headers))
        .await
        .map_err(|err| error_response(&err))
}

/// Gate entry for enrollment endpoints (bootstrap or full session).
pub(crate) async fn require_enrollment_session(
    headers: &HeaderMap,
    state: &AuthState,
) -> Result<AdminAccount, Response> {
    let Some(token) = bearer_token(headers) else {
        return Err(error_response(&crate::auth::AuthError::InvalidSession));
    };
    state
        .gate()
        .enrollment_session(&token, source_address(headers))
        .await
        .map_err(|err| error_response(&err))
}

/// Gate entry for the pending two-factor challenge.
pub(crate) async fn require_challenge_session(
    headers: &HeaderMap,
    state: &AuthState,
) -> Result<AdminAccount, Response> {
    let Some(token) = bearer_token(headers) else {
        return Err(error_response(&crate::auth::AuthError::InvalidSession));
    };
    state
        .gate()
        .challenge_session(&token, source_address(headers))
        .await
        .map_err(|err| error_response(&err))
}
