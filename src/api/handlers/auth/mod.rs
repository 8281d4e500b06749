//! Admin login and the shared error mapping for auth endpoints.

pub(crate) mod mfa;
pub(crate) mod principal;
pub(crate) mod session;
pub mod state;
pub mod types;

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::auth::rate_limit::{RateLimitAction, RateLimitDecision};
use crate::auth::reconcile::SESSION_DB_MISMATCH;
use crate::auth::{AuthError, SessionKind};

use principal::extract_client_ip;
use state::AuthState;
use types::{ErrorResponse, LockedResponse, LoginRequest, SessionTokenResponse};

/// Map domain failures onto HTTP responses.
///
/// Login does not use this directly for its failure path; it collapses
/// everything except lockout into one generic 401 to avoid enumeration.
pub(crate) fn error_response(err: &AuthError) -> Response {
    match err {
        AuthError::InvalidCredentials => (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new("invalid_credentials")),
        )
            .into_response(),
        AuthError::AccountLocked { until } => {
            let retry_after_seconds = (*until - Utc::now()).num_seconds().max(0);
            (
                StatusCode::LOCKED,
                Json(LockedResponse {
                    error: "account_locked".to_string(),
                    retry_after_seconds,
                }),
            )
                .into_response()
        }
        AuthError::AccountInactive => (
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::new("account_inactive")),
        )
            .into_response(),
        AuthError::AccountNotFound => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("account_not_found")),
        )
            .into_response(),
        AuthError::EnrollmentNotInitialized => (
            StatusCode::CONFLICT,
            Json(ErrorResponse::new("enrollment_not_initialized")),
        )
            .into_response(),
        AuthError::InvalidCode => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("invalid_code")),
        )
            .into_response(),
        AuthError::MalformedCode => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("malformed_code")),
        )
            .into_response(),
        AuthError::InvalidSession => (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new("invalid_session")),
        )
            .into_response(),
        AuthError::SessionMismatch => (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new(SESSION_DB_MISMATCH)),
        )
            .into_response(),
        AuthError::EnrollmentRequired => (
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::new("enrollment_required")),
        )
            .into_response(),
        AuthError::TwoFactorRequired => (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new("two_factor_required")),
        )
            .into_response(),
        AuthError::AddressNotAllowed => (
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::new("address_not_allowed")),
        )
            .into_response(),
        AuthError::Store(err) => {
            error!("auth store failure: {err:#}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/v1/admin/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted; token scope depends on two-factor state", body = SessionTokenResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 423, description = "Account locked", body = LockedResponse),
        (status = 429, description = "Rate limited", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<LoginRequest>>,
) -> Response {
    let Some(Json(request)) = payload else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("missing_payload")),
        )
            .into_response();
    };

    let client_ip = extract_client_ip(&headers);
    if auth_state
        .rate_limiter()
        .check_ip(client_ip.as_deref(), RateLimitAction::Login)
        == RateLimitDecision::Limited
        || auth_state
            .rate_limiter()
            .check_login(&request.login, RateLimitAction::Login)
            == RateLimitDecision::Limited
    {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(ErrorResponse::new("rate_limited")),
        )
            .into_response();
    }

    match auth_state
        .credentials()
        .verify(&request.login, &request.password)
        .await
    {
        Ok(account) => {
            // Login never mints a full session: the next step is always
            // enrollment (no two-factor yet) or a code challenge.
            let (kind, ttl_seconds) = if account.totp_enabled {
                (
                    SessionKind::MfaChallenge,
                    auth_state.config().challenge_ttl_seconds(),
                )
            } else {
                (
                    SessionKind::MfaBootstrap,
                    auth_state.config().bootstrap_ttl_seconds(),
                )
            };
            match auth_state.sessions().issue(&account, kind, ttl_seconds) {
                Ok(token) => {
                    info!(username = %account.username, kind = kind.as_str(), "admin login accepted");
                    (
                        StatusCode::OK,
                        Json(SessionTokenResponse {
                            token,
                            session_kind: kind.as_str().to_string(),
                            expires_in_seconds: ttl_seconds,
                        }),
                    )
                        .into_response()
                }
                Err(err) => error_response(&err),
            }
        }
        Err(err @ AuthError::AccountLocked { .. }) => error_response(&err),
        Err(AuthError::Store(err)) => {
            error!("login failed on store access: {err:#}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
        // Unknown account, wrong password, inactive: one indistinguishable
        // answer.
        Err(_) => {
            warn!(login = %request.login, "admin login rejected");
            (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::new("invalid_credentials")),
            )
                .into_response()
        }
    }
}
