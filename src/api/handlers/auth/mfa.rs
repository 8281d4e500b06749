//! Two-factor enrollment and challenge endpoints.

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::info;

use super::error_response;
use super::principal::{extract_client_ip, require_challenge_session, require_enrollment_session};
use super::state::AuthState;
use super::types::{
    EnrollFinishRequest, EnrollStartResponse, ErrorResponse, SessionTokenResponse,
    TotpVerifyRequest,
};
use crate::auth::rate_limit::{RateLimitAction, RateLimitDecision};
use crate::auth::{AuthError, SessionKind};

#[utoipa::path(
    post,
    path = "/v1/admin/auth/totp/enroll/start",
    responses(
        (status = 200, description = "Enrollment material generated", body = EnrollStartResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn totp_enroll_start(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
) -> Response {
    let account = match require_enrollment_session(&headers, &auth_state).await {
        Ok(account) => account,
        Err(response) => return response,
    };

    match auth_state.enrollment().begin(account.account_id).await {
        Ok(start) => (
            StatusCode::OK,
            Json(EnrollStartResponse {
                secret: start.secret_base32,
                enrollment_uri: start.enrollment_uri,
                recovery_codes: start.recovery_codes,
            }),
        )
            .into_response(),
        Err(err) => error_response(&err),
    }
}

#[utoipa::path(
    post,
    path = "/v1/admin/auth/totp/enroll/finish",
    request_body = EnrollFinishRequest,
    responses(
        (status = 200, description = "Two-factor enabled; full session issued", body = SessionTokenResponse),
        (status = 400, description = "Invalid or malformed code", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 409, description = "Enrollment not initialized", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn totp_enroll_finish(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<EnrollFinishRequest>>,
) -> Response {
    let account = match require_enrollment_session(&headers, &auth_state).await {
        Ok(account) => account,
        Err(response) => return response,
    };

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
        .check_ip(client_ip.as_deref(), RateLimitAction::EnrollConfirm)
        == RateLimitDecision::Limited
    {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(ErrorResponse::new("rate_limited")),
        )
            .into_response();
    }

    let confirmed = match auth_state
        .enrollment()
        .confirm(account.account_id, &request.code)
        .await
    {
        Ok(confirmed) => confirmed,
        Err(err) => return error_response(&err),
    };

    // Enrollment completed: hand out a full session carrying the fresh flag.
    let ttl_seconds = auth_state.config().session_ttl_seconds();
    match auth_state
        .sessions()
        .issue(&confirmed, SessionKind::Full, ttl_seconds)
    {
        Ok(token) => (
            StatusCode::OK,
            Json(SessionTokenResponse {
                token,
                session_kind: SessionKind::Full.as_str().to_string(),
                expires_in_seconds: ttl_seconds,
            }),
        )
            .into_response(),
        Err(err) => error_response(&err),
    }
}

#[utoipa::path(
    post,
    path = "/v1/admin/auth/totp/verify",
    request_body = TotpVerifyRequest,
    responses(
        (status = 200, description = "Code accepted; full session issued", body = SessionTokenResponse),
        (status = 400, description = "Invalid or malformed code", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 429, description = "Rate limited", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn totp_verify(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<TotpVerifyRequest>>,
) -> Response {
    let account = match require_challenge_session(&headers, &auth_state).await {
        Ok(account) => account,
        Err(response) => return response,
    };

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
        .check_ip(client_ip.as_deref(), RateLimitAction::TotpVerify)
        == RateLimitDecision::Limited
        || auth_state
            .rate_limiter()
            .check_login(&account.username, RateLimitAction::TotpVerify)
            == RateLimitDecision::Limited
    {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(ErrorResponse::new("rate_limited")),
        )
            .into_response();
    }

    match auth_state
        .enrollment()
        .verify_code(account.account_id, &request.code)
        .await
    {
        Ok(true) => {}
        Ok(false) => return error_response(&AuthError::InvalidCode),
        Err(err) => return error_response(&err),
    }

    let ttl_seconds = auth_state.config().session_ttl_seconds();
    match auth_state
        .sessions()
        .issue(&account, SessionKind::Full, ttl_seconds)
    {
        Ok(token) => {
            info!(username = %account.username, "two-factor challenge passed");
            (
                StatusCode::OK,
                Json(SessionTokenResponse {
                    token,
                    session_kind: SessionKind::Full.as_str().to_string(),
                    expires_in_seconds: ttl_seconds,
                }),
            )
                .into_response()
        }
        Err(err) => error_response(&err),
    }
}
