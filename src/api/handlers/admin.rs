//! Admin-only operations behind the full access gate.

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{error, info};

use super::auth::error_response;
use super::auth::principal::require_authorized;
use super::auth::state::AuthState;
use super::auth::types::{ErrorResponse, MeResponse, TotpResetRequest};
use crate::auth::AuthError;

#[utoipa::path(
    get,
    path = "/v1/admin/me",
    responses(
        (status = 200, description = "Profile of the authorized admin", body = MeResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn me(headers: HeaderMap, auth_state: Extension<Arc<AuthState>>) -> Response {
    let account = match require_authorized(&headers, &auth_state).await {
        Ok(account) => account,
        Err(response) => return response,
    };

    (
        StatusCode::OK,
        Json(MeResponse {
            account_id: account.account_id.to_string(),
            username: account.username,
            email: account.email,
            display_name: account.display_name,
            role: account.role,
            two_factor_enabled: account.totp_enabled,
            last_login_at: account.last_login_at,
        }),
    )
        .into_response()
}

#[utoipa::path(
    post,
    path = "/v1/admin/totp/reset",
    request_body = TotpResetRequest,
    responses(
        (status = 204, description = "Two-factor reset; the target must re-enroll"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Account not found", body = ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn totp_reset(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<TotpResetRequest>>,
) -> Response {
    let actor = match require_authorized(&headers, &auth_state).await {
        Ok(account) => account,
        Err(response) => return response,
    };

    if !actor.role.manages_accounts() {
        return (
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::new("insufficient_role")),
        )
            .into_response();
    }

    let Some(Json(request)) = payload else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("missing_payload")),
        )
            .into_response();
    };

    let target = match auth_state.store().find_by_login(&request.login).await {
        Ok(Some(target)) => target,
        Ok(None) => return error_response(&AuthError::AccountNotFound),
        Err(err) => {
            error!("failed to look up reset target: {err:#}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    match auth_state.store().reset_two_factor(target.account_id).await {
        Ok(true) => {
            // Outstanding tokens for the target now carry a stale flag; the
            // reconciliation check turns them away until re-login.
            info!(
                actor = %actor.username,
                target = %target.username,
                "two-factor administratively reset"
            );
            StatusCode::NO_CONTENT.into_response()
        }
        Ok(false) => error_response(&AuthError::AccountNotFound),
        Err(err) => {
            error!("failed to reset two-factor: {err:#}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
