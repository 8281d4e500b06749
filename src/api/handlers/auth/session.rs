//! Session reconciliation endpoint.
//!
//! Reports whether the presented token's cached two-factor flag still agrees
//! with the store. Read-only and safe to poll; a mismatch tells the client to
//! drop the token and log in again.

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use super::error_response;
use super::principal::{bearer_token, source_address};
use super::state::AuthState;
use super::types::SessionReportResponse;
use crate::auth::reconcile::SESSION_DB_MISMATCH;
use crate::auth::AuthError;

#[utoipa::path(
    get,
    path = "/v1/admin/auth/session",
    responses(
        (status = 200, description = "Reconciliation report for the presented token", body = SessionReportResponse),
        (status = 204, description = "No active session")
    ),
    tag = "auth"
)]
pub async fn session(headers: HeaderMap, auth_state: Extension<Arc<AuthState>>) -> Response {
    // A missing token is "no session", not an error.
    let Some(token) = bearer_token(&headers) else {
        return StatusCode::NO_CONTENT.into_response();
    };

    match auth_state
        .gate()
        .session_report(&token, source_address(&headers))
        .await
    {
        Ok(report) => (
            StatusCode::OK,
            Json(SessionReportResponse {
                synced: report.synced,
                session_flag: report.session_flag,
                store_flag: report.store_flag,
                signal: (!report.synced).then(|| SESSION_DB_MISMATCH.to_string()),
            }),
        )
            .into_response(),
        // Expired or unrecognized tokens also mean "no session".
        Err(AuthError::InvalidSession) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(&err),
    }
}
