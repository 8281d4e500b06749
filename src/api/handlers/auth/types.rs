//! Request/response types for admin auth endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::AdminRole;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginRequest {
    /// Username or email; exact match against stored values.
    pub login: String,
    pub password: String,
}

/// Issued for every successful step: login, enrollment finish, code verify.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SessionTokenResponse {
    pub token: String,
    /// `full`, `mfa_bootstrap`, or `mfa_challenge`; tells the client which
    /// step comes next.
    pub session_kind: String,
    pub expires_in_seconds: i64,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub(crate) fn new(error: &str) -> Self {
        Self {
            error: error.to_string(),
        }
    }
}

/// Lockout is the one login failure that is disclosed, with enough
/// information for a legitimate user to wait it out.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LockedResponse {
    pub error: String,
    pub retry_after_seconds: i64,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct EnrollStartResponse {
    pub secret: String,
    pub enrollment_uri: String,
    /// Shown exactly once; only hashes are kept server-side.
    pub recovery_codes: Vec<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct EnrollFinishRequest {
    pub code: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct TotpVerifyRequest {
    pub code: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SessionReportResponse {
    pub synced: bool,
    pub session_flag: bool,
    pub store_flag: bool,
    /// `session_db_mismatch` when the flags disagree; the client should force
    /// a fresh login instead of honoring the stale grant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct MeResponse {
    pub account_id: String,
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub role: AdminRole,
    pub two_factor_enabled: bool,
    pub last_login_at: Option<DateTime<Utc>>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct TotpResetRequest {
    /// Username or email of the account to reset.
    pub login: String,
}
